use crate::config::{CollectorConfig, ConfigError};
use crate::frame_buffer::FrameBuffer;
use crate::gesture_classifier::{GestureClassifier, ModelTable};
use crate::integrator::PositionIntegrator;
use crate::model::{ModelError, ModelStore};
use crate::scheduler::{Completion, SampleScheduler, TaskPool};
use crate::sensor_bridge::{SensorBridge, SensorSource};
use crate::types::{GestureType, Position, RunState};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load model '{model_id}': {source}")]
    ModelLoad {
        model_id: String,
        #[source]
        source: ModelError,
    },

    #[error("Gesture classification failed: {0}")]
    Classification(#[source] ModelError),

    #[error("No displacement model for gesture {0:?}")]
    UnmappedGesture(GestureType),

    #[error("Stopped before startup finished")]
    Interrupted,

    #[error("Thread spawn error: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Notificaciones hacia fuera; se invocan desde hilos internos del colector
pub trait CollectorObserver: Send + Sync {
    fn on_position_update(&self, _position: Position) {}
    fn on_gesture_change(&self, _gesture: GestureType) {}
}

pub struct NoopObserver;

impl CollectorObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollectorEvent {
    Position(Position),
    Gesture(GestureType),
}

/// Reenvía cada notificación por un canal
pub struct ChannelObserver {
    tx: Sender<CollectorEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, Receiver<CollectorEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl CollectorObserver for ChannelObserver {
    fn on_position_update(&self, position: Position) {
        let _ = self.tx.send(CollectorEvent::Position(position));
    }

    fn on_gesture_change(&self, gesture: GestureType) {
        let _ = self.tx.send(CollectorEvent::Gesture(gesture));
    }
}

struct ActiveRun {
    running: Arc<AtomicBool>,
    sampler: JoinHandle<()>,
}

/// Aplica los resultados de inferencia de una ejecución.
///
/// Los desplazamientos se integran siempre, también los que llegan tras
/// `stop()`. Una etiqueta de gesto sólo se acepta mientras su ejecución
/// sigue activa, para no pisar la clasificación de arranque de la siguiente.
struct CompletionSink {
    running: Arc<AtomicBool>,
    integrator: Arc<Mutex<PositionIntegrator>>,
    gesture: Arc<Mutex<GestureType>>,
    events: Sender<CollectorEvent>,
}

impl CompletionSink {
    fn handle(&self, completion: Completion) {
        match completion {
            Completion::Displacement(d) => {
                let position = self
                    .integrator
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .apply(d);
                let _ = self.events.send(CollectorEvent::Position(position));
            }
            Completion::Gesture(g) => {
                let mut gesture = self.gesture.lock().unwrap_or_else(PoisonError::into_inner);
                if !self.running.load(Ordering::SeqCst) {
                    debug!("Etiqueta {:?} de una ejecución ya parada, descartada", g);
                    return;
                }
                *gesture = g;
                drop(gesture);
                let _ = self.events.send(CollectorEvent::Gesture(g));
            }
        }
    }
}

/// Superficie de control: `start()` / `stop()` sobre el pipeline completo.
///
/// La posición acumulada sobrevive a stop/start; sólo un `Collector` nuevo
/// empieza en el origen.
pub struct Collector {
    config: CollectorConfig,
    table: ModelTable,
    store: Arc<dyn ModelStore>,
    source: Arc<dyn SensorSource>,
    observer: Arc<dyn CollectorObserver>,
    bridge: Arc<SensorBridge>,
    frame: Arc<Mutex<FrameBuffer>>,
    integrator: Arc<Mutex<PositionIntegrator>>,
    gesture: Arc<Mutex<GestureType>>,
    run: Mutex<Option<ActiveRun>>,
}

impl Collector {
    pub fn new(
        config: CollectorConfig,
        store: Arc<dyn ModelStore>,
        source: Arc<dyn SensorSource>,
    ) -> Result<Self, CollectorError> {
        config.validate()?;

        Ok(Self {
            table: ModelTable::new(config.models.clone()),
            frame: Arc::new(Mutex::new(FrameBuffer::new(config.window_size))),
            integrator: Arc::new(Mutex::new(PositionIntegrator::new(
                config.displacement_scale(),
            ))),
            gesture: Arc::new(Mutex::new(config.default_gesture)),
            bridge: Arc::new(SensorBridge::new()),
            observer: Arc::new(NoopObserver),
            run: Mutex::new(None),
            config,
            store,
            source,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn CollectorObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Registra los sensores y arranca el muestreo. Bloquea durante el
    /// llenado inicial para devolver los fallos de clasificación o de carga
    /// de modelo. Si ya está en marcha no hace nada.
    pub fn start(&self) -> Result<(), CollectorError> {
        let (running, startup_rx) = {
            let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
            if run.is_some() {
                debug!("start() ignorado: el colector ya está en marcha");
                return Ok(());
            }

            let gesture_model = self
                .store
                .load(&self.config.gesture_model)
                .map_err(|source| CollectorError::ModelLoad {
                    model_id: self.config.gesture_model.clone(),
                    source,
                })?;
            let classifier = Arc::new(GestureClassifier::new(
                gesture_model,
                self.config.gesture_window,
            ));

            let running = Arc::new(AtomicBool::new(true));
            let pool = TaskPool::spawn(self.config.workers)?;
            let (completions_tx, completions_rx) = unbounded();
            let (events_tx, events_rx) = unbounded();
            self.spawn_notifier(events_rx)?;
            self.spawn_integrator(
                CompletionSink {
                    running: Arc::clone(&running),
                    integrator: Arc::clone(&self.integrator),
                    gesture: Arc::clone(&self.gesture),
                    events: events_tx.clone(),
                },
                completions_rx,
            )?;

            *self.gesture.lock().unwrap_or_else(PoisonError::into_inner) =
                self.config.default_gesture;

            for kind in self.source.register(Arc::clone(&self.bridge)) {
                warn!(
                    "⚠️  Sensor {:?} no disponible, el canal queda en su último valor",
                    kind
                );
            }

            let (startup_tx, startup_rx) = bounded(1);
            let scheduler = SampleScheduler {
                config: self.config.clone(),
                running: Arc::clone(&running),
                bridge: Arc::clone(&self.bridge),
                frame: Arc::clone(&self.frame),
                classifier,
                table: self.table.clone(),
                store: Arc::clone(&self.store),
                gesture: Arc::clone(&self.gesture),
                events: events_tx,
                pool,
                completions: completions_tx,
                startup: startup_tx,
            };

            let sampler = match thread::Builder::new()
                .name("odometro-sampler".to_string())
                .spawn(move || scheduler.run())
            {
                Ok(handle) => handle,
                Err(e) => {
                    self.source.unregister();
                    return Err(CollectorError::Spawn(e));
                }
            };

            *run = Some(ActiveRun {
                running: Arc::clone(&running),
                sampler,
            });
            info!("▶️  Colector en marcha");
            (running, startup_rx)
        };

        let outcome = startup_rx.recv().unwrap_or(Err(CollectorError::Interrupted));
        if let Err(e) = &outcome {
            error!("❌ Arranque fallido: {}", e);
            self.teardown(Some(&running));
        }
        outcome
    }

    /// Para el muestreo y des-registra los sensores. Las inferencias en vuelo
    /// terminan por su cuenta. Si ya está parado no hace nada.
    pub fn stop(&self) {
        self.teardown(None);
    }

    /// `only`: parar sólo si la ejecución activa es esa
    fn teardown(&self, only: Option<&Arc<AtomicBool>>) {
        let active = {
            let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
            let current = match (run.as_ref(), only) {
                (None, _) => {
                    debug!("stop() ignorado: el colector ya está parado");
                    return;
                }
                (Some(active), Some(only)) => Arc::ptr_eq(&active.running, only),
                (Some(_), None) => true,
            };
            if !current {
                return;
            }
            run.take()
        };

        if let Some(active) = active {
            active.running.store(false, Ordering::SeqCst);
            self.source.unregister();
            if active.sampler.join().is_err() {
                error!("❌ El hilo de muestreo terminó con pánico");
            }
            info!("⏹️  Colector detenido");
        }
    }

    /// Único consumidor de los resultados de inferencia. Nunca llama al
    /// observador: un observador lento no frena la acumulación.
    fn spawn_integrator(
        &self,
        sink: CompletionSink,
        completions: Receiver<Completion>,
    ) -> std::io::Result<()> {
        thread::Builder::new()
            .name("odometro-integrator".to_string())
            .spawn(move || {
                for completion in completions.iter() {
                    sink.handle(completion);
                }
            })?;
        Ok(())
    }

    /// Hilo dedicado a las notificaciones de una ejecución
    fn spawn_notifier(&self, events: Receiver<CollectorEvent>) -> std::io::Result<()> {
        let observer = Arc::clone(&self.observer);
        thread::Builder::new()
            .name("odometro-notifier".to_string())
            .spawn(move || {
                for event in events.iter() {
                    match event {
                        CollectorEvent::Position(p) => observer.on_position_update(p),
                        CollectorEvent::Gesture(g) => observer.on_gesture_change(g),
                    }
                }
            })?;
        Ok(())
    }

    pub fn state(&self) -> RunState {
        match self
            .run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(active) if active.running.load(Ordering::SeqCst) => RunState::Running,
            _ => RunState::Idle,
        }
    }

    pub fn position(&self) -> Position {
        self.integrator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }

    /// Desplazamientos integrados desde la creación
    pub fn estimates_applied(&self) -> u64 {
        self.integrator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .applied()
    }

    pub fn gesture(&self) -> GestureType {
        *self.gesture.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn frame_snapshot(&self) -> FrameBuffer {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{init_logging, FailingModel, FixedModel, ManualSource, MemoryStore};
    use crate::sensor_bridge::SensorKind;
    use crate::types::{Displacement, SensorSnapshot};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(3);

    fn small_config() -> CollectorConfig {
        CollectorConfig {
            window_size: 20,
            step: 5,
            startup_ticks: 12,
            tick_period_ms: 1,
            workers: 2,
            gesture_model: "gesture.onnx".to_string(),
            gesture_window: 12,
            default_gesture: GestureType::Hand,
            models: HashMap::from([
                (GestureType::Hand, "hand.onnx".to_string()),
                (GestureType::Pocket, "pocket.onnx".to_string()),
            ]),
        }
    }

    struct Rig {
        collector: Collector,
        source: Arc<ManualSource>,
        store: Arc<MemoryStore>,
        estimation: Arc<FixedModel>,
        events: Receiver<CollectorEvent>,
    }

    fn rig_with(store: MemoryStore, estimation: Arc<FixedModel>, source: ManualSource) -> Rig {
        init_logging();
        let store = Arc::new(store);
        let source = Arc::new(source);
        let (observer, events) = ChannelObserver::new();
        let collector = Collector::new(small_config(), store.clone(), source.clone())
            .unwrap()
            .with_observer(Arc::new(observer));
        Rig {
            collector,
            source,
            store,
            estimation,
            events,
        }
    }

    fn rig() -> Rig {
        let estimation = FixedModel::new(vec![1.0, 0.5]);
        let store = MemoryStore::default()
            .with("gesture.onnx", FixedModel::new(vec![0.1, 0.9]))
            .with("pocket.onnx", estimation.clone());
        rig_with(store, estimation, ManualSource::default())
    }

    fn next_position(events: &Receiver<CollectorEvent>) -> Position {
        loop {
            match events.recv_timeout(TIMEOUT).unwrap() {
                CollectorEvent::Position(p) => return p,
                CollectorEvent::Gesture(_) => continue,
            }
        }
    }

    #[test]
    fn startup_selects_model_and_integrates() {
        let rig = rig();
        rig.collector.start().unwrap();

        assert_eq!(rig.collector.state(), RunState::Running);
        assert_eq!(rig.collector.gesture(), GestureType::Pocket);
        assert_eq!(
            rig.events.recv_timeout(TIMEOUT).unwrap(),
            CollectorEvent::Gesture(GestureType::Pocket)
        );

        for _ in 0..3 {
            let p = next_position(&rig.events);
            // cada contribución suma (1.0, 0.5) * 1/5
            let steps = p.x / 0.2;
            assert!((steps - steps.round()).abs() < 1e-3);
            assert!((p.y - p.x / 2.0).abs() < 1e-4);
        }

        rig.collector.stop();
        assert_eq!(rig.collector.state(), RunState::Idle);
        assert_eq!(rig.source.registrations.load(Ordering::SeqCst), 1);
        assert_eq!(rig.source.unregistrations.load(Ordering::SeqCst), 1);
        assert!(rig.estimation.calls() >= 3);
        assert!(rig.collector.position().x > 0.0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let rig = rig();
        rig.collector.stop();
        assert_eq!(rig.source.unregistrations.load(Ordering::SeqCst), 0);

        rig.collector.start().unwrap();
        rig.collector.start().unwrap();
        assert_eq!(rig.source.registrations.load(Ordering::SeqCst), 1);
        let gesture_loads = rig
            .store
            .loads
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == "gesture.onnx")
            .count();
        assert_eq!(gesture_loads, 1);

        rig.collector.stop();
        rig.collector.stop();
        assert_eq!(rig.source.unregistrations.load(Ordering::SeqCst), 1);
        assert_eq!(rig.collector.state(), RunState::Idle);
    }

    #[test]
    fn nothing_happens_while_idle() {
        let rig = rig();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(rig.collector.frame_snapshot().writes(), 0);

        rig.collector.start().unwrap();
        next_position(&rig.events);
        rig.collector.stop();

        // dejar terminar las inferencias en vuelo
        thread::sleep(Duration::from_millis(100));
        let writes = rig.collector.frame_snapshot().writes();
        let calls = rig.estimation.calls();
        let applied = rig.collector.estimates_applied();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(rig.collector.frame_snapshot().writes(), writes);
        assert_eq!(rig.estimation.calls(), calls);
        assert_eq!(rig.collector.estimates_applied(), applied);
    }

    #[test]
    fn position_survives_restart() {
        let rig = rig();
        rig.collector.start().unwrap();
        next_position(&rig.events);
        rig.collector.stop();
        thread::sleep(Duration::from_millis(100));

        let before = rig.collector.position();
        assert!(before.x > 0.0);

        rig.collector.start().unwrap();
        let after = rig.collector.position();
        assert!(after.x >= before.x);
        assert_eq!(rig.source.registrations.load(Ordering::SeqCst), 2);
        rig.collector.stop();
    }

    #[test]
    fn restart_fills_from_slot_zero() {
        let gesture_model = FixedModel::new(vec![0.1, 0.9]);
        let estimation = FixedModel::new(vec![1.0, 0.5]);
        let store = MemoryStore::default()
            .with("gesture.onnx", gesture_model.clone())
            .with("pocket.onnx", estimation.clone());
        let rig = rig_with(store, estimation, ManualSource::default());
        let startup = small_config().startup_ticks;

        rig.collector.start().unwrap();
        let bridge = rig.source.bridge().unwrap();
        bridge.on_acceleration([1.0, 1.0, 1.0]);
        thread::sleep(Duration::from_millis(100));
        rig.collector.stop();
        assert!(rig.collector.frame_snapshot().channel(0).iter().all(|&v| v == 1.0));
        thread::sleep(Duration::from_millis(50));

        bridge.on_acceleration([2.0, 2.0, 2.0]);
        rig.collector.start().unwrap();

        // el segundo llenado empieza otra vez en el slot 0
        let frame = rig.collector.frame_snapshot();
        assert!(frame.channel(0)[..startup].iter().all(|&v| v == 2.0));

        let guard = gesture_model.last_input.lock().unwrap();
        let (input, shape) = guard.as_ref().unwrap();
        assert_eq!(*shape, [1, 6, startup]);
        assert!(input[..startup].iter().all(|&v| v == 2.0));
        drop(guard);
        rig.collector.stop();
    }

    struct SlowObserver {
        delay: Duration,
        positions: AtomicUsize,
    }

    impl CollectorObserver for SlowObserver {
        fn on_position_update(&self, _position: Position) {
            self.positions.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
        }
    }

    #[test]
    fn slow_observer_does_not_stall_integration() {
        init_logging();
        let store = MemoryStore::default()
            .with("gesture.onnx", FixedModel::new(vec![0.1, 0.9]))
            .with("pocket.onnx", FixedModel::new(vec![1.0, 0.5]));
        let observer = Arc::new(SlowObserver {
            delay: Duration::from_millis(400),
            positions: AtomicUsize::new(0),
        });
        let collector = Collector::new(
            small_config(),
            Arc::new(store),
            Arc::new(ManualSource::default()),
        )
        .unwrap()
        .with_observer(observer.clone());

        collector.start().unwrap();
        thread::sleep(Duration::from_millis(150));
        let applied = collector.estimates_applied();
        collector.stop();

        assert!(applied >= 5, "sólo {} estimaciones aplicadas", applied);
        assert!(observer.positions.load(Ordering::SeqCst) <= 1);
    }

    fn sink(
        running: bool,
    ) -> (
        CompletionSink,
        Arc<Mutex<GestureType>>,
        Receiver<CollectorEvent>,
    ) {
        let gesture = Arc::new(Mutex::new(GestureType::Pocket));
        let (events, rx) = unbounded();
        let sink = CompletionSink {
            running: Arc::new(AtomicBool::new(running)),
            integrator: Arc::new(Mutex::new(PositionIntegrator::new(0.5))),
            gesture: gesture.clone(),
            events,
        };
        (sink, gesture, rx)
    }

    #[test]
    fn late_label_from_stopped_run_is_dropped() {
        let (sink, gesture, events) = sink(false);

        sink.handle(Completion::Gesture(GestureType::Hand));
        assert_eq!(*gesture.lock().unwrap(), GestureType::Pocket);
        assert!(events.try_recv().is_err());

        // los desplazamientos tardíos sí se integran
        sink.handle(Completion::Displacement(Displacement::new(2.0, 4.0)));
        let expected = Position { x: 1.0, y: 2.0 };
        assert_eq!(sink.integrator.lock().unwrap().current(), expected);
        assert_eq!(events.try_recv().unwrap(), CollectorEvent::Position(expected));
    }

    #[test]
    fn label_from_live_run_is_applied() {
        let (sink, gesture, events) = sink(true);
        sink.handle(Completion::Gesture(GestureType::Hand));
        assert_eq!(*gesture.lock().unwrap(), GestureType::Hand);
        assert_eq!(
            events.try_recv().unwrap(),
            CollectorEvent::Gesture(GestureType::Hand)
        );
    }

    #[test]
    fn classifier_failure_aborts_start() {
        let estimation = FixedModel::new(vec![1.0, 0.5]);
        let store = MemoryStore::default()
            .with("gesture.onnx", Arc::new(FailingModel))
            .with("pocket.onnx", estimation.clone());
        let rig = rig_with(store, estimation, ManualSource::default());

        let err = rig.collector.start().unwrap_err();
        assert!(matches!(err, CollectorError::Classification(_)));
        assert_eq!(rig.collector.state(), RunState::Idle);
        assert_eq!(rig.source.unregistrations.load(Ordering::SeqCst), 1);
        assert_eq!(rig.estimation.calls(), 0);
    }

    #[test]
    fn missing_estimation_model_aborts_start() {
        let estimation = FixedModel::new(vec![1.0, 0.5]);
        let store = MemoryStore::default()
            .with("gesture.onnx", FixedModel::new(vec![0.1, 0.9]))
            .with("hand.onnx", estimation.clone());
        let rig = rig_with(store, estimation, ManualSource::default());

        match rig.collector.start() {
            Err(CollectorError::ModelLoad { model_id, .. }) => assert_eq!(model_id, "pocket.onnx"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(rig.collector.state(), RunState::Idle);
    }

    #[test]
    fn missing_gesture_model_fails_before_registering() {
        let estimation = FixedModel::new(vec![1.0, 0.5]);
        let store = MemoryStore::default().with("pocket.onnx", estimation.clone());
        let rig = rig_with(store, estimation, ManualSource::default());

        assert!(matches!(
            rig.collector.start(),
            Err(CollectorError::ModelLoad { .. })
        ));
        assert_eq!(rig.source.registrations.load(Ordering::SeqCst), 0);
        assert_eq!(rig.collector.state(), RunState::Idle);
    }

    #[test]
    fn malformed_estimates_are_skipped() {
        let estimation = FixedModel::new(vec![1.0]);
        let store = MemoryStore::default()
            .with("gesture.onnx", FixedModel::new(vec![0.1, 0.9]))
            .with("pocket.onnx", estimation.clone());
        let rig = rig_with(store, estimation, ManualSource::default());

        rig.collector.start().unwrap();
        thread::sleep(Duration::from_millis(80));
        assert_eq!(rig.collector.state(), RunState::Running);
        assert!(rig.estimation.calls() > 0);
        assert_eq!(rig.collector.estimates_applied(), 0);
        assert_eq!(rig.collector.position(), Position::default());
        rig.collector.stop();
    }

    #[test]
    fn unavailable_sensor_does_not_abort() {
        let estimation = FixedModel::new(vec![1.0, 0.5]);
        let store = MemoryStore::default()
            .with("gesture.onnx", FixedModel::new(vec![0.1, 0.9]))
            .with("pocket.onnx", estimation.clone());
        let source = ManualSource::with_missing(vec![SensorKind::AngularRate]);
        let rig = rig_with(store, estimation, source);

        rig.collector.start().unwrap();
        assert_eq!(rig.collector.state(), RunState::Running);
        next_position(&rig.events);
        rig.collector.stop();
    }

    #[test]
    fn sensor_values_reach_the_buffer() {
        let rig = rig();
        rig.collector.start().unwrap();

        let bridge = rig.source.bridge().unwrap();
        bridge.on_acceleration([1.5, 2.5, 3.5]);
        bridge.on_angular_rate([0.1, 0.2, 0.3]);
        thread::sleep(Duration::from_millis(30));

        let frame = rig.collector.frame_snapshot();
        let expected = SensorSnapshot {
            acceleration: [1.5, 2.5, 3.5],
            angular_rate: [0.1, 0.2, 0.3],
            ..SensorSnapshot::default()
        }
        .channels();
        let found = (0..frame.window_size())
            .any(|i| (0..6).all(|c| frame.channel(c)[i] == expected[c]));
        assert!(found);
        rig.collector.stop();
    }

    #[test]
    fn label_refreshes_on_full_window() {
        let rig = rig();
        rig.collector.start().unwrap();

        // el gesto de arranque y al menos un borde de ventana completa
        let mut gestures = 0;
        while gestures < 2 {
            if let CollectorEvent::Gesture(g) = rig.events.recv_timeout(TIMEOUT).unwrap() {
                assert_eq!(g, GestureType::Pocket);
                gestures += 1;
            }
        }
        rig.collector.stop();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CollectorConfig {
            step: 0,
            ..small_config()
        };
        let result = Collector::new(
            config,
            Arc::new(MemoryStore::default()),
            Arc::new(ManualSource::default()),
        );
        assert!(matches!(result, Err(CollectorError::Config(_))));
    }
}

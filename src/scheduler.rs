use crate::collector::{CollectorError, CollectorEvent};
use crate::config::CollectorConfig;
use crate::estimator::Estimator;
use crate::frame_buffer::FrameBuffer;
use crate::gesture_classifier::{GestureClassifier, ModelTable};
use crate::model::ModelStore;
use crate::sensor_bridge::SensorBridge;
use crate::types::{Displacement, GestureType};
use crossbeam_channel::{unbounded, Sender};
use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Qué dispara un tick además de escribir la muestra
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    Sample,
    /// Estimación parcial con la ventana rotada en `offset`
    Step { offset: usize },
    /// Clasificación de contexto + estimación con offset 0
    FullWindow,
}

/// Contador de ventana: decide la acción de cada tick sólo por conteo.
/// `index == W` se comprueba antes que `index % STEP == 0`, así que en el
/// borde de ventana nunca se lanza también un paso.
#[derive(Debug, Clone)]
pub struct Cadence {
    window_size: usize,
    step: usize,
    index: usize,
}

impl Cadence {
    pub fn new(window_size: usize, step: usize, start_index: usize) -> Self {
        Self {
            window_size,
            step,
            index: start_index,
        }
    }

    /// Devuelve la acción del tick y el índice donde se escribe la muestra
    pub fn advance(&mut self) -> (TickAction, usize) {
        let action = if self.index == self.window_size {
            self.index = 0;
            TickAction::FullWindow
        } else if self.index > 0 && self.index % self.step == 0 {
            TickAction::Step { offset: self.index }
        } else {
            TickAction::Sample
        };

        let write_index = self.index;
        self.index += 1;
        (action, write_index)
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool de hilos para las inferencias. Los trabajos se lanzan y se olvidan;
/// al soltar el pool los hilos terminan lo encolado y salen.
pub struct TaskPool {
    jobs: Sender<Job>,
}

impl TaskPool {
    pub fn spawn(workers: usize) -> std::io::Result<Self> {
        let (tx, rx) = unbounded::<Job>();
        for i in 0..workers {
            let rx = rx.clone();
            thread::Builder::new()
                .name(format!("odometro-infer-{}", i))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                })?;
        }
        Ok(Self { jobs: tx })
    }

    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.jobs.send(Box::new(job)).is_err() {
            warn!("⚠️  Pool de inferencia cerrado, trabajo descartado");
        }
    }
}

/// Resultado de una inferencia, consumido por un único hilo integrador
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    Displacement(Displacement),
    Gesture(GestureType),
}

/// Espera absoluta entre ticks: el trabajo del tick no desplaza el periodo
struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now(),
        }
    }

    fn wait(&mut self) {
        self.next += self.period;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        } else {
            // vamos tarde: no intentar recuperar ticks perdidos
            self.next = now;
        }
    }
}

/// Bucle de muestreo de una ejecución: llenado inicial, selección de modelo
/// y régimen estacionario hasta que `running` pasa a false.
pub(crate) struct SampleScheduler {
    pub config: CollectorConfig,
    pub running: Arc<AtomicBool>,
    pub bridge: Arc<SensorBridge>,
    pub frame: Arc<Mutex<FrameBuffer>>,
    pub classifier: Arc<GestureClassifier>,
    pub table: ModelTable,
    pub store: Arc<dyn ModelStore>,
    pub gesture: Arc<Mutex<GestureType>>,
    /// Notificaciones hacia el hilo notificador, nunca al observador directo
    pub events: Sender<CollectorEvent>,
    pub pool: TaskPool,
    pub completions: Sender<Completion>,
    pub startup: Sender<Result<(), CollectorError>>,
}

impl SampleScheduler {
    pub fn run(self) {
        let mut ticker = Ticker::new(self.config.tick_period());

        let estimator = match self.startup_fill(&mut ticker) {
            Ok(estimator) => estimator,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = self.startup.send(Err(e));
                return;
            }
        };
        let _ = self.startup.send(Ok(()));

        self.steady_state(&mut ticker, estimator);
        debug!("Bucle de muestreo terminado");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Copia la última lectura de los sensores al buffer
    fn sample(&self, index: usize) {
        let snapshot = self.bridge.current_snapshot();
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(index, &snapshot);
        trace!("tick {}: {:?}", index, snapshot);
    }

    fn snapshot_frame(&self) -> FrameBuffer {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    fn startup_fill(&self, ticker: &mut Ticker) -> Result<Arc<Estimator>, CollectorError> {
        for index in 0..self.config.startup_ticks {
            if !self.is_running() {
                return Err(CollectorError::Interrupted);
            }
            self.sample(index);
            ticker.wait();
        }

        let gesture = self
            .classifier
            .classify_frame(&self.snapshot_frame())
            .map_err(CollectorError::Classification)?;
        *self.gesture.lock().unwrap_or_else(PoisonError::into_inner) = gesture;
        let _ = self.events.send(CollectorEvent::Gesture(gesture));

        let model_id = self
            .table
            .model_for(gesture)
            .ok_or(CollectorError::UnmappedGesture(gesture))?;
        let model = self
            .store
            .load(model_id)
            .map_err(|source| CollectorError::ModelLoad {
                model_id: model_id.to_string(),
                source,
            })?;

        let estimator = Estimator::new(model, model_id);
        info!(
            "🧭 Gesto inicial {:?}, modelo activo: {}",
            gesture,
            estimator.model_id()
        );
        Ok(Arc::new(estimator))
    }

    fn steady_state(&self, ticker: &mut Ticker, estimator: Arc<Estimator>) {
        let mut cadence = Cadence::new(
            self.config.window_size,
            self.config.step,
            self.config.startup_ticks,
        );

        while self.is_running() {
            let (action, index) = cadence.advance();
            match action {
                TickAction::FullWindow => {
                    let frame = self.snapshot_frame();
                    self.dispatch_classification(frame.clone());
                    self.dispatch_estimate(&estimator, frame, 0);
                }
                TickAction::Step { offset } => {
                    self.dispatch_estimate(&estimator, self.snapshot_frame(), offset);
                }
                TickAction::Sample => {}
            }
            self.sample(index);
            ticker.wait();
        }
    }

    fn dispatch_estimate(&self, estimator: &Arc<Estimator>, frame: FrameBuffer, offset: usize) {
        let estimator = Arc::clone(estimator);
        let completions = self.completions.clone();
        self.pool.execute(move || match estimator.estimate(&frame, offset) {
            Ok(d) => {
                let _ = completions.send(Completion::Displacement(d));
            }
            Err(e) => warn!("⚠️  Estimación descartada (offset {}): {}", offset, e),
        });
    }

    /// Sólo actualiza la etiqueta; el modelo activo no cambia
    fn dispatch_classification(&self, frame: FrameBuffer) {
        let classifier = Arc::clone(&self.classifier);
        let completions = self.completions.clone();
        self.pool.execute(move || match classifier.classify_frame(&frame) {
            Ok(gesture) => {
                let _ = completions.send(Completion::Gesture(gesture));
            }
            Err(e) => warn!("⚠️  Clasificación de contexto fallida: {}", e),
        });
    }
}

use crate::sensor_bridge::{SensorBridge, SensorEvent, SensorKind, SensorSource};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Row {row}: {msg}")]
    Parse { row: usize, msg: String },

    #[error("Row {row}: unknown sensor '{name}'")]
    UnknownSensor { row: usize, name: String },

    #[error("Recording {0:?} has no events")]
    Empty(PathBuf),
}

/// Evento de sensor con su instante relativo en la grabación
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    pub t_ms: u64,
    pub event: SensorEvent,
}

fn parse_kind(name: &str) -> Option<SensorKind> {
    match name.trim().to_lowercase().as_str() {
        "orientation" | "rot" | "rotation_vector" => Some(SensorKind::Orientation),
        "acceleration" | "acc" | "accel" => Some(SensorKind::Acceleration),
        "angular_rate" | "gyro" => Some(SensorKind::AngularRate),
        _ => None,
    }
}

/// Lee eventos en formato `t_ms,sensor,v0,v1,v2,v3` (v3 sólo para
/// orientación). El resultado queda ordenado por tiempo.
pub fn parse_events<R: Read>(reader: R) -> Result<Vec<TimedEvent>, RecordingError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result?;
        if record.len() < 2 {
            return Err(RecordingError::Parse {
                row,
                msg: format!("expected at least 2 columns, got {}", record.len()),
            });
        }

        let t_ms: u64 = record[0].parse().map_err(|_| RecordingError::Parse {
            row,
            msg: format!("invalid t_ms '{}'", &record[0]),
        })?;
        let kind = parse_kind(&record[1]).ok_or_else(|| RecordingError::UnknownSensor {
            row,
            name: record[1].to_string(),
        })?;

        let arity = kind.arity();
        if record.len() < 2 + arity {
            return Err(RecordingError::Parse {
                row,
                msg: format!("{:?} needs {} values", kind, arity),
            });
        }

        let mut values = [0.0f32; 4];
        for (i, value) in values.iter_mut().enumerate().take(arity) {
            *value = record[2 + i].parse().map_err(|_| RecordingError::Parse {
                row,
                msg: format!("invalid value '{}'", &record[2 + i]),
            })?;
        }

        events.push(TimedEvent {
            t_ms,
            event: SensorEvent { kind, values },
        });
    }

    events.sort_by_key(|e| e.t_ms);
    Ok(events)
}

pub fn load_events_from_csv(path: impl AsRef<Path>) -> Result<Vec<TimedEvent>, RecordingError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let events = parse_events(file)?;
    if events.is_empty() {
        return Err(RecordingError::Empty(path.to_path_buf()));
    }
    Ok(events)
}

/// Sensores sin ningún evento en la grabación
pub fn missing_kinds(events: &[TimedEvent]) -> Vec<SensorKind> {
    SensorKind::ALL
        .into_iter()
        .filter(|kind| !events.iter().any(|e| e.event.kind == *kind))
        .collect()
}

/// Recorre una grabación sin reloj: aplica al bridge todo lo ocurrido hasta `t_ms`
pub struct RecordingCursor<'a> {
    events: &'a [TimedEvent],
    pos: usize,
}

impl<'a> RecordingCursor<'a> {
    pub fn new(events: &'a [TimedEvent]) -> Self {
        Self { events, pos: 0 }
    }

    pub fn advance_to(&mut self, t_ms: u64, bridge: &SensorBridge) {
        while let Some(ev) = self.events.get(self.pos) {
            if ev.t_ms > t_ms {
                break;
            }
            bridge.apply(&ev.event);
            self.pos += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.events.len()
    }

    /// Duración total de la grabación en ms
    pub fn duration_ms(&self) -> u64 {
        let times = self.events.iter().map(|e| e.t_ms);
        match (times.clone().min(), times.max()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }
}

/// Fuente de sensores que reproduce una grabación en su propio hilo, con la
/// temporización original, como haría el servicio de sensores del sistema.
pub struct ReplaySource {
    events: Arc<Vec<TimedEvent>>,
    stop: Arc<AtomicBool>,
    player: Mutex<Option<JoinHandle<()>>>,
}

impl ReplaySource {
    /// Los eventos se reordenan por `t_ms`; a igual tiempo se mantiene el
    /// orden de entrada.
    pub fn new(mut events: Vec<TimedEvent>) -> Self {
        events.sort_by_key(|e| e.t_ms);
        Self {
            events: Arc::new(events),
            stop: Arc::new(AtomicBool::new(false)),
            player: Mutex::new(None),
        }
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        Ok(Self::new(load_events_from_csv(path)?))
    }

    /// true cuando el hilo de reproducción ya no tiene eventos que emitir
    pub fn is_finished(&self) -> bool {
        self.player
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(true, |h| h.is_finished())
    }

    fn play(events: Arc<Vec<TimedEvent>>, stop: Arc<AtomicBool>, bridge: Arc<SensorBridge>) {
        let t0 = events.first().map_or(0, |e| e.t_ms);
        let start = Instant::now();

        for ev in events.iter() {
            let due = start + Duration::from_millis(ev.t_ms.saturating_sub(t0));
            loop {
                if stop.load(Ordering::SeqCst) {
                    return;
                }
                let now = Instant::now();
                if now >= due {
                    break;
                }
                // dormir a trozos para reaccionar a unregister()
                thread::sleep((due - now).min(Duration::from_millis(20)));
            }
            bridge.apply(&ev.event);
        }
        info!("📼 Grabación reproducida ({} eventos)", events.len());
    }
}

impl SensorSource for ReplaySource {
    fn register(&self, bridge: Arc<SensorBridge>) -> Vec<SensorKind> {
        self.unregister();
        self.stop.store(false, Ordering::SeqCst);

        let events = Arc::clone(&self.events);
        let stop = Arc::clone(&self.stop);
        match thread::Builder::new()
            .name("odometro-replay".to_string())
            .spawn(move || Self::play(events, stop, bridge))
        {
            Ok(handle) => {
                *self.player.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                missing_kinds(&self.events)
            }
            Err(e) => {
                warn!("⚠️  No se pudo lanzar la reproducción: {}", e);
                SensorKind::ALL.to_vec()
            }
        }
    }

    fn unregister(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let player = self
            .player
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = player {
            if handle.join().is_err() {
                warn!("⚠️  El hilo de reproducción terminó con pánico");
            }
            debug!("Reproducción detenida");
        }
    }
}

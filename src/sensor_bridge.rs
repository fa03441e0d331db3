use crate::types::{Axis3, Orientation, SensorSnapshot};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Orientation,
    Acceleration,
    AngularRate,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Orientation,
        SensorKind::Acceleration,
        SensorKind::AngularRate,
    ];

    /// Número de componentes de cada evento
    pub fn arity(self) -> usize {
        match self {
            SensorKind::Orientation => 4,
            SensorKind::Acceleration | SensorKind::AngularRate => 3,
        }
    }
}

/// Un evento crudo de sensor; `values[3]` sólo se usa en orientación
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub values: [f32; 4],
}

/// Guarda el último valor de cada sensor. Cada vector va en su propio mutex:
/// una escritura nunca se lee a medias, pero no hay sincronización entre
/// vectores distintos.
#[derive(Debug, Default)]
pub struct SensorBridge {
    orientation: Mutex<Orientation>,
    acceleration: Mutex<Axis3>,
    angular_rate: Mutex<Axis3>,
}

impl SensorBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_orientation(&self, value: Orientation) {
        *self
            .orientation
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn on_acceleration(&self, value: Axis3) {
        *self
            .acceleration
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn on_angular_rate(&self, value: Axis3) {
        *self
            .angular_rate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Enruta un evento a la capacidad correspondiente
    pub fn apply(&self, event: &SensorEvent) {
        let v = event.values;
        match event.kind {
            SensorKind::Orientation => self.on_orientation(v),
            SensorKind::Acceleration => self.on_acceleration([v[0], v[1], v[2]]),
            SensorKind::AngularRate => self.on_angular_rate([v[0], v[1], v[2]]),
        }
    }

    /// Copia de los tres últimos vectores
    pub fn current_snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            orientation: *self
                .orientation
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            acceleration: *self
                .acceleration
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            angular_rate: *self
                .angular_rate
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Servicio de sensores de la plataforma.
///
/// `register` empieza a empujar eventos hacia el bridge desde su propio
/// contexto y devuelve los sensores que no existen en el dispositivo; esos
/// canales se quedan con su último valor (o cero).
pub trait SensorSource: Send + Sync {
    fn register(&self, bridge: Arc<SensorBridge>) -> Vec<SensorKind>;
    fn unregister(&self);
}

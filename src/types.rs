use serde::{Deserialize, Serialize};

/// Orientación (cuaternión tipo rotation vector): [x, y, z, w]
pub type Orientation = [f32; 4];

/// Vector de 3 ejes (aceleración en m/s² o velocidad angular en rad/s)
pub type Axis3 = [f32; 3];

/// Constantes del sistema
pub const WINDOW_SIZE: usize = 200;
pub const STEP: usize = 10;
pub const NUM_CHANNELS: usize = 6; // ax, ay, az, gx, gy, gz
pub const STARTUP_TICKS: usize = WINDOW_SIZE - 8; // 192
pub const TICK_PERIOD_MS: u64 = 5;

/// Últimos valores conocidos de los tres sensores
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub orientation: Orientation,
    pub acceleration: Axis3,
    pub angular_rate: Axis3,
}

impl SensorSnapshot {
    /// Los 6 canales que se guardan en el buffer, en orden de canal
    /// (la orientación se muestrea pero no se almacena)
    pub fn channels(&self) -> [f32; NUM_CHANNELS] {
        [
            self.acceleration[0],
            self.acceleration[1],
            self.acceleration[2],
            self.angular_rate[0],
            self.angular_rate[1],
            self.angular_rate[2],
        ]
    }
}

/// Contexto de transporte del dispositivo; selecciona el modelo de desplazamiento
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureType {
    #[default]
    Hand,
    Pocket,
}

impl GestureType {
    /// Orden de las clases en la salida del modelo de gestos
    pub const ALL: [GestureType; 2] = [GestureType::Hand, GestureType::Pocket];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// Salida de una invocación del estimador: [forward, lateral]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Displacement {
    pub dx: f32,
    pub dy: f32,
}

impl Displacement {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Posición 2D acumulada
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

//! Odometría inercial en tiempo real.
//!
//! Un hilo de muestreo copia cada 5 ms la última lectura de orientación,
//! aceleración y velocidad angular a un buffer circular de 6 canales. Cada
//! `STEP` ticks (y en cada borde de ventana) se lanza en un pool aparte el
//! modelo de desplazamiento sobre una copia del buffer, y sus resultados se
//! integran en una posición 2D. Un clasificador de contexto (mano / bolsillo)
//! elige el modelo activo al arrancar.

pub mod collector;
pub mod config;
pub mod estimator;
pub mod frame_buffer;
pub mod gesture_classifier;
pub mod integrator;
pub mod model;
pub mod recording;
pub mod scheduler;
pub mod sensor_bridge;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::{ChannelObserver, Collector, CollectorError, CollectorEvent, CollectorObserver};
pub use config::CollectorConfig;
pub use types::{Displacement, GestureType, Position, RunState, SensorSnapshot};

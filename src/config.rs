use crate::types::{GestureType, STARTUP_TICKS, STEP, TICK_PERIOD_MS, WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parámetros del colector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Muestras por canal en el buffer circular (default: 200)
    pub window_size: usize,
    /// Cada cuántos ticks se lanza una estimación parcial (default: 10)
    pub step: usize,
    /// Ticks de llenado inicial antes de clasificar (default: 192)
    pub startup_ticks: usize,
    /// Periodo de muestreo en ms (default: 5)
    pub tick_period_ms: u64,
    /// Hilos del pool de inferencia (default: 2)
    pub workers: usize,
    /// Modelo ONNX del clasificador de gestos
    pub gesture_model: String,
    /// Muestras por canal que consume el clasificador (default: 192)
    pub gesture_window: usize,
    /// Gesto inicial antes de la primera clasificación
    pub default_gesture: GestureType,
    /// Tabla gesto -> modelo de desplazamiento
    pub models: HashMap<GestureType, String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        let models = HashMap::from([
            (GestureType::Hand, "resnet.onnx".to_string()),
            (GestureType::Pocket, "resnet.onnx".to_string()),
        ]);

        Self {
            window_size: WINDOW_SIZE,
            step: STEP,
            startup_ticks: STARTUP_TICKS,
            tick_period_ms: TICK_PERIOD_MS,
            workers: 2,
            gesture_model: "mobile_model.onnx".to_string(),
            gesture_window: STARTUP_TICKS,
            default_gesture: GestureType::default(),
            models,
        }
    }
}

impl CollectorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 || self.step == 0 {
            return Err(ConfigError::Invalid(
                "window_size y step deben ser > 0".to_string(),
            ));
        }
        if self.step >= self.window_size {
            return Err(ConfigError::Invalid(format!(
                "step ({}) debe ser menor que window_size ({})",
                self.step, self.window_size
            )));
        }
        if self.startup_ticks >= self.window_size {
            return Err(ConfigError::Invalid(format!(
                "startup_ticks ({}) debe ser menor que window_size ({})",
                self.startup_ticks, self.window_size
            )));
        }
        if self.gesture_window == 0 || self.gesture_window > self.window_size {
            return Err(ConfigError::Invalid(format!(
                "gesture_window ({}) fuera de rango 1..={}",
                self.gesture_window, self.window_size
            )));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers debe ser > 0".to_string()));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Factor aplicado a cada desplazamiento: 1 / step
    pub fn displacement_scale(&self) -> f32 {
        1.0 / self.step as f32
    }
}

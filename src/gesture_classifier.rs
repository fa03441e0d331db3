use crate::frame_buffer::{EstimationWindow, FrameBuffer};
use crate::model::{Model, ModelError};
use crate::types::GestureType;
use std::collections::HashMap;
use std::sync::Arc;

/// Clasificador de contexto (mano / bolsillo)
pub struct GestureClassifier {
    model: Arc<dyn Model>,
    window_len: usize,
}

impl GestureClassifier {
    /// `window_len`: muestras por canal que espera el modelo
    pub fn new(model: Arc<dyn Model>, window_len: usize) -> Self {
        Self { model, window_len }
    }

    /// Aplana las primeras `window_len` muestras del buffer y clasifica
    pub fn classify_frame(&self, frame: &FrameBuffer) -> Result<GestureType, ModelError> {
        self.classify(&frame.flatten_prefix(self.window_len))
    }

    pub fn classify(&self, window: &EstimationWindow) -> Result<GestureType, ModelError> {
        let scores = self.predict_scores(window)?;

        let (idx, _) = scores
            .iter()
            .take(GestureType::ALL.len())
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or(ModelError::MalformedOutput {
                expected: GestureType::ALL.len(),
                actual: 0,
            })?;

        GestureType::from_index(idx).ok_or(ModelError::MalformedOutput {
            expected: GestureType::ALL.len(),
            actual: scores.len(),
        })
    }

    /// Puntuación por clase, en el orden de `GestureType::ALL`
    pub fn predict_scores(&self, window: &EstimationWindow) -> Result<Vec<f32>, ModelError> {
        let scores = self.model.forward(window.as_slice(), window.shape())?;
        if scores.len() < GestureType::ALL.len() {
            return Err(ModelError::MalformedOutput {
                expected: GestureType::ALL.len(),
                actual: scores.len(),
            });
        }
        Ok(scores)
    }
}

/// Tabla gesto -> identificador del modelo de desplazamiento
#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    entries: HashMap<GestureType, String>,
}

impl ModelTable {
    pub fn new(entries: HashMap<GestureType, String>) -> Self {
        Self { entries }
    }

    pub fn model_for(&self, gesture: GestureType) -> Option<&str> {
        self.entries.get(&gesture).map(String::as_str)
    }
}

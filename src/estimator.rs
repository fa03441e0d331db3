use crate::frame_buffer::{EstimationWindow, FrameBuffer};
use crate::model::{Model, ModelError};
use crate::types::Displacement;
use std::sync::Arc;

/// Corre el modelo de desplazamiento activo sobre una ventana del buffer
pub struct Estimator {
    model: Arc<dyn Model>,
    model_id: String,
}

impl Estimator {
    pub fn new(model: Arc<dyn Model>, model_id: impl Into<String>) -> Self {
        Self {
            model,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// `offset` 0 = ventana completa; 0 < offset < W = invocación de paso,
    /// la ventana se rota para terminar en la muestra más reciente
    pub fn estimate(
        &self,
        frame: &FrameBuffer,
        offset: usize,
    ) -> Result<Displacement, ModelError> {
        self.estimate_window(&frame.flatten(offset))
    }

    pub fn estimate_window(&self, window: &EstimationWindow) -> Result<Displacement, ModelError> {
        let output = self.model.forward(window.as_slice(), window.shape())?;
        match output.as_slice() {
            [dx, dy, ..] => Ok(Displacement::new(*dx, *dy)),
            _ => Err(ModelError::MalformedOutput {
                expected: 2,
                actual: output.len(),
            }),
        }
    }
}

use log::info;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("ONNX Runtime error: {0}")]
    OnnxError(#[from] ort::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Model not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid input size: shape {shape:?} needs {expected}, got {actual}")]
    InvalidInputSize {
        shape: [usize; 3],
        expected: usize,
        actual: usize,
    },

    #[error("Malformed output: expected at least {expected} values, got {actual}")]
    MalformedOutput { expected: usize, actual: usize },

    #[error("Missing ONNX {kind}")]
    MissingIo { kind: &'static str },
}

/// Motor de inferencia opaco: tensor de entrada -> tensor de salida (aplanado)
pub trait Model: Send + Sync {
    fn forward(&self, input: &[f32], shape: [usize; 3]) -> Result<Vec<f32>, ModelError>;
}

/// Resuelve un identificador lógico de modelo a un modelo cargado.
/// La carga es síncrona y puede fallar.
pub trait ModelStore: Send + Sync {
    fn load(&self, model_id: &str) -> Result<Arc<dyn Model>, ModelError>;
}

pub(crate) fn check_input(input: &[f32], shape: [usize; 3]) -> Result<(), ModelError> {
    let expected: usize = shape.iter().product();
    if input.len() != expected {
        return Err(ModelError::InvalidInputSize {
            shape,
            expected,
            actual: input.len(),
        });
    }
    Ok(())
}

/// Sesión ONNX. `Session::run` necesita acceso exclusivo, así que las
/// invocaciones concurrentes se serializan en el mutex.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    pub fn from_file(model_path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let model_path = model_path.as_ref();
        let session = Session::builder()?.commit_from_file(model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or(ModelError::MissingIo { kind: "input" })?;

        let output_name = session
            .outputs
            .iter()
            .find(|output| {
                matches!(
                    output.output_type,
                    ValueType::Tensor {
                        ty: TensorElementType::Float32,
                        ..
                    }
                )
            })
            .or_else(|| session.outputs.first())
            .map(|output| output.name.clone())
            .ok_or(ModelError::MissingIo { kind: "output" })?;

        info!(
            "[ONNX] Modelo cargado: {} (input: {}, output: {})",
            model_path.display(),
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl Model for OnnxModel {
    fn forward(&self, input: &[f32], shape: [usize; 3]) -> Result<Vec<f32>, ModelError> {
        check_input(input, shape)?;

        let input_value = Tensor::from_array((shape.to_vec(), input.to_vec()))?;

        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => &input_value,
        ])?;

        let (_shape, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        Ok(data.to_vec())
    }
}

/// Carga modelos `.onnx` relativos a un directorio
#[derive(Debug, Clone)]
pub struct OnnxModelStore {
    root: PathBuf,
}

impl OnnxModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, model_id: &str) -> PathBuf {
        self.root.join(model_id)
    }
}

impl ModelStore for OnnxModelStore {
    fn load(&self, model_id: &str) -> Result<Arc<dyn Model>, ModelError> {
        let path = self.resolve(model_id);
        if !path.is_file() {
            return Err(ModelError::NotFound(path));
        }
        Ok(Arc::new(OnnxModel::from_file(&path)?))
    }
}

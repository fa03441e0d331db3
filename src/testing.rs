//! Dobles de prueba compartidos por los tests del crate.

use crate::model::{check_input, Model, ModelError, ModelStore};
use crate::sensor_bridge::{SensorBridge, SensorKind, SensorSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Modelo que responde con una salida fija y cuenta invocaciones
pub struct FixedModel {
    output: Vec<f32>,
    pub calls: AtomicUsize,
    pub last_input: Mutex<Option<(Vec<f32>, [usize; 3])>>,
}

impl FixedModel {
    pub fn new(output: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            output,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Model for FixedModel {
    fn forward(&self, input: &[f32], shape: [usize; 3]) -> Result<Vec<f32>, ModelError> {
        check_input(input, shape)?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some((input.to_vec(), shape));
        Ok(self.output.clone())
    }
}

/// Modelo que siempre falla como lo haría el runtime
pub struct FailingModel;

impl Model for FailingModel {
    fn forward(&self, _input: &[f32], _shape: [usize; 3]) -> Result<Vec<f32>, ModelError> {
        Err(ModelError::MissingIo { kind: "output" })
    }
}

/// Almacén en memoria: id -> modelo
#[derive(Default)]
pub struct MemoryStore {
    models: HashMap<String, Arc<dyn Model>>,
    pub loads: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with(mut self, id: &str, model: Arc<dyn Model>) -> Self {
        self.models.insert(id.to_string(), model);
        self
    }
}

impl ModelStore for MemoryStore {
    fn load(&self, model_id: &str) -> Result<Arc<dyn Model>, ModelError> {
        self.loads.lock().unwrap().push(model_id.to_string());
        self.models
            .get(model_id)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(model_id.into()))
    }
}

/// Fuente de sensores manual: guarda el bridge registrado para que el test
/// empuje eventos a mano
#[derive(Default)]
pub struct ManualSource {
    bridge: Mutex<Option<Arc<SensorBridge>>>,
    pub missing: Vec<SensorKind>,
    pub registrations: AtomicUsize,
    pub unregistrations: AtomicUsize,
}

impl ManualSource {
    pub fn with_missing(missing: Vec<SensorKind>) -> Self {
        Self {
            missing,
            ..Self::default()
        }
    }

    pub fn bridge(&self) -> Option<Arc<SensorBridge>> {
        self.bridge.lock().unwrap().clone()
    }
}

impl SensorSource for ManualSource {
    fn register(&self, bridge: Arc<SensorBridge>) -> Vec<SensorKind> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        *self.bridge.lock().unwrap() = Some(bridge);
        self.missing.clone()
    }

    fn unregister(&self) {
        self.unregistrations.fetch_add(1, Ordering::SeqCst);
        *self.bridge.lock().unwrap() = None;
    }
}

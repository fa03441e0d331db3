use crate::types::{SensorSnapshot, NUM_CHANNELS};

/// Buffer circular de 6 canales paralelos (ax, ay, az, gx, gy, gz).
/// El índice i de los 6 canales siempre corresponde al mismo tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    channels: [Vec<f32>; NUM_CHANNELS],
    window_size: usize,
    writes: u64,
}

impl FrameBuffer {
    pub fn new(window_size: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| vec![0.0; window_size]),
            window_size,
            writes: 0,
        }
    }

    /// Guarda los 6 canales de la muestra en `index mod W`
    pub fn write(&mut self, index: usize, snapshot: &SensorSnapshot) {
        let slot = index % self.window_size;
        for (channel, value) in self.channels.iter_mut().zip(snapshot.channels()) {
            channel[slot] = value;
        }
        self.writes += 1;
    }

    /// Copia profunda para consumidores que corren en paralelo a las escrituras
    pub fn snapshot(&self) -> FrameBuffer {
        self.clone()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Total de escrituras desde la creación
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn channel(&self, c: usize) -> &[f32] {
        &self.channels[c]
    }

    /// Aplana en orden canal-mayor, rotando cada canal para que empiece en
    /// `offset`: [offset, W) seguido de [0, offset). Con offset 0 no rota.
    pub fn flatten(&self, offset: usize) -> EstimationWindow {
        let w = self.window_size;
        let offset = offset % w;
        let mut data = Vec::with_capacity(NUM_CHANNELS * w);
        for channel in &self.channels {
            data.extend_from_slice(&channel[offset..]);
            data.extend_from_slice(&channel[..offset]);
        }
        EstimationWindow { data, len: w }
    }

    /// Aplana sólo las primeras `len` muestras de cada canal, sin rotar
    pub fn flatten_prefix(&self, len: usize) -> EstimationWindow {
        let len = len.min(self.window_size);
        let mut data = Vec::with_capacity(NUM_CHANNELS * len);
        for channel in &self.channels {
            data.extend_from_slice(&channel[..len]);
        }
        EstimationWindow { data, len }
    }
}

/// Tensor de entrada [1, 6, len]: el canal c ocupa `c*len .. c*len+len`
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationWindow {
    data: Vec<f32>,
    len: usize,
}

impl EstimationWindow {
    pub fn shape(&self) -> [usize; 3] {
        [1, NUM_CHANNELS, self.len]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn channel(&self, c: usize) -> &[f32] {
        &self.data[c * self.len..(c + 1) * self.len]
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

use candle_core::{Device, Result, Tensor};

/// Device independent observation storage. Environments produce these, the Q-network moves them
/// onto its own device right before the forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsBuffer {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl ObsBuffer {
    pub fn from_vec(data: Vec<f32>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Self {
        Self { data, shape }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_data(self) -> Vec<f32> {
        self.data
    }

    pub fn to_candle_tensor(&self, device: &Device) -> Result<Tensor> {
        Tensor::from_slice(&self.data, self.shape.as_slice(), device)
    }
}

impl From<Vec<f32>> for ObsBuffer {
    fn from(value: Vec<f32>) -> Self {
        Self::from_vec(value)
    }
}

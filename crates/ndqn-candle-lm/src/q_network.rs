use crate::{
    mlp::Mlp,
    optimizer::OptimizerWithMaxGrad,
    tensors::{QValues, TdLoss},
};
use anyhow::{Context, Result, anyhow};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Activation, Module, VarBuilder, VarMap};
use ndqn_core::{error::NdqnError, tensor::ObsBuffer};

pub const HIDDEN_SIZE: usize = 128;
pub const LAYER_PREFIX: &str = "fc";

/// Two affine layers with a ReLU in between, mapping an observation to one value per action.
/// The network owns its parameters and the Adam optimizer bound to them.
#[derive(Debug)]
pub struct QNetwork {
    net: Mlp,
    optimizer: OptimizerWithMaxGrad,
    input_dim: usize,
    n_actions: usize,
    device: Device,
}

impl QNetwork {
    pub fn new(
        input_dim: usize,
        n_actions: usize,
        learning_rate: f64,
        max_grad_norm: Option<f32>,
        device: &Device,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(NdqnError::invalid("input_dim", "must be positive").into());
        }
        if n_actions == 0 {
            return Err(NdqnError::invalid("n_actions", "must be positive").into());
        }
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let net = Mlp::new(
            input_dim,
            &[HIDDEN_SIZE],
            n_actions,
            Activation::Relu,
            &vb,
            LAYER_PREFIX,
        )?;
        let optimizer = OptimizerWithMaxGrad::adam(varmap, learning_rate, max_grad_norm)?;
        Ok(Self {
            net,
            optimizer,
            input_dim,
            n_actions,
            device: device.clone(),
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    /// Moves the observation onto the network's device as a batch of one, shape
    /// `(1, input_dim)`. candle's `Linear` only multiplies rank 2 or higher inputs.
    pub fn observation_tensor(&self, observation: &ObsBuffer) -> Result<Tensor> {
        if observation.len() != self.input_dim {
            return Err(NdqnError::ObservationSize {
                expected: self.input_dim,
                actual: observation.len(),
            }
            .into());
        }
        Ok(observation
            .to_candle_tensor(&self.device)?
            .reshape((1, self.input_dim))?)
    }

    pub fn q_values(&self, observation: &ObsBuffer) -> Result<QValues> {
        let xs = self.observation_tensor(observation)?;
        Ok(QValues(self.forward(&xs)?.squeeze(0)?))
    }

    pub fn q_values_vec(&self, observation: &ObsBuffer) -> Result<Vec<f32>> {
        Ok(self.q_values(observation)?.to_vec1()?)
    }

    /// One backward pass and one optimizer step.
    pub fn optimize(&mut self, loss: &TdLoss) -> Result<()> {
        self.optimizer.backward_step(loss)?;
        Ok(())
    }

    /// Number of scalar parameters. Fixed at construction.
    pub fn parameter_count(&self) -> usize {
        self.optimizer
            .varmap
            .all_vars()
            .iter()
            .map(|var| var.elem_count())
            .sum()
    }

    /// Parameter names with their shapes, sorted by name.
    pub fn parameter_shapes(&self) -> Result<Vec<(String, Vec<usize>)>> {
        let data = self
            .optimizer
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("q-network parameters are poisoned"))?;
        let mut shapes: Vec<(String, Vec<usize>)> = data
            .iter()
            .map(|(name, var)| (name.clone(), var.dims().to_vec()))
            .collect();
        shapes.sort();
        Ok(shapes)
    }

    /// Current value of a parameter, e.g. `fc2.bias`.
    pub fn parameter(&self, name: &str) -> Result<Tensor> {
        let data = self
            .optimizer
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("q-network parameters are poisoned"))?;
        let var = data
            .get(name)
            .with_context(|| format!("no q-network parameter named `{name}`"))?;
        Ok(var.as_tensor().copy()?)
    }

    /// Overwrites a parameter in place, e.g. `fc2.bias`. The optimizer keeps tracking it.
    pub fn set_parameter(&mut self, name: &str, value: &Tensor) -> Result<()> {
        let value = value.to_device(&self.device)?;
        self.optimizer
            .varmap
            .set_one(name, &value)
            .with_context(|| format!("failed to set q-network parameter `{name}`"))
    }
}

impl Module for QNetwork {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        self.net.forward(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_has_one_value_per_action() -> Result<()> {
        let q = QNetwork::new(4, 3, 1e-3, None, &Device::Cpu)?;
        let obs = ObsBuffer::from_vec(vec![0.1, -0.2, 0.3, 0.0]);
        assert_eq!(q.q_values_vec(&obs)?.len(), 3);
        let names: Vec<&str> = q.net.layers().map(|l| l.name()).collect();
        assert_eq!(names, vec!["fc1", "fc2"]);
        let batch = Tensor::zeros((8, 4), DType::F32, &Device::Cpu)?;
        assert_eq!(q.forward(&batch)?.dims(), &[8, 3]);
        Ok(())
    }

    #[test]
    fn parameter_layout() -> Result<()> {
        let q = QNetwork::new(4, 2, 1e-3, None, &Device::Cpu)?;
        assert_eq!(q.parameter_count(), 4 * 128 + 128 + 128 * 2 + 2);
        let shapes = q.parameter_shapes()?;
        assert_eq!(
            shapes,
            vec![
                ("fc1.bias".to_owned(), vec![128]),
                ("fc1.weight".to_owned(), vec![128, 4]),
                ("fc2.bias".to_owned(), vec![2]),
                ("fc2.weight".to_owned(), vec![2, 128]),
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_wrong_observation_size() -> Result<()> {
        let q = QNetwork::new(4, 2, 1e-3, None, &Device::Cpu)?;
        let err = q
            .q_values_vec(&ObsBuffer::from_vec(vec![1., 2.]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NdqnError>(),
            Some(NdqnError::ObservationSize {
                expected: 4,
                actual: 2
            })
        ));
        Ok(())
    }

    #[test]
    fn pinned_parameters_change_the_output() -> Result<()> {
        let mut q = QNetwork::new(4, 2, 1e-3, None, &Device::Cpu)?;
        q.set_parameter("fc2.weight", &Tensor::zeros((2, 128), DType::F32, &Device::Cpu)?)?;
        q.set_parameter("fc2.bias", &Tensor::new(&[0.25f32, -1.5], &Device::Cpu)?)?;
        let values = q.q_values_vec(&ObsBuffer::from_vec(vec![0.3, 0.1, -0.4, 2.0]))?;
        assert_eq!(values, vec![0.25, -1.5]);
        assert_eq!(q.parameter("fc2.bias")?.to_vec1::<f32>()?, vec![0.25, -1.5]);
        assert!(q.parameter("fc3.bias").is_err());
        Ok(())
    }
}

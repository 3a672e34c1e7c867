use anyhow::Result;
use ndqn_agents::dqn::{DqnParams, NaiveDqn};
use ndqn_candle_lm::{device::DeviceKind, q_network::QNetwork};
use ndqn_core::{env::EnvironmentDescription, error::NdqnError};

pub struct DqnBuilder {
    pub learning_rate: f64,
    pub max_grad_norm: Option<f32>,
    pub device: DeviceKind,
    pub params: DqnParams,
    /// Seed of the agent's exploration RNG, `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for DqnBuilder {
    fn default() -> Self {
        DqnBuilder {
            learning_rate: 1e-4,
            max_grad_norm: None,
            device: DeviceKind::Auto,
            params: DqnParams::default(),
            seed: None,
        }
    }
}

impl DqnBuilder {
    pub fn build(&self, env_description: &EnvironmentDescription) -> Result<NaiveDqn> {
        if !(self.learning_rate > 0. && self.learning_rate.is_finite()) {
            return Err(NdqnError::invalid(
                "learning_rate",
                format!("{} is not a positive number", self.learning_rate),
            )
            .into());
        }
        if let Some(max_norm) = self.max_grad_norm {
            if !(max_norm > 0.) {
                return Err(NdqnError::invalid(
                    "max_grad_norm",
                    format!("{max_norm} is not positive"),
                )
                .into());
            }
        }
        let device = self.device.select()?;
        let q = QNetwork::new(
            env_description.observation_size(),
            env_description.n_actions()?,
            self.learning_rate,
            self.max_grad_norm,
            &device,
        )?;
        NaiveDqn::new(q, self.params, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::DqnBuilder;
    use ndqn_candle_lm::device::DeviceKind;
    use ndqn_core::env::{Env, EnvironmentDescription, Space, cartpole::CartPole};

    #[test]
    fn builds_for_cartpole() -> anyhow::Result<()> {
        let builder = DqnBuilder {
            device: DeviceKind::Cpu,
            ..DqnBuilder::default()
        };
        let dqn = builder.build(&CartPole::default().env_description())?;
        assert_eq!(dqn.n_actions(), 2);
        assert_eq!(dqn.q_network().input_dim(), 4);
        assert_eq!(dqn.epsilon(), 1.0);
        assert_eq!(dqn.q_network().learning_rate(), 1e-4);
        Ok(())
    }

    #[test]
    fn rejects_bad_configuration() {
        let description = CartPole::default().env_description();
        let builder = DqnBuilder {
            learning_rate: 0.,
            device: DeviceKind::Cpu,
            ..DqnBuilder::default()
        };
        assert!(builder.build(&description).is_err());

        let continuous = EnvironmentDescription::new(
            Space::continuous_from_dims(vec![3]),
            Space::continuous_from_dims(vec![1]),
        );
        let builder = DqnBuilder {
            device: DeviceKind::Cpu,
            ..DqnBuilder::default()
        };
        assert!(builder.build(&continuous).is_err());
    }
}

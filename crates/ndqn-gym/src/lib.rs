use anyhow::Result;
use ndqn_core::{
    env::{Env, EnvironmentDescription, SnapShot, Space},
    error::NdqnError,
    tensor::ObsBuffer,
};
use pyo3::{
    PyObject, PyResult, Python,
    types::{PyAnyMethods, PyDict},
};
use tracing::debug;

/// A gymnasium environment driven through the embedded python interpreter. Only discrete action
/// spaces are accepted, a Q-network has to enumerate its actions.
pub struct GymEnv {
    env: PyObject,
    n_actions: usize,
    observation_space: Space,
}

impl GymEnv {
    pub fn new(name: &str, render_mode: Option<String>) -> Result<GymEnv> {
        let (env, action_space, observation_space) = Python::with_gil(|py| {
            let gym = py.import("gymnasium")?;
            let kwargs = PyDict::new(py);
            if let Some(render_mode) = render_mode {
                kwargs.set_item("render_mode", render_mode)?;
            }
            let make = gym.getattr("make")?;
            let env = make.call((name,), Some(&kwargs))?;
            let action_space = env.getattr("action_space")?;
            let gym_spaces = py.import("gymnasium.spaces")?;
            let action_space = if action_space.is_instance(&gym_spaces.getattr("Discrete")?)? {
                let n: usize = action_space.getattr("n")?.extract()?;
                Some(n)
            } else {
                None
            };
            let observation_space = env.getattr("observation_space")?;
            let low: Vec<f32> = observation_space
                .getattr("low")?
                .call_method0("flatten")?
                .extract()?;
            let high: Vec<f32> = observation_space
                .getattr("high")?
                .call_method0("flatten")?
                .extract()?;
            let shape: Vec<usize> = observation_space.getattr("shape")?.extract()?;
            let size = shape.iter().product();
            let observation_space = Space::Continuous {
                min: Some(ObsBuffer::new(low, shape.clone())),
                max: Some(ObsBuffer::new(high, shape)),
                size,
            };
            PyResult::Ok((env.unbind(), action_space, observation_space))
        })?;
        let Some(n_actions) = action_space else {
            return Err(NdqnError::UnsupportedSpace(format!(
                "{name} does not have a discrete action space"
            ))
            .into());
        };
        debug!(
            name,
            n_actions,
            observation_size = observation_space.size(),
            "created gym env"
        );
        Ok(GymEnv {
            env,
            n_actions,
            observation_space,
        })
    }

    pub fn close(&self) -> Result<()> {
        Python::with_gil(|py| self.env.call_method0(py, "close").map(|_| ()))?;
        Ok(())
    }
}

impl Env for GymEnv {
    fn reset(&mut self, seed: u64) -> Result<ObsBuffer> {
        let state = Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("seed", seed)?;
            let reset = self.env.call_method(py, "reset", (), Some(&kwargs))?;
            let state: Vec<f32> = reset.bind(py).get_item(0)?.extract()?;
            PyResult::Ok(ObsBuffer::from_vec(state))
        })?;
        Ok(state)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        if action >= self.n_actions {
            return Err(NdqnError::ActionOutOfRange {
                action,
                n_actions: self.n_actions,
            }
            .into());
        }
        let snapshot = Python::with_gil(|py| {
            let step = self.env.call_method(py, "step", (action,), None)?;
            let step = step.bind(py);
            let next_state: Vec<f32> = step.get_item(0)?.extract()?;
            let reward: f32 = step.get_item(1)?.extract()?;
            let terminated: bool = step.get_item(2)?.extract()?;
            let truncated: bool = step.get_item(3)?.extract()?;
            PyResult::Ok(SnapShot {
                state: ObsBuffer::from_vec(next_state),
                reward,
                terminated,
                truncated,
            })
        })?;
        Ok(snapshot)
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(
            self.observation_space.clone(),
            Space::Discrete(self.n_actions),
        )
    }
}

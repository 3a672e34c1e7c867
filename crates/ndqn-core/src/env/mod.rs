pub mod cartpole;

use crate::{error::NdqnError, tensor::ObsBuffer};
use anyhow::Result;

#[derive(Debug, Clone)]
pub enum Space {
    Discrete(usize),
    Continuous {
        min: Option<ObsBuffer>,
        max: Option<ObsBuffer>,
        size: usize,
    },
}

impl Space {
    pub fn continuous_from_dims(dims: Vec<usize>) -> Self {
        Self::Continuous {
            min: None,
            max: None,
            size: dims.iter().product(),
        }
    }

    pub fn size(&self) -> usize {
        match &self {
            Self::Discrete(size) => *size,
            Self::Continuous { size, .. } => *size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentDescription {
    pub observation_space: Space,
    pub action_space: Space,
}

impl EnvironmentDescription {
    pub fn new(observation_space: Space, action_space: Space) -> Self {
        Self {
            observation_space,
            action_space,
        }
    }

    pub fn observation_size(&self) -> usize {
        self.observation_space.size()
    }

    /// Number of discrete actions. Q-learning needs an enumerable action set, so continuous
    /// action spaces are rejected here.
    pub fn n_actions(&self) -> Result<usize> {
        match &self.action_space {
            Space::Discrete(n) => Ok(*n),
            Space::Continuous { .. } => Err(NdqnError::UnsupportedSpace(
                "continuous action spaces cannot be enumerated by a Q-network".to_owned(),
            )
            .into()),
        }
    }
}

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct SnapShot {
    pub state: ObsBuffer,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
}

impl SnapShot {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// One environment transition. Used for exactly one update and dropped afterwards.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ObsBuffer,
    pub action: usize,
    pub reward: f32,
    pub next_state: ObsBuffer,
}

pub trait Env {
    fn reset(&mut self, seed: u64) -> Result<ObsBuffer>;
    fn step(&mut self, action: usize) -> Result<SnapShot>;
    fn env_description(&self) -> EnvironmentDescription;
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn reset(&mut self, seed: u64) -> Result<ObsBuffer> {
        (**self).reset(seed)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        (**self).step(action)
    }

    fn env_description(&self) -> EnvironmentDescription {
        (**self).env_description()
    }
}

use crate::{env::Transition, tensor::ObsBuffer};
use anyhow::Result;

/// An online value-based agent: picks actions for observations and learns from single transitions.
pub trait Agent {
    /// Selects an action for the observation. May consume randomness, never touches the weights.
    fn choose_action(&mut self, observation: &ObsBuffer) -> Result<usize>;

    /// Performs exactly one update from the transition, returns the loss of that update.
    fn learn(&mut self, transition: Transition) -> Result<f32>;

    /// Current probability of taking a random action.
    fn exploration_rate(&self) -> f64;
}

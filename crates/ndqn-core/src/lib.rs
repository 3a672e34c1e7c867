pub mod agents;
pub mod env;
pub mod error;
pub mod rng;
pub mod tensor;

use anyhow::Result;

/// A learning algorithm. `Trainer` in `ndqn-api` is the only implementor, it drives an agent
/// against an environment for a fixed number of episodes.
pub trait Algorithm {
    type Report;

    fn train(&mut self) -> Result<Self::Report>;
}

use anyhow::Result;
use ndqn_core::error::NdqnError;
use rand::Rng;

/// Epsilon-greedy exploration with a linear, floored decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
    eps_dec: f64,
    eps_min: f64,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, eps_dec: f64, eps_min: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&eps_min) {
            return Err(NdqnError::invalid("eps_min", format!("{eps_min} is not in [0, 1]")).into());
        }
        if !(eps_min..=1.0).contains(&epsilon) {
            return Err(NdqnError::invalid(
                "epsilon",
                format!("{epsilon} is not in [eps_min = {eps_min}, 1]"),
            )
            .into());
        }
        if !(eps_dec >= 0.0 && eps_dec.is_finite()) {
            return Err(NdqnError::invalid(
                "eps_dec",
                format!("{eps_dec} is not a finite non-negative number"),
            )
            .into());
        }
        Ok(Self {
            epsilon,
            eps_dec,
            eps_min,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Overrides epsilon, clamped into `[eps_min, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(self.eps_min, 1.0);
    }

    pub fn decrement(&mut self) {
        if self.epsilon - self.eps_dec > self.eps_min {
            self.epsilon -= self.eps_dec;
        } else {
            self.epsilon = self.eps_min;
        }
    }

    /// Whether the next action should be random. Never true at epsilon 0, always true at 1.
    pub fn explore<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.random::<f64>() < self.epsilon
    }
}

use crate::exploration::EpsilonGreedy;
use anyhow::Result;
use candle_nn::loss::mse;
use ndqn_candle_lm::{
    q_network::QNetwork,
    tensors::{TdLoss, TdTarget},
};
use ndqn_core::{
    agents::Agent, env::Transition, error::NdqnError, rng::seeded_rng, tensor::ObsBuffer,
};
use rand::{Rng, rngs::StdRng};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DqnParams {
    pub gamma: f64,
    pub epsilon: f64,
    pub eps_dec: f64,
    pub eps_min: f64,
}

impl Default for DqnParams {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            epsilon: 1.0,
            eps_dec: 1e-5,
            eps_min: 0.01,
        }
    }
}

/// Index of the first maximum. NaNs never win.
pub fn argmax(values: &[f32]) -> usize {
    let mut best_idx = 0;
    let mut best = f32::NEG_INFINITY;
    for (idx, value) in values.iter().enumerate() {
        if *value > best {
            best = *value;
            best_idx = idx;
        }
    }
    best_idx
}

/// Online deep Q-learning: one transition, one gradient step. The same network produces both the
/// prediction and the (detached) bootstrap target, there is no replay buffer and no target
/// network.
#[derive(Debug)]
pub struct NaiveDqn {
    q: QNetwork,
    exploration: EpsilonGreedy,
    gamma: f64,
    rng: StdRng,
}

impl NaiveDqn {
    pub fn new(q: QNetwork, params: DqnParams, seed: Option<u64>) -> Result<Self> {
        let DqnParams {
            gamma,
            epsilon,
            eps_dec,
            eps_min,
        } = params;
        if !(0.0..=1.0).contains(&gamma) {
            return Err(NdqnError::invalid("gamma", format!("{gamma} is not in [0, 1]")).into());
        }
        let exploration = EpsilonGreedy::new(epsilon, eps_dec, eps_min)?;
        Ok(Self {
            q,
            exploration,
            gamma,
            rng: seeded_rng(seed),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    pub fn n_actions(&self) -> usize {
        self.q.n_actions()
    }

    pub fn q_network(&self) -> &QNetwork {
        &self.q
    }

    pub fn q_network_mut(&mut self) -> &mut QNetwork {
        &mut self.q
    }

    /// Action with the highest estimated value, ties go to the lowest index.
    pub fn greedy_action(&self, observation: &ObsBuffer) -> Result<usize> {
        let values = self.q.q_values_vec(observation)?;
        Ok(argmax(&values))
    }

    /// Squared error between `Q(state)[action]` and `reward + gamma * max_a Q(next_state, a)`.
    /// The bootstrap term is detached so only the prediction is differentiated.
    pub fn td_loss(
        &self,
        state: &ObsBuffer,
        action: usize,
        reward: f32,
        next_state: &ObsBuffer,
    ) -> Result<TdLoss> {
        let n_actions = self.n_actions();
        if action >= n_actions {
            return Err(NdqnError::ActionOutOfRange { action, n_actions }.into());
        }
        let q_pred = self.q.q_values(state)?.narrow(0, action, 1)?;
        let q_next = self.q.q_values(next_state)?.max_keepdim(0)?.detach();
        let q_target = TdTarget(q_next.affine(self.gamma, reward as f64)?);
        Ok(TdLoss(mse(&q_pred, &q_target)?))
    }
}

impl Agent for NaiveDqn {
    fn choose_action(&mut self, observation: &ObsBuffer) -> Result<usize> {
        if self.exploration.explore(&mut self.rng) {
            let n_actions = self.n_actions();
            Ok(self.rng.random_range(0..n_actions))
        } else {
            self.greedy_action(observation)
        }
    }

    fn learn(&mut self, transition: Transition) -> Result<f32> {
        let Transition {
            state,
            action,
            reward,
            next_state,
        } = transition;
        let loss = self.td_loss(&state, action, reward, &next_state)?;
        self.q.optimize(&loss)?;
        self.exploration.decrement();
        let loss = loss.to_scalar::<f32>()?;
        trace!(loss, epsilon = self.epsilon(), "td update");
        Ok(loss)
    }

    fn exploration_rate(&self) -> f64 {
        self.epsilon()
    }
}

#[cfg(test)]
mod tests {
    use super::argmax;

    #[test]
    fn argmax_prefers_the_first_maximum() {
        assert_eq!(argmax(&[0.5, 2.0, 2.0, -1.0]), 1);
        assert_eq!(argmax(&[3.0, 3.0]), 0);
        assert_eq!(argmax(&[f32::NAN, 1.0]), 1);
        assert_eq!(argmax(&[-5.0]), 0);
    }
}

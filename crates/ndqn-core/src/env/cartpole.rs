//! Native cart-pole environment with the dynamics of gymnasium's `CartPole-v1`. Fully
//! deterministic for a given reset seed, which the python environment cannot guarantee across
//! gymnasium releases.

use super::{Env, EnvironmentDescription, SnapShot, Space};
use crate::{error::NdqnError, rng::seeded_rng, tensor::ObsBuffer};
use anyhow::Result;
use rand::Rng;

const GRAVITY: f64 = 9.8;
const MASS_CART: f64 = 1.0;
const MASS_POLE: f64 = 0.1;
const TOTAL_MASS: f64 = MASS_CART + MASS_POLE;
// half the pole's length
const LENGTH: f64 = 0.5;
const POLE_MASS_LENGTH: f64 = MASS_POLE * LENGTH;
const FORCE_MAG: f64 = 10.0;
const TAU: f64 = 0.02;
const X_THRESHOLD: f64 = 2.4;
const THETA_THRESHOLD_RADIANS: f64 = 12.0 * 2.0 * std::f64::consts::PI / 360.0;
const RESET_BOUND: f64 = 0.05;

pub const N_ACTIONS: usize = 2;
pub const OBSERVATION_SIZE: usize = 4;
pub const DEFAULT_MAX_EPISODE_STEPS: usize = 500;

#[derive(Debug, Clone)]
pub struct CartPole {
    // x, x_dot, theta, theta_dot
    state: [f64; 4],
    elapsed_steps: usize,
    max_episode_steps: usize,
    finished: bool,
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EPISODE_STEPS)
    }
}

impl CartPole {
    pub fn new(max_episode_steps: usize) -> Self {
        Self {
            state: [0.; 4],
            elapsed_steps: 0,
            max_episode_steps,
            // step before the first reset is not allowed
            finished: true,
        }
    }

    fn observation(&self) -> ObsBuffer {
        ObsBuffer::from_vec(self.state.iter().map(|s| *s as f32).collect())
    }
}

impl Env for CartPole {
    fn reset(&mut self, seed: u64) -> Result<ObsBuffer> {
        let mut rng = seeded_rng(Some(seed));
        for s in self.state.iter_mut() {
            *s = rng.random_range(-RESET_BOUND..RESET_BOUND);
        }
        self.elapsed_steps = 0;
        self.finished = false;
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<SnapShot> {
        if action >= N_ACTIONS {
            return Err(NdqnError::ActionOutOfRange {
                action,
                n_actions: N_ACTIONS,
            }
            .into());
        }
        if self.finished {
            return Err(NdqnError::EpisodeFinished.into());
        }
        let [x, x_dot, theta, theta_dot] = self.state;
        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let (sin_theta, cos_theta) = theta.sin_cos();
        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // explicit euler, same ordering as gymnasium
        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.elapsed_steps += 1;

        let [x, _, theta, _] = self.state;
        let terminated = !(-X_THRESHOLD..=X_THRESHOLD).contains(&x)
            || !(-THETA_THRESHOLD_RADIANS..=THETA_THRESHOLD_RADIANS).contains(&theta);
        let truncated = self.elapsed_steps >= self.max_episode_steps;
        self.finished = terminated || truncated;
        Ok(SnapShot {
            state: self.observation(),
            reward: 1.0,
            terminated,
            truncated,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        let high = vec![
            (X_THRESHOLD * 2.0) as f32,
            f32::MAX,
            (THETA_THRESHOLD_RADIANS * 2.0) as f32,
            f32::MAX,
        ];
        let low = high.iter().map(|h| -h).collect();
        EnvironmentDescription::new(
            Space::Continuous {
                min: Some(ObsBuffer::from_vec(low)),
                max: Some(ObsBuffer::from_vec(high)),
                size: OBSERVATION_SIZE,
            },
            Space::Discrete(N_ACTIONS),
        )
    }
}

use crate::{
    hooks::{DefaultTrainingHooks, TrainingHooks},
    trainer::Trainer,
};
use anyhow::Result;
use ndqn_core::{agents::Agent, env::Env, error::NdqnError};
use rand::random;
use std::path::PathBuf;

pub struct TrainerBuilder {
    pub n_games: usize,
    pub log_every: usize,
    pub average_window: usize,
    /// Base environment seed, `None` draws one at build time.
    pub seed: Option<u64>,
    pub max_episode_steps: Option<usize>,
    pub plot_path: Option<PathBuf>,
    pub target_score: Option<f32>,
}

impl Default for TrainerBuilder {
    fn default() -> Self {
        TrainerBuilder {
            n_games: 10000,
            log_every: 100,
            average_window: 100,
            seed: None,
            max_episode_steps: None,
            plot_path: Some(PathBuf::from("cartpole_naive_dqn.png")),
            target_score: None,
        }
    }
}

impl TrainerBuilder {
    pub fn set_n_games(&mut self, n_games: usize) {
        self.n_games = n_games;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    pub fn disable_plot(&mut self) {
        self.plot_path = None;
    }

    pub fn build<E: Env, A: Agent>(
        &self,
        env: E,
        agent: A,
    ) -> Result<Trainer<E, A, DefaultTrainingHooks>> {
        let hooks = DefaultTrainingHooks::new(self.log_every, self.target_score);
        self.build_with_hooks(env, agent, hooks)
    }

    pub fn build_with_hooks<E: Env, A: Agent, H: TrainingHooks>(
        &self,
        env: E,
        agent: A,
        hooks: H,
    ) -> Result<Trainer<E, A, H>> {
        if self.n_games == 0 {
            return Err(NdqnError::invalid("n_games", "must be positive").into());
        }
        if self.average_window == 0 {
            return Err(NdqnError::invalid("average_window", "must be positive").into());
        }
        if self.max_episode_steps == Some(0) {
            return Err(NdqnError::invalid("max_episode_steps", "must be positive").into());
        }
        Ok(Trainer {
            env,
            agent,
            hooks,
            n_games: self.n_games,
            average_window: self.average_window,
            seed: self.seed.unwrap_or_else(random),
            max_episode_steps: self.max_episode_steps,
            plot_path: self.plot_path.clone(),
        })
    }
}

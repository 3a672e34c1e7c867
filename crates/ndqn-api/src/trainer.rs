use crate::{
    hooks::{EpisodeStats, TrainingHooks},
    plot::plot_learning_curve,
    utils::stats::moving_average,
};
use anyhow::{Context, Result};
use ndqn_core::{
    Algorithm,
    agents::Agent,
    env::{Env, SnapShot, Transition},
};
use std::path::PathBuf;
use tracing::info;

macro_rules! break_on_hook_res {
    ($hook_res:expr) => {
        if $hook_res {
            break;
        }
    };
}

/// Per-episode history of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub scores: Vec<f32>,
    /// Epsilon at the end of each episode.
    pub eps_history: Vec<f64>,
    /// Mean TD loss of each episode.
    pub losses: Vec<f32>,
}

impl TrainingReport {
    /// 1-based episode numbers, the x axis of the learning curve.
    pub fn episodes(&self) -> Vec<usize> {
        (1..=self.scores.len()).collect()
    }
}

/// Runs `n_games` episodes, learning online from every single transition.
pub struct Trainer<E: Env, A: Agent, H: TrainingHooks> {
    pub env: E,
    pub agent: A,
    pub hooks: H,
    pub n_games: usize,
    pub average_window: usize,
    /// Episode `i` resets the environment with `seed + i`.
    pub seed: u64,
    pub max_episode_steps: Option<usize>,
    pub plot_path: Option<PathBuf>,
}

impl<E: Env, A: Agent, H: TrainingHooks> Trainer<E, A, H> {
    /// Plays one episode to its end, returns `(score, steps, mean loss)`.
    pub fn run_episode(&mut self, seed: u64) -> Result<(f32, usize, f32)> {
        let mut observation = self.env.reset(seed)?;
        let mut score = 0.;
        let mut loss_sum = 0.;
        let mut steps = 0;
        loop {
            let action = self.agent.choose_action(&observation)?;
            let snapshot = self.env.step(action)?;
            let done = snapshot.done();
            let SnapShot {
                state: next_state,
                reward,
                ..
            } = snapshot;
            loss_sum += self.agent.learn(Transition {
                state: observation,
                action,
                reward,
                next_state: next_state.clone(),
            })?;
            observation = next_state;
            score += reward;
            steps += 1;
            if done || self.max_episode_steps.is_some_and(|max| steps >= max) {
                break;
            }
        }
        Ok((score, steps, loss_sum / steps as f32))
    }
}

impl<E: Env, A: Agent, H: TrainingHooks> Algorithm for Trainer<E, A, H> {
    type Report = TrainingReport;

    fn train(&mut self) -> Result<TrainingReport> {
        let mut report = TrainingReport::default();
        if self.hooks.init_hook() {
            return Ok(report);
        }
        for episode in 0..self.n_games {
            let seed = self.seed.wrapping_add(episode as u64);
            let (score, steps, mean_loss) = self
                .run_episode(seed)
                .with_context(|| format!("episode {episode} failed"))?;
            let epsilon = self.agent.exploration_rate();
            report.scores.push(score);
            report.eps_history.push(epsilon);
            report.losses.push(mean_loss);
            let stats = EpisodeStats {
                episode,
                score,
                steps,
                epsilon,
                avg_score: moving_average(&report.scores, self.average_window),
                mean_loss,
            };
            break_on_hook_res!(self.hooks.post_episode_hook(&stats));
        }
        self.hooks.shutdown_hook(&report)?;
        if let Some(path) = &self.plot_path {
            plot_learning_curve(
                path,
                &report.episodes(),
                &report.scores,
                &report.eps_history,
                self.average_window,
            )
            .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "learning curve written");
        }
        Ok(report)
    }
}

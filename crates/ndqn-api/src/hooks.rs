use crate::trainer::TrainingReport;
use anyhow::Result;
use tracing::{debug, info};

/// Summary of one finished episode, handed to the hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub episode: usize,
    pub score: f32,
    pub steps: usize,
    pub epsilon: f64,
    /// Mean return over the trailing averaging window, this episode included.
    pub avg_score: f32,
    pub mean_loss: f32,
}

/// Callbacks around the training loop. Hooks returning `true` stop training early.
pub trait TrainingHooks {
    fn init_hook(&mut self) -> bool {
        false
    }

    fn post_episode_hook(&mut self, stats: &EpisodeStats) -> bool;

    fn shutdown_hook(&mut self, _report: &TrainingReport) -> Result<()> {
        Ok(())
    }
}

/// Logs progress every `log_every` episodes and optionally stops once the average score reaches
/// `target_score`.
#[derive(Debug, Clone)]
pub struct DefaultTrainingHooks {
    pub log_every: usize,
    pub target_score: Option<f32>,
}

impl DefaultTrainingHooks {
    pub fn new(log_every: usize, target_score: Option<f32>) -> Self {
        Self {
            log_every,
            target_score,
        }
    }

    /// Episodes are counted from 0, so the very first one is always reported. `log_every == 0`
    /// silences progress lines.
    pub fn should_log(&self, episode: usize) -> bool {
        self.log_every > 0 && episode % self.log_every == 0
    }

    pub fn progress_line(stats: &EpisodeStats) -> String {
        format!(
            "Episode: {}\tScore: {:.1}\tAvg Score: {:.1}\tEpsilon: {:.2}",
            stats.episode, stats.score, stats.avg_score, stats.epsilon
        )
    }
}

impl TrainingHooks for DefaultTrainingHooks {
    fn post_episode_hook(&mut self, stats: &EpisodeStats) -> bool {
        if self.should_log(stats.episode) {
            info!("{}", Self::progress_line(stats));
        }
        debug!(
            episode = stats.episode,
            steps = stats.steps,
            mean_loss = stats.mean_loss,
            "episode finished"
        );
        match self.target_score {
            Some(target) if stats.avg_score >= target => {
                info!(
                    episode = stats.episode,
                    avg_score = stats.avg_score,
                    "target score reached, stopping"
                );
                true
            }
            _ => false,
        }
    }

    fn shutdown_hook(&mut self, report: &TrainingReport) -> Result<()> {
        info!(
            episodes = report.scores.len(),
            final_epsilon = report.eps_history.last().copied().unwrap_or_default(),
            "training finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(episode: usize, avg_score: f32) -> EpisodeStats {
        EpisodeStats {
            episode,
            score: 12.0,
            steps: 12,
            epsilon: 0.987654,
            avg_score,
            mean_loss: 0.3,
        }
    }

    #[test]
    fn logs_every_nth_episode_from_zero() {
        let hooks = DefaultTrainingHooks::new(100, None);
        let logged: Vec<usize> = (0..350).filter(|e| hooks.should_log(*e)).collect();
        assert_eq!(logged, vec![0, 100, 200, 300]);
        let silent = DefaultTrainingHooks::new(0, None);
        assert!(!(0..10).any(|e| silent.should_log(e)));
    }

    #[test]
    fn progress_line_format() {
        assert_eq!(
            DefaultTrainingHooks::progress_line(&stats(200, 21.456)),
            "Episode: 200\tScore: 12.0\tAvg Score: 21.5\tEpsilon: 0.99"
        );
    }

    #[test]
    fn stops_once_the_average_reaches_the_target() {
        let mut hooks = DefaultTrainingHooks::new(100, Some(195.0));
        assert!(!hooks.post_episode_hook(&stats(3, 194.9)));
        assert!(hooks.post_episode_hook(&stats(4, 195.0)));
        let mut unbounded = DefaultTrainingHooks::new(100, None);
        assert!(!unbounded.post_episode_hook(&stats(5, 1e6)));
    }
}

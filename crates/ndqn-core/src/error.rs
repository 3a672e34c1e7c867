use thiserror::Error;

#[derive(Debug, Error)]
pub enum NdqnError {
    #[error("invalid hyperparameter `{name}`: {reason}")]
    InvalidHyperparameter { name: &'static str, reason: String },

    #[error("action {action} is out of range for an action space of size {n_actions}")]
    ActionOutOfRange { action: usize, n_actions: usize },

    #[error("expected an observation of size {expected}, got {actual}")]
    ObservationSize { expected: usize, actual: usize },

    #[error("unsupported space: {0}")]
    UnsupportedSpace(String),

    #[error("step called on a finished episode, reset the environment first")]
    EpisodeFinished,
}

impl NdqnError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidHyperparameter {
            name,
            reason: reason.into(),
        }
    }
}

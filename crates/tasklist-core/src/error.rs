use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("no task is being edited")]
    NotEditing,
    #[error("finish or cancel the current edit before creating a task")]
    EditInProgress,
}

/// Failure of a single sync attempt. Every variant leaves the store exactly
/// as it was before the attempt.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task not found: {0}")]
    UnknownTask(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid task JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True when the server was reached or the network was attempted.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_)
        )
    }
}

//! Error handling for the INNOFarms planting client
//!
//! Three kinds of failure reach the operator: validation errors caught before
//! any request, transport errors from the network or a non-2xx response, and
//! server rejections carried inside a successful envelope. None of them are
//! fatal; the workflow stays interactive so the operator can retry.

use innofarms_shared::{SelectionError, ValidationError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client-side checks
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("No planting workflow is open")]
    WorkflowClosed,

    #[error("A planting submission is already in progress")]
    SubmissionInProgress,

    #[error("A shelf allocation save is already in progress")]
    SaveInProgress,

    // Backend errors
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    ServerRejection { status_code: u16, message: String },

    // Local errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Client state error: {0}")]
    State(String),
}

impl AppError {
    /// Text shown to the operator
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the error came from the backend rather than a local check
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Transport { .. } | AppError::ServerRejection { .. }
        )
    }

    /// Whether re-invoking the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        self.is_remote()
            || matches!(
                self,
                AppError::SubmissionInProgress | AppError::SaveInProgress
            )
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, AppError>;

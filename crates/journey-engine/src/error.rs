//! Engine error types
//!
//! Nothing the player does at runtime is fatal; these errors cover opening a
//! player and talking to one that has already shut down.

use journey_common::AppError;
use journey_core::DomainError;
use std::fmt;

/// Player-level error type
#[derive(Debug)]
pub enum EngineError {
    /// Domain rule violation or collaborator failure
    Domain(DomainError),

    /// Application error (config, I/O, decoding)
    App(AppError),

    /// The player loop has exited and no longer accepts commands
    PlayerClosed,

    /// Internal error
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::PlayerClosed => f.write_str("Player is closed"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl EngineError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for logs and host notifications
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::PlayerClosed => "PLAYER_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for EngineError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

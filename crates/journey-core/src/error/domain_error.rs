//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{GroupId, ItemId};

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Story group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Story item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Nothing to show: the story queue is empty")]
    EmptyQueue,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown reaction kind: {0}")]
    InvalidReaction(String),

    // =========================================================================
    // Remote Collaborator Errors
    // =========================================================================
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    #[error("Remote call timed out")]
    Timeout,

    #[error("Rejected by the backend: {0}")]
    Rejected(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Data source error: {0}")]
    SourceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for host-facing notifications
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::GroupNotFound(_) => "UNKNOWN_GROUP",
            Self::ItemNotFound(_) => "UNKNOWN_ITEM",
            Self::EmptyQueue => "EMPTY_QUEUE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidReaction(_) => "INVALID_REACTION",

            // Remote
            Self::RemoteCall(_) => "REMOTE_CALL_FAILED",
            Self::Timeout => "REMOTE_TIMEOUT",
            Self::Rejected(_) => "REJECTED",

            // Infrastructure
            Self::SourceError(_) => "SOURCE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound(_) | Self::ItemNotFound(_) | Self::EmptyQueue
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidReaction(_))
    }

    /// Check if this error came from a remote collaborator
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteCall(_) | Self::Timeout | Self::Rejected(_))
    }
}

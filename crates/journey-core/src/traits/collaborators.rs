//! Collaborator traits (ports) - what the player needs from the outside world
//!
//! The playback engine never talks to the network itself. The host supplies
//! implementations of these traits; the engine only calls them.

use async_trait::async_trait;

use crate::entities::{ReactionKind, ReactionState, StoryGroup};
use crate::error::DomainError;
use crate::value_objects::{EntryPoint, ItemId};

/// Result type for collaborator calls
pub type PortResult<T> = Result<T, DomainError>;

// ============================================================================
// Story Source
// ============================================================================

#[async_trait]
pub trait StorySource: Send + Sync {
    /// Load the story groups for an entry point (a single story or the whole feed)
    async fn load(&self, entry: &EntryPoint) -> PortResult<Vec<StoryGroup>>;
}

// ============================================================================
// View Recorder
// ============================================================================

#[async_trait]
pub trait ViewRecorder: Send + Sync {
    /// Record that the current viewer has seen an item
    async fn record_view(&self, item_id: &ItemId) -> PortResult<()>;
}

// ============================================================================
// Reaction Gateway
// ============================================================================

#[async_trait]
pub trait ReactionGateway: Send + Sync {
    /// Toggle the viewer's reaction on an item
    ///
    /// Same kind as the current reaction removes it, any other kind replaces
    /// it. Returns the authoritative reaction fields after the change.
    async fn toggle_reaction(&self, item_id: &ItemId, kind: ReactionKind)
        -> PortResult<ReactionState>;
}

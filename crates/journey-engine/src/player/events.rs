//! Player events
//!
//! Everything the host needs to render the viewer and route away from it.

use journey_core::{GroupId, ItemId, PlaybackPosition, ReactionState};
use serde::Serialize;
use tokio::sync::mpsc;

use super::state::PlaybackState;

/// Why the viewer should close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Auto-advance ran past the last item
    Exhausted,
    /// The user or host closed the viewer
    Closed,
    /// The queue had nothing playable
    NothingToShow,
}

/// Output of the player, in the order things happened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerEvent {
    /// A new item became current; progress restarts at 0
    Activated {
        group_id: GroupId,
        item_id: ItemId,
        position: PlaybackPosition,
        duration_ms: i64,
    },
    /// Progress of the current item, 0-100
    Progress { item_id: ItemId, percent: f64 },
    StateChanged { state: PlaybackState },
    MuteChanged { muted: bool },
    ReactionPickerChanged { open: bool },
    /// Reaction fields of an item changed, optimistically or confirmed
    ReactionUpdated {
        item_id: ItemId,
        state: ReactionState,
        confirmed: bool,
    },
    /// Transient notification: a reaction could not be saved
    ReactionFailed {
        item_id: ItemId,
        code: &'static str,
        message: String,
    },
    ViewRecorded { item_id: ItemId },
    /// The host should close the viewer
    Exit { reason: ExitReason },
}

impl PlayerEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Activated { .. } => "ACTIVATED",
            Self::Progress { .. } => "PROGRESS",
            Self::StateChanged { .. } => "STATE_CHANGED",
            Self::MuteChanged { .. } => "MUTE_CHANGED",
            Self::ReactionPickerChanged { .. } => "REACTION_PICKER_CHANGED",
            Self::ReactionUpdated { .. } => "REACTION_UPDATED",
            Self::ReactionFailed { .. } => "REACTION_FAILED",
            Self::ViewRecorded { .. } => "VIEW_RECORDED",
            Self::Exit { .. } => "EXIT",
        }
    }

    /// Whether this is the last event of the session
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }
}

pub type EventSender = mpsc::UnboundedSender<PlayerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

/// Create the event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

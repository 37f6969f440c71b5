//! Host commands
//!
//! Everything the host can ask of a running player: pointer and keyboard
//! input, media element callbacks, refetched data and closing the viewer.

use journey_core::{ItemId, ReactionKind, StoryGroup};

/// Input sent to the player loop
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pointer down / touch hold
    Press,
    /// Pointer up / touch release
    Release,
    Next,
    Previous,
    JumpToGroup(usize),
    ToggleMute,
    OpenReactionPicker,
    CloseReactionPicker,
    ToggleReaction(ReactionKind),
    /// Media metadata loaded; carries the intrinsic duration if the media has one
    MediaLoaded {
        item_id: ItemId,
        duration_ms: Option<i64>,
    },
    /// Media failed to load or decode
    MediaFailed { item_id: ItemId },
    /// Fresh data from a refetch
    Replace(Vec<StoryGroup>),
    Close,
}

impl Command {
    /// Map a keyboard key name to a command
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Previous),
            "Escape" => Some(Self::Close),
            "m" | "M" => Some(Self::ToggleMute),
            _ => None,
        }
    }

    /// Map a tap to a command: left half goes back, right half goes forward
    pub fn from_tap(x: f64, viewport_width: f64) -> Self {
        if x < viewport_width / 2.0 {
            Self::Previous
        } else {
            Self::Next
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::JumpToGroup(_) => "jump_to_group",
            Self::ToggleMute => "toggle_mute",
            Self::OpenReactionPicker => "open_reaction_picker",
            Self::CloseReactionPicker => "close_reaction_picker",
            Self::ToggleReaction(_) => "toggle_reaction",
            Self::MediaLoaded { .. } => "media_loaded",
            Self::MediaFailed { .. } => "media_failed",
            Self::Replace(_) => "replace",
            Self::Close => "close",
        }
    }
}

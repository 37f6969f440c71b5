//! Playback coordinates within the story queue

use serde::{Deserialize, Serialize};
use std::fmt;

/// `(group, item)` coordinate of the item currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaybackPosition {
    pub group_index: usize,
    pub item_index: usize,
}

impl PlaybackPosition {
    /// Create a new position
    #[inline]
    pub const fn new(group_index: usize, item_index: usize) -> Self {
        Self {
            group_index,
            item_index,
        }
    }

    /// First item of the first group
    pub const START: Self = Self::new(0, 0);
}

impl fmt::Display for PlaybackPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.group_index, self.item_index)
    }
}

/// Result of a navigation step: a valid position or the end of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cursor {
    At(PlaybackPosition),
    Exhausted,
}

impl Cursor {
    /// The position, if the queue is not exhausted
    #[inline]
    pub fn position(self) -> Option<PlaybackPosition> {
        match self {
            Self::At(position) => Some(position),
            Self::Exhausted => None,
        }
    }

    /// Check for the terminal sentinel
    #[inline]
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl From<Option<PlaybackPosition>> for Cursor {
    fn from(position: Option<PlaybackPosition>) -> Self {
        position.map_or(Self::Exhausted, Self::At)
    }
}

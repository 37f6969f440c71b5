//! Domain entities - story groups, items, and reactions

mod reaction;
mod story;

pub use reaction::{ReactionCount, ReactionKind, ReactionSnapshot, ReactionState};
pub use story::{
    MediaKind, StoryGroup, StoryItem, DEFAULT_IMAGE_DURATION_MS, DEFAULT_TEXT_DURATION_MS,
    DEFAULT_VIDEO_DURATION_MS,
};

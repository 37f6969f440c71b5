//! # journey-core
//!
//! Domain layer containing story entities, value objects, and collaborator traits.
//! This crate has zero dependencies on the async runtime or any I/O.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    MediaKind, ReactionCount, ReactionKind, ReactionSnapshot, ReactionState, StoryGroup,
    StoryItem,
};
pub use error::DomainError;
pub use traits::{PortResult, ReactionGateway, StorySource, ViewRecorder};
pub use value_objects::{Cursor, EntryPoint, GroupId, ItemId, PlaybackPosition, UserId};

//! Value objects - identifiers, queue coordinates, and the deep-link entry point

mod entry;
mod ids;
mod position;

pub use entry::EntryPoint;
pub use ids::{GroupId, ItemId, UserId};
pub use position::{Cursor, PlaybackPosition};

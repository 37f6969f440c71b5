//! View tracking

mod view_tracker;

pub use view_tracker::{ViewMark, ViewTracker};

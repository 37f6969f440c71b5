//! Reaction coordination

mod coordinator;

pub use coordinator::{ReactionCoordinator, ReactionResolution, ToggleOutcome};

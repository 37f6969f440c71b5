//! # journey-engine
//!
//! Story playback engine: timed auto-advance with pause/resume, queue
//! navigation across groups, debounced view tracking and optimistic
//! reactions, driven by one async player task.

pub mod adapters;
pub mod error;
pub mod navigator;
pub mod player;
pub mod reactions;
pub mod signal;
pub mod timer;
pub mod tracking;

// Re-export commonly used types at crate root
pub use adapters::{InMemoryBackend, JsonFileSource};
pub use error::{EngineError, EngineResult};
pub use navigator::{QueueNavigator, Resolution};
pub use player::{
    open_player, spawn_player, Command, ExitReason, PauseReason, PlaybackController,
    PlaybackState, Player, PlayerContext, PlayerEvent, PlayerHandle,
};
pub use reactions::{ReactionCoordinator, ReactionResolution, ToggleOutcome};
pub use timer::{PlaybackClock, SamplingTimer, TimerEngine, TimerSample};
pub use tracking::{ViewMark, ViewTracker};

//! Timer engine - elapsed time, progress sampling, and completion

mod clock;
mod engine;
mod ticker;

pub use clock::PlaybackClock;
pub use engine::{TimerEngine, TimerPhase, TimerSample};
pub use ticker::SamplingTimer;

//! Playback controller, its state machine, and the player task

mod command;
mod context;
mod controller;
mod events;
mod runner;
mod state;

pub use command::Command;
pub use context::PlayerContext;
pub use controller::PlaybackController;
pub use events::{event_channel, EventReceiver, EventSender, ExitReason, PlayerEvent};
pub use runner::{open_player, run, spawn_player, Player, PlayerHandle};
pub use state::{PauseReason, PlaybackState, StateMachine, Transition};

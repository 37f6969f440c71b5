//! Playback state machine
//!
//! `Playing`, `Paused(reason)` and `Exhausted`. A user hold and a pending
//! reaction are both pause reasons of the same variant, so lifting one never
//! resumes playback while the other is still in force.

use serde::Serialize;
use std::fmt;

/// Why playback is frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// Pointer or touch is held down
    UserHold,
    /// A reaction round trip started while playing is still in flight
    ReactionPending,
}

/// Top-level playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Paused(PauseReason),
    Exhausted,
}

impl PlaybackState {
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => f.write_str("playing"),
            Self::Paused(PauseReason::UserHold) => f.write_str("paused(user_hold)"),
            Self::Paused(PauseReason::ReactionPending) => f.write_str("paused(reaction_pending)"),
            Self::Exhausted => f.write_str("exhausted"),
        }
    }
}

/// A state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

impl Transition {
    /// Leaving `Playing` for a paused state
    pub fn pauses(&self) -> bool {
        self.from.is_playing() && self.to.is_paused()
    }

    /// Entering `Playing` from a paused state
    pub fn resumes(&self) -> bool {
        self.from.is_paused() && self.to.is_playing()
    }
}

/// Playback state plus the reaction freeze flag
///
/// `reaction_hold` is set when a toggle froze playback and stays set until
/// every round trip has resolved, even while a user hold takes precedence
/// in the visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachine {
    state: PlaybackState,
    reaction_hold: bool,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Playing,
            reaction_hold: false,
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn reaction_hold(&self) -> bool {
        self.reaction_hold
    }

    /// Pointer down / touch hold
    pub fn press(&mut self) -> Option<Transition> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Paused(PauseReason::ReactionPending) => {
                self.go(PlaybackState::Paused(PauseReason::UserHold))
            }
            _ => None,
        }
    }

    /// Pointer up / touch release
    pub fn release(&mut self) -> Option<Transition> {
        match self.state {
            PlaybackState::Paused(PauseReason::UserHold) if self.reaction_hold => {
                self.go(PlaybackState::Paused(PauseReason::ReactionPending))
            }
            PlaybackState::Paused(PauseReason::UserHold) => self.go(PlaybackState::Playing),
            _ => None,
        }
    }

    /// A reaction toggle was dispatched
    ///
    /// Freezes playback only if it is currently playing; a toggle while the
    /// user holds leaves the hold in charge.
    pub fn reaction_started(&mut self) -> Option<Transition> {
        if !self.state.is_playing() {
            return None;
        }
        self.reaction_hold = true;
        self.go(PlaybackState::Paused(PauseReason::ReactionPending))
    }

    /// Every reaction round trip has resolved
    pub fn reactions_settled(&mut self) -> Option<Transition> {
        self.reaction_hold = false;
        match self.state {
            PlaybackState::Paused(PauseReason::ReactionPending) => self.go(PlaybackState::Playing),
            _ => None,
        }
    }

    /// Terminal state; nothing leaves it
    pub fn exhaust(&mut self) -> Option<Transition> {
        self.reaction_hold = false;
        self.go(PlaybackState::Exhausted)
    }

    fn go(&mut self, to: PlaybackState) -> Option<Transition> {
        if self.state == to || self.state.is_exhausted() {
            return None;
        }
        let from = std::mem::replace(&mut self.state, to);
        Some(Transition { from, to })
    }
}

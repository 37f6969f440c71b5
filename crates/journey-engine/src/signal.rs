//! Internal signals fed back into the player loop
//!
//! Timers and remote calls run as spawned tasks. They never touch player
//! state directly; they post a signal and the loop applies it.

use journey_core::{ItemId, PortResult, ReactionState};
use tokio::sync::mpsc;

/// Sequence number of an item activation
///
/// Bumped on every position change so ticks from a superseded timer can be
/// recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Activation(u64);

impl Activation {
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Work completed outside the player loop
#[derive(Debug)]
pub enum EngineSignal {
    /// Sampling timer fired for an activation
    Tick(Activation),
    /// The backend accepted a view
    ViewRecorded(ItemId),
    /// A reaction round trip finished
    ReactionResolved {
        item_id: ItemId,
        ticket: u64,
        result: PortResult<ReactionState>,
    },
}

pub type SignalSender = mpsc::UnboundedSender<EngineSignal>;
pub type SignalReceiver = mpsc::UnboundedReceiver<EngineSignal>;

/// Create the signal channel
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    mpsc::unbounded_channel()
}

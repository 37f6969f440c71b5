//! Reaction coordinator - optimistic toggles with rollback, serialized per item

use journey_core::{
    DomainError, ItemId, PortResult, ReactionGateway, ReactionKind, ReactionSnapshot,
    ReactionState, StoryItem,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::signal::{EngineSignal, SignalSender};

/// What happened to a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Applied locally; the round trip identified by `ticket` is in flight
    Applied {
        ticket: u64,
        desired: Option<ReactionKind>,
    },
    /// Another toggle on the same item is in flight; this one waits its turn
    Queued { position: usize },
}

/// What applying a round-trip result did to the item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionResolution {
    /// Item now carries the authoritative state
    Confirmed(ReactionState),
    /// Call failed; item restored to its pre-toggle snapshot
    RolledBack {
        error: DomainError,
        restored: ReactionSnapshot,
    },
    /// Item no longer exists in the queue
    Dropped,
    /// Result of an abandoned or unknown round trip
    Stale,
}

/// One reaction round trip in flight
#[derive(Debug)]
struct PendingReaction {
    ticket: u64,
    kind: ReactionKind,
    snapshot: ReactionSnapshot,
    task: JoinHandle<()>,
}

/// Coordinates optimistic reaction updates
///
/// Owns no item state. The controller hands in the item record, the
/// coordinator mutates it optimistically and keeps the snapshot needed to
/// undo the change.
pub struct ReactionCoordinator {
    gateway: Arc<dyn ReactionGateway>,
    signals: SignalSender,
    pending: HashMap<ItemId, PendingReaction>,
    queued: HashMap<ItemId, VecDeque<ReactionKind>>,
    next_ticket: u64,
}

impl ReactionCoordinator {
    pub fn new(gateway: Arc<dyn ReactionGateway>, signals: SignalSender) -> Self {
        Self {
            gateway,
            signals,
            pending: HashMap::new(),
            queued: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Whether a round trip is in flight for the item
    pub fn is_pending(&self, item_id: &ItemId) -> bool {
        self.pending.contains_key(item_id)
    }

    /// Whether any round trip is in flight
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Toggles waiting behind the in-flight one for an item
    pub fn queued_len(&self, item_id: &ItemId) -> usize {
        self.queued.get(item_id).map_or(0, VecDeque::len)
    }

    /// Toggle `kind` on the item
    ///
    /// With nothing in flight for the item the change is applied right away
    /// and the gateway call is spawned. Otherwise the request is queued and
    /// dispatched by [`resume_queue`](Self::resume_queue) once the current
    /// round trip resolves.
    pub fn toggle(&mut self, item: &mut StoryItem, kind: ReactionKind) -> ToggleOutcome {
        if self.is_pending(&item.id) {
            let queue = self.queued.entry(item.id.clone()).or_default();
            queue.push_back(kind);
            tracing::debug!(
                item_id = %item.id,
                kind = %kind,
                queued = queue.len(),
                "Reaction queued behind pending round trip"
            );
            return ToggleOutcome::Queued {
                position: queue.len(),
            };
        }

        self.dispatch(item, kind)
    }

    /// Dispatch the next queued toggle for an item, if it is free
    pub fn resume_queue(&mut self, item: &mut StoryItem) -> Option<ToggleOutcome> {
        if self.is_pending(&item.id) {
            return None;
        }

        let queue = self.queued.get_mut(&item.id)?;
        let kind = queue.pop_front();
        if queue.is_empty() {
            self.queued.remove(&item.id);
        }

        kind.map(|kind| self.dispatch(item, kind))
    }

    /// Apply the result of a round trip
    ///
    /// `item` is the item's current record, or `None` if a refetch removed
    /// it. Results whose ticket doesn't match the pending round trip are
    /// ignored.
    pub fn resolve(
        &mut self,
        item: Option<&mut StoryItem>,
        item_id: &ItemId,
        ticket: u64,
        result: PortResult<ReactionState>,
    ) -> ReactionResolution {
        let current = self
            .pending
            .get(item_id)
            .is_some_and(|pending| pending.ticket == ticket);
        let Some(pending) = current.then(|| self.pending.remove(item_id)).flatten() else {
            tracing::trace!(item_id = %item_id, ticket, "Ignoring stale reaction result");
            return ReactionResolution::Stale;
        };

        let Some(item) = item else {
            self.queued.remove(item_id);
            tracing::debug!(item_id = %item_id, "Reaction resolved for item no longer in queue");
            return ReactionResolution::Dropped;
        };

        match result {
            Ok(state) => {
                item.restore_reactions(state.clone());
                tracing::debug!(
                    item_id = %item_id,
                    kind = %pending.kind,
                    current = ?state.current_user_reaction,
                    "Reaction confirmed"
                );
                ReactionResolution::Confirmed(state)
            }
            Err(error) => {
                item.restore_reactions(pending.snapshot.clone());
                tracing::warn!(
                    item_id = %item_id,
                    kind = %pending.kind,
                    error = %error,
                    "Reaction failed, rolled back"
                );
                ReactionResolution::RolledBack {
                    error,
                    restored: pending.snapshot,
                }
            }
        }
    }

    /// Abort every in-flight round trip and forget queued toggles
    ///
    /// Results of aborted calls are never delivered.
    pub fn abandon(&mut self) {
        for (item_id, pending) in self.pending.drain() {
            pending.task.abort();
            tracing::debug!(item_id = %item_id, ticket = pending.ticket, "Reaction abandoned");
        }
        self.queued.clear();
    }

    fn dispatch(&mut self, item: &mut StoryItem, kind: ReactionKind) -> ToggleOutcome {
        let snapshot = item.reaction_state();
        let desired = item.toggled(kind);
        item.apply_reaction(desired);

        self.next_ticket += 1;
        let ticket = self.next_ticket;

        let gateway = Arc::clone(&self.gateway);
        let signals = self.signals.clone();
        let item_id = item.id.clone();
        let task = tokio::spawn(async move {
            let result = gateway.toggle_reaction(&item_id, kind).await;
            let _ = signals.send(EngineSignal::ReactionResolved {
                item_id,
                ticket,
                result,
            });
        });

        tracing::debug!(
            item_id = %item.id,
            kind = %kind,
            ticket,
            desired = ?desired,
            "Reaction applied optimistically"
        );

        self.pending.insert(
            item.id.clone(),
            PendingReaction {
                ticket,
                kind,
                snapshot,
                task,
            },
        );

        ToggleOutcome::Applied { ticket, desired }
    }
}

impl Drop for ReactionCoordinator {
    fn drop(&mut self) {
        self.abandon();
    }
}

impl std::fmt::Debug for ReactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionCoordinator")
            .field("pending", &self.pending.len())
            .field("queued", &self.queued.values().map(VecDeque::len).sum::<usize>())
            .field("next_ticket", &self.next_ticket)
            .finish()
    }
}

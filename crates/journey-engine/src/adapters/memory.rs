//! In-memory backend
//!
//! Implements every collaborator port against process memory. Used by the
//! `journey-player` binary and by tests; latency and failures can be
//! injected to exercise the debounce, freeze and rollback paths.

use async_trait::async_trait;
use dashmap::DashMap;
use journey_core::{
    DomainError, EntryPoint, ItemId, PortResult, ReactionGateway, ReactionKind, ReactionState,
    StoryGroup, StoryItem, StorySource, ViewRecorder,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::instrument;

/// Story backend held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    /// Groups in feed order
    feed: RwLock<Vec<StoryGroup>>,
    /// Authoritative item records by id
    items: DashMap<ItemId, StoryItem>,
    /// Recorded views per item
    views: DashMap<ItemId, u32>,
    latency: Option<Duration>,
    fail_views: AtomicBool,
    fail_reactions: AtomicBool,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend serving `groups`
    pub fn from_groups(groups: &[StoryGroup]) -> Self {
        let backend = Self::new();
        backend.set_groups(groups.to_vec());
        backend
    }

    /// Delay every remote call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace the served feed
    pub fn set_groups(&self, groups: Vec<StoryGroup>) {
        self.items.clear();
        for item in groups.iter().flat_map(|group| group.items.iter()) {
            self.items.insert(item.id.clone(), item.clone());
        }
        *self.feed.write() = groups;
    }

    /// Make view recording fail until reset
    pub fn set_fail_views(&self, fail: bool) {
        self.fail_views.store(fail, Ordering::SeqCst);
    }

    /// Make reaction toggles fail until reset
    pub fn set_fail_reactions(&self, fail: bool) {
        self.fail_reactions.store(fail, Ordering::SeqCst);
    }

    /// Views recorded for an item
    pub fn view_count(&self, item_id: &ItemId) -> u32 {
        self.views.get(item_id).map_or(0, |count| *count)
    }

    /// Views recorded across all items
    pub fn total_views(&self) -> u32 {
        self.views.iter().map(|entry| *entry.value()).sum()
    }

    /// Authoritative reaction fields of an item
    pub fn reaction_state(&self, item_id: &ItemId) -> Option<ReactionState> {
        self.items.get(item_id).map(|item| item.reaction_state())
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StorySource for InMemoryBackend {
    /// The whole feed is returned for every entry point; the player resolves
    /// the entry within it.
    #[instrument(skip(self))]
    async fn load(&self, entry: &EntryPoint) -> PortResult<Vec<StoryGroup>> {
        self.simulate_latency().await;

        let mut groups = self.feed.read().clone();
        for item in groups.iter_mut().flat_map(|group| group.items.iter_mut()) {
            if let Some(current) = self.items.get(&item.id) {
                item.restore_reactions(current.reaction_state());
            }
        }

        tracing::debug!(groups = groups.len(), "Feed loaded from memory");
        Ok(groups)
    }
}

#[async_trait]
impl ViewRecorder for InMemoryBackend {
    #[instrument(skip(self))]
    async fn record_view(&self, item_id: &ItemId) -> PortResult<()> {
        self.simulate_latency().await;

        if self.fail_views.load(Ordering::SeqCst) {
            return Err(DomainError::RemoteCall("view recording unavailable".to_string()));
        }
        if !self.items.contains_key(item_id) {
            return Err(DomainError::ItemNotFound(item_id.clone()));
        }

        *self.views.entry(item_id.clone()).or_insert(0) += 1;
        Ok(())
    }
}

#[async_trait]
impl ReactionGateway for InMemoryBackend {
    #[instrument(skip(self))]
    async fn toggle_reaction(
        &self,
        item_id: &ItemId,
        kind: ReactionKind,
    ) -> PortResult<ReactionState> {
        self.simulate_latency().await;

        if self.fail_reactions.load(Ordering::SeqCst) {
            return Err(DomainError::RemoteCall("reaction service unavailable".to_string()));
        }

        let mut item = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| DomainError::ItemNotFound(item_id.clone()))?;
        let desired = item.toggled(kind);
        item.apply_reaction(desired);

        Ok(item.reaction_state())
    }
}

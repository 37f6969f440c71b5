//! Test helpers for integration tests
//!
//! Provides a harness around a spawned player, event collection with
//! virtual-time timeouts, and scripted collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use journey_common::PlayerConfig;
use journey_core::{
    DomainError, EntryPoint, ItemId, PortResult, ReactionGateway, ReactionKind, ReactionState,
    StoryGroup,
};
use journey_engine::player::EventReceiver;
use journey_engine::{
    spawn_player, ExitReason, InMemoryBackend, Player, PlayerContext, PlayerEvent, PlayerHandle,
};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::fixtures::VIEWER;

/// How long to wait for an event before failing (virtual time)
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Spawned player plus the in-memory backend behind it
pub struct TestPlayer {
    pub handle: PlayerHandle,
    pub events: EventReceiver,
    pub task: JoinHandle<ExitReason>,
    pub backend: Arc<InMemoryBackend>,
}

impl TestPlayer {
    /// Start a player with default config and 100ms backend latency
    pub fn start(groups: Vec<StoryGroup>, entry: EntryPoint) -> Self {
        Self::start_with(groups, entry, PlayerConfig::default(), Duration::from_millis(100))
    }

    /// Start a player with custom config and latency
    pub fn start_with(
        groups: Vec<StoryGroup>,
        entry: EntryPoint,
        config: PlayerConfig,
        latency: Duration,
    ) -> Self {
        let backend = Arc::new(InMemoryBackend::from_groups(&groups).with_latency(latency));
        let ctx = PlayerContext::with_backend(VIEWER, backend.clone(), config);
        Self::spawn(ctx, groups, entry, backend)
    }

    /// Start a player whose reactions go through `gateway`
    pub fn start_with_gateway(
        groups: Vec<StoryGroup>,
        entry: EntryPoint,
        gateway: Arc<dyn ReactionGateway>,
    ) -> Self {
        let backend = Arc::new(InMemoryBackend::from_groups(&groups));
        let ctx = PlayerContext::new(VIEWER, backend.clone(), gateway, PlayerConfig::default());
        Self::spawn(ctx, groups, entry, backend)
    }

    fn spawn(
        ctx: PlayerContext,
        groups: Vec<StoryGroup>,
        entry: EntryPoint,
        backend: Arc<InMemoryBackend>,
    ) -> Self {
        let Player {
            handle,
            events,
            task,
        } = spawn_player(ctx, groups, entry);
        Self {
            handle,
            events,
            task,
            backend,
        }
    }

    /// Events already emitted, without waiting
    pub fn drain(&mut self) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Result<PlayerEvent> {
        tokio::time::timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .map_err(|_| anyhow!("timed out waiting for player event"))?
            .ok_or_else(|| anyhow!("player event stream closed"))
    }

    /// Wait for the first event matching `predicate`, discarding others
    pub async fn wait_for<F>(&mut self, predicate: F) -> Result<PlayerEvent>
    where
        F: Fn(&PlayerEvent) -> bool,
    {
        loop {
            let event = self.next_event().await?;
            if predicate(&event) {
                return Ok(event);
            }
        }
    }

    /// Collect every event until the player exits
    pub async fn run_to_exit(&mut self) -> Result<Vec<PlayerEvent>> {
        let mut events = Vec::new();
        loop {
            let event = self.next_event().await?;
            let done = event.is_exit();
            events.push(event);
            if done {
                return Ok(events);
            }
        }
    }
}

/// Let the player run for `ms` of virtual time
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Ids of activated items, in order
pub fn activated_items(events: &[PlayerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            PlayerEvent::Activated { item_id, .. } => Some(item_id.to_string()),
            _ => None,
        })
        .collect()
}

/// Exit reason carried by the last event, if it is an exit
pub fn exit_reason(events: &[PlayerEvent]) -> Option<ExitReason> {
    match events.last() {
        Some(PlayerEvent::Exit { reason }) => Some(*reason),
        _ => None,
    }
}

/// Reaction gateway that holds every call until the test lets it through
///
/// Answers are computed by an inner in-memory backend.
pub struct GatedGateway {
    inner: InMemoryBackend,
    gate: Semaphore,
    calls: AtomicUsize,
    seen: parking_lot::Mutex<Vec<ReactionKind>>,
}

impl GatedGateway {
    pub fn new(groups: &[StoryGroup]) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryBackend::from_groups(groups),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            seen: parking_lot::Mutex::new(Vec::new()),
        })
    }

    /// Allow `n` more calls to complete
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Calls started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Kinds in the order they reached the gateway
    pub fn seen(&self) -> Vec<ReactionKind> {
        self.seen.lock().clone()
    }

    pub fn state(&self, item_id: &ItemId) -> Option<ReactionState> {
        self.inner.reaction_state(item_id)
    }
}

#[async_trait]
impl ReactionGateway for GatedGateway {
    async fn toggle_reaction(
        &self,
        item_id: &ItemId,
        kind: ReactionKind,
    ) -> PortResult<ReactionState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(kind);

        self.gate
            .acquire()
            .await
            .map_err(|_| DomainError::InternalError("gate closed".to_string()))?
            .forget();

        self.inner.toggle_reaction(item_id, kind).await
    }
}

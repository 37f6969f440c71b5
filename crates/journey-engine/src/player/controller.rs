//! Playback controller
//!
//! Sole owner of the queue, the current position and the clock. Timer and
//! navigator compute; view tracker and reaction coordinator run their remote
//! calls as tasks that report back through the signal channel. Every state
//! change happens here, one command or signal at a time.

use journey_common::PlayerConfig;
use journey_core::{
    Cursor, DomainError, EntryPoint, ItemId, PlaybackPosition, PortResult, ReactionKind,
    ReactionState, StoryGroup, StoryItem, UserId,
};
use tokio::time::Instant;
use uuid::Uuid;

use super::command::Command;
use super::context::PlayerContext;
use super::events::{EventSender, ExitReason, PlayerEvent};
use super::state::{PlaybackState, StateMachine, Transition};
use crate::navigator::QueueNavigator;
use crate::reactions::{ReactionCoordinator, ReactionResolution, ToggleOutcome};
use crate::signal::{signal_channel, Activation, EngineSignal, SignalReceiver, SignalSender};
use crate::timer::{SamplingTimer, TimerEngine};
use crate::tracking::ViewTracker;

/// State of one viewing session
pub struct PlaybackController {
    session_id: Uuid,
    viewer_id: UserId,
    config: PlayerConfig,

    groups: Vec<StoryGroup>,
    position: Option<PlaybackPosition>,
    machine: StateMachine,
    muted: bool,
    picker_open: bool,

    timer: TimerEngine,
    ticker: Option<SamplingTimer>,
    activation: Activation,

    views: ViewTracker,
    reactions: ReactionCoordinator,

    signal_tx: SignalSender,
    signal_rx: SignalReceiver,
    events: EventSender,
    exit: Option<ExitReason>,
}

impl PlaybackController {
    /// Open a session on `groups`, positioned at the deep-link entry
    ///
    /// An entry that can't be found falls back to a default position; a
    /// queue with nothing playable finishes right away with
    /// [`ExitReason::NothingToShow`].
    pub fn open(
        ctx: &PlayerContext,
        groups: Vec<StoryGroup>,
        entry: &EntryPoint,
        events: EventSender,
    ) -> Self {
        let (signal_tx, signal_rx) = signal_channel();
        let config = ctx.config().clone();

        let views = ViewTracker::new(
            ctx.view_recorder(),
            config.dwell_threshold(),
            signal_tx.clone(),
        );
        let reactions = ReactionCoordinator::new(ctx.reaction_gateway(), signal_tx.clone());

        let mut controller = Self {
            session_id: Uuid::new_v4(),
            viewer_id: ctx.viewer_id().clone(),
            muted: config.start_muted,
            config,
            groups,
            position: None,
            machine: StateMachine::new(),
            picker_open: false,
            timer: TimerEngine::new(),
            ticker: None,
            activation: Activation::default(),
            views,
            reactions,
            signal_tx,
            signal_rx,
            events,
            exit: None,
        };

        controller.seed_views();

        tracing::info!(
            session_id = %controller.session_id,
            viewer_id = %controller.viewer_id,
            entry = %entry,
            groups = controller.groups.len(),
            "Opening story player"
        );

        let resolution = controller.navigator().resolve(entry);
        match resolution {
            None => controller.finish(ExitReason::NothingToShow),
            Some(resolution) => {
                if let Some(reason) = &resolution.fallback {
                    tracing::warn!(
                        session_id = %controller.session_id,
                        entry = %entry,
                        reason = %reason,
                        fallback = %resolution.position,
                        "Deep link not found, using fallback position"
                    );
                }
                controller.go_to(Cursor::At(resolution.position));
            }
        }

        controller
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    pub fn position(&self) -> Option<PlaybackPosition> {
        self.position
    }

    pub fn groups(&self) -> &[StoryGroup] {
        &self.groups
    }

    pub fn current_item(&self) -> Option<&StoryItem> {
        self.navigator().item_at(self.position?)
    }

    pub fn current_group(&self) -> Option<&StoryGroup> {
        self.navigator().group_at(self.position?)
    }

    /// Progress of the current item in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        self.timer.progress(Instant::now())
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.exit.is_some()
    }

    fn navigator(&self) -> QueueNavigator<'_> {
        QueueNavigator::new(&self.groups)
    }

    fn current_item_id(&self) -> Option<ItemId> {
        self.current_item().map(|item| item.id.clone())
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Wait for the next internal signal
    pub async fn next_signal(&mut self) -> Option<EngineSignal> {
        self.signal_rx.recv().await
    }

    /// Apply a host command
    pub fn handle_command(&mut self, command: Command) {
        if self.is_finished() {
            tracing::trace!(command = command.name(), "Player finished, command ignored");
            return;
        }

        tracing::debug!(
            session_id = %self.session_id,
            command = command.name(),
            "Handling command"
        );

        match command {
            Command::Press => {
                let transition = self.machine.press();
                self.apply_transition(transition);
            }
            Command::Release => {
                let transition = self.machine.release();
                self.apply_transition(transition);
            }
            Command::Next => self.advance(),
            Command::Previous => self.go_back(),
            Command::JumpToGroup(group_index) => {
                let cursor = self.navigator().jump_to_group(group_index);
                self.go_to(cursor);
            }
            Command::ToggleMute => {
                self.muted = !self.muted;
                self.emit(PlayerEvent::MuteChanged { muted: self.muted });
            }
            Command::OpenReactionPicker => self.set_picker(true),
            Command::CloseReactionPicker => self.set_picker(false),
            Command::ToggleReaction(kind) => self.toggle_reaction(kind),
            Command::MediaLoaded {
                item_id,
                duration_ms,
            } => self.media_loaded(&item_id, duration_ms),
            Command::MediaFailed { item_id } => self.media_failed(&item_id),
            Command::Replace(groups) => self.replace(groups),
            Command::Close => self.finish(ExitReason::Closed),
        }
    }

    /// Apply an internal signal
    pub fn handle_signal(&mut self, signal: EngineSignal) {
        if self.is_finished() {
            return;
        }

        match signal {
            EngineSignal::Tick(activation) => self.on_tick(activation),
            EngineSignal::ViewRecorded(item_id) => self.on_view_recorded(item_id),
            EngineSignal::ReactionResolved {
                item_id,
                ticket,
                result,
            } => self.on_reaction_resolved(&item_id, ticket, result),
        }
    }

    // ========================================================================
    // Position changes
    // ========================================================================

    /// Move to `cursor`, skipping items that complete on activation
    fn go_to(&mut self, mut cursor: Cursor) {
        while let Cursor::At(position) = cursor {
            if self.activate(position, true) {
                return;
            }
            cursor = self.navigator().next(position);
        }
        self.finish(ExitReason::Exhausted);
    }

    fn advance(&mut self) {
        let Some(position) = self.position else {
            return;
        };
        let cursor = self.navigator().next(position);
        self.go_to(cursor);
    }

    fn go_back(&mut self) {
        let Some(position) = self.position else {
            return;
        };
        let previous = self.navigator().previous(position);

        if previous != position {
            self.go_to(Cursor::At(previous));
            return;
        }

        tracing::debug!(session_id = %self.session_id, "At first item, restarting it");
        if !self.activate(position, false) {
            let cursor = self.navigator().next(position);
            self.go_to(cursor);
        }
    }

    /// Make `position` current: fresh clock, progress 0, one sampling timer
    ///
    /// `fresh` is false when restarting the item already showing, which must
    /// not count as a new view. Returns false if the item completed on the
    /// spot and the caller should move on.
    fn activate(&mut self, position: PlaybackPosition, fresh: bool) -> bool {
        self.ticker = None;
        self.activation = self.activation.next();

        let navigator = self.navigator();
        let (Some(group), Some(item)) = (navigator.group_at(position), navigator.item_at(position))
        else {
            tracing::warn!(position = %position, "Skipping invalid position");
            return false;
        };
        let group_id = group.id.clone();
        let item_id = item.id.clone();
        let duration_ms = item.effective_duration_ms();
        let own_story = group.is_owned_by(&self.viewer_id);

        self.position = Some(position);
        let now = Instant::now();
        let sample = self.timer.start(duration_ms, now);

        tracing::debug!(
            session_id = %self.session_id,
            item_id = %item_id,
            position = %position,
            duration_ms,
            "Item activated"
        );

        self.emit(PlayerEvent::Activated {
            group_id,
            item_id: item_id.clone(),
            position,
            duration_ms,
        });
        self.emit(PlayerEvent::Progress {
            item_id: item_id.clone(),
            percent: sample.percent(),
        });

        if fresh {
            if own_story {
                self.views.cancel();
            } else {
                self.views.mark_viewed(item_id);
            }
        }

        if sample.completed {
            return false;
        }

        if self.machine.state().is_playing() {
            self.start_ticker();
        } else {
            self.timer.pause(now);
        }
        true
    }

    fn start_ticker(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        self.ticker = Some(SamplingTimer::spawn(
            self.activation,
            self.config.sample_interval(),
            self.signal_tx.clone(),
        ));
    }

    fn apply_transition(&mut self, transition: Option<Transition>) {
        let Some(transition) = transition else {
            return;
        };

        let now = Instant::now();
        if transition.pauses() {
            self.ticker = None;
            self.timer.pause(now);
        } else if transition.resumes() {
            self.timer.resume(now);
            self.start_ticker();
        }

        tracing::debug!(
            session_id = %self.session_id,
            from = %transition.from,
            to = %transition.to,
            "Playback state changed"
        );
        self.emit(PlayerEvent::StateChanged {
            state: transition.to,
        });
    }

    // ========================================================================
    // Timer and media
    // ========================================================================

    fn on_tick(&mut self, activation: Activation) {
        let live = self
            .ticker
            .as_ref()
            .is_some_and(|ticker| ticker.activation() == activation);
        if !live {
            tracing::trace!(activation = activation.get(), "Stale tick ignored");
            return;
        }

        let Some(sample) = self.timer.sample(Instant::now()) else {
            return;
        };
        let Some(item_id) = self.current_item_id() else {
            return;
        };

        let completed = sample.completed;
        self.emit(PlayerEvent::Progress {
            item_id: item_id.clone(),
            percent: sample.percent(),
        });

        if completed {
            tracing::debug!(session_id = %self.session_id, item_id = %item_id, "Item complete");
            self.advance();
        }
    }

    fn media_loaded(&mut self, item_id: &ItemId, duration_ms: Option<i64>) {
        let Some(duration_ms) = duration_ms else {
            return;
        };
        let Some(item) = find_item_mut(&mut self.groups, item_id) else {
            tracing::debug!(item_id = %item_id, "Media loaded for unknown item");
            return;
        };
        item.duration_ms = Some(duration_ms);

        if self.current_item_id().as_ref() != Some(item_id) {
            return;
        }

        tracing::debug!(item_id = %item_id, duration_ms, "Media duration updated");
        if let Some(sample) = self.timer.set_duration(duration_ms, Instant::now()) {
            self.emit(PlayerEvent::Progress {
                item_id: item_id.clone(),
                percent: sample.percent(),
            });
            self.advance();
        }
    }

    fn media_failed(&mut self, item_id: &ItemId) {
        if self.current_item_id().as_ref() != Some(item_id) {
            tracing::debug!(item_id = %item_id, "Media failure for inactive item ignored");
            return;
        }

        tracing::warn!(
            session_id = %self.session_id,
            item_id = %item_id,
            "Media failed to load, skipping item"
        );
        self.ticker = None;
        self.timer.stop();
        self.advance();
    }

    // ========================================================================
    // Views
    // ========================================================================

    fn seed_views(&self) {
        let viewer_id = &self.viewer_id;
        self.views.seed(
            self.groups
                .iter()
                .flat_map(|group| group.items.iter())
                .filter(|item| item.is_viewed_by(viewer_id))
                .map(|item| item.id.clone()),
        );
    }

    fn on_view_recorded(&mut self, item_id: ItemId) {
        if let Some(item) = find_item_mut(&mut self.groups, &item_id) {
            item.add_viewer(self.viewer_id.clone());
        }
        self.emit(PlayerEvent::ViewRecorded { item_id });
    }

    // ========================================================================
    // Reactions
    // ========================================================================

    fn set_picker(&mut self, open: bool) {
        if self.picker_open == open {
            return;
        }
        self.picker_open = open;
        self.emit(PlayerEvent::ReactionPickerChanged { open });
    }

    fn toggle_reaction(&mut self, kind: ReactionKind) {
        self.set_picker(false);

        let Some(position) = self.position else {
            return;
        };
        let Some(item) = item_at_mut(&mut self.groups, position) else {
            return;
        };

        match self.reactions.toggle(item, kind) {
            ToggleOutcome::Applied { .. } => {
                let item_id = item.id.clone();
                let state = item.reaction_state();
                self.emit(PlayerEvent::ReactionUpdated {
                    item_id,
                    state,
                    confirmed: false,
                });
                let transition = self.machine.reaction_started();
                self.apply_transition(transition);
            }
            ToggleOutcome::Queued { position } => {
                tracing::debug!(item_id = %item.id, kind = %kind, position, "Reaction toggle queued");
            }
        }
    }

    fn on_reaction_resolved(
        &mut self,
        item_id: &ItemId,
        ticket: u64,
        result: PortResult<ReactionState>,
    ) {
        let item = find_item_mut(&mut self.groups, item_id);
        match self.reactions.resolve(item, item_id, ticket, result) {
            ReactionResolution::Confirmed(state) => {
                self.emit(PlayerEvent::ReactionUpdated {
                    item_id: item_id.clone(),
                    state,
                    confirmed: true,
                });
            }
            ReactionResolution::RolledBack { error, restored } => {
                self.notify_reaction_failed(item_id, &error);
                self.emit(PlayerEvent::ReactionUpdated {
                    item_id: item_id.clone(),
                    state: restored,
                    confirmed: false,
                });
            }
            ReactionResolution::Dropped => {}
            ReactionResolution::Stale => return,
        }

        if let Some(item) = find_item_mut(&mut self.groups, item_id) {
            if let Some(ToggleOutcome::Applied { .. }) = self.reactions.resume_queue(item) {
                let state = item.reaction_state();
                self.emit(PlayerEvent::ReactionUpdated {
                    item_id: item_id.clone(),
                    state,
                    confirmed: false,
                });
                let transition = self.machine.reaction_started();
                self.apply_transition(transition);
            }
        }

        if !self.reactions.has_pending() {
            let transition = self.machine.reactions_settled();
            self.apply_transition(transition);
        }
    }

    fn notify_reaction_failed(&self, item_id: &ItemId, error: &DomainError) {
        self.emit(PlayerEvent::ReactionFailed {
            item_id: item_id.clone(),
            code: error.code(),
            message: error.to_string(),
        });
    }

    // ========================================================================
    // Refetch and teardown
    // ========================================================================

    /// Swap in refetched groups
    ///
    /// The current item keeps playing undisturbed if it still exists.
    /// Otherwise playback moves to the start of the current group, or the
    /// start of the queue if the group is gone too.
    fn replace(&mut self, groups: Vec<StoryGroup>) {
        let current_item = self.current_item_id();
        let current_group = self.current_group().map(|group| group.id.clone());

        self.groups = groups;
        self.seed_views();

        let relocated = current_item
            .as_ref()
            .and_then(|item_id| self.navigator().locate(item_id));
        if let Some(position) = relocated {
            tracing::debug!(
                session_id = %self.session_id,
                position = %position,
                "Queue replaced, current item kept"
            );
            self.position = Some(position);
            return;
        }

        let entry = EntryPoint {
            group_id: current_group,
            item_id: None,
        };
        let resolution = self.navigator().resolve(&entry);
        match resolution {
            None => self.finish(ExitReason::NothingToShow),
            Some(resolution) => {
                tracing::info!(
                    session_id = %self.session_id,
                    position = %resolution.position,
                    "Current item removed by refetch"
                );
                self.go_to(Cursor::At(resolution.position));
            }
        }
    }

    /// Tear the session down and tell the host to exit
    ///
    /// Stops the sampling timer, cancels the pending view debounce and
    /// abandons reaction round trips; nothing they produce is applied.
    fn finish(&mut self, reason: ExitReason) {
        if self.exit.is_some() {
            return;
        }

        self.ticker = None;
        self.timer.stop();
        self.views.cancel();
        self.reactions.abandon();

        if let Some(transition) = self.machine.exhaust() {
            self.emit(PlayerEvent::StateChanged {
                state: transition.to,
            });
        }

        self.position = None;
        self.exit = Some(reason);

        tracing::info!(session_id = %self.session_id, reason = ?reason, "Story player finished");
        self.emit(PlayerEvent::Exit { reason });
    }

    fn emit(&self, event: PlayerEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(session_id = %self.session_id, "Event receiver dropped");
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("session_id", &self.session_id)
            .field("state", &self.machine.state())
            .field("position", &self.position)
            .field("activation", &self.activation)
            .field("muted", &self.muted)
            .field("exit", &self.exit)
            .finish()
    }
}

fn item_at_mut(groups: &mut [StoryGroup], position: PlaybackPosition) -> Option<&mut StoryItem> {
    groups
        .get_mut(position.group_index)?
        .items
        .get_mut(position.item_index)
}

fn find_item_mut<'a>(groups: &'a mut [StoryGroup], item_id: &ItemId) -> Option<&'a mut StoryItem> {
    groups
        .iter_mut()
        .flat_map(|group| group.items.iter_mut())
        .find(|item| &item.id == item_id)
}

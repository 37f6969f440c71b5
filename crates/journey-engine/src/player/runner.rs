//! Player task and handle
//!
//! The controller runs inside one spawned task. The host talks to it through
//! a cloneable [`PlayerHandle`] and listens on the event receiver.

use journey_core::{EntryPoint, ItemId, ReactionKind, StoryGroup, StorySource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::command::Command;
use super::context::PlayerContext;
use super::controller::PlaybackController;
use super::events::{event_channel, EventReceiver, ExitReason};
use crate::error::{EngineError, EngineResult};

/// Sends commands to a running player
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
}

impl PlayerHandle {
    /// Send a command, waiting for buffer space
    pub async fn send(&self, command: Command) -> EngineResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| EngineError::PlayerClosed)
    }

    /// Send without waiting; fails if the buffer is full or the player is gone
    pub fn try_send(&self, command: Command) -> EngineResult<()> {
        self.commands.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(command) => {
                EngineError::internal(format!("command buffer full, dropped {}", command.name()))
            }
            mpsc::error::TrySendError::Closed(_) => EngineError::PlayerClosed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub async fn press(&self) -> EngineResult<()> {
        self.send(Command::Press).await
    }

    pub async fn release(&self) -> EngineResult<()> {
        self.send(Command::Release).await
    }

    pub async fn next(&self) -> EngineResult<()> {
        self.send(Command::Next).await
    }

    pub async fn previous(&self) -> EngineResult<()> {
        self.send(Command::Previous).await
    }

    pub async fn toggle_reaction(&self, kind: ReactionKind) -> EngineResult<()> {
        self.send(Command::ToggleReaction(kind)).await
    }

    pub async fn media_failed(&self, item_id: ItemId) -> EngineResult<()> {
        self.send(Command::MediaFailed { item_id }).await
    }

    /// Hand refetched data to the player
    pub async fn replace(&self, groups: Vec<StoryGroup>) -> EngineResult<()> {
        self.send(Command::Replace(groups)).await
    }

    pub async fn close(&self) -> EngineResult<()> {
        self.send(Command::Close).await
    }
}

/// A spawned player
#[derive(Debug)]
pub struct Player {
    pub handle: PlayerHandle,
    pub events: EventReceiver,
    /// Resolves with the exit reason once the session ends
    pub task: JoinHandle<ExitReason>,
}

/// Spawn a player over an already loaded queue
pub fn spawn_player(ctx: PlayerContext, groups: Vec<StoryGroup>, entry: EntryPoint) -> Player {
    let (command_tx, command_rx) = mpsc::channel(ctx.config().command_capacity());
    let (event_tx, events) = event_channel();

    let task = tokio::spawn(async move {
        let controller = PlaybackController::open(&ctx, groups, &entry, event_tx);
        run(controller, command_rx).await
    });

    Player {
        handle: PlayerHandle {
            commands: command_tx,
        },
        events,
        task,
    }
}

/// Load the queue for `entry` from a source and spawn a player over it
pub async fn open_player(
    ctx: PlayerContext,
    source: &dyn StorySource,
    entry: EntryPoint,
) -> EngineResult<Player> {
    let groups = source.load(&entry).await?;
    tracing::info!(entry = %entry, groups = groups.len(), "Story queue loaded");
    Ok(spawn_player(ctx, groups, entry))
}

/// Drive a controller until the session ends
///
/// Dropping every [`PlayerHandle`] counts as closing the viewer.
pub async fn run(
    mut controller: PlaybackController,
    mut commands: mpsc::Receiver<Command>,
) -> ExitReason {
    loop {
        if let Some(reason) = controller.exit_reason() {
            return reason;
        }

        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => controller.handle_command(command),
                None => {
                    tracing::debug!(
                        session_id = %controller.session_id(),
                        "All player handles dropped, closing"
                    );
                    controller.handle_command(Command::Close);
                }
            },
            Some(signal) = controller.next_signal() => controller.handle_signal(signal),
        }
    }
}

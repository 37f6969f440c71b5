//! Headless story player
//!
//! Run with:
//! ```bash
//! cargo run -p journey-engine --bin journey-player -- demos/feed.json [group[/item]] [viewer]
//! ```
//!
//! Plays the feed against the in-memory backend and logs every player
//! event until the queue is exhausted or Ctrl-C closes the viewer.
//! Configuration is loaded from environment variables.

use anyhow::Context;
use journey_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use journey_core::{EntryPoint, StorySource};
use journey_engine::{
    spawn_player, InMemoryBackend, JsonFileSource, Player, PlayerContext, PlayerEvent,
};
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_VIEWER: &str = "viewer";

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::from_app_config(&config)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = ?e, "Story player failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let feed_path = args
        .next()
        .context("usage: journey-player <feed.json> [group[/item]] [viewer]")?;
    let entry = args
        .next()
        .map_or_else(EntryPoint::feed, |arg| EntryPoint::parse(&arg));
    let viewer = args.next().unwrap_or_else(|| DEFAULT_VIEWER.to_string());

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        sample_interval_ms = config.player.sample_interval_ms,
        dwell_threshold_ms = config.player.dwell_threshold_ms,
        "Starting story player"
    );

    let source = JsonFileSource::new(&feed_path);
    let groups = source
        .load(&entry)
        .await
        .with_context(|| format!("loading feed from {feed_path}"))?;

    let backend = Arc::new(InMemoryBackend::from_groups(&groups));
    let ctx = PlayerContext::with_backend(viewer, backend.clone(), config.player);

    let Player {
        handle,
        mut events,
        task,
    } = spawn_player(ctx, groups, entry);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing viewer");
                if handle.close().await.is_err() {
                    break;
                }
            }
        }
    }

    let reason = task.await.context("player task failed")?;
    info!(
        reason = ?reason,
        views = backend.total_views(),
        "Story player exited"
    );

    Ok(())
}

fn log_event(event: &PlayerEvent) {
    let payload = serde_json::to_string(event).unwrap_or_default();
    match event {
        PlayerEvent::Progress { .. } => {
            tracing::trace!(event = event.event_type(), payload = %payload, "Player event");
        }
        PlayerEvent::ReactionFailed { message, .. } => {
            tracing::warn!(event = event.event_type(), message = %message, "Reaction not saved");
        }
        _ => info!(event = event.event_type(), payload = %payload, "Player event"),
    }
}

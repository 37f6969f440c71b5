//! Player Integration Tests
//!
//! End-to-end scenarios against a spawned player in virtual time.
//!
//! Run with: cargo test -p integration-tests --test player_tests

use std::collections::HashMap;
use std::time::Duration;

use integration_tests::{
    activated_items, advance, exit_reason, feed_with_empty_group, group, image, reacted_feed,
    standard_feed, unique_group, video, GatedGateway, TestPlayer,
};
use journey_common::AppConfig;
use journey_core::{EntryPoint, ItemId, ReactionKind};
use journey_engine::{Command, ExitReason, PauseReason, PlaybackState, PlayerEvent};

// ============================================================================
// Entry and Navigation Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_deep_link_to_missing_item_falls_back_to_group_start() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::item("g1", "i2"));

    let event = player
        .wait_for(|e| matches!(e, PlayerEvent::Activated { .. }))
        .await
        .unwrap();
    match event {
        PlayerEvent::Activated { item_id, position, .. } => {
            assert_eq!(item_id, ItemId::from("i1"));
            assert_eq!((position.group_index, position.item_index), (0, 0));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_deep_link_to_unknown_group_starts_at_feed_start() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::item("g7", "i4"));
    let events = player.run_to_exit().await.unwrap();
    assert_eq!(activated_items(&events), vec!["i1", "i3", "i4"]);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_crosses_groups_and_exits() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::feed());
    let events = player.run_to_exit().await.unwrap();

    assert_eq!(activated_items(&events), vec!["i1", "i3", "i4"]);
    assert_eq!(exit_reason(&events), Some(ExitReason::Exhausted));
    assert_eq!(player.task.await.unwrap(), ExitReason::Exhausted);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_skips_empty_groups() {
    let mut player = TestPlayer::start(feed_with_empty_group(), EntryPoint::feed());
    let events = player.run_to_exit().await.unwrap();
    assert_eq!(activated_items(&events), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_manual_navigation() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::feed());
    player.handle.next().await.unwrap();
    player.handle.next().await.unwrap();
    player.handle.previous().await.unwrap();
    player.handle.send(Command::JumpToGroup(1)).await.unwrap();
    advance(10).await;

    let events = player.drain();
    assert_eq!(activated_items(&events), vec!["i1", "i3", "i4", "i3", "i4"]);
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_and_tap_mapping() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::feed());

    for command in [Command::from_key("ArrowRight"), Command::from_key("ArrowLeft")]
        .into_iter()
        .flatten()
    {
        player.handle.send(command).await.unwrap();
    }
    player
        .handle
        .send(Command::from_tap(350.0, 400.0))
        .await
        .unwrap();
    advance(10).await;
    assert_eq!(activated_items(&player.drain()), vec!["i1", "i3", "i1", "i3"]);

    if let Some(close) = Command::from_key("Escape") {
        player.handle.send(close).await.unwrap();
    }
    assert_eq!(player.task.await.unwrap(), ExitReason::Closed);
}

// ============================================================================
// Pause Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_hold_excludes_paused_time() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::feed());

    advance(500).await;
    player.handle.press().await.unwrap();
    advance(5_000).await;
    player.handle.release().await.unwrap();
    advance(400).await;
    assert_eq!(activated_items(&player.drain()), vec!["i1"]);

    advance(300).await;
    assert_eq!(activated_items(&player.drain()), vec!["i3"]);
}

#[tokio::test(start_paused = true)]
async fn test_state_changes_are_reported() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::feed());
    player.handle.press().await.unwrap();
    player.handle.release().await.unwrap();
    advance(10).await;

    let states: Vec<PlaybackState> = player
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            PlayerEvent::StateChanged { state } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            PlaybackState::Paused(PauseReason::UserHold),
            PlaybackState::Playing
        ]
    );
}

// ============================================================================
// View Tracking Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_views_are_debounced_and_recorded_once() {
    let groups = vec![group("g1", "alice", vec![image("a", 10_000), image("b", 10_000)])];
    let player = TestPlayer::start(groups, EntryPoint::feed());
    let a = ItemId::from("a");
    let b = ItemId::from("b");

    // Flick past a
    advance(300).await;
    player.handle.next().await.unwrap();
    advance(1_500).await;
    assert_eq!(player.backend.view_count(&a), 0);
    assert_eq!(player.backend.view_count(&b), 1);

    // Dwell on a, then revisit b
    player.handle.previous().await.unwrap();
    advance(1_500).await;
    player.handle.next().await.unwrap();
    advance(1_500).await;

    assert_eq!(player.backend.view_count(&a), 1);
    assert_eq!(player.backend.view_count(&b), 1);
}

#[tokio::test(start_paused = true)]
async fn test_view_failures_never_block_playback() {
    let mut player = TestPlayer::start(
        vec![group("g1", "alice", vec![image("a", 2_000), image("b", 2_000)])],
        EntryPoint::feed(),
    );
    player.backend.set_fail_views(true);

    let events = player.run_to_exit().await.unwrap();
    assert_eq!(exit_reason(&events), Some(ExitReason::Exhausted));
    assert!(!events
        .iter()
        .any(|event| matches!(event, PlayerEvent::ViewRecorded { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_dwell_threshold_comes_from_config() {
    let vars = HashMap::from([("JOURNEY_DWELL_THRESHOLD_MS", "200".to_string())]);
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    assert_eq!(config.player.dwell_threshold_ms, 200);

    let feed = vec![unique_group("bob", vec![image("x", 5_000)])];
    let player = TestPlayer::start_with(feed, EntryPoint::feed(), config.player, Duration::ZERO);

    advance(250).await;
    assert_eq!(player.backend.view_count(&ItemId::from("x")), 1);
}

// ============================================================================
// Reaction Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reaction_on_then_off() {
    let mut player = TestPlayer::start(reacted_feed(), EntryPoint::feed());
    let id = ItemId::from("r1");

    player.handle.toggle_reaction(ReactionKind::Like).await.unwrap();
    player
        .wait_for(|e| matches!(e, PlayerEvent::ReactionUpdated { confirmed: true, .. }))
        .await
        .unwrap();
    let state = player.backend.reaction_state(&id).unwrap();
    assert_eq!(state.current_user_reaction, Some(ReactionKind::Like));

    player.handle.toggle_reaction(ReactionKind::Like).await.unwrap();
    let event = player
        .wait_for(|e| matches!(e, PlayerEvent::ReactionUpdated { confirmed: true, .. }))
        .await
        .unwrap();

    match event {
        PlayerEvent::ReactionUpdated { state, .. } => {
            assert_eq!(state.current_user_reaction, None);
            assert_eq!(
                state.summary,
                reacted_feed()[0].items[0].reaction_state().summary
            );
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_reaction_failure_rolls_back_and_notifies() {
    let mut player = TestPlayer::start(reacted_feed(), EntryPoint::feed());
    player.backend.set_fail_reactions(true);
    let snapshot = reacted_feed()[0].items[0].reaction_state();

    player.handle.toggle_reaction(ReactionKind::Love).await.unwrap();

    let optimistic = player
        .wait_for(|e| matches!(e, PlayerEvent::ReactionUpdated { .. }))
        .await
        .unwrap();
    match optimistic {
        PlayerEvent::ReactionUpdated { state, confirmed, .. } => {
            assert!(!confirmed);
            assert_eq!(state.current_user_reaction, Some(ReactionKind::Love));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let failure = player
        .wait_for(|e| matches!(e, PlayerEvent::ReactionFailed { .. }))
        .await
        .unwrap();
    assert!(matches!(
        failure,
        PlayerEvent::ReactionFailed {
            code: "REMOTE_CALL_FAILED",
            ..
        }
    ));

    match player.next_event().await.unwrap() {
        PlayerEvent::ReactionUpdated { state, confirmed, .. } => {
            assert!(!confirmed);
            assert_eq!(state, snapshot);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let resumed = player
        .wait_for(|e| matches!(e, PlayerEvent::StateChanged { .. }))
        .await
        .unwrap();
    assert_eq!(
        resumed,
        PlayerEvent::StateChanged {
            state: PlaybackState::Playing
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_reaction_freeze_holds_playback() {
    let feed = vec![group("g1", "alice", vec![image("a", 1_000), image("b", 1_000)])];
    let gateway = GatedGateway::new(&feed);
    let mut player = TestPlayer::start_with_gateway(feed, EntryPoint::feed(), gateway.clone());

    player.handle.toggle_reaction(ReactionKind::Wow).await.unwrap();
    advance(5_000).await;
    assert_eq!(activated_items(&player.drain()), vec!["a"]);

    gateway.release(1);
    advance(1_100).await;
    assert_eq!(activated_items(&player.drain()), vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn test_toggles_on_one_item_are_serialized() {
    let feed = vec![group("g1", "alice", vec![image("a", 60_000)])];
    let gateway = GatedGateway::new(&feed);
    let player = TestPlayer::start_with_gateway(feed, EntryPoint::feed(), gateway.clone());

    player.handle.toggle_reaction(ReactionKind::Like).await.unwrap();
    player.handle.toggle_reaction(ReactionKind::Wow).await.unwrap();
    advance(100).await;
    assert_eq!(gateway.calls(), 1);

    gateway.release(1);
    advance(100).await;
    assert_eq!(gateway.calls(), 2);

    gateway.release(1);
    advance(100).await;
    assert_eq!(gateway.seen(), vec![ReactionKind::Like, ReactionKind::Wow]);
    assert_eq!(
        gateway
            .state(&ItemId::from("a"))
            .and_then(|state| state.current_user_reaction),
        Some(ReactionKind::Wow)
    );
}

// ============================================================================
// Media and Refetch Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_media_failure_skips_item() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::feed());
    player.handle.media_failed(ItemId::from("i1")).await.unwrap();
    advance(10).await;
    assert_eq!(activated_items(&player.drain()), vec!["i1", "i3"]);
}

#[tokio::test(start_paused = true)]
async fn test_video_duration_from_metadata() {
    let feed = vec![group("g1", "alice", vec![video("v"), image("after", 1_000)])];
    let mut player = TestPlayer::start(feed, EntryPoint::feed());

    player
        .handle
        .send(Command::MediaLoaded {
            item_id: ItemId::from("v"),
            duration_ms: Some(2_000),
        })
        .await
        .unwrap();
    advance(1_900).await;
    assert_eq!(activated_items(&player.drain()), vec!["v"]);
    advance(200).await;
    assert_eq!(activated_items(&player.drain()), vec!["after"]);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_keeps_current_item() {
    let mut player = TestPlayer::start(standard_feed(), EntryPoint::item("g2", "i4"));
    advance(500).await;
    player.drain();

    let mut refreshed = standard_feed();
    refreshed.insert(0, group("g0", "dora", vec![image("new", 1_000)]));
    player.handle.replace(refreshed).await.unwrap();

    let events = player.run_to_exit().await.unwrap();
    assert!(activated_items(&events).is_empty());
    assert_eq!(exit_reason(&events), Some(ExitReason::Exhausted));
}

// ============================================================================
// Teardown Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_work() {
    let mut player = TestPlayer::start(reacted_feed(), EntryPoint::feed());
    let id = ItemId::from("r1");
    let before = player.backend.reaction_state(&id);

    player.handle.toggle_reaction(ReactionKind::Sad).await.unwrap();
    advance(10).await;
    player.handle.close().await.unwrap();

    let events = player.run_to_exit().await.unwrap();
    assert_eq!(exit_reason(&events), Some(ExitReason::Closed));
    assert_eq!(player.task.await.unwrap(), ExitReason::Closed);

    advance(5_000).await;
    assert_eq!(player.backend.reaction_state(&id), before);
    assert_eq!(player.backend.view_count(&id), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_feed_has_nothing_to_show() {
    let mut player = TestPlayer::start(
        vec![group("g1", "alice", Vec::new())],
        EntryPoint::feed(),
    );
    let events = player.run_to_exit().await.unwrap();
    assert_eq!(exit_reason(&events), Some(ExitReason::NothingToShow));
    assert!(activated_items(&events).is_empty());
}

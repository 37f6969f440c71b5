//! Test fixtures and data generators
//!
//! Provides reusable story feeds for integration tests.

use chrono::{TimeZone, Utc};
use journey_core::{MediaKind, ReactionCount, ReactionKind, ReactionState, StoryGroup, StoryItem};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Viewer used unless a test says otherwise
pub const VIEWER: &str = "viewer";

/// Image item with an explicit display time
pub fn image(id: &str, duration_ms: i64) -> StoryItem {
    StoryItem::new(id, MediaKind::Image)
        .with_url(format!("https://cdn.example.com/stories/{id}.jpg"))
        .with_duration_ms(duration_ms)
}

/// Video item whose length is only known once metadata loads
pub fn video(id: &str) -> StoryItem {
    StoryItem::new(id, MediaKind::Video).with_url(format!("https://cdn.example.com/stories/{id}.mp4"))
}

/// Group with a fixed creation time
pub fn group(id: &str, owner: &str, items: Vec<StoryItem>) -> StoryGroup {
    let mut group = StoryGroup::new(id, owner, items);
    group.created_at = Utc
        .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    group
}

/// Group with a generated id, for tests that don't care about names
pub fn unique_group(owner: &str, items: Vec<StoryItem>) -> StoryGroup {
    group(&format!("group-{}", unique_suffix()), owner, items)
}

/// `[g1(i1, i3), g2(i4)]`, one second per item
pub fn standard_feed() -> Vec<StoryGroup> {
    vec![
        group("g1", "alice", vec![image("i1", 1_000), image("i3", 1_000)]),
        group("g2", "bob", vec![image("i4", 1_000)]),
    ]
}

/// `[g1(a), g2(), g3(b)]`
pub fn feed_with_empty_group() -> Vec<StoryGroup> {
    vec![
        group("g1", "alice", vec![image("a", 1_000)]),
        group("g2", "bob", Vec::new()),
        group("g3", "carol", vec![image("b", 1_000)]),
    ]
}

/// One long item carrying existing reactions
pub fn reacted_feed() -> Vec<StoryGroup> {
    let item = image("r1", 10_000).with_reactions(ReactionState {
        current_user_reaction: None,
        summary: vec![
            ReactionCount::new(ReactionKind::Like, 4),
            ReactionCount::new(ReactionKind::Love, 1),
        ],
    });
    vec![group("g1", "alice", vec![item])]
}

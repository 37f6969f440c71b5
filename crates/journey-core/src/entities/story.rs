//! Story entities - groups of timed media items owned by one author

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::reaction::{ReactionCount, ReactionKind, ReactionSnapshot, ReactionState};
use crate::value_objects::{GroupId, ItemId, UserId};

/// Display time of a still image when the backend gives none
pub const DEFAULT_IMAGE_DURATION_MS: i64 = 5_000;

/// Display time of a text card when the backend gives none
pub const DEFAULT_TEXT_DURATION_MS: i64 = 5_000;

/// Placeholder length of a video until its metadata reports the real one
pub const DEFAULT_VIDEO_DURATION_MS: i64 = 15_000;

/// What kind of media an item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    Mixed,
    Text,
}

impl MediaKind {
    /// Default display time for this kind
    pub fn default_duration_ms(&self) -> i64 {
        match self {
            Self::Video => DEFAULT_VIDEO_DURATION_MS,
            Self::Image | Self::Mixed => DEFAULT_IMAGE_DURATION_MS,
            Self::Text => DEFAULT_TEXT_DURATION_MS,
        }
    }

    /// Whether the duration comes from the media itself
    #[inline]
    pub fn has_intrinsic_duration(&self) -> bool {
        matches!(self, Self::Video)
    }
}

/// A single playable story item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: ItemId,
    pub media_kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub reaction_summary: Vec<ReactionCount>,
    #[serde(default)]
    pub viewer_ids: HashSet<UserId>,
    #[serde(default)]
    pub current_user_reaction: Option<ReactionKind>,
}

impl StoryItem {
    /// Create an item with no reactions and no viewers
    pub fn new(id: impl Into<ItemId>, media_kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            media_kind,
            media_url: None,
            duration_ms: None,
            reaction_summary: Vec::new(),
            viewer_ids: HashSet::new(),
            current_user_reaction: None,
        }
    }

    /// Set the media URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    /// Set an explicit duration
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Set the reaction fields
    pub fn with_reactions(mut self, state: ReactionState) -> Self {
        self.restore_reactions(state);
        self
    }

    /// Add a viewer
    pub fn with_viewer(mut self, viewer: impl Into<UserId>) -> Self {
        self.viewer_ids.insert(viewer.into());
        self
    }

    /// Duration used by the timer: explicit if known, otherwise the kind's default
    pub fn effective_duration_ms(&self) -> i64 {
        self.duration_ms
            .unwrap_or_else(|| self.media_kind.default_duration_ms())
    }

    /// Count shown for a reaction kind
    pub fn count_for(&self, kind: ReactionKind) -> u32 {
        self.reaction_summary
            .iter()
            .find(|c| c.kind == kind)
            .map_or(0, |c| c.count)
    }

    /// Reaction the viewer ends up with after toggling `kind`
    ///
    /// Toggling the current kind removes it; any other kind replaces it.
    pub fn toggled(&self, kind: ReactionKind) -> Option<ReactionKind> {
        if self.current_user_reaction == Some(kind) {
            None
        } else {
            Some(kind)
        }
    }

    /// Copy of the reaction fields
    pub fn reaction_state(&self) -> ReactionSnapshot {
        ReactionState {
            current_user_reaction: self.current_user_reaction,
            summary: self.reaction_summary.clone(),
        }
    }

    /// Overwrite the reaction fields
    pub fn restore_reactions(&mut self, state: ReactionSnapshot) {
        self.current_user_reaction = state.current_user_reaction;
        self.reaction_summary = state.summary;
    }

    /// Set the viewer's reaction, keeping the summary counts consistent
    pub fn apply_reaction(&mut self, reaction: Option<ReactionKind>) {
        if self.current_user_reaction == reaction {
            return;
        }

        if let Some(previous) = self.current_user_reaction.take() {
            if let Some(entry) = self
                .reaction_summary
                .iter_mut()
                .find(|c| c.kind == previous)
            {
                entry.count = entry.count.saturating_sub(1);
            }
            self.reaction_summary.retain(|c| c.count > 0);
        }

        if let Some(kind) = reaction {
            match self.reaction_summary.iter_mut().find(|c| c.kind == kind) {
                Some(entry) => entry.count += 1,
                None => self.reaction_summary.push(ReactionCount::new(kind, 1)),
            }
        }

        self.current_user_reaction = reaction;
    }

    /// Check if a user has seen this item
    #[inline]
    pub fn is_viewed_by(&self, user_id: &UserId) -> bool {
        self.viewer_ids.contains(user_id)
    }

    /// Record a viewer. Returns false if they were already listed.
    pub fn add_viewer(&mut self, user_id: UserId) -> bool {
        self.viewer_ids.insert(user_id)
    }
}

/// One author's set of story items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryGroup {
    pub id: GroupId,
    pub owner_ref: UserId,
    #[serde(default)]
    pub items: Vec<StoryItem>,
    pub created_at: DateTime<Utc>,
}

impl StoryGroup {
    /// Create a new StoryGroup stamped with the current time
    pub fn new(id: impl Into<GroupId>, owner_ref: impl Into<UserId>, items: Vec<StoryItem>) -> Self {
        Self {
            id: id.into(),
            owner_ref: owner_ref.into(),
            items,
            created_at: Utc::now(),
        }
    }

    /// Number of items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the group has nothing to play
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of an item within this group
    pub fn index_of(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == item_id)
    }

    /// Check if the group belongs to a user
    #[inline]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_ref == user_id
    }
}

//! Queue navigator - pure position arithmetic over the story queue
//!
//! Every operation is a function of `(queue, position)`. Nothing here mutates
//! the queue or performs I/O; the controller decides what to do with the
//! result.

use journey_core::{
    Cursor, DomainError, EntryPoint, ItemId, PlaybackPosition, StoryGroup, StoryItem,
};

/// Outcome of resolving a deep link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub position: PlaybackPosition,
    /// Why the requested entry could not be honoured, if it wasn't
    pub fallback: Option<DomainError>,
}

impl Resolution {
    fn exact(position: PlaybackPosition) -> Self {
        Self {
            position,
            fallback: None,
        }
    }

    fn fallback(position: PlaybackPosition, reason: DomainError) -> Self {
        Self {
            position,
            fallback: Some(reason),
        }
    }
}

/// Read-only view over the queue for computing positions
#[derive(Debug, Clone, Copy)]
pub struct QueueNavigator<'a> {
    groups: &'a [StoryGroup],
}

impl<'a> QueueNavigator<'a> {
    pub fn new(groups: &'a [StoryGroup]) -> Self {
        Self { groups }
    }

    /// First playable position, skipping empty groups
    pub fn first(&self) -> Option<PlaybackPosition> {
        self.first_playable_from(0)
    }

    /// Number of playable items in the whole queue
    pub fn total_items(&self) -> usize {
        self.groups.iter().map(StoryGroup::len).sum()
    }

    pub fn is_valid(&self, position: PlaybackPosition) -> bool {
        self.item_at(position).is_some()
    }

    pub fn group_at(&self, position: PlaybackPosition) -> Option<&'a StoryGroup> {
        self.groups.get(position.group_index)
    }

    pub fn item_at(&self, position: PlaybackPosition) -> Option<&'a StoryItem> {
        self.group_at(position)?.items.get(position.item_index)
    }

    /// Position of an item anywhere in the queue
    pub fn locate(&self, item_id: &ItemId) -> Option<PlaybackPosition> {
        self.groups.iter().enumerate().find_map(|(group_index, group)| {
            group
                .index_of(item_id)
                .map(|item_index| PlaybackPosition::new(group_index, item_index))
        })
    }

    /// Following position, crossing into the next non-empty group when the
    /// current one runs out
    pub fn next(&self, position: PlaybackPosition) -> Cursor {
        match self.groups.get(position.group_index) {
            Some(group) if position.item_index + 1 < group.len() => Cursor::At(
                PlaybackPosition::new(position.group_index, position.item_index + 1),
            ),
            _ => self.first_playable_from(position.group_index + 1).into(),
        }
    }

    /// Preceding position; the prior non-empty group's last item when at the
    /// start of a group. At the very first item this returns `position`.
    pub fn previous(&self, position: PlaybackPosition) -> PlaybackPosition {
        if position.item_index > 0 && self.groups.get(position.group_index).is_some() {
            return PlaybackPosition::new(position.group_index, position.item_index - 1);
        }
        self.last_playable_before(position.group_index)
            .unwrap_or(position)
    }

    /// Item 0 of a group, or of the next non-empty group after it
    pub fn jump_to_group(&self, group_index: usize) -> Cursor {
        self.first_playable_from(group_index).into()
    }

    /// Turn a deep link into a valid position
    ///
    /// Unknown groups fall back to the start of the queue; an unknown item in
    /// a known group falls back to that group's first item. `None` only for a
    /// queue with nothing playable.
    pub fn resolve(&self, entry: &EntryPoint) -> Option<Resolution> {
        let first = self.first()?;

        let Some(group_id) = &entry.group_id else {
            return Some(match &entry.item_id {
                None => Resolution::exact(first),
                Some(item_id) => match self.locate(item_id) {
                    Some(position) => Resolution::exact(position),
                    None => Resolution::fallback(first, DomainError::ItemNotFound(item_id.clone())),
                },
            });
        };

        let Some((group_index, group)) = self
            .groups
            .iter()
            .enumerate()
            .find(|(_, group)| &group.id == group_id)
        else {
            return Some(Resolution::fallback(
                first,
                DomainError::GroupNotFound(group_id.clone()),
            ));
        };

        if group.is_empty() {
            return Some(Resolution::fallback(
                first,
                DomainError::GroupNotFound(group_id.clone()),
            ));
        }

        let group_start = PlaybackPosition::new(group_index, 0);
        Some(match &entry.item_id {
            None => Resolution::exact(group_start),
            Some(item_id) => match group.index_of(item_id) {
                Some(item_index) => {
                    Resolution::exact(PlaybackPosition::new(group_index, item_index))
                }
                None => Resolution::fallback(
                    group_start,
                    DomainError::ItemNotFound(item_id.clone()),
                ),
            },
        })
    }

    fn first_playable_from(&self, group_index: usize) -> Option<PlaybackPosition> {
        self.groups
            .iter()
            .enumerate()
            .skip(group_index)
            .find(|(_, group)| !group.is_empty())
            .map(|(index, _)| PlaybackPosition::new(index, 0))
    }

    fn last_playable_before(&self, group_index: usize) -> Option<PlaybackPosition> {
        let end = group_index.min(self.groups.len());
        self.groups[..end]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, group)| !group.is_empty())
            .map(|(index, group)| PlaybackPosition::new(index, group.len() - 1))
    }
}

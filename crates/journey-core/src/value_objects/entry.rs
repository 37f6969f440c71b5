//! Deep-link entry point into the story viewer

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GroupId, ItemId};

/// Where the viewer should open: a group, optionally a specific item in it
///
/// An empty entry point means "start of the feed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub item_id: Option<ItemId>,
}

impl EntryPoint {
    /// Open the full feed from its first item
    pub fn feed() -> Self {
        Self::default()
    }

    /// Open a single group at its first item
    pub fn group(group_id: impl Into<GroupId>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            item_id: None,
        }
    }

    /// Open a specific item of a group
    pub fn item(group_id: impl Into<GroupId>, item_id: impl Into<ItemId>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            item_id: Some(item_id.into()),
        }
    }

    /// Parse `group` or `group/item`; an empty string is the feed
    pub fn parse(s: &str) -> Self {
        let s = s.trim().trim_matches('/');
        if s.is_empty() {
            return Self::feed();
        }
        match s.split_once('/') {
            Some((group, item)) if !item.is_empty() => Self::item(group, item),
            Some((group, _)) => Self::group(group),
            None => Self::group(s),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.group_id, &self.item_id) {
            (Some(group), Some(item)) => write!(f, "{group}/{item}"),
            (Some(group), None) => write!(f, "{group}"),
            (None, Some(item)) => write!(f, "*/{item}"),
            (None, None) => f.write_str("feed"),
        }
    }
}

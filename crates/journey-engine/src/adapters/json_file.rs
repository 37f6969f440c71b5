//! JSON file story source

use async_trait::async_trait;
use journey_common::{AppError, AppResult};
use journey_core::{DomainError, EntryPoint, PortResult, StoryGroup, StorySource};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Accepted feed layouts: `{"groups": [...]}` or a bare array of groups
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedDocument {
    Wrapped { groups: Vec<StoryGroup> },
    Bare(Vec<StoryGroup>),
}

/// Parse a feed document
///
/// Item ids must be unique across the whole feed; reactions, views and
/// refetches all address items by id.
pub fn parse_feed(json: &str) -> AppResult<Vec<StoryGroup>> {
    let document: FeedDocument = serde_json::from_str(json)?;
    let groups = match document {
        FeedDocument::Wrapped { groups } | FeedDocument::Bare(groups) => groups,
    };

    let mut seen = HashSet::new();
    for item in groups.iter().flat_map(|group| &group.items) {
        if !seen.insert(&item.id) {
            return Err(AppError::invalid(format!("duplicate item id {}", item.id)));
        }
    }

    Ok(groups)
}

/// Read and parse a feed file
pub async fn read_feed(path: impl AsRef<Path>) -> AppResult<Vec<StoryGroup>> {
    let json = tokio::fs::read_to_string(path).await?;
    parse_feed(&json)
}

/// Loads story groups from a JSON document on disk
///
/// The file is re-read on every `load`, so a refetch picks up edits.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorySource for JsonFileSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self, entry: &EntryPoint) -> PortResult<Vec<StoryGroup>> {
        let groups = read_feed(&self.path).await.map_err(|e: AppError| {
            tracing::warn!(error = %e, code = e.error_code(), "Failed to load feed file");
            DomainError::SourceError(format!("{}: {e}", self.path.display()))
        })?;

        tracing::debug!(groups = groups.len(), "Feed loaded from file");
        Ok(groups)
    }
}

//! Player context - collaborators and settings for one viewing session

use journey_common::PlayerConfig;
use journey_core::{ReactionGateway, UserId, ViewRecorder};
use std::sync::Arc;

/// Everything a player needs besides the queue itself
#[derive(Clone)]
pub struct PlayerContext {
    viewer_id: UserId,
    view_recorder: Arc<dyn ViewRecorder>,
    reaction_gateway: Arc<dyn ReactionGateway>,
    config: PlayerConfig,
}

impl PlayerContext {
    pub fn new(
        viewer_id: impl Into<UserId>,
        view_recorder: Arc<dyn ViewRecorder>,
        reaction_gateway: Arc<dyn ReactionGateway>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            viewer_id: viewer_id.into(),
            view_recorder,
            reaction_gateway,
            config,
        }
    }

    /// Use one backend for both remote calls
    pub fn with_backend<B>(viewer_id: impl Into<UserId>, backend: Arc<B>, config: PlayerConfig) -> Self
    where
        B: ViewRecorder + ReactionGateway + 'static,
    {
        let view_recorder: Arc<dyn ViewRecorder> = backend.clone();
        let reaction_gateway: Arc<dyn ReactionGateway> = backend;
        Self::new(viewer_id, view_recorder, reaction_gateway, config)
    }

    pub fn viewer_id(&self) -> &UserId {
        &self.viewer_id
    }

    pub fn view_recorder(&self) -> Arc<dyn ViewRecorder> {
        Arc::clone(&self.view_recorder)
    }

    pub fn reaction_gateway(&self) -> Arc<dyn ReactionGateway> {
        Arc::clone(&self.reaction_gateway)
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}

impl std::fmt::Debug for PlayerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerContext")
            .field("viewer_id", &self.viewer_id)
            .field("config", &self.config)
            .finish()
    }
}

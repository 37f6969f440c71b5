//! Collaborator traits

mod collaborators;

pub use collaborators::{PortResult, ReactionGateway, StorySource, ViewRecorder};

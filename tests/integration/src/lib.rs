//! Integration test utilities for the story player
//!
//! This crate provides feed fixtures, scripted collaborators and helpers for
//! driving a spawned player end to end in virtual time.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

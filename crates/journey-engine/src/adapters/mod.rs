//! Collaborator adapters - concrete story sources and backends

mod json_file;
mod memory;

pub use json_file::{parse_feed, read_feed, JsonFileSource};
pub use memory::InMemoryBackend;

//! Snapshot ingestion layer for guild gain tracking.
//!
//! Responsible for discovering and loading dated snapshot files, normalising
//! their schema-variable payloads into rosters, and running the monthly gain
//! pipeline.

pub mod analysis;
pub mod parser;
pub mod store;

pub use guild_core as core;

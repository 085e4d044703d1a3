//! Domain core for guild point gain tracking.
//!
//! Pure computations only: gain deltas between rosters, tie-aware leaderboard
//! ranking, tier classification and request validation. Filesystem access
//! lives in `guild-data`.

pub mod error;
pub mod gains;
pub mod leaderboard;
pub mod models;
pub mod points_text;
pub mod settings;
pub mod tiers;
pub mod validation;

pub use error::{ErrorKind, GainError, Result};

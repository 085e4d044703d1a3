//! Dated snapshot file discovery and loading.
//!
//! Snapshots are `*.json` files placed directly in the configured data
//! folder, each with a `YYYY-MM-DD` fragment in its file stem, e.g.
//! `idle_on_data_2025-02-14.json`. The stem is the snapshot's identifier.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use guild_core::error::{GainError, Result};
use guild_core::models::{SnapshotId, YearMonth};
use guild_core::settings::StoreConfig;
use regex::Regex;
use tracing::{debug, warn};

const SNAPSHOT_EXTENSION: &str = "json";

// ── Public API ────────────────────────────────────────────────────────────────

/// Extract the first valid `YYYY-MM-DD` date embedded in a snapshot name.
pub fn parse_snapshot_date(name: &str) -> Option<NaiveDate> {
    static DATE: OnceLock<Regex> = OnceLock::new();
    let re = DATE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("regex is valid"));
    re.find_iter(name)
        .find_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
}

/// Read-only view over a folder of dated snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    config: StoreConfig,
}

impl SnapshotStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn data_folder(&self) -> &Path {
        &self.config.data_folder
    }

    /// Every dated snapshot in the folder, oldest first.
    ///
    /// A missing folder yields an empty list. Files without a parseable date
    /// in their name are skipped.
    pub fn list_all(&self) -> Vec<SnapshotId> {
        let folder = self.data_folder();
        if !folder.exists() {
            warn!("Data folder does not exist: {}", folder.display());
            return Vec::new();
        }

        let mut ids: Vec<SnapshotId> = walkdir::WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext == SNAPSHOT_EXTENSION)
                        .unwrap_or(false)
            })
            .filter_map(|entry| {
                let name = entry.path().file_stem()?.to_str()?.to_string();
                match parse_snapshot_date(&name) {
                    Some(date) => Some(SnapshotId { date, name }),
                    None => {
                        debug!("Skipping {}: no date in file name", entry.path().display());
                        None
                    }
                }
            })
            .collect();

        ids.sort();
        ids
    }

    /// Snapshots dated within `year_month`, oldest first.
    pub fn list_snapshot_names(&self, year_month: YearMonth) -> Vec<SnapshotId> {
        let ids: Vec<SnapshotId> = self
            .list_all()
            .into_iter()
            .filter(|id| year_month.contains(id.date))
            .collect();
        debug!("Found {} snapshots for {}", ids.len(), year_month);
        ids
    }

    /// Number of snapshots dated within `year_month`.
    pub fn count(&self, year_month: YearMonth) -> usize {
        self.list_snapshot_names(year_month).len()
    }

    /// First snapshot of the month.
    pub fn earliest_snapshot(&self, year_month: YearMonth) -> Result<SnapshotId> {
        self.list_snapshot_names(year_month)
            .into_iter()
            .next()
            .ok_or_else(|| GainError::NotFound(format!("no snapshots for {year_month}")))
    }

    /// Last snapshot of the month.
    pub fn latest_snapshot(&self, year_month: YearMonth) -> Result<SnapshotId> {
        self.list_snapshot_names(year_month)
            .pop()
            .ok_or_else(|| GainError::NotFound(format!("no snapshots for {year_month}")))
    }

    /// Newest snapshot in the folder regardless of month.
    pub fn latest_overall(&self) -> Result<SnapshotId> {
        self.list_all().pop().ok_or_else(|| {
            GainError::NotFound(format!(
                "no snapshots in {}",
                self.data_folder().display()
            ))
        })
    }

    /// Path a snapshot with this identifier would live at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.data_folder()
            .join(format!("{name}.{SNAPSHOT_EXTENSION}"))
    }

    /// Whether a snapshot file with this identifier exists.
    pub fn exists(&self, name: &str) -> bool {
        is_plain_name(name) && self.path_for(name).is_file()
    }

    /// Read and parse the snapshot named `name`.
    ///
    /// Fails with [`GainError::NotFound`] when the file is absent and
    /// [`GainError::CorruptData`] when it is not valid JSON.
    pub fn load(&self, name: &str) -> Result<serde_json::Value> {
        if !self.exists(name) {
            return Err(GainError::NotFound(format!("snapshot {name}")));
        }

        let path = self.path_for(name);
        let content = std::fs::read_to_string(&path).map_err(|source| GainError::FileRead {
            path: path.clone(),
            source,
        })?;

        let value = serde_json::from_str(&content)
            .map_err(|source| GainError::CorruptData { path, source })?;
        debug!("Loaded snapshot {}", name);
        Ok(value)
    }
}

/// Identifiers are bare file stems; anything that could escape the folder is
/// treated as absent.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use chrono::{Datelike, Utc};
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tiers::Tier;
use crate::validation::SUPPORTED_LIMITS;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly guild point gain leaderboards and tier lookups
#[derive(Parser, Debug, Clone)]
#[command(
    name = "guild-gain",
    about = "Monthly guild point gain leaderboards and tier lookups",
    version
)]
pub struct Settings {
    /// Folder holding the dated snapshot files
    #[arg(long, env = "GUILD_GAIN_DATA_FOLDER")]
    pub data_folder: Option<PathBuf>,

    /// What to compute
    #[arg(long, default_value = "leaderboard", value_parser = ["leaderboard", "tier", "promotion", "latest"])]
    pub view: String,

    /// Year to evaluate (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month to evaluate, 1-12 (defaults to the current month)
    #[arg(long)]
    pub month: Option<u32>,

    /// Number of top members to show before tie extension
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Point value for the tier and promotion views
    #[arg(long)]
    pub points: Option<u64>,

    /// Recognised screenshot text to read the point value from
    #[arg(long, conflicts_with = "points")]
    pub text: Option<String>,

    /// Tiers the member currently holds (promotion view, repeatable)
    #[arg(long, value_parser = parse_tier)]
    pub held: Vec<Tier>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_tier(value: &str) -> Result<Tier, String> {
    value.parse::<Tier>().map_err(|e| e.to_string())
}

// ── StoreConfig ────────────────────────────────────────────────────────────────

/// Explicit configuration handed to the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Folder containing `*.json` snapshot files.
    pub data_folder: PathBuf,
}

impl StoreConfig {
    pub fn new(data_folder: impl Into<PathBuf>) -> Self {
        Self {
            data_folder: data_folder.into(),
        }
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.guild-gain/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".guild-gain").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, fill in defaults, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation: accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_defaults(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let persisted_top = last.top.filter(|top| SUPPORTED_LIMITS.contains(top));

        // CLI and environment always win over persisted values.
        if settings.data_folder.is_none() {
            settings.data_folder = last.data_folder;
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = persisted_top {
                settings.top = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::resolve_defaults(settings);

        // Only a limit that passes request validation is remembered.
        let mut params = LastUsedParams::from(&settings);
        if !SUPPORTED_LIMITS.contains(&settings.top) {
            params.top = persisted_top;
        }
        let _ = params.save_to(config_path);

        settings
    }

    /// Fill the target month from the current UTC date and apply `--debug`.
    fn resolve_defaults(mut settings: Settings) -> Settings {
        let today = Utc::now().date_naive();
        if settings.year.is_none() {
            settings.year = Some(today.year());
        }
        if settings.month.is_none() {
            settings.month = Some(today.month());
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The `(year, month)` to evaluate, falling back to the current UTC month.
    pub fn target_month(&self) -> (i32, u32) {
        let today = Utc::now().date_naive();
        (
            self.year.unwrap_or_else(|| today.year()),
            self.month.unwrap_or_else(|| today.month()),
        )
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data_folder: s.data_folder.clone(),
            top: Some(s.top),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

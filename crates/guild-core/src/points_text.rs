//! Point-value extraction from text recognised in a profile screenshot.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// Labels OCR commonly produces for "GP", followed by the digits of the value.
fn points_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:gp|gb|6b|6p|g@p|@p|g2)\D*(\d+)").expect("regex is valid")
    })
}

/// Return the first point value that follows a GP-like label in `text`.
///
/// Returns `None` when no label is followed by digits, or when the digits do
/// not fit in a `u64`.
pub fn extract_points(text: &str) -> Option<u64> {
    let caps = points_pattern().captures(text)?;
    let digits = caps.get(1)?.as_str();
    match digits.parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Ignoring point value {:?}: {}", digits, e);
            None
        }
    }
}

//! Plain-text and JSON rendering of structured results.

use guild_core::models::SnapshotId;
use guild_core::tiers::{PromotionPlan, Tier};
use guild_data::analysis::MonthlyGainResult;
use serde_json::json;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Format an integer with thousands separators.
///
/// ```text
/// 1234567 -> "1,234,567"
/// -9876   -> "-9,876"
/// ```
pub fn format_points(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a point total, which is never negative.
pub fn format_total(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn leaderboard(result: &MonthlyGainResult, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(result)?);
    }

    let mut lines = vec![format!(
        "Guild point gain {} -> {}",
        result.start_snapshot, result.end_snapshot
    )];
    for entry in &result.entries {
        lines.push(format!(
            "{}. {} - {}",
            entry.rank,
            entry.identity,
            format_points(entry.delta)
        ));
    }
    if !result.dropped.is_empty() {
        lines.push(format!("Not in final snapshot: {}", result.dropped.join(", ")));
    }
    Ok(lines.join("\n"))
}

pub fn tier(points: u64, tier: Option<Tier>, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(
            &json!({ "points": points, "tier": tier }),
        )?);
    }
    Ok(match tier {
        Some(t) => format!("GP {}: {}", format_total(points), t),
        None => format!("GP {}: too low for any rank", format_total(points)),
    })
}

pub fn promotion(plan: &PromotionPlan, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(plan)?);
    }
    Ok(match plan {
        PromotionPlan::NoTier => "GP value is too low for any rank.".to_string(),
        PromotionPlan::AlreadyHigher { held } => {
            format!("Already holds a higher rank: {held}")
        }
        PromotionPlan::UpToDate { tier } => format!("Rank is already up to date: {tier}"),
        PromotionPlan::Promote { to, remove } if remove.is_empty() => {
            format!("Promote to {to}")
        }
        PromotionPlan::Promote { to, remove } => {
            let removed: Vec<&str> = remove.iter().map(|t| t.as_str()).collect();
            format!("Promote to {to}, remove {}", removed.join(", "))
        }
    })
}

pub fn latest(snapshot: &SnapshotId, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(snapshot)?);
    }
    Ok(format!("{} ({})", snapshot.name, snapshot.date))
}

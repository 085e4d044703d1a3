use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{GainError, Result};
use crate::models::YearMonth;

/// Years for which monthly gains may be requested.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2025..=2099;

/// Accepted leaderboard sizes.
pub const SUPPORTED_LIMITS: RangeInclusive<usize> = 1..=20;

/// A validated request for a monthly gain leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyGainRequest {
    pub year_month: YearMonth,
    /// Requested number of leaderboard places before tie extension.
    pub limit: usize,
}

impl MonthlyGainRequest {
    /// Validate caller-supplied values.
    ///
    /// Every out-of-range field is reported in a single
    /// [`GainError::Validation`] message, one violation per line.
    pub fn new(year: i32, month: u32, limit: usize) -> Result<Self> {
        let mut problems: Vec<String> = Vec::new();

        if !SUPPORTED_YEARS.contains(&year) {
            problems.push(format!(
                "year must be between {} and {}, got {}",
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end(),
                year
            ));
        }
        if !(1..=12).contains(&month) {
            problems.push(format!("month must be between 1 and 12, got {month}"));
        }
        if !SUPPORTED_LIMITS.contains(&limit) {
            problems.push(format!(
                "number of top members must be between {} and {}, got {}",
                SUPPORTED_LIMITS.start(),
                SUPPORTED_LIMITS.end(),
                limit
            ));
        }

        if !problems.is_empty() {
            return Err(GainError::Validation(problems.join("\n")));
        }

        Ok(Self {
            year_month: YearMonth::new(year, month),
            limit,
        })
    }
}

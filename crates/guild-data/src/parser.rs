//! Normalisation of raw, schema-variable snapshot payloads.
//!
//! Guild exports have changed shape over time: the member list may be the
//! whole document, sit under `members`, or be wrapped in a `guildData`
//! object, and member fields have used both minified (`a`, `e`) and
//! descriptive (`name`, `gpEarned`) names. All of that is reconciled here
//! through fixed key tables so the rest of the pipeline sees a [`Roster`].

use guild_core::error::{GainError, Result};
use guild_core::models::{MemberRecord, Roster};
use serde_json::Value;
use tracing::debug;

// ── Compatibility tables ──────────────────────────────────────────────────────

/// Keys under which the guild object may be wrapped.
pub const CONTAINER_KEYS: &[&str] = &["guildData", "guild_data"];

/// Keys under which the member list may be stored.
pub const MEMBER_LIST_KEYS: &[&str] = &["members"];

/// Member identity keys, highest priority first.
pub const IDENTITY_KEYS: &[&str] = &["a", "name", "username"];

/// Member point keys, highest priority first.
pub const POINTS_KEYS: &[&str] = &["e", "gpEarned", "gp"];

// ── SnapshotParser ────────────────────────────────────────────────────────────

/// Stateless payload normaliser.
pub struct SnapshotParser;

impl SnapshotParser {
    /// Normalise `payload` into a roster keyed by identity.
    ///
    /// Fails with [`GainError::Schema`] when no member list can be located,
    /// a member has no identity or points under any known key, or the same
    /// identity appears twice.
    pub fn normalize(payload: &Value) -> Result<Roster> {
        let members = Self::locate_members(payload)?;
        let mut roster = Roster::new();

        for (index, raw) in members.iter().enumerate() {
            let record = Self::parse_member(index, raw)?;
            if roster.contains_key(&record.identity) {
                return Err(GainError::Schema(format!(
                    "duplicate identity {:?} at member index {}",
                    record.identity, index
                )));
            }
            roster.insert(record.identity.clone(), record);
        }

        debug!("Normalised {} members", roster.len());
        Ok(roster)
    }

    /// Find the member array inside the payload.
    fn locate_members(payload: &Value) -> Result<&Vec<Value>> {
        if let Value::Array(list) = payload {
            return Ok(list);
        }

        let container = CONTAINER_KEYS
            .iter()
            .find_map(|&key| populated(payload, key))
            .unwrap_or(payload);

        if let Value::Array(list) = container {
            return Ok(list);
        }

        match MEMBER_LIST_KEYS
            .iter()
            .find_map(|&key| populated(container, key))
        {
            Some(Value::Array(list)) => Ok(list),
            Some(other) => Err(GainError::Schema(format!(
                "member list is not an array (found {})",
                type_name(other)
            ))),
            None => Err(GainError::Schema(
                "no guild data and no members found in payload".to_string(),
            )),
        }
    }

    fn parse_member(index: usize, raw: &Value) -> Result<MemberRecord> {
        if !raw.is_object() {
            return Err(GainError::Schema(format!(
                "member at index {} is not an object (found {})",
                index,
                type_name(raw)
            )));
        }

        let identity = match IDENTITY_KEYS.iter().find_map(|&key| populated(raw, key)) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(other) => {
                return Err(GainError::Schema(format!(
                    "member at index {} has an invalid identity: {}",
                    index, other
                )))
            }
            None => {
                return Err(GainError::Schema(format!(
                    "no identity found for member at index {}",
                    index
                )))
            }
        };

        let points = match POINTS_KEYS.iter().find_map(|&key| populated(raw, key)) {
            Some(value) => as_points(value).ok_or_else(|| {
                GainError::Schema(format!(
                    "member {:?} has an invalid point value: {}",
                    identity, value
                ))
            })?,
            None => {
                return Err(GainError::Schema(format!(
                    "no point value found for member {:?}",
                    identity
                )))
            }
        };

        Ok(MemberRecord { identity, points })
    }
}

/// `obj[key]` when present and not `null`.
fn populated<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// A non-negative integral point total that fits in an `i64`.
fn as_points(value: &Value) -> Option<u64> {
    let points = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= i64::MAX as f64)
                .map(|f| f as u64)
        })?,
        _ => return None,
    };
    (points <= i64::MAX as u64).then_some(points)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

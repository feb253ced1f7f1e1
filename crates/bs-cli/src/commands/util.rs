//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use bs_core::{BabyEvent, BabyId, BabyProfile, EventId, ValidationError, validate_event};
use bs_db::Database;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::Config;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$"));

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either ISO 8601 or time relative to `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "now", "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if s == "now" {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let re = RELATIVE_TIME_RE
        .as_ref()
        .map_err(|err| anyhow!("relative time pattern failed to compile: {err}"))?;
    let Some(caps) = re.captures(s) else {
        bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Picks the profile a command applies to.
///
/// Order: the explicit `--baby` value, then `default_baby` from config, then
/// the only profile in the database.
pub fn resolve_baby(db: &Database, explicit: Option<&str>, config: &Config) -> Result<BabyProfile> {
    if let Some(id) = explicit.or(config.default_baby.as_deref()) {
        let id = BabyId::new(id)?;
        return db
            .get_baby(&id)?
            .ok_or_else(|| anyhow!("baby not found: {id}"));
    }

    let mut babies = db.list_babies()?;
    match babies.len() {
        0 => bail!("no babies yet. Add one with 'bs baby add <name> --born <YYYY-MM-DD>'"),
        1 => Ok(babies.remove(0)),
        n => bail!("{n} babies on file; pick one with --baby <id>"),
    }
}

/// Generates an ID for a new event.
pub fn new_event_id() -> Result<EventId> {
    Ok(EventId::new(uuid::Uuid::new_v4().to_string())?)
}

/// Fails with every validation message when `event` is not acceptable.
pub fn ensure_valid(event: &BabyEvent) -> Result<()> {
    let errors = validate_event(event);
    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ValidationError::to_string).collect();
    bail!("invalid {}: {}", bs_core::CareEvent::kind(event), messages.join("; "))
}

/// Formats milliseconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats fractional hours the same way as [`format_duration`].
#[allow(clippy::cast_possible_truncation)]
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() {
        return "0m".to_string();
    }
    format_duration((hours * 3_600_000.0).round() as i64)
}

//! Ends the sleep in progress.

use std::io::Write;

use anyhow::{Result, anyhow};
use bs_core::{BabyEvent, SleepEvent, SleepQuality};
use bs_db::Database;
use chrono::{DateTime, Utc};
use clap::Args;

use super::util::{ensure_valid, format_duration, parse_datetime, resolve_baby};
use crate::Config;

#[derive(Debug, Args)]
pub struct EndSleepArgs {
    /// Baby profile ID; optional when only one profile exists.
    #[arg(long)]
    pub baby: Option<String>,
    /// When the baby woke.
    #[arg(long, default_value = "now")]
    pub at: String,
    /// excellent, good, fair or poor.
    #[arg(long)]
    pub quality: Option<SleepQuality>,
}

/// Closes the most recent ongoing sleep and returns it.
pub fn end<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &EndSleepArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<SleepEvent> {
    let at = parse_datetime(&args.at, now)?;
    let baby = resolve_baby(db, args.baby.as_deref(), config)?;
    let mut sleep = db
        .ongoing_sleep(&baby.id)?
        .ok_or_else(|| anyhow!("{} is not asleep", baby.name))?;

    sleep.end(at, args.quality);
    let event = BabyEvent::from(sleep.clone());
    ensure_valid(&event)?;
    db.update_event(&event)?;

    tracing::debug!(event = %sleep.meta.id, "ended sleep");
    writeln!(
        writer,
        "{} slept {}",
        baby.name,
        format_duration(sleep.duration_ms().unwrap_or(0))
    )?;
    Ok(sleep)
}

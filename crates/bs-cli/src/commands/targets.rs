//! Age-appropriate targets for a profile.

use std::io::Write;

use anyhow::Result;
use bs_core::targets::{feeding_volume, sleep_hours, wake_window_minutes};
use bs_db::Database;
use chrono::{DateTime, TimeZone};
use clap::Args;

use super::util::resolve_baby;
use crate::Config;

#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Baby profile ID; optional when only one profile exists.
    #[arg(long, conflicts_with = "age")]
    pub baby: Option<String>,
    /// Show targets for an age in months instead of a profile.
    #[arg(long)]
    pub age: Option<u32>,
}

fn write_targets<W: Write>(writer: &mut W, age_months: u32) -> Result<()> {
    let sleep = sleep_hours(age_months);
    let feeding = feeding_volume(age_months);
    writeln!(writer, "Sleep per day:   {}-{} hours", sleep.lower, sleep.upper)?;
    writeln!(writer, "Feeding per day: {}-{} oz", feeding.lower, feeding.upper)?;

    let first = wake_window_minutes(age_months, 1);
    let second = wake_window_minutes(age_months, 2);
    let later = wake_window_minutes(age_months, 3);
    if first == second && second == later {
        writeln!(writer, "Wake windows:    {}-{} minutes", first.lower, first.upper)?;
    } else {
        writeln!(writer, "Wake windows:")?;
        writeln!(writer, "  1st:           {}-{} minutes", first.lower, first.upper)?;
        writeln!(writer, "  2nd:           {}-{} minutes", second.lower, second.upper)?;
        writeln!(writer, "  later:         {}-{} minutes", later.lower, later.upper)?;
    }
    Ok(())
}

/// Runs `bs targets`.
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    args: &TargetsArgs,
    config: &Config,
    now: &DateTime<Tz>,
) -> Result<()> {
    let age_months = if let Some(age) = args.age {
        writeln!(writer, "TARGETS: {age} months")?;
        age
    } else {
        let baby = resolve_baby(db, args.baby.as_deref(), config)?;
        let age = baby.age_in_months(now);
        writeln!(writer, "TARGETS: {} ({age} months)", baby.name)?;
        age
    };
    writeln!(writer)?;
    write_targets(writer, age_months)
}

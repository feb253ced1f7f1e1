//! Report command for sleep and feeding analytics.
//!
//! This module implements `bs report sleep|feeding` with range options
//! (today, week, month, custom) and output formats (human-readable, JSON).

use std::io::Write;

use anyhow::{Result, bail};
use bs_core::{
    BabyProfile, DateRange, DateRangeSelector, FeedingAnalytics, SleepAnalytics, TargetRange,
    TargetStatus, compute_feeding_analytics, compute_sleep_analytics, targets,
};
use bs_db::Database;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use clap::{Args, ValueEnum};
use serde::Serialize;

use super::util::{format_duration, format_hours, parse_datetime, resolve_baby};
use crate::Config;

/// Most recent wake windows shown in the text report.
const WAKE_WINDOWS_SHOWN: usize = 5;

/// Report range as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    Today,
    Week,
    Month,
    Custom,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Baby profile ID; optional when only one profile exists.
    #[arg(long)]
    pub baby: Option<String>,
    /// Range to report on. Weeks start on Monday.
    #[arg(long, value_enum, default_value_t = RangeArg::Week)]
    pub range: RangeArg,
    /// Start of a custom range (ISO 8601 or e.g. '3 days ago').
    #[arg(long)]
    pub start: Option<String>,
    /// End of a custom range, exclusive.
    #[arg(long)]
    pub end: Option<String>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    fn selector(&self, now: DateTime<Utc>) -> Result<DateRangeSelector> {
        if self.range != RangeArg::Custom && (self.start.is_some() || self.end.is_some()) {
            bail!("--start and --end only apply to --range custom");
        }

        Ok(match self.range {
            RangeArg::Today => DateRangeSelector::Today,
            RangeArg::Week => DateRangeSelector::Week,
            RangeArg::Month => DateRangeSelector::Month,
            RangeArg::Custom => {
                let (Some(start), Some(end)) = (&self.start, &self.end) else {
                    bail!("--range custom needs both --start and --end");
                };
                let start = parse_datetime(start, now)?;
                let end = parse_datetime(end, now)?;
                if end <= start {
                    bail!("--end must be after --start");
                }
                DateRangeSelector::Custom { start, end }
            }
        })
    }
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
struct JsonReport<'a, T> {
    generated_at: String,
    timezone: &'a str,
    baby: &'a BabyProfile,
    analytics: &'a T,
    target: JsonTarget,
}

/// A daily average checked against its age target.
#[derive(Debug, Serialize)]
struct JsonTarget {
    metric: &'static str,
    value: f64,
    range: TargetRange<f64>,
    status: TargetStatus,
}

impl JsonTarget {
    fn new(metric: &'static str, value: f64, range: TargetRange<f64>) -> Self {
        Self {
            metric,
            value,
            range,
            status: range.classify(value),
        }
    }
}

fn write_json<W: Write, T: Serialize>(
    writer: &mut W,
    baby: &BabyProfile,
    analytics: &T,
    target: JsonTarget,
    generated_at: DateTime<Utc>,
    timezone: &str,
) -> Result<()> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        timezone,
        baby,
        analytics,
        target,
    };
    writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

// ========== Text Output ==========

/// Formats the range description for the report header.
fn period_description<Tz: TimeZone>(
    selector: &DateRangeSelector,
    range: &DateRange,
    tz: &Tz,
) -> String {
    let start = range.start.with_timezone(tz).naive_local();
    match selector {
        // "Wednesday, Jan 29, 2025"
        DateRangeSelector::Today => start.format("%A, %b %-d, %Y").to_string(),
        // "Week of Jan 27, 2025"
        DateRangeSelector::Week => format!("Week of {}", start.format("%b %-d, %Y")),
        // "January 2025"
        DateRangeSelector::Month => start.format("%B %Y").to_string(),
        DateRangeSelector::Custom { .. } => {
            let end = range.end.with_timezone(tz).naive_local();
            format!(
                "{} to {}",
                start.format("%b %-d, %Y %H:%M"),
                end.format("%b %-d, %Y %H:%M")
            )
        }
    }
}

/// "this week", "today", ...
const fn period_phrase(selector: &DateRangeSelector) -> &'static str {
    match selector {
        DateRangeSelector::Today => "today",
        DateRangeSelector::Week => "this week",
        DateRangeSelector::Month => "this month",
        DateRangeSelector::Custom { .. } => "in this range",
    }
}

fn write_heading<W: Write>(writer: &mut W, title: &str) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{title}")?;
    writeln!(writer, "{}", "─".repeat(title.chars().count()))?;
    Ok(())
}

fn write_header<W: Write, Tz: TimeZone>(
    writer: &mut W,
    kind: &str,
    baby: &BabyProfile,
    selector: &DateRangeSelector,
    range: &DateRange,
    tz: &Tz,
    age_months: u32,
) -> Result<()> {
    writeln!(
        writer,
        "{kind} REPORT: {}, {}",
        baby.name,
        period_description(selector, range, tz)
    )?;
    writeln!(writer, "Age: {age_months} months")?;
    Ok(())
}

fn format_sleep_report<W: Write, Tz: TimeZone>(
    writer: &mut W,
    baby: &BabyProfile,
    analytics: &SleepAnalytics,
    tz: &Tz,
) -> Result<()> {
    write_header(
        writer,
        "SLEEP",
        baby,
        &analytics.selector,
        &analytics.range,
        tz,
        analytics.age_months,
    )?;

    // wake windows cover the whole history, not just this period
    if analytics.longest_sleep_ms == 0 && analytics.ongoing_count == 0 {
        writeln!(writer)?;
        writeln!(writer, "No sleep recorded {}.", period_phrase(&analytics.selector))?;
    } else {
        write_sleep_summary(writer, analytics)?;
    }
    write_wake_windows(writer, analytics, tz)
}

fn write_sleep_summary<W: Write>(writer: &mut W, analytics: &SleepAnalytics) -> Result<()> {
    let target = targets::sleep_hours(analytics.age_months);
    write_heading(writer, "SUMMARY")?;
    writeln!(writer, "Total sleep:    {}", format_hours(analytics.total_sleep_hours))?;
    writeln!(
        writer,
        "Daily average:  {} (target {}-{}h, {})",
        format_hours(analytics.average_daily_sleep),
        target.lower,
        target.upper,
        target.classify(analytics.average_daily_sleep)
    )?;
    writeln!(writer, "Night average:  {}", format_hours(analytics.night_sleep_average))?;
    writeln!(writer, "Nap average:    {}", format_hours(analytics.nap_average))?;
    writeln!(
        writer,
        "Naps:           {} ({:.1} per day)",
        analytics.nap_count, analytics.average_naps_per_day
    )?;
    writeln!(writer, "Longest sleep:  {}", format_duration(analytics.longest_sleep_ms))?;
    writeln!(writer, "Shortest sleep: {}", format_duration(analytics.shortest_sleep_ms))?;
    if analytics.ongoing_count > 0 {
        writeln!(writer, "In progress:    {}", analytics.ongoing_count)?;
    }

    let days: Vec<_> = analytics
        .sleep_by_day
        .iter()
        .filter(|day| day.total_sleep_ms > 0 || day.nap_count > 0)
        .collect();
    if !days.is_empty() {
        write_heading(writer, "BY DAY")?;
        for day in days {
            writeln!(
                writer,
                "{}  {:>7}  naps {} ({})  night {}",
                day.date.format("%a %b %d"),
                format_duration(day.total_sleep_ms),
                day.nap_count,
                format_duration(day.nap_sleep_ms),
                format_duration(day.night_sleep_ms)
            )?;
        }
    }
    Ok(())
}

fn write_wake_windows<W: Write, Tz: TimeZone>(
    writer: &mut W,
    analytics: &SleepAnalytics,
    tz: &Tz,
) -> Result<()> {
    if !analytics.wake_windows.is_empty() {
        write_heading(writer, "WAKE WINDOWS")?;
        let skip = analytics.wake_windows.len().saturating_sub(WAKE_WINDOWS_SHOWN);
        for window in &analytics.wake_windows[skip..] {
            writeln!(
                writer,
                "#{:<3} {}  {:>7}  {}",
                window.ordinal,
                window.start_time.with_timezone(tz).naive_local().format("%a %b %d %H:%M"),
                format_duration(window.duration_ms),
                window.quality
            )?;
        }
        if skip > 0 {
            writeln!(writer, "(last {WAKE_WINDOWS_SHOWN} of {})", analytics.wake_windows.len())?;
        }
    }

    Ok(())
}

fn format_feeding_report<W: Write, Tz: TimeZone>(
    writer: &mut W,
    baby: &BabyProfile,
    analytics: &FeedingAnalytics,
    age_months: u32,
    tz: &Tz,
) -> Result<()> {
    write_header(
        writer,
        "FEEDING",
        baby,
        &analytics.selector,
        &analytics.range,
        tz,
        age_months,
    )?;

    if analytics.total_feedings == 0 {
        writeln!(writer)?;
        writeln!(writer, "No feeds recorded {}.", period_phrase(&analytics.selector))?;
        return Ok(());
    }

    let target = targets::feeding_volume(age_months);
    write_heading(writer, "SUMMARY")?;
    writeln!(
        writer,
        "Feeds:          {} ({:.1} per day)",
        analytics.total_feedings, analytics.average_feedings_per_day
    )?;
    writeln!(writer, "Total volume:   {:.1} oz", analytics.total_volume)?;
    writeln!(
        writer,
        "Daily volume:   {:.1} oz (target {}-{} oz, {})",
        analytics.average_daily_volume,
        target.lower,
        target.upper,
        target.classify(analytics.average_daily_volume)
    )?;
    writeln!(writer, "Per feed:       {:.1} oz", analytics.average_volume_per_feed)?;
    if analytics.volume_feed_count < analytics.total_feedings {
        writeln!(
            writer,
            "Per recorded feed: {:.1} oz over {} feeds with a volume",
            analytics.average_volume_per_recorded_feed, analytics.volume_feed_count
        )?;
    }
    if analytics.total_feedings > 1 {
        writeln!(
            writer,
            "Avg interval:   {}",
            format_duration(analytics.average_interval_between_feeds_ms)
        )?;
    }

    write_heading(writer, "BY METHOD")?;
    for (method, count) in &analytics.feedings_by_method {
        writeln!(writer, "{:<8} {count:>3}", method.as_str())?;
    }

    write_heading(writer, "BY DAY")?;
    for day in analytics.feedings_by_day.iter().filter(|day| day.count > 0) {
        write!(
            writer,
            "{}  {:>2} feeds  {:>5.1} oz",
            day.date.format("%a %b %d"),
            day.count,
            day.total_volume
        )?;
        if day.count > 1 {
            write!(writer, "  every {}", format_duration(day.average_interval_ms))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

// ========== Commands ==========

/// Runs `bs report sleep`.
pub fn sleep<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    args: &ReportArgs,
    config: &Config,
    now: &DateTime<Tz>,
    timezone: &str,
) -> Result<()> {
    let generated_at = now.with_timezone(&Utc);
    let selector = args.selector(generated_at)?;
    let baby = resolve_baby(db, args.baby.as_deref(), config)?;
    let sleeps = db.sleep_events(&baby.id)?;

    let analytics = compute_sleep_analytics(&sleeps, &baby, selector, now);

    if args.json {
        let target = JsonTarget::new(
            "average_daily_sleep",
            analytics.average_daily_sleep,
            targets::sleep_hours(analytics.age_months),
        );
        return write_json(writer, &baby, &analytics, target, generated_at, timezone);
    }
    format_sleep_report(writer, &baby, &analytics, &now.timezone())
}

/// Runs `bs report feeding`.
pub fn feeding<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    args: &ReportArgs,
    config: &Config,
    now: &DateTime<Tz>,
    timezone: &str,
) -> Result<()> {
    let generated_at = now.with_timezone(&Utc);
    let selector = args.selector(generated_at)?;
    let baby = resolve_baby(db, args.baby.as_deref(), config)?;
    let feeds = db.feed_events(&baby.id)?;

    let analytics = compute_feeding_analytics(&feeds, &baby, selector, now);
    let age_months = baby.age_in_months(now);

    if args.json {
        let target = JsonTarget::new(
            "average_daily_volume",
            analytics.average_daily_volume,
            targets::feeding_volume(age_months),
        );
        return write_json(writer, &baby, &analytics, target, generated_at, timezone);
    }
    format_feeding_report(writer, &baby, &analytics, age_months, &now.timezone())
}

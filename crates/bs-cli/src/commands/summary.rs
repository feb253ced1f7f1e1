//! Per-day overview of every event kind.

use std::io::Write;

use anyhow::{Context, Result};
use bs_core::{BabyProfile, DateRange, DaySummary, summarize_days};
use bs_db::Database;
use chrono::{DateTime, Days, NaiveDate, TimeZone};
use clap::Args;
use serde::Serialize;

use super::util::{format_hours, resolve_baby};
use crate::Config;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Baby profile ID; optional when only one profile exists.
    #[arg(long)]
    pub baby: Option<String>,
    /// Last day to summarize (YYYY-MM-DD); today by default.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Number of days to summarize, ending at --date.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=366))]
    pub days: u32,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    baby: &'a BabyProfile,
    days: &'a [DaySummary],
}

fn format_day<W: Write>(writer: &mut W, day: &DaySummary) -> Result<()> {
    writeln!(writer, "{}", day.date.format("%a %b %-d, %Y"))?;
    writeln!(
        writer,
        "  Feeds:       {} ({:.1} oz)",
        day.total_feedings, day.total_volume
    )?;
    writeln!(
        writer,
        "  Naps:        {} ({})",
        day.nap_count,
        format_hours(day.day_sleep_hours)
    )?;
    writeln!(writer, "  Night sleep: {}", format_hours(day.night_sleep_hours))?;
    writeln!(writer, "  Total sleep: {}", format_hours(day.total_sleep_hours()))?;
    writeln!(writer, "  Diapers:     {}", day.diaper_count)?;
    if day.milestones > 0 {
        writeln!(writer, "  Milestones:  {}", day.milestones)?;
    }
    Ok(())
}

/// Runs `bs summary`.
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    args: &SummaryArgs,
    config: &Config,
    now: &DateTime<Tz>,
) -> Result<Vec<DaySummary>> {
    let tz = now.timezone();
    let last = args.date.unwrap_or_else(|| now.date_naive());
    let first = last
        .checked_sub_days(Days::new(u64::from(args.days.saturating_sub(1))))
        .context("summary range starts before the supported calendar")?;
    let range = DateRange::new(
        DateRange::for_day(&tz, first).start,
        DateRange::for_day(&tz, last).end,
    );

    let baby = resolve_baby(db, args.baby.as_deref(), config)?;
    let events = db.list_events_in_range(&baby.id, range.start, range.end)?;
    let summaries = summarize_days(&events, &range, &tz);
    tracing::debug!(baby = %baby.id, events = events.len(), days = summaries.len(), "summarized");

    if args.json {
        let report = JsonSummary {
            baby: &baby,
            days: &summaries,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(summaries);
    }

    writeln!(writer, "SUMMARY: {}", baby.name)?;
    for day in &summaries {
        writeln!(writer)?;
        format_day(writer, day)?;
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs_core::{
        BabyEvent, BabyId, DiaperEvent, DiaperType, EventId, EventMeta, FeedEvent, FeedMethod,
        MilestoneCategory, MilestoneEvent, SleepEvent, UserId, Volume, VolumeUnit,
    };
    use chrono::{FixedOffset, Utc};
    use insta::assert_snapshot;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    fn meta(id: &str, timestamp: DateTime<Utc>) -> EventMeta {
        EventMeta::new(
            EventId::new(id).unwrap(),
            BabyId::new("b1").unwrap(),
            UserId::new("caregiver").unwrap(),
            timestamp,
        )
    }

    fn setup() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let dob = NaiveDate::from_ymd_opt(2024, 9, 20).unwrap();
        db.insert_baby(&BabyProfile::new(BabyId::new("b1").unwrap(), "Robin", dob))
            .unwrap();
        let events: Vec<BabyEvent> = vec![
            FeedEvent::new(meta("f1", at(28, 6)), FeedMethod::Bottle)
                .with_volume(Volume {
                    amount: 4.5,
                    unit: VolumeUnit::Oz,
                })
                .into(),
            SleepEvent::new(meta("s1", at(28, 13)), at(28, 13), false)
                .ended(at(28, 14), None)
                .into(),
            SleepEvent::new(meta("s2", at(28, 19)), at(28, 19), true)
                .ended(at(29, 6), None)
                .into(),
            DiaperEvent {
                meta: meta("d1", at(29, 7)),
                diaper_type: DiaperType::Wet,
            }
            .into(),
            MilestoneEvent {
                meta: meta("m1", at(29, 9)),
                title: "Rolled over".to_string(),
                description: None,
                category: MilestoneCategory::Physical,
            }
            .into(),
        ];
        db.insert_events(&events).unwrap();
        db
    }

    fn args(days: u32) -> SummaryArgs {
        SummaryArgs {
            baby: None,
            date: None,
            days,
            json: false,
        }
    }

    #[test]
    fn summarizes_trailing_days() {
        let db = setup();
        let now = at(29, 16);
        let mut output = Vec::new();

        let days = run(&mut output, &db, &args(2), &Config::default(), &now).unwrap();

        assert_eq!(days.len(), 2);
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        SUMMARY: Robin

        Tue Jan 28, 2025
          Feeds:       1 (4.5 oz)
          Naps:        1 (1h 0m)
          Night sleep: 11h 0m
          Total sleep: 12h 0m
          Diapers:     0

        Wed Jan 29, 2025
          Feeds:       0 (0.0 oz)
          Naps:        0 (0m)
          Night sleep: 0m
          Total sleep: 0m
          Diapers:     1
          Milestones:  1
        ");
    }

    #[test]
    fn day_boundaries_follow_time_zone() {
        // the 06:00 UTC feed is still Jan 27 at UTC-8
        let tz = FixedOffset::west_opt(8 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 1, 28, 12, 0, 0).unwrap();
        let db = setup();
        let mut output = Vec::new();
        let summary_args = SummaryArgs {
            date: NaiveDate::from_ymd_opt(2025, 1, 27),
            ..args(1)
        };

        let days = run(&mut output, &db, &summary_args, &Config::default(), &now).unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 27).unwrap());
        assert_eq!(days[0].total_feedings, 1);
        assert_eq!(days[0].nap_count, 0);
    }

    #[test]
    fn json_output() {
        let db = setup();
        let mut output = Vec::new();
        let summary_args = SummaryArgs {
            json: true,
            ..args(1)
        };

        run(&mut output, &db, &summary_args, &Config::default(), &at(29, 16)).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["baby"]["id"], "b1");
        assert_eq!(json["days"][0]["date"], "2025-01-29");
        assert_eq!(json["days"][0]["diaper_count"], 1);
    }
}

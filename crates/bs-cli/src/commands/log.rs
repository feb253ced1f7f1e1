//! Commands that log new care events.

use std::io::Write;

use anyhow::{Result, bail};
use bs_core::{
    BabyEvent, BabyProfile, BreastSide, CareEvent, DiaperEvent, DiaperType, EventId, EventMeta,
    FeedEvent, FeedMethod, MilestoneCategory, MilestoneEvent, SleepEvent, SleepQuality, UserId,
    Volume, VolumeUnit,
};
use bs_db::Database;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;

use super::util::{ensure_valid, new_event_id, parse_datetime, resolve_baby};
use crate::Config;

/// Options shared by every log command.
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Baby profile ID; optional when only one profile exists.
    #[arg(long)]
    pub baby: Option<String>,
    /// Free-form notes.
    #[arg(long)]
    pub notes: Option<String>,
    /// Caregiver recorded as the author; `caregiver` from config by default.
    #[arg(long)]
    pub by: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogSleepArgs {
    #[command(flatten)]
    pub event: EventArgs,
    /// When the baby fell asleep (ISO 8601 or e.g. '20 minutes ago').
    #[arg(long, default_value = "now")]
    pub start: String,
    /// When the baby woke; omit to log a sleep in progress.
    #[arg(long)]
    pub end: Option<String>,
    /// Night sleep rather than a nap.
    #[arg(long)]
    pub night: bool,
    /// excellent, good, fair or poor. Only used with --end.
    #[arg(long)]
    pub quality: Option<SleepQuality>,
    /// Nap number for the day.
    #[arg(long)]
    pub nap_number: Option<u32>,
}

#[derive(Debug, Args)]
pub struct LogFeedArgs {
    #[command(flatten)]
    pub event: EventArgs,
    /// bottle, breast, solids or mixed.
    pub method: FeedMethod,
    /// When the feed happened.
    #[arg(long, default_value = "now")]
    pub at: String,
    /// Volume fed.
    #[arg(long)]
    pub volume: Option<f64>,
    /// Unit for --volume: oz or ml.
    #[arg(long, default_value = "oz")]
    pub unit: VolumeUnit,
    /// Duration in minutes.
    #[arg(long)]
    pub duration: Option<u32>,
    /// left, right or both.
    #[arg(long)]
    pub side: Option<BreastSide>,
    /// What was eaten, for solids.
    #[arg(long)]
    pub food: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogDiaperArgs {
    #[command(flatten)]
    pub event: EventArgs,
    /// wet, dirty or both.
    pub diaper_type: DiaperType,
    /// When the change happened.
    #[arg(long, default_value = "now")]
    pub at: String,
}

#[derive(Debug, Args)]
pub struct LogMilestoneArgs {
    #[command(flatten)]
    pub event: EventArgs,
    /// Short title, e.g. "First smile".
    pub title: String,
    /// Longer description.
    #[arg(long)]
    pub description: Option<String>,
    /// physical, cognitive, social, language or other.
    #[arg(long, default_value = "other")]
    pub category: MilestoneCategory,
    /// When it happened.
    #[arg(long, default_value = "now")]
    pub at: String,
}

fn new_meta(
    db: &Database,
    args: &EventArgs,
    config: &Config,
    timestamp: DateTime<Utc>,
) -> Result<(BabyProfile, EventMeta)> {
    let baby = resolve_baby(db, args.baby.as_deref(), config)?;
    let created_by = UserId::new(args.by.as_deref().unwrap_or(&config.caregiver))?;
    let mut meta = EventMeta::new(new_event_id()?, baby.id.clone(), created_by, timestamp);
    if let Some(notes) = args.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        meta = meta.with_notes(notes);
    }
    Ok((baby, meta))
}

fn store<W: Write>(
    writer: &mut W,
    db: &mut Database,
    baby: &BabyProfile,
    event: &BabyEvent,
) -> Result<EventId> {
    ensure_valid(event)?;
    db.insert_event(event)?;
    tracing::debug!(event = %event.id(), kind = %event.kind(), "logged event");
    writeln!(writer, "Logged {} for {} ({})", event.kind(), baby.name, event.id())?;
    Ok(event.id().clone())
}

/// Logs a completed or in-progress sleep.
pub fn sleep<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &LogSleepArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<EventId> {
    let start = parse_datetime(&args.start, now)?;
    let end = args.end.as_deref().map(|e| parse_datetime(e, now)).transpose()?;
    let (baby, meta) = new_meta(db, &args.event, config, now)?;

    if end.is_none() {
        if let Some(ongoing) = db.ongoing_sleep(&baby.id)? {
            bail!(
                "{} has been asleep since {}; end that sleep with 'bs sleep end' first",
                baby.name,
                ongoing.start_time.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
        }
    }

    let mut sleep = SleepEvent::new(meta, start, args.night);
    sleep.nap_number = args.nap_number;
    if let Some(end) = end {
        sleep.end(end, args.quality);
    }

    store(writer, db, &baby, &sleep.into())
}

/// Logs a feed.
pub fn feed<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &LogFeedArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<EventId> {
    let at = parse_datetime(&args.at, now)?;
    let (baby, meta) = new_meta(db, &args.event, config, at)?;

    let mut feed = FeedEvent::new(meta, args.method);
    feed.volume = args.volume.map(|amount| Volume {
        amount,
        unit: args.unit,
    });
    feed.duration_minutes = args.duration;
    feed.side = args.side;
    feed.food_type = args.food.clone();

    store(writer, db, &baby, &feed.into())
}

/// Logs a diaper change.
pub fn diaper<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &LogDiaperArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<EventId> {
    let at = parse_datetime(&args.at, now)?;
    let (baby, meta) = new_meta(db, &args.event, config, at)?;
    let event = DiaperEvent {
        meta,
        diaper_type: args.diaper_type,
    };
    store(writer, db, &baby, &event.into())
}

/// Logs a milestone.
pub fn milestone<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &LogMilestoneArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<EventId> {
    let at = parse_datetime(&args.at, now)?;
    let (baby, meta) = new_meta(db, &args.event, config, at)?;
    let event = MilestoneEvent {
        meta,
        title: args.title.trim().to_string(),
        description: args.description.clone(),
        category: args.category,
    };
    store(writer, db, &baby, &event.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::now;
    use bs_core::BabyId;
    use chrono::{NaiveDate, TimeZone};

    fn setup() -> (Database, Config) {
        let mut db = Database::open_in_memory().unwrap();
        let dob = NaiveDate::from_ymd_opt(2024, 9, 20).unwrap();
        db.insert_baby(&BabyProfile::new(BabyId::new("b1").unwrap(), "Robin", dob))
            .unwrap();
        (db, Config::default())
    }

    fn event_args() -> EventArgs {
        EventArgs {
            baby: None,
            notes: None,
            by: None,
        }
    }

    fn feed_args(method: FeedMethod) -> LogFeedArgs {
        LogFeedArgs {
            event: event_args(),
            method,
            at: "2 hours ago".to_string(),
            volume: None,
            unit: VolumeUnit::Oz,
            duration: None,
            side: None,
            food: None,
        }
    }

    fn sleep_args(start: &str, end: Option<&str>) -> LogSleepArgs {
        LogSleepArgs {
            event: event_args(),
            start: start.to_string(),
            end: end.map(str::to_string),
            night: false,
            quality: None,
            nap_number: None,
        }
    }

    #[test]
    fn logs_bottle_feed_with_metric_volume() {
        let (mut db, config) = setup();
        let mut args = feed_args(FeedMethod::Bottle);
        args.volume = Some(120.0);
        args.unit = VolumeUnit::Ml;
        args.event.notes = Some("  took it slowly ".to_string());
        let mut output = Vec::new();

        let id = feed(&mut output, &mut db, &args, &config, now()).unwrap();

        let feeds = db.feed_events(&BabyId::new("b1").unwrap()).unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(&feeds[0].meta.id, &id);
        assert_eq!(feeds[0].meta.timestamp, Utc.with_ymd_and_hms(2025, 1, 29, 14, 0, 0).unwrap());
        assert_eq!(feeds[0].meta.notes.as_deref(), Some("took it slowly"));
        assert_eq!(feeds[0].meta.created_by.as_str(), "caregiver");
        assert!((feeds[0].volume_oz().unwrap() - 120.0 / 29.5735).abs() < 1e-9);

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Logged feed for Robin ("));
    }

    #[test]
    fn invalid_feed_is_not_stored() {
        let (mut db, config) = setup();
        let mut output = Vec::new();

        let err = feed(&mut output, &mut db, &feed_args(FeedMethod::Bottle), &config, now())
            .unwrap_err();

        assert!(err.to_string().contains("volume is required for bottle feeds"));
        assert!(db.feed_events(&BabyId::new("b1").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn second_ongoing_sleep_is_refused() {
        let (mut db, config) = setup();
        let mut output = Vec::new();

        sleep(&mut output, &mut db, &sleep_args("30 minutes ago", None), &config, now()).unwrap();
        let err = sleep(&mut output, &mut db, &sleep_args("now", None), &config, now())
            .unwrap_err();
        assert!(err.to_string().contains("asleep since 2025-01-29T15:30:00Z"));

        // a completed sleep can still be back-filled
        sleep(
            &mut output,
            &mut db,
            &sleep_args("2025-01-29T09:00:00Z", Some("2025-01-29T10:00:00Z")),
            &config,
            now(),
        )
        .unwrap();
        assert_eq!(db.sleep_events(&BabyId::new("b1").unwrap()).unwrap().len(), 2);
    }

    #[test]
    fn overlong_sleep_is_rejected() {
        let (mut db, config) = setup();
        let mut output = Vec::new();
        let args = sleep_args("2025-01-28T18:00:00Z", Some("2025-01-29T07:00:00Z"));

        let err = sleep(&mut output, &mut db, &args, &config, now()).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn logs_diaper_and_milestone() {
        let (mut db, config) = setup();
        let mut output = Vec::new();

        diaper(
            &mut output,
            &mut db,
            &LogDiaperArgs {
                event: event_args(),
                diaper_type: DiaperType::Dirty,
                at: "now".to_string(),
            },
            &config,
            now(),
        )
        .unwrap();
        milestone(
            &mut output,
            &mut db,
            &LogMilestoneArgs {
                event: EventArgs {
                    by: Some("grandma".to_string()),
                    ..event_args()
                },
                title: " Rolled over ".to_string(),
                description: None,
                category: MilestoneCategory::Physical,
                at: "now".to_string(),
            },
            &config,
            now(),
        )
        .unwrap();

        // both logged at the same instant, listed in logging order
        let events = db.list_events(&BabyId::new("b1").unwrap()).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], BabyEvent::Diaper(_)));
        let BabyEvent::Milestone(m) = &events[1] else {
            panic!("expected milestone, got {:?}", events[1]);
        };
        assert_eq!(m.title, "Rolled over");
        assert_eq!(m.meta.created_by.as_str(), "grandma");
    }
}

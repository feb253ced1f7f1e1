//! Per-day overview across every event kind.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::event::BabyEvent;
use crate::range::DateRange;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Counts and totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_feedings: usize,
    /// Fluid ounces.
    pub total_volume: f64,
    pub nap_count: usize,
    pub day_sleep_hours: f64,
    pub night_sleep_hours: f64,
    pub diaper_count: usize,
    pub milestones: usize,
}

impl DaySummary {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_feedings: 0,
            total_volume: 0.0,
            nap_count: 0,
            day_sleep_hours: 0.0,
            night_sleep_hours: 0.0,
            diaper_count: 0,
            milestones: 0,
        }
    }

    pub fn total_sleep_hours(&self) -> f64 {
        self.day_sleep_hours + self.night_sleep_hours
    }
}

/// Summarizes `date` in `tz`.
///
/// Sleeps belong to the day they start on; ongoing sleeps count toward
/// neither naps nor hours.
pub fn summarize_day<Tz: TimeZone>(events: &[BabyEvent], date: NaiveDate, tz: &Tz) -> DaySummary {
    summarize_within(events, date, &DateRange::for_day(tz, date))
}

/// One summary per calendar day of `range` in `tz`, in date order.
pub fn summarize_days<Tz: TimeZone>(
    events: &[BabyEvent],
    range: &DateRange,
    tz: &Tz,
) -> Vec<DaySummary> {
    range
        .days(tz)
        .into_iter()
        .map(|date| summarize_within(events, date, &DateRange::for_day(tz, date).intersect(range)))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn summarize_within(events: &[BabyEvent], date: NaiveDate, window: &DateRange) -> DaySummary {
    let mut summary = DaySummary::empty(date);

    for event in events.iter().filter(|e| window.contains(e.occurred_at())) {
        match event {
            BabyEvent::Sleep(sleep) => {
                let Some(ms) = sleep.duration_ms() else {
                    continue;
                };
                let hours = ms as f64 / MS_PER_HOUR;
                if sleep.is_night_sleep {
                    summary.night_sleep_hours += hours;
                } else {
                    summary.day_sleep_hours += hours;
                    summary.nap_count += 1;
                }
            }
            BabyEvent::Feed(feed) => {
                summary.total_feedings += 1;
                summary.total_volume += feed.volume_oz().unwrap_or(0.0);
            }
            BabyEvent::Diaper(_) => summary.diaper_count += 1,
            BabyEvent::Milestone(_) => summary.milestones += 1,
        }
    }

    summary
}

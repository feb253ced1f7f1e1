//! Sleep analytics for a report range.
//!
//! Sleeps are assigned to the range (and to per-day buckets) by start time.
//! Ongoing sleeps are counted but never contribute to durations. Wake windows
//! are derived from the full sleep history, not the range-filtered subset.

use chrono::{DateTime, NaiveDate, TimeZone};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::baby::BabyProfile;
use crate::event::SleepEvent;
use crate::range::{DateRange, DateRangeSelector};
use crate::types::BabyId;
use crate::wake::{WakeWindow, wake_windows_for_age};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Sleep statistics for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepAnalytics {
    pub baby_id: BabyId,
    pub selector: DateRangeSelector,
    pub range: DateRange,
    /// Age used for wake-window targets.
    pub age_months: u32,
    pub total_sleep_hours: f64,
    /// Hours per averaging day.
    pub average_daily_sleep: f64,
    pub night_sleep_average: f64,
    pub nap_average: f64,
    /// Completed naps in the range.
    pub nap_count: usize,
    pub average_naps_per_day: f64,
    /// 0 when no sleep in the range has ended.
    pub longest_sleep_ms: i64,
    pub shortest_sleep_ms: i64,
    /// Sleeps in the range that have not ended yet.
    pub ongoing_count: usize,
    /// Night wake-ups per night. Not derivable from the current event model,
    /// so always `None`.
    pub average_wakeups: Option<f64>,
    /// Wake windows over the whole sleep history.
    pub wake_windows: Vec<WakeWindow>,
    pub sleep_by_day: Vec<DailySleep>,
}

/// Sleep totals for one calendar day of the report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySleep {
    pub date: NaiveDate,
    pub total_sleep_ms: i64,
    pub nap_sleep_ms: i64,
    pub night_sleep_ms: i64,
    pub nap_count: usize,
}

#[allow(clippy::cast_precision_loss)]
impl DailySleep {
    pub fn total_hours(&self) -> f64 {
        self.total_sleep_ms as f64 / MS_PER_HOUR
    }

    pub fn nap_hours(&self) -> f64 {
        self.nap_sleep_ms as f64 / MS_PER_HOUR
    }

    pub fn night_hours(&self) -> f64 {
        self.night_sleep_ms as f64 / MS_PER_HOUR
    }
}

/// Running totals over a set of sleeps.
#[derive(Debug, Clone, Copy, Default)]
struct SleepTotals {
    total_ms: i64,
    night_ms: i64,
    nap_ms: i64,
    nap_count: usize,
    longest_ms: Option<i64>,
    shortest_ms: Option<i64>,
    ongoing: usize,
}

impl SleepTotals {
    /// Aggregates sleeps starting inside `range`.
    fn collect(sleeps: &[SleepEvent], range: &DateRange) -> Self {
        let mut totals = Self::default();
        for sleep in sleeps.iter().filter(|s| range.contains(s.start_time)) {
            let Some(duration_ms) = sleep.duration_ms() else {
                totals.ongoing += 1;
                continue;
            };

            totals.total_ms += duration_ms;
            if sleep.is_night_sleep {
                totals.night_ms += duration_ms;
            } else {
                totals.nap_ms += duration_ms;
                totals.nap_count += 1;
            }
            totals.longest_ms = Some(totals.longest_ms.map_or(duration_ms, |m| m.max(duration_ms)));
            totals.shortest_ms =
                Some(totals.shortest_ms.map_or(duration_ms, |m| m.min(duration_ms)));
        }
        totals
    }
}

/// Computes sleep analytics for `baby` over the range `selector` resolves to
/// at `reference`.
///
/// Total over every input: empty or all-ongoing inputs produce zeros, never
/// NaN.
#[allow(clippy::cast_precision_loss)]
pub fn compute_sleep_analytics<Tz: TimeZone>(
    sleeps: &[SleepEvent],
    baby: &BabyProfile,
    selector: DateRangeSelector,
    reference: &DateTime<Tz>,
) -> SleepAnalytics {
    let range = selector.resolve(reference);
    let days = f64::from(selector.averaging_days(&range));
    let age_months = baby.age_in_months(reference);

    let totals = SleepTotals::collect(sleeps, &range);
    let total_sleep_hours = totals.total_ms as f64 / MS_PER_HOUR;

    let wake_windows = wake_windows_for_age(sleeps, age_months);
    let sleep_by_day = daily_sleep(sleeps, &range, &reference.timezone());

    tracing::debug!(
        baby = %baby.id,
        selector = %selector,
        ongoing = totals.ongoing,
        wake_windows = wake_windows.len(),
        "computed sleep analytics"
    );

    SleepAnalytics {
        baby_id: baby.id.clone(),
        selector,
        range,
        age_months,
        total_sleep_hours,
        average_daily_sleep: total_sleep_hours / days,
        night_sleep_average: totals.night_ms as f64 / MS_PER_HOUR / days,
        nap_average: totals.nap_ms as f64 / MS_PER_HOUR / days,
        nap_count: totals.nap_count,
        average_naps_per_day: totals.nap_count as f64 / days,
        longest_sleep_ms: totals.longest_ms.unwrap_or(0),
        shortest_sleep_ms: totals.shortest_ms.unwrap_or(0),
        ongoing_count: totals.ongoing,
        average_wakeups: None,
        wake_windows,
        sleep_by_day,
    }
}

/// One bucket per calendar day of `range` in `tz`, clipped to the range.
fn daily_sleep<Tz: TimeZone>(
    sleeps: &[SleepEvent],
    range: &DateRange,
    tz: &Tz,
) -> Vec<DailySleep> {
    let buckets: Vec<(NaiveDate, DateRange)> = range
        .days(tz)
        .into_iter()
        .map(|date| (date, DateRange::for_day(tz, date).intersect(range)))
        .collect();

    buckets
        .par_iter()
        .map(|(date, day)| {
            let totals = SleepTotals::collect(sleeps, day);
            DailySleep {
                date: *date,
                total_sleep_ms: totals.total_ms,
                nap_sleep_ms: totals.nap_ms,
                night_sleep_ms: totals.night_ms,
                nap_count: totals.nap_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventMeta;
    use crate::types::{EventId, UserId};
    use chrono::{Duration, FixedOffset, Utc};

    /// Wednesday Jan 29, 2025 at 20:00 UTC.
    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 20, 0, 0).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0).unwrap()
    }

    fn baby() -> BabyProfile {
        let dob = NaiveDate::from_ymd_opt(2024, 9, 20).unwrap();
        BabyProfile::new(BabyId::new("baby-1").unwrap(), "Robin", dob)
    }

    fn sleep(
        id: &str,
        start: DateTime<Utc>,
        minutes: Option<i64>,
        night: bool,
    ) -> SleepEvent {
        let meta = EventMeta::new(
            EventId::new(id).unwrap(),
            BabyId::new("baby-1").unwrap(),
            UserId::new("parent-1").unwrap(),
            start,
        );
        let event = SleepEvent::new(meta, start, night);
        match minutes {
            Some(m) => event.ended(start + Duration::minutes(m), None),
            None => event,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_is_all_zero() {
        let result = compute_sleep_analytics(&[], &baby(), DateRangeSelector::Week, &reference());

        assert!(approx(result.total_sleep_hours, 0.0));
        assert!(approx(result.average_daily_sleep, 0.0));
        assert!(approx(result.night_sleep_average, 0.0));
        assert!(approx(result.nap_average, 0.0));
        assert!(approx(result.average_naps_per_day, 0.0));
        assert_eq!(result.nap_count, 0);
        assert_eq!(result.longest_sleep_ms, 0);
        assert_eq!(result.shortest_sleep_ms, 0);
        assert_eq!(result.average_wakeups, None);
        assert!(result.wake_windows.is_empty());
        assert_eq!(result.sleep_by_day.len(), 7);
        assert!(result.sleep_by_day.iter().all(|d| d.total_sleep_ms == 0));
        assert!(!result.average_daily_sleep.is_nan());
    }

    #[test]
    fn totals_and_averages_over_today() {
        let sleeps = vec![
            sleep("night", at(29, 0, 30), Some(6 * 60), true),
            sleep("nap-1", at(29, 9, 0), Some(90), false),
            sleep("nap-2", at(29, 13, 0), Some(45), false),
        ];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Today, &reference());

        let expected_hours = (360.0 + 90.0 + 45.0) / 60.0;
        assert!(approx(result.total_sleep_hours, expected_hours));
        assert!(approx(result.average_daily_sleep, expected_hours));
        assert!(approx(result.night_sleep_average, 6.0));
        assert!(approx(result.nap_average, 2.25));
        assert_eq!(result.nap_count, 2);
        assert!(approx(result.average_naps_per_day, 2.0));
        assert_eq!(result.longest_sleep_ms, 360 * 60_000);
        assert_eq!(result.shortest_sleep_ms, 45 * 60_000);
        assert_eq!(result.age_months, 4);
    }

    #[test]
    fn week_divides_by_seven() {
        let sleeps = vec![
            sleep("mon", at(27, 13, 0), Some(7 * 60), true),
            sleep("tue", at(28, 13, 0), Some(7 * 60), true),
        ];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Week, &reference());

        assert!(approx(result.total_sleep_hours, 14.0));
        assert!(approx(result.average_daily_sleep, 2.0));
        assert!(approx(result.night_sleep_average, 2.0));
    }

    #[test]
    fn events_outside_range_are_excluded_by_start_time() {
        let sleeps = vec![
            // starts the previous evening, ends inside today: excluded
            sleep("prev", at(28, 22, 0), Some(8 * 60), true),
            // starts today just before midnight: included
            sleep("late", at(29, 23, 30), Some(60), false),
            // starts exactly at the exclusive end: excluded
            sleep("next", at(30, 0, 0), Some(60), false),
        ];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Today, &reference());

        assert!(approx(result.total_sleep_hours, 1.0));
        assert_eq!(result.nap_count, 1);
    }

    #[test]
    fn ongoing_sleep_never_counts_toward_durations() {
        let sleeps = vec![
            sleep("done", at(29, 9, 0), Some(30), false),
            sleep("ongoing", at(29, 19, 0), None, false),
        ];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Today, &reference());

        assert!(approx(result.total_sleep_hours, 0.5));
        assert_eq!(result.longest_sleep_ms, 30 * 60_000);
        assert_eq!(result.shortest_sleep_ms, 30 * 60_000);
        assert_eq!(result.nap_count, 1);
        assert_eq!(result.ongoing_count, 1);
    }

    #[test]
    fn all_ongoing_is_zero_not_nan() {
        let sleeps = vec![sleep("ongoing", at(29, 19, 0), None, true)];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Today, &reference());

        assert!(approx(result.total_sleep_hours, 0.0));
        assert_eq!(result.longest_sleep_ms, 0);
        assert_eq!(result.ongoing_count, 1);
    }

    #[test]
    fn wake_windows_use_full_history_not_range() {
        // Both sleeps are last week; the wake window between them still shows
        // up in today's report.
        let sleeps = vec![
            sleep("a", at(20, 9, 0), Some(60), false),
            sleep("b", at(20, 12, 0), Some(60), false),
        ];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Today, &reference());

        assert!(approx(result.total_sleep_hours, 0.0));
        assert_eq!(result.wake_windows.len(), 1);
        assert_eq!(result.wake_windows[0].duration_minutes(), 120);
    }

    #[test]
    fn daily_buckets_sum_to_range_totals() {
        let sleeps = vec![
            sleep("n1", at(27, 0, 0), Some(600), true),
            sleep("p1", at(27, 13, 0), Some(60), false),
            sleep("n2", at(29, 1, 0), Some(540), true),
            sleep("p2", at(29, 10, 0), Some(30), false),
            sleep("p3", at(29, 14, 0), Some(45), false),
        ];

        let result =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Week, &reference());

        let dates: Vec<_> = result.sleep_by_day.iter().map(|d| d.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);

        let sum_ms: i64 = result.sleep_by_day.iter().map(|d| d.total_sleep_ms).sum();
        assert_eq!(sum_ms, (600 + 60 + 540 + 30 + 45) * 60_000);

        let wednesday = &result.sleep_by_day[2];
        assert_eq!(wednesday.date, NaiveDate::from_ymd_opt(2025, 1, 29).unwrap());
        assert_eq!(wednesday.nap_count, 2);
        assert!(approx(wednesday.night_hours(), 9.0));
        assert!(approx(wednesday.nap_hours(), 1.25));
        assert!(approx(wednesday.total_hours(), 10.25));
    }

    #[test]
    fn daily_buckets_follow_reference_time_zone() {
        let tz = FixedOffset::west_opt(8 * 3600).unwrap();
        let reference = reference().with_timezone(&tz);
        // 07:00 UTC on the 29th is still the 28th at UTC-8: outside "today".
        let sleeps = vec![
            sleep("early", at(29, 7, 0), Some(60), false),
            sleep("later", at(29, 9, 0), Some(60), false),
        ];

        let result = compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Today, &reference);

        assert!(approx(result.total_sleep_hours, 1.0));
        assert_eq!(result.sleep_by_day.len(), 1);
        assert_eq!(result.sleep_by_day[0].total_sleep_ms, 60 * 60_000);
    }

    #[test]
    fn custom_range_averages_over_its_days() {
        let selector = DateRangeSelector::Custom {
            start: at(27, 0, 0),
            end: at(29, 0, 0),
        };
        let sleeps = vec![
            sleep("a", at(27, 1, 0), Some(600), true),
            sleep("b", at(28, 1, 0), Some(600), true),
            sleep("c", at(29, 1, 0), Some(600), true),
        ];

        let result = compute_sleep_analytics(&sleeps, &baby(), selector, &reference());

        assert!(approx(result.total_sleep_hours, 20.0));
        assert!(approx(result.average_daily_sleep, 10.0));
        assert_eq!(result.sleep_by_day.len(), 2);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let sleeps = vec![
            sleep("a", at(28, 9, 0), Some(75), false),
            sleep("b", at(28, 12, 0), Some(80), false),
            sleep("c", at(29, 19, 0), None, true),
        ];

        let first = compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Week, &reference());
        let second =
            compute_sleep_analytics(&sleeps, &baby(), DateRangeSelector::Week, &reference());

        assert_eq!(first, second);
    }
}

//! Report date ranges.
//!
//! A [`DateRangeSelector`] plus a reference timestamp resolves to a concrete
//! half-open [`DateRange`]. Calendar boundaries are computed in the
//! reference's own time zone and returned in UTC. Weeks always start on
//! Monday (ISO 8601), independent of locale.

use std::fmt;

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// Symbolic report range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateRangeSelector {
    /// The reference's calendar day.
    Today,
    /// The Monday-to-Monday week containing the reference.
    Week,
    /// The calendar month containing the reference.
    Month,
    /// Caller-supplied bounds, used as-is.
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl DateRangeSelector {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Custom { .. } => "custom",
        }
    }

    /// Nominal number of days used as an averaging denominator.
    ///
    /// `month` is always 30 so per-day averages stay comparable between
    /// months of different lengths. `custom` has no nominal count.
    pub const fn day_count(&self) -> Option<u32> {
        match self {
            Self::Today => Some(1),
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Custom { .. } => None,
        }
    }

    /// Denominator for per-day averages over `range`; never 0.
    ///
    /// For `custom` this is the number of started 24-hour periods in the range.
    pub fn averaging_days(&self, range: &DateRange) -> u32 {
        let days = self.day_count().unwrap_or_else(|| {
            let ms = range.duration().num_milliseconds();
            let day_ms = Duration::days(1).num_milliseconds();
            u32::try_from((ms + day_ms - 1) / day_ms).unwrap_or(u32::MAX)
        });
        days.max(1)
    }

    /// Resolves to a concrete half-open interval.
    ///
    /// For every selector except `custom`, `start <= reference < end`. An
    /// inverted custom range collapses to the empty range `[start, start)`.
    pub fn resolve<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> DateRange {
        let tz = reference.timezone();
        let today = reference.date_naive();

        match *self {
            Self::Today => DateRange::for_day(&tz, today),
            Self::Week => {
                let days_since_monday = today.weekday().num_days_from_monday();
                let monday = today - Days::new(u64::from(days_since_monday));
                let next_monday = monday + Days::new(7);
                DateRange::new(
                    local_midnight_to_utc(&tz, monday),
                    local_midnight_to_utc(&tz, next_monday),
                )
            }
            Self::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let next_first = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                DateRange::new(
                    local_midnight_to_utc(&tz, first),
                    local_midnight_to_utc(&tz, next_first),
                )
            }
            Self::Custom { start, end } => DateRange::new(start, end.max(start)),
        }
    }
}

impl fmt::Display for DateRangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The calendar day `date` in `tz`, midnight to midnight.
    pub fn for_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Self {
        let next = date.succ_opt().unwrap_or(NaiveDate::MAX);
        Self::new(local_midnight_to_utc(tz, date), local_midnight_to_utc(tz, next))
    }

    /// The overlap of two ranges; empty (anchored at the later start) when
    /// they do not overlap.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let start = self.start.max(other.start);
        Self::new(start, self.end.min(other.end).max(start))
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn duration(&self) -> Duration {
        if self.is_empty() {
            Duration::zero()
        } else {
            self.end - self.start
        }
    }

    /// Calendar dates in `tz` that intersect this range, in order.
    pub fn days<Tz: TimeZone>(&self, tz: &Tz) -> Vec<NaiveDate> {
        if self.is_empty() {
            return Vec::new();
        }
        let first = self.start.with_timezone(tz).date_naive();
        let last = (self.end - Duration::nanoseconds(1))
            .with_timezone(tz)
            .date_naive();
        first.iter_days().take_while(|d| *d <= last).collect()
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc<Tz: TimeZone>(tz: &Tz, local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight; 1am local exists
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Weekday};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_is_midnight_to_midnight() {
        let range = DateRangeSelector::Today.resolve(&utc(2025, 1, 29, 15, 45));
        assert_eq!(range.start, utc(2025, 1, 29, 0, 0));
        assert_eq!(range.end, utc(2025, 1, 30, 0, 0));
    }

    #[test]
    fn today_respects_reference_time_zone() {
        let tz = FixedOffset::west_opt(8 * 3600).unwrap();
        let reference = tz.with_ymd_and_hms(2025, 1, 29, 22, 0, 0).unwrap();
        let range = DateRangeSelector::Today.resolve(&reference);

        // Midnight at UTC-8 is 08:00 UTC.
        assert_eq!(range.start, utc(2025, 1, 29, 8, 0));
        assert_eq!(range.end, utc(2025, 1, 30, 8, 0));
        assert!(range.contains(reference.with_timezone(&Utc)));
    }

    #[test]
    fn week_starts_on_monday() {
        // Jan 29, 2025 is a Wednesday
        let range = DateRangeSelector::Week.resolve(&utc(2025, 1, 29, 12, 0));
        assert_eq!(range.start, utc(2025, 1, 27, 0, 0));
        assert_eq!(range.end, utc(2025, 2, 3, 0, 0));
    }

    #[test]
    fn week_on_monday_and_sunday() {
        let monday = DateRangeSelector::Week.resolve(&utc(2025, 1, 27, 0, 0));
        let sunday = DateRangeSelector::Week.resolve(&utc(2025, 2, 2, 23, 59));
        assert_eq!(monday, sunday);
        assert_eq!(monday.start, utc(2025, 1, 27, 0, 0));
    }

    #[test]
    fn week_is_always_seven_days_from_monday() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let base = tz.with_ymd_and_hms(2024, 12, 20, 7, 13, 0).unwrap();

        for offset in 0..90 {
            let reference = base + Duration::hours(offset * 17);
            let range = DateRangeSelector::Week.resolve(&reference);

            assert_eq!(range.duration(), Duration::days(7));
            assert_eq!(
                range.start.with_timezone(&tz).weekday(),
                Weekday::Mon,
                "reference {reference}"
            );
            assert_eq!(range.start.with_timezone(&tz).time(), NaiveTime::MIN);
            assert!(range.contains(reference.with_timezone(&Utc)));
        }
    }

    #[test]
    fn month_handles_leap_february_and_year_end() {
        let feb = DateRangeSelector::Month.resolve(&utc(2024, 2, 10, 9, 0));
        assert_eq!(feb.start, utc(2024, 2, 1, 0, 0));
        assert_eq!(feb.end, utc(2024, 3, 1, 0, 0));
        assert_eq!(feb.duration(), Duration::days(29));

        let dec = DateRangeSelector::Month.resolve(&utc(2024, 12, 31, 23, 0));
        assert_eq!(dec.start, utc(2024, 12, 1, 0, 0));
        assert_eq!(dec.end, utc(2025, 1, 1, 0, 0));
    }

    #[test]
    fn custom_uses_explicit_bounds() {
        let selector = DateRangeSelector::Custom {
            start: utc(2025, 1, 1, 6, 0),
            end: utc(2025, 1, 3, 18, 0),
        };
        let range = selector.resolve(&utc(2025, 6, 1, 0, 0));

        assert_eq!(range.start, utc(2025, 1, 1, 6, 0));
        assert_eq!(range.end, utc(2025, 1, 3, 18, 0));
        assert_eq!(selector.day_count(), None);
        assert_eq!(selector.averaging_days(&range), 3);
    }

    #[test]
    fn inverted_custom_range_collapses_to_empty() {
        let selector = DateRangeSelector::Custom {
            start: utc(2025, 1, 3, 0, 0),
            end: utc(2025, 1, 1, 0, 0),
        };
        let range = selector.resolve(&utc(2025, 6, 1, 0, 0));

        assert!(range.is_empty());
        assert_eq!(range.start, range.end);
        assert_eq!(selector.averaging_days(&range), 1);
        assert!(range.days(&Utc).is_empty());
    }

    #[test]
    fn nominal_day_counts() {
        let range = DateRangeSelector::Month.resolve(&utc(2025, 2, 10, 0, 0));
        assert_eq!(DateRangeSelector::Today.day_count(), Some(1));
        assert_eq!(DateRangeSelector::Week.day_count(), Some(7));
        assert_eq!(DateRangeSelector::Month.averaging_days(&range), 30);
    }

    #[test]
    fn days_lists_each_calendar_day() {
        let range = DateRangeSelector::Week.resolve(&utc(2025, 1, 29, 12, 0));
        let days = range.days(&Utc);

        assert_eq!(days.len(), 7);
        assert_eq!(days.first(), Some(&date(2025, 1, 27)));
        assert_eq!(days.last(), Some(&date(2025, 2, 2)));
    }

    #[test]
    fn days_include_partial_days() {
        let range = DateRange::new(utc(2025, 1, 1, 18, 0), utc(2025, 1, 2, 6, 0));
        assert_eq!(range.days(&Utc), vec![date(2025, 1, 1), date(2025, 1, 2)]);
    }

    #[test]
    fn intersect_clips_and_never_inverts() {
        let day = DateRange::for_day(&Utc, date(2025, 1, 1));
        let partial = DateRange::new(utc(2025, 1, 1, 18, 0), utc(2025, 1, 3, 0, 0));

        assert_eq!(
            day.intersect(&partial),
            DateRange::new(utc(2025, 1, 1, 18, 0), utc(2025, 1, 2, 0, 0))
        );

        let later = DateRange::for_day(&Utc, date(2025, 1, 5));
        assert!(day.intersect(&later).is_empty());
    }

    #[test]
    fn selector_serializes_with_kind_tag() {
        let json = serde_json::to_string(&DateRangeSelector::Week).unwrap();
        assert_eq!(json, r#"{"kind":"week"}"#);
        assert_eq!(DateRangeSelector::Month.to_string(), "month");
    }
}

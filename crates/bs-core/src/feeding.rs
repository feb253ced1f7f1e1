//! Feeding analytics for a report range.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::baby::BabyProfile;
use crate::event::{FeedEvent, FeedMethod};
use crate::range::{DateRange, DateRangeSelector};
use crate::types::BabyId;

/// Feeding statistics for one report. Volumes are in fluid ounces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingAnalytics {
    pub baby_id: BabyId,
    pub selector: DateRangeSelector,
    pub range: DateRange,
    pub total_feedings: usize,
    pub average_feedings_per_day: f64,
    pub total_volume: f64,
    pub average_daily_volume: f64,
    /// Total volume over every feed, including feeds without a volume.
    pub average_volume_per_feed: f64,
    /// Feeds that carry a volume.
    pub volume_feed_count: usize,
    /// Total volume over feeds that carry a volume.
    pub average_volume_per_recorded_feed: f64,
    /// Mean gap between consecutive feeds; 0 with fewer than two feeds.
    pub average_interval_between_feeds_ms: i64,
    pub feedings_by_method: BTreeMap<FeedMethod, usize>,
    pub feedings_by_day: Vec<DailyFeeding>,
}

/// Feeding totals for one calendar day of the report range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFeeding {
    pub date: NaiveDate,
    pub count: usize,
    pub total_volume: f64,
    pub average_interval_ms: i64,
}

#[derive(Debug, Clone, Default)]
struct FeedTotals {
    count: usize,
    volume: f64,
    volume_count: usize,
    average_interval_ms: i64,
    by_method: BTreeMap<FeedMethod, usize>,
}

impl FeedTotals {
    /// Aggregates feeds logged inside `range`.
    fn collect(feeds: &[FeedEvent], range: &DateRange) -> Self {
        let mut totals = Self::default();
        let mut times: Vec<DateTime<Utc>> = Vec::new();

        for feed in feeds.iter().filter(|f| range.contains(f.meta.timestamp)) {
            totals.count += 1;
            times.push(feed.meta.timestamp);
            *totals.by_method.entry(feed.method).or_insert(0) += 1;
            if let Some(oz) = feed.volume_oz() {
                totals.volume += oz;
                totals.volume_count += 1;
            }
        }

        totals.average_interval_ms = average_interval_ms(&mut times);
        totals
    }
}

/// Mean of the consecutive gaps between `times` once sorted.
fn average_interval_ms(times: &mut [DateTime<Utc>]) -> i64 {
    if times.len() < 2 {
        return 0;
    }
    times.sort_unstable();
    let total: i64 = times
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds())
        .sum();
    let gaps = i64::try_from(times.len() - 1).unwrap_or(i64::MAX);
    total / gaps
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { numerator / count as f64 }
}

/// Computes feeding analytics for `baby` over the range `selector` resolves
/// to at `reference`.
///
/// Feeds are assigned to the range by log timestamp. Missing volumes count as
/// zero toward totals.
#[allow(clippy::cast_precision_loss)]
pub fn compute_feeding_analytics<Tz: TimeZone>(
    feeds: &[FeedEvent],
    baby: &BabyProfile,
    selector: DateRangeSelector,
    reference: &DateTime<Tz>,
) -> FeedingAnalytics {
    let range = selector.resolve(reference);
    let days = f64::from(selector.averaging_days(&range));

    let totals = FeedTotals::collect(feeds, &range);
    let feedings_by_day = daily_feeding(feeds, &range, &reference.timezone());

    tracing::debug!(
        baby = %baby.id,
        selector = %selector,
        feedings = totals.count,
        with_volume = totals.volume_count,
        "computed feeding analytics"
    );

    FeedingAnalytics {
        baby_id: baby.id.clone(),
        selector,
        range,
        total_feedings: totals.count,
        average_feedings_per_day: totals.count as f64 / days,
        total_volume: totals.volume,
        average_daily_volume: totals.volume / days,
        average_volume_per_feed: ratio(totals.volume, totals.count),
        volume_feed_count: totals.volume_count,
        average_volume_per_recorded_feed: ratio(totals.volume, totals.volume_count),
        average_interval_between_feeds_ms: totals.average_interval_ms,
        feedings_by_method: totals.by_method,
        feedings_by_day,
    }
}

fn daily_feeding<Tz: TimeZone>(
    feeds: &[FeedEvent],
    range: &DateRange,
    tz: &Tz,
) -> Vec<DailyFeeding> {
    let buckets: Vec<(NaiveDate, DateRange)> = range
        .days(tz)
        .into_iter()
        .map(|date| (date, DateRange::for_day(tz, date).intersect(range)))
        .collect();

    buckets
        .par_iter()
        .map(|(date, day)| {
            let totals = FeedTotals::collect(feeds, day);
            DailyFeeding {
                date: *date,
                count: totals.count,
                total_volume: totals.volume,
                average_interval_ms: totals.average_interval_ms,
            }
        })
        .collect()
}

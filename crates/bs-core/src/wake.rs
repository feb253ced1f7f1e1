//! Wake-window derivation and classification.
//!
//! # Algorithm Summary
//!
//! 1. Keep completed sleeps and sort them by end time
//! 2. For each consecutive pair, the gap from one sleep's end to the next
//!    sleep's start is a candidate wake window
//! 3. Gaps that are not positive, or are 12 hours or longer, are treated as
//!    bad data (overlapping logs, missing days) and dropped without using up
//!    an ordinal
//! 4. Each retained window is classified against the age/ordinal target with
//!    a 30 minute grace band between `long` and `too_long`

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::baby::BabyProfile;
use crate::event::SleepEvent;
use crate::targets::{TargetRange, wake_window_minutes};
use crate::types::define_str_enum;

/// Gaps at or beyond this length are not wake windows.
pub const MAX_WAKE_GAP_MS: i64 = 12 * 60 * 60 * 1000;

/// Minutes past the target's upper bound still rated `long` rather than `too_long`.
pub const LONG_GRACE_MINUTES: i64 = 30;

define_str_enum!(
    /// Rating of a wake window against the age target.
    WakeWindowQuality, "wake window quality" {
        Short => "short",
        Optimal => "optimal",
        Long => "long",
        TooLong => "too_long",
    }
);

/// Awake time between two completed sleeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeWindow {
    /// End of the preceding sleep.
    pub start_time: DateTime<Utc>,
    /// Start of the following sleep.
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
    /// 1-based position among retained windows. This is a sequence index over
    /// the whole history, not a nap-of-the-day number.
    pub ordinal: u32,
    pub quality: WakeWindowQuality,
}

impl WakeWindow {
    /// Whole minutes, truncated.
    pub const fn duration_minutes(&self) -> i64 {
        self.duration_ms / 60_000
    }
}

/// Rates a window length against its target.
pub const fn classify(minutes: i64, target: TargetRange<i64>) -> WakeWindowQuality {
    if minutes < target.lower {
        WakeWindowQuality::Short
    } else if minutes > target.upper + LONG_GRACE_MINUTES {
        WakeWindowQuality::TooLong
    } else if minutes > target.upper {
        WakeWindowQuality::Long
    } else {
        WakeWindowQuality::Optimal
    }
}

/// Derives wake windows for `baby` from its full sleep history.
///
/// The baby's age is taken at `reference`.
pub fn compute_wake_windows<Tz: TimeZone>(
    sleeps: &[SleepEvent],
    baby: &BabyProfile,
    reference: &DateTime<Tz>,
) -> Vec<WakeWindow> {
    wake_windows_for_age(sleeps, baby.age_in_months(reference))
}

/// Derives wake windows for a baby of `age_months`.
///
/// Pure and order-independent: input order does not matter, ongoing sleeps
/// are ignored.
pub fn wake_windows_for_age(sleeps: &[SleepEvent], age_months: u32) -> Vec<WakeWindow> {
    let mut completed: Vec<(&SleepEvent, DateTime<Utc>)> = sleeps
        .iter()
        .filter_map(|sleep| sleep.end_time().map(|end| (sleep, end)))
        .collect();
    completed.sort_by_key(|(_, end)| *end);

    let mut windows = Vec::new();
    let mut discarded = 0usize;

    for pair in completed.windows(2) {
        let [(_, wake_time), (next, _)] = pair else {
            continue;
        };
        let gap_ms = (next.start_time - *wake_time).num_milliseconds();

        if gap_ms <= 0 || gap_ms >= MAX_WAKE_GAP_MS {
            discarded += 1;
            continue;
        }

        let ordinal = u32::try_from(windows.len() + 1).unwrap_or(u32::MAX);
        let minutes = gap_ms / 60_000;
        let quality = classify(minutes, wake_window_minutes(age_months, ordinal));

        windows.push(WakeWindow {
            start_time: *wake_time,
            end_time: next.start_time,
            duration_ms: gap_ms,
            ordinal,
            quality,
        });
    }

    if discarded > 0 {
        tracing::warn!(
            discarded,
            retained = windows.len(),
            "dropped sleep gaps outside the wake-window bounds"
        );
    }

    windows
}

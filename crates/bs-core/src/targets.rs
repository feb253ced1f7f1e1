//! Age-dependent target ranges.
//!
//! Pure lookup tables keyed by age in whole months. Brackets are inclusive on
//! both ends and every table is total: ages past the last bracket fall into
//! the final case.

use serde::{Deserialize, Serialize};

use crate::types::define_str_enum;

define_str_enum!(
    /// Where a value falls relative to a target range.
    TargetStatus, "target status" {
        Below => "below",
        Within => "within",
        Above => "above",
    }
);

/// An inclusive `[lower, upper]` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRange<T> {
    pub lower: T,
    pub upper: T,
}

impl<T: PartialOrd + Copy> TargetRange<T> {
    pub const fn new(lower: T, upper: T) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn classify(&self, value: T) -> TargetStatus {
        if value < self.lower {
            TargetStatus::Below
        } else if value > self.upper {
            TargetStatus::Above
        } else {
            TargetStatus::Within
        }
    }
}

/// Recommended total sleep per day, in hours.
pub const fn sleep_hours(age_months: u32) -> TargetRange<f64> {
    match age_months {
        0..=2 => TargetRange::new(14.0, 17.0),
        3..=5 | 6..=11 => TargetRange::new(12.0, 15.0),
        12..=23 => TargetRange::new(11.0, 14.0),
        _ => TargetRange::new(10.0, 13.0),
    }
}

/// Recommended total feeding volume per day, in fluid ounces.
pub const fn feeding_volume(age_months: u32) -> TargetRange<f64> {
    match age_months {
        0..=1 => TargetRange::new(18.0, 32.0),
        2..=3 => TargetRange::new(24.0, 36.0),
        4..=5 => TargetRange::new(25.0, 40.0),
        6..=8 => TargetRange::new(24.0, 32.0),
        9..=11 => TargetRange::new(20.0, 30.0),
        _ => TargetRange::new(16.0, 24.0),
    }
}

/// Recommended wake-window length in minutes.
///
/// Between 6 and 8 months the target depends on the window's ordinal: the
/// first window of a run is shorter than the second, and later ones shorten
/// again.
pub const fn wake_window_minutes(age_months: u32, ordinal: u32) -> TargetRange<i64> {
    match age_months {
        0..=1 => TargetRange::new(30, 90),
        2..=3 => TargetRange::new(60, 120),
        4..=5 => TargetRange::new(90, 150),
        6..=8 => match ordinal {
            1 => TargetRange::new(120, 150),
            2 => TargetRange::new(150, 180),
            _ => TargetRange::new(90, 120),
        },
        9..=11 => TargetRange::new(150, 240),
        12..=18 => TargetRange::new(240, 360),
        _ => TargetRange::new(300, 420),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_window_brackets() {
        assert_eq!(wake_window_minutes(0, 1), TargetRange::new(30, 90));
        assert_eq!(wake_window_minutes(1, 5), TargetRange::new(30, 90));
        assert_eq!(wake_window_minutes(3, 1), TargetRange::new(60, 120));
        assert_eq!(wake_window_minutes(4, 1), TargetRange::new(90, 150));
        assert_eq!(wake_window_minutes(11, 1), TargetRange::new(150, 240));
        assert_eq!(wake_window_minutes(12, 1), TargetRange::new(240, 360));
        assert_eq!(wake_window_minutes(18, 1), TargetRange::new(240, 360));
        assert_eq!(wake_window_minutes(19, 1), TargetRange::new(300, 420));
        assert_eq!(wake_window_minutes(240, 1), TargetRange::new(300, 420));
    }

    #[test]
    fn wake_window_six_to_eight_months_depends_on_ordinal() {
        for age in 6..=8 {
            assert_eq!(wake_window_minutes(age, 1), TargetRange::new(120, 150));
            assert_eq!(wake_window_minutes(age, 2), TargetRange::new(150, 180));
            assert_eq!(wake_window_minutes(age, 3), TargetRange::new(90, 120));
            assert_eq!(wake_window_minutes(age, 9), TargetRange::new(90, 120));
        }
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for table values"
    )]
    fn sleep_hour_brackets() {
        assert_eq!(sleep_hours(2).lower, 14.0);
        assert_eq!(sleep_hours(3).upper, 15.0);
        assert_eq!(sleep_hours(11).lower, 12.0);
        assert_eq!(sleep_hours(23).upper, 14.0);
        assert_eq!(sleep_hours(24).lower, 10.0);
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for table values"
    )]
    fn feeding_volume_brackets() {
        assert_eq!(feeding_volume(1).upper, 32.0);
        assert_eq!(feeding_volume(2).lower, 24.0);
        assert_eq!(feeding_volume(5).upper, 40.0);
        assert_eq!(feeding_volume(8).lower, 24.0);
        assert_eq!(feeding_volume(9).upper, 30.0);
        assert_eq!(feeding_volume(36).lower, 16.0);
    }

    #[test]
    fn classify_is_inclusive() {
        let range = TargetRange::new(90, 150);
        assert_eq!(range.classify(89), TargetStatus::Below);
        assert_eq!(range.classify(90), TargetStatus::Within);
        assert_eq!(range.classify(150), TargetStatus::Within);
        assert_eq!(range.classify(151), TargetStatus::Above);
        assert!(range.contains(120));
    }
}

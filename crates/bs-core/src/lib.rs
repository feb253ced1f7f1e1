//! Core domain logic for infant care analytics.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: sleeps, feeds, diapers and milestones logged by caregivers
//! - Date ranges: resolving `today`/`week`/`month`/`custom` into UTC bounds
//! - Sleep and feeding analytics over a resolved range
//! - Wake windows: derived awake periods rated against age targets
//!
//! Every analytics function is pure and total. Callers sample a [`Clock`]
//! once and pass the same reference timestamp through the whole pass.

pub mod baby;
pub mod clock;
pub mod event;
pub mod feeding;
pub mod range;
pub mod sleep;
pub mod summary;
pub mod targets;
pub mod types;
pub mod validate;
pub mod wake;

pub use baby::{BabyProfile, Gender};
pub use clock::{Clock, FixedClock, SystemClock};
pub use event::{
    BabyEvent, BreastSide, CareEvent, DiaperEvent, DiaperType, EventKind, EventMeta, FeedEvent,
    FeedMethod, MilestoneCategory, MilestoneEvent, SleepEvent, SleepQuality, SleepState, Volume,
    VolumeUnit,
};
pub use feeding::{DailyFeeding, FeedingAnalytics, compute_feeding_analytics};
pub use range::{DateRange, DateRangeSelector};
pub use sleep::{DailySleep, SleepAnalytics, compute_sleep_analytics};
pub use summary::{DaySummary, summarize_day, summarize_days};
pub use targets::{TargetRange, TargetStatus};
pub use types::{BabyId, EventId, UserId, ValidationError};
pub use validate::{validate_baby_name, validate_event};
pub use wake::{WakeWindow, WakeWindowQuality, compute_wake_windows, wake_windows_for_age};

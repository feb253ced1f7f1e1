//! Entry validation for caregiver-logged data.
//!
//! The analytics engines never call into this module; they are best effort
//! over whatever the store holds. Validation runs at the edges, before an
//! event or profile is written.

use crate::event::{BabyEvent, FeedEvent, FeedMethod, SleepEvent};
use crate::types::ValidationError;

/// Longest plausible single sleep, in minutes.
pub const MAX_SLEEP_MINUTES: i64 = 12 * 60;

/// Largest plausible single bottle, in fluid ounces.
pub const MAX_FEED_OZ: f64 = 12.0;

/// Longest plausible breastfeeding session, in minutes.
pub const MAX_BREAST_MINUTES: u32 = 60;

/// Longest accepted baby name, in characters after trimming.
pub const MAX_NAME_CHARS: usize = 50;

/// Returns every problem with `event`; empty when it is acceptable.
pub fn validate_event(event: &BabyEvent) -> Vec<ValidationError> {
    match event {
        BabyEvent::Sleep(sleep) => validate_sleep(sleep),
        BabyEvent::Feed(feed) => validate_feed(feed),
        BabyEvent::Diaper(_) => Vec::new(),
        BabyEvent::Milestone(milestone) => {
            if milestone.title.trim().is_empty() {
                vec![ValidationError::Empty { field: "title" }]
            } else {
                Vec::new()
            }
        }
    }
}

fn validate_sleep(sleep: &SleepEvent) -> Vec<ValidationError> {
    let Some(duration) = sleep.duration() else {
        return Vec::new();
    };

    let minutes = duration.num_minutes();
    if duration.num_milliseconds() < 0 {
        vec![ValidationError::EndBeforeStart]
    } else if minutes > MAX_SLEEP_MINUTES {
        vec![ValidationError::SleepTooLong { minutes }]
    } else {
        Vec::new()
    }
}

fn validate_feed(feed: &FeedEvent) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(oz) = feed.volume_oz().filter(|oz| !(*oz > 0.0 && *oz <= MAX_FEED_OZ)) {
        errors.push(ValidationError::OutOfRange {
            field: "volume",
            value: oz,
            min: 0.0,
            max: MAX_FEED_OZ,
            unit: "oz",
        });
    }

    if let Some(minutes) = feed
        .duration_minutes
        .filter(|m| !(1..=MAX_BREAST_MINUTES).contains(m))
    {
        errors.push(ValidationError::OutOfRange {
            field: "duration",
            value: f64::from(minutes),
            min: 0.0,
            max: f64::from(MAX_BREAST_MINUTES),
            unit: "minutes",
        });
    }

    match feed.method {
        FeedMethod::Bottle => {
            if feed.volume.is_none() {
                errors.push(ValidationError::Required {
                    field: "volume",
                    context: "bottle feeds",
                });
            }
        }
        FeedMethod::Breast => {
            if feed.duration_minutes.is_none() {
                errors.push(ValidationError::Required {
                    field: "duration",
                    context: "breast feeds",
                });
            }
            if feed.side.is_none() {
                errors.push(ValidationError::Required {
                    field: "side",
                    context: "breast feeds",
                });
            }
        }
        FeedMethod::Solids => {
            if feed.food_type.as_deref().is_none_or(|f| f.trim().is_empty()) {
                errors.push(ValidationError::Required {
                    field: "food type",
                    context: "solids",
                });
            }
        }
        FeedMethod::Mixed => {
            if feed.volume.is_none() && feed.duration_minutes.is_none() {
                errors.push(ValidationError::Required {
                    field: "volume or duration",
                    context: "mixed feeds",
                });
            }
        }
    }

    errors
}

/// Checks a profile name: 1 to 50 characters once surrounding whitespace is
/// trimmed. Returns the trimmed name.
pub fn validate_baby_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if (1..=MAX_NAME_CHARS).contains(&len) {
        Ok(trimmed)
    } else {
        Err(ValidationError::NameLength { len })
    }
}

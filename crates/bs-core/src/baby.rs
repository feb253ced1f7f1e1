//! Baby profiles and age calculation.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::types::{BabyId, define_str_enum};

define_str_enum!(
    /// Recorded gender, optional on a profile.
    Gender, "gender" {
        Male => "male",
        Female => "female",
        Other => "other",
    }
);

/// A baby profile shared between caregivers.
///
/// Owned by the store; the analytics engines only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BabyProfile {
    pub id: BabyId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl BabyProfile {
    pub fn new(id: BabyId, name: impl Into<String>, date_of_birth: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            date_of_birth,
            gender: None,
        }
    }

    /// Whole calendar months between birth and the reference's calendar date.
    ///
    /// A month counts once its day-of-month is reached; when the reference is
    /// the last day of a shorter month it counts as reached. A birth date in
    /// the future yields 0.
    pub fn age_in_months<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> u32 {
        months_between(self.date_of_birth, reference.date_naive())
    }

    /// Whole days between birth and the reference's calendar date, 0 if negative.
    pub fn age_in_days<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> u32 {
        let days = (reference.date_naive() - self.date_of_birth).num_days();
        u32::try_from(days).unwrap_or(0)
    }

    pub fn age_in_weeks<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> u32 {
        self.age_in_days(reference) / 7
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut months = (i64::from(to.year()) - i64::from(from.year())) * 12
        + i64::from(to.month())
        - i64::from(from.month());

    let end_of_month = to.succ_opt().is_none_or(|next| next.month() != to.month());
    if to.day() < from.day() && !end_of_month {
        months -= 1;
    }

    u32::try_from(months).unwrap_or(0)
}

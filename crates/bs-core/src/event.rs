//! Care events logged by caregivers.
//!
//! Every event kind shares an [`EventMeta`] and is reachable through the
//! [`CareEvent`] capability trait. [`BabyEvent`] is the closed sum over the
//! four kinds; the analytics engines only consume the sleep and feed variants.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BabyId, EventId, UserId, define_str_enum};

/// Millilitres per US fluid ounce.
pub const ML_PER_OZ: f64 = 29.5735;

define_str_enum!(
    /// Discriminator for the four event kinds.
    EventKind, "event kind" {
        Feed => "feed",
        Sleep => "sleep",
        Diaper => "diaper",
        Milestone => "milestone",
    }
);

define_str_enum!(
    /// Caregiver rating recorded when a sleep ends.
    SleepQuality, "sleep quality" {
        Excellent => "excellent",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
    }
);

define_str_enum!(
    /// How a feed was given.
    FeedMethod, "feed method" {
        Bottle => "bottle",
        Breast => "breast",
        Solids => "solids",
        Mixed => "mixed",
    }
);

define_str_enum!(
    /// Unit a volume was recorded in.
    VolumeUnit, "volume unit" {
        Oz => "oz",
        Ml => "ml",
    }
);

define_str_enum!(
    /// Side offered during breastfeeding.
    BreastSide, "breast side" {
        Left => "left",
        Right => "right",
        Both => "both",
    }
);

define_str_enum!(
    /// Diaper contents.
    DiaperType, "diaper type" {
        Wet => "wet",
        Dirty => "dirty",
        Both => "both",
    }
);

define_str_enum!(
    /// Developmental area a milestone belongs to.
    MilestoneCategory, "milestone category" {
        Physical => "physical",
        Cognitive => "cognitive",
        Social => "social",
        Language => "language",
        Other => "other",
    }
);

/// Fields shared by every event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Unique identifier for this event.
    pub id: EventId,
    /// The profile this event belongs to.
    pub baby_id: BabyId,
    /// When the event was logged.
    pub timestamp: DateTime<Utc>,
    /// Caregiver who logged it.
    pub created_by: UserId,
    /// Free-form caregiver notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EventMeta {
    /// Creates metadata without notes.
    pub const fn new(
        id: EventId,
        baby_id: BabyId,
        created_by: UserId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            baby_id,
            timestamp,
            created_by,
            notes: None,
        }
    }

    /// Attaches caregiver notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Shared capability interface over every event kind.
pub trait CareEvent {
    /// Returns the shared metadata.
    fn meta(&self) -> &EventMeta;

    /// Returns the event kind.
    fn kind(&self) -> EventKind;

    /// Returns the event ID.
    fn id(&self) -> &EventId {
        &self.meta().id
    }

    /// Returns the owning profile ID.
    fn baby_id(&self) -> &BabyId {
        &self.meta().baby_id
    }

    /// Returns when the event was logged.
    fn timestamp(&self) -> DateTime<Utc> {
        self.meta().timestamp
    }

    /// Returns caregiver notes, if any.
    fn notes(&self) -> Option<&str> {
        self.meta().notes.as_deref()
    }
}

// ========== Sleep ==========

/// Whether a sleep interval has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SleepState {
    /// The baby is still asleep; no duration exists yet.
    #[default]
    Ongoing,
    /// The sleep has an end time.
    Ended {
        end_time: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quality: Option<SleepQuality>,
    },
}

/// A sleep interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    /// When the baby fell asleep.
    pub start_time: DateTime<Utc>,
    /// Night sleep rather than a nap.
    #[serde(default)]
    pub is_night_sleep: bool,
    /// Caregiver-assigned nap number, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nap_number: Option<u32>,
    #[serde(default)]
    pub state: SleepState,
}

impl SleepEvent {
    /// Starts an ongoing sleep.
    pub const fn new(meta: EventMeta, start_time: DateTime<Utc>, is_night_sleep: bool) -> Self {
        Self {
            meta,
            start_time,
            is_night_sleep,
            nap_number: None,
            state: SleepState::Ongoing,
        }
    }

    /// Returns this sleep closed at `end_time`.
    #[must_use]
    pub fn ended(mut self, end_time: DateTime<Utc>, quality: Option<SleepQuality>) -> Self {
        self.end(end_time, quality);
        self
    }

    /// Closes the sleep. This is the only mutation a sleep goes through.
    pub fn end(&mut self, end_time: DateTime<Utc>, quality: Option<SleepQuality>) {
        self.state = SleepState::Ended { end_time, quality };
    }

    /// Returns the end time if the sleep has ended.
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SleepState::Ongoing => None,
            SleepState::Ended { end_time, .. } => Some(end_time),
        }
    }

    /// Returns the recorded quality, if any.
    pub const fn quality(&self) -> Option<SleepQuality> {
        match self.state {
            SleepState::Ongoing => None,
            SleepState::Ended { quality, .. } => quality,
        }
    }

    /// Duration of a completed sleep.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time().map(|end| end - self.start_time)
    }

    /// Duration of a completed sleep in milliseconds.
    pub fn duration_ms(&self) -> Option<i64> {
        self.duration().map(|d| d.num_milliseconds())
    }

    pub const fn is_ongoing(&self) -> bool {
        matches!(self.state, SleepState::Ongoing)
    }

    pub const fn is_nap(&self) -> bool {
        !self.is_night_sleep
    }
}

impl CareEvent for SleepEvent {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn kind(&self) -> EventKind {
        EventKind::Sleep
    }
}

// ========== Feed ==========

/// A recorded volume with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub amount: f64,
    pub unit: VolumeUnit,
}

impl Volume {
    pub const fn oz(amount: f64) -> Self {
        Self {
            amount,
            unit: VolumeUnit::Oz,
        }
    }

    pub const fn ml(amount: f64) -> Self {
        Self {
            amount,
            unit: VolumeUnit::Ml,
        }
    }

    /// The volume in fluid ounces, the unit all analytics use.
    pub fn as_oz(self) -> f64 {
        match self.unit {
            VolumeUnit::Oz => self.amount,
            VolumeUnit::Ml => self.amount / ML_PER_OZ,
        }
    }

    pub fn as_ml(self) -> f64 {
        match self.unit {
            VolumeUnit::Oz => self.amount * ML_PER_OZ,
            VolumeUnit::Ml => self.amount,
        }
    }
}

/// A feeding.
///
/// Which optional fields are present depends on the method (bottle feeds
/// carry a volume, breast feeds a duration and side, solids a food type),
/// but nothing here enforces it. See [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub method: FeedMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<BreastSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_type: Option<String>,
}

impl FeedEvent {
    pub const fn new(meta: EventMeta, method: FeedMethod) -> Self {
        Self {
            meta,
            method,
            volume: None,
            duration_minutes: None,
            side: None,
            food_type: None,
        }
    }

    #[must_use]
    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = Some(volume);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn with_side(mut self, side: BreastSide) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub fn with_food_type(mut self, food_type: impl Into<String>) -> Self {
        self.food_type = Some(food_type.into());
        self
    }

    /// Unit-normalized volume in fluid ounces.
    pub fn volume_oz(&self) -> Option<f64> {
        self.volume.map(Volume::as_oz)
    }
}

impl CareEvent for FeedEvent {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn kind(&self) -> EventKind {
        EventKind::Feed
    }
}

// ========== Diaper / Milestone ==========

/// A diaper change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaperEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub diaper_type: DiaperType,
}

impl CareEvent for DiaperEvent {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn kind(&self) -> EventKind {
        EventKind::Diaper
    }
}

/// A developmental milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: MilestoneCategory,
}

impl CareEvent for MilestoneEvent {
    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn kind(&self) -> EventKind {
        EventKind::Milestone
    }
}

// ========== Sum type ==========

/// Any care event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BabyEvent {
    Sleep(SleepEvent),
    Feed(FeedEvent),
    Diaper(DiaperEvent),
    Milestone(MilestoneEvent),
}

impl BabyEvent {
    /// The instant range filters apply to: a sleep's start time, otherwise the
    /// log timestamp.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Sleep(sleep) => sleep.start_time,
            other => other.timestamp(),
        }
    }

    pub const fn as_sleep(&self) -> Option<&SleepEvent> {
        match self {
            Self::Sleep(sleep) => Some(sleep),
            _ => None,
        }
    }

    pub const fn as_feed(&self) -> Option<&FeedEvent> {
        match self {
            Self::Feed(feed) => Some(feed),
            _ => None,
        }
    }
}

impl CareEvent for BabyEvent {
    fn meta(&self) -> &EventMeta {
        match self {
            Self::Sleep(e) => e.meta(),
            Self::Feed(e) => e.meta(),
            Self::Diaper(e) => e.meta(),
            Self::Milestone(e) => e.meta(),
        }
    }

    fn kind(&self) -> EventKind {
        match self {
            Self::Sleep(_) => EventKind::Sleep,
            Self::Feed(_) => EventKind::Feed,
            Self::Diaper(_) => EventKind::Diaper,
            Self::Milestone(_) => EventKind::Milestone,
        }
    }
}

impl From<SleepEvent> for BabyEvent {
    fn from(event: SleepEvent) -> Self {
        Self::Sleep(event)
    }
}

impl From<FeedEvent> for BabyEvent {
    fn from(event: FeedEvent) -> Self {
        Self::Feed(event)
    }
}

impl From<DiaperEvent> for BabyEvent {
    fn from(event: DiaperEvent) -> Self {
        Self::Diaper(event)
    }
}

impl From<MilestoneEvent> for BabyEvent {
    fn from(event: MilestoneEvent) -> Self {
        Self::Milestone(event)
    }
}

//! Storage layer for baby profiles and care events.
//!
//! Provides persistence using `rusqlite` and hands back typed `bs_core`
//! values.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization (e.g. a `Mutex<Database>`).
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2025-01-15T10:30:00.000Z`), so lexicographic ordering matches
//! chronological ordering. Dates of birth are stored as `YYYY-MM-DD`.
//!
//! ## Event Payload Storage
//!
//! The `data` column stores the whole event as JSON, tagged with its kind, and
//! the `type` column repeats the kind for filtering. `occurred_at` is the
//! instant range queries use: a sleep's start time, otherwise the log
//! timestamp. `end_time` is set only for sleeps that have ended, which makes
//! "is the baby asleep right now" a single indexed lookup.

use std::path::Path;

use bs_core::{
    BabyEvent, BabyId, BabyProfile, CareEvent, EventId, EventKind, FeedEvent, Gender, SleepEvent,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Params, params};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An event references a baby profile that does not exist.
    #[error("unknown baby: {0}")]
    UnknownBaby(String),
    /// Failed to parse a stored date.
    #[error("invalid date for {record_id}: {value}")]
    DateParse {
        record_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored profile row could not be turned into a profile.
    #[error("invalid profile {baby_id}: {message}")]
    InvalidProfile { baby_id: String, message: String },
    /// Failed to parse or serialize an event payload.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An event flattened into its storage columns.
struct EventRow {
    id: String,
    baby_id: String,
    timestamp: String,
    occurred_at: String,
    kind: &'static str,
    data: String,
    end_time: Option<String>,
}

impl EventRow {
    fn from_event(event: &BabyEvent) -> Result<Self, DbError> {
        let data = serde_json::to_string(event).map_err(|err| DbError::InvalidEventData {
            event_id: event.id().to_string(),
            message: err.to_string(),
        })?;
        let end_time = event
            .as_sleep()
            .and_then(SleepEvent::end_time)
            .map(format_timestamp);

        Ok(Self {
            id: event.id().to_string(),
            baby_id: event.baby_id().to_string(),
            timestamp: format_timestamp(event.timestamp()),
            occurred_at: format_timestamp(event.occurred_at()),
            kind: event.kind().as_str(),
            data,
            end_time,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS babies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                date_of_birth TEXT NOT NULL,
                gender TEXT
            );

            -- Events table: one row per logged care event
            -- timestamp/occurred_at/end_time: RFC 3339 UTC
            -- type: event kind ('sleep', 'feed', 'diaper', 'milestone')
            -- data: JSON payload of the whole event
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                baby_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                occurred_at TEXT NOT NULL,
                type TEXT NOT NULL,
                schema_version INTEGER DEFAULT 1,
                data TEXT NOT NULL,
                end_time TEXT,
                FOREIGN KEY (baby_id) REFERENCES babies(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_events_baby_occurred ON events(baby_id, occurred_at);
            CREATE INDEX IF NOT EXISTS idx_events_type ON events(type);
            ",
        )?;
        Ok(())
    }

    // ========== Babies ==========

    /// Inserts a profile, ignoring duplicates by ID.
    ///
    /// Returns whether a row was written.
    pub fn insert_baby(&mut self, baby: &BabyProfile) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO babies (id, name, date_of_birth, gender)
            VALUES (?, ?, ?, ?)
            ",
            params![
                baby.id.as_str(),
                baby.name,
                baby.date_of_birth.format(DATE_FORMAT).to_string(),
                baby.gender.map(|g| g.as_str()),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Looks up a profile by ID.
    pub fn get_baby(&self, id: &BabyId) -> Result<Option<BabyProfile>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, date_of_birth, gender FROM babies WHERE id = ?",
                [id.as_str()],
                BabyRow::from_row,
            )
            .optional()?;
        row.map(BabyRow::into_profile).transpose()
    }

    /// Lists profiles ordered by name then ID.
    pub fn list_babies(&self) -> Result<Vec<BabyProfile>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, date_of_birth, gender
            FROM babies
            ORDER BY name ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], BabyRow::from_row)?;
        let mut babies = Vec::new();
        for row in rows {
            babies.push(row?.into_profile()?);
        }
        Ok(babies)
    }

    fn baby_exists(conn: &Connection, id: &str) -> Result<bool, DbError> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM babies WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    // ========== Events ==========

    /// Inserts an event, ignoring duplicates by ID.
    ///
    /// Returns whether a row was written.
    pub fn insert_event(&mut self, event: &BabyEvent) -> Result<bool, DbError> {
        Ok(self.insert_events(std::slice::from_ref(event))? > 0)
    }

    /// Inserts a batch of events in one transaction, ignoring duplicates by ID.
    ///
    /// Fails without writing anything if any event references an unknown baby.
    pub fn insert_events(&mut self, events: &[BabyEvent]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO events
                (id, baby_id, timestamp, occurred_at, type, data, end_time)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                let row = EventRow::from_event(event)?;
                if !Self::baby_exists(&tx, &row.baby_id)? {
                    return Err(DbError::UnknownBaby(row.baby_id));
                }
                inserted += stmt.execute(params![
                    row.id,
                    row.baby_id,
                    row.timestamp,
                    row.occurred_at,
                    row.kind,
                    row.data,
                    row.end_time,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = events.len(), "inserted events");
        Ok(inserted)
    }

    /// Replaces a stored event with `event`, matched by ID.
    ///
    /// Returns whether an event with that ID existed.
    pub fn update_event(&mut self, event: &BabyEvent) -> Result<bool, DbError> {
        let row = EventRow::from_event(event)?;
        if !Self::baby_exists(&self.conn, &row.baby_id)? {
            return Err(DbError::UnknownBaby(row.baby_id));
        }
        let updated = self.conn.execute(
            "
            UPDATE events
            SET baby_id = ?, timestamp = ?, occurred_at = ?, type = ?, data = ?, end_time = ?
            WHERE id = ?
            ",
            params![
                row.baby_id,
                row.timestamp,
                row.occurred_at,
                row.kind,
                row.data,
                row.end_time,
                row.id,
            ],
        )?;
        Ok(updated > 0)
    }

    /// Deletes an event. Returns whether it existed.
    pub fn delete_event(&mut self, id: &EventId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id.as_str()])?;
        Ok(deleted > 0)
    }

    /// Lists a baby's events ordered by occurrence, ties in insertion order.
    pub fn list_events(&self, baby_id: &BabyId) -> Result<Vec<BabyEvent>, DbError> {
        self.query_events(
            "
            SELECT id, type, data FROM events
            WHERE baby_id = ?
            ORDER BY occurred_at ASC, rowid ASC
            ",
            [baby_id.as_str()],
        )
    }

    /// Lists a baby's events that occurred within a time range.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn list_events_in_range(
        &self,
        baby_id: &BabyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BabyEvent>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        self.query_events(
            "
            SELECT id, type, data FROM events
            WHERE baby_id = ? AND occurred_at >= ? AND occurred_at < ?
            ORDER BY occurred_at ASC, rowid ASC
            ",
            params![baby_id.as_str(), format_timestamp(start), format_timestamp(end)],
        )
    }

    /// Every sleep logged for a baby, ongoing ones included.
    pub fn sleep_events(&self, baby_id: &BabyId) -> Result<Vec<SleepEvent>, DbError> {
        let events = self.events_of_kind(baby_id, EventKind::Sleep)?;
        Ok(events
            .into_iter()
            .filter_map(|event| match event {
                BabyEvent::Sleep(sleep) => Some(sleep),
                _ => None,
            })
            .collect())
    }

    /// Every feed logged for a baby.
    pub fn feed_events(&self, baby_id: &BabyId) -> Result<Vec<FeedEvent>, DbError> {
        let events = self.events_of_kind(baby_id, EventKind::Feed)?;
        Ok(events
            .into_iter()
            .filter_map(|event| match event {
                BabyEvent::Feed(feed) => Some(feed),
                _ => None,
            })
            .collect())
    }

    /// The most recently started sleep that has not ended, if any.
    pub fn ongoing_sleep(&self, baby_id: &BabyId) -> Result<Option<SleepEvent>, DbError> {
        let events = self.query_events(
            "
            SELECT id, type, data FROM events
            WHERE baby_id = ? AND type = 'sleep' AND end_time IS NULL
            ORDER BY occurred_at DESC, rowid DESC
            LIMIT 1
            ",
            [baby_id.as_str()],
        )?;
        Ok(events.into_iter().find_map(|event| match event {
            BabyEvent::Sleep(sleep) => Some(sleep),
            _ => None,
        }))
    }

    fn events_of_kind(&self, baby_id: &BabyId, kind: EventKind) -> Result<Vec<BabyEvent>, DbError> {
        self.query_events(
            "
            SELECT id, type, data FROM events
            WHERE baby_id = ? AND type = ?
            ORDER BY occurred_at ASC, rowid ASC
            ",
            params![baby_id.as_str(), kind.as_str()],
        )
    }

    fn query_events<P: Params>(&self, sql: &str, params: P) -> Result<Vec<BabyEvent>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut events = Vec::new();
        for row in rows {
            let (id, kind, data) = row?;
            events.push(parse_event(&id, &kind, &data)?);
        }
        Ok(events)
    }
}

/// Profile columns as stored.
struct BabyRow {
    id: String,
    name: String,
    date_of_birth: String,
    gender: Option<String>,
}

impl BabyRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            date_of_birth: row.get(2)?,
            gender: row.get(3)?,
        })
    }

    fn into_profile(self) -> Result<BabyProfile, DbError> {
        let date_of_birth = parse_date(&self.date_of_birth, &self.id)?;
        let gender = self
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(|err| DbError::InvalidProfile {
                baby_id: self.id.clone(),
                message: err.to_string(),
            })?;
        let id = BabyId::new(self.id.clone()).map_err(|err| DbError::InvalidProfile {
            baby_id: self.id,
            message: err.to_string(),
        })?;

        let mut baby = BabyProfile::new(id, self.name, date_of_birth);
        baby.gender = gender;
        Ok(baby)
    }
}

fn parse_event(id: &str, kind: &str, data: &str) -> Result<BabyEvent, DbError> {
    let event: BabyEvent = serde_json::from_str(data).map_err(|err| DbError::InvalidEventData {
        event_id: id.to_string(),
        message: err.to_string(),
    })?;
    if event.kind().as_str() != kind {
        return Err(DbError::InvalidEventData {
            event_id: id.to_string(),
            message: format!("payload is a {} event but row type is {kind}", event.kind()),
        });
    }
    Ok(event)
}

fn parse_date(value: &str, record_id: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DbError::DateParse {
        record_id: record_id.to_string(),
        value: value.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

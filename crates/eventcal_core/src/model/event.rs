//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical calendar event record.
//! - Enforce field-level invariants via `Event::validate()`.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - `title` is non-blank.
//! - `ends_at >= starts_at`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every event record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EventId = Uuid;

/// Validation failure raised before any persistence happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// `title` is empty or whitespace-only.
    BlankTitle,
    /// `ends_at` is earlier than `starts_at`.
    EndsBeforeStarts {
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::EndsBeforeStarts { starts_at, ends_at } => write!(
                f,
                "event ends_at {ends_at} is earlier than starts_at {starts_at}"
            ),
        }
    }
}

impl Error for EventValidationError {}

/// Canonical domain record for a calendar event.
///
/// Timestamps are UTC-naive; the storage layer persists them at second
/// precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable global ID used for lookups and updates.
    pub id: EventId,
    /// Human-readable label.
    pub title: String,
    /// Start of the event's active interval.
    pub starts_at: NaiveDateTime,
    /// End of the event's active interval. Never earlier than `starts_at`.
    pub ends_at: NaiveDateTime,
}

impl Event {
    /// Creates a new event with a generated stable ID.
    ///
    /// # Errors
    /// Returns `EventValidationError` when the title is blank or the
    /// interval is inverted.
    pub fn new(
        title: impl Into<String>,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<Self, EventValidationError> {
        Self::with_id(Uuid::new_v4(), title, starts_at, ends_at)
    }

    /// Creates an event with a caller-provided stable ID.
    ///
    /// Used by import/seed paths where identity already exists externally.
    ///
    /// # Errors
    /// Returns `EventValidationError` when the title is blank or the
    /// interval is inverted.
    pub fn with_id(
        id: EventId,
        title: impl Into<String>,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<Self, EventValidationError> {
        let event = Self {
            id,
            title: title.into(),
            starts_at,
            ends_at,
        };
        event.validate()?;
        Ok(event)
    }

    /// Checks domain invariants on the current field values.
    ///
    /// # Errors
    /// - `BlankTitle` when `title` trims to nothing.
    /// - `EndsBeforeStarts` when the interval is inverted.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::BlankTitle);
        }
        if self.ends_at < self.starts_at {
            return Err(EventValidationError::EndsBeforeStarts {
                starts_at: self.starts_at,
                ends_at: self.ends_at,
            });
        }
        Ok(())
    }

    /// Returns the event duration in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.ends_at - self.starts_at).num_seconds()
    }
}

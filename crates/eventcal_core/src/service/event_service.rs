//! Event use-case service.
//!
//! # Responsibility
//! - Provide stable scheduling/lookup entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Listing APIs return events ordered ascending by start.

use crate::model::event::{Event, EventId};
use crate::query::interval::IntervalFilter;
use crate::repo::event_repo::{EventRepository, RepoResult};
use chrono::NaiveDateTime;

/// Use-case service wrapper for event operations.
pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Schedules a new event and returns its stable ID.
    pub fn schedule_event(
        &self,
        title: impl Into<String>,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> RepoResult<EventId> {
        let event = Event::new(title, starts_at, ends_at)?;
        self.repo.create_event(&event)
    }

    /// Updates an existing event by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_event(&self, event: &Event) -> RepoResult<()> {
        self.repo.update_event(event)
    }

    /// Gets one event by ID.
    pub fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        self.repo.get_event(id)
    }

    /// Lists events whose interval intersects the given bounds, ordered
    /// ascending by start.
    ///
    /// Bound semantics follow [`IntervalFilter`]: no bounds lists
    /// everything, a lone start bound matches events containing that point
    /// at day granularity, and both bounds select interval overlap.
    pub fn events_between(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> RepoResult<Vec<Event>> {
        self.repo
            .list_overlapping(&IntervalFilter::from_bounds(start, end))
    }
}

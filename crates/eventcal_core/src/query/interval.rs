//! Interval-overlap filtering for events.
//!
//! # Responsibility
//! - Build a selection predicate for events overlapping a query range.
//! - Keep the predicate pure so it can run in memory or be pushed down to
//!   SQL by the repository.
//!
//! # Invariants
//! - `matches` is total: every `(filter, event)` pair yields a boolean.
//! - The one-bound case compares at calendar-day granularity; the two-bound
//!   case compares full timestamps. The asymmetry is intentional and must
//!   not be "normalized".

use crate::model::event::Event;
use chrono::NaiveDateTime;

/// Selection window for event queries.
///
/// Both bounds are optional:
///
/// - neither bound: matches every event.
/// - `start` only: matches events whose interval contains the reference
///   point, compared at calendar-day granularity (inclusive on both ends).
/// - both bounds: matches events whose `[starts_at, ends_at]` interval
///   intersects `[start, end]`, compared at full timestamp granularity.
///   Two closed intervals `[a, b]` and `[c, d]` intersect iff
///   `a <= d && b >= c`; touching endpoints count.
/// - `end` only: applies no filtering. A lone upper bound is deliberately a
///   no-op; callers wanting one must supply both bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntervalFilter {
    /// Lower bound of the query range, or the reference point when `end`
    /// is absent.
    pub start: Option<NaiveDateTime>,
    /// Upper bound of the query range.
    pub end: Option<NaiveDateTime>,
}

impl IntervalFilter {
    /// Returns the filter that matches every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns the filter matching events whose interval contains `at`,
    /// compared by calendar date.
    pub fn containing(at: NaiveDateTime) -> Self {
        Self {
            start: Some(at),
            end: None,
        }
    }

    /// Returns the filter matching events overlapping `[start, end]`.
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Builds a filter from optional bounds as they arrive from callers.
    pub fn from_bounds(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Returns whether this filter selects every event.
    pub fn is_unbounded(&self) -> bool {
        // An end without a start falls through to "match all"; see the
        // type-level docs.
        self.start.is_none()
    }

    /// Evaluates the predicate against one event.
    ///
    /// Pure and side-effect free; applying the same filter twice yields the
    /// same result as applying it once.
    pub fn matches(&self, event: &Event) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => event.starts_at <= end && event.ends_at >= start,
            (Some(at), None) => {
                event.starts_at.date() <= at.date() && event.ends_at.date() >= at.date()
            }
            (None, _) => true,
        }
    }
}

/// Sorts events ascending by `starts_at`.
///
/// The sort is stable, so events sharing a start keep their insertion
/// order.
pub fn order_by_start(events: &mut [Event]) {
    events.sort_by_key(|event| event.starts_at);
}

//! Core domain logic for eventcal.
//! This crate is the single source of truth for event-data invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{Event, EventId, EventValidationError};
pub use query::interval::{order_by_start, IntervalFilter};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use seed::{seed_events, seed_events_with, SeedError, SeedOutcome, DEFAULT_SEED_COUNT};
pub use service::event_service::EventService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Domain model for calendar events.
//!
//! # Responsibility
//! - Define the canonical event record used by core business logic.
//! - Validate domain invariants before anything reaches storage.
//!
//! # Invariants
//! - Every event is identified by a stable `EventId`.
//! - `ends_at` is never earlier than `starts_at` on a valid record.

pub mod event;

//! Query-side building blocks shared by callers and persistence.
//!
//! # Responsibility
//! - Express event selection as plain predicates, independent of SQL.
//! - Provide deterministic ordering helpers.

pub mod interval;

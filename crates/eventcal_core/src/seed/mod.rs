//! Sample-data seeding and `ends_at` backfill.
//!
//! # Responsibility
//! - Populate an empty store with generated sample events.
//! - Backfill `ends_at` on rows that predate the column.
//!
//! # Invariants
//! - Backfill never writes an `ends_at` earlier than `starts_at`.
//! - A row whose `starts_at` cannot be parsed aborts the run instead of
//!   being silently skipped.

use crate::db::DbError;
use crate::model::event::{Event, EventValidationError};
use crate::repo::event_repo::{
    datetime_to_db, parse_db_datetime, EventRepository, RepoError, SqliteEventRepository,
};
use chrono::{Duration, Utc};
use log::{error, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default number of sample events generated into an empty store.
pub const DEFAULT_SEED_COUNT: u32 = 100;

const MAX_DURATION_HOURS: i64 = 720;

pub type SeedResult<T> = Result<T, SeedError>;

/// Seeding/backfill error.
#[derive(Debug)]
pub enum SeedError {
    Repo(RepoError),
    /// A persisted row has a `starts_at` the seeder cannot parse, so its
    /// `ends_at` cannot be computed.
    UnparseableStartsAt {
        id: String,
        value: String,
    },
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::UnparseableStartsAt { id, value } => write!(
                f,
                "cannot backfill event `{id}`: unparseable starts_at `{value}`"
            ),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UnparseableStartsAt { .. } => None,
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for SeedError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}

impl From<EventValidationError> for SeedError {
    fn from(value: EventValidationError) -> Self {
        Self::Repo(RepoError::Validation(value))
    }
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty; `n` sample events were generated.
    Generated(u32),
    /// The store had rows; `n` of them got a backfilled `ends_at`.
    Backfilled(u32),
}

/// Runs the seeder with an entropy-seeded RNG.
///
/// See [`seed_events_with`] for the exact behavior.
pub fn seed_events(conn: &Connection, count: u32) -> SeedResult<SeedOutcome> {
    let mut rng = SmallRng::from_entropy();
    seed_events_with(conn, count, &mut rng)
}

/// Runs the seeder with a caller-provided RNG.
///
/// - Empty `events` table: generates `count` sample events with random
///   start times and durations of 1..=720 hours, then bulk-inserts them.
/// - Non-empty table: backfills `ends_at = starts_at + rand(1..=720) hours`
///   for every row where `ends_at` is NULL. Rows that already carry an
///   `ends_at` are left untouched; the seeder never re-randomizes a value
///   that is already set.
///
/// # Errors
/// - `UnparseableStartsAt` when a backfill row's start cannot be parsed.
/// - Repository/DB errors are passed through.
pub fn seed_events_with(
    conn: &Connection,
    count: u32,
    rng: &mut impl Rng,
) -> SeedResult<SeedOutcome> {
    info!("event=seed_run module=seed status=start");

    let repo = SqliteEventRepository::try_new(conn)?;
    let outcome = if repo.count_events()? == 0 {
        generate_sample_events(&repo, count, rng)?
    } else {
        backfill_missing_ends(conn, rng)?
    };

    match outcome {
        SeedOutcome::Generated(n) => {
            info!("event=seed_run module=seed status=ok mode=generate count={n}");
        }
        SeedOutcome::Backfilled(n) => {
            info!("event=seed_run module=seed status=ok mode=backfill count={n}");
        }
    }

    Ok(outcome)
}

fn generate_sample_events(
    repo: &SqliteEventRepository<'_>,
    count: u32,
    rng: &mut impl Rng,
) -> SeedResult<SeedOutcome> {
    let anchor = Utc::now().naive_utc();
    let mut events = Vec::with_capacity(count as usize);

    for index in 0..count {
        // Spread starts over roughly a year around now, at hour precision.
        let offset_hours = rng.gen_range(-180 * 24..=185 * 24);
        let duration_hours = rng.gen_range(1..=MAX_DURATION_HOURS);
        let starts_at = anchor + Duration::hours(offset_hours);
        let ends_at = starts_at + Duration::hours(duration_hours);
        events.push(Event::new(
            format!("Sample event {}", index + 1),
            starts_at,
            ends_at,
        )?);
    }

    repo.insert_events(&events)?;
    Ok(SeedOutcome::Generated(count))
}

fn backfill_missing_ends(conn: &Connection, rng: &mut impl Rng) -> SeedResult<SeedOutcome> {
    let mut stmt = conn.prepare("SELECT id, starts_at FROM events WHERE ends_at IS NULL;")?;
    let mut rows = stmt.query([])?;
    let mut pending: Vec<(String, String)> = Vec::new();

    while let Some(row) = rows.next()? {
        pending.push((row.get(0)?, row.get(1)?));
    }

    let tx = conn.unchecked_transaction()?;
    let mut backfilled: u32 = 0;
    {
        let mut update = tx.prepare(
            "UPDATE events
             SET ends_at = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
        )?;

        for (id, starts_at_text) in &pending {
            let starts_at = match parse_db_datetime(starts_at_text) {
                Some(value) => value,
                None => {
                    error!(
                        "event=seed_run module=seed status=error error_code=unparseable_starts_at id={id}"
                    );
                    return Err(SeedError::UnparseableStartsAt {
                        id: id.clone(),
                        value: starts_at_text.clone(),
                    });
                }
            };

            let ends_at = starts_at + Duration::hours(rng.gen_range(1..=MAX_DURATION_HOURS));
            update.execute(params![datetime_to_db(ends_at), id])?;
            backfilled += 1;
        }
    }
    tx.commit()?;

    Ok(SeedOutcome::Backfilled(backfilled))
}

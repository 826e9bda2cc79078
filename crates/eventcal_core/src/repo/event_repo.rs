//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and window-query APIs over `events` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Event::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Window queries push the same predicate down to SQL that
//!   `IntervalFilter::matches` evaluates in memory.

use crate::db::DbError;
use crate::model::event::{Event, EventId, EventValidationError};
use crate::query::interval::IntervalFilter;
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    starts_at,
    ends_at
FROM events";

pub(crate) const DB_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
    /// The connection has not been migrated to the schema this binary
    /// expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for event CRUD and window queries.
pub trait EventRepository {
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    fn insert_events(&self, events: &[Event]) -> RepoResult<usize>;
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_overlapping(&self, filter: &IntervalFilter) -> RepoResult<Vec<Event>>;
    fn count_events(&self) -> RepoResult<u64>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Wraps a migrated connection after verifying the schema it needs.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not match
    ///   the latest migration known to this binary.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `events`
    ///   table shape is not usable.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        verify_schema(conn)?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (id, title, starts_at, ends_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                datetime_to_db(event.starts_at),
                datetime_to_db(event.ends_at),
            ],
        )?;

        Ok(event.id)
    }

    fn insert_events(&self, events: &[Event]) -> RepoResult<usize> {
        for event in events {
            event.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO events (id, title, starts_at, ends_at)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for event in events {
                stmt.execute(params![
                    event.id.to_string(),
                    event.title.as_str(),
                    datetime_to_db(event.starts_at),
                    datetime_to_db(event.ends_at),
                ])?;
            }
        }
        tx.commit()?;

        Ok(events.len())
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?1,
                starts_at = ?2,
                ends_at = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                event.title.as_str(),
                datetime_to_db(event.starts_at),
                datetime_to_db(event.ends_at),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn list_overlapping(&self, filter: &IntervalFilter) -> RepoResult<Vec<Event>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match (filter.start, filter.end) {
            (Some(start), Some(end)) => {
                sql.push_str(" AND starts_at <= ? AND ends_at >= ?");
                bind_values.push(Value::Text(datetime_to_db(end)));
                bind_values.push(Value::Text(datetime_to_db(start)));
            }
            (Some(at), None) => {
                sql.push_str(" AND date(starts_at) <= date(?) AND date(ends_at) >= date(?)");
                let at_text = datetime_to_db(at);
                bind_values.push(Value::Text(at_text.clone()));
                bind_values.push(Value::Text(at_text));
            }
            // An end bound without a start bound applies no filtering.
            (None, _) => {}
        }

        // rowid preserves insertion order for ties on starts_at.
        sql.push_str(" ORDER BY starts_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }

    fn count_events(&self) -> RepoResult<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn verify_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'events'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("events"));
    }

    const REQUIRED_COLUMNS: &[&str] = &["id", "title", "starts_at", "ends_at"];
    for &column in REQUIRED_COLUMNS {
        let column_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM pragma_table_info('events') WHERE name = ?1
            );",
            [column],
            |row| row.get(0),
        )?;
        if column_exists == 0 {
            return Err(RepoError::MissingRequiredColumn {
                table: "events",
                column,
            });
        }
    }

    Ok(())
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in events.id"))
    })?;

    let starts_at_text: String = row.get("starts_at")?;
    let starts_at = parse_db_datetime(&starts_at_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{starts_at_text}` in events.starts_at"
        ))
    })?;

    // ends_at arrived via an additive migration, so the column is nullable
    // at the SQL level; the domain requires it.
    let ends_at_text: String = row.get::<_, Option<String>>("ends_at")?.ok_or_else(|| {
        RepoError::InvalidData(format!("missing events.ends_at for event `{id_text}`"))
    })?;
    let ends_at = parse_db_datetime(&ends_at_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{ends_at_text}` in events.ends_at"
        ))
    })?;

    let event = Event {
        id,
        title: row.get("title")?,
        starts_at,
        ends_at,
    };
    event.validate()?;
    Ok(event)
}

pub(crate) fn datetime_to_db(value: NaiveDateTime) -> String {
    value.format(DB_DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_db_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DB_DATETIME_FORMAT).ok()
}

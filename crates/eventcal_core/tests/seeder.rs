use chrono::NaiveDateTime;
use eventcal_core::db::open_db_in_memory;
use eventcal_core::{
    seed_events_with, EventRepository, IntervalFilter, SeedError, SeedOutcome,
    SqliteEventRepository,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use uuid::Uuid;

#[test]
fn seeding_empty_store_generates_sample_events() {
    let conn = open_db_in_memory().unwrap();
    let mut rng = SmallRng::seed_from_u64(42);

    let outcome = seed_events_with(&conn, 25, &mut rng).unwrap();
    assert_eq!(outcome, SeedOutcome::Generated(25));

    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_events().unwrap(), 25);

    for event in repo.list_overlapping(&IntervalFilter::all()).unwrap() {
        let duration_hours = event.duration_seconds() / 3600;
        assert!(event.ends_at >= event.starts_at);
        assert!(
            (1..=720).contains(&duration_hours),
            "duration {duration_hours}h outside seeded bounds"
        );
    }
}

#[test]
fn seeding_populated_store_backfills_missing_ends() {
    let conn = open_db_in_memory().unwrap();

    insert_raw(&conn, "legacy a", "2025-01-01 08:00:00", None);
    insert_raw(&conn, "legacy b", "2025-03-15 19:30:00", None);
    insert_raw(
        &conn,
        "already complete",
        "2025-02-01 08:00:00",
        Some("2025-02-01 10:00:00"),
    );

    let mut rng = SmallRng::seed_from_u64(7);
    let outcome = seed_events_with(&conn, 100, &mut rng).unwrap();
    assert_eq!(outcome, SeedOutcome::Backfilled(2));

    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let events = repo.list_overlapping(&IntervalFilter::all()).unwrap();
    assert_eq!(events.len(), 3);
    for event in &events {
        assert!(event.ends_at >= event.starts_at);
    }

    let complete = events
        .iter()
        .find(|event| event.title == "already complete")
        .unwrap();
    assert_eq!(complete.ends_at, dt("2025-02-01 10:00:00"));
}

#[test]
fn second_run_backfills_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut rng = SmallRng::seed_from_u64(9);

    let first = seed_events_with(&conn, 10, &mut rng).unwrap();
    assert_eq!(first, SeedOutcome::Generated(10));

    let second = seed_events_with(&conn, 10, &mut rng).unwrap();
    assert_eq!(second, SeedOutcome::Backfilled(0));

    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_events().unwrap(), 10);
}

#[test]
fn unparseable_starts_at_aborts_backfill() {
    let conn = open_db_in_memory().unwrap();

    let bad_id = insert_raw(&conn, "corrupted", "definitely-not-a-date", None);

    let mut rng = SmallRng::seed_from_u64(3);
    let err = seed_events_with(&conn, 100, &mut rng).unwrap_err();
    match err {
        SeedError::UnparseableStartsAt { id, value } => {
            assert_eq!(id, bad_id);
            assert_eq!(value, "definitely-not-a-date");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Nothing was committed for the aborted run.
    let still_null: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM events WHERE ends_at IS NULL;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(still_null, 1);
}

fn insert_raw(
    conn: &rusqlite::Connection,
    title: &str,
    starts_at: &str,
    ends_at: Option<&str>,
) -> String {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO events (id, title, starts_at, ends_at) VALUES (?1, ?2, ?3, ?4);",
        rusqlite::params![id, title, starts_at, ends_at],
    )
    .unwrap();
    id
}

fn dt(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

use eventcal_core::db::migrations::{apply_migrations, latest_version, revert_migrations};
use eventcal_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "events");
    assert!(column_exists(&conn, "events", "starts_at"));
    assert!(column_exists(&conn, "events", "ends_at"));
}

#[test]
fn both_open_modes_share_the_same_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let file_conn = open_db(dir.path().join("bootstrap.db")).unwrap();
    let memory_conn = open_db_in_memory().unwrap();

    for conn in [&file_conn, &memory_conn] {
        assert_eq!(schema_version(conn), latest_version());
        let foreign_keys: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eventcal.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "events");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reverting_add_ends_at_migration_removes_the_column() {
    let mut conn = open_db_in_memory().unwrap();

    revert_migrations(&mut conn, 1).unwrap();
    assert_eq!(schema_version(&conn), 1);
    assert_table_exists(&conn, "events");
    assert!(!column_exists(&conn, "events", "ends_at"));

    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(column_exists(&conn, "events", "ends_at"));
}

#[test]
fn reverting_to_zero_drops_the_events_table() {
    let mut conn = open_db_in_memory().unwrap();

    revert_migrations(&mut conn, 0).unwrap();
    assert_eq!(schema_version(&conn), 0);

    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'events'
            );",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 0);
}

#[test]
fn reverting_to_current_version_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();

    revert_migrations(&mut conn, latest_version()).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(column_exists(&conn, "events", "ends_at"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn column_exists(conn: &Connection, table_name: &str, column_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1 FROM pragma_table_info('{table_name}') WHERE name = ?1
                );"
            ),
            [column_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

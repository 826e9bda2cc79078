//! CLI seeding entry point.
//!
//! # Responsibility
//! - Open (and migrate) an event database, then run the seeder against it.
//! - Keep output deterministic for quick local sanity checks.

use eventcal_core::db::open_db;
use eventcal_core::{seed_events, SeedOutcome, DEFAULT_SEED_COUNT};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| "eventcal.db".to_string());

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    match seed_events(&conn, DEFAULT_SEED_COUNT) {
        Ok(SeedOutcome::Generated(count)) => {
            println!("eventcal seed db={db_path} generated={count}");
            ExitCode::SUCCESS
        }
        Ok(SeedOutcome::Backfilled(count)) => {
            println!("eventcal seed db={db_path} backfilled={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("seeding `{db_path}` failed: {err}");
            ExitCode::FAILURE
        }
    }
}

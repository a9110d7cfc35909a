// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite`-specific initialization.
//!
//! This module is limited to connection setup: migration execution and
//! PRAGMA configuration. All queries and mutations use Diesel DSL and live
//! in the `queries` and `mutations` modules.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::error::PersistenceError;

/// Embedded schema migrations, applied on every connection open.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Helper row struct for PRAGMA queries.
///
/// Raw SQL is justified here: Diesel has no PRAGMA DSL.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Opens a connection, enables foreign keys, and runs pending migrations.
///
/// # Errors
///
/// Returns an error if the connection cannot be established or a migration
/// fails.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(|e| {
            PersistenceError::InitializationError(format!("Failed to enable foreign keys: {e}"))
        })?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    info!(database_url, "Database initialized");
    Ok(conn)
}

/// Enables WAL journaling for better read concurrency on file-backed
/// databases.
///
/// # Errors
///
/// Returns an error if the PRAGMA fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    conn.batch_execute("PRAGMA journal_mode = WAL")
        .map_err(|e| {
            PersistenceError::InitializationError(format!("Failed to enable WAL mode: {e}"))
        })?;
    Ok(())
}

/// Verifies that foreign key enforcement is enabled.
///
/// Referential integrity between tickets, comments, and feedback depends on
/// this; startup fails fast if it is off.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` if the PRAGMA reports 0.
pub fn verify_foreign_key_enforcement(
    conn: &mut SqliteConnection,
) -> Result<(), PersistenceError> {
    let rows: Vec<PragmaRow> = diesel::sql_query("PRAGMA foreign_keys")
        .load::<PragmaRow>(conn)
        .map_err(|e| {
            PersistenceError::InitializationError(format!("Failed to query foreign_keys: {e}"))
        })?;

    match rows.first() {
        Some(row) if row.foreign_keys == 1 => Ok(()),
        _ => Err(PersistenceError::ForeignKeyEnforcementNotEnabled),
    }
}

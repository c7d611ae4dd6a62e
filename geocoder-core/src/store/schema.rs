#![forbid(unsafe_code)]

use rusqlite::{Connection, Transaction};

use super::StoreError;

/// Create the `postcodes` and `imported_files` tables if they are missing.
///
/// Every statement uses `IF NOT EXISTS`, so running the function against a
/// populated database leaves its rows untouched.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use geocoder_core::store::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// initialise_schema(&mut conn).expect("second run is a no-op");
///
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
///         [],
///         |row| row.get(0),
///     )
///     .expect("count tables");
/// assert_eq!(tables, 2);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), StoreError> {
    let transaction = connection
        .transaction()
        .map_err(|source| StoreError::Schema {
            step: "begin schema transaction",
            source,
        })?;

    run_schema_step(
        &transaction,
        "create postcodes",
        "CREATE TABLE IF NOT EXISTS postcodes (
            postcode TEXT PRIMARY KEY NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL
        )",
    )?;
    run_schema_step(
        &transaction,
        "create imported_files",
        "CREATE TABLE IF NOT EXISTS imported_files (
            filename TEXT NOT NULL,
            imported_at TEXT NOT NULL
        )",
    )?;

    transaction.commit().map_err(|source| StoreError::Schema {
        step: "commit schema transaction",
        source,
    })
}

fn run_schema_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), StoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreError::Schema { step, source })
}

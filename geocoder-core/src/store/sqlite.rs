//! SQLite-backed postcode store.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use rusqlite::{
    Connection, ErrorCode, OpenFlags, OptionalExtension, params, params_from_iter,
};

use crate::{Coordinate, ImportMarker, PostcodeRecord};

use super::schema::initialise_schema;
use super::{PostcodeStore, StoreError};

/// SQLite limits bound parameters per statement to 999 by default. The store
/// chunks `IN` queries to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Postcode store persisted in a single SQLite file.
///
/// The store is not designed for concurrent writers; callers serialise
/// writes to the same file across threads and processes.
pub struct SqlitePostcodeStore {
    connection: Connection,
    path: Utf8PathBuf,
}

impl fmt::Debug for SqlitePostcodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlitePostcodeStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqlitePostcodeStore {
    /// Open the database at `path`, creating the file and schema if needed.
    ///
    /// The parent directory must already exist.
    pub fn create(path: &Utf8Path) -> Result<Self, StoreError> {
        let mut connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        initialise_schema(&mut connection)?;
        debug!("initialised postcode schema in {path}");
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing database without creating it.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection =
            Connection::open_with_flags(path.as_std_path(), flags).map_err(|source| {
                StoreError::Open {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Insert `records` in one transaction, skipping keys already present.
    ///
    /// Returns the number of rows actually inserted. Either the whole batch
    /// commits or none of it does.
    pub fn insert_batch(&mut self, records: &[PostcodeRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::Sqlite {
                operation: "begin batch transaction",
                source,
            })?;

        let mut inserted = 0;
        {
            let mut statement = transaction
                .prepare_cached(
                    "INSERT OR IGNORE INTO postcodes (postcode, latitude, longitude)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(|source| StoreError::Sqlite {
                    operation: "prepare batch insert",
                    source,
                })?;
            for record in records {
                inserted += statement
                    .execute(params![
                        record.postcode,
                        record.coordinate.latitude(),
                        record.coordinate.longitude()
                    ])
                    .map_err(|source| StoreError::Sqlite {
                        operation: "insert batch row",
                        source,
                    })?;
            }
        }

        transaction.commit().map_err(|source| StoreError::Sqlite {
            operation: "commit batch transaction",
            source,
        })?;
        Ok(inserted)
    }

    /// Append an import marker for `filename` stamped with the current time.
    pub fn record_import(&self, filename: &str) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO imported_files (filename, imported_at)
                 VALUES (?1, datetime('now'))",
                [filename],
            )
            .map(|_| ())
            .map_err(|source| StoreError::Sqlite {
                operation: "record import",
                source,
            })
    }

    /// Import markers in the order they were recorded.
    pub fn import_history(&self) -> Result<Vec<ImportMarker>, StoreError> {
        let query_error = |source| StoreError::Sqlite {
            operation: "read import history",
            source,
        };
        let mut statement = self
            .connection
            .prepare("SELECT filename, imported_at FROM imported_files ORDER BY rowid")
            .map_err(query_error)?;
        let markers = statement
            .query_map([], |row| {
                Ok(ImportMarker {
                    filename: row.get(0)?,
                    imported_at: row.get(1)?,
                })
            })
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(markers)
    }

    /// Rebuild the database file to reclaim unused pages.
    pub fn compact(&self) -> Result<(), StoreError> {
        self.connection
            .execute_batch("VACUUM")
            .map_err(|source| StoreError::Sqlite {
                operation: "compact database",
                source,
            })
    }

    fn load_chunk(&self, keys: &[String]) -> Result<Vec<PostcodeRecord>, StoreError> {
        let query_error = |source| StoreError::Sqlite {
            operation: "query postcodes",
            source,
        };
        let placeholders = vec!["?"; keys.len()].join(", ");
        let query = format!(
            "SELECT postcode, latitude, longitude FROM postcodes WHERE postcode IN ({placeholders})"
        );
        let mut statement = self.connection.prepare(&query).map_err(query_error)?;
        let mut rows = statement
            .query(params_from_iter(keys.iter()))
            .map_err(query_error)?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().map_err(query_error)? {
            let postcode: String = row.get(0).map_err(query_error)?;
            let latitude: f64 = row.get(1).map_err(query_error)?;
            let longitude: f64 = row.get(2).map_err(query_error)?;
            records.push(PostcodeRecord::new(
                postcode,
                Coordinate::new(latitude, longitude),
            ));
        }

        Ok(records)
    }
}

impl PostcodeStore for SqlitePostcodeStore {
    fn find(&self, postcode: &str) -> Result<Option<Coordinate>, StoreError> {
        self.connection
            .query_row(
                "SELECT latitude, longitude FROM postcodes WHERE postcode = ?1",
                [postcode],
                |row| Ok(Coordinate::new(row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|source| StoreError::Sqlite {
                operation: "look up postcode",
                source,
            })
    }

    fn find_many(&self, postcodes: &[String]) -> Result<Vec<PostcodeRecord>, StoreError> {
        let mut keys = postcodes.to_vec();
        keys.sort_unstable();
        keys.dedup();

        let mut records = Vec::new();
        for chunk in keys.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
            records.extend(self.load_chunk(chunk)?);
        }
        Ok(records)
    }

    fn insert(&mut self, record: &PostcodeRecord) -> Result<(), StoreError> {
        let outcome = self.connection.execute(
            "INSERT INTO postcodes (postcode, latitude, longitude) VALUES (?1, ?2, ?3)",
            params![
                record.postcode,
                record.coordinate.latitude(),
                record.coordinate.longitude()
            ],
        );
        match outcome {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey {
                    postcode: record.postcode.clone(),
                })
            }
            Err(source) => Err(StoreError::Sqlite {
                operation: "insert postcode",
                source,
            }),
        }
    }

    fn random_postcode(&self) -> Result<Option<String>, StoreError> {
        self.connection
            .query_row(
                "SELECT postcode FROM postcodes ORDER BY RANDOM() LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| StoreError::Sqlite {
                operation: "sample random postcode",
                source,
            })
    }

    fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM postcodes", [], |row| row.get(0))
            .map_err(|source| StoreError::Sqlite {
                operation: "count postcodes",
                source,
            })?;
        u64::try_from(count).map_err(|_| StoreError::InvalidCount { count })
    }
}

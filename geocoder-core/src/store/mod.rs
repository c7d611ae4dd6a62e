//! Data access for persisted postcodes.
//!
//! The [`PostcodeStore`] trait is the minimal query interface the
//! [`PostcodeService`](crate::PostcodeService) needs: point lookups,
//! set-membership lookups, single inserts, random sampling and counting.
//! Bulk population, import markers and compaction are specific to the SQLite
//! store and live on [`SqlitePostcodeStore`] directly.

#[cfg(feature = "store-sqlite")]
use camino::Utf8PathBuf;
use thiserror::Error;

use crate::{Coordinate, PostcodeRecord};

#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use schema::initialise_schema;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqlitePostcodeStore;

/// Query and mutation interface over a postcode table.
///
/// Keys are matched exactly; callers normalise before querying.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use geocoder_core::{Coordinate, PostcodeRecord, PostcodeStore, StoreError};
///
/// #[derive(Default)]
/// struct MapStore(BTreeMap<String, Coordinate>);
///
/// impl PostcodeStore for MapStore {
///     fn find(&self, postcode: &str) -> Result<Option<Coordinate>, StoreError> {
///         Ok(self.0.get(postcode).copied())
///     }
///
///     fn find_many(&self, postcodes: &[String]) -> Result<Vec<PostcodeRecord>, StoreError> {
///         Ok(postcodes
///             .iter()
///             .filter_map(|key| self.0.get(key).map(|c| PostcodeRecord::new(key.clone(), *c)))
///             .collect())
///     }
///
///     fn insert(&mut self, record: &PostcodeRecord) -> Result<(), StoreError> {
///         self.0.insert(record.postcode.clone(), record.coordinate);
///         Ok(())
///     }
///
///     fn random_postcode(&self) -> Result<Option<String>, StoreError> {
///         Ok(self.0.keys().next().cloned())
///     }
///
///     fn count(&self) -> Result<u64, StoreError> {
///         Ok(self.0.len() as u64)
///     }
/// }
///
/// let mut store = MapStore::default();
/// store
///     .insert(&PostcodeRecord::new("AB1 0AG", Coordinate::new(57.097085, -2.267513)))
///     .unwrap();
/// assert_eq!(store.count().unwrap(), 1);
/// ```
pub trait PostcodeStore {
    /// Look up the coordinate stored under `postcode`.
    fn find(&self, postcode: &str) -> Result<Option<Coordinate>, StoreError>;

    /// Return the records whose keys appear in `postcodes`.
    ///
    /// Unmatched keys are omitted. Result order follows the store.
    fn find_many(&self, postcodes: &[String]) -> Result<Vec<PostcodeRecord>, StoreError>;

    /// Insert a single record.
    ///
    /// Fails with [`StoreError::DuplicateKey`] when the key already exists.
    fn insert(&mut self, record: &PostcodeRecord) -> Result<(), StoreError>;

    /// Pick one stored postcode uniformly at random, or `None` when empty.
    fn random_postcode(&self) -> Result<Option<String>, StoreError>;

    /// Number of stored postcodes.
    fn count(&self) -> Result<u64, StoreError>;
}

/// Errors raised by [`PostcodeStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Location of the SQLite database on disk.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A schema creation step failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to execute schema step '{step}'")]
    Schema {
        /// Name of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A query or statement failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to {operation}")]
    Sqlite {
        /// Operation being attempted.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The key is already present.
    #[error("postcode {postcode} is already stored")]
    DuplicateKey {
        /// Conflicting key.
        postcode: String,
    },
    /// The store reported a row count that cannot be represented.
    #[error("store reported an invalid row count {count}")]
    InvalidCount {
        /// Raw count returned by the store.
        count: i64,
    },
}

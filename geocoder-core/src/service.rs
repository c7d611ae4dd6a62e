//! Lookup and validated-insert facade over a provisioned store.

use std::collections::HashMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

use crate::{Coordinate, Postcode, PostcodeRecord, PostcodeStore, StoreError};

#[cfg(feature = "store-sqlite")]
use crate::SqlitePostcodeStore;

/// Errors returned by [`PostcodeService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No store file exists at the resolved path.
    #[error("the database {path} does not exist; provision it first")]
    DatabaseDoesNotExist {
        /// Resolved store path.
        path: Utf8PathBuf,
    },
    /// The store path could not be inspected.
    #[error("failed to inspect database path {path}")]
    InspectDatabase {
        /// Resolved store path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The supplied postcode failed validation.
    #[error("invalid postcode {postcode:?}")]
    InvalidPostcode {
        /// Input as supplied by the caller.
        postcode: String,
    },
    /// The formatted postcode is already stored.
    #[error("postcode {postcode} is already in the database")]
    DuplicatePostcode {
        /// Formatted postcode that collided.
        postcode: String,
    },
    /// A random postcode was requested from an empty store.
    #[error("the database contains no postcodes")]
    EmptyStore,
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Point and batch lookups, validated inserts, sampling and counting.
///
/// Lookups match keys exactly as given; only [`PostcodeService::add`]
/// normalises its input.
#[derive(Debug)]
pub struct PostcodeService<S> {
    store: S,
}

#[cfg(feature = "store-sqlite")]
impl PostcodeService<SqlitePostcodeStore> {
    /// Open the provisioned store `directory/filename`.
    ///
    /// Never creates a store: a missing file yields
    /// [`ServiceError::DatabaseDoesNotExist`].
    pub fn open(directory: &Utf8Path, filename: &str) -> Result<Self, ServiceError> {
        let path = directory.join(filename);
        match geocoder_fs::file_is_file(&path) {
            Ok(true) => {}
            Ok(false) => return Err(ServiceError::DatabaseDoesNotExist { path }),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(ServiceError::DatabaseDoesNotExist { path });
            }
            Err(source) => return Err(ServiceError::InspectDatabase { path, source }),
        }
        let store = SqlitePostcodeStore::open(&path)?;
        debug!("opened postcode store at {path}");
        Ok(Self::new(store))
    }
}

impl<S: PostcodeStore> PostcodeService<S> {
    /// Wrap an existing store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consume the service, returning the store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Coordinate for `postcode`, or `None` when it is not stored.
    pub fn get(&self, postcode: &str) -> Result<Option<Coordinate>, ServiceError> {
        Ok(self.store.find(postcode)?)
    }

    /// Coordinates for every stored postcode among `postcodes`, keyed by postcode.
    ///
    /// Unmatched inputs are simply absent from the map.
    pub fn get_multiple<I>(&self, postcodes: I) -> Result<HashMap<String, Coordinate>, ServiceError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys: Vec<String> = postcodes
            .into_iter()
            .map(|postcode| postcode.as_ref().to_owned())
            .collect();
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let records = self.store.find_many(&keys)?;
        Ok(records
            .into_iter()
            .map(|record| (record.postcode, record.coordinate))
            .collect())
    }

    /// Validate, format and insert `postcode`.
    ///
    /// The store is untouched unless the call succeeds. Returns the service
    /// so inserts can be chained.
    ///
    /// # Examples
    /// ```
    /// use camino::Utf8PathBuf;
    /// use geocoder_core::{Coordinate, PostcodeService, SqlitePostcodeStore};
    ///
    /// let dir = tempfile::tempdir().expect("create temp dir");
    /// let path = Utf8PathBuf::from_path_buf(dir.path().join("postcodes.sqlite"))
    ///     .expect("utf-8 path");
    /// let mut service = PostcodeService::new(SqlitePostcodeStore::create(&path)?);
    /// service
    ///     .add("sw1A2aa", Coordinate::new(51.50354, -0.127695))?
    ///     .add("M1 1AE", Coordinate::new(53.480759, -2.242631))?;
    ///
    /// assert_eq!(service.get("SW1A 2AA")?, Some(Coordinate::new(51.50354, -0.127695)));
    /// assert_eq!(service.total_records()?, 2);
    /// # Ok::<(), geocoder_core::ServiceError>(())
    /// ```
    pub fn add(
        &mut self,
        postcode: &str,
        coordinate: Coordinate,
    ) -> Result<&mut Self, ServiceError> {
        let candidate = Postcode::new(postcode);
        if !candidate.is_valid() {
            return Err(ServiceError::InvalidPostcode {
                postcode: postcode.to_owned(),
            });
        }

        let formatted = candidate.formatted();
        if self.get(&formatted)?.is_some() {
            return Err(ServiceError::DuplicatePostcode {
                postcode: formatted,
            });
        }

        let record = PostcodeRecord::new(formatted, coordinate);
        match self.store.insert(&record) {
            Ok(()) => {}
            Err(StoreError::DuplicateKey { postcode: existing }) => {
                return Err(ServiceError::DuplicatePostcode { postcode: existing });
            }
            Err(err) => return Err(err.into()),
        }
        debug!("added postcode {}", record.postcode);
        Ok(self)
    }

    /// One stored postcode chosen at random.
    pub fn random(&self) -> Result<String, ServiceError> {
        self.store
            .random_postcode()?
            .ok_or(ServiceError::EmptyStore)
    }

    /// Number of stored postcodes.
    pub fn total_records(&self) -> Result<u64, ServiceError> {
        Ok(self.store.count()?)
    }
}

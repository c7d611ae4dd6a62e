//! Batched import of a postcode dataset into a SQLite store.
#![forbid(unsafe_code)]

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use geocoder_core::{DEFAULT_DATABASE_FILENAME, SqlitePostcodeStore, StoreError};
use geocoder_fs::PathKind;
use log::{debug, info};
use thiserror::Error;

use crate::source::{CsvRecordSource, SourceColumns, SourceError, count_data_rows};

mod progress;

pub use progress::{LogProgress, ProvisionProgress, ProvisionReport};

/// Number of source rows read and inserted per batch unless overridden.
pub const DEFAULT_PER_PAGE: usize = 2500;

/// Errors raised while preparing the store directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The path exists but is not a directory.
    #[error("the path {path} is not a directory")]
    NotADirectory {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The directory exists but does not accept writes.
    #[error("the directory {path} is not writable")]
    NotWritable {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The directory could not be inspected.
    #[error("failed to inspect {path}")]
    Inspect {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The directory could not be created.
    #[error("failed to create the database directory {path}")]
    Create {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The store file or its schema could not be created inside the directory.
    #[error("failed to create the database {path}")]
    CreateStore {
        /// Store file path.
        path: Utf8PathBuf,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
}

/// Errors raised by [`Provisioner::run`].
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The store directory or file could not be prepared.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// Reading the source dataset failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Writing to the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Builds a populated, compacted postcode store from a CSV dataset.
///
/// Memory use is bounded by the batch size rather than the dataset size.
/// Re-running against an existing store is additive: postcodes already
/// present are skipped and another import marker is appended.
///
/// # Examples
/// ```no_run
/// use geocoder_data::provision::Provisioner;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = Provisioner::new("/var/lib/postcodes", "ONSPD_AUG_2018_UK.csv")?
///     .with_per_page(5000)
///     .run()?;
/// println!("inserted {} postcodes", report.inserted);
/// # Ok(())
/// # }
/// ```
pub struct Provisioner {
    database_dir: Utf8PathBuf,
    source_path: Utf8PathBuf,
    database_filename: String,
    per_page: usize,
    columns: SourceColumns,
    progress: Option<Box<dyn ProvisionProgress>>,
}

impl fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provisioner")
            .field("database_dir", &self.database_dir)
            .field("source_path", &self.source_path)
            .field("database_filename", &self.database_filename)
            .field("per_page", &self.per_page)
            .field("columns", &self.columns)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Provisioner {
    /// Prepare a provisioner writing into `database_dir`.
    ///
    /// A missing directory is created with its parents. An existing path
    /// must be a directory the current process can create files in.
    pub fn new(
        database_dir: impl Into<Utf8PathBuf>,
        source_path: impl Into<Utf8PathBuf>,
    ) -> Result<Self, DirectoryError> {
        let database_dir = database_dir.into();
        prepare_directory(&database_dir)?;
        Ok(Self {
            database_dir,
            source_path: source_path.into(),
            database_filename: DEFAULT_DATABASE_FILENAME.to_owned(),
            per_page: DEFAULT_PER_PAGE,
            columns: SourceColumns::default(),
            progress: None,
        })
    }

    /// Use `filename` for the store instead of the default.
    #[must_use]
    pub fn with_database_filename(mut self, filename: impl Into<String>) -> Self {
        self.database_filename = filename.into();
        self
    }

    /// Set the batch size. Values below one are clamped to one.
    #[must_use]
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.set_per_page(per_page);
        self
    }

    /// Set the batch size in place. Values below one are clamped to one.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
    }

    /// Map different header names onto postcode, latitude and longitude.
    #[must_use]
    pub fn with_columns(mut self, columns: SourceColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Report progress to `progress` while running.
    #[must_use]
    pub fn with_progress(mut self, progress: impl ProvisionProgress + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Current batch size.
    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Full path of the store file.
    #[must_use]
    pub fn database_path(&self) -> Utf8PathBuf {
        self.database_dir.join(&self.database_filename)
    }

    /// Number of data rows in the source dataset (header excluded).
    pub fn row_count(&self) -> Result<u64, ProvisionError> {
        Ok(count_data_rows(&self.source_path)?)
    }

    /// Create the store if needed, import every source row in batches,
    /// record the import, and compact the file.
    pub fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        let database_path = self.database_path();
        let mut store = open_store(&database_path)?;

        let total_rows = self.row_count()?;
        info!("importing {total_rows} postcodes from {}", self.source_path);
        self.notify(|progress| progress.started(total_rows));

        let mut source = CsvRecordSource::open(&self.source_path, self.columns.clone())?;
        let per_page = u64::try_from(self.per_page).unwrap_or(u64::MAX);
        let mut remaining = total_rows;
        let mut offset = 0;
        let mut read = 0;
        let mut inserted = 0;
        let mut batches = 0;

        while remaining > 0 {
            let limit = remaining.min(per_page);
            let records = source.page(offset, usize::try_from(limit).unwrap_or(self.per_page))?;
            if records.is_empty() {
                break;
            }
            read += records.len() as u64;
            inserted += store.insert_batch(&records)? as u64;
            batches += 1;
            remaining -= limit;
            offset += limit;
            debug!("batch {batches}: {} of {total_rows} rows processed", total_rows - remaining);
            self.notify(|progress| progress.batch_inserted(total_rows - remaining, total_rows));
        }
        info!("finished inserting {inserted} postcodes ({} already present)", read - inserted);

        store.record_import(self.source_filename())?;

        self.notify(|progress| progress.compacting());
        store.compact()?;

        let report = ProvisionReport {
            database_path,
            total_rows,
            inserted,
            skipped: read - inserted,
            batches,
        };
        self.notify(|progress| progress.finished(&report));
        Ok(report)
    }

    fn source_filename(&self) -> &str {
        self.source_path
            .file_name()
            .unwrap_or_else(|| self.source_path.as_str())
    }

    fn notify(&self, event: impl FnOnce(&dyn ProvisionProgress)) {
        if let Some(progress) = self.progress.as_deref() {
            event(progress);
        }
    }
}

fn prepare_directory(path: &Utf8Path) -> Result<(), DirectoryError> {
    let inspect_error = |source| DirectoryError::Inspect {
        path: path.to_path_buf(),
        source,
    };
    match geocoder_fs::path_kind(path).map_err(inspect_error)? {
        Some(PathKind::Directory) => {
            if geocoder_fs::dir_is_writable(path).map_err(inspect_error)? {
                Ok(())
            } else {
                Err(DirectoryError::NotWritable {
                    path: path.to_path_buf(),
                })
            }
        }
        Some(PathKind::File | PathKind::Other) => Err(DirectoryError::NotADirectory {
            path: path.to_path_buf(),
        }),
        None => {
            debug!("creating database directory {path}");
            geocoder_fs::create_dir_all(path).map_err(|source| DirectoryError::Create {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn open_store(path: &Utf8Path) -> Result<SqlitePostcodeStore, DirectoryError> {
    SqlitePostcodeStore::create(path).map_err(|source| DirectoryError::CreateStore {
        path: path.to_path_buf(),
        source,
    })
}

//! Provisioning of the postcode store from bulk reference datasets.
//!
//! Responsibilities:
//! - Stream delimited datasets in bounded pages ([`source`]).
//! - Batch rows into the SQLite store, record the import, and compact the
//!   file ([`provision`]).
//!
//! Boundaries:
//! - Lookup and validated single inserts live in `geocoder-core`.
//! - Progress rendering is injected through [`ProvisionProgress`]; the crate
//!   itself only logs through the `log` facade.

#![forbid(unsafe_code)]

pub mod provision;
pub mod source;

pub use provision::{
    DEFAULT_PER_PAGE, DirectoryError, LogProgress, ProvisionError, ProvisionProgress,
    ProvisionReport, Provisioner,
};
pub use source::{CsvRecordSource, SourceColumns, SourceError, count_data_rows};

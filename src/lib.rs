//! Facade crate for the postcode geocoder.
//!
//! This crate re-exports the lookup service and value types, and exposes the
//! SQLite store and dataset provisioner behind feature flags.

#![forbid(unsafe_code)]

pub use geocoder_core::{
    Coordinate, DEFAULT_DATABASE_FILENAME, ImportMarker, Postcode, PostcodeRecord,
    PostcodeService, PostcodeStore, ServiceError, StoreError,
};

#[cfg(feature = "store-sqlite")]
pub use geocoder_core::SqlitePostcodeStore;

#[cfg(feature = "provision")]
pub use geocoder_data::{
    DirectoryError, LogProgress, ProvisionError, ProvisionProgress, ProvisionReport, Provisioner,
    SourceColumns, SourceError,
};

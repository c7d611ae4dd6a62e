//! Core domain types for the postcode geocoder.
//!
//! The crate owns the coordinate value type, UK postcode validation and
//! formatting, the [`PostcodeStore`] abstraction with its SQLite
//! implementation, and the [`PostcodeService`] facade that answers lookups
//! and validated inserts.

#![forbid(unsafe_code)]

mod coordinate;
mod postcode;
mod record;
mod service;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use coordinate::Coordinate;
pub use postcode::Postcode;
pub use record::{ImportMarker, PostcodeRecord};
pub use service::{PostcodeService, ServiceError};
pub use store::{PostcodeStore, StoreError};

#[cfg(feature = "store-sqlite")]
pub use store::SqlitePostcodeStore;

/// File name used for the store when callers do not supply one.
pub const DEFAULT_DATABASE_FILENAME: &str = "postcodes.sqlite";

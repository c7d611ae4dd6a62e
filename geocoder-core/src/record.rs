use crate::Coordinate;

/// A postcode row as persisted in the store.
///
/// `postcode` holds the canonical formatted key.
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeRecord {
    /// Formatted postcode, unique within the store.
    pub postcode: String,
    /// Location of the postcode centroid.
    pub coordinate: Coordinate,
}

impl PostcodeRecord {
    /// Construct a record from a postcode key and its coordinate.
    #[must_use]
    pub fn new(postcode: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            postcode: postcode.into(),
            coordinate,
        }
    }
}

/// A completed import run, appended once per provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMarker {
    /// Base name of the source dataset.
    pub filename: String,
    /// SQLite `datetime('now')` timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub imported_at: String,
}

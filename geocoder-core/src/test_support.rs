//! Test-only, in-memory `PostcodeStore` implementation used by unit and
//! behaviour tests.

use std::collections::BTreeMap;

use crate::{Coordinate, PostcodeRecord, PostcodeStore, StoreError};

/// In-memory `PostcodeStore` keyed by postcode.
///
/// `random_postcode` is deterministic: it returns the smallest key.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    postcodes: BTreeMap<String, Coordinate>,
}

impl MemoryStore {
    /// Create a store from a collection of records. Later duplicates win.
    #[must_use]
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PostcodeRecord>,
    {
        Self {
            postcodes: records
                .into_iter()
                .map(|record| (record.postcode, record.coordinate))
                .collect(),
        }
    }
}

impl PostcodeStore for MemoryStore {
    fn find(&self, postcode: &str) -> Result<Option<Coordinate>, StoreError> {
        Ok(self.postcodes.get(postcode).copied())
    }

    fn find_many(&self, postcodes: &[String]) -> Result<Vec<PostcodeRecord>, StoreError> {
        Ok(self
            .postcodes
            .iter()
            .filter(|(key, _)| postcodes.contains(key))
            .map(|(key, coordinate)| PostcodeRecord::new(key.clone(), *coordinate))
            .collect())
    }

    fn insert(&mut self, record: &PostcodeRecord) -> Result<(), StoreError> {
        if self.postcodes.contains_key(&record.postcode) {
            return Err(StoreError::DuplicateKey {
                postcode: record.postcode.clone(),
            });
        }
        self.postcodes
            .insert(record.postcode.clone(), record.coordinate);
        Ok(())
    }

    fn random_postcode(&self) -> Result<Option<String>, StoreError> {
        Ok(self.postcodes.keys().next().cloned())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.postcodes.len() as u64)
    }
}

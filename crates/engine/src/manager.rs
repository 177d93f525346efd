//! Index manager: one record store, one ordered index per key projection.

use crate::error::{EngineError, Result};
use hashbrown::HashMap;
use tickdex_core::key::{self, Key};
use tickdex_core::{KeyProjection, Record, RecordId, RecordStore};
use tickdex_index::{Layout, OrderedIndex, TreeStats};
use tracing::{info, warn};

/// Owns the record store and the `timestamp`, `price` and `name` indexes.
///
/// Built once from the ingested records and read-only afterwards.
pub struct IndexManager {
    store: RecordStore,
    layout: Layout,
    indexes: HashMap<KeyProjection, Box<dyn OrderedIndex<Key, RecordId>>>,
    invalid_timestamps: usize,
}

impl IndexManager {
    /// Creates a manager with empty indexes of the given layout.
    pub fn new(layout: Layout) -> Self {
        let indexes = KeyProjection::ALL
            .iter()
            .map(|&projection| (projection, layout.empty_index()))
            .collect();

        Self {
            store: RecordStore::new(),
            layout,
            indexes,
            invalid_timestamps: 0,
        }
    }

    /// Builds every index over `records`, in iteration order.
    pub fn build<I>(layout: Layout, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut manager = Self::new(layout);
        for record in records {
            manager.insert(record);
        }

        if manager.invalid_timestamps > 0 {
            warn!(
                count = manager.invalid_timestamps,
                "records with unparseable timestamps indexed under key {}",
                key::INVALID_TIMESTAMP_KEY
            );
        }
        info!(
            records = manager.store.len(),
            structure = layout.name(),
            "indexes built"
        );
        manager
    }

    /// Stores a record and feeds it into every index.
    pub fn insert(&mut self, record: Record) -> RecordId {
        if key::parse_timestamp(&record.timestamp)
            .and_then(key::epoch_to_key)
            .is_err()
        {
            self.invalid_timestamps += 1;
        }

        let keys = KeyProjection::ALL.map(|projection| (projection, projection.project(&record)));
        let id = self.store.push(record);
        for (projection, key) in keys {
            if let Some(index) = self.indexes.get_mut(&projection) {
                index.insert(key, id);
            }
        }
        id
    }

    /// Returns the record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Returns the layout backing the indexes.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the index for a projection.
    pub fn index(&self, projection: KeyProjection) -> Result<&dyn OrderedIndex<Key, RecordId>> {
        self.indexes
            .get(&projection)
            .map(|index| &**index)
            .ok_or(EngineError::IndexNotFound(projection.index_name()))
    }

    /// Returns shape statistics of one index.
    pub fn stats(&self, projection: KeyProjection) -> Result<TreeStats> {
        Ok(self.index(projection)?.stats())
    }

    /// Number of records whose timestamp failed to parse.
    pub fn invalid_timestamps(&self) -> usize {
        self.invalid_timestamps
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no record has been stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Projects every stored record onto `projection`, in ingestion order.
    pub fn keys(&self, projection: KeyProjection) -> Vec<(Key, RecordId)> {
        self.store
            .iter()
            .map(|(id, record)| (projection.project(record), id))
            .collect()
    }
}

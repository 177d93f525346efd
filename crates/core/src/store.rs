//! Append-only record storage.

use crate::record::{Record, RecordId};

/// Owns every ingested record.
///
/// Records are only ever appended; the `RecordId` returned by `push` stays
/// valid for the lifetime of the store.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Creates an empty store with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Appends a record and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if the store already holds `RecordId::MAX` records.
    pub fn push(&mut self, record: Record) -> RecordId {
        let id = RecordId::try_from(self.records.len())
            .unwrap_or_else(|_| panic!("record store exceeded {} records", RecordId::MAX));
        self.records.push(record);
        id
    }

    /// Appends every record from `records`.
    pub fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    /// Returns the record behind `id`.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id as usize)
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over `(id, record)` pairs in ingestion order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (i as RecordId, record))
    }

    /// Resolves a list of handles, skipping any that are out of range.
    pub fn resolve(&self, ids: Vec<RecordId>) -> impl Iterator<Item = &Record> + '_ {
        ids.into_iter().filter_map(move |id| self.get(id))
    }
}

use super::RecordStoreProvider;
use crate::collection::{Document, NitriteId};
use crate::common::RecordIterator;
use crate::errors::NitriteResult;
use crossbeam_skiplist::SkipMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

/// In-memory record store backed by a concurrent skip list.
///
/// # Characteristics
/// - **Thread-Safe**: Can be safely cloned and shared across threads
/// - **Ordered**: Records iterate in id order
/// - **Live iteration**: An iterator re-seeks past the last id it returned,
///   so it never holds a borrow on the map and sees concurrent writes
///   ahead of its position
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    inner: Arc<SkipMap<NitriteId, Document>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStoreProvider for InMemoryRecordStore {
    fn get(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>> {
        Ok(self.inner.get(nitrite_id).map(|entry| entry.value().clone()))
    }

    fn put(&self, nitrite_id: NitriteId, document: Document) -> NitriteResult<Option<Document>> {
        let previous = self.inner.get(&nitrite_id).map(|entry| entry.value().clone());
        self.inner.insert(nitrite_id, document);
        Ok(previous)
    }

    fn remove(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>> {
        Ok(self.inner.remove(nitrite_id).map(|entry| entry.value().clone()))
    }

    fn contains(&self, nitrite_id: &NitriteId) -> NitriteResult<bool> {
        Ok(self.inner.contains_key(nitrite_id))
    }

    fn entries(&self) -> NitriteResult<RecordIterator> {
        Ok(Box::new(SkipMapEntries {
            map: self.inner.clone(),
            last: None,
        }))
    }

    fn size(&self) -> NitriteResult<u64> {
        Ok(self.inner.len() as u64)
    }

    fn clear(&self) -> NitriteResult<()> {
        self.inner.clear();
        Ok(())
    }
}

struct SkipMapEntries {
    map: Arc<SkipMap<NitriteId, Document>>,
    last: Option<NitriteId>,
}

impl Iterator for SkipMapEntries {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match &self.last {
            None => self.map.front(),
            Some(last) => self.map.range((Excluded(last), Unbounded)).next(),
        }?;

        let nitrite_id = *entry.key();
        self.last = Some(nitrite_id);
        Some(Ok((nitrite_id, entry.value().clone())))
    }
}

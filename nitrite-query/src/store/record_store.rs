use crate::collection::{Document, NitriteId};
use crate::common::RecordIterator;
use crate::errors::NitriteResult;
use std::ops::Deref;
use std::sync::Arc;

/// Contract of a record store: documents keyed by [NitriteId].
///
/// # Responsibilities
/// - Keep records ordered by id
/// - Return `None` rather than an error for an absent id
/// - Produce a lazy iterator over all records in id order
pub trait RecordStoreProvider: Send + Sync {
    /// Retrieves the record with the given id.
    fn get(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>>;

    /// Stores a record, returning the one it replaces.
    fn put(&self, nitrite_id: NitriteId, document: Document) -> NitriteResult<Option<Document>>;

    /// Removes a record, returning it if it existed.
    fn remove(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>>;

    fn contains(&self, nitrite_id: &NitriteId) -> NitriteResult<bool> {
        Ok(self.get(nitrite_id)?.is_some())
    }

    /// Iterates all records in id order.
    ///
    /// The iterator reads the store as it advances, so it observes records
    /// written behind its position.
    fn entries(&self) -> NitriteResult<RecordIterator>;

    /// Returns the number of records.
    fn size(&self) -> NitriteResult<u64>;

    /// Removes all records.
    fn clear(&self) -> NitriteResult<()>;
}

/// Shared handle to a record store implementation.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<dyn RecordStoreProvider>,
}

impl RecordStore {
    pub fn new<T: RecordStoreProvider + 'static>(inner: T) -> Self {
        RecordStore { inner: Arc::new(inner) }
    }
}

impl Deref for RecordStore {
    type Target = Arc<dyn RecordStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

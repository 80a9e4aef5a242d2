use super::{index_operations::IndexOperations, read_operations::ReadOperations, WriteResult};
use crate::{
    collection::{Document, FindOptions, NitriteId},
    common::{current_timestamp_millis, Value, DOC_ID, DOC_MODIFIED, DOC_REVISION, DOC_SOURCE},
    errors::{ErrorKind, NitriteError, NitriteResult},
    filter::Filter,
    store::RecordStore,
};
use std::sync::Arc;

/// Inserts, updates and removes records, keeping the indexes in step.
///
/// Each record is written to the indexes first and to the store second; if
/// the store write fails the index entries are taken back.
#[derive(Clone)]
pub(crate) struct WriteOperations {
    inner: Arc<WriteOperationsInner>,
}

struct WriteOperationsInner {
    record_store: RecordStore,
    index_operations: IndexOperations,
    read_operations: ReadOperations,
}

impl WriteOperations {
    pub fn new(
        record_store: RecordStore,
        index_operations: IndexOperations,
        read_operations: ReadOperations,
    ) -> Self {
        WriteOperations {
            inner: Arc::new(WriteOperationsInner {
                record_store,
                index_operations,
                read_operations,
            }),
        }
    }

    /// Inserts the documents in order.
    ///
    /// Each document gets an id if it has none, revision `1` and the current
    /// time as its modification stamp; a `_source` marker is cleared.
    /// Documents inserted before a failing one stay inserted.
    ///
    /// # Errors
    /// * `UniqueConstraintViolation` if a record with the same id exists or a
    ///   unique index already holds the indexed values.
    /// * `IndexingError` if a value cannot be indexed.
    pub fn insert(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        let mut nitrite_ids = Vec::with_capacity(documents.len());
        for document in documents {
            nitrite_ids.push(self.insert_one(document)?);
        }
        log::debug!("Inserted {} document(s)", nitrite_ids.len());
        Ok(WriteResult::new(nitrite_ids))
    }

    fn insert_one(&self, document: Document) -> NitriteResult<NitriteId> {
        let inner = &self.inner;
        let mut document = document;
        let nitrite_id = document.id()?;

        if inner.record_store.contains(&nitrite_id)? {
            log::error!("Another document already exists with id {}", nitrite_id);
            return Err(NitriteError::new(
                &format!("Document with id {} already exists", nitrite_id),
                ErrorKind::UniqueConstraintViolation,
            ));
        }

        document.remove(DOC_SOURCE)?;
        document.put_reserved(DOC_REVISION, Value::I32(1));
        document.put_reserved(DOC_MODIFIED, Value::I64(current_timestamp_millis()));

        inner.index_operations.write_index_entries(nitrite_id, &document)?;
        if let Err(err) = inner.record_store.put(nitrite_id, document.clone()) {
            if let Err(rollback_err) = inner.index_operations.remove_index_entries(nitrite_id, &document) {
                log::error!("Failed to roll back index entries of {}: {}", nitrite_id, rollback_err);
            }
            return Err(err);
        }
        Ok(nitrite_id)
    }

    /// Merges `update` into every record matching `filter`.
    ///
    /// `_id`, `_revision` and `_source` of `update` are ignored. Each updated
    /// record gets its revision bumped and a new modification stamp. An
    /// update with nothing left to merge touches no record.
    ///
    /// # Errors
    /// Stops at the first record whose new values violate an index; records
    /// updated before it keep their new values.
    pub fn update(&self, filter: &Filter, update: &Document) -> NitriteResult<WriteResult> {
        let inner = &self.inner;
        let mut changes = update.clone();
        changes.remove(DOC_ID)?;
        changes.remove(DOC_REVISION)?;
        changes.remove(DOC_SOURCE)?;
        if changes.is_empty() {
            log::debug!("Nothing to update for filter {}", filter);
            return Ok(WriteResult::default());
        }

        let matches = self.matching_records(filter)?;
        let mut nitrite_ids = Vec::with_capacity(matches.len());
        for (nitrite_id, old_document) in matches {
            let mut new_document = old_document.clone();
            new_document.merge(&changes)?;
            let revision = old_document.revision()?;
            new_document.put_reserved(DOC_REVISION, Value::I32(revision + 1));
            new_document.put_reserved(DOC_MODIFIED, Value::I64(current_timestamp_millis()));

            inner
                .index_operations
                .update_index_entries(nitrite_id, &old_document, &new_document)?;
            inner.record_store.put(nitrite_id, new_document)?;
            nitrite_ids.push(nitrite_id);
        }

        log::debug!("Updated {} document(s) for filter {}", nitrite_ids.len(), filter);
        Ok(WriteResult::new(nitrite_ids))
    }

    /// Removes every record matching `filter` along with its index entries.
    pub fn remove(&self, filter: &Filter) -> NitriteResult<WriteResult> {
        let inner = &self.inner;
        let matches = self.matching_records(filter)?;
        let mut nitrite_ids = Vec::with_capacity(matches.len());
        for (nitrite_id, document) in matches {
            inner.index_operations.remove_index_entries(nitrite_id, &document)?;
            inner.record_store.remove(&nitrite_id)?;
            nitrite_ids.push(nitrite_id);
        }

        log::debug!("Removed {} document(s) for filter {}", nitrite_ids.len(), filter);
        Ok(WriteResult::new(nitrite_ids))
    }

    /// Removes every record and empties the indexes.
    pub fn clear(&self) -> NitriteResult<()> {
        self.inner.record_store.clear()?;
        self.inner.index_operations.clear()
    }

    // collected up front so writes never race the cursor reading the store
    fn matching_records(&self, filter: &Filter) -> NitriteResult<Vec<(NitriteId, Document)>> {
        let cursor = self.inner.read_operations.find(filter, &FindOptions::new())?;
        cursor.iter_with_id().collect()
    }
}

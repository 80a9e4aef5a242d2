use super::find_optimizer::FindOptimizer;
use crate::{
    collection::{Document, NitriteId},
    common::{FieldValues, Fields},
    errors::{ErrorKind, NitriteError, NitriteResult},
    index::{ComparableIndex, IndexCatalog, IndexDescriptor, NitriteIndex, TextIndex},
    store::RecordStore,
};
use dashmap::DashMap;
use std::sync::Arc;

/// Index lifecycle and index maintenance for a collection.
///
/// Every registered index receives the entries of every written document,
/// including an index that is being rebuilt. A document write touches all
/// indexes or none: a failure on one index rolls back the entries already
/// written to the others.
#[derive(Clone)]
pub(crate) struct IndexOperations {
    inner: Arc<IndexOperationsInner>,
}

struct IndexOperationsInner {
    collection_name: String,
    record_store: RecordStore,
    catalog: IndexCatalog,
    indexes: DashMap<Fields, NitriteIndex>,
    find_optimizer: FindOptimizer,
}

impl IndexOperations {
    pub fn new(collection_name: &str, record_store: RecordStore, find_optimizer: FindOptimizer) -> Self {
        IndexOperations {
            inner: Arc::new(IndexOperationsInner {
                collection_name: collection_name.to_string(),
                record_store,
                catalog: IndexCatalog::new(),
                indexes: DashMap::new(),
                find_optimizer,
            }),
        }
    }

    pub fn catalog(&self) -> &IndexCatalog {
        &self.inner.catalog
    }

    /// Registers an index on `fields` and fills it from the stored records.
    ///
    /// # Errors
    /// * `IndexingError` for an unknown type or a compound full-text index.
    /// * `IndexAlreadyExists` if an index on the fields exists.
    /// * Any error raised while indexing the existing records, such as
    ///   `UniqueConstraintViolation`. The index is not kept in that case.
    pub fn create_index(&self, fields: &Fields, index_type: &str) -> NitriteResult<()> {
        let inner = &self.inner;
        let descriptor = IndexDescriptor::new(index_type, fields.clone(), &inner.collection_name);
        descriptor.validate()?;
        inner.catalog.register(descriptor.clone())?;

        let index = new_index(&descriptor);
        inner.indexes.insert(fields.clone(), index.clone());

        if let Err(err) = self.build_index(&descriptor, &index) {
            inner.indexes.remove(fields);
            if let Err(remove_err) = inner.catalog.remove(fields) {
                log::warn!("Failed to unregister index {}: {}", descriptor, remove_err);
            }
            return Err(err);
        }

        inner.find_optimizer.invalidate_cache();
        log::debug!("Created index {}", descriptor);
        Ok(())
    }

    /// Clears the index on `fields` and fills it again from the stored records.
    ///
    /// # Errors
    /// * `IndexNotFound` if there is no index on the fields.
    /// * `IndexingInProgress` if the index is already being rebuilt.
    pub fn rebuild_index(&self, fields: &Fields) -> NitriteResult<()> {
        let inner = &self.inner;
        let descriptor = inner.catalog.find(fields).ok_or_else(|| index_not_found(fields))?;
        let index = self.index_on(fields).ok_or_else(|| index_not_found(fields))?;

        self.build_index(&descriptor, &index)?;
        inner.find_optimizer.invalidate_cache();
        log::debug!("Rebuilt index {}", descriptor);
        Ok(())
    }

    /// Unregisters the index on `fields` and discards its entries.
    ///
    /// # Errors
    /// * `IndexNotFound` if there is no index on the fields.
    /// * `IndexingInProgress` if the index is being rebuilt.
    pub fn drop_index(&self, fields: &Fields) -> NitriteResult<()> {
        let inner = &self.inner;
        let descriptor = inner.catalog.remove(fields)?;
        if let Some((_, index)) = inner.indexes.remove(fields) {
            index.drop_index()?;
        }

        inner.find_optimizer.invalidate_cache();
        log::debug!("Dropped index {}", descriptor);
        Ok(())
    }

    pub fn has_index(&self, fields: &Fields) -> bool {
        self.inner.catalog.has_index(fields)
    }

    pub fn is_indexing(&self, fields: &Fields) -> bool {
        self.inner.catalog.is_building(fields)
    }

    pub fn list_indexes(&self) -> Vec<IndexDescriptor> {
        self.inner.catalog.list()
    }

    /// The index a plan refers to.
    ///
    /// # Errors
    /// `IndexNotFound` if the index was dropped after the plan was made.
    pub fn find_index(&self, descriptor: &IndexDescriptor) -> NitriteResult<NitriteIndex> {
        let fields = descriptor.index_fields();
        self.index_on(&fields).ok_or_else(|| index_not_found(&fields))
    }

    /// Adds the entries of a document to every index.
    pub fn write_index_entries(&self, nitrite_id: NitriteId, document: &Document) -> NitriteResult<()> {
        let mut written: Vec<(NitriteIndex, FieldValues)> = Vec::new();
        for (fields, index) in self.all_indexes() {
            let result = FieldValues::from_document(document, nitrite_id, &fields)
                .and_then(|field_values| index.write(&field_values).map(|_| field_values));

            match result {
                Ok(field_values) => written.push((index, field_values)),
                Err(err) => {
                    for (index, field_values) in written {
                        if let Err(rollback_err) = index.remove(&field_values) {
                            log::error!("Failed to roll back index entry of {}: {}", nitrite_id, rollback_err);
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Removes the entries of a document from every index.
    pub fn remove_index_entries(&self, nitrite_id: NitriteId, document: &Document) -> NitriteResult<()> {
        for (fields, index) in self.all_indexes() {
            let field_values = FieldValues::from_document(document, nitrite_id, &fields)?;
            index.remove(&field_values)?;
        }
        Ok(())
    }

    /// Replaces the entries of `old` by the entries of `new`. On failure the
    /// entries of `old` are restored.
    pub fn update_index_entries(&self, nitrite_id: NitriteId, old: &Document, new: &Document) -> NitriteResult<()> {
        self.remove_index_entries(nitrite_id, old)?;
        if let Err(err) = self.write_index_entries(nitrite_id, new) {
            if let Err(restore_err) = self.write_index_entries(nitrite_id, old) {
                log::error!("Failed to restore index entries of {}: {}", nitrite_id, restore_err);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Empties every index, keeping them registered.
    pub fn clear(&self) -> NitriteResult<()> {
        for (_, index) in self.all_indexes() {
            index.drop_index()?;
        }
        Ok(())
    }

    fn build_index(&self, descriptor: &IndexDescriptor, index: &NitriteIndex) -> NitriteResult<()> {
        let fields = descriptor.index_fields();
        self.inner.catalog.begin_build(&fields)?;
        let result = self.populate(&fields, index);
        self.inner.catalog.end_build(&fields);

        if let Err(err) = &result {
            log::error!("Failed to build index {}: {}", descriptor, err);
        }
        result
    }

    fn populate(&self, fields: &Fields, index: &NitriteIndex) -> NitriteResult<()> {
        index.drop_index()?;
        for record in self.inner.record_store.entries()? {
            let (nitrite_id, document) = record?;
            let field_values = FieldValues::from_document(&document, nitrite_id, fields)?;
            index.write(&field_values)?;
        }
        Ok(())
    }

    fn index_on(&self, fields: &Fields) -> Option<NitriteIndex> {
        self.inner.indexes.get(fields).map(|entry| entry.value().clone())
    }

    // in registration order, so rollbacks are deterministic
    fn all_indexes(&self) -> Vec<(Fields, NitriteIndex)> {
        self.inner
            .catalog
            .list()
            .into_iter()
            .filter_map(|descriptor| {
                let fields = descriptor.index_fields();
                self.index_on(&fields).map(|index| (fields, index))
            })
            .collect()
    }
}

fn new_index(descriptor: &IndexDescriptor) -> NitriteIndex {
    if descriptor.is_full_text() {
        NitriteIndex::new(TextIndex::new(descriptor.clone()))
    } else {
        NitriteIndex::new(ComparableIndex::new(descriptor.clone()))
    }
}

fn index_not_found(fields: &Fields) -> NitriteError {
    log::error!("No index found on fields {}", fields);
    NitriteError::new(
        &format!("No index found on fields {}", fields),
        ErrorKind::IndexNotFound,
    )
}

use super::{
    find_optimizer::FindOptimizer, index_operations::IndexOperations, read_operations::ReadOperations,
    write_operations::WriteOperations, write_result::WriteResult,
};
use crate::{
    collection::{Document, FindOptions, NitriteId},
    common::{DocumentCursor, Fields},
    errors::NitriteResult,
    filter::Filter,
    index::IndexDescriptor,
    nitrite_config::NitriteConfig,
    store::RecordStore,
};

/// Wires the planner, index, read and write operations of one collection
/// around its record store.
pub(crate) struct CollectionOperations {
    record_store: RecordStore,
    index_operations: IndexOperations,
    write_operations: WriteOperations,
    read_operations: ReadOperations,
}

impl CollectionOperations {
    pub fn new(collection_name: &str, record_store: RecordStore, nitrite_config: &NitriteConfig) -> Self {
        let find_optimizer = FindOptimizer::new(
            nitrite_config.plan_cache_size(),
            nitrite_config.default_null_order(),
        );

        let index_operations = IndexOperations::new(collection_name, record_store.clone(), find_optimizer.clone());
        let read_operations = ReadOperations::new(record_store.clone(), index_operations.clone(), find_optimizer);
        let write_operations = WriteOperations::new(
            record_store.clone(),
            index_operations.clone(),
            read_operations.clone(),
        );

        Self {
            record_store,
            index_operations,
            write_operations,
            read_operations,
        }
    }

    pub fn create_index(&self, fields: &Fields, index_type: &str) -> NitriteResult<()> {
        self.index_operations.create_index(fields, index_type)
    }

    pub fn rebuild_index(&self, fields: &Fields) -> NitriteResult<()> {
        self.index_operations.rebuild_index(fields)
    }

    pub fn drop_index(&self, fields: &Fields) -> NitriteResult<()> {
        self.index_operations.drop_index(fields)
    }

    pub fn list_indexes(&self) -> Vec<IndexDescriptor> {
        self.index_operations.list_indexes()
    }

    pub fn has_index(&self, fields: &Fields) -> bool {
        self.index_operations.has_index(fields)
    }

    pub fn is_indexing(&self, fields: &Fields) -> bool {
        self.index_operations.is_indexing(fields)
    }

    pub fn insert(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        self.write_operations.insert(documents)
    }

    pub fn update(&self, filter: &Filter, update: &Document) -> NitriteResult<WriteResult> {
        self.write_operations.update(filter, update)
    }

    pub fn remove(&self, filter: &Filter) -> NitriteResult<WriteResult> {
        self.write_operations.remove(filter)
    }

    pub fn clear(&self) -> NitriteResult<()> {
        self.write_operations.clear()
    }

    pub fn find(&self, filter: &Filter, find_options: &FindOptions) -> NitriteResult<DocumentCursor> {
        self.read_operations.find(filter, find_options)
    }

    pub fn get_by_id(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>> {
        self.read_operations.get_by_id(nitrite_id)
    }

    pub fn size(&self) -> NitriteResult<u64> {
        self.record_store.size()
    }
}

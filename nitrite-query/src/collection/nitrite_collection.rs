use super::{operation::CollectionOperations, operation::WriteResult, Document, FindOptions, NitriteId};
use crate::{
    common::{DocumentCursor, Fields},
    errors::NitriteResult,
    filter::{all, Filter},
    index::{IndexDescriptor, IndexOptions},
    nitrite_config::NitriteConfig,
    store::{InMemoryRecordStore, RecordStore},
};
use parking_lot::RwLock;
use std::sync::Arc;

/// A named set of documents with indexes and queries.
///
/// Documents are identified by their `_id` field. Writes and index changes
/// are serialized by a collection-wide lock; reads plan under a shared lock
/// and return a lazy [DocumentCursor] that reads the store as it is iterated.
///
/// Cloning a collection yields another handle to the same documents.
///
/// # Examples
///
/// ```rust,ignore
/// use nitrite_query::collection::NitriteCollection;
/// use nitrite_query::doc;
/// use nitrite_query::filter::field;
///
/// let users = NitriteCollection::new("users")?;
/// users.insert(doc! { name: "Alice", age: 30 })?;
///
/// let cursor = users.find(field("age").eq(30))?;
/// assert_eq!(cursor.size()?, 1);
/// ```
#[derive(Clone)]
pub struct NitriteCollection {
    inner: Arc<NitriteCollectionInner>,
}

struct NitriteCollectionInner {
    collection_name: String,
    nitrite_config: NitriteConfig,
    operations: CollectionOperations,
    lock: RwLock<()>,
}

impl NitriteCollection {
    /// Creates an empty in-memory collection with the default configuration.
    pub fn new(collection_name: &str) -> NitriteResult<Self> {
        Self::with_store(
            collection_name,
            NitriteConfig::new(),
            RecordStore::new(InMemoryRecordStore::new()),
        )
    }

    /// Creates a collection over an existing record store.
    ///
    /// The configuration is frozen by this call. Records already in the store
    /// are served as they are; create indexes to index them.
    pub fn with_store(
        collection_name: &str,
        nitrite_config: NitriteConfig,
        record_store: RecordStore,
    ) -> NitriteResult<Self> {
        nitrite_config.initialize();
        let operations = CollectionOperations::new(collection_name, record_store, &nitrite_config);
        log::debug!("Opened collection {}", collection_name);

        Ok(NitriteCollection {
            inner: Arc::new(NitriteCollectionInner {
                collection_name: collection_name.to_string(),
                nitrite_config,
                operations,
                lock: RwLock::new(()),
            }),
        })
    }

    pub fn name(&self) -> String {
        self.inner.collection_name.clone()
    }

    pub fn config(&self) -> &NitriteConfig {
        &self.inner.nitrite_config
    }

    /// Inserts a single document.
    ///
    /// A document without an `_id` gets a new one. The stored copy carries
    /// revision `1` and a modification time.
    pub fn insert(&self, document: Document) -> NitriteResult<WriteResult> {
        self.insert_many(vec![document])
    }

    /// Inserts documents in order, stopping at the first failure.
    pub fn insert_many(&self, documents: Vec<Document>) -> NitriteResult<WriteResult> {
        let _guard = self.inner.lock.write();
        self.inner.operations.insert(documents)
    }

    /// Merges `update` into every document matching `filter`.
    pub fn update(&self, filter: Filter, update: &Document) -> NitriteResult<WriteResult> {
        let _guard = self.inner.lock.write();
        self.inner.operations.update(&filter, update)
    }

    /// Removes every document matching `filter`.
    pub fn remove(&self, filter: Filter) -> NitriteResult<WriteResult> {
        let _guard = self.inner.lock.write();
        self.inner.operations.remove(&filter)
    }

    /// Removes every document. Indexes stay registered.
    pub fn clear(&self) -> NitriteResult<()> {
        let _guard = self.inner.lock.write();
        self.inner.operations.clear()
    }

    pub fn get_by_id(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>> {
        let _guard = self.inner.lock.read();
        self.inner.operations.get_by_id(nitrite_id)
    }

    pub fn size(&self) -> NitriteResult<u64> {
        let _guard = self.inner.lock.read();
        self.inner.operations.size()
    }

    /// Finds the documents matching `filter`.
    pub fn find(&self, filter: Filter) -> NitriteResult<DocumentCursor> {
        self.find_with_options(filter, &FindOptions::new())
    }

    /// Finds the documents matching `filter` with sorting, paging and
    /// distinctness from `find_options`.
    ///
    /// # Errors
    /// * `ValidationError` for a negative skip or limit.
    /// * `FilterError` for a full-text filter without a full-text index.
    pub fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> NitriteResult<DocumentCursor> {
        let _guard = self.inner.lock.read();
        self.inner.operations.find(&filter, find_options)
    }

    /// Returns every document.
    pub fn find_all(&self) -> NitriteResult<DocumentCursor> {
        self.find(all())
    }

    /// Creates an index on `field_names` and indexes the stored documents.
    pub fn create_index(&self, field_names: Vec<&str>, index_options: &IndexOptions) -> NitriteResult<()> {
        let fields = Fields::with_names(field_names)?;
        let _guard = self.inner.lock.write();
        self.inner.operations.create_index(&fields, &index_options.index_type())
    }

    pub fn rebuild_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        let fields = Fields::with_names(field_names)?;
        let _guard = self.inner.lock.write();
        self.inner.operations.rebuild_index(&fields)
    }

    pub fn drop_index(&self, field_names: Vec<&str>) -> NitriteResult<()> {
        let fields = Fields::with_names(field_names)?;
        let _guard = self.inner.lock.write();
        self.inner.operations.drop_index(&fields)
    }

    pub fn has_index(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        let fields = Fields::with_names(field_names)?;
        let _guard = self.inner.lock.read();
        Ok(self.inner.operations.has_index(&fields))
    }

    pub fn is_indexing(&self, field_names: Vec<&str>) -> NitriteResult<bool> {
        let fields = Fields::with_names(field_names)?;
        Ok(self.inner.operations.is_indexing(&fields))
    }

    pub fn list_indexes(&self) -> NitriteResult<Vec<IndexDescriptor>> {
        let _guard = self.inner.lock.read();
        Ok(self.inner.operations.list_indexes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::order_by;
    use crate::common::{SortOrder, Value};
    use crate::doc;
    use crate::errors::ErrorKind;
    use crate::filter::field;
    use crate::index::{non_unique_index, unique_index};

    #[test]
    fn test_insert_and_find() {
        let collection = NitriteCollection::new("users").unwrap();
        collection.insert(doc! { name: "Alice", age: 30 }).unwrap();
        collection.insert(doc! { name: "Bob", age: 25 }).unwrap();

        assert_eq!(collection.name(), "users");
        assert_eq!(collection.size().unwrap(), 2);

        let cursor = collection.find(field("age").gt(26)).unwrap();
        let names: Vec<Value> = cursor.iter().map(|d| d.unwrap().get("name").unwrap()).collect();
        assert_eq!(names, vec![Value::from("Alice")]);
    }

    #[test]
    fn test_get_by_id() {
        let collection = NitriteCollection::new("users").unwrap();
        let result = collection.insert(doc! { name: "Alice" }).unwrap();
        let id = result.affected_nitrite_ids()[0];

        let doc = collection.get_by_id(&id).unwrap().unwrap();
        assert_eq!(doc.get("name").unwrap(), Value::from("Alice"));
        assert!(collection.get_by_id(&NitriteId::new()).unwrap().is_none());
    }

    #[test]
    fn test_index_lifecycle() {
        let collection = NitriteCollection::new("users").unwrap();
        collection.create_index(vec!["email"], &unique_index()).unwrap();
        assert!(collection.has_index(vec!["email"]).unwrap());
        assert!(!collection.is_indexing(vec!["email"]).unwrap());
        assert_eq!(collection.list_indexes().unwrap().len(), 1);

        collection.rebuild_index(vec!["email"]).unwrap();
        collection.drop_index(vec!["email"]).unwrap();
        assert!(!collection.has_index(vec!["email"]).unwrap());

        let err = collection.create_index(vec![], &non_unique_index()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn test_update_remove_clear() {
        let collection = NitriteCollection::new("items").unwrap();
        collection
            .insert_many(vec![doc! { n: 1 }, doc! { n: 2 }, doc! { n: 3 }])
            .unwrap();

        collection.update(field("n").eq(2), &doc! { flag: true }).unwrap();
        assert_eq!(collection.find(field("flag").eq(true)).unwrap().size().unwrap(), 1);

        collection.remove(field("n").gte(3)).unwrap();
        let values: Vec<Value> = collection
            .find_with_options(all(), &order_by("n", SortOrder::Descending))
            .unwrap()
            .iter()
            .map(|d| d.unwrap().get("n").unwrap())
            .collect();
        assert_eq!(values, vec![Value::I32(2), Value::I32(1)]);

        collection.clear().unwrap();
        assert_eq!(collection.size().unwrap(), 0);
    }

    #[test]
    fn test_config_is_frozen() {
        let config = NitriteConfig::new();
        let collection =
            NitriteCollection::with_store("c", config.clone(), RecordStore::new(InMemoryRecordStore::new())).unwrap();
        assert!(collection.config().is_configured());
        assert!(config.set_plan_cache_size(1).is_err());
    }
}

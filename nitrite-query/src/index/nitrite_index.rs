use super::IndexDescriptor;
use crate::{
    collection::{FindPlan, NitriteId},
    common::FieldValues,
    errors::NitriteResult,
};
use std::ops::Deref;
use std::sync::Arc;

/// Provider trait for concrete index implementations.
///
/// An index maps the values of its fields to the ids of the records holding
/// them and answers the index part of a [FindPlan].
///
/// # Responsibilities
/// - Store and retrieve mappings from indexed field values to NitriteIds
/// - Enforce uniqueness constraints if applicable
/// - Support write/remove operations for document changes
/// - Execute the index scan filters of a plan
pub trait NitriteIndexProvider: Send + Sync {
    /// Retrieves the descriptor of this index.
    fn index_descriptor(&self) -> IndexDescriptor;

    /// Records the field values of a document.
    ///
    /// # Errors
    /// * `UniqueConstraintViolation` when a unique index already maps the
    ///   values to another record. Nothing is written in that case.
    /// * `IndexingError` when a value cannot be indexed.
    fn write(&self, field_values: &FieldValues) -> NitriteResult<()>;

    /// Removes the field values of a document. Unknown entries are ignored.
    fn remove(&self, field_values: &FieldValues) -> NitriteResult<()>;

    /// Removes every entry from the index.
    fn drop_index(&self) -> NitriteResult<()>;

    /// Finds the ids of the records matching the plan's index scan filters.
    ///
    /// Ids are returned once each, in index order: forward, or reversed for
    /// the fields the plan's scan order flags. Records whose indexed value
    /// is null come first or last according to the plan's null order.
    fn find_nitrite_ids(&self, find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>>;

    /// Returns whether this index enforces uniqueness on indexed field values.
    fn is_unique(&self) -> bool {
        self.index_descriptor().is_unique()
    }
}

/// Shared handle to an index implementation.
///
/// Lets comparable and full-text indexes be used interchangeably through
/// [NitriteIndexProvider], which is reachable through `Deref`.
#[derive(Clone)]
pub struct NitriteIndex {
    inner: Arc<dyn NitriteIndexProvider>,
}

impl NitriteIndex {
    pub fn new<T: NitriteIndexProvider + 'static>(inner: T) -> Self {
        NitriteIndex { inner: Arc::new(inner) }
    }
}

impl Deref for NitriteIndex {
    type Target = Arc<dyn NitriteIndexProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Fields, UNIQUE_INDEX};

    struct MockNitriteIndex;

    impl NitriteIndexProvider for MockNitriteIndex {
        fn index_descriptor(&self) -> IndexDescriptor {
            IndexDescriptor::new(UNIQUE_INDEX, Fields::with_names(vec!["test_field"]).unwrap(), "test")
        }

        fn write(&self, _field_values: &FieldValues) -> NitriteResult<()> {
            Ok(())
        }

        fn remove(&self, _field_values: &FieldValues) -> NitriteResult<()> {
            Ok(())
        }

        fn drop_index(&self) -> NitriteResult<()> {
            Ok(())
        }

        fn find_nitrite_ids(&self, _find_plan: &FindPlan) -> NitriteResult<Vec<NitriteId>> {
            Ok(vec![NitriteId::new()])
        }
    }

    #[test]
    fn test_wrapper_delegates() {
        let index = NitriteIndex::new(MockNitriteIndex);
        assert_eq!(index.index_descriptor().collection_name(), "test");
        assert!(index.is_unique());
        assert_eq!(index.find_nitrite_ids(&FindPlan::new()).unwrap().len(), 1);
        assert!(index.drop_index().is_ok());
    }
}

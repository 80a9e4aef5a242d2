use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::common::{Fields, FULL_TEXT_INDEX, NON_UNIQUE_INDEX, UNIQUE_INDEX};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};

/// Describes an index on a collection: its type, the ordered list of
/// indexed fields and the owning collection.
///
/// Field order is fixed at creation. It decides which filters the index can
/// serve (they must cover a prefix of the fields) and which sort orders it
/// can produce.
///
/// # Characteristics
/// - **Immutable**: Once created, descriptor properties cannot be changed
/// - **Cheap to clone**: Shares its data behind an `Arc`
/// - **Compound support**: A descriptor with more than one field is a compound index
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexDescriptor {
    inner: Arc<IndexDescriptorInner>,
}

impl IndexDescriptor {
    /// Creates a new index descriptor for a set of fields.
    ///
    /// # Arguments
    /// * `index_type` - One of the `unique`, `non-unique` or `full-text` index types
    /// * `index_fields` - The fields to be indexed, in nesting order
    /// * `collection_name` - The name of the collection this index applies to
    pub fn new(index_type: &str, index_fields: Fields, collection_name: &str) -> Self {
        Self {
            inner: Arc::new(IndexDescriptorInner {
                index_type: index_type.to_string(),
                index_fields,
                collection_name: collection_name.to_string(),
            }),
        }
    }

    /// Checks that the index type is known and that a full-text index covers
    /// exactly one field.
    pub(crate) fn validate(&self) -> NitriteResult<()> {
        let index_type = self.inner.index_type.as_str();
        if ![UNIQUE_INDEX, NON_UNIQUE_INDEX, FULL_TEXT_INDEX].contains(&index_type) {
            log::error!("Unknown index type {}", index_type);
            return Err(NitriteError::new(
                &format!("Unknown index type {}", index_type),
                ErrorKind::IndexingError,
            ));
        }

        if self.is_full_text() && self.is_compound_index() {
            log::error!("Full-text index cannot be created on multiple fields {}", self.inner.index_fields);
            return Err(NitriteError::new(
                &format!(
                    "Full-text index cannot be created on multiple fields {}",
                    self.inner.index_fields
                ),
                ErrorKind::IndexingError,
            ));
        }
        Ok(())
    }

    pub fn index_type(&self) -> String {
        self.inner.index_type.clone()
    }

    pub fn index_fields(&self) -> Fields {
        self.inner.index_fields.clone()
    }

    pub fn collection_name(&self) -> String {
        self.inner.collection_name.clone()
    }

    /// Determines whether this is a compound (multi-field) index.
    pub fn is_compound_index(&self) -> bool {
        self.inner.index_fields.len() > 1
    }

    pub fn is_unique(&self) -> bool {
        self.inner.index_type == UNIQUE_INDEX
    }

    pub fn is_full_text(&self) -> bool {
        self.inner.index_type == FULL_TEXT_INDEX
    }
}

impl Display for IndexDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} index on {} of {}",
            self.inner.index_type, self.inner.index_fields, self.inner.collection_name
        )
    }
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct IndexDescriptorInner {
    index_type: String,
    index_fields: Fields,
    collection_name: String,
}

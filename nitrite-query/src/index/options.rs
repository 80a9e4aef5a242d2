use crate::common::{FULL_TEXT_INDEX, NON_UNIQUE_INDEX, UNIQUE_INDEX};

/// Specifies the type of index to create.
///
/// Passed to `NitriteCollection::create_index`:
/// ```ignore
/// collection.create_index(vec!["user_id"], &unique_index())?;
/// collection.create_index(vec!["department", "age"], &non_unique_index())?;
/// collection.create_index(vec!["notes"], &full_text_index())?;
/// ```
///
/// Defaults to a unique index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexOptions {
    index_type: String,
}

impl IndexOptions {
    /// Creates index options for the given index type.
    ///
    /// The type is checked when the index is created, not here.
    pub fn new(index_type: &str) -> IndexOptions {
        IndexOptions {
            index_type: index_type.to_string(),
        }
    }

    pub fn index_type(&self) -> String {
        self.index_type.clone()
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions::new(UNIQUE_INDEX)
    }
}

/// Index options for a unique index. Inserting a second document with the
/// same indexed values fails with `UniqueConstraintViolation`.
pub fn unique_index() -> IndexOptions {
    IndexOptions::new(UNIQUE_INDEX)
}

/// Index options for a non-unique index.
pub fn non_unique_index() -> IndexOptions {
    IndexOptions::new(NON_UNIQUE_INDEX)
}

/// Index options for a full-text index on a single string field.
pub fn full_text_index() -> IndexOptions {
    IndexOptions::new(FULL_TEXT_INDEX)
}

use crate::collection::NitriteId;

/// Ids of the records an insert, update or remove touched.
///
/// ```rust,ignore
/// let result = collection.insert(doc! { name: "Alice" })?;
/// for id in result.affected_nitrite_ids() {
///     println!("Inserted document with ID: {}", id);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    nitrite_ids: Vec<NitriteId>,
}

impl WriteResult {
    pub(crate) fn new(nitrite_ids: Vec<NitriteId>) -> Self {
        Self { nitrite_ids }
    }

    /// The affected ids, in the order the records were written.
    pub fn affected_nitrite_ids(&self) -> &[NitriteId] {
        &self.nitrite_ids
    }

    pub fn affected_count(&self) -> usize {
        self.nitrite_ids.len()
    }
}

impl IntoIterator for WriteResult {
    type Item = NitriteId;
    type IntoIter = std::vec::IntoIter<NitriteId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nitrite_ids.into_iter()
    }
}

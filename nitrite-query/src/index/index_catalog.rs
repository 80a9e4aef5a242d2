use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::IndexDescriptor;
use crate::common::Fields;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};

/// The set of indexes registered on a collection.
///
/// Descriptors are kept in registration order, which is the final tie-break
/// when the planner finds several equally good indexes. An index that is
/// being rebuilt stays registered but is hidden from the planner until the
/// rebuild finishes.
///
/// Every change bumps a version number that query plan caches use to detect
/// stale plans.
#[derive(Clone, Default)]
pub struct IndexCatalog {
    inner: Arc<IndexCatalogInner>,
}

#[derive(Default)]
struct IndexCatalogInner {
    descriptors: RwLock<Vec<IndexDescriptor>>,
    building: RwLock<HashSet<Fields>>,
    version: AtomicU64,
}

impl IndexCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new index.
    ///
    /// # Errors
    /// `IndexAlreadyExists` if an index on the same fields is registered.
    pub fn register(&self, descriptor: IndexDescriptor) -> NitriteResult<()> {
        let mut descriptors = self.inner.descriptors.write();
        let fields = descriptor.index_fields();
        if descriptors.iter().any(|d| d.index_fields() == fields) {
            log::error!("Index already exists on fields {}", fields);
            return Err(NitriteError::new(
                &format!("Index already exists on fields {}", fields),
                ErrorKind::IndexAlreadyExists,
            ));
        }

        descriptors.push(descriptor);
        self.bump();
        Ok(())
    }

    /// Unregisters the index on `fields` and returns its descriptor.
    ///
    /// # Errors
    /// * `IndexNotFound` if no index is registered on the fields.
    /// * `IndexingInProgress` if the index is being rebuilt.
    pub fn remove(&self, fields: &Fields) -> NitriteResult<IndexDescriptor> {
        if self.is_building(fields) {
            return Err(in_progress(fields));
        }

        let mut descriptors = self.inner.descriptors.write();
        match descriptors.iter().position(|d| &d.index_fields() == fields) {
            Some(position) => {
                let descriptor = descriptors.remove(position);
                self.bump();
                Ok(descriptor)
            }
            None => Err(not_found(fields)),
        }
    }

    /// Finds the index registered on exactly `fields`.
    pub fn find(&self, fields: &Fields) -> Option<IndexDescriptor> {
        self.inner
            .descriptors
            .read()
            .iter()
            .find(|d| &d.index_fields() == fields)
            .cloned()
    }

    pub fn has_index(&self, fields: &Fields) -> bool {
        self.find(fields).is_some()
    }

    /// All registered indexes in registration order.
    pub fn list(&self) -> Vec<IndexDescriptor> {
        self.inner.descriptors.read().clone()
    }

    /// Registered indexes the planner may use, in registration order.
    pub fn usable_indexes(&self) -> Vec<IndexDescriptor> {
        let building = self.inner.building.read();
        self.inner
            .descriptors
            .read()
            .iter()
            .filter(|d| !building.contains(&d.index_fields()))
            .cloned()
            .collect()
    }

    /// Marks the index on `fields` as being rebuilt.
    ///
    /// # Errors
    /// * `IndexNotFound` if no index is registered on the fields.
    /// * `IndexingInProgress` if a rebuild is already running.
    pub fn begin_build(&self, fields: &Fields) -> NitriteResult<()> {
        if !self.has_index(fields) {
            return Err(not_found(fields));
        }

        let mut building = self.inner.building.write();
        if !building.insert(fields.clone()) {
            return Err(in_progress(fields));
        }
        self.bump();
        Ok(())
    }

    /// Marks a rebuild of the index on `fields` as finished.
    pub fn end_build(&self, fields: &Fields) {
        if self.inner.building.write().remove(fields) {
            self.bump();
        }
    }

    pub fn is_building(&self, fields: &Fields) -> bool {
        self.inner.building.read().contains(fields)
    }

    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.inner.version.fetch_add(1, Ordering::AcqRel);
    }
}

fn not_found(fields: &Fields) -> NitriteError {
    log::error!("No index found on fields {}", fields);
    NitriteError::new(
        &format!("No index found on fields {}", fields),
        ErrorKind::IndexNotFound,
    )
}

fn in_progress(fields: &Fields) -> NitriteError {
    log::error!("Indexing is in progress on fields {}", fields);
    NitriteError::new(
        &format!("Indexing is in progress on fields {}", fields),
        ErrorKind::IndexingInProgress,
    )
}

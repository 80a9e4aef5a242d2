use crate::collection::{Document, FindPlan, NitriteId};
use crate::errors::NitriteResult;
use crate::filter::Filter;
use crate::index::NitriteIndex;
use crate::store::RecordStore;
use std::vec::IntoIter;

/// Reads the records an index scan selects.
///
/// The index is scanned on the first pull. Every id is then looked up in the
/// record store; ids whose record no longer exists are skipped, and a record
/// that no longer satisfies the index scan filters is dropped.
pub(crate) struct IndexedStream {
    index: NitriteIndex,
    find_plan: FindPlan,
    record_store: RecordStore,
    nitrite_ids: Option<IntoIter<NitriteId>>,
    done: bool,
}

impl IndexedStream {
    pub fn new(index: NitriteIndex, find_plan: FindPlan, record_store: RecordStore) -> Self {
        IndexedStream {
            index,
            find_plan,
            record_store,
            nitrite_ids: None,
            done: false,
        }
    }

    fn next_record(&mut self) -> NitriteResult<Option<(NitriteId, Document)>> {
        if self.nitrite_ids.is_none() {
            let ids = self.index.find_nitrite_ids(&self.find_plan)?;
            log::debug!(
                "Index {} selected {} records",
                self.index.index_descriptor(),
                ids.len()
            );
            self.nitrite_ids = Some(ids.into_iter());
        }

        let Some(nitrite_ids) = self.nitrite_ids.as_mut() else {
            return Ok(None);
        };

        for nitrite_id in nitrite_ids.by_ref() {
            let Some(document) = self.record_store.get(&nitrite_id)? else {
                log::debug!("Record {} vanished after the index scan", nitrite_id);
                continue;
            };

            if still_matches(self.find_plan.index_scan_filter(), &document)? {
                return Ok(Some((nitrite_id, document)));
            }
        }
        Ok(None)
    }
}

fn still_matches(filters: &[Filter], document: &Document) -> NitriteResult<bool> {
    for filter in filters {
        if !filter.apply(document)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl Iterator for IndexedStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

use super::{find_optimizer::FindOptimizer, index_operations::IndexOperations};
use crate::{
    collection::{Document, FindOptions, FindPlan, NitriteId},
    common::{
        stream::{
            BoundedStream, DistinctStream, FilteredStream, IndexedStream, SingleStream, SortedStream,
            UnionStream,
        },
        DocumentCursor, DocumentSorter, RecordIterator, RecordStream,
    },
    errors::{ErrorKind, NitriteError, NitriteResult},
    filter::Filter,
    store::RecordStore,
};
use std::sync::Arc;

/// Plans queries and assembles the record streams that answer them.
#[derive(Clone)]
pub(crate) struct ReadOperations {
    inner: Arc<ReadOperationsInner>,
}

struct ReadOperationsInner {
    record_store: RecordStore,
    index_operations: IndexOperations,
    find_optimizer: FindOptimizer,
}

impl ReadOperations {
    pub fn new(record_store: RecordStore, index_operations: IndexOperations, find_optimizer: FindOptimizer) -> Self {
        ReadOperations {
            inner: Arc::new(ReadOperationsInner {
                record_store,
                index_operations,
                find_optimizer,
            }),
        }
    }

    /// Plans the query and returns a cursor over its result.
    ///
    /// Planning errors are returned here; nothing is read until the cursor
    /// is iterated, and every iteration runs the plan again.
    pub fn find(&self, filter: &Filter, find_options: &FindOptions) -> NitriteResult<DocumentCursor> {
        let inner = &self.inner;
        let find_plan =
            inner
                .find_optimizer
                .create_find_plan(filter, find_options, inner.index_operations.catalog())?;

        let stream = QueryStream {
            read_operations: self.clone(),
            find_plan: find_plan.clone(),
        };
        Ok(DocumentCursor::new(Arc::new(stream)).set_find_plan(find_plan))
    }

    pub fn get_by_id(&self, nitrite_id: &NitriteId) -> NitriteResult<Option<Document>> {
        self.inner.record_store.get(nitrite_id)
    }

    fn execute(&self, find_plan: &FindPlan) -> NitriteResult<RecordIterator> {
        let mut records = self.source_stream(find_plan)?;

        if let Some(filter) = find_plan.collection_scan_filter() {
            records = Box::new(FilteredStream::new(records, filter.clone()));
        }

        if find_plan.distinct() {
            records = Box::new(DistinctStream::new(records));
        }

        let sort_order = find_plan.blocking_sort_order();
        if !sort_order.is_empty() {
            let sorter = DocumentSorter::new(sort_order.to_vec(), find_plan.null_order(), find_plan.collation())?;
            records = Box::new(SortedStream::new(records, Arc::new(sorter)));
        }

        if find_plan.skip().is_some() || find_plan.limit().is_some() {
            let skip = to_bound(find_plan.skip().unwrap_or(0))?;
            let limit = find_plan.limit().map(to_bound).transpose()?;
            records = Box::new(BoundedStream::new(records, skip, limit)?);
        }

        Ok(records)
    }

    fn source_stream(&self, find_plan: &FindPlan) -> NitriteResult<RecordIterator> {
        let inner = &self.inner;

        if !find_plan.sub_plans().is_empty() {
            let mut streams = Vec::with_capacity(find_plan.sub_plans().len());
            for sub_plan in find_plan.sub_plans() {
                streams.push(self.execute(sub_plan)?);
            }
            return Ok(Box::new(UnionStream::new(streams)));
        }

        if let Some(by_id) = find_plan.by_id_filter() {
            let record = match by_id.as_id_equality() {
                Some(nitrite_id) => inner.record_store.get(&nitrite_id)?.map(|doc| (nitrite_id, doc)),
                None => None,
            };
            return Ok(Box::new(SingleStream::new(record)));
        }

        if let Some(descriptor) = find_plan.index_descriptor() {
            let index = inner.index_operations.find_index(descriptor)?;
            return Ok(Box::new(IndexedStream::new(
                index,
                find_plan.clone(),
                inner.record_store.clone(),
            )));
        }

        inner.record_store.entries()
    }
}

fn to_bound(value: u64) -> NitriteResult<i64> {
    i64::try_from(value).map_err(|_| {
        log::error!("Skip or limit {} is out of range", value);
        NitriteError::new(
            &format!("Skip or limit {} is out of range", value),
            ErrorKind::ValidationError,
        )
    })
}

/// The records of a planned query, produced afresh on every pass.
struct QueryStream {
    read_operations: ReadOperations,
    find_plan: FindPlan,
}

impl RecordStream for QueryStream {
    fn stream(&self) -> NitriteResult<RecordIterator> {
        self.read_operations.execute(&self.find_plan)
    }
}

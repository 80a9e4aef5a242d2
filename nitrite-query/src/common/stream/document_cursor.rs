use super::{
    validate_bounds, BoundedStream, JoinedDocumentCursor, Lookup, ProjectedDocumentCursor, RecordIterator, RecordStream,
    SortedStream,
};
use crate::collection::{Document, FindPlan, NitriteId};
use crate::common::{Collation, DocumentSorter, NullOrder, SortOrder};
use crate::errors::NitriteResult;
use std::sync::Arc;

/// The result of a find operation.
///
/// A cursor does not hold the matching documents. Each pass over it, be it
/// iterating, [DocumentCursor::size] or [DocumentCursor::first], runs the
/// query again against the collection as it is at that moment.
///
/// Cursors can be refined with [DocumentCursor::sort], [DocumentCursor::skip]
/// and [DocumentCursor::limit], and turned into a projection or a join.
///
/// # Examples
///
/// ```rust,ignore
/// let cursor = collection.find(field("age").gt(18))?;
/// let page = cursor
///     .sort("name", SortOrder::Ascending, None, None)?
///     .skip(10)?
///     .limit(10)?;
/// for doc in page.iter() {
///     println!("{}", doc?);
/// }
/// ```
pub struct DocumentCursor {
    source: Arc<dyn RecordStream>,
    find_plan: Option<FindPlan>,
}

impl DocumentCursor {
    pub(crate) fn new(source: Arc<dyn RecordStream>) -> Self {
        DocumentCursor {
            source,
            find_plan: None,
        }
    }

    pub(crate) fn set_find_plan(mut self, find_plan: FindPlan) -> Self {
        self.find_plan = Some(find_plan);
        self
    }

    fn derive(&self, source: Arc<dyn RecordStream>) -> DocumentCursor {
        DocumentCursor {
            source,
            find_plan: self.find_plan.clone(),
        }
    }

    /// The plan the query was executed with.
    pub fn find_plan(&self) -> Option<&FindPlan> {
        self.find_plan.as_ref()
    }

    /// Counts the documents.
    pub fn size(&self) -> NitriteResult<usize> {
        let mut count = 0;
        for record in self.source.stream()? {
            record?;
            count += 1;
        }
        Ok(count)
    }

    /// Returns the first document, if any.
    pub fn first(&self) -> Option<NitriteResult<Document>> {
        match self.source.stream() {
            Ok(mut records) => records.next().map(|record| record.map(|(_, document)| document)),
            Err(err) => Some(Err(err)),
        }
    }

    /// Starts a fresh pass over the documents.
    pub fn iter(&self) -> Box<dyn Iterator<Item = NitriteResult<Document>>> {
        Box::new(self.iter_with_id().map(|record| record.map(|(_, document)| document)))
    }

    /// Starts a fresh pass that yields every document with its id.
    pub fn iter_with_id(&self) -> DocumentCursorWithId {
        DocumentCursorWithId {
            records: Some(self.source.stream()),
        }
    }

    /// Sorts the documents by `field`.
    ///
    /// Calling `sort` again sorts by the new field; the sort is stable, so
    /// the previous order breaks ties.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the collator for `collation` cannot be created.
    pub fn sort(
        &self,
        field: &str,
        order: SortOrder,
        collation: Option<Collation>,
        null_order: Option<NullOrder>,
    ) -> NitriteResult<DocumentCursor> {
        let sorter = DocumentSorter::new(
            vec![(field.to_string(), order)],
            null_order.unwrap_or_default(),
            collation.as_ref(),
        )?;
        Ok(self.derive(Arc::new(SortedSource {
            source: self.source.clone(),
            sorter: Arc::new(sorter),
        })))
    }

    /// Skips the first `skip` documents.
    ///
    /// # Errors
    ///
    /// `ValidationError` for a negative value.
    pub fn skip(&self, skip: i64) -> NitriteResult<DocumentCursor> {
        self.bounded(skip, None)
    }

    /// Yields at most `limit` documents.
    ///
    /// # Errors
    ///
    /// `ValidationError` for a negative value.
    pub fn limit(&self, limit: i64) -> NitriteResult<DocumentCursor> {
        self.bounded(0, Some(limit))
    }

    fn bounded(&self, skip: i64, limit: Option<i64>) -> NitriteResult<DocumentCursor> {
        validate_bounds(skip, limit)?;
        Ok(self.derive(Arc::new(BoundedSource {
            source: self.source.clone(),
            skip,
            limit,
        })))
    }

    /// Keeps only the fields named in `projection`.
    ///
    /// Template leaves must be null; a nested document selects fields of the
    /// nested document at that key.
    ///
    /// # Errors
    ///
    /// `ValidationError` if a template leaf holds a value.
    pub fn project(&self, projection: Document) -> NitriteResult<ProjectedDocumentCursor> {
        ProjectedDocumentCursor::new(self.source.clone(), projection)
    }

    /// Left outer join with the documents of `foreign_cursor`.
    pub fn join(&self, foreign_cursor: &DocumentCursor, lookup: &Lookup) -> JoinedDocumentCursor {
        JoinedDocumentCursor::new(self.source.clone(), foreign_cursor.source.clone(), lookup.clone())
    }
}

impl RecordStream for DocumentCursor {
    fn stream(&self) -> NitriteResult<RecordIterator> {
        self.source.stream()
    }
}

impl<'a> IntoIterator for &'a DocumentCursor {
    type Item = NitriteResult<Document>;
    type IntoIter = Box<dyn Iterator<Item = NitriteResult<Document>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator adapter that yields `(NitriteId, Document)` pairs, for
/// callers that go on to update or remove what they read.
pub struct DocumentCursorWithId {
    records: Option<NitriteResult<RecordIterator>>,
}

impl Iterator for DocumentCursorWithId {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.take()? {
            Ok(mut records) => {
                let next = records.next();
                self.records = Some(Ok(records));
                next
            }
            Err(err) => Some(Err(err)),
        }
    }
}

struct SortedSource {
    source: Arc<dyn RecordStream>,
    sorter: Arc<DocumentSorter>,
}

impl RecordStream for SortedSource {
    fn stream(&self) -> NitriteResult<RecordIterator> {
        Ok(Box::new(SortedStream::new(self.source.stream()?, self.sorter.clone())))
    }
}

struct BoundedSource {
    source: Arc<dyn RecordStream>,
    skip: i64,
    limit: Option<i64>,
}

impl RecordStream for BoundedSource {
    fn stream(&self) -> NitriteResult<RecordIterator> {
        Ok(Box::new(BoundedStream::new(self.source.stream()?, self.skip, self.limit)?))
    }
}

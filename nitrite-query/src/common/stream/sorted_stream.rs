use super::RecordIterator;
use crate::collection::{Document, NitriteId};
use crate::common::DocumentSorter;
use crate::errors::NitriteResult;
use std::sync::Arc;
use std::vec::IntoIter;

/// Sorts the whole source with a [DocumentSorter] before yielding anything.
///
/// The source is read to the end on the first pull, so the stage sees the
/// records as they were at that moment.
pub(crate) struct SortedStream {
    records: Option<RecordIterator>,
    sorter: Arc<DocumentSorter>,
    sorted: IntoIter<(NitriteId, Document)>,
    done: bool,
}

impl SortedStream {
    pub fn new(records: RecordIterator, sorter: Arc<DocumentSorter>) -> Self {
        SortedStream {
            records: Some(records),
            sorter,
            sorted: Vec::new().into_iter(),
            done: false,
        }
    }

    fn materialize(&mut self, records: RecordIterator) -> NitriteResult<()> {
        let unsorted = records.collect::<NitriteResult<Vec<_>>>()?;
        log::debug!(
            "Sorting {} records on {:?}",
            unsorted.len(),
            self.sorter.sort_order()
        );
        self.sorted = self.sorter.sort(unsorted)?.into_iter();
        Ok(())
    }
}

impl Iterator for SortedStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(records) = self.records.take() {
            if let Err(err) = self.materialize(records) {
                self.done = true;
                return Some(Err(err));
            }
        }

        self.sorted.next().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::stream::test_records::{failing_iter_of, iter_of, with_ids};
    use crate::common::{NullOrder, SortOrder};
    use crate::doc;
    use crate::errors::ErrorKind;
    use crate::Value;

    fn sorter(keys: Vec<(&str, SortOrder)>, null_order: NullOrder) -> Arc<DocumentSorter> {
        let keys = keys.into_iter().map(|(f, o)| (f.to_string(), o)).collect();
        Arc::new(DocumentSorter::new(keys, null_order, None).unwrap())
    }

    fn names(stream: SortedStream) -> Vec<Value> {
        stream.map(|r| r.unwrap().1.get("name").unwrap()).collect()
    }

    #[test]
    fn multi_key_sort() {
        let records = with_ids(vec![
            doc! { name: "a", lastName: "ln2", birthDay: 1 },
            doc! { name: "b", lastName: "ln1", birthDay: 5 },
            doc! { name: "c", lastName: "ln2", birthDay: 3 },
            doc! { name: "d", lastName: "ln1", birthDay: 9 },
            doc! { name: "e", birthDay: 2 },
        ]);
        let stream = SortedStream::new(
            iter_of(records),
            sorter(
                vec![("lastName", SortOrder::Ascending), ("birthDay", SortOrder::Descending)],
                NullOrder::Last,
            ),
        );
        assert_eq!(
            names(stream),
            vec![
                Value::from("d"),
                Value::from("b"),
                Value::from("c"),
                Value::from("a"),
                Value::from("e")
            ]
        );
    }

    #[test]
    fn nulls_first_in_descending_order() {
        let records = with_ids(vec![
            doc! { name: "a", n: 1 },
            doc! { name: "b" },
            doc! { name: "c", n: 2 },
        ]);
        let stream = SortedStream::new(
            iter_of(records),
            sorter(vec![("n", SortOrder::Descending)], NullOrder::Default),
        );
        assert_eq!(
            names(stream),
            vec![Value::from("b"), Value::from("c"), Value::from("a")]
        );
    }

    #[test]
    fn stable_for_ties() {
        let records = with_ids(vec![
            doc! { name: "a", n: 1 },
            doc! { name: "b", n: 0 },
            doc! { name: "c", n: 1 },
            doc! { name: "d", n: 0 },
        ]);
        let stream = SortedStream::new(
            iter_of(records),
            sorter(vec![("n", SortOrder::Ascending)], NullOrder::First),
        );
        assert_eq!(
            names(stream),
            vec![Value::from("b"), Value::from("d"), Value::from("a"), Value::from("c")]
        );
    }

    #[test]
    fn array_key_fails_once() {
        let records = with_ids(vec![doc! { n: 1 }, doc! { n: [1, 2] }]);
        let mut stream = SortedStream::new(
            iter_of(records),
            sorter(vec![("n", SortOrder::Ascending)], NullOrder::First),
        );
        let err = stream.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
        assert!(stream.next().is_none());
    }

    #[test]
    fn source_error_fails_once() {
        let records = with_ids(vec![doc! { n: 1 }]);
        let mut stream = SortedStream::new(
            failing_iter_of(records),
            sorter(vec![("n", SortOrder::Ascending)], NullOrder::First),
        );
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}

use super::RecordIterator;
use crate::collection::{Document, NitriteId};
use crate::errors::NitriteResult;
use std::collections::HashSet;

/// Yields the first record seen for every id and drops later repeats.
pub(crate) struct DistinctStream {
    records: RecordIterator,
    seen: HashSet<NitriteId>,
    done: bool,
}

impl DistinctStream {
    pub fn new(records: RecordIterator) -> Self {
        DistinctStream {
            records,
            seen: HashSet::with_capacity(128),
            done: false,
        }
    }
}

impl Iterator for DistinctStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.records.next()? {
                Ok((id, doc)) => {
                    if self.seen.insert(id) {
                        return Some(Ok((id, doc)));
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::stream::test_records::{failing_iter_of, iter_of, with_ids};
    use crate::doc;

    #[test]
    fn repeated_ids_are_dropped() {
        let records = with_ids(vec![doc! { a: 1 }, doc! { a: 2 }]);
        let mut repeated = records.clone();
        repeated.push(records[0].clone());
        repeated.push(records[1].clone());
        repeated.push(records[0].clone());

        let result: Vec<_> = DistinctStream::new(iter_of(repeated)).map(|r| r.unwrap()).collect();
        assert_eq!(result, records);
    }

    #[test]
    fn first_occurrence_wins() {
        let id = NitriteId::new();
        let records = vec![(id, doc! { v: "first" }), (id, doc! { v: "second" })];
        let result: Vec<_> = DistinctStream::new(iter_of(records)).map(|r| r.unwrap()).collect();
        assert_eq!(result, vec![(id, doc! { v: "first" })]);
    }

    #[test]
    fn halts_on_error() {
        let records = with_ids(vec![doc! { a: 1 }]);
        let result: Vec<_> = DistinctStream::new(failing_iter_of(records)).collect();
        assert_eq!(result.len(), 2);
        assert!(result[1].is_err());
    }
}

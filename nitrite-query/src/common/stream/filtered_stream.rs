use super::RecordIterator;
use crate::collection::{Document, NitriteId};
use crate::errors::NitriteResult;
use crate::filter::Filter;

/// Yields the records that satisfy a filter.
///
/// The `All` filter passes every record through without evaluating it.
pub(crate) struct FilteredStream {
    records: RecordIterator,
    filter: Filter,
    done: bool,
}

impl FilteredStream {
    pub fn new(records: RecordIterator, filter: Filter) -> Self {
        FilteredStream {
            records,
            filter,
            done: false,
        }
    }
}

impl Iterator for FilteredStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.records.next()? {
                Ok((id, doc)) => {
                    if self.filter.is_all() {
                        return Some(Ok((id, doc)));
                    }

                    match self.filter.apply(&doc) {
                        Ok(true) => return Some(Ok((id, doc))),
                        Ok(false) => continue,
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
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

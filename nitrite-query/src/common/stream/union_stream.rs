use super::RecordIterator;
use crate::collection::{Document, NitriteId};
use crate::errors::NitriteResult;
use std::collections::VecDeque;

/// Concatenates streams in order, moving to the next one only when the
/// current one is exhausted.
pub(crate) struct UnionStream {
    current: Option<RecordIterator>,
    remaining: VecDeque<RecordIterator>,
    done: bool,
}

impl UnionStream {
    pub fn new(streams: Vec<RecordIterator>) -> Self {
        let mut remaining: VecDeque<RecordIterator> = streams.into();
        UnionStream {
            current: remaining.pop_front(),
            remaining,
            done: false,
        }
    }
}

impl Iterator for UnionStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let stream = self.current.as_mut()?;
            match stream.next() {
                Some(Ok(record)) => return Some(Ok(record)),
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                None => self.current = self.remaining.pop_front(),
            }
        }
    }
}

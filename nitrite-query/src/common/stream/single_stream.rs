use crate::collection::{Document, NitriteId};
use crate::errors::NitriteResult;

/// Yields at most one record, for lookups by id.
pub(crate) struct SingleStream {
    record: Option<(NitriteId, Document)>,
}

impl SingleStream {
    pub fn new(record: Option<(NitriteId, Document)>) -> Self {
        SingleStream { record }
    }
}

impl Iterator for SingleStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.record.take().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn yields_once() {
        let id = NitriteId::new();
        let mut stream = SingleStream::new(Some((id, doc! { a: 1 })));
        assert_eq!(stream.next().unwrap().unwrap(), (id, doc! { a: 1 }));
        assert!(stream.next().is_none());
    }

    #[test]
    fn empty() {
        assert!(SingleStream::new(None).next().is_none());
    }
}

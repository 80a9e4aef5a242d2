use super::{RecordIterator, RecordStream};
use crate::collection::Document;
use crate::common::Value;
use crate::errors::NitriteResult;
use std::sync::Arc;

/// Describes a left outer join between two cursors.
///
/// Every local document whose `local_field` equals the `foreign_field` of
/// one or more foreign documents gets those foreign documents, as an array,
/// under `target_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub local_field: String,
    pub foreign_field: String,
    pub target_field: String,
}

impl Lookup {
    pub fn new(local_field: &str, foreign_field: &str, target_field: &str) -> Self {
        Lookup {
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            target_field: target_field.to_string(),
        }
    }
}

/// Joins every local record with the foreign records sharing its key.
///
/// The foreign side is streamed again for each local record. A local record
/// with a null key, or without matches, is yielded unchanged.
pub(crate) struct JoinedStream {
    records: RecordIterator,
    foreign: Arc<dyn RecordStream>,
    lookup: Lookup,
    done: bool,
}

impl JoinedStream {
    pub fn new(records: RecordIterator, foreign: Arc<dyn RecordStream>, lookup: Lookup) -> Self {
        JoinedStream {
            records,
            foreign,
            lookup,
            done: false,
        }
    }

    fn join(&self, mut document: Document) -> NitriteResult<Document> {
        let local_value = document.get(&self.lookup.local_field)?;
        if local_value.is_null() {
            return Ok(document);
        }

        let mut matches: Vec<Value> = Vec::new();
        for record in self.foreign.stream()? {
            let (_, foreign_document) = record?;
            let foreign_value = foreign_document.get(&self.lookup.foreign_field)?;
            if foreign_value.is_null() || foreign_value != local_value {
                continue;
            }

            let candidate = Value::Document(foreign_document);
            if !matches.contains(&candidate) {
                matches.push(candidate);
            }
        }

        if !matches.is_empty() {
            document.put(self.lookup.target_field.as_str(), Value::Array(matches))?;
        }
        Ok(document)
    }
}

impl Iterator for JoinedStream {
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self
            .records
            .next()?
            .and_then(|(_, document)| self.join(document));
        if let Err(err) = &result {
            log::error!("Error while joining documents: {}", err);
            self.done = true;
        }
        Some(result)
    }
}

/// A cursor over the result of joining two cursors.
///
/// Every pass reads both sides again.
pub struct JoinedDocumentCursor {
    local: Arc<dyn RecordStream>,
    foreign: Arc<dyn RecordStream>,
    lookup: Lookup,
}

impl JoinedDocumentCursor {
    pub(crate) fn new(local: Arc<dyn RecordStream>, foreign: Arc<dyn RecordStream>, lookup: Lookup) -> Self {
        JoinedDocumentCursor {
            local,
            foreign,
            lookup,
        }
    }

    fn open(&self) -> NitriteResult<JoinedStream> {
        Ok(JoinedStream::new(
            self.local.stream()?,
            self.foreign.clone(),
            self.lookup.clone(),
        ))
    }

    /// Starts a fresh pass over the joined documents.
    pub fn iter(&self) -> Box<dyn Iterator<Item = NitriteResult<Document>>> {
        match self.open() {
            Ok(stream) => Box::new(stream),
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }

    pub fn size(&self) -> NitriteResult<usize> {
        let mut count = 0;
        for document in self.open()? {
            document?;
            count += 1;
        }
        Ok(count)
    }
}

impl<'a> IntoIterator for &'a JoinedDocumentCursor {
    type Item = NitriteResult<Document>;
    type IntoIter = Box<dyn Iterator<Item = NitriteResult<Document>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

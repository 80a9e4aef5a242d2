use super::{RecordIterator, RecordStream};
use crate::collection::Document;
use crate::common::Value;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use std::sync::Arc;

/// Checks that every leaf of a projection template is null or a document.
pub(crate) fn validate_projection(projection: &Document) -> NitriteResult<()> {
    for (key, value) in projection.iter() {
        match value {
            Value::Null => {}
            Value::Document(nested) => validate_projection(&nested)?,
            other => {
                log::error!("Projection field {} holds a value {}", key, other);
                return Err(NitriteError::new(
                    &format!(
                        "Projection template can only hold null or documents, found {} in {}",
                        other, key
                    ),
                    ErrorKind::ValidationError,
                ));
            }
        }
    }
    Ok(())
}

/// Keeps the fields the template names. A nested template document selects
/// fields of the nested document at that key. Absent fields are left out.
fn project(document: &Document, projection: &Document) -> NitriteResult<Document> {
    let mut projected = Document::new();
    for (key, selector) in projection.iter() {
        match selector {
            Value::Document(nested_projection) => {
                if let Value::Document(nested) = document.get(&key)? {
                    projected.put(key, project(&nested, &nested_projection)?)?;
                }
            }
            _ => {
                let value = document.get(&key)?;
                if !value.is_null() || document.contains_key(&key) {
                    projected.put(key, value)?;
                }
            }
        }
    }
    Ok(projected)
}

/// Turns records into projected documents.
pub(crate) struct ProjectedStream {
    records: RecordIterator,
    projection: Document,
    done: bool,
}

impl ProjectedStream {
    /// # Errors
    ///
    /// `ValidationError` when the template has a leaf that is neither null
    /// nor a document.
    pub fn new(records: RecordIterator, projection: Document) -> NitriteResult<Self> {
        validate_projection(&projection)?;
        Ok(ProjectedStream {
            records,
            projection,
            done: false,
        })
    }
}

impl Iterator for ProjectedStream {
    type Item = NitriteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self
            .records
            .next()?
            .and_then(|(_, document)| project(&document, &self.projection));
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// A cursor over projected documents.
///
/// Every pass reads the source again.
pub struct ProjectedDocumentCursor {
    source: Arc<dyn RecordStream>,
    projection: Document,
}

impl ProjectedDocumentCursor {
    pub(crate) fn new(source: Arc<dyn RecordStream>, projection: Document) -> NitriteResult<Self> {
        validate_projection(&projection)?;
        Ok(ProjectedDocumentCursor {
            source,
            projection,
        })
    }

    fn open(&self) -> NitriteResult<ProjectedStream> {
        ProjectedStream::new(self.source.stream()?, self.projection.clone())
    }

    /// Starts a fresh pass over the projected documents.
    pub fn iter(&self) -> Box<dyn Iterator<Item = NitriteResult<Document>>> {
        match self.open() {
            Ok(stream) => Box::new(stream),
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }

    /// Counts the projected documents.
    pub fn size(&self) -> NitriteResult<usize> {
        let mut count = 0;
        for document in self.open()? {
            document?;
            count += 1;
        }
        Ok(count)
    }
}

impl<'a> IntoIterator for &'a ProjectedDocumentCursor {
    type Item = NitriteResult<Document>;
    type IntoIter = Box<dyn Iterator<Item = NitriteResult<Document>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

use super::RecordIterator;
use crate::collection::{Document, NitriteId};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};

/// Checks that skip and limit are non-negative.
pub(crate) fn validate_bounds(skip: i64, limit: Option<i64>) -> NitriteResult<()> {
    if skip < 0 {
        log::error!("Invalid skip value {}", skip);
        return Err(NitriteError::new(
            &format!("Skip must be non-negative, found {}", skip),
            ErrorKind::ValidationError,
        ));
    }

    if let Some(limit) = limit.filter(|limit| *limit < 0) {
        log::error!("Invalid limit value {}", limit);
        return Err(NitriteError::new(
            &format!("Limit must be non-negative, found {}", limit),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}

/// Skips the first `skip` records, then yields at most `limit` records.
///
/// The skipped records are pulled on the first call to `next`.
pub(crate) struct BoundedStream {
    records: RecordIterator,
    skip: u64,
    limit: Option<u64>,
    yielded: u64,
    skipped: bool,
    done: bool,
}

impl BoundedStream {
    /// Creates the stage.
    ///
    /// # Errors
    ///
    /// `ValidationError` if `skip` or `limit` is negative.
    pub fn new(records: RecordIterator, skip: i64, limit: Option<i64>) -> NitriteResult<Self> {
        validate_bounds(skip, limit)?;
        Ok(BoundedStream {
            records,
            skip: skip as u64,
            limit: limit.map(|limit| limit as u64),
            yielded: 0,
            skipped: false,
            done: false,
        })
    }

    fn fail(&mut self, err: NitriteError) -> Option<NitriteResult<(NitriteId, Document)>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for BoundedStream {
    type Item = NitriteResult<(NitriteId, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.skipped {
            self.skipped = true;
            for _ in 0..self.skip {
                match self.records.next() {
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return self.fail(err),
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }
        }

        if self.limit.is_some_and(|limit| self.yielded >= limit) {
            self.done = true;
            return None;
        }

        match self.records.next()? {
            Ok(record) => {
                self.yielded += 1;
                Some(Ok(record))
            }
            Err(err) => self.fail(err),
        }
    }
}

//! Lazy record stream stages.
//!
//! Every stage wraps the stage before it and pulls one record at a time.
//! Records travel as `(NitriteId, Document)` pairs until a projecting or
//! joining stage turns them into plain documents. A stage that yields an
//! error yields nothing after it.

mod bounded_stream;
mod distinct_stream;
mod document_cursor;
mod filtered_stream;
mod indexed_stream;
mod joined_cursor;
mod projected_cursor;
mod single_stream;
mod sorted_stream;
mod union_stream;

pub(crate) use bounded_stream::*;
pub(crate) use distinct_stream::*;
pub use document_cursor::*;
pub(crate) use filtered_stream::*;
pub(crate) use indexed_stream::*;
pub use joined_cursor::*;
pub use projected_cursor::*;
pub(crate) use single_stream::*;
pub(crate) use sorted_stream::*;
pub(crate) use union_stream::*;

use crate::collection::{Document, NitriteId};
use crate::errors::NitriteResult;

/// A boxed pull iterator over records.
pub type RecordIterator = Box<dyn Iterator<Item = NitriteResult<(NitriteId, Document)>>>;

/// A source that can be streamed any number of times.
///
/// Each call to [RecordStream::stream] starts a fresh pass over the records,
/// so a consumer that needs to read the source repeatedly, like the foreign
/// side of a join, asks for a new iterator every time.
pub trait RecordStream {
    fn stream(&self) -> NitriteResult<RecordIterator>;
}

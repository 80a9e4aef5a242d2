//! Shared building blocks: values, field lists, sort settings, the document
//! sorter, record streams and small utilities.

mod constants;
mod document_sorter;
mod fields;
mod sort_order;
pub(crate) mod stream;
mod util;
mod value;

pub use constants::*;
pub use document_sorter::*;
pub use fields::*;
pub use sort_order::*;
pub use stream::*;
pub use util::*;
pub use value::*;

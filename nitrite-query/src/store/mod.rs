//! Record storage boundary.
//!
//! Collections read and write documents through a [RecordStore], a cheaply
//! cloneable handle to any [RecordStoreProvider]. The store keeps records
//! ordered by id and answers a size probe; a missing id reads as `None`.
//!
//! [InMemoryRecordStore] keeps records in a concurrent skip list and is the
//! default store of a collection.

mod memory;
mod record_store;

pub use memory::*;
pub use record_store::*;

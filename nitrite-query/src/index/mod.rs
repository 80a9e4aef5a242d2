//! Indexing support for optimized querying.
//!
//! Indexes map field values to record ids, letting the planner answer a
//! filter, and sometimes a sort order, without scanning the collection.
//!
//! # Index Types
//!
//! - **Unique Index**: Ensures field values are unique across all documents
//! - **Non-Unique Index**: Allows duplicate field values
//! - **Full-Text Index**: Word index over a single string field
//! - **Compound Index**: A unique or non-unique index on several fields
//!
//! # Creating Indexes
//!
//! ```rust,ignore
//! use nitrite_query::index::{non_unique_index, unique_index};
//!
//! collection.create_index(vec!["email"], &unique_index())?;
//! collection.create_index(vec!["name", "age"], &non_unique_index())?;
//! ```
//!
//! The [IndexCatalog] records which indexes exist on a collection and which
//! of them are being rebuilt.

mod comparable_index;
mod descriptor;
mod index_catalog;
mod nitrite_index;
mod options;
mod text_index;

pub use comparable_index::*;
pub use descriptor::*;
pub use index_catalog::*;
pub use nitrite_index::*;
pub use options::*;
pub use text_index::*;

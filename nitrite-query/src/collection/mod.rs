//! Documents, ids, find options and the collection facade.
//!
//! # Documents
//!
//! A `Document` is a map from string keys to `Value`s. Keys containing the
//! field separator (default: ".") address nested documents and array
//! elements.
//!
//! ```rust,ignore
//! use nitrite_query::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("name", "Alice")?;
//! doc.put("address.city", "New York")?;
//! doc.put("age", 30i64)?;
//! ```
//!
//! # Collections
//!
//! A `NitriteCollection` stores documents in a record store and answers
//! filters through a query plan. Collections support:
//! - Insert, update and remove operations
//! - Queries with sorting, paging and distinct results
//! - Unique, non-unique and full-text indexes
//!
//! ```rust,ignore
//! use nitrite_query::collection::{order_by, NitriteCollection};
//! use nitrite_query::common::SortOrder;
//! use nitrite_query::doc;
//! use nitrite_query::filter::field;
//!
//! let users = NitriteCollection::new("users")?;
//! users.insert(doc! { name: "Alice", age: 30 })?;
//!
//! let options = order_by("name", SortOrder::Ascending).limit(10);
//! let cursor = users.find_with_options(field("age").gte(18), &options)?;
//! ```
//!
//! # Document IDs
//!
//! Each document has a unique `_id` field containing a `NitriteId`. The ID is
//! generated with a Snowflake algorithm if not provided during insertion.
//!
//! # Reserved Fields
//!
//! - `_id` - Document ID
//! - `_revision` - Revision number
//! - `_source` - Document source
//! - `_modified` - Last modification timestamp

mod document;
mod find_options;
mod find_plan;
mod nitrite_collection;
mod nitrite_id;
pub(crate) mod operation;
pub(crate) mod snowflake;

pub use document::*;
pub use find_options::*;
pub use find_plan::*;
pub use nitrite_collection::*;
pub use nitrite_id::NitriteId;
pub use operation::WriteResult;

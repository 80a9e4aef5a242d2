//! Query filters for selecting documents from collections.
//!
//! Filters form a tree of leaf predicates joined by logical operators. The
//! planner inspects the tree to choose an index, and any part it cannot serve
//! from an index is evaluated against each document with [Filter::apply].
//!
//! # Creating Filters
//!
//! - `field("age").gt(30)` - comparison operators
//! - `field("name").eq("Alice")` - equality checks
//! - `all()` - match all documents
//! - `by_id(id)` - match by document ID
//! - `field("age").gt(30).and(field("status").eq("active"))` - logical AND
//!
//! # Examples
//!
//! ```rust,ignore
//! use nitrite_query::filter::{and, field, or};
//!
//! let adults = field("age").gte(18);
//! let named = or(vec![field("name").eq("Alice"), field("name").eq("Bob")]);
//! let filter = and(vec![adults, named]);
//! let cursor = collection.find(filter)?;
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `eq`, `ne`
//! - **Comparison**: `gt`, `gte`, `lt`, `lte`, `between`
//! - **Pattern**: `text_regex`, `text`
//! - **Array**: `in_array`, `not_in_array`, `elem_match`
//! - **Logical**: `and`, `or`, `not`
//! - **Special**: `all` (match all), `by_id` (match by ID)

#[allow(clippy::module_inception)]
mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;

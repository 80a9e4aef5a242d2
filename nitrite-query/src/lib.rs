#![allow(clippy::invisible_characters)]
//! # Nitrite Query - query execution core of an embeddable document database
//!
//! This crate holds the parts of a document database that decide how a query
//! is answered and then answer it:
//!
//! - a schemaless [`collection::Document`] model with nested-path access,
//! - a composable [`filter::Filter`] tree,
//! - an index catalog with comparable and full-text indexes,
//! - a planner that turns a filter and find options into a [`collection::FindPlan`],
//! - lazy record stream stages (filter, distinct, bound, sort, project, join, union)
//!   assembled by the executor and exposed through a [`common::DocumentCursor`].
//!
//! Storage sits behind the [`store::RecordStore`] trait. An in-memory store is
//! provided so collections work end to end without any persistence layer.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nitrite_query::collection::NitriteCollection;
//! use nitrite_query::doc;
//! use nitrite_query::filter::field;
//! use nitrite_query::index::non_unique_index;
//!
//! let collection = NitriteCollection::new("users")?;
//! collection.insert(doc!{ name: "Alice", age: 30 })?;
//! collection.create_index(vec!["age"], &non_unique_index())?;
//!
//! let cursor = collection.find(field("age").gt(18))?;
//! for doc in cursor.iter() {
//!     println!("{}", doc?);
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - documents, ids, find options, plans and the collection facade
//! - [`common`] - values, fields, sort order, the document sorter and record streams
//! - [`errors`] - error types and result definitions
//! - [`filter`] - query filters and the fluent filter builder
//! - [`index`] - index descriptors, the index catalog and index implementations
//! - [`nitrite_config`] - configuration
//! - [`store`] - record store boundary and the in-memory store

use crate::collection::snowflake::SnowflakeIdGenerator;
use crate::common::*;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod index;
pub mod nitrite_config;
pub mod store;

pub(crate) static FIELD_SEPARATOR: LazyLock<Atomic<String>> =
    LazyLock::new(|| atomic(".".to_string()));
pub(crate) static ID_GENERATOR: LazyLock<SnowflakeIdGenerator> =
    LazyLock::new(SnowflakeIdGenerator::new);

//! File-backed collaborators for the basket engine.
//!
//! Provides local implementations of the core's data contracts:
//! [`JsonlInteractions`] reads interaction history from a JSON-lines file,
//! and [`JsonCatalog`] serves item and user metadata from a JSON document.
//! Both exist so the engine can train and serve without a warehouse or
//! object store behind it.

#![forbid(unsafe_code)]

mod catalog;
mod jsonl;

pub use catalog::{CatalogError, JsonCatalog};
pub use jsonl::JsonlInteractions;

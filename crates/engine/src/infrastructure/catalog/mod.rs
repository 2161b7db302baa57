//! Catalog adapters.
//!
//! `InMemoryCatalog` serves value tables straight from memory; `JsonCatalog`
//! loads those tables from a catalog document on disk.

mod document;
mod memory;

pub use document::{CatalogDocument, JsonCatalog};
pub use memory::InMemoryCatalog;

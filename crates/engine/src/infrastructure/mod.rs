//! Infrastructure implementations.
//!
//! Contains the catalog port, its adapters, and the session-scoped machinery
//! the engine leans on: reference interning, tree serialization and
//! configuration.

pub mod catalog;
pub mod config;
pub mod ports;
pub mod references;
pub mod serializer;

//! Charplan Engine library.
//!
//! The build engine for a character planner: a queue of pending decisions
//! over an ownership tree of resolved ones, with level management, replay of
//! revised levels and compact build export.
//!
//! ## Structure
//!
//! - `use_cases/` - the planner engine and its views
//! - `infrastructure/` - catalog port and adapters, reference interning,
//!   tree serialization and configuration

pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

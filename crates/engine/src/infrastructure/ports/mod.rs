//! Port traits for infrastructure boundaries.
//!
//! The catalog is the only collaborator the engine talks to. It supplies the
//! class/spell/race/background tables and resolves interned handles back into
//! full entities on import. Adapters live in `infrastructure::catalog`.

mod catalog;
mod error;

pub use catalog::{CatalogEntity, CatalogPort};
pub use error::CatalogError;

#[cfg(test)]
pub use catalog::MockCatalogPort;

//! Error types for port operations.

use charplan_domain::ReferenceTag;

/// Catalog lookup errors. The engine propagates these unchanged and never
/// retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Catalog backend could not be reached or read.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// No entity with this handle exists in the catalog.
    #[error("{} not found: {id}", .tag.entity_name())]
    NotFound { tag: ReferenceTag, id: u32 },

    /// Catalog data exists but does not have the expected shape.
    #[error("Malformed catalog data: {0}")]
    Malformed(String),
}

impl CatalogError {
    pub fn unavailable(message: impl ToString) -> Self {
        Self::Unavailable(message.to_string())
    }

    pub fn not_found(tag: ReferenceTag, id: u32) -> Self {
        Self::NotFound { tag, id }
    }

    pub fn malformed(message: impl ToString) -> Self {
        Self::Malformed(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = CatalogError::not_found(ReferenceTag::Spell, 12);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Spell not found: 12");
    }

    #[test]
    fn unavailable_message() {
        let err = CatalogError::unavailable("connection refused");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Catalog unavailable: connection refused");
    }
}

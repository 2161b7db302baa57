//! Build engine errors.

use charplan_domain::{DecisionId, DomainError};

use crate::infrastructure::ports::CatalogError;
use crate::infrastructure::serializer::SerializerError;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Decision {0} is not pending")]
    InvalidDecision(DecisionId),
    #[error("No attach point found for '{0}'")]
    MissingParent(String),
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Build is incomplete: {pending_steps} steps and {pending_decisions} decisions pending")]
    IncompleteBuild {
        pending_steps: usize,
        pending_decisions: usize,
    },
    #[error("Corrupt import: {0}")]
    CorruptImport(String),
    #[error("Serializer self-check failed: {0}")]
    SerializerCorruption(String),
    #[error("A replay is already in progress")]
    ReplayConflict,
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl PlannerError {
    pub fn node_not_found(what: impl ToString) -> Self {
        Self::NodeNotFound(what.to_string())
    }

    /// Failures a user can act on (fix the input, finish the build, retry).
    /// Everything else points at a caller or engine bug.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::IncompleteBuild { .. } | Self::CorruptImport(_) | Self::Catalog(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog(CatalogError::Unavailable(_)))
    }
}

impl From<SerializerError> for PlannerError {
    fn from(err: SerializerError) -> Self {
        match err {
            SerializerError::CorruptImport(message) => Self::CorruptImport(message),
            SerializerError::Corruption(message) => Self::SerializerCorruption(message),
            SerializerError::Catalog(err) => Self::Catalog(err),
        }
    }
}

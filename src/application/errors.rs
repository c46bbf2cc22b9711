//! Application error taxonomy for encounter table use cases

use thiserror::Error;

use crate::application::ports::outbound::{CatalogError, RepoError};
use crate::domain::value_objects::{FilterError, InvalidDieSize, TableId};

#[derive(Debug, Error)]
pub enum EncounterError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidDieSize(#[from] InvalidDieSize),

    #[error(
        "Only {found} monsters match your criteria. Try loosening your filters: \
         widen the challenge level range or remove type and location tags."
    )]
    InsufficientCandidates { found: usize },

    #[error("Monster catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),

    #[error("Encounter table {table_id} is corrupt: {reason}")]
    DataIntegrity { table_id: TableId, reason: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Persistence(#[from] RepoError),
}

impl EncounterError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Errors the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidDieSize(_)
                | Self::InsufficientCandidates { .. }
                | Self::NotFound(_)
                | Self::Forbidden(_)
        )
    }
}

impl From<FilterError> for EncounterError {
    fn from(err: FilterError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_candidates_message() {
        let message = EncounterError::InsufficientCandidates { found: 0 }.to_string();
        assert!(message.contains("monsters match"));
        assert!(message.contains("loosening"));
    }

    #[test]
    fn test_filter_error_is_validation() {
        let err: EncounterError = FilterError::InvertedLevelRange { min: 5, max: 2 }.into();
        assert!(matches!(err, EncounterError::Validation(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_persistence_is_server_error() {
        let err: EncounterError = RepoError::database("get", "disk on fire").into();
        assert!(!err.is_client_error());
    }
}

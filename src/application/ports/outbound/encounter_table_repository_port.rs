//! Encounter table repository port
//!
//! Tables and their entries form one aggregate. Every write that touches
//! entries runs in a single transaction so readers never see a partial set.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{EncounterTable, EncounterTableEntry};
use crate::domain::value_objects::{PublicSlug, TableId, UserId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }
}

/// A table loaded together with its entries, sorted by `roll_min`
#[derive(Debug, Clone)]
pub struct TableWithEntries {
    pub table: EncounterTable,
    pub entries: Vec<EncounterTableEntry>,
}

#[async_trait]
pub trait EncounterTableRepositoryPort: Send + Sync {
    /// Insert a table and its entries atomically
    async fn create(
        &self,
        table: &EncounterTable,
        entries: &[EncounterTableEntry],
    ) -> Result<(), RepoError>;

    async fn get(&self, id: TableId) -> Result<Option<EncounterTable>, RepoError>;

    /// Table and entries read in one transaction
    async fn get_with_entries(&self, id: TableId) -> Result<Option<TableWithEntries>, RepoError>;

    /// Published table by slug; private tables are not returned
    async fn get_public_by_slug(
        &self,
        slug: &PublicSlug,
    ) -> Result<Option<TableWithEntries>, RepoError>;

    /// Page of an owner's tables, newest first, plus the owner's total count
    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<EncounterTable>, u64), RepoError>;

    /// Persist table metadata. A duplicate slug is a `ConstraintViolation`.
    async fn update(&self, table: &EncounterTable) -> Result<(), RepoError>;

    /// Swap the full entry set of an existing table in one transaction
    async fn replace_entries(
        &self,
        table_id: TableId,
        entries: &[EncounterTableEntry],
    ) -> Result<(), RepoError>;

    /// Delete a table; entries go with it
    async fn delete(&self, id: TableId) -> Result<(), RepoError>;

    async fn slug_exists(&self, slug: &PublicSlug) -> Result<bool, RepoError>;
}

//! Monster catalog port - Read access to the monster catalog
//!
//! The catalog is owned by another part of the site; the encounter engine
//! only ever queries it.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Monster;
use crate::domain::value_objects::{EncounterFilters, MonsterSource, UserId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog query failed: {0}")]
    Query(String),
    #[error("Catalog returned a malformed monster: {0}")]
    Malformed(String),
}

/// A catalog query built from normalized filters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonsterQuery {
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    /// Lowercased type tags; a monster matches if it has any of them
    pub types: Vec<String>,
    /// Lowercased location tags; `any` on the monster matches every tag
    pub locations: Vec<String>,
    pub source: MonsterSource,
    pub search: Option<String>,
    /// Caller whose private homebrew monsters are visible
    pub viewer: Option<UserId>,
}

impl MonsterQuery {
    /// `filters` should already be normalized
    pub fn from_filters(filters: &EncounterFilters, viewer: Option<UserId>) -> Self {
        Self {
            min_level: filters.min_challenge_level,
            max_level: filters.max_challenge_level,
            types: filters.monster_types.clone(),
            locations: filters.locations.clone(),
            source: filters.source,
            search: filters.search_query.clone(),
            viewer,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonsterCatalogPort: Send + Sync {
    /// All monsters matching `query`. Order and duplicates are unspecified.
    async fn find_monsters(&self, query: &MonsterQuery) -> Result<Vec<Monster>, CatalogError>;
}

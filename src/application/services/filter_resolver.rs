//! Filter Resolver - Turns encounter filters into a candidate monster pool

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::errors::EncounterError;
use crate::application::ports::outbound::{MonsterCatalogPort, MonsterQuery};
use crate::domain::entities::Monster;
use crate::domain::value_objects::{EncounterFilters, UserId};

#[derive(Clone)]
pub struct FilterResolver {
    catalog: Arc<dyn MonsterCatalogPort>,
}

impl FilterResolver {
    pub fn new(catalog: Arc<dyn MonsterCatalogPort>) -> Self {
        Self { catalog }
    }

    /// Validate `filters`, query the catalog, and return the qualifying
    /// monsters deduplicated by id and ordered by name. Never empty.
    #[instrument(skip(self, filters), fields(source = filters.source.as_str()))]
    pub async fn resolve_candidates(
        &self,
        filters: &EncounterFilters,
        viewer: Option<UserId>,
    ) -> Result<Vec<Monster>, EncounterError> {
        filters.validate()?;
        let query = MonsterQuery::from_filters(&filters.normalized(), viewer);

        let monsters = self.catalog.find_monsters(&query).await.map_err(|e| {
            warn!(error = %e, "Monster catalog query failed");
            EncounterError::CatalogUnavailable(e)
        })?;

        let mut seen = HashSet::with_capacity(monsters.len());
        let mut pool: Vec<Monster> = monsters
            .into_iter()
            .filter(|m| seen.insert(m.id))
            .collect();
        pool.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });

        if pool.is_empty() {
            debug!("No monsters matched the filters");
            return Err(EncounterError::InsufficientCandidates { found: 0 });
        }

        debug!(pool_size = pool.len(), "Resolved candidate pool");
        Ok(pool)
    }
}

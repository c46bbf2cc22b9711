//! Shared application state

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::application::ports::outbound::{EncounterTableRepositoryPort, SecureRandomPort};
use crate::application::services::{
    EncounterTableService, EncounterTableServiceImpl, FilterResolver, RollService, SlugGenerator,
    TableEntryGenerator,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::{
    connect, initialize_schema, SqliteEncounterTableRepository, SqliteMonsterCatalog,
};
use crate::infrastructure::random::OsRngAdapter;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    // Application services
    pub encounter_tables: Arc<dyn EncounterTableService>,
    pub rolls: RollService,
    /// Randomness for endpoints that roll without a table
    pub random: Arc<dyn SecureRandomPort>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = connect(&config.database_url).await?;
        initialize_schema(&pool)
            .await
            .context("Failed to initialize database schema")?;

        if let Some(ref path) = config.monster_seed_path {
            SqliteMonsterCatalog::new(pool.clone())
                .seed_from_file(Path::new(path))
                .await?;
        }

        Ok(Self::with_pool(config, pool, Arc::new(OsRngAdapter::new())))
    }

    /// Wire adapters and services over an existing pool
    pub fn with_pool(config: AppConfig, pool: SqlitePool, random: Arc<dyn SecureRandomPort>) -> Self {
        let repository: Arc<dyn EncounterTableRepositoryPort> =
            Arc::new(SqliteEncounterTableRepository::new(pool.clone()));
        let catalog = Arc::new(SqliteMonsterCatalog::new(pool));

        let encounter_tables = EncounterTableServiceImpl::new(
            repository.clone(),
            FilterResolver::new(catalog),
            TableEntryGenerator::new(random.clone()),
            SlugGenerator::new(repository.clone(), random.clone(), config.slug_max_attempts),
            random.clone(),
        );
        let rolls = RollService::new(repository, random.clone());

        Self {
            config,
            encounter_tables: Arc::new(encounter_tables),
            rolls,
            random,
        }
    }
}

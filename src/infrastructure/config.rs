//! Application configuration

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::domain::value_objects::UserId;

const ENV_PREFIX: &str = "DUNGEON_EXCHANGE";

/// Raw key/value layer as read from defaults and the environment
#[derive(Debug, Deserialize)]
struct RawConfig {
    database_url: String,
    server_port: u16,
    monster_seed_path: Option<String>,
    admin_user_ids: String,
    slug_max_attempts: u32,
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// JSON file of monsters loaded into the catalog at start-up
    pub monster_seed_path: Option<String>,
    /// Users allowed to manage any table
    pub admin_user_ids: Vec<UserId>,
    /// Attempts before giving up on a unique public slug
    pub slug_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/dungeon_exchange.db".to_string(),
            server_port: 3000,
            monster_seed_path: None,
            admin_user_ids: Vec::new(),
            slug_max_attempts: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from `DUNGEON_EXCHANGE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn load(environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let raw: RawConfig = Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("server_port", i64::from(defaults.server_port))?
            .set_default("admin_user_ids", "")?
            .set_default("slug_max_attempts", i64::from(defaults.slug_max_attempts))?
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        if raw.slug_max_attempts == 0 {
            anyhow::bail!("slug_max_attempts must be at least 1");
        }

        Ok(Self {
            database_url: raw.database_url,
            server_port: raw.server_port,
            monster_seed_path: raw.monster_seed_path.filter(|p| !p.trim().is_empty()),
            admin_user_ids: parse_user_ids(&raw.admin_user_ids)?,
            slug_max_attempts: raw.slug_max_attempts,
        })
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_user_ids.contains(&user_id)
    }
}

fn parse_user_ids(list: &str) -> Result<Vec<UserId>> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| UserId::parse(id).with_context(|| format!("admin_user_ids contains an invalid UUID: {id}")))
        .collect()
}

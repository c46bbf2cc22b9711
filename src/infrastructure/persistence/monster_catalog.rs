//! SQLite monster catalog
//!
//! Tag lists are stored as JSON arrays and matched with `json_each`, so a
//! whole filter set becomes a single query.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::application::ports::outbound::{CatalogError, MonsterCatalogPort, MonsterQuery};
use crate::domain::entities::{ContentSource, Monster};
use crate::domain::value_objects::{MonsterId, MonsterSource, UserId, ANY_LOCATION};

const MONSTER_COLUMNS: &str = "id, name, challenge_level, source, owner_id, is_public, types, \
                               locations, description, armor_class, hit_points";

#[derive(sqlx::FromRow)]
struct MonsterRow {
    id: String,
    name: String,
    challenge_level: i64,
    source: String,
    owner_id: Option<String>,
    is_public: bool,
    types: String,
    locations: String,
    description: Option<String>,
    armor_class: Option<i64>,
    hit_points: Option<i64>,
}

impl TryFrom<MonsterRow> for Monster {
    type Error = CatalogError;

    fn try_from(row: MonsterRow) -> Result<Self, Self::Error> {
        let malformed = |what: &str| CatalogError::Malformed(format!("{what} on monster {}", row.id));

        Ok(Self {
            id: MonsterId::parse(&row.id).map_err(|_| malformed("invalid id"))?,
            challenge_level: u8::try_from(row.challenge_level)
                .map_err(|_| malformed("invalid challenge level"))?,
            source: ContentSource::parse(&row.source).ok_or_else(|| malformed("unknown source"))?,
            owner_id: row
                .owner_id
                .as_deref()
                .map(UserId::parse)
                .transpose()
                .map_err(|_| malformed("invalid owner id"))?,
            is_public: row.is_public,
            types: serde_json::from_str(&row.types).map_err(|_| malformed("invalid types"))?,
            locations: serde_json::from_str(&row.locations)
                .map_err(|_| malformed("invalid locations"))?,
            armor_class: row.armor_class.and_then(|v| u16::try_from(v).ok()),
            hit_points: row.hit_points.and_then(|v| u16::try_from(v).ok()),
            name: row.name,
            description: row.description,
        })
    }
}

/// Escape LIKE wildcards so user text matches literally
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_tag_match<'a>(builder: &mut QueryBuilder<'a, Sqlite>, column: &str, tags: &'a [String], wildcard: Option<&'static str>) {
    builder.push(format!(
        " AND EXISTS (SELECT 1 FROM json_each(monsters.{column}) AS tag WHERE lower(tag.value) IN ("
    ));
    let mut values = builder.separated(", ");
    if let Some(wildcard) = wildcard {
        values.push_bind(wildcard);
    }
    for tag in tags {
        values.push_bind(tag.as_str());
    }
    builder.push("))");
}

fn push_user_visibility<'a>(builder: &mut QueryBuilder<'a, Sqlite>, viewer: Option<UserId>) {
    builder.push("(source = 'user' AND (is_public = 1");
    if let Some(viewer) = viewer {
        builder.push(" OR owner_id = ").push_bind(viewer.to_string());
    }
    builder.push("))");
}

/// Build the filtered SELECT for `query`
fn build_query(query: &MonsterQuery) -> QueryBuilder<'_, Sqlite> {
    let mut builder = QueryBuilder::new(format!("SELECT {MONSTER_COLUMNS} FROM monsters WHERE 1 = 1"));

    if let Some(min) = query.min_level {
        builder.push(" AND challenge_level >= ").push_bind(i64::from(min));
    }
    if let Some(max) = query.max_level {
        builder.push(" AND challenge_level <= ").push_bind(i64::from(max));
    }
    if !query.types.is_empty() {
        push_tag_match(&mut builder, "types", &query.types, None);
    }
    if !query.locations.is_empty() {
        push_tag_match(&mut builder, "locations", &query.locations, Some(ANY_LOCATION));
    }

    match query.source {
        MonsterSource::Official => {
            builder.push(" AND source = 'official'");
        }
        MonsterSource::User => {
            builder.push(" AND ");
            push_user_visibility(&mut builder, query.viewer);
        }
        MonsterSource::All => {
            builder.push(" AND (source = 'official' OR ");
            push_user_visibility(&mut builder, query.viewer);
            builder.push(")");
        }
    }

    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (lower(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(coalesce(description, '')) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    builder.push(" ORDER BY name ASC");
    builder
}

#[derive(Clone)]
pub struct SqliteMonsterCatalog {
    pool: SqlitePool,
}

impl SqliteMonsterCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, monster: &Monster) -> Result<(), CatalogError> {
        self.insert_monster(monster, false).await.map(|_| ())
    }

    /// Insert unless a monster with the same name, source and owner exists.
    /// Returns whether a row was written.
    async fn insert_monster(&self, monster: &Monster, skip_existing: bool) -> Result<bool, CatalogError> {
        let types = serde_json::to_string(&normalize(&monster.types))
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;
        let locations = serde_json::to_string(&normalize(&monster.locations))
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;
        let owner = monster.owner_id.map(|id| id.to_string());

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("INSERT INTO monsters ({MONSTER_COLUMNS}) SELECT "));
        let mut values = builder.separated(", ");
        values
            .push_bind(monster.id.to_string())
            .push_bind(&monster.name)
            .push_bind(i64::from(monster.challenge_level))
            .push_bind(monster.source.as_str())
            .push_bind(owner.clone())
            .push_bind(monster.is_public)
            .push_bind(types)
            .push_bind(locations)
            .push_bind(&monster.description)
            .push_bind(monster.armor_class.map(i64::from))
            .push_bind(monster.hit_points.map(i64::from));
        if skip_existing {
            builder
                .push(" WHERE NOT EXISTS (SELECT 1 FROM monsters WHERE name = ")
                .push_bind(&monster.name)
                .push(" AND source = ")
                .push_bind(monster.source.as_str())
                .push(" AND owner_id IS ")
                .push_bind(owner)
                .push(")");
        }

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Load a JSON array of monsters, skipping ones already present
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read monster seed file {}", path.display()))?;
        let monsters: Vec<Monster> = serde_json::from_str(&raw)
            .with_context(|| format!("Monster seed file {} is not a JSON array of monsters", path.display()))?;

        let mut inserted = 0;
        for monster in &monsters {
            if self
                .insert_monster(monster, true)
                .await
                .with_context(|| format!("Failed to seed monster {}", monster.name))?
            {
                inserted += 1;
            }
        }

        info!(inserted, total = monsters.len(), "Seeded monster catalog");
        Ok(inserted)
    }
}

fn normalize(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[async_trait]
impl MonsterCatalogPort for SqliteMonsterCatalog {
    async fn find_monsters(&self, query: &MonsterQuery) -> Result<Vec<Monster>, CatalogError> {
        let mut builder = build_query(query);
        let monsters: Vec<Monster> = builder
            .build_query_as::<MonsterRow>()
            .fetch(&self.pool)
            .map_err(|e| CatalogError::Query(e.to_string()))
            .and_then(|row| async move { Monster::try_from(row) })
            .try_collect()
            .await?;

        debug!(count = monsters.len(), "Catalog query returned monsters");
        Ok(monsters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::EncounterFilters;
    use crate::infrastructure::persistence::memory_pool;

    async fn catalog() -> SqliteMonsterCatalog {
        let catalog = SqliteMonsterCatalog::new(memory_pool().await);
        for monster in [
            Monster::official("Goblin", 1)
                .with_type("Humanoid")
                .with_location("cave")
                .with_description("Small and 100% mean"),
            Monster::official("Skeleton", 1).with_type("undead").with_location("crypt"),
            Monster::official("Ghoul", 3).with_type("undead").with_location("crypt"),
            Monster::official("Wolf", 2).with_type("beast").with_location("forest"),
            Monster::official("Mimic", 4).with_type("monstrosity").with_location("any"),
        ] {
            catalog.insert(&monster).await.unwrap();
        }
        catalog
    }

    async fn names(catalog: &SqliteMonsterCatalog, filters: EncounterFilters, viewer: Option<UserId>) -> Vec<String> {
        let query = MonsterQuery::from_filters(&filters.normalized(), viewer);
        catalog
            .find_monsters(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect()
    }

    #[tokio::test]
    async fn test_no_filters_returns_everything_by_name() {
        let catalog = catalog().await;
        assert_eq!(
            names(&catalog, EncounterFilters::default(), None).await,
            vec!["Ghoul", "Goblin", "Mimic", "Skeleton", "Wolf"]
        );
    }

    #[tokio::test]
    async fn test_level_and_type_filters_combine() {
        let catalog = catalog().await;
        let filters = EncounterFilters::default().with_levels(1, 2).with_type("undead");
        assert_eq!(names(&catalog, filters, None).await, vec!["Skeleton"]);

        let filters = EncounterFilters::default().with_type("undead").with_type("beast");
        assert_eq!(names(&catalog, filters, None).await, vec!["Ghoul", "Skeleton", "Wolf"]);

        // stored tags are lowercased on insert
        let filters = EncounterFilters::default().with_type("HUMANOID");
        assert_eq!(names(&catalog, filters, None).await, vec!["Goblin"]);
    }

    #[tokio::test]
    async fn test_any_location_matches_every_location() {
        let catalog = catalog().await;
        let filters = EncounterFilters::default().with_location("crypt");
        assert_eq!(names(&catalog, filters, None).await, vec!["Ghoul", "Mimic", "Skeleton"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let catalog = catalog().await;
        let filters = EncounterFilters::default().with_search("GOB");
        assert_eq!(names(&catalog, filters, None).await, vec!["Goblin"]);

        let filters = EncounterFilters::default().with_search("100%");
        assert_eq!(names(&catalog, filters, None).await, vec!["Goblin"]);

        let filters = EncounterFilters::default().with_search("_");
        assert!(names(&catalog, filters, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_user_source_visibility() {
        let catalog = catalog().await;
        let author = UserId::new();
        catalog
            .insert(&Monster::homebrew(author, "Bog Hag", 3))
            .await
            .unwrap();
        catalog
            .insert(&Monster::homebrew(UserId::new(), "Shared Slime", 1).published())
            .await
            .unwrap();

        let user_only = EncounterFilters::default().with_source(MonsterSource::User);
        assert_eq!(
            names(&catalog, user_only.clone(), Some(author)).await,
            vec!["Bog Hag", "Shared Slime"]
        );
        assert_eq!(names(&catalog, user_only.clone(), None).await, vec!["Shared Slime"]);
        assert_eq!(
            names(&catalog, user_only, Some(UserId::new())).await,
            vec!["Shared Slime"]
        );

        let official = EncounterFilters::default().with_source(MonsterSource::Official);
        assert_eq!(names(&catalog, official, Some(author)).await.len(), 5);

        let all = EncounterFilters::default();
        assert_eq!(names(&catalog, all.clone(), Some(author)).await.len(), 7);
        assert_eq!(names(&catalog, all, None).await.len(), 6);
    }

    #[tokio::test]
    async fn test_seed_from_file_skips_existing() {
        let catalog = SqliteMonsterCatalog::new(memory_pool().await);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monsters.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Goblin", "challenge_level": 1, "source": "official", "types": ["humanoid"]},
                {"name": "Owlbear", "challenge_level": 3, "source": "official", "locations": ["forest"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.seed_from_file(&path).await.unwrap(), 2);
        assert_eq!(catalog.seed_from_file(&path).await.unwrap(), 0);
        assert_eq!(names(&catalog, EncounterFilters::default(), None).await.len(), 2);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rat"), "%rat%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}

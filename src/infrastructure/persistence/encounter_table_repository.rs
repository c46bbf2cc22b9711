//! SQLite adapter for the encounter table aggregate

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::application::ports::outbound::{
    EncounterTableRepositoryPort, RepoError, TableWithEntries,
};
use crate::domain::entities::{EncounterTable, EncounterTableEntry};
use crate::domain::value_objects::{
    DieSize, EntryId, MonsterId, PublicSlug, TableId, UserId,
};

/// Rows per multi-value INSERT; keeps bind counts well under SQLite's limit
const ENTRY_INSERT_CHUNK: usize = 100;

const TABLE_COLUMNS: &str = "id, owner_id, name, description, die_size, filters, is_public, \
                             public_slug, compact_ranges, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, table_id, roll_number, roll_min, roll_max, monster_id, \
                             monster_snapshot, encounter_description";

#[derive(sqlx::FromRow)]
struct TableRow {
    id: String,
    owner_id: String,
    name: String,
    description: Option<String>,
    die_size: i64,
    filters: String,
    is_public: bool,
    public_slug: Option<String>,
    compact_ranges: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TableRow> for EncounterTable {
    type Error = RepoError;

    fn try_from(row: TableRow) -> Result<Self, Self::Error> {
        let die_size = u32::try_from(row.die_size)
            .ok()
            .and_then(|n| DieSize::new(n).ok())
            .ok_or_else(|| RepoError::serialization(format!("invalid die_size {}", row.die_size)))?;

        Ok(Self {
            id: TableId::parse(&row.id).map_err(RepoError::serialization)?,
            owner_id: UserId::parse(&row.owner_id).map_err(RepoError::serialization)?,
            name: row.name,
            description: row.description,
            die_size,
            filters: serde_json::from_str(&row.filters).map_err(RepoError::serialization)?,
            is_public: row.is_public,
            public_slug: row
                .public_slug
                .as_deref()
                .map(PublicSlug::parse)
                .transpose()
                .map_err(RepoError::serialization)?,
            compact_ranges: row.compact_ranges,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    table_id: String,
    roll_number: i64,
    roll_min: i64,
    roll_max: i64,
    monster_id: Option<String>,
    monster_snapshot: String,
    encounter_description: String,
}

fn roll_value(value: i64) -> Result<u32, RepoError> {
    u32::try_from(value).map_err(|_| RepoError::serialization(format!("invalid roll value {value}")))
}

impl TryFrom<EntryRow> for EncounterTableEntry {
    type Error = RepoError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EntryId::parse(&row.id).map_err(RepoError::serialization)?,
            table_id: TableId::parse(&row.table_id).map_err(RepoError::serialization)?,
            roll_number: roll_value(row.roll_number)?,
            roll_min: roll_value(row.roll_min)?,
            roll_max: roll_value(row.roll_max)?,
            monster_id: row
                .monster_id
                .as_deref()
                .map(MonsterId::parse)
                .transpose()
                .map_err(RepoError::serialization)?,
            monster: serde_json::from_str(&row.monster_snapshot)
                .map_err(RepoError::serialization)?,
            encounter_description: row.encounter_description,
        })
    }
}

/// Map a sqlx error, surfacing unique-constraint failures separately
fn map_db_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> RepoError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return RepoError::constraint(db.message());
            }
        }
        RepoError::database(operation, e)
    }
}

#[derive(Clone)]
pub struct SqliteEncounterTableRepository {
    pool: SqlitePool,
}

impl SqliteEncounterTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_entries(
        conn: &mut SqliteConnection,
        entries: &[EncounterTableEntry],
    ) -> Result<(), RepoError> {
        for chunk in entries.chunks(ENTRY_INSERT_CHUNK) {
            let mut rows = Vec::with_capacity(chunk.len());
            for entry in chunk {
                let snapshot =
                    serde_json::to_string(&entry.monster).map_err(RepoError::serialization)?;
                rows.push((entry, snapshot));
            }

            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                "INSERT INTO encounter_table_entries ({ENTRY_COLUMNS}) "
            ));
            builder.push_values(rows, |mut b, (entry, snapshot)| {
                b.push_bind(entry.id.to_string())
                    .push_bind(entry.table_id.to_string())
                    .push_bind(i64::from(entry.roll_number))
                    .push_bind(i64::from(entry.roll_min))
                    .push_bind(i64::from(entry.roll_max))
                    .push_bind(entry.monster_id.map(|id| id.to_string()))
                    .push_bind(snapshot)
                    .push_bind(entry.encounter_description.clone());
            });
            builder
                .build()
                .execute(&mut *conn)
                .await
                .map_err(map_db_error("insert_entries"))?;
        }
        Ok(())
    }

    async fn fetch_entries(
        conn: &mut SqliteConnection,
        table_id: TableId,
    ) -> Result<Vec<EncounterTableEntry>, RepoError> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM encounter_table_entries \
             WHERE table_id = ? ORDER BY roll_min ASC"
        ))
        .bind(table_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error("fetch_entries"))?;

        rows.into_iter().map(EncounterTableEntry::try_from).collect()
    }

    async fn fetch_with_entries(
        &self,
        filter_sql: &str,
        key: String,
        operation: &'static str,
    ) -> Result<Option<TableWithEntries>, RepoError> {
        // One read transaction so the entry set matches the table row.
        let mut tx = self.pool.begin().await.map_err(map_db_error(operation))?;

        let row: Option<TableRow> = sqlx::query_as(&format!(
            "SELECT {TABLE_COLUMNS} FROM encounter_tables WHERE {filter_sql}"
        ))
        .bind(key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error(operation))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let table = EncounterTable::try_from(row)?;
        let entries = Self::fetch_entries(&mut tx, table.id).await?;

        tx.commit().await.map_err(map_db_error(operation))?;
        Ok(Some(TableWithEntries { table, entries }))
    }
}

#[async_trait]
impl EncounterTableRepositoryPort for SqliteEncounterTableRepository {
    async fn create(
        &self,
        table: &EncounterTable,
        entries: &[EncounterTableEntry],
    ) -> Result<(), RepoError> {
        let filters = serde_json::to_string(&table.filters).map_err(RepoError::serialization)?;
        let mut tx = self.pool.begin().await.map_err(map_db_error("create"))?;

        sqlx::query(&format!(
            "INSERT INTO encounter_tables ({TABLE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(table.id.to_string())
        .bind(table.owner_id.to_string())
        .bind(&table.name)
        .bind(&table.description)
        .bind(i64::from(table.die_size.get()))
        .bind(filters)
        .bind(table.is_public)
        .bind(table.public_slug.as_ref().map(PublicSlug::as_str))
        .bind(table.compact_ranges)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error("create"))?;

        Self::insert_entries(&mut tx, entries).await?;

        tx.commit().await.map_err(map_db_error("create"))?;
        Ok(())
    }

    async fn get(&self, id: TableId) -> Result<Option<EncounterTable>, RepoError> {
        let row: Option<TableRow> = sqlx::query_as(&format!(
            "SELECT {TABLE_COLUMNS} FROM encounter_tables WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error("get"))?;

        row.map(EncounterTable::try_from).transpose()
    }

    async fn get_with_entries(&self, id: TableId) -> Result<Option<TableWithEntries>, RepoError> {
        self.fetch_with_entries("id = ?", id.to_string(), "get_with_entries")
            .await
    }

    async fn get_public_by_slug(
        &self,
        slug: &PublicSlug,
    ) -> Result<Option<TableWithEntries>, RepoError> {
        self.fetch_with_entries(
            "public_slug = ? AND is_public = 1",
            slug.as_str().to_string(),
            "get_public_by_slug",
        )
        .await
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<EncounterTable>, u64), RepoError> {
        let owner = owner_id.to_string();
        let mut tx = self.pool.begin().await.map_err(map_db_error("list_by_owner"))?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM encounter_tables WHERE owner_id = ?")
                .bind(&owner)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_db_error("list_by_owner"))?;

        let rows: Vec<TableRow> = sqlx::query_as(&format!(
            "SELECT {TABLE_COLUMNS} FROM encounter_tables WHERE owner_id = ? \
             ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?"
        ))
        .bind(&owner)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error("list_by_owner"))?;

        tx.commit().await.map_err(map_db_error("list_by_owner"))?;

        let tables = rows
            .into_iter()
            .map(EncounterTable::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((tables, total.max(0) as u64))
    }

    async fn update(&self, table: &EncounterTable) -> Result<(), RepoError> {
        let filters = serde_json::to_string(&table.filters).map_err(RepoError::serialization)?;
        let result = sqlx::query(
            r#"
            UPDATE encounter_tables
            SET name = ?, description = ?, filters = ?, is_public = ?, public_slug = ?,
                compact_ranges = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&table.name)
        .bind(&table.description)
        .bind(filters)
        .bind(table.is_public)
        .bind(table.public_slug.as_ref().map(PublicSlug::as_str))
        .bind(table.compact_ranges)
        .bind(table.updated_at)
        .bind(table.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error("update"))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("EncounterTable", table.id));
        }
        Ok(())
    }

    async fn replace_entries(
        &self,
        table_id: TableId,
        entries: &[EncounterTableEntry],
    ) -> Result<(), RepoError> {
        let id = table_id.to_string();
        let mut tx = self.pool.begin().await.map_err(map_db_error("replace_entries"))?;

        // Take the write lock first; a missing table aborts before any delete.
        let touched = sqlx::query("UPDATE encounter_tables SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error("replace_entries"))?;
        if touched.rows_affected() == 0 {
            return Err(RepoError::not_found("EncounterTable", table_id));
        }

        sqlx::query("DELETE FROM encounter_table_entries WHERE table_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error("replace_entries"))?;

        Self::insert_entries(&mut tx, entries).await?;

        tx.commit().await.map_err(map_db_error("replace_entries"))?;
        Ok(())
    }

    async fn delete(&self, id: TableId) -> Result<(), RepoError> {
        let key = id.to_string();
        let mut tx = self.pool.begin().await.map_err(map_db_error("delete"))?;

        sqlx::query("DELETE FROM encounter_table_entries WHERE table_id = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error("delete"))?;

        let result = sqlx::query("DELETE FROM encounter_tables WHERE id = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error("delete"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("EncounterTable", id));
        }

        tx.commit().await.map_err(map_db_error("delete"))?;
        Ok(())
    }

    async fn slug_exists(&self, slug: &PublicSlug) -> Result<bool, RepoError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM encounter_tables WHERE public_slug = ?)",
        )
        .bind(slug.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("slug_exists"))?;
        Ok(exists)
    }
}

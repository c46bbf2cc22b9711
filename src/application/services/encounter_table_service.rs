//! Encounter Table Service - Use cases for building, sharing and rerolling tables
//!
//! Entries are produced by the [`FilterResolver`] and [`TableEntryGenerator`]
//! and written through the repository in one transaction, so a table is
//! either stored with its complete entry set or not at all.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::errors::EncounterError;
use crate::application::ports::outbound::{
    EncounterTableRepositoryPort, SecureRandomPort, TableWithEntries,
};
use crate::application::services::access::{ensure_can_manage, ensure_can_view, Caller};
use crate::application::services::filter_resolver::FilterResolver;
use crate::application::services::slug_generator::SlugGenerator;
use crate::application::services::table_entry_generator::{RangeLayout, TableEntryGenerator};
use crate::application::services::table_name_generator::suggest_table_name;
use crate::domain::entities::{
    EncounterTable, EncounterTableEntry, MAX_TABLE_DESCRIPTION_LENGTH, MAX_TABLE_NAME_LENGTH,
    MIN_TABLE_NAME_LENGTH,
};
use crate::domain::value_objects::{
    DieSize, EncounterFilters, PublicSlug, TableId, UserId,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Request to create (or preview) a table
#[derive(Debug, Clone)]
pub struct CreateTableRequest {
    pub name: String,
    pub description: Option<String>,
    pub die_size: u32,
    pub filters: EncounterFilters,
    pub compact_ranges: bool,
    /// When false the table is stored without entries
    pub generate_immediately: bool,
}

/// Request to update table metadata. Entries are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTableRequest {
    pub name: Option<String>,
    /// An empty string clears the description
    pub description: Option<String>,
    pub filters: Option<EncounterFilters>,
}

/// Generated entries that were not persisted
#[derive(Debug, Clone)]
pub struct TablePreview {
    pub name: String,
    pub description: Option<String>,
    pub die_size: DieSize,
    pub filters: EncounterFilters,
    pub compact_ranges: bool,
    pub entries: Vec<EncounterTableEntry>,
}

#[derive(Debug, Clone)]
pub struct TablePage {
    pub tables: Vec<EncounterTable>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Result of a publish or unpublish request
#[derive(Debug, Clone)]
pub struct VisibilityChange {
    /// False when the table already had the requested visibility
    pub changed: bool,
    pub table: EncounterTable,
}

#[derive(Debug, Clone)]
pub struct CopiedTable {
    pub copy: TableWithEntries,
    pub original_table_id: TableId,
    pub original_slug: PublicSlug,
}

#[async_trait]
pub trait EncounterTableService: Send + Sync {
    /// Generate entries for a would-be table without storing anything
    async fn preview(
        &self,
        request: CreateTableRequest,
        viewer: Option<&Caller>,
    ) -> Result<TablePreview, EncounterError>;

    async fn create_table(
        &self,
        caller: &Caller,
        request: CreateTableRequest,
    ) -> Result<TableWithEntries, EncounterError>;

    async fn get_table(
        &self,
        id: TableId,
        viewer: Option<&Caller>,
    ) -> Result<TableWithEntries, EncounterError>;

    /// The caller's own tables, newest first. `page` is 1-based.
    async fn list_tables(
        &self,
        caller: &Caller,
        page: u32,
        limit: u32,
    ) -> Result<TablePage, EncounterError>;

    async fn update_table(
        &self,
        caller: &Caller,
        id: TableId,
        request: UpdateTableRequest,
    ) -> Result<EncounterTable, EncounterError>;

    async fn delete_table(&self, caller: &Caller, id: TableId) -> Result<(), EncounterError>;

    /// Replace every entry using the table's stored filters and layout
    async fn regenerate_entries(
        &self,
        caller: &Caller,
        id: TableId,
    ) -> Result<TableWithEntries, EncounterError>;

    async fn set_visibility(
        &self,
        caller: &Caller,
        id: TableId,
        is_public: bool,
    ) -> Result<VisibilityChange, EncounterError>;

    async fn get_public_table(&self, slug: &str) -> Result<TableWithEntries, EncounterError>;

    /// Duplicate a published table into the caller's collection
    async fn copy_public_table(
        &self,
        caller: &Caller,
        slug: &str,
    ) -> Result<CopiedTable, EncounterError>;

    fn suggest_name(&self) -> String;
}

pub struct EncounterTableServiceImpl {
    repository: Arc<dyn EncounterTableRepositoryPort>,
    resolver: FilterResolver,
    generator: TableEntryGenerator,
    slugs: SlugGenerator,
    rng: Arc<dyn SecureRandomPort>,
}

impl EncounterTableServiceImpl {
    pub fn new(
        repository: Arc<dyn EncounterTableRepositoryPort>,
        resolver: FilterResolver,
        generator: TableEntryGenerator,
        slugs: SlugGenerator,
        rng: Arc<dyn SecureRandomPort>,
    ) -> Self {
        Self {
            repository,
            resolver,
            generator,
            slugs,
            rng,
        }
    }

    fn validate_name(name: &str) -> Result<(), EncounterError> {
        let length = name.trim().chars().count();
        if length < MIN_TABLE_NAME_LENGTH {
            return Err(EncounterError::validation(
                "Table name must be at least 3 characters",
            ));
        }
        if length > MAX_TABLE_NAME_LENGTH {
            return Err(EncounterError::validation(
                "Table name cannot exceed 100 characters",
            ));
        }
        Ok(())
    }

    fn validate_description(description: Option<&str>) -> Result<(), EncounterError> {
        if description.is_some_and(|d| d.chars().count() > MAX_TABLE_DESCRIPTION_LENGTH) {
            return Err(EncounterError::validation(
                "Description cannot exceed 500 characters",
            ));
        }
        Ok(())
    }

    fn validate_create_request(request: &CreateTableRequest) -> Result<DieSize, EncounterError> {
        Self::validate_name(&request.name)?;
        Self::validate_description(request.description.as_deref())?;
        request.filters.validate()?;
        Ok(DieSize::new(request.die_size)?)
    }

    fn validate_update_request(request: &UpdateTableRequest) -> Result<(), EncounterError> {
        if let Some(ref name) = request.name {
            Self::validate_name(name)?;
        }
        Self::validate_description(request.description.as_deref())?;
        if let Some(ref filters) = request.filters {
            filters.validate()?;
        }
        Ok(())
    }

    fn clean_description(description: Option<String>) -> Option<String> {
        description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
    }

    async fn build_entries(
        &self,
        table_id: TableId,
        die: DieSize,
        filters: &EncounterFilters,
        compact: bool,
        viewer: Option<UserId>,
    ) -> Result<Vec<EncounterTableEntry>, EncounterError> {
        let pool = self.resolver.resolve_candidates(filters, viewer).await?;
        self.generator.generate_entries(
            table_id,
            die,
            &pool,
            RangeLayout::from_compact_flag(compact),
        )
    }

    async fn load_table(&self, id: TableId) -> Result<EncounterTable, EncounterError> {
        self.repository
            .get(id)
            .await?
            .ok_or(EncounterError::NotFound("Encounter table"))
    }

    async fn load_public(&self, slug: &str) -> Result<TableWithEntries, EncounterError> {
        let slug = PublicSlug::parse(slug).map_err(|e| EncounterError::validation(e.to_string()))?;
        self.repository
            .get_public_by_slug(&slug)
            .await?
            .ok_or(EncounterError::NotFound("Public encounter table"))
    }
}

#[async_trait]
impl EncounterTableService for EncounterTableServiceImpl {
    #[instrument(skip(self, request, viewer), fields(die_size = request.die_size))]
    async fn preview(
        &self,
        request: CreateTableRequest,
        viewer: Option<&Caller>,
    ) -> Result<TablePreview, EncounterError> {
        let die = Self::validate_create_request(&request)?;
        let entries = self
            .build_entries(
                TableId::new(),
                die,
                &request.filters,
                request.compact_ranges,
                viewer.map(|c| c.user_id),
            )
            .await?;

        debug!(entry_count = entries.len(), "Generated preview");
        Ok(TablePreview {
            name: request.name.trim().to_string(),
            description: Self::clean_description(request.description),
            die_size: die,
            filters: request.filters,
            compact_ranges: request.compact_ranges,
            entries,
        })
    }

    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id, die_size = request.die_size))]
    async fn create_table(
        &self,
        caller: &Caller,
        request: CreateTableRequest,
    ) -> Result<TableWithEntries, EncounterError> {
        let die = Self::validate_create_request(&request)?;

        let mut table = EncounterTable::new(
            caller.user_id,
            request.name.trim(),
            die,
            request.filters,
        )
        .with_compact_ranges(request.compact_ranges);
        table.description = Self::clean_description(request.description);

        let entries = if request.generate_immediately {
            self.build_entries(
                table.id,
                die,
                &table.filters,
                table.compact_ranges,
                Some(caller.user_id),
            )
            .await?
        } else {
            Vec::new()
        };

        self.repository.create(&table, &entries).await?;

        info!(table_id = %table.id, entry_count = entries.len(), "Created encounter table: {}", table.name);
        Ok(TableWithEntries { table, entries })
    }

    #[instrument(skip(self, viewer))]
    async fn get_table(
        &self,
        id: TableId,
        viewer: Option<&Caller>,
    ) -> Result<TableWithEntries, EncounterError> {
        let loaded = self
            .repository
            .get_with_entries(id)
            .await?
            .ok_or(EncounterError::NotFound("Encounter table"))?;
        ensure_can_view(&loaded.table, viewer)?;
        Ok(loaded)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    async fn list_tables(
        &self,
        caller: &Caller,
        page: u32,
        limit: u32,
    ) -> Result<TablePage, EncounterError> {
        if page < 1 {
            return Err(EncounterError::validation("Page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(EncounterError::validation(
                "Limit must be between 1 and 100",
            ));
        }

        let offset = u64::from(page - 1) * u64::from(limit);
        let (tables, total) = self
            .repository
            .list_by_owner(caller.user_id, offset, u64::from(limit))
            .await?;

        debug!(count = tables.len(), total, "Listed encounter tables");
        Ok(TablePage {
            tables,
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self, caller, request), fields(table_id = %id))]
    async fn update_table(
        &self,
        caller: &Caller,
        id: TableId,
        request: UpdateTableRequest,
    ) -> Result<EncounterTable, EncounterError> {
        Self::validate_update_request(&request)?;

        let mut table = self.load_table(id).await?;
        ensure_can_manage(&table, caller)?;

        if let Some(name) = request.name {
            table.rename(name.trim());
        }
        if let Some(description) = request.description {
            table.update_description(Self::clean_description(Some(description)));
        }
        if let Some(filters) = request.filters {
            table.update_filters(filters);
        }

        self.repository.update(&table).await?;
        info!(table_id = %table.id, "Updated encounter table");
        Ok(table)
    }

    #[instrument(skip(self, caller), fields(table_id = %id))]
    async fn delete_table(&self, caller: &Caller, id: TableId) -> Result<(), EncounterError> {
        let table = self.load_table(id).await?;
        ensure_can_manage(&table, caller)?;

        self.repository.delete(id).await?;
        info!(table_id = %id, "Deleted encounter table: {}", table.name);
        Ok(())
    }

    #[instrument(skip(self, caller), fields(table_id = %id))]
    async fn regenerate_entries(
        &self,
        caller: &Caller,
        id: TableId,
    ) -> Result<TableWithEntries, EncounterError> {
        let table = self.load_table(id).await?;
        ensure_can_manage(&table, caller)?;

        // The owner's homebrew stays eligible even when an admin rerolls.
        let entries = self
            .build_entries(
                table.id,
                table.die_size,
                &table.filters,
                table.compact_ranges,
                Some(table.owner_id),
            )
            .await?;

        self.repository.replace_entries(table.id, &entries).await?;

        info!(table_id = %table.id, entry_count = entries.len(), "Regenerated encounter table entries");
        let table = self.load_table(id).await?;
        Ok(TableWithEntries { table, entries })
    }

    #[instrument(skip(self, caller), fields(table_id = %id))]
    async fn set_visibility(
        &self,
        caller: &Caller,
        id: TableId,
        is_public: bool,
    ) -> Result<VisibilityChange, EncounterError> {
        let mut table = self.load_table(id).await?;
        ensure_can_manage(&table, caller)?;

        if table.is_public == is_public {
            return Ok(VisibilityChange {
                changed: false,
                table,
            });
        }

        if is_public {
            let slug = match table.public_slug.clone() {
                Some(existing) => existing,
                None => self.slugs.unique_slug().await?,
            };
            table.publish(slug);
        } else {
            table.unpublish();
        }

        self.repository.update(&table).await?;
        info!(table_id = %table.id, is_public, "Changed encounter table visibility");
        Ok(VisibilityChange {
            changed: true,
            table,
        })
    }

    #[instrument(skip(self))]
    async fn get_public_table(&self, slug: &str) -> Result<TableWithEntries, EncounterError> {
        let loaded = self.load_public(slug).await?;
        if loaded.entries.is_empty() {
            return Err(EncounterError::NotFound("Public encounter table"));
        }
        Ok(loaded)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id))]
    async fn copy_public_table(
        &self,
        caller: &Caller,
        slug: &str,
    ) -> Result<CopiedTable, EncounterError> {
        let source = self.load_public(slug).await?;

        if source.entries.is_empty() {
            return Err(EncounterError::validation(
                "Cannot copy table without entries",
            ));
        }
        if source.table.is_owned_by(caller.user_id) {
            return Err(EncounterError::validation("Cannot copy your own table"));
        }

        let table = source.table.copy_for(caller.user_id);
        let entries: Vec<_> = source
            .entries
            .iter()
            .map(|entry| entry.copy_to(table.id))
            .collect();
        self.repository.create(&table, &entries).await?;

        info!(
            table_id = %table.id,
            original_table_id = %source.table.id,
            "Copied public encounter table"
        );
        Ok(CopiedTable {
            copy: TableWithEntries { table, entries },
            original_table_id: source.table.id,
            original_slug: source
                .table
                .public_slug
                .ok_or(EncounterError::NotFound("Public encounter table"))?,
        })
    }

    fn suggest_name(&self) -> String {
        suggest_table_name(self.rng.as_ref())
    }
}

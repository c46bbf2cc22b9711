use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::application::ports::outbound::TableWithEntries;
use crate::application::services::{
    CopiedTable, CreateTableRequest, RollOutcome, RollRange, TablePage, TablePreview,
    UpdateTableRequest, VisibilityChange, DEFAULT_PAGE_SIZE,
};
use crate::domain::entities::{EncounterTable, EncounterTableEntry, MonsterSnapshot};
use crate::domain::value_objects::{EncounterFilters, MonsterSource};

// ============================================================================
// Request DTOs
// ============================================================================

/// Filter criteria as submitted by the table builder
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_filter_dto"))]
pub struct EncounterFiltersDto {
    #[serde(default)]
    #[validate(range(min = 1, max = 20, message = "Challenge level must be between 1 and 20"))]
    pub min_challenge_level: Option<u8>,
    #[serde(default)]
    #[validate(range(min = 1, max = 20, message = "Challenge level must be between 1 and 20"))]
    pub max_challenge_level: Option<u8>,
    #[serde(default)]
    pub monster_types: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub source: MonsterSource,
    #[serde(default)]
    #[validate(length(max = 100, message = "Search query cannot exceed 100 characters"))]
    pub search_query: Option<String>,
}

fn validate_filter_dto(dto: &EncounterFiltersDto) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (dto.min_challenge_level, dto.max_challenge_level) {
        if min > max {
            let mut err = ValidationError::new("level_range");
            err.message = Some(Cow::Borrowed(
                "Minimum level must be less than or equal to maximum level",
            ));
            return Err(err);
        }
    }
    if dto
        .monster_types
        .iter()
        .chain(dto.locations.iter())
        .any(|tag| tag.trim().is_empty())
    {
        let mut err = ValidationError::new("empty_tag");
        err.message = Some(Cow::Borrowed("Type and location tags must be non-empty"));
        return Err(err);
    }
    Ok(())
}

impl From<EncounterFiltersDto> for EncounterFilters {
    fn from(dto: EncounterFiltersDto) -> Self {
        Self {
            min_challenge_level: dto.min_challenge_level,
            max_challenge_level: dto.max_challenge_level,
            monster_types: dto.monster_types,
            locations: dto.locations,
            source: dto.source,
            search_query: dto.search_query,
        }
    }
}

/// Body of create and preview requests
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEncounterTableRequestDto {
    #[validate(length(min = 3, max = 100, message = "Table name must be between 3 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 2, max = 1000, message = "Die size must be between 2 and 1000"))]
    pub die_size: u32,
    #[serde(default)]
    #[validate(nested)]
    pub filters: EncounterFiltersDto,
    #[serde(default)]
    pub compact_ranges: bool,
    #[serde(default)]
    pub generate_immediately: Option<bool>,
}

impl From<CreateEncounterTableRequestDto> for CreateTableRequest {
    fn from(dto: CreateEncounterTableRequestDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            die_size: dto.die_size,
            filters: dto.filters.into(),
            compact_ranges: dto.compact_ranges,
            generate_immediately: dto.generate_immediately.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEncounterTableRequestDto {
    #[serde(default)]
    #[validate(length(min = 3, max = 100, message = "Table name must be between 3 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub filters: Option<EncounterFiltersDto>,
}

impl From<UpdateEncounterTableRequestDto> for UpdateTableRequest {
    fn from(dto: UpdateEncounterTableRequestDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            filters: dto.filters.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShareTableRequestDto {
    pub is_public: bool,
}

/// `?page=&limit=` on list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EncounterTableEntryResponseDto {
    pub id: String,
    pub table_id: String,
    pub roll_number: u32,
    pub roll_min: u32,
    pub roll_max: u32,
    pub monster_id: Option<String>,
    pub monster_snapshot: MonsterSnapshot,
    pub encounter_description: String,
}

impl From<EncounterTableEntry> for EncounterTableEntryResponseDto {
    fn from(entry: EncounterTableEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            table_id: entry.table_id.to_string(),
            roll_number: entry.roll_number,
            roll_min: entry.roll_min,
            roll_max: entry.roll_max,
            monster_id: entry.monster_id.map(|id| id.to_string()),
            monster_snapshot: entry.monster,
            encounter_description: entry.encounter_description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EncounterTableResponseDto {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub die_size: u32,
    pub filters: EncounterFilters,
    pub is_public: bool,
    pub public_slug: Option<String>,
    pub compact_ranges: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<EncounterTableEntryResponseDto>>,
}

impl From<EncounterTable> for EncounterTableResponseDto {
    fn from(table: EncounterTable) -> Self {
        Self {
            id: table.id.to_string(),
            user_id: table.owner_id.to_string(),
            name: table.name,
            description: table.description,
            die_size: table.die_size.get(),
            filters: table.filters,
            is_public: table.is_public,
            public_slug: table.public_slug.map(String::from),
            compact_ranges: table.compact_ranges,
            created_at: table.created_at,
            updated_at: table.updated_at,
            entries: None,
        }
    }
}

impl From<TableWithEntries> for EncounterTableResponseDto {
    fn from(loaded: TableWithEntries) -> Self {
        Self {
            entries: Some(loaded.entries.into_iter().map(Into::into).collect()),
            ..Self::from(loaded.table)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponseDto {
    pub preview: PreviewBodyDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewBodyDto {
    pub name: String,
    pub description: Option<String>,
    pub die_size: u32,
    pub filters: EncounterFilters,
    pub compact_ranges: bool,
    pub entries: Vec<EncounterTableEntryResponseDto>,
}

impl From<TablePreview> for PreviewResponseDto {
    fn from(preview: TablePreview) -> Self {
        Self {
            preview: PreviewBodyDto {
                name: preview.name,
                description: preview.description,
                die_size: preview.die_size.get(),
                filters: preview.filters,
                compact_ranges: preview.compact_ranges,
                entries: preview.entries.into_iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RollResultDto {
    pub roll: u32,
    #[serde(rename = "rollRange")]
    pub roll_range: RollRange,
    pub encounter_description: String,
    pub entry: EncounterTableEntryResponseDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollTableRefDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollResponseDto {
    pub result: RollResultDto,
    pub table: RollTableRefDto,
}

impl From<RollOutcome> for RollResponseDto {
    fn from(outcome: RollOutcome) -> Self {
        Self {
            result: RollResultDto {
                roll: outcome.roll,
                roll_range: outcome.roll_range,
                encounter_description: outcome.entry.encounter_description.clone(),
                entry: outcome.entry.into(),
            },
            table: RollTableRefDto {
                id: outcome.table_id.to_string(),
                name: outcome.table_name,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorDto {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicTableMetaDto {
    pub is_public: bool,
    pub entry_count: usize,
    pub author: AuthorDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicTableResponseDto {
    pub table: EncounterTableResponseDto,
    pub meta: PublicTableMetaDto,
}

impl From<TableWithEntries> for PublicTableResponseDto {
    fn from(loaded: TableWithEntries) -> Self {
        let meta = PublicTableMetaDto {
            is_public: loaded.table.is_public,
            entry_count: loaded.entries.len(),
            author: AuthorDto {
                id: loaded.table.owner_id.to_string(),
            },
        };
        Self {
            table: loaded.into(),
            meta,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationMetaDto {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedTablesResponseDto {
    pub data: Vec<EncounterTableResponseDto>,
    pub pagination: PaginationMetaDto,
}

impl From<TablePage> for PaginatedTablesResponseDto {
    fn from(page: TablePage) -> Self {
        Self {
            data: page.tables.into_iter().map(Into::into).collect(),
            pagination: PaginationMetaDto {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total.div_ceil(u64::from(page.limit.max(1))),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareTableResponseDto {
    pub message: String,
    pub is_public: bool,
    pub public_slug: Option<String>,
}

impl From<VisibilityChange> for ShareTableResponseDto {
    fn from(change: VisibilityChange) -> Self {
        let state = if change.table.is_public { "public" } else { "private" };
        let message = if change.changed {
            format!("Table is now {state}")
        } else {
            format!("Table is already {state}")
        };
        Self {
            message,
            is_public: change.table.is_public,
            public_slug: change.table.public_slug.map(String::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyMetaDto {
    pub original_table_id: String,
    pub original_slug: String,
    pub entries_copied: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyTableResponseDto {
    pub message: String,
    pub table: EncounterTableResponseDto,
    pub meta: CopyMetaDto,
}

impl From<CopiedTable> for CopyTableResponseDto {
    fn from(copied: CopiedTable) -> Self {
        let meta = CopyMetaDto {
            original_table_id: copied.original_table_id.to_string(),
            original_slug: copied.original_slug.into(),
            entries_copied: copied.copy.entries.len(),
        };
        Self {
            message: "Table copied successfully".to_string(),
            table: copied.copy.into(),
            meta,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NameSuggestionResponseDto {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dto_defaults() {
        let dto: CreateEncounterTableRequestDto =
            serde_json::from_str(r#"{"name":"Crypts","die_size":6}"#).unwrap();
        assert!(dto.validate().is_ok());

        let request: CreateTableRequest = dto.into();
        assert!(request.generate_immediately);
        assert!(!request.compact_ranges);
        assert_eq!(request.filters, EncounterFilters::default());
    }

    #[test]
    fn test_create_dto_rejects_out_of_range() {
        let dto: CreateEncounterTableRequestDto =
            serde_json::from_str(r#"{"name":"ab","die_size":1}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("die_size"));
    }

    #[test]
    fn test_nested_filter_errors_surface() {
        let dto: CreateEncounterTableRequestDto = serde_json::from_str(
            r#"{"name":"Crypts","die_size":6,"filters":{"min_challenge_level":9,"max_challenge_level":3}}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());

        let dto: CreateEncounterTableRequestDto = serde_json::from_str(
            r#"{"name":"Crypts","die_size":6,"filters":{"monster_types":[" "]}}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_roll_response_uses_camel_case_range() {
        use crate::domain::entities::Monster;
        use crate::domain::value_objects::TableId;

        let table_id = TableId::new();
        let entry = EncounterTableEntry::single(table_id, 4, &Monster::official("Goblin", 1));
        let dto: RollResponseDto = RollOutcome {
            roll: 4,
            roll_range: RollRange { min: 1, max: 6 },
            entry,
            table_id,
            table_name: "Warrens".into(),
        }
        .into();

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["result"]["roll"], 4);
        assert_eq!(json["result"]["rollRange"], serde_json::json!({ "min": 1, "max": 6 }));
        assert_eq!(json["result"]["encounter_description"], "Goblin (level 1)");
        assert_eq!(json["table"]["name"], "Warrens");
    }

    #[test]
    fn test_share_message() {
        let table = EncounterTable::new(
            crate::domain::value_objects::UserId::new(),
            "Halls",
            crate::domain::value_objects::DieSize::new(6).unwrap(),
            EncounterFilters::default(),
        );
        let dto: ShareTableResponseDto = VisibilityChange {
            changed: false,
            table,
        }
        .into();
        assert_eq!(dto.message, "Table is already private");
        assert!(dto.public_slug.is_none());
    }
}

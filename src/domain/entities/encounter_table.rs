//! Encounter table aggregate - A die paired with generated monster entries
//!
//! An [`EncounterTable`] exclusively owns its [`EncounterTableEntry`] rows.
//! Entries are created with the table or replaced wholesale; they are never
//! patched one at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Monster, MonsterSnapshot};
use crate::domain::value_objects::{
    DieSize, EncounterFilters, EntryId, MonsterId, PublicSlug, TableId, UserId,
};

pub const MIN_TABLE_NAME_LENGTH: usize = 3;
pub const MAX_TABLE_NAME_LENGTH: usize = 100;
pub const MAX_TABLE_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterTable {
    pub id: TableId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub die_size: DieSize,
    pub filters: EncounterFilters,
    pub is_public: bool,
    /// Assigned on first publish and never changed afterwards
    pub public_slug: Option<PublicSlug>,
    /// Merge consecutive rolls that drew the same monster into one range
    pub compact_ranges: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EncounterTable {
    pub fn new(
        owner_id: UserId,
        name: impl Into<String>,
        die_size: DieSize,
        filters: EncounterFilters,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TableId::new(),
            owner_id,
            name: name.into(),
            description: None,
            die_size,
            filters,
            is_public: false,
            public_slug: None,
            compact_ranges: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_compact_ranges(mut self, compact: bool) -> Self {
        self.compact_ranges = compact;
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn update_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn update_filters(&mut self, filters: EncounterFilters) {
        self.filters = filters;
        self.touch();
    }

    /// Make the table public. An existing slug is kept; `slug` is only used
    /// when the table has never been published.
    pub fn publish(&mut self, slug: PublicSlug) -> &PublicSlug {
        self.is_public = true;
        self.touch();
        self.public_slug.get_or_insert(slug)
    }

    /// Hide the table. The slug is retained so republishing restores the
    /// same link.
    pub fn unpublish(&mut self) {
        self.is_public = false;
        self.touch();
    }

    /// A private duplicate owned by `owner_id`
    pub fn copy_for(&self, owner_id: UserId) -> Self {
        let name = format!("{} (Copy)", self.name);
        let name: String = name.chars().take(MAX_TABLE_NAME_LENGTH).collect();
        let mut copy = Self::new(owner_id, name, self.die_size, self.filters.clone())
            .with_compact_ranges(self.compact_ranges);
        copy.description = self.description.clone();
        copy
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
impl EncounterTable {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One roll range of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterTableEntry {
    pub id: EntryId,
    pub table_id: TableId,
    /// 1-based position in the table
    pub roll_number: u32,
    pub roll_min: u32,
    pub roll_max: u32,
    /// Catalog reference; may dangle once the monster is deleted
    pub monster_id: Option<MonsterId>,
    pub monster: MonsterSnapshot,
    pub encounter_description: String,
}

impl EncounterTableEntry {
    /// An entry covering exactly one roll value
    pub fn single(table_id: TableId, roll: u32, monster: &Monster) -> Self {
        Self::ranged(table_id, roll, roll, roll, monster)
    }

    pub fn ranged(
        table_id: TableId,
        roll_number: u32,
        roll_min: u32,
        roll_max: u32,
        monster: &Monster,
    ) -> Self {
        let snapshot = monster.snapshot();
        Self {
            id: EntryId::new(),
            table_id,
            roll_number,
            roll_min,
            roll_max,
            monster_id: Some(monster.id),
            encounter_description: snapshot.encounter_description(),
            monster: snapshot,
        }
    }

    pub fn contains(&self, roll: u32) -> bool {
        (self.roll_min..=self.roll_max).contains(&roll)
    }

    /// Same roll layout and monster, re-parented onto another table
    pub fn copy_to(&self, table_id: TableId) -> Self {
        Self {
            id: EntryId::new(),
            table_id,
            ..self.clone()
        }
    }
}

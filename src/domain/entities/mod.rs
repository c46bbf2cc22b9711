//! Domain entities - Core business objects with identity

mod encounter_table;
mod monster;

pub use encounter_table::{
    EncounterTable, EncounterTableEntry, MAX_TABLE_DESCRIPTION_LENGTH, MAX_TABLE_NAME_LENGTH,
    MIN_TABLE_NAME_LENGTH,
};
pub use monster::{ContentSource, Monster, MonsterSnapshot};

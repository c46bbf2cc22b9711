//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: EncounterTable, EncounterTableEntry, Monster
//! - Value Objects: DieSize, EncounterFilters, PublicSlug, typed IDs
//! - Domain Services: roll coverage checks and range compaction

pub mod entities;
pub mod services;
pub mod value_objects;

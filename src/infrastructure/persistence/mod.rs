//! SQLite persistence adapters
//!
//! Encounter tables and their entries are stored through the repository
//! port; the monster catalog adapter only reads (and seeds) monsters.

mod connection;
mod encounter_table_repository;
mod monster_catalog;

#[cfg(test)]
pub use connection::memory_pool;
pub use connection::{connect, initialize_schema};
pub use encounter_table_repository::SqliteEncounterTableRepository;
pub use monster_catalog::SqliteMonsterCatalog;

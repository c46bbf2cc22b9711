//! Outbound ports - Interfaces that the application requires from external systems

mod encounter_table_repository_port;
mod monster_catalog_port;
mod random_port;

pub use encounter_table_repository_port::{
    EncounterTableRepositoryPort, RepoError, TableWithEntries,
};
#[cfg(test)]
pub use monster_catalog_port::MockMonsterCatalogPort;
pub use monster_catalog_port::{CatalogError, MonsterCatalogPort, MonsterQuery};
#[cfg(test)]
pub use random_port::FixedRandomPort;
pub use random_port::SecureRandomPort;

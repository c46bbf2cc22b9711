//! Table Entry Generator - Tiles a die's faces with randomly picked monsters

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::application::errors::EncounterError;
use crate::application::ports::outbound::SecureRandomPort;
use crate::domain::entities::{EncounterTableEntry, Monster};
use crate::domain::services::{compact_ranges, verify_coverage};
use crate::domain::value_objects::{DieSize, TableId};

/// How picked monsters are laid out over the die's faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeLayout {
    /// One entry per face
    #[default]
    PerRoll,
    /// Consecutive faces that drew the same monster share one entry
    Compact,
}

impl RangeLayout {
    pub fn from_compact_flag(compact: bool) -> Self {
        if compact {
            Self::Compact
        } else {
            Self::PerRoll
        }
    }
}

#[derive(Clone)]
pub struct TableEntryGenerator {
    rng: Arc<dyn SecureRandomPort>,
}

impl TableEntryGenerator {
    pub fn new(rng: Arc<dyn SecureRandomPort>) -> Self {
        Self { rng }
    }

    /// Pick a monster for every face of `die` (uniformly, with replacement)
    /// and return the entries sorted by `roll_min`.
    #[instrument(skip(self, pool), fields(table_id = %table_id, die_size = die.get(), pool_size = pool.len()))]
    pub fn generate_entries(
        &self,
        table_id: TableId,
        die: DieSize,
        pool: &[Monster],
        layout: RangeLayout,
    ) -> Result<Vec<EncounterTableEntry>, EncounterError> {
        if pool.is_empty() {
            return Err(EncounterError::InsufficientCandidates { found: 0 });
        }
        let last_index = (pool.len() - 1) as u32;

        let mut entries: Vec<EncounterTableEntry> = (1..=die.get())
            .map(|roll| {
                let pick = &pool[self.rng.random_range(0, last_index) as usize];
                EncounterTableEntry::single(table_id, roll, pick)
            })
            .collect();

        if layout == RangeLayout::Compact {
            entries = compact_ranges(entries);
        }

        verify_coverage(die, &entries).map_err(|e| {
            error!(error = %e, "Generated entries failed the coverage check");
            EncounterError::DataIntegrity {
                table_id,
                reason: e.to_string(),
            }
        })?;

        Ok(entries)
    }
}

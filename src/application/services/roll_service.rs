//! Roll Executor - Rolls a stored table's die and finds the matching entry

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::application::errors::EncounterError;
use crate::application::ports::outbound::{EncounterTableRepositoryPort, SecureRandomPort};
use crate::application::services::access::{ensure_can_view, Caller};
use crate::application::services::dice;
use crate::domain::entities::EncounterTableEntry;
use crate::domain::services::{find_entry, verify_coverage};
use crate::domain::value_objects::TableId;

/// Inclusive span of faces the die can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone)]
pub struct RollOutcome {
    pub roll: u32,
    pub roll_range: RollRange,
    pub entry: EncounterTableEntry,
    pub table_id: TableId,
    pub table_name: String,
}

#[derive(Clone)]
pub struct RollService {
    repository: Arc<dyn EncounterTableRepositoryPort>,
    rng: Arc<dyn SecureRandomPort>,
}

impl RollService {
    pub fn new(
        repository: Arc<dyn EncounterTableRepositoryPort>,
        rng: Arc<dyn SecureRandomPort>,
    ) -> Self {
        Self { repository, rng }
    }

    #[instrument(skip(self, caller), fields(table_id = %table_id))]
    pub async fn roll_table(
        &self,
        table_id: TableId,
        caller: Option<&Caller>,
    ) -> Result<RollOutcome, EncounterError> {
        let loaded = self
            .repository
            .get_with_entries(table_id)
            .await?
            .ok_or(EncounterError::NotFound("Encounter table"))?;

        ensure_can_view(&loaded.table, caller)?;

        if loaded.entries.is_empty() {
            return Err(EncounterError::NotFound("Encounter table entries"));
        }

        let die = loaded.table.die_size;
        verify_coverage(die, &loaded.entries).map_err(|e| {
            error!(error = %e, "Stored entries do not cover the die");
            EncounterError::DataIntegrity {
                table_id,
                reason: e.to_string(),
            }
        })?;

        let roll = dice::roll(self.rng.as_ref(), die);
        let entry = find_entry(&loaded.entries, roll).cloned().ok_or_else(|| {
            error!(roll, "No entry contains the rolled value");
            EncounterError::DataIntegrity {
                table_id,
                reason: format!("no entry contains roll {roll}"),
            }
        })?;

        debug!(roll, roll_number = entry.roll_number, "Rolled on table");
        Ok(RollOutcome {
            roll,
            roll_range: RollRange {
                min: 1,
                max: die.get(),
            },
            entry,
            table_id,
            table_name: loaded.table.name,
        })
    }
}

//! Caller identity and table access rules

use crate::application::errors::EncounterError;
use crate::domain::entities::EncounterTable;
use crate::domain::value_objects::UserId;

/// An authenticated caller as forwarded by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    pub fn can_manage(&self, table: &EncounterTable) -> bool {
        self.is_admin || table.is_owned_by(self.user_id)
    }
}

/// Public tables are visible to everyone; private ones to the owner and admins
pub fn ensure_can_view(
    table: &EncounterTable,
    caller: Option<&Caller>,
) -> Result<(), EncounterError> {
    if table.is_public || caller.is_some_and(|c| c.can_manage(table)) {
        Ok(())
    } else {
        Err(EncounterError::forbidden("This table is private"))
    }
}

pub fn ensure_can_manage(table: &EncounterTable, caller: &Caller) -> Result<(), EncounterError> {
    if caller.can_manage(table) {
        Ok(())
    } else {
        Err(EncounterError::forbidden("You can only modify your own tables"))
    }
}

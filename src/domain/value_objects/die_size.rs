//! Die size value object
//!
//! Encounter tables are rolled with a single die. Standard polyhedral dice
//! (d4 through d100) are the common case, but any size in
//! [`MIN_DIE_SIZE`, `MAX_DIE_SIZE`] is accepted. The upper bound is a
//! performance guard, not a ruleset requirement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_DIE_SIZE: u32 = 2;
pub const MAX_DIE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Die size must be between {MIN_DIE_SIZE} and {MAX_DIE_SIZE}, got {0}")]
pub struct InvalidDieSize(pub u32);

/// Number of faces on the die used to roll a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DieSize(u32);

impl DieSize {
    pub fn new(sides: u32) -> Result<Self, InvalidDieSize> {
        if !(MIN_DIE_SIZE..=MAX_DIE_SIZE).contains(&sides) {
            return Err(InvalidDieSize(sides));
        }
        Ok(Self(sides))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for DieSize {
    type Error = InvalidDieSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DieSize> for u32 {
    fn from(die: DieSize) -> u32 {
        die.0
    }
}

impl std::fmt::Display for DieSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(DieSize::new(1).is_err());
        assert!(DieSize::new(0).is_err());
        assert!(DieSize::new(1001).is_err());
        assert_eq!(DieSize::new(2).unwrap().get(), 2);
        assert_eq!(DieSize::new(1000).unwrap().get(), 1000);
    }

    #[test]
    fn test_standard_and_custom_sizes() {
        for sides in [4, 6, 8, 10, 12, 20, 100, 7, 37] {
            assert_eq!(DieSize::new(sides).unwrap().to_string(), format!("d{sides}"));
        }
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<DieSize>("1001").is_err());
        assert_eq!(serde_json::from_str::<DieSize>("20").unwrap().to_string(), "d20");
    }
}

//! Secure dice primitives
//!
//! All rolls come from a [`SecureRandomPort`]; the production adapter wraps
//! the OS CSPRNG with unbiased range sampling.

#[cfg(test)]
use std::collections::BTreeMap;

use thiserror::Error;

use crate::application::ports::outbound::SecureRandomPort;
use crate::domain::value_objects::{DieSize, InvalidDieSize};

pub const MAX_ROLL_COUNT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error(transparent)]
    InvalidDieSize(#[from] InvalidDieSize),
    #[error("Count must be between 1 and {MAX_ROLL_COUNT}, got {0}")]
    InvalidCount(u32),
}

/// One roll of an already validated die, in `[1, die]`
pub fn roll(rng: &dyn SecureRandomPort, die: DieSize) -> u32 {
    rng.random_range(1, die.get())
}

/// Roll a die given as a raw face count. Out-of-range sizes are rejected,
/// never clamped.
pub fn roll_die(rng: &dyn SecureRandomPort, die_size: u32) -> Result<u32, DiceError> {
    let die = DieSize::new(die_size)?;
    Ok(roll(rng, die))
}

pub fn roll_many(
    rng: &dyn SecureRandomPort,
    die_size: u32,
    count: u32,
) -> Result<Vec<u32>, DiceError> {
    let die = DieSize::new(die_size)?;
    if !(1..=MAX_ROLL_COUNT).contains(&count) {
        return Err(DiceError::InvalidCount(count));
    }
    Ok((0..count).map(|_| roll(rng, die)).collect())
}

/// Roll `iterations` times and count how often each face came up. Every
/// face is present in the result, including those never rolled.
#[cfg(test)]
pub fn simulate_rolls(
    rng: &dyn SecureRandomPort,
    die_size: u32,
    iterations: u32,
) -> Result<BTreeMap<u32, u32>, DiceError> {
    let die = DieSize::new(die_size)?;
    let mut frequencies: BTreeMap<u32, u32> = (1..=die.get()).map(|face| (face, 0)).collect();
    for _ in 0..iterations {
        *frequencies.entry(roll(rng, die)).or_insert(0) += 1;
    }
    Ok(frequencies)
}

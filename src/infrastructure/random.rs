//! Operating-system randomness for dice, slugs and table generation

use rand::rngs::OsRng;
use rand::Rng;

use crate::application::ports::outbound::SecureRandomPort;

/// Draws every value from the OS CSPRNG. Stateless, so it can be shared
/// across tasks without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngAdapter;

impl OsRngAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl SecureRandomPort for OsRngAdapter {
    fn random_range(&self, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max, "empty range {min}..={max}");
        if min == max {
            return min;
        }
        OsRng.gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_within_inclusive_bounds() {
        let rng = OsRngAdapter::new();
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..2_000 {
            let value = rng.random_range(1, 4);
            assert!((1..=4).contains(&value));
            saw_min |= value == 1;
            saw_max |= value == 4;
        }
        assert!(saw_min && saw_max);
    }

    #[test]
    fn test_degenerate_range() {
        let rng = OsRngAdapter::new();
        assert_eq!(rng.random_range(7, 7), 7);
        assert_eq!(rng.random_range(0, 0), 0);
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn test_inverted_range_panics_in_debug() {
        OsRngAdapter::new().random_range(5, 2);
    }
}

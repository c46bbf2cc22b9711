//! Secure random number port
//!
//! Every random decision in the engine (monster picks, die rolls, slug
//! symbols) goes through this port so tests can substitute a fixed sequence.

/// Source of uniformly distributed integers backed by a CSPRNG
pub trait SecureRandomPort: Send + Sync {
    /// Uniform integer in `[min, max]`, both inclusive. Callers guarantee
    /// `min <= max`.
    fn random_range(&self, min: u32, max: u32) -> u32;
}

#[cfg(test)]
pub use fixed::FixedRandomPort;

#[cfg(test)]
mod fixed {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::SecureRandomPort;

    /// Replays `values` in order, wrapping around, clamped into the
    /// requested range.
    pub struct FixedRandomPort {
        values: Vec<u32>,
        cursor: AtomicUsize,
    }

    impl FixedRandomPort {
        pub fn new(values: Vec<u32>) -> Self {
            assert!(!values.is_empty(), "FixedRandomPort needs at least one value");
            Self {
                values,
                cursor: AtomicUsize::new(0),
            }
        }
    }

    impl SecureRandomPort for FixedRandomPort {
        fn random_range(&self, min: u32, max: u32) -> u32 {
            let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
            self.values[idx].clamp(min, max)
        }
    }
}

//! Domain services - Pure rules that span several entities

pub mod coverage;

pub use coverage::{compact_ranges, find_entry, verify_coverage};

//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the HTTP adapter can
//! serialize/deserialize and validate without touching the domain model.

pub mod dice;
pub mod encounter_table;

pub use dice::*;
pub use encounter_table::*;

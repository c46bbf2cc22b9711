//! Value objects - Immutable objects defined by their attributes

mod die_size;
mod filters;
mod ids;
mod public_slug;

pub use die_size::{DieSize, InvalidDieSize};
pub use filters::{EncounterFilters, FilterError, MonsterSource, ANY_LOCATION};
pub use ids::*;
pub use public_slug::{PublicSlug, SLUG_ALPHABET};

//! Application services - Use case implementations
//!
//! Services depend only on outbound ports. Randomness always flows through
//! [`SecureRandomPort`](crate::application::ports::outbound::SecureRandomPort).

pub mod access;
pub mod dice;
pub mod encounter_table_service;
pub mod filter_resolver;
pub mod roll_service;
pub mod slug_generator;
pub mod table_entry_generator;
pub mod table_name_generator;

pub use access::Caller;
pub use dice::DiceError;
pub use encounter_table_service::{
    CopiedTable, CreateTableRequest, EncounterTableService, EncounterTableServiceImpl, TablePage,
    TablePreview, UpdateTableRequest, VisibilityChange, DEFAULT_PAGE_SIZE,
};
pub use filter_resolver::FilterResolver;
pub use roll_service::{RollOutcome, RollRange, RollService};
pub use slug_generator::SlugGenerator;
pub use table_entry_generator::TableEntryGenerator;

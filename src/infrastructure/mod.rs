//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite adapters for encounter tables and the monster catalog
//! - HTTP: REST API routes
//! - Random: OS-backed secure randomness
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod persistence;
pub mod random;
pub mod state;

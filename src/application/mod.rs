//! Application layer - Use cases orchestrating the domain through ports

pub mod dto;
pub mod errors;
pub mod ports;
pub mod services;

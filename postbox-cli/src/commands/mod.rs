//! Subcommand implementations.

pub mod add;
pub mod import;
pub mod map;
pub mod query;
pub mod resolve;
pub mod stats;

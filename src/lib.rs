//! thermolog library
//!
//! Sensor catalog, polymorphic read protocol, and reading persistence,
//! exported for the CLI binary and for integration tests.

pub mod cli;
pub mod db;
pub mod error;
pub mod format;
pub mod sensor;
pub mod settings;
pub mod types;

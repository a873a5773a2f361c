//! Error taxonomy for configuration, sensor reads, and catalog lookups.

use thiserror::Error;

/// Errors from the layered configuration resolver.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Option absent from both the main file and the defaults file.
    #[error("option '{0}' not found, no default available")]
    MissingOption(String),

    /// Option present but its text could not be coerced to the requested type.
    #[error("error converting option '{name}' to type '{ty}'")]
    TypeConversion {
        name: String,
        ty: crate::settings::OptionType,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from the physical read path of a sensor variant.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Remote feed unreachable, bad status, malformed XML, missing path,
    /// or no numeric token in the headline.
    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),

    /// No attached 1-wire device matched the (family, id) pair.
    #[error("no 1-wire sensor found for family {family:#04x} id {hardware_id}")]
    SensorNotFound { family: i64, hardware_id: String },

    /// 1-wire bus I/O error other than not-found.
    #[error("1-wire bus error: {0}")]
    Bus(#[from] std::io::Error),
}

/// Errors from id lookups that must resolve to exactly one row.
///
/// Zero and multiple matches are handled symmetrically: both fail,
/// distinguishable by variant.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no {kind} found with id {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("{count} {kind} rows matched id {id}, expected exactly one")]
    Ambiguous {
        kind: &'static str,
        id: i64,
        count: usize,
    },
}

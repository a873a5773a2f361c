//! CLI command definitions.
//!
//! This module only declares the argument surface using clap's derive
//! macros; all catalog logic lives in the library and receives pre-resolved
//! confirmation decisions from `main`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the list command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one section per group (default)
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Temperature sensor catalog and reading logger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the main configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the defaults configuration file
    #[arg(long, global = true)]
    pub defaults: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize or upgrade the database schema
    Init {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all sensors by group, with an availability probe per sensor
    List {
        /// Output format: text (default) or json
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Add a sensor group
    AddGroup {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Add a sensor
    AddSensor {
        #[command(subcommand)]
        kind: AddSensorCommand,
    },

    /// Reassign a sensor's group (omit --group to clear it)
    Regroup {
        sensor_id: i64,

        /// Target group id
        #[arg(short, long)]
        group: Option<i64>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Take a reading from a sensor (dry run unless --save is given)
    Read {
        sensor_id: i64,

        /// Persist the reading after taking it
        #[arg(short, long)]
        save: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List a sensor's reading history, newest first
    Readings { sensor_id: i64 },
}

/// Sensor variant subcommands for add-sensor.
#[derive(Subcommand, Debug)]
pub enum AddSensorCommand {
    /// Remote Accuweather feed sensor
    Accuweather {
        /// Accuweather location code (e.g. a zipcode)
        loc_code: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Group id to assign the sensor to
        #[arg(short, long)]
        group: Option<i64>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Local 1-wire temperature sensor
    W1therm {
        /// 1-wire family code (decimal, or hex with an 0x prefix)
        #[arg(value_parser = parse_family)]
        family: i64,

        /// 1-wire hardware element id
        hardware_id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Group id to assign the sensor to
        #[arg(short, long)]
        group: Option<i64>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Parse a 1-wire family code, accepting `0x`-prefixed hex or decimal.
fn parse_family(s: &str) -> Result<i64, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| format!("invalid family code '{}'", s))
}

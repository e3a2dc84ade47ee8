//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::record::{RecordId, VitalForm};

/// Add command arguments.
///
/// Numeric readings are taken as raw text: anything that is not a usable
/// number is stored as "no value" instead of failing the command.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Body temperature in °C
    #[arg(short, long = "temp", value_name = "CELSIUS", allow_hyphen_values = true)]
    pub temperature: Option<String>,

    /// Systolic blood pressure in mmHg
    #[arg(short, long, value_name = "MMHG", allow_hyphen_values = true)]
    pub systolic: Option<String>,

    /// Diastolic blood pressure in mmHg
    #[arg(short, long, value_name = "MMHG", allow_hyphen_values = true)]
    pub diastolic: Option<String>,

    /// Heart rate in beats per minute
    #[arg(short = 'r', long, value_name = "BPM", allow_hyphen_values = true)]
    pub heart_rate: Option<String>,

    /// Free-text notes
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl AddCommand {
    /// The form these arguments fill in.
    #[must_use]
    pub fn to_form(&self) -> VitalForm {
        VitalForm {
            temperature: self.temperature.clone().unwrap_or_default(),
            systolic: self.systolic.clone().unwrap_or_default(),
            diastolic: self.diastolic.clone().unwrap_or_default(),
            heart_rate: self.heart_rate.clone().unwrap_or_default(),
            notes: self.notes.clone().unwrap_or_default(),
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Maximum number of records, 0 for all (defaults to the configured list limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Last command arguments.
#[derive(Debug, Args)]
pub struct LastCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the record to delete
    pub id: RecordId,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

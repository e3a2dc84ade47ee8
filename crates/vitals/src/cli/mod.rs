//! Command-line interface for vitals.
//!
//! This module provides the CLI structure for the `vitals` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, LastCommand, ListCommand, OutputFormat,
    StatusCommand,
};

use crate::logging::Verbosity;

/// vitals - Log temperature, blood pressure and heart rate
///
/// Keeps a local history of manually entered health readings and shows the
/// most recent one at a glance.
#[derive(Debug, Parser)]
#[command(name = "vitals")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use a throwaway in-memory store for this run
    #[arg(long, global = true)]
    pub memory: bool,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new reading
    Add(AddCommand),

    /// Show reading history, newest first
    List(ListCommand),

    /// Show the most recent reading
    Last(LastCommand),

    /// Delete a reading by id
    Delete(DeleteCommand),

    /// Show store status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

//! `vitals` - A personal health vitals log
//!
//! This library provides the record model, storage backends and dashboard
//! state for logging temperature, blood pressure, heart rate and notes, and
//! for viewing them as a newest-first history with a last-reading summary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod record;
pub mod storage;
pub mod view;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{parse_or_absent, NewVitals, RecordId, VitalForm, VitalRecord};
pub use storage::{open_store, MemoryStore, RecordStore, SqliteStore, StoreStats};

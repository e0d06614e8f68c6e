// src/config/mod.rs

//! Configuration loading and validation for distwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate paths, durations and patterns (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_cli, load_from_path, load_raw_for_cli};
pub use model::{
    ConfigFile, HashSection, LockSection, NotifySection, RawConfigFile, ReportSection,
    SnapshotsSection,
};
pub use validate::{lock_settings, parse_duration};

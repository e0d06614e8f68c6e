// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DistwatchError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        DistwatchError::ConfigError(format!("cannot read config file {}: {e}", path.display()))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Raw config for a CLI invocation, with CLI overrides applied.
///
/// - `--config PATH` must exist.
/// - Without `--config`, `Distwatch.toml` is used when present; otherwise
///   every setting starts from its default.
pub fn load_raw_for_cli(args: &CliArgs) -> Result<RawConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_from_path(&path)?
            } else {
                debug!("no config file found; using defaults and CLI flags");
                RawConfigFile::default()
            }
        }
    };
    raw.apply_cli(args);
    Ok(raw)
}

/// Validated config for a CLI invocation.
pub fn load_for_cli(args: &CliArgs) -> Result<ConfigFile> {
    ConfigFile::try_from(load_raw_for_cli(args)?)
}

impl RawConfigFile {
    /// Let CLI flags override values from the file.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(p) = &args.previous {
            self.snapshots.previous = Some(p.clone());
        }
        if let Some(p) = &args.current {
            self.snapshots.current = Some(p.clone());
        }
        if let Some(p) = &args.report {
            self.report.path = Some(p.clone());
        }
        if let Some(p) = &args.lock {
            self.lock.path = Some(p.clone());
        }
        if let Some(c) = &args.cooldown {
            self.lock.cooldown = c.clone();
        }
    }
}

/// Default config location: `Distwatch.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Distwatch.toml")
}

// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Nothing to compare (both snapshots missing or empty), or the gate was
    /// asked to act on a comparison error.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Every digest provider in the fallback chain was unavailable.
    #[error("No hash algorithm available: {0}")]
    HashUnavailable(String),

    /// The tree diff itself failed, as opposed to finding differences.
    #[error("Diff mechanism failed: {0}")]
    DiffMechanism(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DistwatchError>;

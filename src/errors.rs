// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::exec::RunError;

#[derive(Error, Debug)]
pub enum TopoError {
    /// The dependency relation contains a cycle; `cycle` lists the element
    /// identifiers along it, starting and ending with the same element.
    #[error("cycle detected: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// At least one node of a run failed, was skipped or was cancelled.
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl TopoError {
    /// Returns `true` for the sort-time cycle error.
    pub fn is_cycle(&self) -> bool {
        matches!(self, TopoError::CycleDetected { .. })
    }

    /// The aggregated run error, if this is one.
    pub fn as_run_error(&self) -> Option<&RunError> {
        match self {
            TopoError::Run(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TopoError>;

//! Configuration errors
//!
//! The simulation itself is fail-safe (unknown cells are walls, illegal moves
//! are no-ops); only loading and validating settings can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating [`crate::Settings`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for the settings schema.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside the range the simulation supports.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

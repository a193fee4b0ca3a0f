//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or parsed.
    #[error("failed to load config file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// The configuration text is not valid INI.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// A key holds a value that cannot be used.
    #[error("invalid value for [{section}] {key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &'static str,
        key: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section,
            key,
            reason: reason.into(),
        }
    }
}

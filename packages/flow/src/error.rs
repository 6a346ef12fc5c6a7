//! Error types for the scenario flow.

use std::path::PathBuf;

use forge_api::ForgeError;
use thiserror::Error;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a valid document.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// The document parsed but a value is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main error type for the flow library.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A hosting API call failed or broke its contract.
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Scratch file IO error.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A step needed a record that no earlier step produced.
    #[error("scenario state is missing '{0}'; the step producing it has not run")]
    MissingState(&'static str),

    /// The authenticated profile does not match the configured identity.
    #[error("profile field '{field}' mismatch: expected {expected:?}, got {actual:?}")]
    Identity {
        field: &'static str,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// Commit messages failed validation.
    #[error("commit message audit failed: {initial_commits} initial commit(s), {} rejected message(s)", .rejected.len())]
    CommitAudit {
        initial_commits: usize,
        rejected: Vec<String>,
    },

    /// A pattern supplied to the audit does not carry a valid tag.
    #[error("pattern {0:?} does not contain a [XXX-0000] tag")]
    InvalidPattern(String),
}

impl FlowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

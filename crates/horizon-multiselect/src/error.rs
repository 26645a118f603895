//! Error types for administrative operations.
//!
//! Widget operations never fail; they return outcomes. Only loading language
//! bundles and compiling validation patterns can produce an [`Error`].

use std::path::PathBuf;

/// Result type alias for fallible multi-select operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading bundles or building validation rules.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON bundle parsing error.
    #[error("Invalid JSON language bundle: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML bundle parsing error.
    #[error("Invalid TOML language bundle: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular-expression rule failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A bundle file with an extension that is neither `.json` nor `.toml`.
    #[error("Unsupported bundle format for '{path}'")]
    UnsupportedFormat { path: PathBuf },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}

//! Error types for manifest generation.
//!
//! [`GenerationError`] is the single failure type of a generation run and of
//! the `depset` commands. Every variant is fatal: the run stops before the
//! output file is touched and nothing is retried.

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::manifest::ManifestError;
use crate::manifest_parser::ManifestParseError;
use crate::nested::NestedJarError;
use crate::relocation::RelocationError;
use crate::report::ReportError;
use camino::Utf8PathBuf;
use depset_common::error::ModelError;
use thiserror::Error;

/// Errors that abort a generation run or a `depset` command.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The dependency graph or artifact set could not be resolved.
    #[error("dependency resolution failed: {reason}")]
    Resolution {
        /// Description of the resolution failure.
        reason: String,
    },

    /// An artifact file could not be read while hashing.
    #[error("failed to hash {path}")]
    HashIo {
        /// Path to the unreadable file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be turned into a coordinate.
    #[error("malformed artifact identifier")]
    MalformedIdentifier {
        /// The validation failure.
        #[source]
        source: ModelError,
    },

    /// The manifest could not be written.
    #[error("failed to write {path}")]
    OutputWrite {
        /// Path to the output file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A resolution report could not be loaded or interpreted.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A relocation rule is invalid.
    #[error(transparent)]
    Relocation(#[from] RelocationError),

    /// Nested jars could not be staged or indexed.
    #[error(transparent)]
    NestedJar(#[from] NestedJarError),

    /// An existing manifest could not be parsed.
    #[error("failed to inspect {path}")]
    Inspect {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The parse failure.
        #[source]
        source: ManifestParseError,
    },
}

impl From<GraphError> for GenerationError {
    fn from(err: GraphError) -> Self {
        Self::Resolution {
            reason: err.to_string(),
        }
    }
}

impl From<ManifestError> for GenerationError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Write { path, source } => Self::OutputWrite { path, source },
            invalid @ (ManifestError::ConflictingHash { .. }
            | ManifestError::UnsupportedHash { .. }) => Self::Resolution {
                reason: invalid.to_string(),
            },
        }
    }
}

/// Result type alias using [`GenerationError`].
pub type Result<T> = std::result::Result<T, GenerationError>;

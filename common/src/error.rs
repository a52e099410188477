//! Error types for coordinate, digest, and repository validation.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid dependency-model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A coordinate notation could not be split into its parts.
    #[error("malformed coordinate \"{value}\": {reason}")]
    MalformedCoordinate {
        /// The rejected notation.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// One field of a coordinate is empty or contains a reserved character.
    #[error("invalid coordinate {field} \"{value}\": {reason}")]
    InvalidCoordinatePart {
        /// The coordinate field being validated (`group`, `version`, ...).
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// An artifact file name does not follow `<module>-<version>[-<classifier>].<ext>`.
    #[error("unrecognised artifact file name \"{file_name}\" for {component}: {reason}")]
    MalformedArtifactName {
        /// Display name of the owning component.
        component: String,
        /// The rejected file name.
        file_name: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A digest is not a lowercase hex string of a supported width.
    #[error("invalid digest: {reason}")]
    InvalidDigest {
        /// Description of the validation failure.
        reason: String,
    },

    /// A hashing algorithm name is not recognised.
    #[error("unsupported hash algorithm \"{value}\"; expected one of: sha256, sha1")]
    UnsupportedAlgorithm {
        /// The rejected algorithm name.
        value: String,
    },

    /// A repository URL could not be parsed.
    #[error("invalid repository URL \"{value}\": {reason}")]
    InvalidRepository {
        /// The rejected URL.
        value: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// A repository URL uses a scheme other than `http` or `https`.
    #[error("repository \"{value}\" uses unsupported scheme \"{scheme}\"")]
    UnsupportedRepositoryScheme {
        /// The rejected URL.
        value: String,
        /// The scheme that was found.
        scheme: String,
    },
}

impl ModelError {
    /// Return `true` when the error describes an artifact identifier that
    /// cannot be turned into a coordinate.
    #[must_use]
    pub const fn is_malformed_identifier(&self) -> bool {
        matches!(
            self,
            Self::MalformedCoordinate { .. }
                | Self::InvalidCoordinatePart { .. }
                | Self::MalformedArtifactName { .. }
        )
    }
}

/// Result type alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;

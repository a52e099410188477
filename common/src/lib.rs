//! Dependency model shared by the depset crates: Maven-style coordinates,
//! resolved component identifiers, streaming content digests, and
//! repository URLs.

pub mod component;
pub mod coordinate;
pub mod digest;
pub mod error;
pub mod repository;

pub use component::{ArtifactName, ComponentId};
pub use coordinate::{Coordinate, DEFAULT_EXTENSION};
pub use digest::{HashAlgorithm, HexDigest, hash_file, hash_reader};
pub use error::{ModelError, Result};
pub use repository::RepositoryUrl;

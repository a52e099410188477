//! Artifact resolution: pairing flattened components with their files.
//!
//! Each selected component must own at least one file in the report's
//! artifact collection. Every such file is named, turned into a
//! [`Coordinate`], and hashed through a [`ContentHasher`].

use crate::error::{GenerationError, Result};
use crate::manifest::ManifestEntry;
use camino::{Utf8Path, Utf8PathBuf};
use depset_common::component::{ArtifactName, ComponentId};
use depset_common::coordinate::Coordinate;
use depset_common::digest::{self, HashAlgorithm, HexDigest};
use log::{debug, trace};
use std::collections::HashMap;
use std::io;

/// Computes content digests of artifact files.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use depset_common::digest::HashAlgorithm;
/// use depset_writer::resolve::{ContentHasher, StreamingHasher};
///
/// let hasher = StreamingHasher::new(HashAlgorithm::Sha256);
/// let digest = hasher.hash_file(Utf8Path::new("libs/gson-2.10.1.jar"))?;
/// println!("{digest}");
/// # Ok::<(), std::io::Error>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ContentHasher {
    /// Return the digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn hash_file(&self, path: &Utf8Path) -> io::Result<HexDigest>;
}

/// Hashes files in fixed-size chunks with a per-thread reusable digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamingHasher {
    algorithm: HashAlgorithm,
}

impl StreamingHasher {
    /// Create a hasher for `algorithm`.
    #[must_use]
    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Return the configured algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl ContentHasher for StreamingHasher {
    fn hash_file(&self, path: &Utf8Path) -> io::Result<HexDigest> {
        digest::hash_file(path.as_std_path(), self.algorithm)
    }
}

/// A file belonging to a selected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Display name of the owning component.
    pub component: String,
    /// Location of the file on disk.
    pub path: Utf8PathBuf,
    /// Classifier and extension, when known; otherwise derived from the
    /// file name.
    pub name: Option<ArtifactName>,
}

/// A file matched to its coordinate and hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Canonical coordinate of the file.
    pub coordinate: Coordinate,
    /// Location the bytes were read from.
    pub source: Utf8PathBuf,
    /// Digest of the file contents.
    pub hash: HexDigest,
}

impl From<ResolvedArtifact> for ManifestEntry {
    fn from(artifact: ResolvedArtifact) -> Self {
        Self::new(artifact.coordinate, artifact.hash)
    }
}

/// Resolve and hash the files of every component in `components`.
///
/// Files owned by components outside `components` (the root project or
/// platforms, for instance) are ignored. The output follows the order of
/// `components`, then the order of `files`.
///
/// # Errors
///
/// Returns [`GenerationError::Resolution`] when a component has no file,
/// [`GenerationError::MalformedIdentifier`] when a file cannot be named or
/// turned into a coordinate, and [`GenerationError::HashIo`] when a file
/// cannot be read.
pub fn resolve_artifacts(
    components: &[ComponentId],
    files: &[ArtifactFile],
    hasher: &dyn ContentHasher,
) -> Result<Vec<ResolvedArtifact>> {
    let mut by_component: HashMap<&str, Vec<&ArtifactFile>> = HashMap::new();
    for file in files {
        by_component
            .entry(file.component.as_str())
            .or_default()
            .push(file);
    }

    let mut resolved = Vec::new();
    for component in components {
        let name = component.display_name();
        let owned = by_component
            .get(name.as_str())
            .ok_or_else(|| GenerationError::Resolution {
                reason: format!("no artifact file was resolved for {name}"),
            })?;
        for file in owned {
            resolved.push(resolve_file(component, file, hasher)?);
        }
    }
    debug!(
        "resolved {} artifact(s) for {} component(s)",
        resolved.len(),
        components.len()
    );
    Ok(resolved)
}

fn resolve_file(
    component: &ComponentId,
    file: &ArtifactFile,
    hasher: &dyn ContentHasher,
) -> Result<ResolvedArtifact> {
    let name = match &file.name {
        Some(name) => name.clone(),
        None => {
            let file_name = file.path.file_name().unwrap_or(file.path.as_str());
            ArtifactName::from_file_name(component, file_name)
                .map_err(|source| GenerationError::MalformedIdentifier { source })?
        }
    };
    let coordinate = component
        .coordinate(&name)
        .map_err(|source| GenerationError::MalformedIdentifier { source })?;
    let hash = hasher
        .hash_file(&file.path)
        .map_err(|source| GenerationError::HashIo {
            path: file.path.clone(),
            source,
        })?;
    trace!("{coordinate} {hash} <- {}", file.path);
    Ok(ResolvedArtifact {
        coordinate,
        source: file.path.clone(),
        hash,
    })
}

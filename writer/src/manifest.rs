//! The dependency manifest and its text encoding.
//!
//! A manifest is a sequence of named sections, each opened by a
//! `__<name>__` line and closed by `__end__`:
//!
//! ```text
//! __repos__
//! https://repo.maven.apache.org/maven2/
//! __end__
//! __deps__
//! com.google.code.gson:gson:2.10.1 <sha256>
//! __end__
//! __relocation__
//! dep me.lucko:jar-relocator:1.7 <sha256>
//! com.google.gson shaded.gson
//! __end__
//! ```
//!
//! `repos` and `deps` are always present; `relocation` only when at least
//! one rule exists. Dependency lines are unique and sorted by coordinate;
//! rule lines keep registration order.

use crate::relocation::{Relocation, RelocationRegistry};
use camino::{Utf8Path, Utf8PathBuf};
use depset_common::coordinate::Coordinate;
use depset_common::digest::{HashAlgorithm, HexDigest};
use depset_common::repository::RepositoryUrl;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use thiserror::Error;

/// Marker line closing every section.
pub const SECTION_END: &str = "__end__";

/// Name of the repository section.
pub const REPOS_SECTION: &str = "repos";
/// Name of the dependency section.
pub const DEPS_SECTION: &str = "deps";
/// Name of the optional relocation section.
pub const RELOCATION_SECTION: &str = "relocation";

/// Prefix of relocator dependency lines inside the relocation section.
pub const RELOCATION_DEP_PREFIX: &str = "dep ";

/// Errors raised while assembling or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// One coordinate was resolved to two different files.
    #[error("{coordinate} resolved to conflicting hashes {first} and {second}")]
    ConflictingHash {
        /// The ambiguous coordinate.
        coordinate: String,
        /// Hash of the first file seen.
        first: HexDigest,
        /// Hash of the conflicting file.
        second: HexDigest,
    },

    /// An entry carries a digest the runtime loader cannot verify.
    #[error("{coordinate} is hashed with {algorithm}; manifests require SHA-256")]
    UnsupportedHash {
        /// The offending coordinate.
        coordinate: String,
        /// Algorithm implied by the digest width.
        algorithm: HashAlgorithm,
    },

    /// The manifest file could not be written.
    #[error("failed to write manifest {path}")]
    Write {
        /// Path to the output file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Result type alias using [`ManifestError`].
pub type Result<T> = std::result::Result<T, ManifestError>;

/// One `<coordinate> <hash>` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    coordinate: Coordinate,
    hash: HexDigest,
}

impl ManifestEntry {
    /// Create an entry.
    #[must_use]
    pub const fn new(coordinate: Coordinate, hash: HexDigest) -> Self {
        Self { coordinate, hash }
    }

    /// Return the coordinate.
    #[must_use]
    pub const fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Return the content hash.
    #[must_use]
    pub const fn hash(&self) -> &HexDigest {
        &self.hash
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.coordinate, self.hash)
    }
}

/// An immutable, encodable manifest. Build one with [`ManifestBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    repositories: Vec<RepositoryUrl>,
    dependencies: Vec<ManifestEntry>,
    relocation_dependencies: Vec<ManifestEntry>,
    relocations: Vec<Relocation>,
}

impl Manifest {
    /// Start an empty builder.
    #[must_use]
    pub fn builder() -> ManifestBuilder {
        ManifestBuilder::default()
    }

    /// Repositories in declaration order.
    #[must_use]
    pub fn repositories(&self) -> &[RepositoryUrl] {
        &self.repositories
    }

    /// Dependencies sorted by coordinate.
    #[must_use]
    pub fn dependencies(&self) -> &[ManifestEntry] {
        &self.dependencies
    }

    /// Relocator dependencies sorted by coordinate.
    #[must_use]
    pub fn relocation_dependencies(&self) -> &[ManifestEntry] {
        &self.relocation_dependencies
    }

    /// Relocation rules in registration order.
    #[must_use]
    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    /// Return `true` when the encoding includes a relocation section.
    #[must_use]
    pub fn has_relocation_section(&self) -> bool {
        !self.relocations.is_empty()
    }

    /// Encode the manifest as text.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Write the encoded manifest to `path`, replacing any previous file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Write`] if the directories cannot be
    /// created or the file cannot be replaced.
    pub fn write_to(&self, path: &Utf8Path) -> Result<()> {
        let write_error = |source| ManifestError::Write {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        match fs::remove_file(path) {
            Ok(()) => debug!("removed previous {path}"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(write_error(e)),
        }
        fs::write(path, self.encode()).map_err(write_error)?;
        info!(
            "wrote {path}: {} repositories, {} dependencies, {} relocation rule(s)",
            self.repositories.len(),
            self.dependencies.len(),
            self.relocations.len()
        );
        Ok(())
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, REPOS_SECTION, |f| {
            self.repositories
                .iter()
                .try_for_each(|repo| writeln!(f, "{repo}"))
        })?;
        section(f, DEPS_SECTION, |f| {
            self.dependencies
                .iter()
                .try_for_each(|entry| writeln!(f, "{entry}"))
        })?;
        if self.has_relocation_section() {
            section(f, RELOCATION_SECTION, |f| {
                for entry in &self.relocation_dependencies {
                    writeln!(f, "{RELOCATION_DEP_PREFIX}{entry}")?;
                }
                self.relocations
                    .iter()
                    .try_for_each(|relocation| writeln!(f, "{relocation}"))
            })?;
        }
        Ok(())
    }
}

fn section<F>(f: &mut fmt::Formatter<'_>, name: &str, body: F) -> fmt::Result
where
    F: FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    writeln!(f, "__{name}__")?;
    body(f)?;
    f.write_str(SECTION_END)?;
    f.write_char('\n')
}

/// Collects manifest contents; [`ManifestBuilder::build`] consumes it.
///
/// # Examples
///
/// ```
/// use depset_common::{Coordinate, HexDigest, RepositoryUrl};
/// use depset_writer::manifest::{Manifest, ManifestEntry};
///
/// let manifest = Manifest::builder()
///     .repository(RepositoryUrl::parse("https://repo.example.com")?)
///     .dependency(ManifestEntry::new(
///         Coordinate::parse("g:b:2.0")?,
///         HexDigest::try_from("b".repeat(64))?,
///     ))
///     .dependency(ManifestEntry::new(
///         Coordinate::parse("g:a:1.0")?,
///         HexDigest::try_from("a".repeat(64))?,
///     ))
///     .build()?;
/// assert_eq!(manifest.dependencies()[0].coordinate().to_string(), "g:a:1.0");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    repositories: Vec<RepositoryUrl>,
    dependencies: Vec<ManifestEntry>,
    relocation_dependencies: Vec<ManifestEntry>,
    relocations: Vec<Relocation>,
}

impl ManifestBuilder {
    /// Add a repository. Repeated repositories are listed once.
    #[must_use]
    pub fn repository(mut self, repository: RepositoryUrl) -> Self {
        if !self.repositories.contains(&repository) {
            self.repositories.push(repository);
        }
        self
    }

    /// Add several repositories in order.
    #[must_use]
    pub fn repositories<I>(self, repositories: I) -> Self
    where
        I: IntoIterator<Item = RepositoryUrl>,
    {
        repositories
            .into_iter()
            .fold(self, |builder, repository| builder.repository(repository))
    }

    /// Add a dependency line.
    #[must_use]
    pub fn dependency(mut self, entry: ManifestEntry) -> Self {
        self.dependencies.push(entry);
        self
    }

    /// Add several dependency lines.
    #[must_use]
    pub fn dependencies<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = ManifestEntry>,
    {
        self.dependencies.extend(entries);
        self
    }

    /// Add a relocator dependency line.
    #[must_use]
    pub fn relocation_dependency(mut self, entry: ManifestEntry) -> Self {
        self.relocation_dependencies.push(entry);
        self
    }

    /// Add a relocation rule after those already added.
    #[must_use]
    pub fn relocation(mut self, relocation: Relocation) -> Self {
        self.relocations.push(relocation);
        self
    }

    /// Add every rule and relocator dependency held by `registry`.
    #[must_use]
    pub fn relocations(mut self, registry: &RelocationRegistry) -> Self {
        self.relocations.extend(
            registry
                .rules()
                .iter()
                .map(|rule| rule.relocation().clone()),
        );
        self.relocation_dependencies
            .extend(registry.dependencies().iter().cloned());
        self
    }

    /// Freeze the collected contents.
    ///
    /// Dependency and relocator dependency lines are deduplicated and
    /// sorted by canonical coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnsupportedHash`] when an entry is not
    /// hashed with SHA-256, and [`ManifestError::ConflictingHash`] when one
    /// coordinate was added with two different hashes.
    pub fn build(self) -> Result<Manifest> {
        Ok(Manifest {
            repositories: self.repositories,
            dependencies: normalize(self.dependencies)?,
            relocation_dependencies: normalize(self.relocation_dependencies)?,
            relocations: self.relocations,
        })
    }
}

/// Deduplicate entries by canonical coordinate and sort them ordinally.
fn normalize(entries: Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>> {
    let mut unique: BTreeMap<String, ManifestEntry> = BTreeMap::new();
    for entry in entries {
        let key = entry.coordinate.to_string();
        let algorithm = entry.hash.algorithm();
        if algorithm != HashAlgorithm::Sha256 {
            return Err(ManifestError::UnsupportedHash {
                coordinate: key,
                algorithm,
            });
        }
        match unique.get(&key) {
            Some(existing) if existing.hash != entry.hash => {
                return Err(ManifestError::ConflictingHash {
                    coordinate: key,
                    first: existing.hash.clone(),
                    second: entry.hash,
                });
            }
            Some(_) => {}
            None => {
                unique.insert(key, entry);
            }
        }
    }
    Ok(unique.into_values().collect())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;

//! Identifiers for nodes of a resolved dependency graph and their files.
//!
//! A [`ComponentId`] names a module selected by the host build tool's
//! resolver; an [`ArtifactName`] describes one file that module publishes.
//! Together they produce the [`Coordinate`] recorded in the manifest.

use super::coordinate::{Coordinate, DEFAULT_EXTENSION};
use super::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker the declared version of a unique snapshot ends with.
const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// A module component selected during dependency resolution.
///
/// For unique snapshots the resolver also reports the timestamp of the
/// concrete build it picked. The *display name* keeps the declared
/// `-SNAPSHOT` version (it keys graph nodes), while the *effective version*
/// substitutes the timestamp so the manifest addresses an immutable file.
///
/// # Examples
///
/// ```
/// use depset_common::component::ComponentId;
///
/// let id = ComponentId::new("g", "lib", "1.0-SNAPSHOT")
///     .with_snapshot_timestamp("20240102.030405-7");
/// assert_eq!(id.display_name(), "g:lib:1.0-SNAPSHOT");
/// assert_eq!(id.effective_version(), "1.0-20240102.030405-7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Group of the module.
    pub group: String,
    /// Module name (the artifact identifier).
    pub module: String,
    /// Declared or selected version.
    pub version: String,
    /// Timestamp of the selected unique snapshot build, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_timestamp: Option<String>,
}

impl ComponentId {
    /// Create a component identifier for a release version.
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            module: module.into(),
            version: version.into(),
            snapshot_timestamp: None,
        }
    }

    /// Mark this component as a unique snapshot resolved to `timestamp`.
    #[must_use]
    pub fn with_snapshot_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.snapshot_timestamp = Some(timestamp.into());
        self
    }

    /// Return the `group:module:version` name that keys this node.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}:{}:{}", self.group, self.module, self.version)
    }

    /// Return `true` when the resolver pinned a timestamped snapshot.
    #[must_use]
    pub const fn is_unique_snapshot(&self) -> bool {
        self.snapshot_timestamp.is_some()
    }

    /// Return the version identifying the exact file that was resolved.
    ///
    /// For unique snapshots the trailing `SNAPSHOT` marker is replaced by the
    /// timestamp; otherwise this is the declared version.
    #[must_use]
    pub fn effective_version(&self) -> String {
        match &self.snapshot_timestamp {
            Some(timestamp) => match self.version.strip_suffix(SNAPSHOT_MARKER) {
                Some(base) => format!("{base}{timestamp}"),
                None => timestamp.clone(),
            },
            None => self.version.clone(),
        }
    }

    /// Build the coordinate of one of this component's files.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidCoordinatePart`] if any identifier part
    /// is not valid in a coordinate.
    pub fn coordinate(&self, artifact: &ArtifactName) -> Result<Coordinate> {
        let coordinate = Coordinate::new(
            self.group.as_str(),
            self.module.as_str(),
            self.effective_version(),
        )?;
        let coordinate = match artifact.classifier() {
            Some(classifier) => coordinate.with_classifier(classifier)?,
            None => coordinate,
        };
        coordinate.with_extension(artifact.extension())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Classifier and extension of a single published file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName {
    classifier: Option<String>,
    extension: String,
}

impl ArtifactName {
    /// Create an artifact name. Blank classifiers are dropped and a blank
    /// extension falls back to `jar`.
    #[must_use]
    pub fn new(classifier: Option<&str>, extension: Option<&str>) -> Self {
        Self {
            classifier: classifier
                .filter(|c| !c.trim().is_empty())
                .map(str::to_owned),
            extension: extension
                .filter(|e| !e.trim().is_empty())
                .unwrap_or(DEFAULT_EXTENSION)
                .to_owned(),
        }
    }

    /// The primary `jar` artifact.
    #[must_use]
    pub fn jar() -> Self {
        Self::new(None, None)
    }

    /// Derive the artifact name from a file named
    /// `<module>-<version>[-<classifier>].<extension>`.
    ///
    /// Both the effective (timestamped) and the declared version are accepted
    /// as the version segment, since snapshot files may be cached under
    /// either name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedArtifactName`] if the file name does not
    /// start with the component's module and version, or has no extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use depset_common::component::{ArtifactName, ComponentId};
    ///
    /// let id = ComponentId::new("g", "widget", "2.0");
    /// let name = ArtifactName::from_file_name(&id, "widget-2.0-sources.jar")?;
    /// assert_eq!(name.classifier(), Some("sources"));
    /// assert_eq!(name.extension(), "jar");
    /// # Ok::<(), depset_common::error::ModelError>(())
    /// ```
    pub fn from_file_name(component: &ComponentId, file_name: &str) -> Result<Self> {
        let malformed = |reason: String| ModelError::MalformedArtifactName {
            component: component.display_name(),
            file_name: file_name.to_owned(),
            reason,
        };

        let effective = format!("{}-{}", component.module, component.effective_version());
        let declared = format!("{}-{}", component.module, component.version);
        let rest = file_name
            .strip_prefix(effective.as_str())
            .or_else(|| file_name.strip_prefix(declared.as_str()))
            .ok_or_else(|| malformed(format!("expected a name starting with \"{effective}\"")))?;

        if let Some(extension) = rest.strip_prefix('.') {
            if extension.is_empty() {
                return Err(malformed("empty extension".to_owned()));
            }
            return Ok(Self::new(None, Some(extension)));
        }

        let tail = rest
            .strip_prefix('-')
            .ok_or_else(|| malformed("no recognisable extension".to_owned()))?;
        match tail.rsplit_once('.') {
            Some((classifier, extension)) if !classifier.is_empty() && !extension.is_empty() => {
                Ok(Self::new(Some(classifier), Some(extension)))
            }
            _ => Err(malformed("no recognisable extension".to_owned())),
        }
    }

    /// Return the classifier, if any.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Return the extension (never empty).
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

//! Resolution reports exported by the host build tool.
//!
//! A report is a JSON document describing one resolved dependency
//! configuration: the root component, every selected component with its
//! outgoing dependencies, and the files the configuration resolved to.
//!
//! ```json
//! {
//!   "root": "com.example:app:1.0.0",
//!   "components": [
//!     {
//!       "id": {"group": "com.example", "module": "app", "version": "1.0.0"},
//!       "dependencies": [
//!         {"requested": "g:a:1.+", "selected": "g:a:1.2",
//!          "attributes": {"org.gradle.category": "library"}}
//!       ]
//!     },
//!     {"id": {"group": "g", "module": "a", "version": "1.2"}}
//!   ],
//!   "artifacts": [
//!     {"component": "g:a:1.2", "file": "/cache/a-1.2.jar", "extension": "jar"}
//!   ]
//! }
//! ```

use crate::graph::{DependencyEdge, DependencyGraph, GraphError};
use crate::resolve::ArtifactFile;
use camino::{Utf8Path, Utf8PathBuf};
use depset_common::component::{ArtifactName, ComponentId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use thiserror::Error;

/// Errors arising from loading or interpreting a resolution report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be read.
    #[error("failed to read resolution report {path}")]
    Read {
        /// Path to the report.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The report is not valid JSON or does not match the expected shape.
    #[error("invalid resolution report")]
    Json(#[from] serde_json::Error),

    /// The `root` field names no listed component.
    #[error("root component {root} is not listed in the report")]
    UnknownRoot {
        /// The declared root.
        root: String,
    },

    /// Two components share a display name.
    #[error("component {name} is listed more than once")]
    DuplicateComponent {
        /// The repeated display name.
        name: String,
    },

    /// A dependency entry has neither a selection nor a failure.
    #[error("dependency {requested} of {from} has no selected component and no failure")]
    IncompleteDependency {
        /// Display name of the declaring component.
        from: String,
        /// The dependency as it was requested.
        requested: String,
    },

    /// The listed components do not form a valid graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type alias using [`ReportError`].
pub type Result<T> = std::result::Result<T, ReportError>;

/// Top-level resolution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionReport {
    /// Display name of the component being built.
    pub root: String,
    /// Every component selected by the resolver, the root included.
    #[serde(default)]
    pub components: Vec<ReportComponent>,
    /// Files the configuration resolved to.
    #[serde(default)]
    pub artifacts: Vec<ReportArtifact>,
}

/// A selected component and its outgoing dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportComponent {
    /// Component identifier.
    pub id: ComponentId,
    /// Outgoing dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<ReportDependency>,
}

/// One outgoing dependency of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportDependency {
    /// The dependency as declared, such as `g:a:1.+`.
    pub requested: String,
    /// Display name of the selected component, when resolution succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Attributes of the selected variant.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Failure message, when resolution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// One resolved file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportArtifact {
    /// Display name of the owning component.
    pub component: String,
    /// Location of the file on disk.
    pub file: Utf8PathBuf,
    /// Artifact classifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Artifact extension; derived from the file name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl ResolutionReport {
    /// Parse a report from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Json`] when the text is not a valid report.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse the report at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Read`] when the file cannot be read and
    /// [`ReportError::Json`] when it is not a valid report.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_owned(),
            source,
        })?;
        let report = Self::from_json(&json)?;
        debug!(
            "loaded {path}: {} component(s), {} artifact(s)",
            report.components.len(),
            report.artifacts.len()
        );
        Ok(report)
    }

    /// Build the dependency graph the report describes.
    ///
    /// # Errors
    ///
    /// Returns an error when the root is not listed, a component appears
    /// twice, or a dependency has neither a selection nor a failure.
    pub fn graph(&self) -> Result<DependencyGraph> {
        let root = self
            .components
            .iter()
            .find(|component| component.id.display_name() == self.root)
            .ok_or_else(|| ReportError::UnknownRoot {
                root: self.root.clone(),
            })?;

        let mut graph = DependencyGraph::new(root.id.clone());
        let mut listed = HashSet::new();
        for component in &self.components {
            let name = component.id.display_name();
            if !listed.insert(name.clone()) {
                return Err(ReportError::DuplicateComponent { name });
            }
            graph.insert(component.id.clone());
        }

        for component in &self.components {
            let from = component.id.display_name();
            for dependency in &component.dependencies {
                graph.add_edge(&from, dependency.edge(&from)?)?;
            }
        }
        Ok(graph)
    }

    /// Return the report's files as resolver input.
    #[must_use]
    pub fn artifact_files(&self) -> Vec<ArtifactFile> {
        self.artifacts.iter().map(ReportArtifact::to_file).collect()
    }
}

impl ReportDependency {
    fn edge(&self, from: &str) -> Result<DependencyEdge> {
        let edge = match (&self.failure, &self.selected) {
            (Some(reason), _) => DependencyEdge::unresolved(self.requested.as_str(), reason.as_str()),
            (None, Some(selected)) => DependencyEdge::resolved(selected.as_str()),
            (None, None) => {
                return Err(ReportError::IncompleteDependency {
                    from: from.to_owned(),
                    requested: self.requested.clone(),
                });
            }
        };
        Ok(DependencyEdge {
            attributes: self.attributes.clone(),
            ..edge
        })
    }
}

impl ReportArtifact {
    fn to_file(&self) -> ArtifactFile {
        let name = if self.classifier.is_some() || self.extension.is_some() {
            Some(ArtifactName::new(
                self.classifier.as_deref(),
                self.extension.as_deref(),
            ))
        } else {
            None
        };
        ArtifactFile {
            component: self.component.clone(),
            path: self.file.clone(),
            name,
        }
    }
}

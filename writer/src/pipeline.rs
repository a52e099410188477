//! Manifest generation runs.
//!
//! A run flattens the application graph, resolves and hashes its
//! artifacts, and does the same for the relocator when relocation rules are
//! configured. The manifest is assembled in memory first; the output file is
//! only touched once every step has succeeded.

use crate::error::Result;
use crate::manifest::{Manifest, ManifestEntry};
use crate::relocation::{Relocation, RelocationRegistry};
use crate::report::ResolutionReport;
use crate::resolve::{ContentHasher, ResolvedArtifact, resolve_artifacts};
use camino::Utf8PathBuf;
use depset_common::repository::RepositoryUrl;
use log::{debug, info, warn};

/// Inputs of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Resolution of the application's runtime configuration.
    pub report: ResolutionReport,
    /// Resolution of the relocator's configuration, if any.
    pub relocation_report: Option<ResolutionReport>,
    /// Repositories listed in the manifest, in lookup order.
    pub repositories: Vec<RepositoryUrl>,
    /// Relocation rules, in application order.
    pub relocations: Vec<Relocation>,
    /// Include transitive dependencies of the application.
    pub transitive: bool,
    /// Destination of the manifest.
    pub output_path: Utf8PathBuf,
}

/// What a completed run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Location of the written manifest.
    pub output_path: Utf8PathBuf,
    /// Number of repository lines.
    pub repositories: usize,
    /// Number of dependency lines.
    pub dependencies: usize,
    /// Number of relocator dependency lines.
    pub relocation_dependencies: usize,
    /// Number of relocation rule lines.
    pub relocation_rules: usize,
}

impl GenerationSummary {
    fn new(output_path: Utf8PathBuf, manifest: &Manifest) -> Self {
        Self {
            output_path,
            repositories: manifest.repositories().len(),
            dependencies: manifest.dependencies().len(),
            relocation_dependencies: manifest.relocation_dependencies().len(),
            relocation_rules: manifest.relocations().len(),
        }
    }
}

/// Assemble the manifest for `request` without writing it.
///
/// The relocator graph is always flattened transitively, since the
/// relocator needs its full classpath at run time.
///
/// # Errors
///
/// Returns an error if a report is inconsistent, a dependency is
/// unresolved, an artifact cannot be named or hashed, a rule is invalid, or
/// one coordinate ends up with two different hashes.
pub fn build_manifest(request: &GenerationRequest, hasher: &dyn ContentHasher) -> Result<Manifest> {
    let dependencies = hash_report(&request.report, request.transitive, hasher)?;

    let mut registry = RelocationRegistry::new();
    for relocation in &request.relocations {
        registry.add_rule(relocation.clone())?;
    }
    match (&request.relocation_report, registry.is_empty()) {
        (Some(report), false) => {
            for artifact in hash_report(report, true, hasher)? {
                registry.add_dependency(artifact.into());
            }
        }
        (None, false) => warn!(
            "{} relocation rule(s) configured without a relocation report; \
             no relocator dependencies will be listed",
            request.relocations.len()
        ),
        (Some(_), true) => debug!("ignoring relocation report: no relocation rules configured"),
        (None, true) => {}
    }

    Ok(Manifest::builder()
        .repositories(request.repositories.iter().cloned())
        .dependencies(dependencies.into_iter().map(ManifestEntry::from))
        .relocations(&registry)
        .build()?)
}

/// Assemble the manifest for `request` and write it to its output path.
///
/// # Errors
///
/// Returns any error [`build_manifest`] reports, or
/// [`GenerationError::OutputWrite`](crate::error::GenerationError::OutputWrite)
/// if the file cannot be written.
pub fn generate(request: &GenerationRequest, hasher: &dyn ContentHasher) -> Result<GenerationSummary> {
    let manifest = build_manifest(request, hasher)?;
    manifest.write_to(&request.output_path)?;
    let summary = GenerationSummary::new(request.output_path.clone(), &manifest);
    info!(
        "generated {} with {} dependencies",
        summary.output_path, summary.dependencies
    );
    Ok(summary)
}

fn hash_report(
    report: &ResolutionReport,
    transitive: bool,
    hasher: &dyn ContentHasher,
) -> Result<Vec<ResolvedArtifact>> {
    let graph = report.graph()?;
    let components = graph.flatten(transitive)?;
    resolve_artifacts(&components, &report.artifact_files(), hasher)
}

//! Behaviour-driven tests for manifest generation.
//!
//! Each scenario builds a resolution report step by step, runs the
//! generation pipeline with a table-driven hasher, and checks the encoded
//! manifest line by line.

use camino::{Utf8Path, Utf8PathBuf};
use depset_common::component::ComponentId;
use depset_common::digest::HexDigest;
use depset_common::repository::RepositoryUrl;
use depset_writer::error::GenerationError;
use depset_writer::graph::CATEGORY_ATTRIBUTE;
use depset_writer::manifest::Manifest;
use depset_writer::manifest_parser::parse_manifest;
use depset_writer::pipeline::{GenerationRequest, build_manifest};
use depset_writer::relocation::Relocation;
use depset_writer::report::{ReportArtifact, ReportComponent, ReportDependency, ResolutionReport};
use depset_writer::resolve::ContentHasher;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::collections::{BTreeMap, HashMap};
use std::io;

const RELOCATOR_ROOT: &str = "depset:relocator:0";

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

/// Hashes files by looking them up in a fixed table.
struct TableHasher<'a>(&'a HashMap<Utf8PathBuf, HexDigest>);

impl ContentHasher for TableHasher<'_> {
    fn hash_file(&self, path: &Utf8Path) -> io::Result<HexDigest> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

#[derive(Default)]
struct GenerationWorld {
    report: Option<ResolutionReport>,
    relocator: Option<ResolutionReport>,
    hashes: HashMap<Utf8PathBuf, HexDigest>,
    repositories: Vec<RepositoryUrl>,
    relocations: Vec<Relocation>,
    direct_only: bool,
    manifest: Option<Manifest>,
    error: Option<GenerationError>,
    reparsed: Option<Manifest>,
}

#[fixture]
fn world() -> GenerationWorld {
    GenerationWorld::default()
}

fn component_id(name: &str) -> ComponentId {
    let parts: Vec<&str> = name.split(':').collect();
    let [group, module, version] = parts.as_slice() else {
        panic!("test component {name} must be group:module:version");
    };
    ComponentId::new(*group, *module, *version)
}

fn new_report(root: &str) -> ResolutionReport {
    ResolutionReport {
        root: root.to_owned(),
        components: vec![ReportComponent {
            id: component_id(root),
            dependencies: Vec::new(),
        }],
        artifacts: Vec::new(),
    }
}

fn ensure_component<'r>(report: &'r mut ResolutionReport, name: &str) -> &'r mut ReportComponent {
    let position = match report
        .components
        .iter()
        .position(|component| component.id.display_name() == name)
    {
        Some(position) => position,
        None => {
            report.components.push(ReportComponent {
                id: component_id(name),
                dependencies: Vec::new(),
            });
            report.components.len() - 1
        }
    };
    &mut report.components[position]
}

fn add_dependency(report: &mut ResolutionReport, dependency: ReportDependency, from: &str) {
    if let Some(selected) = &dependency.selected {
        ensure_component(report, selected);
    }
    ensure_component(report, from).dependencies.push(dependency);
}

fn selected(to: &str) -> ReportDependency {
    ReportDependency {
        requested: to.to_owned(),
        selected: Some(to.to_owned()),
        attributes: BTreeMap::new(),
        failure: None,
    }
}

fn add_library(
    report: &mut ResolutionReport,
    hashes: &mut HashMap<Utf8PathBuf, HexDigest>,
    name: &str,
    fill: &str,
) {
    let id = component_id(name);
    let file = Utf8PathBuf::from(format!("/cache/{}-{}.jar", id.module, id.version));
    ensure_component(report, name);
    report.artifacts.push(ReportArtifact {
        component: name.to_owned(),
        file: file.clone(),
        classifier: None,
        extension: None,
    });
    hashes.insert(
        file,
        HexDigest::try_from(fill.repeat(64)).expect("test hash"),
    );
}

impl GenerationWorld {
    fn app(&mut self) -> &mut ResolutionReport {
        self.report.as_mut().expect("application set")
    }

    fn encoded(&self) -> String {
        self.manifest.as_ref().expect("manifest generated").encode()
    }
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("an application \"{root}\"")]
fn given_application(world: &mut GenerationWorld, root: String) {
    world.report = Some(new_report(&root));
}

#[given("the repository \"{url}\"")]
fn given_repository(world: &mut GenerationWorld, url: String) {
    world
        .repositories
        .push(RepositoryUrl::parse(&url).expect("test repository"));
}

#[given("the library \"{name}\" with hash \"{fill}\"")]
fn given_library(world: &mut GenerationWorld, name: String, fill: String) {
    let report = world.report.as_mut().expect("application set");
    add_library(report, &mut world.hashes, &name, &fill);
}

#[given("\"{from}\" depends on \"{to}\"")]
fn given_dependency(world: &mut GenerationWorld, from: String, to: String) {
    add_dependency(world.app(), selected(&to), &from);
}

#[given("\"{from}\" depends on the platform \"{to}\"")]
fn given_platform_dependency(world: &mut GenerationWorld, from: String, to: String) {
    let mut dependency = selected(&to);
    dependency
        .attributes
        .insert(CATEGORY_ATTRIBUTE.to_owned(), "platform".to_owned());
    add_dependency(world.app(), dependency, &from);
}

#[given("\"{from}\" fails to resolve \"{requested}\"")]
fn given_unresolved_dependency(world: &mut GenerationWorld, from: String, requested: String) {
    let dependency = ReportDependency {
        requested: requested.clone(),
        selected: None,
        attributes: BTreeMap::new(),
        failure: Some(format!("Could not find {requested}")),
    };
    add_dependency(world.app(), dependency, &from);
}

#[given("only direct dependencies are listed")]
fn given_direct_only(world: &mut GenerationWorld) {
    world.direct_only = true;
}

#[given("a relocation rule from \"{from}\" to \"{to}\"")]
fn given_relocation_rule(world: &mut GenerationWorld, from: String, to: String) {
    world.relocations.push(Relocation::new(from, to));
}

#[given("the relocator needs the library \"{name}\" with hash \"{fill}\"")]
fn given_relocator_library(world: &mut GenerationWorld, name: String, fill: String) {
    let relocator = world
        .relocator
        .get_or_insert_with(|| new_report(RELOCATOR_ROOT));
    add_library(relocator, &mut world.hashes, &name, &fill);
    add_dependency(relocator, selected(&name), RELOCATOR_ROOT);
}

#[when("the manifest is generated")]
fn when_generated(world: &mut GenerationWorld) {
    let request = GenerationRequest {
        report: world.report.clone().expect("application set"),
        relocation_report: world.relocator.clone(),
        repositories: world.repositories.clone(),
        relocations: world.relocations.clone(),
        transitive: !world.direct_only,
        output_path: Utf8PathBuf::from("dependencies.txt"),
    };
    match build_manifest(&request, &TableHasher(&world.hashes)) {
        Ok(manifest) => world.manifest = Some(manifest),
        Err(err) => world.error = Some(err),
    }
}

#[when("the manifest is parsed back")]
fn when_parsed_back(world: &mut GenerationWorld) {
    let reparsed = parse_manifest(&world.encoded()).expect("generated manifest parses");
    world.reparsed = Some(reparsed);
}

#[then("the manifest has {count} lines")]
fn then_line_count(world: &mut GenerationWorld, count: usize) {
    assert_eq!(world.encoded().lines().count(), count);
}

#[then("manifest line {number} is \"{text}\"")]
fn then_line_is(world: &mut GenerationWorld, number: usize, text: String) {
    let encoded = world.encoded();
    let line = encoded.lines().nth(number - 1).expect("line exists");
    assert_eq!(line, text);
}

#[then("the listed dependencies are \"{list}\"")]
fn then_dependencies_are(world: &mut GenerationWorld, list: String) {
    let manifest = world.manifest.as_ref().expect("manifest generated");
    let listed: Vec<String> = manifest
        .dependencies()
        .iter()
        .map(|entry| entry.coordinate().to_string())
        .collect();
    let expected: Vec<&str> = list.split(", ").collect();
    assert_eq!(listed, expected);
}

#[then("generation fails mentioning \"{text}\"")]
fn then_generation_fails(world: &mut GenerationWorld, text: String) {
    assert!(world.manifest.is_none(), "generation unexpectedly succeeded");
    let err = world.error.as_ref().expect("error recorded");
    assert!(matches!(err, GenerationError::Resolution { .. }));
    assert!(err.to_string().contains(&text), "unexpected error: {err}");
}

#[then("the parsed manifest encodes identically")]
fn then_round_trip(world: &mut GenerationWorld) {
    let original = world.manifest.as_ref().expect("manifest generated");
    let reparsed = world.reparsed.as_ref().expect("manifest parsed");
    assert_eq!(reparsed, original);
    assert_eq!(reparsed.encode(), original.encode());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "Two libraries without relocation"
)]
fn scenario_two_libraries(world: GenerationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "A relocation rule adds the relocation section"
)]
fn scenario_relocation_section(world: GenerationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "A diamond lists the shared library once"
)]
fn scenario_diamond(world: GenerationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "Platforms are not listed"
)]
fn scenario_platforms(world: GenerationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "Direct dependencies only"
)]
fn scenario_direct_only(world: GenerationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "An unresolved dependency aborts generation"
)]
fn scenario_unresolved(world: GenerationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/manifest_generation.feature",
    name = "A generated manifest parses back to itself"
)]
fn scenario_round_trip(world: GenerationWorld) {
    let _ = world;
}

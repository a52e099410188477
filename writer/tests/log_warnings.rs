//! Checks that skipped inputs are reported through the `log` facade.
//!
//! `logtest` installs a process-wide logger, so every assertion lives in a
//! single test.

use camino::Utf8PathBuf;
use depset_writer::config::supported_repositories;
use depset_writer::pipeline::{GenerationRequest, build_manifest};
use depset_writer::relocation::Relocation;
use depset_writer::report::ResolutionReport;
use depset_writer::resolve::StreamingHasher;
use log::Level;
use logtest::Logger;

const EMPTY_APP: &str = r#"{
    "root": "com.example:app:1.0.0",
    "components": [{"id": {"group": "com.example", "module": "app", "version": "1.0.0"}}]
}"#;

fn drain_warnings(logger: &mut Logger) -> Vec<String> {
    let mut warnings = Vec::new();
    while let Some(record) = logger.pop() {
        if record.level() == Level::Warn {
            warnings.push(record.args().to_string());
        }
    }
    warnings
}

#[test]
fn skipped_inputs_are_warned_about() {
    let mut logger = Logger::start();

    let repositories =
        supported_repositories(&["file:///home/dev/.m2/repository", "https://jitpack.io"])
            .expect("valid repositories");
    assert_eq!(repositories.len(), 1);
    let warnings = drain_warnings(&mut logger);
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("skipping repository file:///home/dev/.m2/repository")),
        "missing repository warning in {warnings:?}"
    );

    let request = GenerationRequest {
        report: ResolutionReport::from_json(EMPTY_APP).expect("valid report"),
        relocation_report: None,
        repositories,
        relocations: vec![Relocation::new("com.foo", "shaded.com.foo")],
        transitive: true,
        output_path: Utf8PathBuf::from("dependencies.txt"),
    };
    let manifest = build_manifest(&request, &StreamingHasher::default()).expect("builds");
    assert!(manifest.has_relocation_section());
    assert!(manifest.relocation_dependencies().is_empty());
    let warnings = drain_warnings(&mut logger);
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("without a relocation report")),
        "missing relocation warning in {warnings:?}"
    );
}

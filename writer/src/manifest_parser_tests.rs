//! Tests for manifest parsing.

use super::*;
use rstest::rstest;

fn full_manifest() -> String {
    format!(
        concat!(
            "__repos__\nhttps://repo.example.com/\nhttps://jitpack.io/\n__end__\n",
            "__deps__\ng:a:1.0 {a}\ng:b:2.0:natives@zip {b}\n__end__\n",
            "__relocation__\ndep reloc:tool:1.0 {c}\n",
            "org.z s.org.z\ncom.foo shaded.com.foo :com.foo.a.* -com.foo.internal.*\n__end__\n",
        ),
        a = "a".repeat(64),
        b = "b".repeat(64),
        c = "c".repeat(64),
    )
}

#[test]
fn parses_every_section() {
    let manifest = parse_manifest(&full_manifest()).expect("valid manifest");
    assert_eq!(manifest.repositories().len(), 2);
    assert_eq!(manifest.dependencies().len(), 2);
    assert_eq!(
        manifest.dependencies()[1].coordinate().extension(),
        Some("zip")
    );
    assert_eq!(manifest.relocation_dependencies().len(), 1);
    assert_eq!(
        manifest.relocations(),
        [
            Relocation::new("org.z", "s.org.z"),
            Relocation::new("com.foo", "shaded.com.foo")
                .include("com.foo.a.*")
                .exclude("com.foo.internal.*"),
        ]
    );
}

#[test]
fn encoding_round_trips() {
    let text = full_manifest();
    let manifest = parse_manifest(&text).expect("valid manifest");
    assert_eq!(manifest.encode(), text);
}

#[rstest]
#[case::dependency("__deps__\ng:a:1.0 {sha1}\n__end__\n", 4)]
#[case::relocator_dependency(
    "__deps__\n__end__\n__relocation__\ndep reloc:tool:1.0 {sha1}\na b\n__end__\n",
    6
)]
fn sha1_hashes_are_rejected(#[case] body: &str, #[case] expected_line: usize) {
    let text = format!("__repos__\n__end__\n{}", body.replace("{sha1}", &"d".repeat(40)));
    let err = parse_manifest(&text).expect_err("SHA-1 must fail");
    assert!(
        matches!(err, ManifestParseError::MalformedLine { line, ref reason }
            if line == expected_line && reason.contains("SHA-1")),
        "unexpected error: {err}"
    );
}

#[test]
fn invalid_values_report_the_line_once() {
    use std::error::Error as _;

    let text = "__repos__\n__end__\n__deps__\ng:a 0000000000000000000000000000000000000000000000000000000000000000\n__end__\n";
    let err = parse_manifest(text).expect_err("must fail");
    assert_eq!(err.to_string(), "line 4: invalid value");
    assert!(err.source().is_some_and(|source| source.to_string().contains("g:a")));
}

#[test]
fn mandatory_sections_are_reported_in_order() {
    let err = parse_manifest("__relocation__\na b\n__end__\n").expect_err("must fail");
    assert!(matches!(err, ManifestParseError::MissingSection { name: "repos" }));
    let err = parse_manifest("__repos__\n__end__\n__relocation__\na b\n__end__\n")
        .expect_err("must fail");
    assert!(matches!(err, ManifestParseError::MissingSection { name: "deps" }));
    let err = parse_manifest("__repos__\n__end__\n").expect_err("must fail");
    assert!(matches!(err, ManifestParseError::MissingSection { name: "deps" }));
}

#[rstest]
#[case::stray_end("__end__\n")]
#[case::nested("__repos__\n__deps__\n__end__\n")]
#[case::outside("g:a:1.0 aa\n__repos__\n__end__\n")]
#[case::unknown("__repos__\n__end__\n__deps__\n__end__\n__extras__\n__end__\n")]
#[case::unterminated("__repos__\n__end__\n__deps__\n")]
#[case::missing_deps("__repos__\n__end__\n")]
#[case::missing_repos("__deps__\n__end__\n")]
#[case::out_of_order("__repos__\n__end__\n__deps__\n__end__\n__repos__\n__end__\n")]
#[case::empty("")]
fn rejects_structural_errors(#[case] text: &str) {
    assert!(parse_manifest(text).is_err(), "accepted: {text:?}");
}

#[test]
fn reports_line_of_stray_content() {
    let err = parse_manifest("__repos__\n__end__\nstray\n").expect_err("must fail");
    assert!(matches!(err, ManifestParseError::ContentOutsideSection { line: 3 }));
}

#[test]
fn reports_unknown_section_name() {
    let err = parse_manifest("__repos__\n__end__\n__deps__\n__end__\n__extras__\n__end__\n")
        .expect_err("must fail");
    assert!(matches!(err, ManifestParseError::UnknownSection { line: 5, ref name } if name == "extras"));
}

#[rstest]
#[case::no_hash("g:a:1.0")]
#[case::short_hash("g:a:1.0 abc")]
#[case::bad_coordinate("g:a 0000000000000000000000000000000000000000000000000000000000000000")]
fn rejects_malformed_dependency_lines(#[case] line: &str) {
    let text = format!("__repos__\n__end__\n__deps__\n{line}\n__end__\n");
    let err = parse_manifest(&text).expect_err("must fail");
    assert!(matches!(
        err,
        ManifestParseError::MalformedLine { line: 4, .. }
            | ManifestParseError::InvalidValue { line: 4, .. }
    ));
}

#[rstest]
#[case::no_slash("https://repo.example.com")]
#[case::file_scheme("file:///tmp/repo/")]
fn rejects_bad_repositories(#[case] url: &str) {
    let text = format!("__repos__\n{url}\n__end__\n__deps__\n__end__\n");
    assert!(parse_manifest(&text).is_err());
}

#[rstest]
#[case::single_token("com.foo")]
#[case::bad_filter("com.foo shaded.com.foo +com.foo.*")]
fn rejects_malformed_rules(#[case] rule: &str) {
    let text = format!("__repos__\n__end__\n__deps__\n__end__\n__relocation__\n{rule}\n__end__\n");
    let err = parse_manifest(&text).expect_err("must fail");
    assert!(matches!(err, ManifestParseError::MalformedLine { line: 6, .. }));
}

#[test]
fn rule_starting_with_dep_prefix_word_round_trips() {
    let mut registry = crate::relocation::RelocationRegistry::new();
    registry
        .add_rule(Relocation::new("depot", "shaded.depot"))
        .expect("valid");
    assert!(registry.add_rule(Relocation::new("dep", "shaded.dep")).is_err());

    let text = Manifest::builder()
        .relocations(&registry)
        .build()
        .expect("valid manifest")
        .encode();
    let manifest = parse_manifest(&text).expect("generated manifest parses");
    assert_eq!(manifest.relocations(), [Relocation::new("depot", "shaded.depot")]);
    assert!(manifest.relocation_dependencies().is_empty());
}

#[test]
fn conflicting_duplicate_entries_are_rejected() {
    let text = format!(
        "__repos__\n__end__\n__deps__\ng:a:1.0 {}\ng:a:1.0 {}\n__end__\n",
        "a".repeat(64),
        "b".repeat(64)
    );
    assert!(matches!(
        parse_manifest(&text),
        Err(ManifestParseError::Manifest(ManifestError::ConflictingHash { .. }))
    ));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = parse_manifest_file(Utf8Path::new("/nonexistent/depset/dependencies.txt"))
        .expect_err("must fail");
    assert!(matches!(err, ManifestParseError::Read { .. }));
}

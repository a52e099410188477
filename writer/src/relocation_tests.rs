//! Tests for relocation rules, the registry, and the shading adapter.

use super::*;
use rstest::rstest;

#[test]
fn rule_line_lists_includes_then_excludes() {
    let relocation = Relocation::new("com.foo", "shaded.com.foo")
        .exclude("com.foo.z.*")
        .include("com.foo.b.*")
        .include("com.foo.a.*");
    assert_eq!(
        relocation.to_string(),
        "com.foo shaded.com.foo :com.foo.a.* :com.foo.b.* -com.foo.z.*"
    );
}

#[test]
fn registry_keeps_insertion_order_and_assigns_ids() {
    let mut registry = RelocationRegistry::new();
    registry
        .add_rule(Relocation::new("org.zeta", "s.org.zeta"))
        .expect("valid");
    registry
        .add_rule(Relocation::new("com.alpha", "s.com.alpha"))
        .expect("valid");

    let froms: Vec<&str> = registry
        .rules()
        .iter()
        .map(|rule| rule.relocation().from.as_str())
        .collect();
    assert_eq!(froms, ["org.zeta", "com.alpha"]);
    assert!(registry.rules()[0].id() < registry.rules()[1].id());
}

#[test]
fn registered_rule_can_be_modified_later() {
    let mut registry = RelocationRegistry::new();
    let id = registry
        .add_rule(Relocation::new("com.foo", "shaded.com.foo"))
        .expect("valid")
        .id();
    registry
        .add_rule(Relocation::new("com.bar", "shaded.com.bar"))
        .expect("valid");

    registry
        .rule_mut(id)
        .and_then(|rule| rule.include("com.foo.api.*"))
        .expect("known rule");

    assert_eq!(
        registry.rules()[0].relocation().to_string(),
        "com.foo shaded.com.foo :com.foo.api.*"
    );
}

#[test]
fn unknown_rule_id_is_reported() {
    let mut other = RelocationRegistry::new();
    let id = other
        .add_rule(Relocation::new("a", "b"))
        .expect("valid")
        .id();
    let mut empty = RelocationRegistry::new();
    assert_eq!(
        empty.rule_mut(id).expect_err("empty registry"),
        RelocationError::UnknownRule { id }
    );
}

#[rstest]
#[case::empty_from(Relocation::new("", "x"))]
#[case::spaced_to(Relocation::new("com.foo", "shaded com.foo"))]
#[case::blank_include(Relocation::new("a", "b").include(""))]
#[case::spaced_exclude(Relocation::new("a", "b").exclude("a b"))]
#[case::dependency_marker(Relocation::new("dep", "shaded.dep"))]
fn invalid_relocations_are_rejected(#[case] relocation: Relocation) {
    let mut registry = RelocationRegistry::new();
    assert!(registry.add_rule(relocation.clone()).is_err());
    assert!(registry.is_empty());

    let mut shade = ShadeRules::new();
    assert!(shade.add_relocation(relocation).is_err());
    assert!(shade.relocations().is_empty());
}

#[test]
fn dependency_marker_is_reserved_as_from_package() {
    let mut registry = RelocationRegistry::new();
    let err = registry
        .add_rule(Relocation::new("dep", "shaded.dep"))
        .expect_err("reserved package");
    assert!(matches!(
        err,
        RelocationError::InvalidPackage { field: "from", ref value, .. } if value == "dep"
    ));

    registry
        .add_rule(Relocation::new("depot", "shaded.depot"))
        .expect("only the exact marker is reserved");
    registry
        .add_rule(Relocation::new("com.foo", "dep"))
        .expect("marker is allowed as a target");
}

#[test]
fn relocate_builds_the_rule_from_parts() {
    let mut shade = ShadeRules::new();
    shade
        .relocate(
            "com.foo",
            "shaded.com.foo",
            ["com.foo.b.*", "com.foo.a.*"],
            ["com.foo.z.*"],
        )
        .expect("valid");
    shade
        .relocate("org.yaml", "s.org.yaml", Vec::<String>::new(), Vec::<String>::new())
        .expect("valid");
    assert_eq!(
        shade.relocations(),
        [
            Relocation::new("com.foo", "shaded.com.foo")
                .include("com.foo.a.*")
                .include("com.foo.b.*")
                .exclude("com.foo.z.*"),
            Relocation::new("org.yaml", "s.org.yaml"),
        ]
    );
}

#[test]
fn relocate_validates_like_add_rule() {
    let mut registry = RelocationRegistry::new();
    assert!(
        registry
            .relocate("com.foo", "shaded.com.foo", [""], ["com.foo.z.*"])
            .is_err()
    );
    assert!(registry.is_empty());
}

#[test]
fn prefix_helper_relocates_each_package() {
    let mut registry = RelocationRegistry::new();
    relocate_with_prefix(&mut registry, "libs", ["a.b", "c.d"]).expect("valid");
    let lines: Vec<String> = registry
        .rules()
        .iter()
        .map(|rule| rule.relocation().to_string())
        .collect();
    assert_eq!(lines, ["a.b libs.a.b", "c.d libs.c.d"]);
}

#[test]
fn target_dispatches_to_either_adapter() {
    let mut registry = RelocationRegistry::new();
    let mut shade = ShadeRules::new();

    for mut target in [
        RelocationTarget::Manifest(&mut registry),
        RelocationTarget::Shade(&mut shade),
    ] {
        relocate_with_prefix(&mut target, "p", ["org.yaml"]).expect("valid");
    }

    assert_eq!(registry.rules().len(), 1);
    assert_eq!(
        shade.relocations(),
        [Relocation::new("org.yaml", "p.org.yaml")]
    );
}

#[test]
fn registry_collects_relocator_dependencies() {
    use depset_common::coordinate::Coordinate;
    use depset_common::digest::HexDigest;

    let mut registry = RelocationRegistry::new();
    let entry = ManifestEntry::new(
        Coordinate::parse("reloc:tool:1.0").expect("valid"),
        HexDigest::try_from("c".repeat(64)).expect("valid"),
    );
    registry.add_dependency(entry.clone());
    assert_eq!(registry.dependencies(), [entry]);
    assert!(registry.is_empty());
}

#[test]
fn relocations_deserialize_from_toml() {
    let relocation: Relocation = toml::from_str(
        "from = \"com.foo\"\nto = \"shaded.com.foo\"\nexcludes = [\"com.foo.keep.*\"]\n",
    )
    .expect("valid toml");
    assert_eq!(
        relocation,
        Relocation::new("com.foo", "shaded.com.foo").exclude("com.foo.keep.*")
    );
}

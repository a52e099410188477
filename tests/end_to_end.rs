//! End-to-end checks through the public facade, using real files and the
//! streaming hasher.

use camino::{Utf8Path, Utf8PathBuf};
use depset::common::{HashAlgorithm, RepositoryUrl};
use depset::writer::manifest_parser::parse_manifest_file;
use depset::writer::nested::NestedJarStager;
use depset::writer::relocation::Relocation;
use depset::writer::report::ResolutionReport;
use depset::writer::resolve::StreamingHasher;
use depset::writer::{GenerationRequest, generate};
use rstest::{fixture, rstest};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

struct Build {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Build {
    fn file(&self, relative: &str, content: &str) -> Utf8PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    fn report(&self, lwjgl: &Utf8Path, natives: &Utf8Path, gson: &Utf8Path) -> ResolutionReport {
        let value = json!({
            "root": "com.example:app:1.0.0",
            "components": [
                {
                    "id": {"group": "com.example", "module": "app", "version": "1.0.0"},
                    "dependencies": [
                        {"requested": "org.lwjgl:lwjgl:3.3.+", "selected": "org.lwjgl:lwjgl:3.3.1"},
                        {"requested": "com.google.code.gson:gson:2.10.1",
                         "selected": "com.google.code.gson:gson:2.10.1"}
                    ]
                },
                {"id": {"group": "org.lwjgl", "module": "lwjgl", "version": "3.3.1"}},
                {"id": {"group": "com.google.code.gson", "module": "gson", "version": "2.10.1"}}
            ],
            "artifacts": [
                {"component": "org.lwjgl:lwjgl:3.3.1", "file": lwjgl.as_str()},
                {"component": "org.lwjgl:lwjgl:3.3.1", "file": natives.as_str(),
                 "classifier": "natives-linux"},
                {"component": "com.google.code.gson:gson:2.10.1", "file": gson.as_str()}
            ]
        });
        ResolutionReport::from_json(&value.to_string()).expect("valid report")
    }
}

#[fixture]
fn build() -> Build {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    Build { _dir: dir, root }
}

#[rstest]
fn generated_manifest_hashes_real_files_and_parses_back(build: Build) {
    let lwjgl = build.file("cache/lwjgl-3.3.1.jar", "");
    let natives = build.file("cache/lwjgl-3.3.1-natives-linux.jar", "abc");
    let gson = build.file("cache/gson-2.10.1.jar", "abc");
    let output = build.root.join("build/generated/depset/dependencies.txt");

    let request = GenerationRequest {
        report: build.report(&lwjgl, &natives, &gson),
        relocation_report: None,
        repositories: vec![
            RepositoryUrl::parse("https://repo.maven.apache.org/maven2").expect("valid"),
        ],
        relocations: vec![Relocation::new("com.google.gson", "shaded.com.google.gson")],
        transitive: true,
        output_path: output.clone(),
    };
    let summary = generate(&request, &StreamingHasher::new(HashAlgorithm::Sha256))
        .expect("generation succeeds");
    assert_eq!(summary.dependencies, 3);
    assert_eq!(summary.relocation_rules, 1);

    let expected = format!(
        "__repos__\nhttps://repo.maven.apache.org/maven2/\n__end__\n\
         __deps__\n\
         com.google.code.gson:gson:2.10.1 {ABC_SHA256}\n\
         org.lwjgl:lwjgl:3.3.1 {EMPTY_SHA256}\n\
         org.lwjgl:lwjgl:3.3.1:natives-linux {ABC_SHA256}\n\
         __end__\n\
         __relocation__\ncom.google.gson shaded.com.google.gson\n__end__\n"
    );
    assert_eq!(fs::read_to_string(&output).expect("manifest written"), expected);

    let parsed = parse_manifest_file(&output).expect("manifest parses");
    assert_eq!(parsed.encode(), expected);
}

#[rstest]
fn regenerating_is_byte_identical(build: Build) {
    let lwjgl = build.file("cache/lwjgl-3.3.1.jar", "x");
    let natives = build.file("cache/lwjgl-3.3.1-natives-linux.jar", "y");
    let gson = build.file("cache/gson-2.10.1.jar", "z");
    let output = build.root.join("out/dependencies.txt");
    let request = GenerationRequest {
        report: build.report(&lwjgl, &natives, &gson),
        relocation_report: None,
        repositories: Vec::new(),
        relocations: Vec::new(),
        transitive: true,
        output_path: output.clone(),
    };
    let hasher = StreamingHasher::default();

    generate(&request, &hasher).expect("first run");
    let first = fs::read(&output).expect("first output");
    generate(&request, &hasher).expect("second run");
    assert_eq!(fs::read(&output).expect("second output"), first);
}

#[rstest]
fn nested_jars_are_staged_with_index(build: Build) {
    let first = build.file("libs/gson-2.10.1.jar", "gson");
    let second = build.file("libs/lwjgl-3.3.1.jar", "lwjgl");
    let stager = NestedJarStager::new(build.root.join("build/nested-jars"));

    stager.stage(&[first, second]).expect("staging succeeds");

    assert_eq!(
        fs::read_to_string(stager.index_path()).expect("index"),
        "gson-2.10.1.jar\nlwjgl-3.3.1.jar\n"
    );
    assert_eq!(
        fs::read_to_string(stager.output_dir().join("lwjgl-3.3.1.jar")).expect("copy"),
        "lwjgl"
    );
}

//! Integration tests for loading programs from disk.

use std::fs;
use std::path::Path;

use goinfer::{Config, Error, Program};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_fixture_module_paths() {
    let program = Program::load("testdata/fixtures").expect("fixtures should load");

    let root = program.root_package().expect("root package");
    assert_eq!(root.path, "example.com/fixtures");
    assert_eq!(root.name, "main");
    assert!(program.package_by_path("example.com/fixtures/sub").is_some());
}

#[test]
fn test_test_files_are_excluded_by_default() {
    let program = Program::load("testdata/fixtures").unwrap();
    assert!(program.func("TestOnly").is_none());

    let config = Config {
        include_test_files: Some(true),
        ..Config::default()
    };
    let program = Program::load_with("testdata/fixtures", &config).unwrap();
    assert!(program.func("TestOnly").is_some());
}

#[test]
fn test_skipped_directories_and_exclusions() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "go.mod", "module example.com/app\n\ngo 1.21\n");
    write(dir.path(), "app.go", "package app\n\nfunc App() int { return 1 }\n");
    write(dir.path(), "vendor/v/v.go", "package v\n");
    write(dir.path(), "testdata/t.go", "package t\n");
    write(dir.path(), ".hidden/h.go", "package h\n");
    write(dir.path(), "gen/generated.go", "package gen\n");
    write(dir.path(), "lib/lib.go", "package lib\n\nconst Name = \"lib\"\n");

    let config = Config {
        excluded_paths: vec!["gen/**".to_string()],
        ..Config::default()
    };
    let program = Program::load_with(dir.path(), &config).unwrap();

    let paths: Vec<&str> = program.packages().iter().map(|p| p.path.as_str()).collect();
    assert_eq!(paths, vec!["example.com/app", "example.com/app/lib"]);
}

#[test]
fn test_module_path_override() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.go", "package main\n\nfunc main() {}\n");

    let config = Config {
        module_path: Some("example.com/override".to_string()),
        ..Config::default()
    };
    let program = Program::load_with(dir.path(), &config).unwrap();

    assert_eq!(program.root_package().unwrap().path, "example.com/override");
}

#[test]
fn test_cross_package_resolution() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "go.mod", "module example.com/app\n");
    write(
        dir.path(),
        "app.go",
        "package app\n\nimport \"example.com/app/lib\"\n\nfunc Name() string { return lib.Name }\n",
    );
    write(dir.path(), "lib/lib.go", "package lib\n\nconst Name = \"lib\"\n");

    let program = Program::load(dir.path()).unwrap();
    let results = program.results_of(program.func("Name").unwrap()).unwrap().unwrap();

    assert_eq!(results.results.slot(0)[0].to_string(), "string(\"lib\")");
}

#[test]
fn test_empty_directory_is_an_error() {
    let dir = TempDir::new().unwrap();

    let err = Program::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::NoPackages(_)));
}

#[test]
fn test_missing_directory_is_an_error() {
    let err = Program::load("testdata/does-not-exist").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_config_from_yaml() {
    let config = Config::parse_str("include_test_files: true\nmax_call_depth: 8\n").unwrap();

    assert!(config.should_include_test_files());
    assert_eq!(config.max_call_depth(), 8);
    assert!(Config::parse_str("max_call_depth: 0\n").is_err());
}

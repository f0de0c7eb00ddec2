use acsync_fs::{ConfigStore, io};
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;
use std::fs;

#[test]
fn test_write_atomic_creates_missing_parents() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("deep/nested/dir/file.md");

    io::write_atomic(target.path(), b"hello").unwrap();

    target.assert("hello");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("settings.json");
    target.write_str("original").unwrap();

    io::write_atomic(target.path(), b"updated").unwrap();

    target.assert(predicate::str::diff("updated"));
}

#[test]
fn test_write_atomic_into_directory_fails_without_residue() {
    let temp = assert_fs::TempDir::new().unwrap();
    let blocked = temp.child("blocked.md");
    blocked.create_dir_all().unwrap();

    let result = io::write_atomic(blocked.path(), b"content");

    assert!(result.is_err());
    blocked.assert(predicate::path::is_dir());
    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1, "temp sibling must be removed on failure");
}

#[test]
fn test_read_text_opt_missing_is_none() {
    let temp = assert_fs::TempDir::new().unwrap();
    assert_eq!(io::read_text_opt(&temp.path().join("absent.md")).unwrap(), None);
}

#[test]
fn test_copy_recursive_copies_tree() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/SKILL.md").write_str("skill").unwrap();
    temp.child("src/scripts/run.sh").write_str("#!/bin/sh").unwrap();

    io::copy_recursive(&temp.path().join("src"), &temp.path().join("dst")).unwrap();

    temp.child("dst/SKILL.md").assert("skill");
    temp.child("dst/scripts/run.sh").assert("#!/bin/sh");
}

#[test]
fn test_list_files_recursive_is_sorted_and_relative() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("b.txt").touch().unwrap();
    temp.child("a/z.txt").touch().unwrap();
    temp.child("a/c.txt").touch().unwrap();

    let files = io::list_files_recursive(temp.path()).unwrap();
    let files: Vec<String> = files
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(files, vec!["a/c.txt", "a/z.txt", "b.txt"]);
}

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Settings {
    exclusions: Vec<String>,
}

#[rstest]
#[case("config.toml", "exclusions = [\"draft-*\"]\n")]
#[case("config.json", "{\"exclusions\": [\"draft-*\"]}\n")]
#[case("config.yaml", "exclusions:\n  - draft-*\n")]
#[case("config.YML", "exclusions: [\"draft-*\"]\n")]
fn test_config_store_loads_by_extension(#[case] file: &str, #[case] content: &str) {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child(file);
    config.write_str(content).unwrap();

    let loaded: Settings = ConfigStore::new().load(config.path()).unwrap();

    assert_eq!(
        loaded,
        Settings {
            exclusions: vec!["draft-*".to_string()],
        }
    );
}

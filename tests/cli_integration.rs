//! End-to-end tests of the `trellis` binary: init, schema edits, row
//! edits, check, and fingerprint against a real workspace directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn trellis(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("trellis").unwrap();
    cmd.arg("--cwd").arg(dir);
    cmd
}

/// init + a small Warehouse schema with one linked row pair.
fn seeded(dir: &Path) {
    trellis(dir).args(["init", "Warehouse"]).assert().success();
    trellis(dir).args(["entity", "add", "Server"]).assert().success();
    trellis(dir).args(["entity", "add", "Cube"]).assert().success();
    trellis(dir)
        .args(["property", "add", "Cube", "Purpose", "--type", "text", "--nullable"])
        .assert()
        .success();
    trellis(dir).args(["rel", "add", "Cube", "Server"]).assert().success();
    trellis(dir).args(["rows", "upsert", "Server", "s1"]).assert().success();
    trellis(dir)
        .args(["rows", "upsert", "Cube", "c1", "--link", "ServerId=s1"])
        .assert()
        .success();
}

fn fingerprint(dir: &Path) -> String {
    let output = trellis(dir).arg("fingerprint").assert().success();
    String::from_utf8(output.get_output().stdout.clone())
        .unwrap()
        .trim()
        .to_string()
}

#[test]
fn init_creates_canonical_files() {
    let dir = TempDir::new().unwrap();
    trellis(dir.path())
        .args(["init", "Warehouse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized workspace 'Warehouse'"));

    dir.child("model.xml")
        .assert("<Model Name=\"Warehouse\"/>\n");
    dir.child("data").assert(predicate::path::is_dir());
}

#[test]
fn init_refuses_an_existing_workspace() {
    let dir = tempfile::tempdir().unwrap();
    trellis(dir.path()).args(["init", "Warehouse"]).assert().success();
    trellis(dir.path())
        .args(["init", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn check_passes_on_a_consistent_workspace() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());
    trellis(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn rejected_edit_fails_and_leaves_files_untouched() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());
    let model_before = fs::read_to_string(dir.path().join("model.xml")).unwrap();
    let print_before = fingerprint(dir.path());

    // Deleting Server is blocked: it holds a record and Cube points at it.
    trellis(dir.path())
        .args(["entity", "rm", "Server"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("in use"));

    let model_after = fs::read_to_string(dir.path().join("model.xml")).unwrap();
    assert_eq!(model_before, model_after);
    assert_eq!(print_before, fingerprint(dir.path()));
}

#[test]
fn orphan_link_is_rejected_with_its_location() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    trellis(dir.path())
        .args(["rows", "upsert", "Cube", "c2", "--link", "ServerId=missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rolled back"));

    // The bad row never reached disk.
    let shard = fs::read_to_string(dir.path().join("data/Cube.xml")).unwrap();
    assert!(!shard.contains("c2"));
}

#[test]
fn check_reports_json_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    // Break referential integrity behind the tool's back.
    let shard_path = dir.path().join("data/Cube.xml");
    let shard = fs::read_to_string(&shard_path).unwrap();
    fs::write(&shard_path, shard.replace("s1", "ghost")).unwrap();

    trellis(dir.path())
        .args(["--json", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\": \"relationship.orphan\""))
        .stdout(predicate::str::contains("instance/Cube/c1/relationship/ServerId/ghost"));
}

#[test]
fn fingerprint_is_stable_until_content_changes() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    let first = fingerprint(dir.path());
    assert_eq!(first.len(), 64);
    assert_eq!(first, fingerprint(dir.path()));

    trellis(dir.path())
        .args(["rows", "upsert", "Cube", "c1", "--set", "Purpose=analytics"])
        .assert()
        .success();
    assert_ne!(first, fingerprint(dir.path()));
}

#[test]
fn entity_rename_rewrites_links_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    trellis(dir.path())
        .args(["entity", "rename", "Server", "Host"])
        .assert()
        .success();

    assert!(dir.path().join("data/Host.xml").exists());
    assert!(!dir.path().join("data/Server.xml").exists());
    let cube = fs::read_to_string(dir.path().join("data/Cube.xml")).unwrap();
    assert!(cube.contains("HostId=\"s1\""));
}

#[test]
fn reserved_keyword_identifier_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path());

    trellis(dir.path())
        .args(["property", "add", "Cube", "Select"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rolled back"));
}

#[test]
fn completion_prints_a_script() {
    let dir = tempfile::tempdir().unwrap();
    trellis(dir.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trellis"));
}

#[test]
fn commands_outside_a_workspace_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    trellis(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a trellis workspace"));
}

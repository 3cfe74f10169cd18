//! End-to-end tests for the `mortar` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

const MODEL: &str = r#"
[application]
module = "github.com/acme/shop"

[[entities]]
name = "Widget"
fields = ["Name:string(required)"]
"#;

/// A command isolated from the user's config, env and working directory.
fn mortar(dir: &TempDir) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("mortar");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("RUST_LOG")
        .env_remove("MORTAR_GENERATION__DRY_RUN")
        .env_remove("MORTAR_GENERATION__ROOT")
        .env_remove("MORTAR_OUTPUT__FORMAT");
    cmd
}

fn workspace(model: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("entities.toml"), model).unwrap();
    dir
}

fn generate(dir: &TempDir) -> Command {
    let mut cmd = mortar(dir);
    cmd.args(["generate", "--model", "entities.toml", "--root", "out"]);
    cmd
}

fn record_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("out/internal/domain/widget.go")
}

#[test]
fn help_names_the_generate_command() {
    let dir = tempfile::tempdir().unwrap();
    mortar(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn version_flag() {
    let dir = tempfile::tempdir().unwrap();
    mortar(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn generate_creates_the_layers() {
    let dir = workspace(MODEL);
    generate(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 written, 0 unchanged"));

    let record = fs::read_to_string(record_path(&dir)).unwrap();
    assert!(record.starts_with("package domain"));
    assert!(record.contains("type Widget struct"));
    assert!(dir.path().join("out/internal/usecase/widget.go").exists());
}

#[test]
fn rerun_writes_nothing() {
    let dir = workspace(MODEL);
    generate(&dir).assert().success();
    let before = fs::read_to_string(record_path(&dir)).unwrap();

    generate(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 written, 4 unchanged"));
    assert_eq!(fs::read_to_string(record_path(&dir)).unwrap(), before);
}

#[test]
fn dry_run_leaves_the_tree_empty() {
    let dir = workspace(MODEL);
    generate(&dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn dry_run_from_the_environment() {
    let dir = workspace(MODEL);
    generate(&dir)
        .env("MORTAR_GENERATION__DRY_RUN", "true")
        .assert()
        .success();
    assert!(!dir.path().join("out").exists());
}

#[test]
fn root_from_a_config_file() {
    let dir = workspace(MODEL);
    fs::write(
        dir.path().join("mortar.toml"),
        "[generation]\nroot = \"service\"\n",
    )
    .unwrap();

    mortar(&dir)
        .args(["--config", "mortar.toml", "generate", "-m", "entities.toml"])
        .assert()
        .success();
    assert!(dir.path().join("service/internal/domain/widget.go").exists());
}

#[test]
fn explicit_config_file_must_exist() {
    let dir = workspace(MODEL);
    mortar(&dir)
        .args(["--config", "missing.toml", "generate", "-m", "entities.toml"])
        .assert()
        .code(4);
}

#[test]
fn json_report() {
    let dir = workspace(MODEL);
    let output = generate(&dir)
        .args(["--output-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["entities"], 1);
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["files"].as_array().unwrap().len(), 4);
}

#[test]
fn missing_model_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    mortar(&dir)
        .args(["generate", "--model", "nope.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn malformed_model_is_a_user_error() {
    let dir = workspace("[application\nmodule = 1\n");
    generate(&dir).assert().code(2);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    mortar(&dir).arg("frobnicate").assert().code(2);
}

#[test]
fn conflicting_file_exits_with_conflict_code() {
    let dir = workspace(MODEL);
    let record = record_path(&dir);
    fs::create_dir_all(record.parent().unwrap()).unwrap();
    let hand_written = "package domain\n\nfunc Widget() {}\n";
    fs::write(&record, hand_written).unwrap();

    generate(&dir)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("internal/domain/widget.go"));

    assert_eq!(fs::read_to_string(&record).unwrap(), hand_written);
    assert!(exists(dir.path(), "out/internal/usecase/widget.go"));
}

fn exists(root: &Path, rel: &str) -> bool {
    root.join(rel).exists()
}

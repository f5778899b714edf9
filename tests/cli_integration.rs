use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn snapcheck() -> Command {
    Command::cargo_bin("snapcheck").unwrap()
}

#[test]
fn validate_clean_tree_exits_zero() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "ns1/Pod/web.yaml",
        "metadata:\n  name: web\n  labels:\n    app: web\n",
    );
    write(
        dir.path(),
        "ns1/Service/web.yaml",
        "metadata:\n  name: web\nspec:\n  selector:\n    app: web\n",
    );

    snapcheck()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No broken references found."));
}

#[test]
fn validate_broken_reference_exits_one() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "ns1/Service/web.yaml",
        "metadata:\n  name: web\nspec:\n  selector:\n    app: missing\n",
    );
    write(dir.path(), "ns1/Pod/other.yaml", "metadata:\n  name: other\n");

    snapcheck()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Broken references (1):"));
}

#[test]
fn analyze_reports_orphans_but_exits_zero() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ns1/Pod/bare.yaml", "metadata:\n  name: bare\n");

    snapcheck()
        .arg("analyze")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Orphaned resources (1):"));
}

#[test]
fn analyze_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ns1/ConfigMap/cm.yaml", "metadata:\n  name: cm\n");

    let output = snapcheck()
        .arg("analyze")
        .arg(dir.path())
        .args(["--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["summary"]["totalOrphanedResources"], 1);
    assert_eq!(report["orphanedResources"][0]["type"], "ConfigMap");
    assert_eq!(report["orphanedResources"][0]["reason"], "NoReferences");
}

#[test]
fn missing_export_root_exits_two() {
    snapcheck()
        .arg("validate")
        .arg("/does/not/exist")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read export root"));
}

#[test]
fn unknown_output_format_exits_two() {
    let dir = TempDir::new().unwrap();
    snapcheck()
        .arg("validate")
        .arg(dir.path())
        .args(["--output", "xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported output format"));
}

//! End-to-end tests for the `docs2md` binary.

mod common;

use assert_cmd::Command;
use common::{write_corrupt, write_docx, write_pptx, Para};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn docs2md() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docs2md"));
    for var in [
        "DOCS2MD_OUTPUT_DIR",
        "DOCS2MD_NO_PARALLEL",
        "DOCS2MD_WORKERS",
        "DOCS2MD_SKIP_PDF",
        "DOCS2MD_SUMMARY",
        "DOCS2MD_QUIET",
        "DOCS2MD_ENABLE_OCR",
        "DOCS2MD_OCR_LANG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--no-progress");
    cmd
}

fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_docx(
        &dir.path().join("memo.docx"),
        "Memo",
        "Ada",
        &[Para::Heading(1, "Memo"), Para::Text("Body")],
    );
    write_pptx(&dir.path().join("slides/deck.pptx"), &[("Hello", "World")]);
    dir
}

#[test]
fn help_lists_flags() {
    Command::new(env!("CARGO_BIN_EXE_docs2md"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--skip-pdf"));
}

#[test]
fn unknown_flag_is_usage_error() {
    docs2md()
        .args(["--definitely-not-a-flag", "."])
        .assert()
        .code(2);
}

#[test]
fn missing_path_exits_with_one() {
    docs2md()
        .arg("/no/such/place/anywhere")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unsupported_single_file_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "hello").unwrap();

    docs2md()
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".txt"));
}

#[test]
fn converts_tree_into_output_dir() {
    let input = sample_tree();
    let out = TempDir::new().unwrap();

    docs2md()
        .arg(input.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("memo.docx"))
        .stdout(predicate::str::contains("deck.pptx"));

    assert!(out.path().join("memo.md").exists());
    assert!(out.path().join("memo.json").exists());
    assert!(out.path().join("slides/deck.md").exists());
    let md = fs::read_to_string(out.path().join("slides/deck.md")).unwrap();
    assert!(md.starts_with("# Slide 1"));
}

#[test]
fn failed_file_does_not_fail_the_run() {
    let input = sample_tree();
    write_corrupt(&input.path().join("broken.pptx"));

    docs2md()
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("broken.pptx"))
        .stderr(predicate::str::contains("/3 files converted"));

    assert!(input.path().join("memo.md").exists());
    assert!(!input.path().join("broken.md").exists());
}

#[test]
fn summary_flag_prints_table_and_totals() {
    let input = sample_tree();
    write_corrupt(&input.path().join("broken.docx"));

    docs2md()
        .arg(input.path())
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status"))
        .stdout(predicate::str::contains("Total: 3 | Success: 2 | Failed: 1"));
}

#[test]
fn json_flag_prints_machine_readable_report() {
    let input = sample_tree();

    let output = docs2md()
        .arg(input.path())
        .arg("--json")
        .arg("--no-parallel")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["succeeded"] == true));
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["by_type"]["pptx"], 1);
}

#[test]
fn empty_directory_warns_and_succeeds() {
    let dir = TempDir::new().unwrap();
    docs2md()
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No PDF, DOCX or PPTX files found"));
}

#[test]
fn skip_pdf_ignores_pdf_files() {
    let input = sample_tree();
    common::write_pdf(&input.path().join("paper.pdf"), "Text");

    docs2md()
        .arg(input.path())
        .arg("--skip-pdf")
        .assert()
        .success()
        .stderr(predicate::str::contains("/2 files converted"));
    assert!(!input.path().join("paper.md").exists());
}

#[cfg(not(feature = "ocr"))]
#[test]
fn enable_ocr_without_the_feature_is_a_config_error() {
    let input = sample_tree();
    docs2md()
        .arg(input.path())
        .arg("--enable-ocr")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`ocr` feature"));
    assert!(!input.path().join("memo.md").exists());
}

//! CLI smoke tests over text statements.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_statement(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn process_text_statement_outputs_flat_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_statement(
        &dir,
        "statement.txt",
        "HDFC Bank Credit Card Statement\n\
         Statement Date: 15/08/2025\n\
         Payment Due Date: 05/09/2025\n\
         Total Dues: 3,200.00\n\
         Minimum Amount Due: 160.00\n",
    );

    Command::cargo_bin("cardsense")
        .unwrap()
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_due\": \"3,200.00\""))
        .stdout(predicate::str::contains("\"minimum_due\": \"160.00\""))
        .stdout(predicate::str::contains("\"statement_date\": \"2025-08-15\""));
}

#[test]
fn process_unresolved_fields_are_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_statement(&dir, "empty.txt", "no numbers here at all\n");

    Command::cargo_bin("cardsense")
        .unwrap()
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"credit_limit\": \"N/A\""));
}

#[test]
fn process_missing_file_fails() {
    Command::cargo_bin("cardsense")
        .unwrap()
        .arg("process")
        .arg("does-not-exist.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn process_csv_format_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_statement(
        &dir,
        "statement.txt",
        "Total Amount Due: 3,200.00\n",
    );

    Command::cargo_bin("cardsense")
        .unwrap()
        .arg("process")
        .arg(&input)
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total_due"))
        .stdout(predicate::str::contains("3,200.00"));
}

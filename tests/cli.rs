use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const CSV: &str = "name,a,b,group\nw,1,2,x\nx,2,1,x\ny,3,4,y\nz,4,3,y\n";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("dsplot").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dsplot"));
}

#[test]
fn hist_writes_svg_with_config_labels() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.csv");
    let labels = dir.path().join("labels.ini");
    let out = dir.path().join("hist.svg");
    fs::write(&input, CSV).unwrap();
    fs::write(&labels, "[Columns]\na = Alpha value\n").unwrap();

    let mut cmd = Command::cargo_bin("dsplot").unwrap();
    cmd.arg("hist")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .arg("--labels")
        .arg(&labels)
        .args(["--title", "Spread", "a"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Wrote chart"));
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("Alpha value"));
}

#[test]
fn matrix_and_grouped_bar() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.csv");
    fs::write(&input, CSV).unwrap();

    let out = dir.path().join("matrix.svg");
    let mut cmd = Command::cargo_bin("dsplot").unwrap();
    cmd.arg("matrix").arg(&input).arg("-o").arg(&out);
    cmd.assert().success();
    assert!(out.exists());

    let out = dir.path().join("bars.svg");
    let mut cmd = Command::cargo_bin("dsplot").unwrap();
    cmd.arg("bar")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .args(["a", "--key", "group", "--label", "name", "--stacked"]);
    cmd.assert().success();
    assert!(out.exists());
}

#[test]
fn table_prints_html() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.csv");
    fs::write(&input, CSV).unwrap();
    let mut cmd = Command::cargo_bin("dsplot").unwrap();
    cmd.arg("table").arg(&input).args(["--limit", "2"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<th>index</th>"))
        .stdout(predicate::str::contains("<td>x</td>"));
}

#[test]
fn unknown_column_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.csv");
    fs::write(&input, CSV).unwrap();
    let mut cmd = Command::cargo_bin("dsplot").unwrap();
    cmd.arg("hist")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("x.svg"))
        .arg("nope");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("column not found: nope"));
}

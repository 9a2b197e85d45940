use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const PERSON: &str =
    r#"{"name": "John Doe", "age": 31, "number": 1337.0, "address": { "city": "Uppsala"} }"#;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn census_counts_every_node() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("person.json");
    write_file(&input, PERSON);

    cargo_bin_cmd!("ujdom")
        .arg(&input)
        .assert()
        .success()
        .stdout(
            contains("root: object\n")
                .and(contains("nodes: 6\n"))
                .and(contains("int32: 1\n"))
                .and(contains("double: 1\n"))
                .and(contains("string: 2\n"))
                .and(contains("object: 2\n")),
        );
}

#[test]
fn unpack_keys_with_format() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("person.json");
    write_file(&input, PERSON);

    cargo_bin_cmd!("ujdom")
        .arg(&input)
        .args(["--keys", "name,age,number,address", "--format", "SNNO"])
        .assert()
        .success()
        .stdout(
            "name: string \"John Doe\"\n\
             age: int32 31\n\
             number: double 1337\n\
             address: object (1 members)\n\
             matched: 4/4\n",
        );
}

#[test]
fn unpack_reports_missing_and_mismatched_keys() {
    cargo_bin_cmd!("ujdom")
        .args(["--keys", "name,zip", "--format", "NS"])
        .write_stdin(PERSON)
        .assert()
        .success()
        .stdout("name: <missing>\nzip: <missing>\nmatched: 0/2\n");
}

#[test]
fn stats_report_growth_for_small_heap() {
    let items: Vec<String> = (0..200).map(|index| format!("\"entry {index}\"")).collect();
    let document = format!("[{}]", items.join(","));

    cargo_bin_cmd!("ujdom")
        .args(["--heap-size", "256", "--stats"])
        .write_stdin(document)
        .assert()
        .success()
        .stdout(contains("string: 200\n").and(contains("slabs: ")).and(contains("owned slabs: ")))
        .stdout(contains("slabs: 1\n").not());
}

#[test]
fn syntax_error_exits_with_message() {
    cargo_bin_cmd!("ujdom")
        .write_stdin("{\"a\": ")
        .assert()
        .failure()
        .stderr(contains("ERROR  "));
}

#[test]
fn bad_format_is_reported() {
    cargo_bin_cmd!("ujdom")
        .args(["--keys", "a", "--format", "Q"])
        .write_stdin(r#"{"a": 1}"#)
        .assert()
        .failure()
        .stderr(contains("invalid type code"));
}

#[test]
fn unreservable_heap_size_is_reported() {
    cargo_bin_cmd!("ujdom")
        .args(["--heap-size", "18446744073709551615"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(contains("ERROR  ").and(contains("initial heap")));
}

#[test]
fn deeply_nested_input_is_accepted() {
    let document = format!("{}{}", "[".repeat(1000), "]".repeat(1000));
    cargo_bin_cmd!("ujdom")
        .write_stdin(document)
        .assert()
        .success()
        .stdout(contains("array: 1000\n"));
}

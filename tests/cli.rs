//! End-to-end tests for the `snss-redact` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn snss_file(version: i32, records: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"SNSS");
    out.extend_from_slice(&version.to_le_bytes());
    for payload in records {
        out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        out.extend_from_slice(payload);
    }
    out
}

const RECORDS: &[&[u8]] = &[&[6, 0x10, 0x20, 0x30], &[1, 0xaa], &[255]];

fn bin() -> Command {
    Command::cargo_bin("snss-redact").unwrap()
}

/// The single session file `redact` wrote into `dir`.
fn written_session_file(dir: &Path) -> PathBuf {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one output file");
    entries.pop().unwrap()
}

#[test]
fn list_prints_plan_notation() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Current Session");
    fs::write(&input, snss_file(3, RECORDS)).unwrap();

    bin()
        .arg("list")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("00000008: C6"))
        .stdout(predicate::str::contains("0000000e: C1"))
        .stdout(predicate::str::contains("00000012: C255"));
}

#[test]
fn list_warns_when_a_v3_file_lacks_the_initial_state_marker() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("session");
    fs::write(&input, snss_file(3, &[&[6, 1]])).unwrap();

    bin()
        .arg("list")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("incompletely written"));
}

#[test]
fn redact_without_a_plan_copies_everything() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let data = snss_file(1, RECORDS);
    let input = dir.path().join("session");
    fs::write(&input, &data).unwrap();

    bin()
        .arg("redact")
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("kept 3 command(s), dropped 0"));

    let written = written_session_file(out_dir.path());
    assert!(written
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("Session_"));
    assert_eq!(fs::read(&written).unwrap(), data);
}

#[test]
fn redact_with_a_plan_drops_the_marked_command() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("session");
    fs::write(&input, snss_file(1, RECORDS)).unwrap();

    // list output with the C1 record marked for omission
    let plan = "\
00000008: C6      4 bytes  06 10 20 30
-0000000e: C1     2 bytes  01 aa
00000012: C255   1 bytes  ff
";
    let plan_path = dir.path().join("plan.txt");
    fs::write(&plan_path, plan).unwrap();

    bin()
        .arg("redact")
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("--plan")
        .arg(&plan_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("kept 2 command(s), dropped 1"));

    let written = written_session_file(out_dir.path());
    assert_eq!(
        fs::read(&written).unwrap(),
        snss_file(1, &[RECORDS[0], RECORDS[2]])
    );
}

#[test]
fn tabs_kind_names_the_output_accordingly() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tabs");
    fs::write(&input, snss_file(1, RECORDS)).unwrap();

    bin()
        .arg("redact")
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("--kind")
        .arg("tabs")
        .assert()
        .success();

    let written = written_session_file(out_dir.path());
    assert!(written
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("Tabs_"));
}

#[test]
fn stale_plan_fails_and_cleans_up_the_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("session");
    fs::write(&input, snss_file(1, RECORDS)).unwrap();

    // Plan claims the second record is a C2; the stream has a C1.
    let plan = "\
00000008: C6
-0000000e: C2
00000012: C255
";
    let plan_path = dir.path().join("plan.txt");
    fs::write(&plan_path, plan).unwrap();

    bin()
        .arg("redact")
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("--plan")
        .arg(&plan_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("type mismatch"))
        .stderr(predicate::str::contains("0x0000000e"));

    // The partially written destination must not survive the failure.
    assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn non_snss_input_is_rejected_with_a_signature_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bookmarks");
    fs::write(&input, b"not a session file at all").unwrap();

    bin()
        .arg("redact")
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an SNSS file"));

    assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn malformed_plan_line_reports_its_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("session");
    fs::write(&input, snss_file(1, RECORDS)).unwrap();

    let plan_path = dir.path().join("plan.txt");
    fs::write(&plan_path, "00000008: C6\ngarbage here\n").unwrap();

    bin()
        .arg("redact")
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("--plan")
        .arg(&plan_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

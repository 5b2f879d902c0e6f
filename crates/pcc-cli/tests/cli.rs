//! Black-box tests of the `pcc` binary: stdout JSON, stderr reason, exit codes.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Helper to get a Command for the pcc binary.
#[allow(deprecated)]
fn pcc_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pcc").unwrap();
    cmd.env("PCC_GIT_SHA", "testsha").env_remove("RUST_LOG");
    cmd
}

const RECORDS: &str = concat!(
    "{\"type\":\"summary\",\"asset_id\":\"tender:pack/x\",\"docs_total\":3,\"ts\":\"2024-01-01T00:00:00Z\"}\n",
    "{\"type\":\"term\",\"asset_id\":\"tender:pack/x\",\"key\":\"price:currency\",\"value\":\"NOK\"}\n",
);

const FAILING_CHECKS: &str = concat!(
    "{\"token\":\"tender:pack:parse_ok\",\"ok\":true}\n",
    "{\"token\":\"tender:criteria:weights_disclosed\",\"ok\":false,\"details\":\"no weights\"}\n",
);

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    let text = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(text.lines().count(), 1, "stdout: {text}");
    serde_json::from_str(text.trim()).unwrap()
}

#[test]
fn help_works() {
    pcc_cmd().arg("--help").assert().success();
}

#[test]
fn run_allows_and_publishes() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "Tender Pack.jsonl", RECORDS);
    let out = tmp.path().join("out");

    let output = pcc_cmd()
        .args(["run", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("allow because ok, window 5m"))
        .get_output()
        .clone();

    let decision = stdout_json(&output);
    assert_eq!(decision["decision"], "allow");
    assert_eq!(decision["token"], "ok");
    assert_eq!(decision["exit_code"], 0);
    assert_eq!(decision["asset_id"], "tender:pack/tender_pack");
    assert_eq!(decision["vcs_revision"], "testsha");
    assert_eq!(decision["checks"][0]["token"], "system:input:parse_ok");

    let ledger = fs::read_to_string(out.join("proof/receipts.jsonl")).unwrap();
    assert_eq!(ledger.lines().count(), 2);
    let manifest = fs::read_to_string(out.join("proof/root.txt")).unwrap();
    assert!(manifest.starts_with("root: "));
    assert!(manifest.contains("\nlines: 2\n"));
    assert!(manifest.ends_with("git_sha: testsha\n"));
}

#[test]
fn run_blocks_under_enforce() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "records.jsonl", RECORDS);
    let checks = write(tmp.path(), "checks.jsonl", FAILING_CHECKS);

    let output = pcc_cmd()
        .args(["run", "--posture", "enforce", "--records"])
        .arg(&records)
        .arg("--checks")
        .arg(&checks)
        .arg("--out")
        .arg(tmp.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "blocked because tender:criteria:weights_disclosed, held 5m",
        ))
        .get_output()
        .clone();

    let decision = stdout_json(&output);
    assert_eq!(decision["decision"], "block");
    assert_eq!(decision["posture"], "enforce");
    // The ledger is still published.
    assert!(tmp.path().join("out/proof/root.txt").exists());
}

#[test]
fn run_same_failure_allows_under_advice() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "records.jsonl", RECORDS);
    let checks = write(tmp.path(), "checks.jsonl", FAILING_CHECKS);

    pcc_cmd()
        .args(["run", "--records"])
        .arg(&records)
        .arg("--checks")
        .arg(&checks)
        .arg("--out")
        .arg(tmp.path().join("out"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"decision\":\"allow\""));
}

#[test]
fn run_config_sets_posture_and_pack() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "records.jsonl", RECORDS);
    let checks = write(tmp.path(), "checks.jsonl", FAILING_CHECKS);
    let config = write(
        tmp.path(),
        "pcc.yaml",
        "tool: tender-digest\npack: tender-core\nposture: enforce\n",
    );

    let output = pcc_cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "--records"])
        .arg(&records)
        .arg("--checks")
        .arg(&checks)
        .arg("--out")
        .arg(tmp.path().join("out"))
        .assert()
        .code(2)
        .get_output()
        .clone();

    let decision = stdout_json(&output);
    assert_eq!(decision["tool"], "tender-digest");
    assert_eq!(decision["pack"], "tender-core");
}

#[test]
fn run_unparseable_records_is_structural_block() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "records.jsonl", "{\"type\":\"a\"}\nnot json\n");
    let out = tmp.path().join("out");

    let enforce = pcc_cmd()
        .args(["run", "--posture", "enforce", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "blocked because system:parse_error, held 5m",
        ))
        .get_output()
        .clone();
    let decision = stdout_json(&enforce);
    assert_eq!(decision["token"], "system:parse_error");
    assert_eq!(decision["checks"][0]["ok"], false);
    assert!(!out.exists());

    pcc_cmd()
        .args(["run", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"decision\":\"block\""));
}

#[test]
fn verify_round_trip_and_tamper() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "records.jsonl", RECORDS);
    let out = tmp.path().join("out");
    pcc_cmd()
        .args(["run", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let ledger = out.join("proof/receipts.jsonl");
    let manifest = out.join("proof/root.txt");

    let ok = pcc_cmd()
        .args(["verify", "--receipts"])
        .arg(&ledger)
        .arg("--root")
        .arg(&manifest)
        .assert()
        .success()
        .get_output()
        .clone();
    let report = stdout_json(&ok);
    assert_eq!(report["verified"], true);
    assert_eq!(report["computed"], report["expected"]);

    let text = fs::read_to_string(&ledger).unwrap();
    fs::write(&ledger, text.replacen("NOK", "NOX", 1)).unwrap();

    let bad = pcc_cmd()
        .args(["verify", "--receipts"])
        .arg(&ledger)
        .arg("--root")
        .arg(&manifest)
        .assert()
        .code(1)
        .get_output()
        .clone();
    assert_eq!(stdout_json(&bad)["verified"], false);
}

#[test]
fn verify_missing_root_line() {
    let tmp = TempDir::new().unwrap();
    let ledger = write(tmp.path(), "receipts.jsonl", "");
    let manifest = write(tmp.path(), "root.txt", "lines: 0\n");
    pcc_cmd()
        .args(["verify", "--receipts"])
        .arg(&ledger)
        .arg("--root")
        .arg(&manifest)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"expected\":\"\""));
}

#[test]
fn diff_reports_changes() {
    let tmp = TempDir::new().unwrap();
    let old = write(tmp.path(), "old.jsonl", "{\"k\":1}\n{\"k\":2}\n");
    let new = write(tmp.path(), "new.jsonl", "{\"k\":2}\n{\"k\":3}\n");

    let output = pcc_cmd()
        .args(["diff", "--old"])
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .assert()
        .success()
        .get_output()
        .clone();
    let diff = stdout_json(&output);
    assert_eq!(diff["added_count"], 1);
    assert_eq!(diff["removed_count"], 1);
    assert_eq!(diff["added"][0]["k"], 3);
    assert_eq!(diff["removed"][0]["k"], 1);
}

#[test]
fn canonicalize_republishes_ledger() {
    let tmp = TempDir::new().unwrap();
    let messy = concat!(
        "{\"ts\": \"2024-01-01T00:00:00Z\", \"type\": \"b\", \"asset_id\": \"z\"}\n",
        "\n",
        "{\"asset_id\": \"a\", \"type\": \"a\", \"ts\": \"2024-01-01T00:00:00Z\"}\n",
    );
    let input = write(tmp.path(), "messy.jsonl", messy);
    let out_receipts = tmp.path().join("clean/receipts.jsonl");
    let out_root = tmp.path().join("clean/root.txt");

    let output = pcc_cmd()
        .args(["canonicalize", "--receipts"])
        .arg(&input)
        .arg("--out-receipts")
        .arg(&out_receipts)
        .arg("--out-root")
        .arg(&out_root)
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(stdout_json(&output)["lines"], 2);

    assert_eq!(
        fs::read_to_string(&out_receipts).unwrap(),
        concat!(
            "{\"asset_id\":\"a\",\"ts\":\"2024-01-01T00:00:00Z\",\"type\":\"a\"}\n",
            "{\"asset_id\":\"z\",\"ts\":\"2024-01-01T00:00:00Z\",\"type\":\"b\"}\n",
        )
    );

    pcc_cmd()
        .args(["verify", "--receipts"])
        .arg(&out_receipts)
        .arg("--root")
        .arg(&out_root)
        .assert()
        .success();
}

#[test]
fn canonicalize_bad_line_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let input = write(tmp.path(), "bad.jsonl", "{\"type\":\"a\"}\n{broken\n");
    let out_receipts = tmp.path().join("receipts.jsonl");

    pcc_cmd()
        .args(["canonicalize", "--posture", "enforce", "--receipts"])
        .arg(&input)
        .arg("--out-receipts")
        .arg(&out_receipts)
        .arg("--out-root")
        .arg(tmp.path().join("root.txt"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("system:parse_error"));
    assert!(!out_receipts.exists());
}

#[test]
fn canonicalize_stamps_missing_ts_and_reorders() {
    let tmp = TempDir::new().unwrap();
    let input = write(
        tmp.path(),
        "in.jsonl",
        concat!(
            "{\"type\":\"b\",\"asset_id\":\"z\",\"ts\":\"2024-01-01T00:00:00Z\"}\n",
            "{\"type\":\"a\",\"asset_id\":\"a\"}\n",
        ),
    );
    let out_receipts = tmp.path().join("receipts.jsonl");

    pcc_cmd()
        .args(["canonicalize", "--receipts"])
        .arg(&input)
        .arg("--out-receipts")
        .arg(&out_receipts)
        .arg("--out-root")
        .arg(tmp.path().join("root.txt"))
        .assert()
        .success();

    let ledger = fs::read_to_string(&out_receipts).unwrap();
    let rows: Vec<Value> = ledger.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(rows[0]["asset_id"], "a");
    assert!(rows[0]["ts"].as_str().unwrap().ends_with('Z'));
    assert_eq!(rows[1]["ts"], "2024-01-01T00:00:00Z");
}

#[test]
fn run_oversized_integer_is_structural_block() {
    let tmp = TempDir::new().unwrap();
    let records = write(
        tmp.path(),
        "records.jsonl",
        "{\"type\":\"term\",\"value\":123456789012345678901234567890}\n",
    );
    let out = tmp.path().join("out");

    let output = pcc_cmd()
        .args(["run", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1)
        .get_output()
        .clone();
    assert_eq!(stdout_json(&output)["token"], "system:parse_error");
    assert!(!out.exists());
}

#[test]
fn run_unwritable_out_is_io_error_block() {
    let tmp = TempDir::new().unwrap();
    let records = write(tmp.path(), "records.jsonl", RECORDS);
    let blocker = write(tmp.path(), "not-a-dir", "");

    let output = pcc_cmd()
        .args(["run", "--posture", "enforce", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&blocker)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("blocked because system:io_error, held 5m"))
        .get_output()
        .clone();
    let decision = stdout_json(&output);
    assert_eq!(decision["decision"], "block");
    assert_eq!(decision["token"], "system:io_error");
}

#[test]
fn bad_config_run_prints_parse_error_block() {
    let tmp = TempDir::new().unwrap();
    let config = write(tmp.path(), "pcc.yaml", "posture: sideways\n");
    let records = write(tmp.path(), "records.jsonl", RECORDS);
    let out = tmp.path().join("out");

    let enforce = pcc_cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "--posture", "enforce", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("blocked because system:parse_error"))
        .get_output()
        .clone();
    let decision = stdout_json(&enforce);
    assert_eq!(decision["token"], "system:parse_error");
    assert_eq!(decision["posture"], "enforce");
    assert_eq!(decision["checks"][0]["ok"], false);
    assert!(!out.exists());

    pcc_cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "--records"])
        .arg(&records)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"token\":\"system:parse_error\""));
}

#[test]
fn bad_config_canonicalize_prints_parse_error_block() {
    let tmp = TempDir::new().unwrap();
    let config = write(tmp.path(), "pcc.yaml", "unknown_key: 1\n");
    let input = write(tmp.path(), "in.jsonl", "{\"type\":\"a\"}\n");

    pcc_cmd()
        .arg("--config")
        .arg(&config)
        .args(["canonicalize", "--receipts"])
        .arg(&input)
        .arg("--out-receipts")
        .arg(tmp.path().join("receipts.jsonl"))
        .arg("--out-root")
        .arg(tmp.path().join("root.txt"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"token\":\"system:parse_error\""));
    assert!(!tmp.path().join("receipts.jsonl").exists());
}

#[test]
fn bad_config_diff_exits_one() {
    let tmp = TempDir::new().unwrap();
    let config = write(tmp.path(), "pcc.yaml", "posture: sideways\n");
    pcc_cmd()
        .arg("--config")
        .arg(&config)
        .args(["diff", "--old", "a", "--new", "b"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn usage_error_exits_one() {
    pcc_cmd()
        .args(["verify", "--receipts", "x"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--root"));
}

#[test]
fn version_exits_zero() {
    pcc_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pcc"));
}

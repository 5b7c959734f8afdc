mod common;

use common::{manifest_json, write_file, TestEnv};
use predicates::prelude::*;

#[test]
fn validate_accepts_a_well_formed_manifest() {
    let env = TestEnv::new();
    let file = write_file(&env.lib_dir, "candidate.json", &manifest_json(&[]));
    env.cmd()
        .args(["manifest", "validate"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest valid"));
}

#[test]
fn validate_rejects_a_zero_timestamp() {
    let env = TestEnv::new();
    let file = write_file(
        &env.lib_dir,
        "candidate.json",
        r#"{"timestamp": 0, "modSpecs": [], "firmwareImages": []}"#,
    );
    env.cmd()
        .args(["manifest", "validate"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("timestamp"));
}

#[test]
fn validate_rejects_malformed_json() {
    let env = TestEnv::new();
    let file = write_file(&env.lib_dir, "candidate.json", "{not json");
    env.cmd()
        .args(["manifest", "validate"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn validate_emits_json_envelope() {
    let env = TestEnv::new();
    let file = write_file(&env.lib_dir, "candidate.json", &manifest_json(&[]));
    let file = file.to_str().expect("utf8 path").to_string();
    let out = env.run_json(&["manifest", "validate", &file]);
    assert_eq!(out["ok"], true);
    assert_eq!(out["data"], "valid");
}

#[test]
fn show_summarizes_the_local_manifest() {
    let env = TestEnv::new();
    env.seed_manifest(&[("SuperOS-1.0", b"firmware bytes", true)]);
    let out = env.run_json(&["manifest", "show"]);
    assert_eq!(out["ok"], true);
    assert_eq!(out["data"]["timestamp"], 1_700_000_000i64);
    assert_eq!(out["data"]["mod_specs"], 1);
    assert_eq!(out["data"]["firmware_images"], 1);
}

#[test]
fn startup_fails_offline_without_any_manifest() {
    let env = TestEnv::new();
    env.cmd()
        .args(["manifest", "show"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not load any manifest"));
}

#[test]
fn startup_failure_in_json_mode_uses_the_error_envelope() {
    let env = TestEnv::new();
    let out = env
        .cmd()
        .arg("--json")
        .args(["manifest", "show"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("json error envelope");
    assert_eq!(v["ok"], false);
    assert_eq!(v["error"]["code"], "run_failed");
    assert!(v["error"]["message"]
        .as_str()
        .expect("message string")
        .contains("could not load any manifest"));
}

#[test]
fn update_refuses_to_run_offline() {
    let env = TestEnv::new();
    env.seed_manifest(&[]);
    env.cmd()
        .args(["manifest", "update"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline"));
}

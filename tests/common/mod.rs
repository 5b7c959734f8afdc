use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub lib_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let lib_dir = tmp.path().join("lib");
        std::fs::create_dir_all(&lib_dir).expect("create lib dir");
        Self { _tmp: tmp, lib_dir }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("gcverify");
        cmd.arg("--offline")
            .arg("--lib-dir")
            .arg(self.lib_dir.to_str().expect("lib path utf8"));
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn seed_manifest(&self, images: &[(&str, &[u8], bool)]) {
        std::fs::write(self.lib_dir.join("manifest.json"), manifest_json(images))
            .expect("write manifest");
    }

    pub fn seed_image(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.lib_dir.join(format!("{name}.hex")), bytes).expect("write image");
    }
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Manifest document with a turbo mod policy and the given reference images
/// (name, contents used for size/hash, permitted).
pub fn manifest_json(images: &[(&str, &[u8], bool)]) -> String {
    let images: Vec<serde_json::Value> = images
        .iter()
        .map(|(name, bytes, permitted)| {
            serde_json::json!({
                "name": name,
                "permitted": permitted,
                "hash": sha1_hex(bytes),
                "size": bytes.len(),
                "url": format!("http://127.0.0.1:1/{name}.hex"),
            })
        })
        .collect();
    serde_json::json!({
        "timestamp": 1_700_000_000i64,
        "modSpecs": [
            {"name": "turbo", "permitted": true, "minVal": 0, "maxVal": 100}
        ],
        "firmwareImages": images,
    })
    .to_string()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, contents).expect("write file");
    p
}

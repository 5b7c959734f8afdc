use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Trusted policy document. Replaced wholesale on adoption, never mutated
/// field by field; `timestamp == 0` means the manifest is invalid/unset.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Manifest {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "modSpecs", default)]
    pub mod_specs: Vec<ModPolicy>,
    #[serde(rename = "firmwareImages", default)]
    pub firmware_images: Vec<ReferenceImage>,
}

/// The single permitted value range for any mod sharing this name.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModPolicy {
    pub name: String,
    pub permitted: bool,
    #[serde(rename = "minVal", default)]
    pub min_val: i64,
    #[serde(rename = "maxVal", default)]
    pub max_val: i64,
}

/// Known-good firmware binary, named `<firmware>-<major>.<minor>`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReferenceImage {
    pub name: String,
    pub permitted: bool,
    pub hash: String,
    pub size: u64,
    pub url: String,
}

fn absent_version() -> i64 {
    -1
}

/// Self-reported parameter set retrieved from the device. Created fresh per
/// handshake attempt and never persisted. Versions default negative so a
/// missing field is distinguishable from version 0.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeviceReport {
    #[serde(default)]
    pub name: String,
    #[serde(default = "absent_version")]
    pub major_version: i64,
    #[serde(default = "absent_version")]
    pub minor_version: i64,
    #[serde(default)]
    pub mods: Vec<ReportedMod>,
}

/// A ReportedMod with an empty name is the firmware's sentinel for
/// "no mods at all".
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportedMod {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub vals: Vec<i64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Info,
    Unknown,
    Illegal,
    IllegalValue,
    NoMods,
}

#[derive(Debug, Serialize, Clone)]
pub struct ModEntry {
    pub verdict: Verdict,
    pub name: String,
    pub enabled: bool,
    pub vals: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub entries: Vec<ModEntry>,
}

#[derive(Serialize)]
pub struct ParamsReport {
    pub firmware: String,
    pub passed: bool,
    pub entries: Vec<ModEntry>,
}

#[derive(Serialize)]
pub struct ImageReport {
    pub firmware: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Serialize)]
pub struct VerifyReport {
    pub params: ParamsReport,
    pub image: Option<ImageReport>,
}

#[derive(Serialize)]
pub struct ImageSyncItem {
    pub name: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct LibrarySyncReport {
    pub overall: String,
    pub images: Vec<ImageSyncItem>,
}

#[derive(Serialize)]
pub struct ManifestSummary {
    pub timestamp: i64,
    pub mod_specs: usize,
    pub firmware_images: usize,
    pub source: String,
}

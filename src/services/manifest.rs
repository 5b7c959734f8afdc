use crate::domain::constants::{MANIFEST_BACKUP_FILE, MANIFEST_FETCH_TIMEOUT, MANIFEST_FILE};
use crate::domain::models::{Manifest, ModPolicy, ReferenceImage};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("manifest document is empty")]
    Empty,
    #[error("manifest is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("manifest did not contain a timestamp")]
    MissingTimestamp,
    #[error("could not read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not fetch manifest: {0}")]
    Fetch(#[from] reqwest::Error),
}

pub fn parse_manifest(raw: &str) -> Result<Manifest, ManifestError> {
    if raw.trim().is_empty() {
        return Err(ManifestError::Empty);
    }
    let manifest: Manifest = serde_json::from_str(raw)?;
    if manifest.timestamp == 0 {
        return Err(ManifestError::MissingTimestamp);
    }
    Ok(manifest)
}

impl Manifest {
    pub fn is_newer_than(&self, other: &Manifest) -> bool {
        self.timestamp > other.timestamp
    }

    pub fn find_mod_policy(&self, name: &str) -> Option<&ModPolicy> {
        self.mod_specs.iter().find(|s| s.name == name)
    }

    pub fn find_reference_image(&self, name: &str) -> Option<&ReferenceImage> {
        self.firmware_images.iter().find(|i| i.name == name)
    }
}

/// Which slot supplied the active manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSlot {
    Local,
    Remote,
}

/// Owns the local/remote/active manifest slots. The active manifest is only
/// ever replaced as a whole value; a failed load leaves every slot untouched.
#[derive(Default)]
pub struct ManifestStore {
    lib_dir: PathBuf,
    local: Option<Manifest>,
    remote: Option<Manifest>,
    active: Option<Manifest>,
    active_from: Option<ManifestSlot>,
}

impl ManifestStore {
    pub fn new(lib_dir: &Path) -> Self {
        Self {
            lib_dir: lib_dir.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn local_path(&self) -> PathBuf {
        self.lib_dir.join(MANIFEST_FILE)
    }

    pub fn active(&self) -> Option<&Manifest> {
        self.active.as_ref()
    }

    pub fn active_slot(&self) -> Option<ManifestSlot> {
        self.active_from
    }

    pub fn load_local(&mut self) -> Result<(), ManifestError> {
        let raw = std::fs::read_to_string(self.local_path())?;
        self.local = Some(parse_manifest(&raw)?);
        Ok(())
    }

    pub fn load_remote(&mut self, url: &str) -> Result<(), ManifestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(MANIFEST_FETCH_TIMEOUT)
            .build()?;
        let raw = client.get(url).send()?.error_for_status()?.text()?;
        self.remote = Some(parse_manifest(&raw)?);
        Ok(())
    }

    pub fn use_local(&mut self) -> bool {
        match &self.local {
            Some(m) => {
                self.active = Some(m.clone());
                self.active_from = Some(ManifestSlot::Local);
                true
            }
            None => false,
        }
    }

    pub fn use_remote(&mut self) -> bool {
        match &self.remote {
            Some(m) => {
                self.active = Some(m.clone());
                self.active_from = Some(ManifestSlot::Remote);
                true
            }
            None => false,
        }
    }

    pub fn is_remote_newer(&self) -> bool {
        match (&self.remote, &self.local) {
            (Some(r), Some(l)) => r.is_newer_than(l),
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Persist the remote manifest as the new local copy, keeping a backup of
    /// the previous file. The remote manifest also becomes the local slot.
    pub fn save_remote_to_local(&mut self) -> anyhow::Result<()> {
        let remote = self
            .remote
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no remote manifest loaded"))?;
        let path = self.local_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.is_file() {
            std::fs::copy(&path, self.lib_dir.join(MANIFEST_BACKUP_FILE))?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&remote)?)?;
        self.local = Some(remote);
        Ok(())
    }
}

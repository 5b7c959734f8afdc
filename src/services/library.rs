use crate::domain::constants::{DOWNLOAD_CAP_BYTES, IMAGE_FETCH_TIMEOUT};
use crate::domain::models::{ImageSyncItem, LibrarySyncReport, Manifest, ReferenceImage};
use crate::services::integrity::verify_file;
use log::warn;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Verified,
    Downloaded,
    Failed,
}

impl ImageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Verified => "verified",
            ImageStatus::Downloaded => "downloaded",
            ImageStatus::Failed => "failed",
        }
    }
}

pub fn reference_image_path(lib_dir: &Path, name: &str) -> PathBuf {
    lib_dir.join(format!("{}.hex", name))
}

/// Make sure an authentic copy of `img` exists in the library. A verified
/// local file means no network access at all; otherwise exactly one bounded
/// download and one re-verify. Whether the image is `permitted` is the
/// caller's concern, not acquisition's.
pub fn ensure_reference_image(lib_dir: &Path, img: &ReferenceImage, allow_download: bool) -> bool {
    ensure_with_status(lib_dir, img, allow_download) != ImageStatus::Failed
}

pub fn ensure_with_status(
    lib_dir: &Path,
    img: &ReferenceImage,
    allow_download: bool,
) -> ImageStatus {
    let path = reference_image_path(lib_dir, &img.name);
    if path.is_file() && verify_file(&path, img.size, &img.hash) {
        return ImageStatus::Verified;
    }
    if !allow_download {
        warn!("{} missing or stale and downloads are disabled", img.name);
        return ImageStatus::Failed;
    }
    if let Err(e) = download_reference_image(&path, &img.url) {
        warn!("could not download {} from {}: {}", img.name, img.url, e);
        return ImageStatus::Failed;
    }
    if verify_file(&path, img.size, &img.hash) {
        ImageStatus::Downloaded
    } else {
        warn!("downloaded {} does not match manifest", img.name);
        ImageStatus::Failed
    }
}

fn download_reference_image(path: &Path, url: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(IMAGE_FETCH_TIMEOUT)
        .build()?;
    let resp = client.get(url).send()?.error_for_status()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Cap the write so a broken or malicious URL cannot grow unbounded.
    let mut limited = resp.take(DOWNLOAD_CAP_BYTES);
    let mut file = std::fs::File::create(path)?;
    std::io::copy(&mut limited, &mut file)?;
    Ok(())
}

/// Bring the whole library in line with the manifest, one image at a time.
pub fn sync_library(lib_dir: &Path, manifest: &Manifest, allow_download: bool) -> LibrarySyncReport {
    let images: Vec<ImageSyncItem> = manifest
        .firmware_images
        .iter()
        .map(|img| ImageSyncItem {
            name: img.name.clone(),
            status: ensure_with_status(lib_dir, img, allow_download)
                .as_str()
                .to_string(),
        })
        .collect();
    let overall = if images.iter().any(|i| i.status == "failed") {
        "needs_attention"
    } else {
        "ok"
    }
    .to_string();
    LibrarySyncReport { overall, images }
}

use log::{debug, warn};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Pick the algorithm from the manifest digest length. Manifests have
    /// historically carried SHA-1 digests; 64 hex chars means SHA-256.
    pub fn for_digest(expected_hex: &str) -> Self {
        if expected_hex.len() == Sha256::output_size() * 2 {
            HashAlgorithm::Sha256
        } else {
            HashAlgorithm::Sha1
        }
    }
}

pub fn file_digest_hex(path: &Path, algo: HashAlgorithm) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = [0u8; 8192];
    match algo {
        HashAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

/// Trust predicate for a local file: byte length first (cheap, short-circuits
/// without hashing), then a streamed digest compared case-insensitively
/// against the manifest value. I/O failures degrade to false with a logged
/// cause; this is not an error channel.
pub fn verify_file(path: &Path, expected_size: u64, expected_hash_hex: &str) -> bool {
    let actual_size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!("could not stat {}: {}", path.display(), e);
            return false;
        }
    };
    debug!(
        "{}: size {} (expected {})",
        path.display(),
        actual_size,
        expected_size
    );
    if actual_size != expected_size {
        return false;
    }

    let algo = HashAlgorithm::for_digest(expected_hash_hex);
    let actual_hash = match file_digest_hex(path, algo) {
        Ok(h) => h,
        Err(e) => {
            warn!("could not hash {}: {}", path.display(), e);
            return false;
        }
    };
    debug!(
        "{}: hash {} (expected {})",
        path.display(),
        actual_hash,
        expected_hash_hex
    );
    actual_hash.eq_ignore_ascii_case(expected_hash_hex)
}

use log::warn;
use std::io::BufRead;
use std::path::Path;

/// Exact byte comparison between the device dump and the verified reference
/// image. Length mismatch is an immediate false without reading either file;
/// otherwise the scan stops at the first differing offset. The device-side
/// file is transient; the caller deletes it after comparison regardless of
/// outcome.
pub fn compare_images(device_path: &Path, reference_path: &Path) -> bool {
    let device_len = match std::fs::metadata(device_path) {
        Ok(m) => m.len(),
        Err(e) => {
            warn!("could not stat {}: {}", device_path.display(), e);
            return false;
        }
    };
    let reference_len = match std::fs::metadata(reference_path) {
        Ok(m) => m.len(),
        Err(e) => {
            warn!("could not stat {}: {}", reference_path.display(), e);
            return false;
        }
    };
    if device_len != reference_len {
        warn!(
            "device image is {} bytes, reference is {} bytes",
            device_len, reference_len
        );
        return false;
    }

    match streams_match(device_path, reference_path) {
        Ok(matched) => matched,
        Err(e) => {
            warn!("I/O error while comparing images: {}", e);
            false
        }
    }
}

fn streams_match(a: &Path, b: &Path) -> std::io::Result<bool> {
    let mut ra = std::io::BufReader::new(std::fs::File::open(a)?);
    let mut rb = std::io::BufReader::new(std::fs::File::open(b)?);
    let mut offset: u64 = 0;
    loop {
        let ba = ra.fill_buf()?;
        let bb = rb.fill_buf()?;
        if ba.is_empty() && bb.is_empty() {
            return Ok(true);
        }
        let n = ba.len().min(bb.len());
        if n == 0 {
            // one stream ended early despite equal metadata lengths
            return Ok(false);
        }
        if let Some(i) = (0..n).find(|&i| ba[i] != bb[i]) {
            warn!("images differ at byte {}", offset + i as u64);
            return Ok(false);
        }
        ra.consume(n);
        rb.consume(n);
        offset += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, bytes).unwrap();
        p
    }

    #[test]
    fn identical_files_match() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.hex", b"identical program memory");
        let b = write(&dir, "b.hex", b"identical program memory");
        assert!(compare_images(&a, &b));
    }

    #[test]
    fn length_mismatch_fails_without_content_read() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.hex", b"short");
        let b = write(&dir, "b.hex", b"much longer image");
        assert!(!compare_images(&a, &b));
    }

    #[test]
    fn single_differing_byte_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.hex", b"program memory contents");
        let mut tampered = b"program memory contents".to_vec();
        tampered[10] ^= 0xff;
        let b = write(&dir, "b.hex", &tampered);
        assert!(!compare_images(&a, &b));
    }

    #[test]
    fn missing_device_dump_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(&dir, "b.hex", b"reference");
        assert!(!compare_images(&dir.path().join("absent.hex"), &b));
    }

    #[test]
    fn empty_files_match() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.hex", b"");
        let b = write(&dir, "b.hex", b"");
        assert!(compare_images(&a, &b));
    }
}

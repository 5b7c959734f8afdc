use std::time::Duration;

/// Request token the firmware answers to with its parameter report.
pub const REQUEST_TOKEN: &[u8] = b"GCCVerify";

pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/kaysond/GCCVerify/master/lib/manifest.json";

pub const DEFAULT_LIB_DIR: &str = "lib";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_BACKUP_FILE: &str = "manifest_old.json";

/// Transient file the external programmer dumps program memory into.
pub const DUMP_FILE: &str = "progmem.hex";

/// Cap on a single reference image download.
pub const DOWNLOAD_CAP_BYTES: u64 = 1_000_000;

pub const MANIFEST_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);
pub const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_millis(30_000);

/// DTR/RTS toggle cycles that reset the board into its bootloader.
pub const RESET_TOGGLES: u32 = 2;
pub const RESET_SETTLE: Duration = Duration::from_millis(500);
pub const BOOT_DELAY: Duration = Duration::from_millis(2000);

/// How long to accumulate response bytes after sending the request token.
/// The window itself is the message boundary; there is no framing.
pub const COLLECT_WINDOW: Duration = Duration::from_millis(1000);

pub const DEFAULT_PROGRAMMER_BIN: &str = "bin/avrdude";
pub const DEFAULT_PROGRAMMER_CONF: &str = "etc/avrdude.conf";
pub const DEFAULT_PROGRAMMER_PART: &str = "atmega328p";
pub const DEFAULT_PROGRAMMER_ID: &str = "arduino";
pub const DEFAULT_PROGRAMMER_BAUD: u32 = 57_600;

use crate::domain::constants::{DEFAULT_LIB_DIR, DEFAULT_MANIFEST_URL};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gcverify", version, about = "Game controller firmware verification")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,
    #[arg(long, global = true, help = "Skip all network access")]
    pub offline: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_LIB_DIR,
        help = "Reference image library directory"
    )]
    pub lib_dir: PathBuf,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_MANIFEST_URL,
        help = "Remote manifest URL"
    )]
    pub manifest_url: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Full session: parameter validation, then image verification
    Verify {
        #[arg(long)]
        port: String,
        #[arg(long, help = "Skip the bootloader reset sequence")]
        no_reset: bool,
        #[arg(long, help = "Stop after parameter validation")]
        params_only: bool,
    },
    /// Retrieve and validate the device's self-reported parameters
    Params {
        #[arg(long)]
        port: String,
        #[arg(long, help = "Skip the bootloader reset sequence")]
        no_reset: bool,
    },
    /// Verify the device's program memory against the reference image
    Image {
        #[arg(long)]
        port: String,
        #[arg(long, help = "Firmware identity (skips the parameter handshake)")]
        firmware: Option<String>,
        #[arg(long, help = "Skip the bootloader reset sequence")]
        no_reset: bool,
    },
    /// List detected serial ports
    Ports,
    Manifest {
        #[command(subcommand)]
        command: ManifestCommands,
    },
    Library {
        #[command(subcommand)]
        command: LibraryCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ManifestCommands {
    /// Summarize the active manifest
    Show,
    /// Check that a manifest document parses and carries a timestamp
    Validate { file: PathBuf },
    /// Fetch the remote manifest and adopt it
    Update,
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// Ensure every manifest reference image exists locally and is authentic
    Sync,
}

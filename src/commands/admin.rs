use crate::cli::{Cli, ManifestCommands};
use crate::domain::models::{JsonOut, Manifest, ManifestSummary};
use crate::services::library::sync_library;
use crate::services::manifest::{parse_manifest, ManifestSlot, ManifestStore};
use crate::services::output::print_one;
use std::path::Path;

pub fn handle_manifest(
    cli: &Cli,
    command: &ManifestCommands,
    store: &mut ManifestStore,
) -> anyhow::Result<()> {
    match command {
        ManifestCommands::Show => {
            let manifest = store
                .active()
                .ok_or_else(|| anyhow::anyhow!("no manifest is active"))?;
            let source = match store.active_slot() {
                Some(ManifestSlot::Remote) => cli.manifest_url.clone(),
                _ => store.local_path().display().to_string(),
            };
            let summary = ManifestSummary {
                timestamp: manifest.timestamp,
                mod_specs: manifest.mod_specs.len(),
                firmware_images: manifest.firmware_images.len(),
                source,
            };
            print_one(cli.json, summary, |s| {
                format!(
                    "timestamp={} mod_specs={} firmware_images={}",
                    s.timestamp, s.mod_specs, s.firmware_images
                )
            })?;
        }
        ManifestCommands::Validate { .. } => {
            unreachable!("handled before manifest bootstrap")
        }
        ManifestCommands::Update => {
            if cli.offline {
                anyhow::bail!("cannot update the manifest in offline mode");
            }
            store.load_remote(&cli.manifest_url)?;
            store.save_remote_to_local()?;
            store.use_local();
            let ts = store.active().map(|m| m.timestamp).unwrap_or(0);
            print_one(cli.json, ts, |t| format!("manifest updated (timestamp {})", t))?;
        }
    }
    Ok(())
}

/// Needs no active manifest: validates a document on disk by itself.
pub fn handle_manifest_validate(cli: &Cli, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)?;
    parse_manifest(&raw)?;
    print_one(cli.json, "valid", |_| "manifest valid".to_string())
}

// Envelope `ok` means the command ran; sync outcome lives in `data.overall`
// and the per-image statuses.
pub fn handle_library_sync(cli: &Cli, manifest: &Manifest) -> anyhow::Result<()> {
    let report = sync_library(&cli.lib_dir, manifest, !cli.offline);
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: report
            })?
        );
    } else {
        println!("library sync: {}", report.overall);
        for img in report.images {
            println!("{}\t{}", img.name, img.status);
        }
    }
    Ok(())
}

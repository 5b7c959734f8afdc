use crate::cli::Cli;
use crate::domain::constants::DUMP_FILE;
use crate::domain::models::{ImageReport, Manifest, ParamsReport, VerifyReport};
use crate::services::compare::compare_images;
use crate::services::handshake::{self, DeviceProfile, HandshakeError};
use crate::services::library::{ensure_reference_image, reference_image_path};
use crate::services::output::{print_out, render_banner, render_mod_entry};
use crate::services::port::{list_ports, SerialDevicePort};
use crate::services::programmer::{dump_program_memory, ProgrammerConfig};
use crate::services::validator::{firmware_identity, validate};
use log::warn;
use std::path::Path;

fn profile_for(no_reset: bool) -> DeviceProfile {
    if no_reset {
        DeviceProfile::arduino().without_reset()
    } else {
        DeviceProfile::arduino()
    }
}

/// Handshake + policy validation. Protocol failures are a failed verification
/// with no entries; connection failures abort the run.
fn run_params(manifest: &Manifest, port_name: &str, no_reset: bool) -> anyhow::Result<ParamsReport> {
    let mut port = SerialDevicePort::new(port_name);
    match handshake::request_report(&mut port, &profile_for(no_reset)) {
        Ok(report) => {
            let result = validate(&report, manifest);
            Ok(ParamsReport {
                firmware: firmware_identity(&report),
                passed: result.passed,
                entries: result.entries,
            })
        }
        Err(HandshakeError::Protocol(e)) => {
            warn!("device response rejected: {}", e);
            Ok(ParamsReport {
                firmware: String::new(),
                passed: false,
                entries: vec![],
            })
        }
        Err(HandshakeError::Connection(e)) => Err(e.into()),
    }
}

/// Acquire the reference image, dump the device's program memory, compare,
/// and delete the dump whatever the outcome.
fn run_image(cli: &Cli, manifest: &Manifest, firmware: &str, port_name: &str) -> ImageReport {
    let fail = |detail: &str| ImageReport {
        firmware: firmware.to_string(),
        passed: false,
        detail: detail.to_string(),
    };

    let Some(img) = manifest.find_reference_image(firmware) else {
        return fail("firmware is not present in the manifest");
    };
    if !img.permitted {
        return fail("firmware is not permitted");
    }
    if !ensure_reference_image(&cli.lib_dir, img, !cli.offline) {
        return fail("reference image could not be verified against the manifest");
    }

    let dump_path = Path::new(DUMP_FILE);
    if let Err(e) = dump_program_memory(&ProgrammerConfig::default(), port_name, dump_path) {
        return fail(&e.to_string());
    }
    let matched = compare_images(dump_path, &reference_image_path(&cli.lib_dir, firmware));
    if let Err(e) = std::fs::remove_file(dump_path) {
        warn!("could not delete {}: {}", dump_path.display(), e);
    }

    ImageReport {
        firmware: firmware.to_string(),
        passed: matched,
        detail: if matched {
            "program memory matches the reference image".to_string()
        } else {
            "program memory does not match the reference image".to_string()
        },
    }
}

fn print_params_text(params: &ParamsReport) {
    for entry in &params.entries {
        print!("{}", render_mod_entry(entry));
    }
    print!("{}", render_banner("Firmware Mod Verification", params.passed));
    if !params.firmware.is_empty() {
        println!("Detected firmware: {}", params.firmware);
    }
}

fn print_image_text(image: &ImageReport) {
    print!("{}", render_banner("Firmware Image Verification", image.passed));
    println!("{}", image.detail);
}

pub fn handle_verify(
    cli: &Cli,
    manifest: &Manifest,
    port: &str,
    no_reset: bool,
    params_only: bool,
) -> anyhow::Result<()> {
    let params = run_params(manifest, port, no_reset)?;
    let image = if params_only {
        None
    } else if params.firmware.is_empty() {
        Some(ImageReport {
            firmware: String::new(),
            passed: false,
            detail: "firmware identity unavailable; parameter handshake failed".to_string(),
        })
    } else {
        Some(run_image(cli, manifest, &params.firmware.clone(), port))
    };

    let report = VerifyReport { params, image };
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&crate::domain::models::JsonOut {
                ok: true,
                data: report
            })?
        );
    } else {
        print_params_text(&report.params);
        if let Some(image) = &report.image {
            print_image_text(image);
        }
    }
    Ok(())
}

pub fn handle_params(cli: &Cli, manifest: &Manifest, port: &str, no_reset: bool) -> anyhow::Result<()> {
    let params = run_params(manifest, port, no_reset)?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&crate::domain::models::JsonOut {
                ok: true,
                data: params
            })?
        );
    } else {
        print_params_text(&params);
    }
    Ok(())
}

pub fn handle_image(
    cli: &Cli,
    manifest: &Manifest,
    port: &str,
    firmware: Option<&str>,
    no_reset: bool,
) -> anyhow::Result<()> {
    let identity = match firmware {
        Some(f) => f.to_string(),
        None => {
            let params = run_params(manifest, port, no_reset)?;
            if params.firmware.is_empty() {
                anyhow::bail!("could not detect firmware identity from the device");
            }
            params.firmware
        }
    };
    let image = run_image(cli, manifest, &identity, port);
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&crate::domain::models::JsonOut {
                ok: true,
                data: image
            })?
        );
    } else {
        print_image_text(&image);
    }
    Ok(())
}

pub fn handle_ports(cli: &Cli) -> anyhow::Result<()> {
    let ports = list_ports();
    if ports.is_empty() && !cli.json {
        println!("No serial ports found. Check USB connection.");
        return Ok(());
    }
    print_out(cli.json, &ports, |p| p.to_string())
}

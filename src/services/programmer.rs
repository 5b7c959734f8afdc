use crate::domain::constants::{
    DEFAULT_PROGRAMMER_BAUD, DEFAULT_PROGRAMMER_BIN, DEFAULT_PROGRAMMER_CONF,
    DEFAULT_PROGRAMMER_ID, DEFAULT_PROGRAMMER_PART,
};
use log::debug;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ProgrammerError {
    #[error("could not find programmer executable at {0}; check the bin directory")]
    MissingProgram(PathBuf),
    #[error("could not find programmer config at {0}; check the etc directory")]
    MissingConf(PathBuf),
    #[error("could not launch programmer: {0}")]
    Launch(#[from] std::io::Error),
    #[error("programmer exited with {status}\n{output}")]
    Failed { status: String, output: String },
}

/// External tool that reads the device's program memory out over the
/// bootloader. Defaults match an avrdude install shipped alongside the tool.
#[derive(Debug, Clone)]
pub struct ProgrammerConfig {
    pub program: PathBuf,
    pub conf: PathBuf,
    pub part: String,
    pub programmer_id: String,
    pub baud_rate: u32,
}

impl Default for ProgrammerConfig {
    fn default() -> Self {
        ProgrammerConfig {
            program: PathBuf::from(DEFAULT_PROGRAMMER_BIN),
            conf: PathBuf::from(DEFAULT_PROGRAMMER_CONF),
            part: DEFAULT_PROGRAMMER_PART.to_string(),
            programmer_id: DEFAULT_PROGRAMMER_ID.to_string(),
            baud_rate: DEFAULT_PROGRAMMER_BAUD,
        }
    }
}

/// Dump the device's program memory to `out_path`. Non-zero exit is fatal for
/// this verification and carries the tool's combined output for diagnostics.
pub fn dump_program_memory(
    cfg: &ProgrammerConfig,
    port_name: &str,
    out_path: &Path,
) -> Result<(), ProgrammerError> {
    if !cfg.program.is_file() {
        return Err(ProgrammerError::MissingProgram(cfg.program.clone()));
    }
    if !cfg.conf.is_file() {
        return Err(ProgrammerError::MissingConf(cfg.conf.clone()));
    }

    let output = std::process::Command::new(&cfg.program)
        .arg(format!("-C{}", cfg.conf.display()))
        .arg("-v")
        .arg(format!("-p{}", cfg.part))
        .arg(format!("-c{}", cfg.programmer_id))
        .arg(format!("-P{}", port_name))
        .arg(format!("-Uflash:r:{}:r", out_path.display()))
        .arg(format!("-b{}", cfg.baud_rate))
        .output()?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    debug!("programmer output:\n{}", combined);

    if !output.status.success() {
        return Err(ProgrammerError::Failed {
            status: output.status.to_string(),
            output: combined,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_reported_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ProgrammerConfig {
            program: dir.path().join("no-such-avrdude"),
            conf: dir.path().join("no-such.conf"),
            ..ProgrammerConfig::default()
        };
        let err = dump_program_memory(&cfg, "ttyUSB0", &dir.path().join("out.hex")).unwrap_err();
        assert!(matches!(err, ProgrammerError::MissingProgram(_)));
    }

    #[test]
    fn missing_conf_is_reported_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("avrdude");
        std::fs::write(&program, b"#!/bin/sh\n").unwrap();
        let cfg = ProgrammerConfig {
            program,
            conf: dir.path().join("no-such.conf"),
            ..ProgrammerConfig::default()
        };
        let err = dump_program_memory(&cfg, "ttyUSB0", &dir.path().join("out.hex")).unwrap_err();
        assert!(matches!(err, ProgrammerError::MissingConf(_)));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_carries_captured_output() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("avrdude");
        std::fs::write(&program, b"#!/bin/sh\necho device did not respond\nexit 1\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
        let conf = dir.path().join("avrdude.conf");
        std::fs::write(&conf, b"# empty\n").unwrap();

        let cfg = ProgrammerConfig {
            program,
            conf,
            ..ProgrammerConfig::default()
        };
        let err = dump_program_memory(&cfg, "ttyUSB0", &dir.path().join("out.hex")).unwrap_err();
        match err {
            ProgrammerError::Failed { output, .. } => {
                assert!(output.contains("device did not respond"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

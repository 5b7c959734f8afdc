use crate::domain::constants::{BOOT_DELAY, COLLECT_WINDOW, REQUEST_TOKEN, RESET_SETTLE, RESET_TOGGLES};
use crate::domain::models::DeviceReport;
use log::debug;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    #[error("serial port {0} is busy; close any serial monitors and check the USB connection")]
    Busy(String),
    #[error("serial port {0} could not be found; check the USB connection")]
    NotFound(String),
    #[error("serial port error on {0}: {1}")]
    Other(String, String),
}

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("device sent no response")]
    EmptyResponse,
    #[error("device response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("device response did not contain a firmware name")]
    MissingName,
    #[error("device response did not contain a major version number")]
    MissingMajorVersion,
    #[error("device response did not contain a minor version number")]
    MissingMinorVersion,
}

#[derive(thiserror::Error, Debug)]
pub enum HandshakeError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Fixed stream configuration for a class of devices. The reset toggle is a
/// bootloader accommodation and is skippable for profiles that boot without it.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub baud_rate: u32,
    pub reset_before_query: bool,
}

impl DeviceProfile {
    pub fn arduino() -> Self {
        DeviceProfile {
            name: "arduino",
            baud_rate: 9600,
            reset_before_query: true,
        }
    }

    pub fn without_reset(mut self) -> Self {
        self.reset_before_query = false;
        self
    }
}

/// Byte-stream seam between the handshake state machine and the hardware.
/// 8 data bits, 1 stop bit, no parity are fixed by the implementation.
pub trait DevicePort {
    fn open(&mut self, baud_rate: u32) -> Result<(), ConnectionError>;
    fn set_dtr(&mut self, level: bool) -> Result<(), ConnectionError>;
    fn set_rts(&mut self, level: bool) -> Result<(), ConnectionError>;
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ConnectionError>;
    /// Accumulate whatever arrives during `window`. The window itself is the
    /// message boundary; implementations must wait on driver timeouts, not a
    /// busy poll.
    fn read_for(&mut self, window: Duration) -> Result<Vec<u8>, ConnectionError>;
    fn close(&mut self);
    fn name(&self) -> &str;
    fn settle(&mut self, pause: Duration) {
        std::thread::sleep(pause);
    }
}

/// Run the full reset/query/collect/parse exchange. The port is closed before
/// returning on every path once it has been opened. No retries; retry policy
/// belongs to the caller.
pub fn request_report(
    port: &mut dyn DevicePort,
    profile: &DeviceProfile,
) -> Result<DeviceReport, HandshakeError> {
    port.open(profile.baud_rate)?;
    let result = exchange(port, profile);
    port.close();
    result
}

fn exchange(
    port: &mut dyn DevicePort,
    profile: &DeviceProfile,
) -> Result<DeviceReport, HandshakeError> {
    if profile.reset_before_query {
        debug!("resetting {} into its bootloader", port.name());
        for _ in 0..RESET_TOGGLES {
            port.set_dtr(false)?;
            port.set_dtr(true)?;
            port.set_rts(false)?;
            port.set_rts(true)?;
            port.settle(RESET_SETTLE);
        }
        port.settle(BOOT_DELAY);
    }

    port.write_all(REQUEST_TOKEN)?;
    let raw = port.read_for(COLLECT_WINDOW)?;
    debug!("received {} bytes from {}", raw.len(), port.name());
    Ok(parse_report(&raw)?)
}

pub fn parse_report(raw: &[u8]) -> Result<DeviceReport, ProtocolError> {
    if raw.is_empty() {
        return Err(ProtocolError::EmptyResponse);
    }
    let report: DeviceReport = serde_json::from_slice(raw)?;
    if report.name.is_empty() {
        return Err(ProtocolError::MissingName);
    }
    if report.major_version < 0 {
        return Err(ProtocolError::MissingMajorVersion);
    }
    if report.minor_version < 0 {
        return Err(ProtocolError::MissingMinorVersion);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Op {
        Open(u32),
        Dtr(bool),
        Rts(bool),
        Write(Vec<u8>),
        Read,
        Close,
    }

    struct ScriptedPort {
        ops: Vec<Op>,
        response: Vec<u8>,
        fail_open: Option<ConnectionError>,
    }

    impl ScriptedPort {
        fn replying(response: &[u8]) -> Self {
            ScriptedPort {
                ops: vec![],
                response: response.to_vec(),
                fail_open: None,
            }
        }
    }

    impl DevicePort for ScriptedPort {
        fn open(&mut self, baud_rate: u32) -> Result<(), ConnectionError> {
            self.ops.push(Op::Open(baud_rate));
            if let Some(e) = self.fail_open.take() {
                return Err(e);
            }
            Ok(())
        }
        fn set_dtr(&mut self, level: bool) -> Result<(), ConnectionError> {
            self.ops.push(Op::Dtr(level));
            Ok(())
        }
        fn set_rts(&mut self, level: bool) -> Result<(), ConnectionError> {
            self.ops.push(Op::Rts(level));
            Ok(())
        }
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
            self.ops.push(Op::Write(bytes.to_vec()));
            Ok(())
        }
        fn read_for(&mut self, _window: Duration) -> Result<Vec<u8>, ConnectionError> {
            self.ops.push(Op::Read);
            Ok(self.response.clone())
        }
        fn close(&mut self) {
            self.ops.push(Op::Close);
        }
        fn name(&self) -> &str {
            "fake0"
        }
        fn settle(&mut self, _pause: Duration) {}
    }

    const GOOD_RESPONSE: &[u8] =
        br#"{"name":"ctrl","major_version":1,"minor_version":0,"mods":[]}"#;

    #[test]
    fn happy_path_writes_token_and_parses_report() {
        let mut port = ScriptedPort::replying(GOOD_RESPONSE);
        let report = request_report(&mut port, &DeviceProfile::arduino().without_reset()).unwrap();
        assert_eq!(report.name, "ctrl");
        assert_eq!(report.major_version, 1);
        assert_eq!(
            port.ops,
            vec![
                Op::Open(9600),
                Op::Write(b"GCCVerify".to_vec()),
                Op::Read,
                Op::Close,
            ]
        );
    }

    #[test]
    fn reset_profile_toggles_control_lines_twice_before_query() {
        let mut port = ScriptedPort::replying(GOOD_RESPONSE);
        request_report(&mut port, &DeviceProfile::arduino()).unwrap();
        let toggles: Vec<&Op> = port
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Dtr(_) | Op::Rts(_)))
            .collect();
        assert_eq!(
            toggles,
            vec![
                &Op::Dtr(false),
                &Op::Dtr(true),
                &Op::Rts(false),
                &Op::Rts(true),
                &Op::Dtr(false),
                &Op::Dtr(true),
                &Op::Rts(false),
                &Op::Rts(true),
            ]
        );
        // all toggling happens before the request token goes out
        let write_idx = port
            .ops
            .iter()
            .position(|op| matches!(op, Op::Write(_)))
            .unwrap();
        let last_toggle = port
            .ops
            .iter()
            .rposition(|op| matches!(op, Op::Dtr(_) | Op::Rts(_)))
            .unwrap();
        assert!(last_toggle < write_idx);
    }

    #[test]
    fn port_is_closed_even_when_parse_fails() {
        let mut port = ScriptedPort::replying(b"not json");
        let err = request_report(&mut port, &DeviceProfile::arduino().without_reset()).unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::Protocol(ProtocolError::Malformed(_))
        ));
        assert_eq!(port.ops.last(), Some(&Op::Close));
    }

    #[test]
    fn open_failure_escalates_without_close() {
        let mut port = ScriptedPort::replying(GOOD_RESPONSE);
        port.fail_open = Some(ConnectionError::Busy("fake0".to_string()));
        let err = request_report(&mut port, &DeviceProfile::arduino()).unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::Connection(ConnectionError::Busy(_))
        ));
        assert!(!port.ops.contains(&Op::Close));
    }

    #[test]
    fn empty_response_is_a_protocol_error() {
        assert!(matches!(parse_report(b""), Err(ProtocolError::EmptyResponse)));
    }

    #[test]
    fn missing_required_fields_are_distinct_errors() {
        assert!(matches!(
            parse_report(br#"{"major_version":1,"minor_version":0}"#),
            Err(ProtocolError::MissingName)
        ));
        assert!(matches!(
            parse_report(br#"{"name":"ctrl","minor_version":0}"#),
            Err(ProtocolError::MissingMajorVersion)
        ));
        assert!(matches!(
            parse_report(br#"{"name":"ctrl","major_version":1}"#),
            Err(ProtocolError::MissingMinorVersion)
        ));
    }

    #[test]
    fn version_zero_is_valid() {
        let report = parse_report(br#"{"name":"ctrl","major_version":0,"minor_version":0}"#);
        assert!(report.is_ok());
    }
}

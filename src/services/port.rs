use crate::services::handshake::{ConnectionError, DevicePort};
use serialport::{DataBits, Parity, SerialPort, StopBits};
use std::io::Read;
use std::time::{Duration, Instant};

/// Poll granularity for the collect window. The driver blocks for up to this
/// long per read, so the loop sleeps in the kernel rather than spinning.
const READ_SLICE: Duration = Duration::from_millis(50);

pub struct SerialDevicePort {
    name: String,
    inner: Option<Box<dyn SerialPort>>,
}

impl SerialDevicePort {
    pub fn new(name: &str) -> Self {
        SerialDevicePort {
            name: name.to_string(),
            inner: None,
        }
    }

    fn map_open_error(&self, e: serialport::Error) -> ConnectionError {
        match e.kind {
            serialport::ErrorKind::NoDevice => ConnectionError::NotFound(self.name.clone()),
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied)
            | serialport::ErrorKind::Io(std::io::ErrorKind::AddrInUse) => {
                ConnectionError::Busy(self.name.clone())
            }
            _ => ConnectionError::Other(self.name.clone(), e.to_string()),
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, ConnectionError> {
        self.inner
            .as_mut()
            .ok_or_else(|| ConnectionError::Other(self.name.clone(), "port not open".to_string()))
    }
}

impl DevicePort for SerialDevicePort {
    fn open(&mut self, baud_rate: u32) -> Result<(), ConnectionError> {
        let port = serialport::new(&self.name, baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .timeout(READ_SLICE)
            .open()
            .map_err(|e| self.map_open_error(e))?;
        self.inner = Some(port);
        Ok(())
    }

    fn set_dtr(&mut self, level: bool) -> Result<(), ConnectionError> {
        let name = self.name.clone();
        self.port()?
            .write_data_terminal_ready(level)
            .map_err(|e| ConnectionError::Other(name, e.to_string()))
    }

    fn set_rts(&mut self, level: bool) -> Result<(), ConnectionError> {
        let name = self.name.clone();
        self.port()?
            .write_request_to_send(level)
            .map_err(|e| ConnectionError::Other(name, e.to_string()))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        let name = self.name.clone();
        std::io::Write::write_all(self.port()?, bytes)
            .map_err(|e| ConnectionError::Other(name, e.to_string()))
    }

    fn read_for(&mut self, window: Duration) -> Result<Vec<u8>, ConnectionError> {
        let name = self.name.clone();
        let port = self.port()?;
        let deadline = Instant::now() + window;
        let mut collected = Vec::new();
        let mut chunk = [0u8; 256];
        while Instant::now() < deadline {
            match port.read(&mut chunk) {
                Ok(0) => {}
                Ok(n) => collected.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return Err(ConnectionError::Other(name, e.to_string())),
            }
        }
        Ok(collected)
    }

    fn close(&mut self) {
        // Dropping the handle releases the port.
        self.inner = None;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            log::warn!("could not enumerate serial ports: {}", e);
            vec![]
        }
    }
}

//! Serial port driver.
//!
//! `SerialPort` abstracts "blocking single-byte reads, bounded by a short poll
//! timeout, plus whole-buffer writes" so the session engine can run against a
//! real TTY (`RawSerialPort`) or an in-memory loopback pair in tests
//! (`testutil::LoopbackPort`).

use std::io::{self, Read, Write};
use std::time::Duration;

use crate::constants::PORT_POLL_TIMEOUT_MS;
use crate::error::Error;

/// Blocking byte-at-a-time read plus whole-buffer write over a serial line.
pub trait SerialPort {
    /// Reads at most one byte. `Ok(None)` means nothing arrived within the
    /// implementation's poll timeout; a genuine OS-level failure is `Err`.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Writes the entire buffer or fails. Partial writes are not surfaced to
    /// callers as success.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// A real serial device, opened in raw 8N1 mode with a bounded per-read
/// timeout (REDESIGN FLAGS option (b): reconfigure for readable blocking
/// rather than spin on `VMIN=0, VTIME=0`).
pub struct RawSerialPort {
    port: serial::SystemPort,
}

impl RawSerialPort {
    /// Opens `device` at `line_speed`, installing a raw no-parity 1-stop-bit
    /// configuration and a short poll timeout.
    pub fn open(device: &str, line_speed: serial::BaudRate) -> Result<Self, Error> {
        let mut port = serial::open(device).map_err(to_io_error)?;

        let settings = serial::PortSettings {
            baud_rate: line_speed,
            char_size: serial::Bits8,
            parity: serial::ParityNone,
            stop_bits: serial::Stop1,
            flow_control: serial::FlowNone,
        };
        port.configure(&settings).map_err(to_io_error)?;
        port.set_timeout(Duration::from_millis(PORT_POLL_TIMEOUT_MS))
            .map_err(to_io_error)?;

        log::debug!("opened serial port {device} at {line_speed:?}");
        Ok(RawSerialPort { port })
    }
}

fn to_io_error(e: serial::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

impl SerialPort for RawSerialPort {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, bytes)
    }
}

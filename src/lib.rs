//! A stop-and-wait HDLC-like data-link protocol over a serial line, with a
//! small file-transfer demonstration on top.
//!
//! The data-link layer (`Session`) is the subsystem this crate cares about:
//! byte-stuffed framing, header and payload block checks, a single
//! alternating sequence bit, and timer-driven retransmission with
//! REJ-triggered fast retransmit. The `app` module is a thin chunker on top,
//! not a second protocol.
//!
//! ## Example
//! ```
//! use hdlc_link::testutil::LoopbackPort;
//! use hdlc_link::{Config, Role, Session};
//!
//! let (tx_port, rx_port) = LoopbackPort::pair();
//!
//! let tx_config = Config {
//!     role: Role::Transmitter,
//!     device: "loopback".to_string(),
//!     line_speed: serial::Baud9600,
//!     timeout_secs: 1,
//!     max_retransmissions: 3,
//! };
//! let rx_config = Config {
//!     role: Role::Receiver,
//!     ..tx_config.clone()
//! };
//!
//! let tx = std::thread::spawn(move || {
//!     let mut session = Session::open_with_port(tx_config, tx_port).unwrap();
//!     session.write(b"hello").unwrap();
//!     session.close(false).unwrap();
//! });
//!
//! let mut session = Session::open_with_port(rx_config, rx_port).unwrap();
//! let mut buf = [0u8; hdlc_link::MAX_PAYLOAD_SIZE];
//! let n = session.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"hello");
//! session.close(false).unwrap();
//!
//! tx.join().unwrap();
//! ```

pub mod app;
pub mod constants;
pub mod error;
pub mod frame;
pub mod port;
pub mod reader;
pub mod session;
pub mod state_machine;
pub mod stuffing;
pub mod testutil;
pub mod timer;

pub use constants::MAX_PAYLOAD_SIZE;
pub use error::Error;
pub use port::{RawSerialPort, SerialPort};
pub use session::{Config, Role, Session, Stats};

//! Crate-wide error taxonomy.
//!
//! Only unrecoverable conditions reach these variants: everything the link
//! protocol can repair on its own (REJ, RR, retransmit) is handled inside
//! `session.rs` and never surfaces as an `Err`.

use std::io;
use thiserror::Error;

/// Errors produced by this crate's link layer and application driver.
#[derive(Debug, Error)]
pub enum Error {
    /// The serial device could not be opened, read, or written at the OS boundary.
    #[error("serial port error: {0}")]
    Port(#[from] io::Error),

    /// Received bytes failed destuffing, the header check, or the payload check.
    #[error("frame format error: {0}")]
    Format(String),

    /// Retransmission budget exhausted, or a control frame never arrived.
    #[error("timed out waiting for a response")]
    Timeout,

    /// The peer sent a syntactically valid frame whose control code is illegal
    /// in the current state (e.g. an I-frame during connection teardown).
    #[error("unexpected control byte 0x{0:02x} for the current state")]
    Protocol(u8),

    /// Invalid role, device, timeout, or an oversize write payload.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

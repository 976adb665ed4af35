//! Wire-level protocol constants.
//!
//! Values and naming follow the original RCOM link layer (`macros.h`): addresses
//! are fixed, not negotiated, so both ends of a session must agree on this file
//! by construction rather than by configuration.

/// Frame delimiter. Never appears unescaped inside a frame body.
pub const FLAG: u8 = 0x7E;

/// Stuffing escape prefix.
pub const ESCAPE: u8 = 0x7D;

/// XOR mask applied to a stuffed byte's original value.
pub const ESCAPE_XOR: u8 = 0x20;

/// Address of commands sent by the Transmitter / responses sent by the Receiver.
pub const A_T: u8 = 0x03;

/// Address of commands sent by the Receiver / responses sent by the Transmitter.
pub const A_R: u8 = 0x01;

/// Open session.
pub const C_SET: u8 = 0x03;
/// Unnumbered acknowledgement.
pub const C_UA: u8 = 0x07;
/// Disconnect.
pub const C_DISC: u8 = 0x0B;
/// Information frame, sequence 0.
pub const C_INF0: u8 = 0x00;
/// Information frame, sequence 1.
pub const C_INF1: u8 = 0x40;
/// Receiver ready, next expected = 0.
pub const C_RR0: u8 = 0x05;
/// Receiver ready, next expected = 1.
pub const C_RR1: u8 = 0x85;
/// Reject sequence 0.
pub const C_REJ0: u8 = 0x01;
/// Reject sequence 1.
pub const C_REJ1: u8 = 0x81;

/// Bit carrying the alternating sequence number inside an I-frame control byte.
pub const SEQ_BIT: u8 = 0x40;

/// Largest payload, in octets, accepted by `Session::write` / delivered by `Session::read`.
pub const MAX_PAYLOAD_SIZE: usize = 256;

/// Per-`read_byte` poll timeout on the serial port. Bounds how quickly the reader
/// loop notices an expired `Timer` (see `timer.rs`).
pub const PORT_POLL_TIMEOUT_MS: u64 = 100;

/// Single-bit sequence number alternated by the transmitter on every successful write.
pub type Seq = u8;

/// Control byte for an I-frame carrying the given sequence bit.
pub fn control_for_seq(seq: Seq) -> u8 {
    if seq == 0 {
        C_INF0
    } else {
        C_INF1
    }
}

/// Control byte for an RR (receiver-ready) acknowledging `next_expected`.
pub fn control_for_rr(next_expected: Seq) -> u8 {
    if next_expected == 0 {
        C_RR0
    } else {
        C_RR1
    }
}

/// Control byte for a REJ (reject) naming the rejected sequence.
pub fn control_for_rej(seq: Seq) -> u8 {
    if seq == 0 {
        C_REJ0
    } else {
        C_REJ1
    }
}

/// Extracts the sequence bit from an I-frame control byte.
pub fn seq_of_control(control: u8) -> Seq {
    (control & SEQ_BIT) >> 6
}

/// Whether `control` is either RR variant.
pub fn is_rr(control: u8) -> bool {
    control == C_RR0 || control == C_RR1
}

/// Whether `control` is either REJ variant.
pub fn is_rej(control: u8) -> bool {
    control == C_REJ0 || control == C_REJ1
}

/// Sequence number an RR control byte says it is waiting for next.
pub fn rr_next_expected(control: u8) -> Seq {
    if control == C_RR0 {
        0
    } else {
        1
    }
}

/// Sequence number a REJ control byte is rejecting.
pub fn rej_seq(control: u8) -> Seq {
    if control == C_REJ0 {
        0
    } else {
        1
    }
}

//! Frame assembly: Supervision/Unnumbered frames and Information frames.
//!
//! This module only builds bytes; it does not send or receive them (see
//! `reader.rs`/`session.rs`) and does not validate anything received off the
//! wire (see `session.rs`'s header/payload check verification).

use crate::constants::{control_for_seq, Seq, A_T, FLAG};
use crate::stuffing::stuff;

/// Parses a 5-octet Supervision/Unnumbered frame, verifying its header check.
/// Returns `(address, control)` on success.
pub fn parse_supervision_frame(bytes: &[u8]) -> Option<(u8, u8)> {
    if bytes.len() != 5 || bytes[0] != FLAG || bytes[4] != FLAG {
        return None;
    }
    let (a, c, bcc1) = (bytes[1], bytes[2], bytes[3]);
    if a ^ c == bcc1 {
        Some((a, c))
    } else {
        None
    }
}

/// XOR-reduction of `bytes`; used both as the I-frame payload check (`BCC2`)
/// and, trivially, as the header check (`BCC1 = A ^ C`) by callers.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Builds a 5-octet Supervision/Unnumbered frame: `FLAG | A | C | A^C | FLAG`.
pub fn build_supervision_frame(a: u8, c: u8) -> [u8; 5] {
    [FLAG, a, c, a ^ c, FLAG]
}

/// Builds a complete Information frame for `payload`, stamped with `seq`.
///
/// Layout: `FLAG | A_T | C | A_T^C | stuff(payload || BCC2) | FLAG`.
pub fn build_information_frame(seq: Seq, payload: &[u8]) -> Vec<u8> {
    let c = control_for_seq(seq);
    let bcc2 = xor_checksum(payload);

    let mut body = Vec::with_capacity(payload.len() + 1);
    body.extend_from_slice(payload);
    body.push(bcc2);
    let stuffed_body = stuff(&body);

    let mut frame = Vec::with_capacity(4 + stuffed_body.len() + 1);
    frame.push(FLAG);
    frame.push(A_T);
    frame.push(c);
    frame.push(A_T ^ c);
    frame.extend_from_slice(&stuffed_body);
    frame.push(FLAG);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{A_R, C_DISC, C_UA};

    #[test]
    fn xor_checksum_of_empty_is_zero() {
        assert_eq!(xor_checksum(&[]), 0);
    }

    #[test]
    fn supervision_frame_s6_disc_sequence() {
        assert_eq!(build_supervision_frame(A_T, C_DISC), [0x7E, 0x03, 0x0B, 0x08, 0x7E]);
        assert_eq!(build_supervision_frame(A_R, C_DISC), [0x7E, 0x01, 0x0B, 0x0A, 0x7E]);
        assert_eq!(build_supervision_frame(A_T, C_UA), [0x7E, 0x03, 0x07, 0x04, 0x7E]);
    }

    #[test]
    fn information_frame_s1_happy_path() {
        let frame = build_information_frame(0, &[0x01, 0x02, 0x03]);
        assert_eq!(frame, vec![0x7E, 0x03, 0x00, 0x03, 0x01, 0x02, 0x03, 0x00, 0x7E]);
    }

    #[test]
    fn information_frame_s2_stuffed_flag_payload() {
        let frame = build_information_frame(0, &[0x7E]);
        assert_eq!(frame, vec![0x7E, 0x03, 0x00, 0x03, 0x7D, 0x5E, 0x7D, 0x5E, 0x7E]);
    }

    #[test]
    fn information_frame_s3_stuffed_escape_payload() {
        let frame = build_information_frame(0, &[0x7D, 0x11]);
        assert_eq!(frame, vec![0x7E, 0x03, 0x00, 0x03, 0x7D, 0x5D, 0x11, 0x6C, 0x7E]);
    }

    #[test]
    fn information_frame_seq1_uses_inf1_control() {
        let frame = build_information_frame(1, &[0xAB]);
        assert_eq!(frame[2], 0x40);
        assert_eq!(frame[3], A_T ^ 0x40);
    }

    #[test]
    fn parse_supervision_frame_round_trips_a_built_one() {
        let frame = build_supervision_frame(A_T, C_DISC);
        assert_eq!(parse_supervision_frame(&frame), Some((A_T, C_DISC)));
    }

    #[test]
    fn parse_supervision_frame_rejects_bad_header_check() {
        let mut frame = build_supervision_frame(A_T, C_DISC);
        frame[3] ^= 0xFF;
        assert_eq!(parse_supervision_frame(&frame), None);
    }

    #[test]
    fn parse_supervision_frame_rejects_wrong_length() {
        assert_eq!(parse_supervision_frame(&[FLAG, A_T, C_DISC, FLAG]), None);
    }
}

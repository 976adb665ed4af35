//! Receiver state machine: a byte-driven DFA that recognises frame boundaries
//! and header classes without validating checksums.
//!
//! `ReceiverState` only tells the reader loop (`reader.rs`) when a candidate
//! frame has been fully copied off the wire; BCC1/BCC2 verification and
//! destuffing happen afterwards in `session.rs`.

use crate::constants::{
    C_DISC, C_INF0, C_INF1, C_REJ0, C_REJ1, C_RR0, C_RR1, C_SET, C_UA, FLAG, A_R, A_T,
};

/// States of the receiver DFA. Initial state is `Start`; `Stop` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    Start,
    FlagOk,
    ARcv,
    ATx,
    Receiving,
    Stop,
}

fn is_valid_rcv_control(c: u8) -> bool {
    matches!(c, C_SET | C_DISC | C_UA | C_INF0 | C_INF1)
}

fn is_valid_tx_control(c: u8) -> bool {
    matches!(c, C_UA | C_RR0 | C_RR1 | C_REJ0 | C_REJ1 | C_DISC)
}

impl ReceiverState {
    /// Advances the DFA by one received octet.
    pub fn step(self, b: u8) -> ReceiverState {
        match self {
            ReceiverState::Start => {
                if b == FLAG {
                    ReceiverState::FlagOk
                } else {
                    ReceiverState::Start
                }
            }
            ReceiverState::FlagOk => {
                if b == FLAG {
                    ReceiverState::FlagOk
                } else if b == A_T {
                    ReceiverState::ARcv
                } else if b == A_R {
                    ReceiverState::ATx
                } else {
                    ReceiverState::Start
                }
            }
            ReceiverState::ARcv => {
                if b == FLAG {
                    ReceiverState::FlagOk
                } else if is_valid_rcv_control(b) {
                    ReceiverState::Receiving
                } else {
                    ReceiverState::Start
                }
            }
            ReceiverState::ATx => {
                if b == FLAG {
                    ReceiverState::FlagOk
                } else if is_valid_tx_control(b) {
                    ReceiverState::Receiving
                } else {
                    ReceiverState::Start
                }
            }
            ReceiverState::Receiving => {
                if b == FLAG {
                    ReceiverState::Stop
                } else {
                    ReceiverState::Receiving
                }
            }
            ReceiverState::Stop => ReceiverState::Stop,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReceiverState::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::C_SET;

    #[test]
    fn recognises_a_supervision_frame() {
        let bytes = [FLAG, A_T, C_SET, A_T ^ C_SET, FLAG];
        let mut state = ReceiverState::Start;
        for &b in &bytes[..bytes.len() - 1] {
            state = state.step(b);
            assert_ne!(state, ReceiverState::Stop);
        }
        state = state.step(*bytes.last().unwrap());
        assert_eq!(state, ReceiverState::Stop);
    }

    #[test]
    fn resyncs_on_unexpected_byte_after_address() {
        let mut state = ReceiverState::Start.step(FLAG).step(A_T);
        assert_eq!(state, ReceiverState::ARcv);
        state = state.step(0xFF); // not a valid receiver-branch control byte
        assert_eq!(state, ReceiverState::Start);
    }

    #[test]
    fn bare_flag_outside_receiving_resets_to_flag_ok() {
        let mut state = ReceiverState::Start.step(FLAG).step(A_T);
        assert_eq!(state, ReceiverState::ARcv);
        state = state.step(FLAG);
        assert_eq!(state, ReceiverState::FlagOk);
    }

    #[test]
    fn receiving_copies_until_next_flag() {
        let mut state = ReceiverState::Receiving;
        for _ in 0..10 {
            state = state.step(0xAB);
            assert_eq!(state, ReceiverState::Receiving);
        }
        assert_eq!(state.step(FLAG), ReceiverState::Stop);
    }
}

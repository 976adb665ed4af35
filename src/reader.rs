//! Frame reader: drives the receiver DFA one byte at a time against a
//! `SerialPort`, bounded by a `Timer`.

use crate::constants::FLAG;
use crate::error::Error;
use crate::port::SerialPort;
use crate::state_machine::ReceiverState;
use crate::timer::Timer;

/// Reads bytes from `port` until the receiver DFA reaches `Stop` (a complete
/// candidate frame, including its framing `FLAG`s) or `timeout` expires.
pub fn read_frame(port: &mut impl SerialPort, timeout: Timer) -> Result<Vec<u8>, Error> {
    let mut state = ReceiverState::Start;
    let mut buf = Vec::new();

    loop {
        match port.read_byte()? {
            Some(b) => {
                let next = state.step(b);
                match next {
                    ReceiverState::Start => buf.clear(),
                    ReceiverState::FlagOk => {
                        // Fresh sync, or a bare FLAG mid-frame re-opening a new one.
                        buf.clear();
                        buf.push(b);
                    }
                    _ => buf.push(b),
                }
                state = next;
                if state.is_terminal() {
                    log::trace!("read_frame: complete candidate frame, {} bytes", buf.len());
                    return Ok(buf);
                }
            }
            None => {
                if timeout.is_expired() {
                    log::trace!("read_frame: timed out in state {:?}", state);
                    return Err(Error::Timeout);
                }
            }
        }
    }
}

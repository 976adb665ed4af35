//! In-memory loopback `SerialPort` pair.
//!
//! Not `#[cfg(test)]`: integration tests under `tests/` and the examples
//! under `demos/` are separate crates that cannot see items gated that way
//! inside the library, so this stays a plain public module instead.
//!
//! Grounded in the teacher's `RefCell`-backed loopback `Uart`
//! (`tests/transport_test.rs`), generalized from a single self-loop to a
//! two-ended pair so a transmitter `Session` and a receiver `Session` can
//! talk to each other in-process.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use crate::port::SerialPort;

/// One end of an in-memory loopback pair. Bytes written on one end are
/// readable from the other.
pub struct LoopbackPort {
    rx: Arc<Mutex<VecDeque<u8>>>,
    tx: Arc<Mutex<VecDeque<u8>>>,
}

impl LoopbackPort {
    /// Creates a connected pair: `a`'s writes are `b`'s reads, and vice versa.
    pub fn pair() -> (LoopbackPort, LoopbackPort) {
        let a_to_b = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a = Arc::new(Mutex::new(VecDeque::new()));
        let a = LoopbackPort {
            rx: Arc::clone(&b_to_a),
            tx: Arc::clone(&a_to_b),
        };
        let b = LoopbackPort {
            rx: a_to_b,
            tx: b_to_a,
        };
        (a, b)
    }
}

impl SerialPort for LoopbackPort {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.rx.lock().unwrap().pop_front())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.tx.lock().unwrap().extend(bytes.iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_on_one_end_are_readable_on_the_other() {
        let (mut a, mut b) = LoopbackPort::pair();
        a.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(b.read_byte().unwrap(), Some(1));
        assert_eq!(b.read_byte().unwrap(), Some(2));
        assert_eq!(b.read_byte().unwrap(), Some(3));
        assert_eq!(b.read_byte().unwrap(), None);
    }

    #[test]
    fn is_full_duplex() {
        let (mut a, mut b) = LoopbackPort::pair();
        a.write_all(&[0xAA]).unwrap();
        b.write_all(&[0xBB]).unwrap();
        assert_eq!(b.read_byte().unwrap(), Some(0xAA));
        assert_eq!(a.read_byte().unwrap(), Some(0xBB));
    }
}

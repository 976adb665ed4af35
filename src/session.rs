//! Link-layer session engine: connection setup/teardown, stop-and-wait with
//! alternating bit, timer-driven retransmission, duplicate detection, and
//! REJ-triggered fast retransmit.

use std::time::Duration;

use crate::constants::{
    control_for_rej, control_for_rr, is_rej, is_rr, rej_seq, rr_next_expected, seq_of_control,
    Seq, A_R, A_T, C_DISC, C_SET, C_UA, MAX_PAYLOAD_SIZE,
};
use crate::error::Error;
use crate::frame::{build_information_frame, build_supervision_frame, parse_supervision_frame, xor_checksum};
use crate::port::{RawSerialPort, SerialPort};
use crate::reader::read_frame;
use crate::stuffing::destuff;
use crate::timer::Timer;

/// Which end of the link this session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Transmitter,
    Receiver,
}

/// Immutable session configuration, validated once at `Session::open`.
#[derive(Debug, Clone)]
pub struct Config {
    pub role: Role,
    pub device: String,
    pub line_speed: serial::BaudRate,
    /// Per-retransmission wait, in whole seconds. Must be >= 1.
    pub timeout_secs: u8,
    /// Bounds each retransmission loop.
    pub max_retransmissions: u8,
}

impl Config {
    /// Checks the configuration without touching any I/O.
    pub fn validate(&self) -> Result<(), Error> {
        if self.device.trim().is_empty() {
            return Err(Error::Configuration("device must not be empty".to_string()));
        }
        if self.timeout_secs < 1 {
            return Err(Error::Configuration(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs as u64)
    }
}

/// Accumulated session counters, logged by `close` when `show_statistics` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub frames_sent: u64,
    pub retransmissions: u64,
    pub rejs_received: u64,
    pub duplicates_absorbed: u64,
}

/// One link-layer session, generic over the underlying `SerialPort` so tests
/// can run it against `testutil::LoopbackPort` instead of a real TTY.
pub struct Session<P: SerialPort> {
    port: P,
    role: Role,
    timeout: Duration,
    max_retransmissions: u8,
    tx_next_seq: Seq,
    rx_last_seq: Option<Seq>,
    stats: Stats,
}

impl Session<RawSerialPort> {
    /// Opens a real serial device and performs the connection handshake.
    pub fn open(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let port = RawSerialPort::open(&config.device, config.line_speed)?;
        Session::open_with_port(config, port)
    }
}

impl<P: SerialPort> Session<P> {
    /// Performs the connection handshake over an already-acquired port.
    /// Used directly by tests against `LoopbackPort`; `Session::open` builds
    /// on top of this for the real-hardware path.
    pub fn open_with_port(config: Config, port: P) -> Result<Self, Error> {
        config.validate()?;
        let mut session = Session {
            port,
            role: config.role,
            timeout: config.timeout(),
            max_retransmissions: config.max_retransmissions,
            tx_next_seq: 0,
            rx_last_seq: None,
            stats: Stats::default(),
        };
        match session.role {
            Role::Transmitter => session.open_as_transmitter()?,
            Role::Receiver => session.open_as_receiver()?,
        }
        Ok(session)
    }

    fn open_as_transmitter(&mut self) -> Result<(), Error> {
        for attempt in 0..self.max_retransmissions {
            self.port.write_all(&build_supervision_frame(A_T, C_SET))?;
            log::debug!("open: sent SET, attempt {attempt}");
            match read_frame(&mut self.port, Timer::arm(self.timeout)) {
                Ok(bytes) => match parse_supervision_frame(&bytes) {
                    Some((a, c)) if a == A_R && c == C_UA => {
                        log::debug!("open: received UA, session established");
                        return Ok(());
                    }
                    _ => log::warn!("open: discarding unexpected frame while waiting for UA"),
                },
                Err(Error::Timeout) => log::debug!("open: SET attempt {attempt} timed out"),
                Err(e) => return Err(e),
            }
        }
        Err(Error::Timeout)
    }

    fn open_as_receiver(&mut self) -> Result<(), Error> {
        loop {
            let bytes = read_frame(&mut self.port, Timer::never())?;
            match parse_supervision_frame(&bytes) {
                Some((a, c)) if a == A_T && c == C_SET => {
                    self.port.write_all(&build_supervision_frame(A_R, C_UA))?;
                    log::debug!("open: received SET, replied UA, session established");
                    return Ok(());
                }
                _ => log::warn!("open: discarding non-SET frame while waiting to open"),
            }
        }
    }

    /// Writes `payload` (at most `MAX_PAYLOAD_SIZE` bytes), retrying with the
    /// alternating sequence bit until acknowledged or the retransmission
    /// budget is exhausted. Returns the number of framed, stuffed bytes put
    /// on the wire by the final (successful) attempt.
    pub fn write(&mut self, payload: &[u8]) -> Result<usize, Error> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::Configuration(format!(
                "payload of {} bytes exceeds MAX_PAYLOAD_SIZE ({})",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        let seq = self.tx_next_seq;
        let frame = build_information_frame(seq, payload);

        for attempt in 0..=self.max_retransmissions {
            self.port.write_all(&frame)?;
            self.stats.frames_sent += 1;
            if attempt > 0 {
                self.stats.retransmissions += 1;
            }

            match read_frame(&mut self.port, Timer::arm(self.timeout)) {
                Ok(bytes) => {
                    if let Some((a, c)) = parse_supervision_frame(&bytes) {
                        if a == A_R && is_rr(c) {
                            let acked_next = rr_next_expected(c);
                            if acked_next == 1 - seq {
                                self.tx_next_seq = 1 - seq;
                                log::debug!("write: INF{seq} acknowledged");
                                return Ok(frame.len());
                            }
                            log::debug!("write: duplicate RR for seq {seq}, retransmitting");
                            continue;
                        }
                        if a == A_R && is_rej(c) && rej_seq(c) == seq {
                            self.stats.rejs_received += 1;
                            log::debug!("write: REJ{seq} received, fast retransmit");
                            continue;
                        }
                    }
                    log::warn!("write: unexpected response frame, retransmitting");
                }
                Err(Error::Timeout) => {
                    log::debug!("write: attempt {attempt} timed out, retransmitting");
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::Timeout)
    }

    /// Reads the next in-order payload into `out`. Returns `Ok(0)` when the
    /// frame received was a duplicate already delivered to the caller;
    /// callers should simply call `read` again in that case.
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize, Error> {
        debug_assert!(
            out.len() >= MAX_PAYLOAD_SIZE,
            "out buffer must be at least MAX_PAYLOAD_SIZE bytes"
        );

        let bytes = read_frame(&mut self.port, Timer::never())?;
        if bytes.len() < 5 {
            return Err(Error::Format("frame shorter than the minimum header".to_string()));
        }

        let (a, c, bcc1) = (bytes[1], bytes[2], bytes[3]);
        let stuffed_body = &bytes[4..bytes.len() - 1];
        let seq = seq_of_control(c);

        if a != A_T || (a ^ c) != bcc1 {
            log::warn!("read: header check failed, sending REJ{seq}");
            self.reply_rej(seq)?;
            return Err(Error::Format("header check failed".to_string()));
        }

        let destuffed = match destuff(stuffed_body) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("read: destuffing failed, sending REJ{seq}");
                self.reply_rej(seq)?;
                return Err(e);
            }
        };
        if destuffed.is_empty() {
            log::warn!("read: frame has no trailing BCC2, sending REJ{seq}");
            self.reply_rej(seq)?;
            return Err(Error::Format("missing payload check octet".to_string()));
        }

        let (payload, bcc2_slice) = destuffed.split_at(destuffed.len() - 1);
        let bcc2 = bcc2_slice[0];
        if xor_checksum(payload) != bcc2 {
            log::warn!("read: BCC2 mismatch, sending REJ{seq}");
            self.reply_rej(seq)?;
            return Err(Error::Format("payload check failed".to_string()));
        }

        // The receiver always tells its peer "I'm waiting for 1 - seq",
        // whether this frame is a fresh delivery or a duplicate of the last
        // one accepted (matching the worked lost-ACK scenario: a duplicate
        // of seq 0 is re-acked with RR1, not RR0).
        let next_expected = 1 - seq;
        if Some(seq) == self.rx_last_seq {
            self.stats.duplicates_absorbed += 1;
            log::debug!("read: duplicate of seq {seq}, re-acking RR{next_expected}");
            self.reply_rr(next_expected)?;
            return Ok(0);
        }

        self.reply_rr(next_expected)?;
        self.rx_last_seq = Some(seq);
        out[..payload.len()].copy_from_slice(payload);
        log::debug!("read: delivered seq {seq}, {} bytes", payload.len());
        Ok(payload.len())
    }

    fn reply_rr(&mut self, next_expected: Seq) -> Result<(), Error> {
        let c = control_for_rr(next_expected);
        self.port
            .write_all(&build_supervision_frame(A_R, c))
            .map_err(Error::from)
    }

    fn reply_rej(&mut self, seq: Seq) -> Result<(), Error> {
        let c = control_for_rej(seq);
        self.port
            .write_all(&build_supervision_frame(A_R, c))
            .map_err(Error::from)
    }

    /// Tears the session down, consuming it. Statistics are logged at `info`
    /// level when `show_statistics` is set, regardless of the outcome.
    pub fn close(mut self, show_statistics: bool) -> Result<(), Error> {
        let result = match self.role {
            Role::Transmitter => self.close_as_transmitter(),
            Role::Receiver => self.close_as_receiver(),
        };

        if show_statistics {
            log::info!(
                "session statistics: frames_sent={}, retransmissions={}, rejs_received={}, duplicates_absorbed={}",
                self.stats.frames_sent,
                self.stats.retransmissions,
                self.stats.rejs_received,
                self.stats.duplicates_absorbed
            );
        }

        result
    }

    fn close_as_transmitter(&mut self) -> Result<(), Error> {
        let mut peer_disc = false;
        for _ in 0..self.max_retransmissions {
            self.port.write_all(&build_supervision_frame(A_T, C_DISC))?;
            match read_frame(&mut self.port, Timer::arm(self.timeout)) {
                Ok(bytes) => {
                    if let Some((a, c)) = parse_supervision_frame(&bytes) {
                        if a == A_R && c == C_DISC {
                            peer_disc = true;
                            break;
                        }
                    }
                }
                Err(Error::Timeout) => {}
                Err(e) => return Err(e),
            }
        }
        if !peer_disc {
            return Err(Error::Timeout);
        }
        self.port.write_all(&build_supervision_frame(A_T, C_UA))?;
        Ok(())
    }

    fn close_as_receiver(&mut self) -> Result<(), Error> {
        loop {
            let bytes = read_frame(&mut self.port, Timer::never())?;
            if let Some((a, c)) = parse_supervision_frame(&bytes) {
                if a == A_T && c == C_DISC {
                    break;
                }
            }
        }
        self.port.write_all(&build_supervision_frame(A_R, C_DISC))?;

        match read_frame(&mut self.port, Timer::arm(self.timeout)) {
            Ok(bytes) => match parse_supervision_frame(&bytes) {
                Some((a, c)) if a == A_T && c == C_UA => {}
                _ => log::warn!("close: expected a final UA, got something else"),
            },
            Err(Error::Timeout) => log::warn!("close: timed out waiting for the final UA"),
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

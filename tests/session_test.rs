//! Integration tests driving two `Session<LoopbackPort>` ends against each
//! other in-process, plus a couple of tests that drive one end's raw wire
//! directly to exercise the failure-recovery paths described in the
//! protocol's worked scenarios (corrupted header, lost ACK).

use std::thread;
use std::time::Duration;

use hdlc_link::constants;
use hdlc_link::frame::{build_information_frame, build_supervision_frame};
use hdlc_link::testutil::LoopbackPort;
use hdlc_link::{Config, Role, Session, SerialPort};

fn base_config(role: Role) -> Config {
    Config {
        role,
        device: "loopback".to_string(),
        line_speed: serial::Baud9600,
        timeout_secs: 1,
        max_retransmissions: 3,
    }
}

#[test]
fn full_lifecycle_round_trip() {
    let (tx_port, rx_port) = LoopbackPort::pair();

    let receiver = thread::spawn(move || {
        let mut session = Session::open_with_port(base_config(Role::Receiver), rx_port).unwrap();
        let mut buf = [0u8; hdlc_link::MAX_PAYLOAD_SIZE];
        let mut received = Vec::new();
        loop {
            let n = session.read(&mut buf).unwrap();
            if n == 0 {
                continue;
            }
            received.push(buf[..n].to_vec());
            if received.len() == 3 {
                break;
            }
        }
        session.close(true).unwrap();
        received
    });

    let mut session = Session::open_with_port(base_config(Role::Transmitter), tx_port).unwrap();
    session.write(b"first").unwrap();
    session.write(b"second").unwrap();
    session.write(b"third").unwrap();
    session.close(true).unwrap();

    let received = receiver.join().unwrap();
    assert_eq!(received, vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]);
}

#[test]
fn alternating_sequence_bit_is_visible_on_the_wire() {
    let (tx_port, rx_port) = LoopbackPort::pair();

    let receiver = thread::spawn(move || {
        let mut session = Session::open_with_port(base_config(Role::Receiver), rx_port).unwrap();
        let mut buf = [0u8; hdlc_link::MAX_PAYLOAD_SIZE];
        for _ in 0..4 {
            loop {
                if session.read(&mut buf).unwrap() > 0 {
                    break;
                }
            }
        }
        session.close(false).unwrap();
    });

    let mut session = Session::open_with_port(base_config(Role::Transmitter), tx_port).unwrap();
    for i in 0..4u8 {
        session.write(&[i]).unwrap();
    }
    session.close(false).unwrap();
    receiver.join().unwrap();
}

#[test]
fn duplicate_frame_is_absorbed_and_re_acked() {
    let (mut wire, rx_port) = LoopbackPort::pair();

    let receiver = thread::spawn(move || {
        let mut session = Session::open_with_port(base_config(Role::Receiver), rx_port).unwrap();
        let mut buf = [0u8; hdlc_link::MAX_PAYLOAD_SIZE];
        let first = loop {
            let n = session.read(&mut buf).unwrap();
            if n > 0 {
                break buf[..n].to_vec();
            }
        };
        let second = session.read(&mut buf).unwrap();
        (first, second)
    });

    // Drive the handshake and a deliberately duplicated I-frame by hand.
    wire.write_all(&build_supervision_frame(constants::A_T, constants::C_SET)).unwrap();
    let ua = read_frame_blocking(&mut wire);
    assert_eq!(ua, build_supervision_frame(constants::A_R, constants::C_UA));

    let inf0 = build_information_frame(0, b"payload");
    wire.write_all(&inf0).unwrap();
    let rr1 = read_frame_blocking(&mut wire);
    assert_eq!(rr1, build_supervision_frame(constants::A_R, constants::C_RR1));

    // Simulate the ACK being lost: resend the same frame.
    wire.write_all(&inf0).unwrap();
    let rr1_again = read_frame_blocking(&mut wire);
    assert_eq!(rr1_again, build_supervision_frame(constants::A_R, constants::C_RR1));

    let (first, second) = receiver.join().unwrap();
    assert_eq!(first, b"payload");
    assert_eq!(second, 0, "duplicate delivery must report Ok(0)");
}

#[test]
fn corrupted_header_is_rejected_and_retransmitted() {
    let (mut wire, rx_port) = LoopbackPort::pair();

    let receiver = thread::spawn(move || {
        let mut session = Session::open_with_port(base_config(Role::Receiver), rx_port).unwrap();
        let mut buf = [0u8; hdlc_link::MAX_PAYLOAD_SIZE];
        // The first read observes the corrupted frame and fails; the caller
        // (a real Session::write loop) would retransmit, so retry here too.
        let err = session.read(&mut buf).unwrap_err();
        assert!(matches!(err, hdlc_link::Error::Format(_)));
        let n = loop {
            let n = session.read(&mut buf).unwrap();
            if n > 0 {
                break n;
            }
        };
        buf[..n].to_vec()
    });

    wire.write_all(&build_supervision_frame(constants::A_T, constants::C_SET)).unwrap();
    let _ua = read_frame_blocking(&mut wire);

    let mut corrupted = build_information_frame(0, &[0xAB]);
    corrupted[3] ^= 0xFF; // flip the header check
    wire.write_all(&corrupted).unwrap();
    let rej0 = read_frame_blocking(&mut wire);
    assert_eq!(rej0, build_supervision_frame(constants::A_R, constants::C_REJ0));

    let good = build_information_frame(0, &[0xAB]);
    wire.write_all(&good).unwrap();
    let _rr1 = read_frame_blocking(&mut wire);

    let delivered = receiver.join().unwrap();
    assert_eq!(delivered, vec![0xAB]);
}

#[test]
fn rej_triggers_immediate_retransmit_without_toggling_seq() {
    let (mut wire, tx_port) = LoopbackPort::pair();

    let transmitter = thread::spawn(move || {
        let mut session = Session::open_with_port(
            Config {
                timeout_secs: 5,
                max_retransmissions: 3,
                ..base_config(Role::Transmitter)
            },
            tx_port,
        )
        .unwrap();
        let n = session.write(b"payload").unwrap();
        (session, n)
    });

    let set = read_frame_blocking(&mut wire);
    assert_eq!(set, build_supervision_frame(constants::A_T, constants::C_SET));
    wire.write_all(&build_supervision_frame(constants::A_R, constants::C_UA)).unwrap();

    let first = read_frame_blocking(&mut wire);
    assert_eq!(first, build_information_frame(0, b"payload"));

    // Reply REJ0 well before the 5s timer would fire; the retransmit must
    // arrive promptly, proving it was driven by the REJ, not the timeout.
    let started = std::time::Instant::now();
    wire.write_all(&build_supervision_frame(constants::A_R, constants::C_REJ0)).unwrap();
    let retransmitted = read_frame_blocking(&mut wire);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "retransmit took {:?}, looks timer-driven rather than REJ-driven",
        started.elapsed()
    );
    assert_eq!(retransmitted, first, "retransmitted frame must still carry seq 0");

    wire.write_all(&build_supervision_frame(constants::A_R, constants::C_RR1)).unwrap();

    let (mut session, n) = transmitter.join().unwrap();
    assert_eq!(n, first.len());

    // The REJ itself must not have toggled tx_next_seq: the next write is
    // INF1, not INF0 again, and it happens exactly once (the first write
    // already consumed seq 0, retransmitted it unchanged under the REJ,
    // and only toggled once RR1 finally arrived).
    let writer = thread::spawn(move || session.write(b"more").unwrap());
    let second = read_frame_blocking(&mut wire);
    assert_eq!(second, build_information_frame(1, b"more"));
    wire.write_all(&build_supervision_frame(constants::A_R, constants::C_RR0)).unwrap();
    writer.join().unwrap();
}

#[test]
fn open_times_out_against_a_silent_peer() {
    // Nobody ever reads `rx_port` or replies on it, so the transmitter's SET
    // handshake must exhaust its retransmission budget and fail.
    let (tx_port, _rx_port) = LoopbackPort::pair();
    let config = Config {
        timeout_secs: 1,
        max_retransmissions: 1,
        ..base_config(Role::Transmitter)
    };

    let result = Session::open_with_port(config, tx_port);
    assert!(matches!(result, Err(hdlc_link::Error::Timeout)));
}

fn read_frame_blocking(port: &mut LoopbackPort) -> Vec<u8> {
    use hdlc_link::reader::read_frame;
    use hdlc_link::timer::Timer;
    read_frame(port, Timer::arm(Duration::from_secs(2))).unwrap()
}

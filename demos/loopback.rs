//! Runs a transmitter and a receiver session against each other over an
//! in-memory loopback pair, transferring this very file. No serial hardware
//! required; useful for exercising the protocol in CI or by hand.

use std::env;
use std::path::PathBuf;

use hdlc_link::app;
use hdlc_link::testutil::LoopbackPort;
use hdlc_link::{Config, Role, Session};

fn main() {
    env_logger::init();

    let source: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(file!()));
    let dest = env::temp_dir().join("hdlc_link_loopback_demo.out");

    let (tx_port, rx_port) = LoopbackPort::pair();

    let base_config = Config {
        role: Role::Transmitter,
        device: "loopback".to_string(),
        line_speed: serial::Baud9600,
        timeout_secs: 1,
        max_retransmissions: 3,
    };
    let tx_config = base_config.clone();
    let rx_config = Config {
        role: Role::Receiver,
        ..base_config
    };

    let dest_for_receiver = dest.clone();
    let receiver = std::thread::spawn(move || {
        let mut session = Session::open_with_port(rx_config, rx_port).expect("receiver open");
        app::receive_file(&mut session, &dest_for_receiver).expect("receive_file");
        session.close(true).expect("receiver close");
    });

    let mut session = Session::open_with_port(tx_config, tx_port).expect("transmitter open");
    app::send_file(&mut session, &source).expect("send_file");
    session.close(true).expect("transmitter close");

    receiver.join().expect("receiver thread panicked");
    println!("transferred {} -> {}", source.display(), dest.display());
}

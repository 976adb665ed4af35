//! Opens a real serial device and sends a short test frame, acting as the
//! transmitter side of a session. Pair it with a receiver running the same
//! crate (e.g. via `filexfer --role rx`) on the other end of a null-modem
//! cable or a socat PTY pair.

use log::{debug, LevelFilter};

use hdlc_link::{Config, Role, Session};

const SERIAL_PORT: &str = "/dev/ttyS5";
const BAUD_RATE: serial::BaudRate = serial::Baud115200;

fn main() {
    log::set_max_level(LevelFilter::Debug);
    env_logger::init();

    let config = Config {
        role: Role::Transmitter,
        device: SERIAL_PORT.to_string(),
        line_speed: BAUD_RATE,
        timeout_secs: 3,
        max_retransmissions: 3,
    };

    let mut session = Session::open(config).expect("failed to open session");
    debug!(target: "real_uart_on_linux", "session open");

    let tx_data: [u8; 3] = [1, 2, 3];
    session.write(&tx_data).expect("failed to write frame");
    debug!(target: "real_uart_on_linux", "sent frame: {tx_data:?}");

    session.close(true).expect("failed to close session");
}

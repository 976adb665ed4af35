//! Small CLI driving `hdlc_link::app::{send_file, receive_file}` over a real
//! serial port. Demonstrates the crate end-to-end; the interesting logic
//! lives in the library.

use std::path::PathBuf;
use std::process;

use argh::FromArgs;
use log::error;

use hdlc_link::app;
use hdlc_link::{Config, Role, Session};

/// Send or receive a file over a stop-and-wait serial link.
#[derive(FromArgs)]
struct Args {
    /// "tx" to send `--file`, "rx" to receive into it
    #[argh(option)]
    role: String,

    /// serial device, e.g. /dev/ttyUSB0
    #[argh(option)]
    device: String,

    /// line speed in bits per second (default: 9600)
    #[argh(option, default = "9600")]
    baud: usize,

    /// per-retransmission wait, in whole seconds (default: 3)
    #[argh(option, default = "3")]
    timeout: u8,

    /// retransmission budget before giving up (default: 3)
    #[argh(option, default = "3")]
    retries: u8,

    /// file to send, or to create on receipt
    #[argh(option)]
    file: PathBuf,

    /// log accumulated session statistics on close
    #[argh(switch)]
    stats: bool,
}

fn main() {
    env_logger::init();
    let args: Args = argh::from_env();

    let role = match args.role.as_str() {
        "tx" => Role::Transmitter,
        "rx" => Role::Receiver,
        other => {
            error!("invalid --role {other:?}, expected \"tx\" or \"rx\"");
            process::exit(2);
        }
    };

    let config = Config {
        role,
        device: args.device,
        line_speed: serial::BaudRate::from_speed(args.baud),
        timeout_secs: args.timeout,
        max_retransmissions: args.retries,
    };

    let mut session = match Session::open(config) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to open session: {e}");
            process::exit(1);
        }
    };

    let result = match role {
        Role::Transmitter => app::send_file(&mut session, &args.file),
        Role::Receiver => app::receive_file(&mut session, &args.file),
    };

    if let Err(e) = result {
        error!("transfer failed: {e}");
        let _ = session.close(args.stats);
        process::exit(1);
    }

    if let Err(e) = session.close(args.stats) {
        error!("failed to close session cleanly: {e}");
        process::exit(1);
    }
}

//! Minimal file-transfer application on top of the link layer: a thin packet
//! chunker, not a second subsystem. The link layer never inspects these
//! bytes; they only make sense to the two ends of `app::send_file` /
//! `app::receive_file`.
//!
//! Grounded in the original source's `application_layer.c`, fixing its
//! `sendControlPacket` bug of passing the *file size* as the link-layer
//! write length instead of the length of the buffer it actually populated.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::constants::MAX_PAYLOAD_SIZE;
use crate::error::Error;
use crate::port::SerialPort;
use crate::session::Session;

const CONTROL_DATA: u8 = 1;
const CONTROL_START: u8 = 2;
const CONTROL_END: u8 = 3;

const DATA_HEADER_LEN: usize = 3;
const MAX_CHUNK_LEN: usize = MAX_PAYLOAD_SIZE - DATA_HEADER_LEN;

fn build_control_packet(control: u8, filename: &str, file_size: u64) -> Vec<u8> {
    let name = filename.as_bytes();
    let mut buf = Vec::with_capacity(2 + name.len() + 4);
    buf.push(control);
    buf.push(name.len() as u8);
    buf.extend_from_slice(name);
    buf.extend_from_slice(&(file_size as u32).to_be_bytes());
    buf
}

fn parse_control_packet(buf: &[u8]) -> Result<(u8, String, u64), Error> {
    if buf.len() < 2 {
        return Err(Error::Format("control packet shorter than its fixed header".to_string()));
    }
    let control = buf[0];
    let name_len = buf[1] as usize;
    let name_start = 2;
    let name_end = name_start + name_len;
    let size_end = name_end + 4;
    if buf.len() < size_end {
        return Err(Error::Format("control packet truncated before file size".to_string()));
    }
    let filename = String::from_utf8(buf[name_start..name_end].to_vec())
        .map_err(|_| Error::Format("control packet filename is not valid UTF-8".to_string()))?;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&buf[name_end..size_end]);
    let file_size = u32::from_be_bytes(size_bytes) as u64;
    Ok((control, filename, file_size))
}

fn build_data_packet(chunk: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(DATA_HEADER_LEN + chunk.len());
    buf.push(CONTROL_DATA);
    buf.extend_from_slice(&(chunk.len() as u16).to_be_bytes());
    buf.extend_from_slice(chunk);
    buf
}

/// Reads `path` and drives it across an already-open `Session` as one
/// `Start` packet, N `Data` packets of at most `MAX_PAYLOAD_SIZE - 3` bytes
/// each, and one `End` packet.
pub fn send_file<P: SerialPort>(session: &mut Session<P>, path: &Path) -> Result<(), Error> {
    let mut file = File::open(path).map_err(Error::Port)?;
    let file_size = file.metadata().map_err(Error::Port)?.len();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Configuration("file path has no valid UTF-8 filename".to_string()))?
        .to_string();

    let start = build_control_packet(CONTROL_START, &filename, file_size);
    session.write(&start)?;
    log::debug!("app: sent start packet for {filename} ({file_size} bytes)");

    let mut buf = vec![0u8; MAX_CHUNK_LEN];
    loop {
        let n = file.read(&mut buf).map_err(Error::Port)?;
        if n == 0 {
            break;
        }
        let packet = build_data_packet(&buf[..n]);
        session.write(&packet)?;
    }

    let end = build_control_packet(CONTROL_END, &filename, file_size);
    session.write(&end)?;
    log::debug!("app: sent end packet, transfer complete");
    Ok(())
}

/// Receives a file across an already-open `Session`, writing it to `path`.
/// Blocks on `session.read` until an `End` packet closes the transfer.
pub fn receive_file<P: SerialPort>(session: &mut Session<P>, path: &Path) -> Result<(), Error> {
    let mut buf = vec![0u8; MAX_PAYLOAD_SIZE];

    let (control, filename, file_size) = loop {
        let n = session.read(&mut buf)?;
        if n == 0 {
            continue;
        }
        break parse_control_packet(&buf[..n])?;
    };
    if control != CONTROL_START {
        return Err(Error::Format(format!(
            "expected a start packet, got control byte {control}"
        )));
    }
    log::debug!("app: receiving {filename} ({file_size} bytes)");

    let mut out = File::create(path).map_err(Error::Port)?;
    loop {
        let n = session.read(&mut buf)?;
        if n == 0 {
            continue;
        }
        let packet = &buf[..n];
        if packet.is_empty() {
            return Err(Error::Format("empty data packet".to_string()));
        }
        match packet[0] {
            CONTROL_END => break,
            CONTROL_DATA => {
                if packet.len() < DATA_HEADER_LEN {
                    return Err(Error::Format("data packet shorter than its header".to_string()));
                }
                let len = u16::from_be_bytes([packet[1], packet[2]]) as usize;
                let chunk_start = DATA_HEADER_LEN;
                let chunk_end = chunk_start + len;
                if packet.len() < chunk_end {
                    return Err(Error::Format("data packet shorter than its declared length".to_string()));
                }
                out.write_all(&packet[chunk_start..chunk_end]).map_err(Error::Port)?;
            }
            other => return Err(Error::Format(format!("unexpected data-phase control byte {other}"))),
        }
    }

    log::debug!("app: received end packet, transfer complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_packet_round_trips_name_and_size() {
        let packet = build_control_packet(CONTROL_START, "report.pdf", 123_456);
        let (control, filename, size) = parse_control_packet(&packet).unwrap();
        assert_eq!(control, CONTROL_START);
        assert_eq!(filename, "report.pdf");
        assert_eq!(size, 123_456);
    }

    #[test]
    fn data_packet_carries_length_then_payload() {
        let packet = build_data_packet(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(packet[0], CONTROL_DATA);
        assert_eq!(u16::from_be_bytes([packet[1], packet[2]]), 3);
        assert_eq!(&packet[3..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn parse_control_packet_rejects_truncated_input() {
        assert!(parse_control_packet(&[CONTROL_START]).is_err());
        assert!(parse_control_packet(&[CONTROL_START, 3, b'a', b'b', b'c']).is_err());
    }
}

//! Byte-stuffing codec.
//!
//! `stuff` and `destuff` are inverse transforms applied to an I-frame's payload
//! and trailing `BCC2` octet. Header octets (`FLAG, A, C, A^C`) are never
//! stuffed: by construction none of them can equal `FLAG` for a frame defined
//! in this protocol.

use crate::constants::{ESCAPE, ESCAPE_XOR, FLAG};
use crate::error::Error;

/// Escapes every `FLAG` and `ESCAPE` octet in `src`, emitting `ESCAPE` followed
/// by the original byte XORed with `ESCAPE_XOR`.
pub fn stuff(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    for &b in src {
        if b == FLAG || b == ESCAPE {
            out.push(ESCAPE);
            out.push(b ^ ESCAPE_XOR);
        } else {
            out.push(b);
        }
    }
    out
}

/// Reverses `stuff`. An `ESCAPE` as the final byte of `src` is a format error:
/// there is no following byte to unescape.
pub fn destuff(src: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] == ESCAPE {
            let next = src.get(i + 1).ok_or_else(|| {
                Error::Format("escape byte at end of buffer".to_string())
            })?;
            out.push(next ^ ESCAPE_XOR);
            i += 2;
        } else {
            out.push(src[i]);
            i += 1;
        }
    }
    Ok(out)
}

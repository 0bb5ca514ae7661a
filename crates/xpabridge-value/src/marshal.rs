//! Byte-level string marshaling with explicit, validated lengths.

use crate::error::{Result, ValueError};

/// Length sentinel: compute the length by scanning for a terminating NUL.
pub const LEN_UNKNOWN: i64 = -1;

/// Copy a possibly-absent byte sequence into an owned string.
///
/// `LEN_UNKNOWN` takes everything up to the first NUL, or the whole slice
/// when none is present. An explicit length takes exactly that many bytes,
/// interior NULs included. Fails with `InvalidLength` for a negative length
/// other than the sentinel, an absent source with a nonzero length, or a
/// length past the end of the source.
pub fn text_from_bytes(src: Option<&[u8]>, len: i64) -> Result<Option<String>> {
    let len = if len == LEN_UNKNOWN {
        match src {
            None => 0,
            Some(bytes) => bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len()),
        }
    } else {
        if len < 0 || (src.is_none() && len != 0) {
            return Err(ValueError::InvalidLength(len));
        }
        len as usize
    };

    let Some(bytes) = src else {
        return Ok(None);
    };
    if len > bytes.len() {
        return Err(ValueError::InvalidLength(len as i64));
    }
    Ok(Some(String::from_utf8_lossy(&bytes[..len]).into_owned()))
}

/// Render a host string as a NUL-terminated byte vector.
///
/// Interior NULs are replaced with `?` so the result stays a valid C string.
pub fn c_bytes_from_text(text: &str) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .bytes()
        .map(|b| if b == 0 { b'?' } else { b })
        .collect();
    out.push(0);
    out
}

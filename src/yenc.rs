//! Incremental yEnc line decoding
//!
//! Compressed overview and header responses wrap a raw deflate stream in a
//! single yEnc part: a `=ybegin` header line, encoded data lines and a
//! `=yend` trailer carrying the CRC-32 of the decoded bytes. Binary article
//! bodies use the same framing, with an optional `=ypart` line for one part
//! of a larger file.

use crc32fast::Hasher;

/// Streaming decoder for yEnc data lines
///
/// An escape character at the end of one line applies to the first byte
/// of the next, so state is carried across calls.
pub struct YencLineDecoder {
    escape: bool,
    hasher: Hasher,
    decoded_len: u64,
}

impl YencLineDecoder {
    /// Create a decoder with no pending escape and an empty checksum
    pub fn new() -> Self {
        Self {
            escape: false,
            hasher: Hasher::new(),
            decoded_len: 0,
        }
    }

    /// Decode one data line (without CRLF), appending to `out`
    pub fn decode_line(&mut self, line: &[u8], out: &mut Vec<u8>) {
        let start = out.len();
        out.reserve(line.len());

        for &byte in line {
            if self.escape {
                out.push(byte.wrapping_sub(106));
                self.escape = false;
            } else if byte == b'=' {
                self.escape = true;
            } else if byte == b'\r' || byte == b'\n' {
                continue;
            } else {
                out.push(byte.wrapping_sub(42));
            }
        }

        self.hasher.update(&out[start..]);
        self.decoded_len += (out.len() - start) as u64;
    }

    /// CRC-32 of everything decoded so far
    pub fn crc32(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Number of decoded bytes so far
    pub fn decoded_len(&self) -> u64 {
        self.decoded_len
    }
}

impl Default for YencLineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check for a `=ybegin` header line
pub fn is_header(line: &[u8]) -> bool {
    line.starts_with(b"=ybegin")
}

/// Check for a `=yend` trailer line
pub fn is_trailer(line: &[u8]) -> bool {
    line.starts_with(b"=yend")
}

/// Check for a `=ypart` line
pub fn is_part(line: &[u8]) -> bool {
    line.starts_with(b"=ypart")
}

/// Value of the first `key=value` token whose key is in `keys`
fn trailer_field<'a>(line: &'a [u8], keys: &[&str]) -> Option<&'a str> {
    let line = std::str::from_utf8(line).ok()?;
    line.split_whitespace().find_map(|token| {
        let (key, value) = token.split_once('=')?;
        keys.contains(&key).then_some(value)
    })
}

fn parse_crc(value: &str) -> Option<u32> {
    if value.len() != 8 {
        return None;
    }
    u32::from_str_radix(value, 16).ok()
}

/// Extract the expected CRC-32 from a `=yend` trailer
///
/// Accepts `crc32=` as well as the shorter `crc=` spelling; the value is
/// eight hex digits.
pub fn trailer_crc32(line: &[u8]) -> Option<u32> {
    trailer_field(line, &["crc32", "crc"]).and_then(parse_crc)
}

/// CRC-32 of this part alone (`pcrc32=`), present in multipart trailers
pub fn trailer_part_crc32(line: &[u8]) -> Option<u32> {
    trailer_field(line, &["pcrc32"]).and_then(parse_crc)
}

/// Decoded size announced by a `=yend` trailer
pub fn trailer_size(line: &[u8]) -> Option<u64> {
    trailer_field(line, &["size"])?.parse().ok()
}

/// Minimal encoder used only to produce fixtures
#[cfg(test)]
pub(crate) fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for &byte in data {
        let encoded = byte.wrapping_add(42);
        if matches!(encoded, 0x00 | 0x0A | 0x0D | b'=') {
            out.push(b'=');
            out.push(encoded.wrapping_add(64));
        } else {
            out.push(encoded);
        }
    }
    out
}

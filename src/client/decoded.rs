//! Article bodies with yEnc payloads decoded
//!
//! A binary post is a single yEnc part inside an ordinary article body:
//! `=ybegin`, an optional `=ypart`, encoded lines, then `=yend`. The
//! reader here strips that framing, hands out the decoded bytes line by
//! line and checks the trailer once the body ends. Joining parts of a
//! multipart file is left to the caller.

use super::ResponseStream;
use crate::error::{NntpError, Result};
use crate::response::StatusReply;
use crate::yenc::{self, YencLineDecoder};
use std::fmt;
use tracing::{debug, trace, warn};

/// Whether to treat a body as yEnc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyDecoding {
    /// yEnc if the first non-empty line starts with `=y`, text otherwise
    #[default]
    Auto,
    /// Always yEnc; `=y` lines are framing, every other line is data
    Yenc,
    /// Never decode
    Text,
}

/// Decided once the first non-empty line is seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detected {
    Pending,
    Yenc,
    Text,
}

/// Article body yielding decoded bytes
///
/// Text bodies come out one line at a time with their CRLF restored, so
/// concatenating the chunks rebuilds the body. yEnc bodies come out as the
/// decoded bytes of each data line.
#[must_use = "an unread body is drained before the next command"]
pub struct DecodedBody<'a> {
    stream: ResponseStream<'a>,
    detected: Detected,
    /// Empty lines seen while still `Pending`
    blank_lines: usize,
    decoder: YencLineDecoder,
    header_seen: bool,
    multipart: bool,
    trailer: Option<Vec<u8>>,
}

impl<'a> DecodedBody<'a> {
    pub(super) fn new(stream: ResponseStream<'a>, decoding: BodyDecoding) -> Self {
        let detected = match decoding {
            BodyDecoding::Auto => Detected::Pending,
            BodyDecoding::Yenc => Detected::Yenc,
            BodyDecoding::Text => Detected::Text,
        };
        Self {
            stream,
            detected,
            blank_lines: 0,
            decoder: YencLineDecoder::new(),
            header_seen: false,
            multipart: false,
            trailer: None,
        }
    }

    /// Status line that opened this body
    pub fn status(&self) -> &StatusReply {
        self.stream.status()
    }

    /// Whether the body turned out to be yEnc
    ///
    /// `false` until the first non-empty line has been read in
    /// [`BodyDecoding::Auto`] mode.
    pub fn is_yenc(&self) -> bool {
        self.detected == Detected::Yenc
    }

    /// Next chunk of decoded bytes, or `None` at the end of the body
    ///
    /// At the end of a yEnc body the trailer is checked: a CRC or size that
    /// does not match the decoded bytes is a
    /// [`NntpError::DecompressionError`]. The connection stays usable.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            let Some(line) = self.stream.next_bytes().await? else {
                if self.detected == Detected::Pending && self.blank_lines > 0 {
                    self.detected = Detected::Text;
                    return Ok(Some(b"\r\n".repeat(std::mem::take(&mut self.blank_lines))));
                }
                return self.finish().map(|()| None);
            };

            match self.detected {
                Detected::Pending if line.is_empty() => self.blank_lines += 1,
                Detected::Pending if line.starts_with(b"=y") => {
                    trace!("yEnc body detected");
                    self.detected = Detected::Yenc;
                    if self.blank_lines > 0 {
                        debug!("Dropping {} empty lines before yEnc header", self.blank_lines);
                    }
                    self.blank_lines = 0;
                    self.framing_line(&line);
                }
                Detected::Pending => {
                    self.detected = Detected::Text;
                    let mut chunk = b"\r\n".repeat(std::mem::take(&mut self.blank_lines));
                    chunk.extend_from_slice(&line);
                    chunk.extend_from_slice(b"\r\n");
                    return Ok(Some(chunk));
                }
                Detected::Text => {
                    let mut chunk = line;
                    chunk.extend_from_slice(b"\r\n");
                    return Ok(Some(chunk));
                }
                Detected::Yenc if line.starts_with(b"=y") => self.framing_line(&line),
                Detected::Yenc => {
                    let mut chunk = Vec::with_capacity(line.len());
                    self.decoder.decode_line(&line, &mut chunk);
                    if !chunk.is_empty() {
                        return Ok(Some(chunk));
                    }
                }
            }
        }
    }

    /// Read the whole body into one buffer
    pub async fn collect_bytes(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Discard the rest of the body without checking it
    pub async fn drain(&mut self) -> Result<()> {
        self.stream.drain().await
    }

    fn framing_line(&mut self, line: &[u8]) {
        if yenc::is_header(line) {
            self.header_seen = true;
        } else if yenc::is_part(line) {
            self.multipart = true;
        } else if yenc::is_trailer(line) {
            self.trailer = Some(line.to_vec());
        } else {
            warn!(
                "Ignoring unknown yEnc line: {}",
                String::from_utf8_lossy(line)
            );
        }
    }

    /// Check the trailer against what was decoded
    fn finish(&self) -> Result<()> {
        if self.detected != Detected::Yenc {
            return Ok(());
        }
        if !self.header_seen {
            return Err(NntpError::DecompressionError("missing yEnc header".to_string()));
        }
        let trailer = self
            .trailer
            .as_deref()
            .ok_or_else(|| NntpError::DecompressionError("missing yEnc trailer".to_string()))?;

        let decoded_len = self.decoder.decoded_len();
        if let Some(size) = yenc::trailer_size(trailer)
            && size != decoded_len
        {
            return Err(NntpError::DecompressionError(format!(
                "yEnc size mismatch: expected {}, got {}",
                size, decoded_len
            )));
        }

        // A part trailer's crc32 covers the whole file, not these bytes
        let expected = match yenc::trailer_part_crc32(trailer) {
            Some(crc) => Some(crc),
            None if self.multipart => None,
            None => yenc::trailer_crc32(trailer),
        };
        if let Some(expected) = expected {
            let actual = self.decoder.crc32();
            if expected != actual {
                return Err(NntpError::DecompressionError(format!(
                    "yEnc CRC mismatch: expected {:08x}, got {:08x}",
                    expected, actual
                )));
            }
        }

        trace!("yEnc body verified ({} bytes)", decoded_len);
        Ok(())
    }
}

impl fmt::Debug for DecodedBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedBody")
            .field("stream", &self.stream)
            .field("detected", &self.detected)
            .field("decoded_len", &self.decoder.decoded_len())
            .finish_non_exhaustive()
    }
}

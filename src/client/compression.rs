//! Streaming decompression of multiline bodies
//!
//! A body decoder is chosen once per response. Plain bodies go straight
//! through the line framer. Gzip bodies (XFEATURE COMPRESS GZIP) are a zlib
//! or gzip-framed block, told apart by its first two bytes and read raw off
//! the transport in chunks. XZVER/XZHDR bodies are
//! dot-framed yEnc lines wrapping a raw deflate stream. Neither compressed
//! form is ever held in memory as a whole: inflated output is buffered only
//! until it can be split into lines.

use super::io::{read_body_line, unstuff, BodyLine, MAX_LINE_LENGTH};
use super::state::CompressionMode;
use super::NntpClient;
use crate::commands;
use crate::error::{NntpError, Result};
use crate::yenc::{self, YencLineDecoder};
use crc32fast::Hasher;
use flate2::{Decompress, FlushDecompress, Status};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace, warn};

/// Output space reserved before each inflate call
const INFLATE_CHUNK: usize = 64 * 1024;

/// First two bytes of a gzip member (RFC 1952)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Fixed part of a gzip header
const GZIP_HEADER_LEN: usize = 10;
/// CRC-32 and ISIZE after the deflate data
const GZIP_TRAILER_LEN: usize = 8;

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;
const FRESERVED: u8 = 0xe0;

/// How the body of one response is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BodyEncoding {
    /// Dot-framed text
    Plain,
    /// A zlib or gzip block in place of the dot-framed text
    Gzip,
    /// Dot-framed yEnc lines carrying raw deflate
    YencDeflate,
}

/// Compressed vs decompressed byte totals for a connection
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct ByteCounters {
    compressed: u64,
    decompressed: u64,
}

impl ByteCounters {
    fn record(&mut self, consumed: usize, produced: usize) {
        self.compressed += consumed as u64;
        self.decompressed += produced as u64;
    }
}

/// Decoder for the body of the current multiline response
pub(super) enum BodyReader {
    Plain,
    Gzip(GzipBody),
    YencDeflate(YencBody),
}

impl BodyReader {
    pub(super) fn new(encoding: BodyEncoding) -> Self {
        match encoding {
            BodyEncoding::Plain => BodyReader::Plain,
            BodyEncoding::Gzip => BodyReader::Gzip(GzipBody::new()),
            BodyEncoding::YencDeflate => BodyReader::YencDeflate(YencBody::new()),
        }
    }

    /// Next decoded body line, or `None` once the body is complete
    pub(super) async fn next_line<R>(
        &mut self,
        reader: &mut R,
        counters: &mut ByteCounters,
    ) -> Result<Option<Vec<u8>>>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        match self {
            BodyReader::Plain => match read_body_line(reader).await? {
                BodyLine::Data(line) => Ok(Some(line)),
                BodyLine::End => Ok(None),
            },
            BodyReader::Gzip(body) => body.next_line(reader, counters).await,
            BodyReader::YencDeflate(body) => body.next_line(reader, counters).await,
        }
    }
}

/// Inflated bytes waiting to be split into lines
#[derive(Default)]
struct LineBuffer {
    data: Vec<u8>,
    start: usize,
}

impl LineBuffer {
    /// Split off the next complete line, terminator removed
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let offset = self.data[self.start..].iter().position(|&b| b == b'\n')?;
        let end = self.start + offset;
        let mut line = self.data[self.start..end].to_vec();
        self.start = end + 1;
        if line.ends_with(b"\r") {
            line.pop();
        }
        Some(line)
    }

    /// Whatever is left once no more input will arrive
    fn take_rest(&mut self) -> Option<Vec<u8>> {
        let rest = (self.start < self.data.len()).then(|| self.data[self.start..].to_vec());
        self.clear();
        rest
    }

    fn unread(&self) -> usize {
        self.data.len() - self.start
    }

    fn clear(&mut self) {
        self.data.clear();
        self.start = 0;
    }

    /// Output vector for the inflater, with consumed lines dropped
    fn output(&mut self) -> &mut Vec<u8> {
        if self.start > 0 {
            self.data.drain(..self.start);
            self.start = 0;
        }
        &mut self.data
    }
}

fn decompression_error(message: &str) -> NntpError {
    NntpError::DecompressionError(message.to_string())
}

fn check_line_length(buffer: &LineBuffer) -> Result<()> {
    if buffer.unread() > MAX_LINE_LENGTH {
        return Err(NntpError::ProtocolViolation(format!(
            "decompressed line exceeds {} bytes",
            MAX_LINE_LENGTH
        )));
    }
    Ok(())
}

/// Length of the gzip header at the start of `buf`
///
/// `buf` starts with [`GZIP_MAGIC`]. Returns `None` while the header is
/// still incomplete.
fn gzip_header_len(buf: &[u8]) -> Result<Option<usize>> {
    if buf.len() < GZIP_HEADER_LEN {
        return Ok(None);
    }
    if buf[2] != 8 {
        return Err(decompression_error("unsupported gzip compression method"));
    }
    let flags = buf[3];
    if flags & FRESERVED != 0 {
        return Err(decompression_error("reserved gzip header flags set"));
    }

    let mut len = GZIP_HEADER_LEN;
    if flags & FEXTRA != 0 {
        let Some(xlen) = buf.get(len..len + 2) else {
            return Ok(None);
        };
        len += 2 + u16::from_le_bytes([xlen[0], xlen[1]]) as usize;
    }
    for field in [FNAME, FCOMMENT] {
        if flags & field == 0 {
            continue;
        }
        // Zero-terminated string
        match buf.get(len..).and_then(|rest| rest.iter().position(|&b| b == 0)) {
            Some(nul) => len += nul + 1,
            None => return Ok(None),
        }
    }
    if flags & FHCRC != 0 {
        len += 2;
    }
    Ok((len <= buf.len()).then_some(len))
}

/// Feed `input` to the inflater once
///
/// Returns bytes consumed, bytes produced and whether the stream ended.
fn inflate(
    inflater: &mut Decompress,
    input: &[u8],
    out: &mut Vec<u8>,
) -> Result<(usize, usize, bool)> {
    out.reserve(INFLATE_CHUNK);
    let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
    let status = inflater
        .decompress_vec(input, out, FlushDecompress::None)
        .map_err(|e| NntpError::DecompressionError(e.to_string()))?;
    let consumed = (inflater.total_in() - in_before) as usize;
    let produced = (inflater.total_out() - out_before) as usize;
    Ok((consumed, produced, matches!(status, Status::StreamEnd)))
}

/// Framing of a compressed block, known after its first bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// Not enough bytes seen yet
    Detect,
    /// RFC 1950 header and Adler-32, checked by the inflater
    Zlib,
    /// RFC 1952 member: header skipped, raw deflate, CRC-32 and size trailer
    Gzip,
    /// Deflate data done, reading the gzip trailer
    Trailer,
}

/// Compressed body (XFEATURE COMPRESS GZIP)
///
/// The inner payload is the plain body: CRLF lines, dot-stuffed. With the
/// TERMINATOR variant the "." line is part of the compressed data;
/// otherwise the outer "." line follows the block on the wire. Servers send
/// either a zlib stream or a gzip member; nothing past the end of the block
/// is consumed from the transport.
pub(super) struct GzipBody {
    framing: Framing,
    inflater: Decompress,
    /// Header bytes consumed before the framing was known
    prefix: Vec<u8>,
    trailer: Vec<u8>,
    crc: Hasher,
    lines: LineBuffer,
    stream_done: bool,
    finished: bool,
}

impl GzipBody {
    fn new() -> Self {
        Self {
            framing: Framing::Detect,
            inflater: Decompress::new(true),
            prefix: Vec::new(),
            trailer: Vec::new(),
            crc: Hasher::new(),
            lines: LineBuffer::default(),
            stream_done: false,
            finished: false,
        }
    }

    async fn next_line<R>(
        &mut self,
        reader: &mut R,
        counters: &mut ByteCounters,
    ) -> Result<Option<Vec<u8>>>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        loop {
            if let Some(line) = self.lines.take_line() {
                if line == b"." {
                    self.finish_stream(reader, counters).await?;
                    return Ok(None);
                }
                return Ok(Some(unstuff(line)));
            }

            if self.finished {
                return Ok(self.lines.take_rest().map(unstuff));
            }

            if self.stream_done {
                // No inner terminator: the outer one must follow the block
                self.finished = true;
                if let BodyLine::Data(_) = read_body_line(reader).await? {
                    return Err(decompression_error("data after compressed block"));
                }
                if self.lines.unread() > 0 {
                    warn!("Compressed body did not end with a line terminator");
                }
                continue;
            }

            check_line_length(&self.lines)?;
            self.advance(reader, counters).await?;
        }
    }

    /// Move the block forward by whatever the transport has buffered
    async fn advance<R>(&mut self, reader: &mut R, counters: &mut ByteCounters) -> Result<()>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        let input = reader.fill_buf().await?;
        if input.is_empty() {
            return Err(decompression_error("connection closed inside compressed data"));
        }

        let taken = match self.framing {
            Framing::Detect => self.detect(input, counters)?,
            Framing::Zlib | Framing::Gzip => self.inflate_chunk(input, counters)?,
            Framing::Trailer => self.read_trailer(input, counters)?,
        };
        reader.consume(taken);
        Ok(())
    }

    /// Pick zlib or gzip from the magic bytes, skipping a gzip header
    ///
    /// Returns how much of `input` was used. Only header bytes are taken; a
    /// zlib stream is left in place for the inflater.
    fn detect(&mut self, input: &[u8], counters: &mut ByteCounters) -> Result<usize> {
        let mut seen = self.prefix.clone();
        seen.extend_from_slice(input);

        if seen.len() < GZIP_MAGIC.len() {
            self.prefix.extend_from_slice(input);
            counters.record(input.len(), 0);
            return Ok(input.len());
        }

        if seen[..2] != GZIP_MAGIC {
            trace!("Compressed block is zlib framed");
            self.framing = Framing::Zlib;
            let prefix = std::mem::take(&mut self.prefix);
            self.inflate_prefix(&prefix, counters)?;
            return Ok(0);
        }

        match gzip_header_len(&seen)? {
            Some(len) => {
                let taken = len - self.prefix.len();
                counters.record(taken, 0);
                trace!("Compressed block is gzip framed ({} byte header)", len);
                self.prefix.clear();
                self.inflater = Decompress::new(false);
                self.framing = Framing::Gzip;
                Ok(taken)
            }
            None => {
                self.prefix.extend_from_slice(input);
                counters.record(input.len(), 0);
                Ok(input.len())
            }
        }
    }

    /// Feed zlib header bytes that were taken during detection
    fn inflate_prefix(&mut self, mut prefix: &[u8], counters: &mut ByteCounters) -> Result<()> {
        while !prefix.is_empty() {
            let (consumed, produced, end) =
                inflate(&mut self.inflater, prefix, self.lines.output())?;
            // Counted as compressed when taken
            counters.record(0, produced);
            prefix = &prefix[consumed..];
            if end {
                self.stream_done = true;
                return Ok(());
            }
            if consumed == 0 && produced == 0 {
                return Err(decompression_error("inflater made no progress"));
            }
        }
        Ok(())
    }

    /// Inflate from `input`, returning how much of it was used
    fn inflate_chunk(&mut self, input: &[u8], counters: &mut ByteCounters) -> Result<usize> {
        let (consumed, produced, end) = inflate(&mut self.inflater, input, self.lines.output())?;
        counters.record(consumed, produced);
        trace!("Inflated {} bytes to {} bytes ({:?})", consumed, produced, self.framing);

        if self.framing == Framing::Gzip {
            let output = &self.lines.data;
            self.crc.update(&output[output.len() - produced..]);
        }

        if end {
            if self.framing == Framing::Gzip {
                self.framing = Framing::Trailer;
            } else {
                self.stream_done = true;
            }
        } else if consumed == 0 && produced == 0 {
            return Err(decompression_error("inflater made no progress"));
        }
        Ok(consumed)
    }

    /// Collect the gzip trailer and check it against the inflated data
    fn read_trailer(&mut self, input: &[u8], counters: &mut ByteCounters) -> Result<usize> {
        let taken = input.len().min(GZIP_TRAILER_LEN - self.trailer.len());
        self.trailer.extend_from_slice(&input[..taken]);
        counters.record(taken, 0);

        if self.trailer.len() < GZIP_TRAILER_LEN {
            return Ok(taken);
        }

        let field = |at: usize| {
            u32::from_le_bytes([
                self.trailer[at],
                self.trailer[at + 1],
                self.trailer[at + 2],
                self.trailer[at + 3],
            ])
        };
        let (expected_crc, expected_size) = (field(0), field(4));

        let actual_crc = self.crc.clone().finalize();
        if expected_crc != actual_crc {
            return Err(NntpError::DecompressionError(format!(
                "gzip CRC mismatch: expected {:08x}, got {:08x}",
                expected_crc, actual_crc
            )));
        }
        // ISIZE is the inflated length modulo 2^32
        if expected_size != self.inflater.total_out() as u32 {
            return Err(decompression_error("gzip size mismatch"));
        }
        self.stream_done = true;
        Ok(taken)
    }

    /// Consume the rest of the block after the inner terminator
    async fn finish_stream<R>(&mut self, reader: &mut R, counters: &mut ByteCounters) -> Result<()>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        while !self.stream_done {
            self.lines.clear();
            self.advance(reader, counters).await?;
        }
        if self.lines.unread() > 0 {
            warn!(
                "Discarding {} bytes after the compressed terminator",
                self.lines.unread()
            );
        }
        self.lines.clear();
        self.finished = true;
        Ok(())
    }
}

/// yEnc-wrapped raw deflate body (XZVER/XZHDR)
///
/// The outer framing is ordinary dot-framed text. Inner lines are the
/// uncompressed XOVER/XHDR output and are neither unstuffed nor checked for
/// a terminator.
pub(super) struct YencBody {
    inflater: Decompress,
    yenc: YencLineDecoder,
    lines: LineBuffer,
    decoded: Vec<u8>,
    header_seen: bool,
    trailer: Option<Vec<u8>>,
    stream_done: bool,
    finished: bool,
}

impl YencBody {
    fn new() -> Self {
        Self {
            inflater: Decompress::new(false),
            yenc: YencLineDecoder::new(),
            lines: LineBuffer::default(),
            decoded: Vec::new(),
            header_seen: false,
            trailer: None,
            stream_done: false,
            finished: false,
        }
    }

    async fn next_line<R>(
        &mut self,
        reader: &mut R,
        counters: &mut ByteCounters,
    ) -> Result<Option<Vec<u8>>>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        loop {
            if let Some(line) = self.lines.take_line() {
                return Ok(Some(line));
            }

            if self.finished {
                return Ok(self.lines.take_rest());
            }

            check_line_length(&self.lines)?;

            let line = match read_body_line(reader).await {
                Ok(line) => line,
                Err(NntpError::TruncatedResponse) if self.trailer.is_none() => {
                    return Err(decompression_error("connection closed inside compressed data"));
                }
                Err(e) => return Err(e),
            };

            match line {
                BodyLine::Data(line) => self.accept(&line, counters)?,
                BodyLine::End => {
                    self.finished = true;
                    self.verify()?;
                }
            }
        }
    }

    /// Handle one outer line: header, data or trailer
    fn accept(&mut self, line: &[u8], counters: &mut ByteCounters) -> Result<()> {
        if !self.header_seen {
            if !yenc::is_header(line) {
                return Err(decompression_error("bad yEnc header"));
            }
            self.header_seen = true;
            return Ok(());
        }

        if yenc::is_trailer(line) {
            self.trailer = Some(line.to_vec());
            return Ok(());
        }

        if self.trailer.is_some() {
            return Err(decompression_error("data after yEnc trailer"));
        }

        let mut decoded = std::mem::take(&mut self.decoded);
        decoded.clear();
        self.yenc.decode_line(line, &mut decoded);
        let result = self.feed(&decoded, counters);
        self.decoded = decoded;
        result
    }

    fn feed(&mut self, mut input: &[u8], counters: &mut ByteCounters) -> Result<()> {
        while !input.is_empty() {
            if self.stream_done {
                return Err(decompression_error("data after end of deflate stream"));
            }

            let (consumed, produced, end) =
                inflate(&mut self.inflater, input, self.lines.output())?;
            counters.record(consumed, produced);
            input = &input[consumed..];

            if end {
                self.stream_done = true;
            } else if consumed == 0 && produced == 0 {
                return Err(decompression_error("inflater made no progress"));
            }
        }
        Ok(())
    }

    /// Check header, trailer and CRC once the outer terminator arrived
    fn verify(&self) -> Result<()> {
        if !self.header_seen {
            return Err(decompression_error("missing yEnc header"));
        }
        let trailer = self
            .trailer
            .as_deref()
            .ok_or_else(|| decompression_error("missing yEnc trailer"))?;
        let expected =
            yenc::trailer_crc32(trailer).ok_or_else(|| decompression_error("bad yEnc trailer"))?;

        let actual = self.yenc.crc32();
        if expected != actual {
            return Err(NntpError::DecompressionError(format!(
                "yEnc CRC mismatch: expected {:08x}, got {:08x}",
                expected, actual
            )));
        }
        if !self.stream_done {
            return Err(decompression_error("deflate stream ended early"));
        }

        trace!("yEnc body verified ({} bytes)", self.yenc.decoded_len());
        Ok(())
    }
}

impl NntpClient {
    /// Enable XFEATURE COMPRESS GZIP
    ///
    /// With `terminator` the server places the "." line inside the
    /// compressed block. Returns `true` if the server accepted; a rejection
    /// is not an error and leaves the connection uncompressed.
    pub async fn enable_compression(&mut self, terminator: bool) -> Result<bool> {
        debug!("Attempting XFEATURE COMPRESS GZIP");
        let result = self
            .execute(&commands::xfeature_compress_gzip(terminator))
            .await
            .map(|_| ());
        match result {
            Ok(()) => Ok(self.is_compression_enabled()),
            Err(NntpError::CommandRejected { code, .. }) => {
                debug!(
                    "XFEATURE COMPRESS GZIP not supported (code {}), continuing without compression",
                    code
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Get bandwidth statistics (compressed vs decompressed bytes)
    ///
    /// Returns `(bytes_compressed, bytes_decompressed)`.
    /// Returns `(0, 0)` if no compressed body has been read.
    pub fn get_bandwidth_stats(&self) -> (u64, u64) {
        (self.bandwidth.compressed, self.bandwidth.decompressed)
    }

    /// Check if compression is enabled
    pub fn is_compression_enabled(&self) -> bool {
        self.compression_mode != CompressionMode::None
    }
}

//! Low-level I/O for NNTP protocol communication
//!
//! This module provides the line framer every other layer is built on:
//! - Command transmission with logging
//! - Bounded line reads with CRLF (or bare LF) stripping
//! - Status-line reads with a timeout
//! - Multiline body framing: terminator detection and dot-unstuffing
//! - The stuffing mirror used when uploading

use super::NntpClient;
use crate::commands::Request;
use crate::error::{NntpError, Result};
use crate::response::StatusReply;
use std::borrow::Cow;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

/// Default timeout for reading a status line
pub const SINGLE_LINE_TIMEOUT: Duration = Duration::from_secs(60);
/// Default timeout for each read step of a multiline body
pub const MULTILINE_TIMEOUT: Duration = Duration::from_secs(180);
/// Longest line accepted from the server, terminator excluded
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// One framed line of a multiline body
#[derive(Debug, PartialEq, Eq)]
pub(super) enum BodyLine {
    /// A data line with its terminator and stuffing removed
    Data(Vec<u8>),
    /// The terminating "." line
    End,
}

/// Read one line into `buf`, stripping the CRLF or bare LF terminator.
///
/// Returns `false` if the transport ended before a terminator; `buf` then
/// holds whatever partial line was received. A line longer than
/// [`MAX_LINE_LENGTH`] is a protocol violation.
pub(super) async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    // Room for the longest line plus CRLF
    let limit = (MAX_LINE_LENGTH + 2) as u64;
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;

    if !buf.ends_with(b"\n") {
        if n as u64 == limit {
            return Err(NntpError::ProtocolViolation(format!(
                "line exceeds {} bytes",
                MAX_LINE_LENGTH
            )));
        }
        return Ok(false);
    }

    buf.pop();
    if buf.ends_with(b"\r") {
        buf.pop();
    }
    Ok(true)
}

/// Read one line of a multiline body
///
/// The lone "." terminator is reported as [`BodyLine::End`]; any other line
/// starting with "." loses that dot. The transport ending first is a
/// [`NntpError::TruncatedResponse`].
pub(super) async fn read_body_line<R>(reader: &mut R) -> Result<BodyLine>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = Vec::with_capacity(128);
    if !read_line(reader, &mut line).await? {
        return Err(NntpError::TruncatedResponse);
    }

    if line == b"." {
        return Ok(BodyLine::End);
    }

    Ok(BodyLine::Data(unstuff(line)))
}

/// [`unstuff_line`] on an owned line
pub(super) fn unstuff(mut line: Vec<u8>) -> Vec<u8> {
    let stuffed = line.len() - unstuff_line(&line).len();
    line.drain(..stuffed);
    line
}

/// Remove the dot a sender doubled at the start of a body line.
///
/// Never applied to the terminator itself: a lone "." is returned as is.
///
/// # Examples
///
/// ```
/// # use nntp_stream::unstuff_line;
/// assert_eq!(unstuff_line(b"..hidden"), b".hidden");
/// assert_eq!(unstuff_line(b".x"), b"x");
/// assert_eq!(unstuff_line(b"plain"), b"plain");
/// ```
pub fn unstuff_line(line: &[u8]) -> &[u8] {
    if line.len() > 1 && line[0] == b'.' {
        &line[1..]
    } else {
        line
    }
}

/// Double a leading dot so the line can never read as the terminator.
///
/// # Examples
///
/// ```
/// # use nntp_stream::stuff_line;
/// assert_eq!(stuff_line(".signature"), "..signature");
/// assert_eq!(stuff_line("."), "..");
/// assert_eq!(stuff_line("text"), "text");
/// ```
pub fn stuff_line(line: &str) -> Cow<'_, str> {
    if line.starts_with('.') {
        Cow::Owned(format!(".{}", line))
    } else {
        Cow::Borrowed(line)
    }
}

impl NntpClient {
    /// Send a command to the server
    pub(super) async fn send_command(&mut self, request: &Request) -> Result<()> {
        trace!("Sending command: {}", request);
        self.send_raw(request.to_wire().as_bytes()).await
    }

    /// Write bytes to the transport and flush
    pub(super) async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.get_mut().write_all(bytes).await?;
        self.stream.get_mut().flush().await?;
        Ok(())
    }

    /// Read one status line
    ///
    /// No unstuffing and no terminator detection happen in this mode.
    /// Bounded by the configured status timeout.
    pub(super) async fn read_status(&mut self) -> Result<StatusReply> {
        let limit = self.config.status_timeout;
        let read_future = async {
            let mut line = Vec::with_capacity(512);
            let terminated = read_line(&mut self.stream, &mut line).await?;

            if !terminated && line.is_empty() {
                return Err(NntpError::ConnectionClosed);
            }

            // Convert to string with lossy UTF-8 conversion
            let line = String::from_utf8_lossy(&line);
            trace!("Received: {}", line);
            StatusReply::parse(&line)
        };

        timeout(limit, read_future)
            .await
            .map_err(|_| NntpError::Timeout)?
    }
}

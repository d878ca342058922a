//! Lazy multiline response streams
//!
//! A [`ResponseStream`] hands out the lines of one multiline reply as they
//! arrive. It borrows the client mutably, so no other command can be sent
//! while it is alive. Dropping it early is allowed: the undrained body stays
//! with the client and is discarded before the next command goes out.

use super::NntpClient;
use crate::error::{NntpError, Result};
use crate::response::StatusReply;
use std::fmt;
use tokio::time::timeout;
use tracing::debug;

/// Lines of one multiline reply, read on demand
#[must_use = "an unread body is drained before the next command"]
pub struct ResponseStream<'a> {
    client: &'a mut NntpClient,
    status: StatusReply,
    exhausted: bool,
}

impl<'a> ResponseStream<'a> {
    pub(super) fn new(client: &'a mut NntpClient, status: StatusReply) -> Self {
        Self {
            client,
            status,
            exhausted: false,
        }
    }

    /// Status line that opened this body
    pub fn status(&self) -> &StatusReply {
        &self.status
    }

    /// Whether the terminator has been read
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Next line as raw bytes, unstuffed and without its terminator
    ///
    /// Returns `None` at the end of the body, and on every call after that.
    pub async fn next_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        if self.exhausted {
            return Ok(None);
        }

        let result = self.client.read_body_line().await;
        if !matches!(result, Ok(Some(_))) {
            self.exhausted = true;
        }
        result
    }

    /// Next line decoded as UTF-8 (invalid sequences are replaced)
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self
            .next_bytes()
            .await?
            .map(|line| String::from_utf8_lossy(&line).into_owned()))
    }

    /// Discard the rest of the body
    ///
    /// A no-op once the terminator has been read. Framing and decompression
    /// errors in the discarded part are returned, not swallowed; after such
    /// an error every further call fails with
    /// [`NntpError::ConnectionCorrupted`].
    pub async fn drain(&mut self) -> Result<()> {
        if self.client.is_broken() {
            return Err(NntpError::ConnectionCorrupted(
                "body ended in an error; connection is broken".to_string(),
            ));
        }

        let mut discarded = 0u64;
        while self.next_bytes().await?.is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("Drained {} unread lines", discarded);
        }
        Ok(())
    }

    /// Read every remaining line into memory
    ///
    /// Meant for bodies known to be small (CAPABILITIES, HELP, a single
    /// article).
    pub async fn collect_lines(mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }
}

impl fmt::Debug for ResponseStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("status", &self.status)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

/// Typed records parsed lazily from a multiline reply
///
/// A line that does not match the record grammar yields
/// [`NntpError::InvalidResponse`]; the stream itself stays usable and the
/// next call moves on to the following line.
#[must_use = "an unread body is drained before the next command"]
pub struct Records<'a, T> {
    stream: ResponseStream<'a>,
    parse: fn(&str) -> Result<T>,
}

impl<'a, T> Records<'a, T> {
    pub(super) fn new(stream: ResponseStream<'a>, parse: fn(&str) -> Result<T>) -> Self {
        Self { stream, parse }
    }

    /// Status line that opened this body
    pub fn status(&self) -> &StatusReply {
        self.stream.status()
    }

    /// Whether the terminator has been read
    pub fn is_exhausted(&self) -> bool {
        self.stream.is_exhausted()
    }

    /// Next parsed record, or `None` at the end of the body
    pub async fn next_record(&mut self) -> Result<Option<T>> {
        match self.stream.next_line().await? {
            Some(line) => (self.parse)(&line).map(Some),
            None => Ok(None),
        }
    }

    /// Discard the remaining records
    pub async fn drain(&mut self) -> Result<()> {
        self.stream.drain().await
    }

    /// Parse every remaining record into a vector
    pub async fn collect(mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// Unparsed view of the same body
    pub fn into_inner(self) -> ResponseStream<'a> {
        self.stream
    }
}

impl<T> fmt::Debug for Records<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

impl NntpClient {
    /// Read the next line of the live body
    ///
    /// The body is released once its terminator has been read. Any error,
    /// including a timeout, leaves the transport at an unknown position, so
    /// the connection is marked broken.
    pub(super) async fn read_body_line(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(body) = self.body.as_mut() else {
            return Ok(None);
        };

        let limit = self.config.body_timeout;
        let step = body.next_line(&mut self.stream, &mut self.bandwidth);
        match timeout(limit, step).await {
            Ok(Ok(Some(line))) => Ok(Some(line)),
            Ok(Ok(None)) => {
                self.body = None;
                Ok(None)
            }
            Ok(Err(e)) => {
                self.mark_broken();
                Err(e)
            }
            Err(_) => {
                self.mark_broken();
                Err(NntpError::Timeout)
            }
        }
    }

    /// Discard an abandoned body before the next command
    pub(super) async fn drain_body(&mut self) -> Result<()> {
        let mut discarded = 0u64;
        loop {
            match self.read_body_line().await {
                Ok(Some(_)) => discarded += 1,
                Ok(None) => break,
                Err(e) => {
                    return Err(NntpError::ConnectionCorrupted(format!(
                        "failed to drain previous response: {}",
                        e
                    )));
                }
            }
        }
        debug!("Drained {} lines of an abandoned response", discarded);
        Ok(())
    }
}

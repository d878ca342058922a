//! NNTP client: transport ownership, command dispatch and response streaming

mod articles;
mod auth;
mod command;
mod compression;
mod connection;
mod decoded;
mod group_ops;
mod io;
mod listing;
mod metadata;
mod posting;
mod server;
mod state;
mod stream;

pub use articles::Headers;
pub use command::Outcome;
pub use decoded::{BodyDecoding, DecodedBody};
pub use io::{stuff_line, unstuff_line, MAX_LINE_LENGTH, MULTILINE_TIMEOUT, SINGLE_LINE_TIMEOUT};
pub use stream::{Records, ResponseStream};

use crate::config::ServerConfig;
use compression::{BodyReader, ByteCounters};
use state::{CompressionMode, ConnectionState};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::debug;

/// Byte transport an [`NntpClient`] can run on
///
/// Implemented for every `AsyncRead + AsyncWrite + Send + Unpin` type:
/// TCP and TLS streams, in-memory duplex pipes, test doubles.
pub trait NntpIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> NntpIo for T {}

/// Async NNTP client for a single connection
///
/// One command is in flight at a time. A multiline reply is handed out as a
/// [`ResponseStream`] that borrows the client; if the caller drops it before
/// the end, the next command drains the remainder first.
///
/// # Example
///
/// ```no_run
/// use nntp_stream::{NntpClient, ServerConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServerConfig::tls("news.example.com", "user", "pass");
/// let mut client = NntpClient::connect(Arc::new(config)).await?;
/// client.authenticate().await?;
///
/// let info = client.group("alt.test").await?;
/// let mut overview = client.xover(&format!("{}-{}", info.first, info.last)).await?;
/// while let Some(entry) = overview.next_record().await? {
///     println!("{} {}", entry.article_number, entry.subject);
/// }
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct NntpClient {
    /// Buffered transport (both reader and writer)
    stream: BufReader<Box<dyn NntpIo>>,
    /// Connection state
    state: ConnectionState,
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Whether the greeting allowed posting (200 vs 201)
    posting_allowed: bool,
    /// Currently selected newsgroup
    current_group: Option<String>,
    /// Compression mode for this connection
    compression_mode: CompressionMode,
    /// Reader of the multiline body that owns the next transport bytes
    body: Option<BodyReader>,
    /// Compressed vs decompressed byte totals
    bandwidth: ByteCounters,
    /// Whether framing was lost and the connection must be discarded
    is_broken: bool,
}

impl NntpClient {
    /// Check if this connection is broken and should be discarded
    pub fn is_broken(&self) -> bool {
        self.is_broken
    }

    /// Mark this connection as broken
    fn mark_broken(&mut self) {
        if !self.is_broken {
            debug!("Marking connection to {} as broken", self.config.host);
        }
        self.is_broken = true;
        self.body = None;
    }

    /// Get the currently selected newsgroup, if any
    pub fn current_group(&self) -> Option<&str> {
        self.current_group.as_deref()
    }

    /// Check if the client is currently authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ConnectionState::Authenticated)
    }

    /// Whether the server greeting allowed posting
    pub fn posting_allowed(&self) -> bool {
        self.posting_allowed
    }

    /// Whether a multiline body is still waiting to be read or drained
    pub fn has_pending_body(&self) -> bool {
        self.body.is_some()
    }

    /// Server configuration this client was created with
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for NntpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NntpClient")
            .field("host", &self.config.host)
            .field("state", &self.state)
            .field("current_group", &self.current_group)
            .field("compression_mode", &self.compression_mode)
            .field("pending_body", &self.body.is_some())
            .field("is_broken", &self.is_broken)
            .finish_non_exhaustive()
    }
}

impl Drop for NntpClient {
    fn drop(&mut self) {
        debug!("NntpClient dropped");
    }
}

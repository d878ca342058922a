//! NNTP error types

use thiserror::Error;

/// NNTP protocol, framing and connection errors
#[derive(Error, Debug)]
pub enum NntpError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS error during secure connection
    #[error("TLS error: {0}")]
    Tls(String),

    /// A read or connect did not complete in time
    #[error("Connection timeout")]
    Timeout,

    /// Malformed status line or a body/no-body mismatch.
    ///
    /// The byte stream can no longer be trusted to be framed correctly;
    /// the connection is marked broken.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// The transport ended before the multiline terminator was seen
    #[error("Truncated response: connection ended before the terminating line")]
    TruncatedResponse,

    /// A compressed body was corrupt or incomplete
    #[error("Decompression error: {0}")]
    DecompressionError(String),

    /// The server answered with a 4xx or 5xx status
    #[error("NNTP error {code}: {message}")]
    CommandRejected {
        /// NNTP response code (e.g., 411, 430, 502)
        code: u16,
        /// Error message from server
        message: String,
    },

    /// Framing could not be resynchronised; the connection must be discarded
    #[error("Connection corrupted: {0}")]
    ConnectionCorrupted(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// A response payload did not match its expected grammar
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An article to post contains a line that cannot be sent
    #[error("Invalid article: {0}")]
    InvalidArticle(String),

    /// Connection closed while waiting for a status line
    #[error("Connection closed")]
    ConnectionClosed,
}

impl NntpError {
    /// Reply code carried by a [`NntpError::CommandRejected`]
    pub fn code(&self) -> Option<u16> {
        match self {
            NntpError::CommandRejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 4xx rejection: the caller may retry later on the same connection
    pub fn is_temporary(&self) -> bool {
        matches!(self, NntpError::CommandRejected { code, .. } if (400..500).contains(code))
    }

    /// 5xx rejection: retrying the same command will not help
    pub fn is_permanent(&self) -> bool {
        matches!(self, NntpError::CommandRejected { code, .. } if (500..600).contains(code))
    }

    /// Whether the connection that produced this error must be discarded
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            NntpError::CommandRejected { .. }
                | NntpError::InvalidResponse(_)
                | NntpError::InvalidArticle(_)
                | NntpError::AuthFailed(_)
        )
    }
}

/// Result type alias using NntpError
pub type Result<T> = std::result::Result<T, NntpError>;

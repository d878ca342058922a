//! Connection state types for NNTP client

/// NNTP connection state tracking authentication progress
///
/// Tracks the authentication state of an NNTP connection according to RFC 4643.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ConnectionState {
    /// Connected and ready for commands (not authenticated)
    Ready,
    /// AUTHINFO USER sent, waiting for the PASS exchange to finish
    InProgress,
    /// Successfully authenticated
    Authenticated,
    /// QUIT sent; the server closes the connection
    Closed,
}

/// Compression negotiated on this connection
///
/// Read once per multiline response when the body decoder is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CompressionMode {
    /// No compression
    None,
    /// XFEATURE COMPRESS GZIP: designated multiline bodies arrive as a
    /// zlib block
    Gzip,
}

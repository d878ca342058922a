//! Connection settings for one NNTP server

use crate::client::{MULTILINE_TIMEOUT, SINGLE_LINE_TIMEOUT};
use std::time::Duration;

/// Well-known port for plain NNTP
pub const NNTP_PORT: u16 = 119;
/// Well-known port for NNTP over TLS
pub const NNTPS_PORT: u16 = 563;

/// Where to connect, how to secure the link, who to log in as and how long
/// to wait for the server
///
/// # Example
///
/// ```
/// use nntp_stream::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::tls("news.example.com", "user", "pass")
///     .with_port(443)
///     .with_body_timeout(Duration::from_secs(30));
/// assert!(config.tls);
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Server hostname or address literal
    pub host: String,

    /// TCP port; see [`NNTP_PORT`] and [`NNTPS_PORT`]
    pub port: u16,

    /// Wrap the TCP connection in TLS
    ///
    /// When `false` the session runs over plain TCP, whatever the port.
    #[cfg_attr(feature = "serde", serde(default = "default_tls"))]
    pub tls: bool,

    /// Skip certificate validation
    ///
    /// **Security Warning:** accepts any certificate the server presents,
    /// including self-signed, expired and mismatched ones. Only for test
    /// servers on a trusted network.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allow_insecure_tls: bool,

    /// AUTHINFO USER argument
    pub username: String,

    /// AUTHINFO PASS argument
    pub password: String,

    /// Longest wait for a status line
    #[cfg_attr(feature = "serde", serde(default = "default_status_timeout"))]
    pub status_timeout: Duration,

    /// Longest wait for each line of a multiline body
    ///
    /// Applies per line, not to the body as a whole, so large bodies on a
    /// slow link are fine as long as data keeps arriving.
    #[cfg_attr(feature = "serde", serde(default = "default_body_timeout"))]
    pub body_timeout: Duration,

    /// Log in on demand
    ///
    /// When a command is refused with 480 before [`authenticate`] was
    /// called, send AUTHINFO with the credentials above and repeat the
    /// command once.
    ///
    /// [`authenticate`]: crate::NntpClient::authenticate
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_authenticate: bool,
}

#[cfg(feature = "serde")]
fn default_tls() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_status_timeout() -> Duration {
    SINGLE_LINE_TIMEOUT
}

#[cfg(feature = "serde")]
fn default_body_timeout() -> Duration {
    MULTILINE_TIMEOUT
}

impl ServerConfig {
    /// Settings with the default timeouts
    pub fn new(
        host: impl Into<String>,
        port: u16,
        tls: bool,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            tls,
            allow_insecure_tls: false,
            username: username.into(),
            password: password.into(),
            status_timeout: SINGLE_LINE_TIMEOUT,
            body_timeout: MULTILINE_TIMEOUT,
            auto_authenticate: false,
        }
    }

    /// TLS on port 563
    pub fn tls(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(host, NNTPS_PORT, true, username, password)
    }

    /// Plain TCP on port 119
    ///
    /// **Warning:** AUTHINFO sends the password in clear text over such a
    /// connection.
    pub fn plain(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(host, NNTP_PORT, false, username, password)
    }

    /// TLS on port 563 without certificate validation
    ///
    /// ```
    /// use nntp_stream::ServerConfig;
    ///
    /// // Local test server with a self-signed certificate
    /// let config = ServerConfig::tls_insecure("localhost", "user", "pass");
    /// assert!(config.allow_insecure_tls);
    /// ```
    pub fn tls_insecure(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            allow_insecure_tls: true,
            ..Self::tls(host, username, password)
        }
    }

    /// Same settings on another port
    pub fn with_port(self, port: u16) -> Self {
        Self { port, ..self }
    }

    /// Same settings with another status-line timeout
    pub fn with_status_timeout(self, status_timeout: Duration) -> Self {
        Self {
            status_timeout,
            ..self
        }
    }

    /// Same settings with another per-line body timeout
    pub fn with_body_timeout(self, body_timeout: Duration) -> Self {
        Self {
            body_timeout,
            ..self
        }
    }

    /// Same settings with log-in-on-480 switched on or off
    pub fn with_auto_authenticate(self, auto_authenticate: bool) -> Self {
        Self {
            auto_authenticate,
            ..self
        }
    }
}

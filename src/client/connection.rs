//! Connection management for NNTP client
//!
//! This module handles TCP/TLS connection establishment, socket tuning,
//! and server greeting validation.

use crate::config::ServerConfig;
use crate::error::{NntpError, Result};
use crate::response::codes;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{CryptoProvider, ring};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{debug, warn};

use super::compression::ByteCounters;
use super::state::{CompressionMode, ConnectionState};
use super::{NntpClient, NntpIo};

/// TCP connection timeout in seconds
const TCP_CONNECT_TIMEOUT_SECS: u64 = 120;

/// TLS handshake timeout in seconds
const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 60;

/// BufReader capacity; large bodies stream through it in big reads
const BUFREADER_CAPACITY: usize = 256 * 1024;

/// Socket receive buffer requested from the OS
const RECV_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Socket send buffer requested from the OS
const SEND_BUFFER_SIZE: usize = 1024 * 1024;

/// Certificate verifier that accepts whatever the server presents
///
/// **Security Warning:** only used when `allow_insecure_tls` is set. The
/// connection is then open to man-in-the-middle attacks.
#[derive(Debug)]
struct AcceptAnyServerCert {
    schemes: Vec<SignatureScheme>,
}

impl AcceptAnyServerCert {
    fn new() -> Self {
        let schemes = ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes();
        Self { schemes }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

/// Resolve the configured host to the first socket address
fn resolve(config: &ServerConfig) -> Result<SocketAddr> {
    let addr = format!("{}:{}", config.host, config.port);
    addr.to_socket_addrs()
        .map_err(|e| {
            NntpError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Failed to resolve address: {}", e),
            ))
        })?
        .next()
        .ok_or_else(|| {
            NntpError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "No address resolved",
            ))
        })
}

/// Open a tuned TCP connection
///
/// Buffer sizes are a request; the OS may clamp them, which is only logged.
async fn open_tcp(socket_addr: SocketAddr) -> Result<TcpStream> {
    use socket2::{Domain, Protocol, Socket, Type};

    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Commands are small and latency bound
    socket.set_nodelay(true)?;

    if let Err(e) = socket.set_recv_buffer_size(RECV_BUFFER_SIZE) {
        warn!(
            "Failed to set receive buffer size to {} bytes: {}",
            RECV_BUFFER_SIZE, e
        );
    } else if let Ok(actual) = socket.recv_buffer_size() {
        debug!(
            "TCP receive buffer: requested {} bytes, actual {} bytes",
            RECV_BUFFER_SIZE, actual
        );
    }

    if let Err(e) = socket.set_send_buffer_size(SEND_BUFFER_SIZE) {
        warn!(
            "Failed to set send buffer size to {} bytes: {}",
            SEND_BUFFER_SIZE, e
        );
    }

    // socket2 connect blocks; switch to non-blocking only once connected
    let tcp_stream = timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        tokio::task::spawn_blocking(move || -> std::io::Result<std::net::TcpStream> {
            socket.connect(&socket_addr.into())?;
            socket.set_nonblocking(true)?;
            Ok(socket.into())
        }),
    )
    .await
    .map_err(|_| NntpError::Timeout)?
    .map_err(|e| NntpError::Io(std::io::Error::other(format!("Task join error: {}", e))))??;

    Ok(TcpStream::from_std(tcp_stream)?)
}

/// TLS client configuration for the server's certificate policy
fn tls_connector(config: &ServerConfig) -> TlsConnector {
    let _ = CryptoProvider::install_default(ring::default_provider());

    let tls_config = if config.allow_insecure_tls {
        warn!("TLS certificate validation disabled - connection vulnerable to MITM attacks");
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new()))
            .with_no_client_auth()
    } else {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    };

    TlsConnector::from(Arc::new(tls_config))
}

impl NntpClient {
    /// Connect to the configured NNTP server
    ///
    /// Uses TLS when `config.tls` is set, plain TCP otherwise. Does not
    /// authenticate - call [`authenticate`](Self::authenticate) after
    /// connecting.
    ///
    /// # Errors
    ///
    /// - [`NntpError::Io`] - TCP connection fails (DNS resolution, network unreachable, etc.)
    /// - [`NntpError::Tls`] - TLS handshake fails (invalid certificate, protocol error)
    /// - [`NntpError::Timeout`] - Connection or handshake times out
    /// - [`NntpError::CommandRejected`] - Server refuses service in its greeting
    pub async fn connect(config: Arc<ServerConfig>) -> Result<Self> {
        debug!("Connecting to NNTP server {}:{}", config.host, config.port);

        let socket_addr = resolve(&config)?;
        let tcp_stream = open_tcp(socket_addr).await?;

        if !config.tls {
            warn!("Plain connection to {}: credentials are sent in clear text", config.host);
            return Self::from_stream(tcp_stream, config).await;
        }

        let connector = tls_connector(&config);
        let server_name = ServerName::try_from(config.host.as_str())
            .map_err(|e| NntpError::Tls(format!("Invalid domain: {}", e)))?
            .to_owned();

        let tls_stream = timeout(
            Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
            connector.connect(server_name, tcp_stream),
        )
        .await
        .map_err(|_| NntpError::Timeout)?
        .map_err(|e| NntpError::Tls(format!("TLS handshake failed: {}", e)))?;

        Self::from_stream(tls_stream, config).await
    }

    /// Start a session over an already established byte stream
    ///
    /// Reads the server greeting: 200 (posting allowed) or 201 (no
    /// posting). A 4xx/5xx greeting is returned as
    /// [`NntpError::CommandRejected`].
    pub async fn from_stream<S>(stream: S, config: Arc<ServerConfig>) -> Result<Self>
    where
        S: NntpIo + 'static,
    {
        let stream: Box<dyn NntpIo> = Box::new(stream);
        let mut client = Self {
            stream: BufReader::with_capacity(BUFREADER_CAPACITY, stream),
            state: ConnectionState::Ready,
            config,
            posting_allowed: false,
            current_group: None,
            compression_mode: CompressionMode::None,
            body: None,
            bandwidth: ByteCounters::default(),
            is_broken: false,
        };

        let greeting = client.read_status().await?;
        debug!("Server greeting: {} {}", greeting.code, greeting.message);

        match greeting.code {
            codes::READY_POSTING_ALLOWED => client.posting_allowed = true,
            codes::READY_NO_POSTING => client.posting_allowed = false,
            _ if greeting.is_error() => return Err(greeting.into_rejection()),
            code => {
                return Err(NntpError::ProtocolViolation(format!(
                    "unexpected greeting {} {}",
                    code, greeting.message
                )));
            }
        }

        Ok(client)
    }
}

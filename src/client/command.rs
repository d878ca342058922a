//! Command dispatch: send one command, classify its reply, hand out the body

use super::compression::{BodyEncoding, BodyReader};
use super::state::{CompressionMode, ConnectionState};
use super::stream::ResponseStream;
use super::NntpClient;
use crate::commands::{BodyFormat, Request, Verb};
use crate::error::{NntpError, Result};
use crate::response::{codes, ReplyClass, StatusReply};
use tracing::{debug, warn};

/// Marker some servers append to the status line of a compressed body
const GZIP_MARKER: &str = "[COMPRESS=GZIP]";

/// Result of a command whose reply was not a 4xx/5xx rejection
#[must_use]
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Single-line reply, nothing follows
    Status(StatusReply),
    /// Multiline reply; the body is read through the stream
    Body(ResponseStream<'a>),
    /// 3xx reply: the server waits for more input (AUTHINFO, POST)
    Continue(StatusReply),
}

impl<'a> Outcome<'a> {
    /// Status line of the reply
    pub fn status(&self) -> &StatusReply {
        match self {
            Outcome::Status(reply) | Outcome::Continue(reply) => reply,
            Outcome::Body(stream) => stream.status(),
        }
    }

    /// The body stream, or an error if the reply had none
    pub fn into_body(self) -> Result<ResponseStream<'a>> {
        match self {
            Outcome::Body(stream) => Ok(stream),
            Outcome::Status(reply) | Outcome::Continue(reply) => Err(NntpError::InvalidResponse(
                format!("expected a multiline reply, got {} {}", reply.code, reply.message),
            )),
        }
    }

    /// The single-line reply, or an error if a body or continuation came back
    pub fn into_status(self) -> Result<StatusReply> {
        match self {
            Outcome::Status(reply) => Ok(reply),
            Outcome::Continue(reply) => Err(NntpError::InvalidResponse(format!(
                "unexpected continuation {} {}",
                reply.code, reply.message
            ))),
            Outcome::Body(stream) => Err(NntpError::InvalidResponse(format!(
                "unexpected multiline reply {}",
                stream.status().code
            ))),
        }
    }
}

impl NntpClient {
    /// Send one command and classify its reply
    ///
    /// Any body left over from the previous command is drained first. A
    /// 4xx/5xx reply becomes [`NntpError::CommandRejected`]. A reply that
    /// contradicts what the command can answer (a body where none is
    /// possible, no body where one is required, a stray continuation) is a
    /// [`NntpError::ProtocolViolation`] and breaks the connection.
    ///
    /// With [`ServerConfig::auto_authenticate`](crate::ServerConfig::auto_authenticate)
    /// set, a 480 reply on an unauthenticated session runs AUTHINFO with the
    /// configured credentials and sends the command once more. A second 480
    /// is returned as is.
    pub async fn execute(&mut self, request: &Request) -> Result<Outcome<'_>> {
        let (class, reply) = match self.exchange(request).await {
            Err(NntpError::CommandRejected { code, message })
                if code == codes::AUTH_REQUIRED && self.may_authenticate(request.verb()) =>
            {
                debug!("{} needs authentication ({}), logging in", request.verb(), message);
                self.authenticate().await?;
                self.exchange(request).await?
            }
            result => result?,
        };

        Ok(match class {
            ReplyClass::MultilineFollows => Outcome::Body(ResponseStream::new(self, reply)),
            ReplyClass::Continuation => Outcome::Continue(reply),
            _ => Outcome::Status(reply),
        })
    }

    /// One round trip: send, read the status line, classify it
    ///
    /// On success the class is one of `Immediate`, `MultilineFollows` or
    /// `Continuation`; for a body the decoder is already installed.
    pub(super) async fn exchange(&mut self, request: &Request) -> Result<(ReplyClass, StatusReply)> {
        if self.is_broken {
            return Err(NntpError::ConnectionCorrupted(
                "connection is marked broken".to_string(),
            ));
        }

        if self.state == ConnectionState::Closed {
            return Err(NntpError::ConnectionClosed);
        }

        if self.body.is_some() {
            self.drain_body().await?;
        }

        if let Err(e) = self.send_command(request).await {
            self.mark_broken();
            return Err(e);
        }

        let reply = match self.read_status().await {
            Ok(reply) => reply,
            Err(e) => {
                self.mark_broken();
                return Err(e);
            }
        };

        let verb = request.verb();
        let class = reply.classify(verb.multiline_codes());
        match class {
            ReplyClass::MultilineFollows => {
                self.apply_side_effects(verb, &reply);
                let encoding = self.body_encoding(verb, &reply);
                debug!("{} {}: reading {:?} body", reply.code, verb, encoding);
                self.body = Some(BodyReader::new(encoding));
            }
            ReplyClass::Immediate => {
                if verb.expects_body() || codes::ALWAYS_MULTILINE.contains(&reply.code) {
                    return Err(self.violation(verb, &reply));
                }
                self.apply_side_effects(verb, &reply);
            }
            ReplyClass::Continuation => {
                if !verb.accepts_continuation() {
                    return Err(self.violation(verb, &reply));
                }
            }
            ReplyClass::TemporaryFailure | ReplyClass::PermanentFailure => {
                debug!("{} rejected: {} {}", verb, reply.code, reply.message);
                return Err(reply.into_rejection());
            }
        }
        Ok((class, reply))
    }

    /// Whether a 480 to `verb` should trigger a login and one retry
    fn may_authenticate(&self, verb: Verb) -> bool {
        self.config.auto_authenticate
            && verb != Verb::AuthInfo
            && self.state == ConnectionState::Ready
    }

    /// Execute a command that never carries a body and return its reply
    ///
    /// Continuations are returned like any other reply.
    pub(super) async fn command_status(&mut self, request: &Request) -> Result<StatusReply> {
        match self.execute(request).await? {
            Outcome::Status(reply) | Outcome::Continue(reply) => Ok(reply),
            Outcome::Body(stream) => Err(NntpError::InvalidResponse(format!(
                "unexpected multiline reply {} to {}",
                stream.status().code,
                request.verb()
            ))),
        }
    }

    /// Execute a command whose successful reply carries a body
    pub(super) async fn command_body(&mut self, request: &Request) -> Result<ResponseStream<'_>> {
        self.execute(request).await?.into_body()
    }

    /// Decoder for the body announced by `reply`
    ///
    /// Gzip is only engaged once negotiated, and then only for commands
    /// whose bodies servers compress or when the status line says so.
    fn body_encoding(&self, verb: Verb, reply: &StatusReply) -> BodyEncoding {
        let format = verb.body_format();
        if format == BodyFormat::YencDeflate {
            return BodyEncoding::YencDeflate;
        }

        let marked = reply.message.contains(GZIP_MARKER);
        if self.compression_mode == CompressionMode::Gzip
            && (format == BodyFormat::Compressible || marked)
        {
            return BodyEncoding::Gzip;
        }
        if marked {
            warn!("Server sent {} without negotiated compression", GZIP_MARKER);
        }
        BodyEncoding::Plain
    }

    /// Connection state changes carried by successful replies
    fn apply_side_effects(&mut self, verb: Verb, reply: &StatusReply) {
        match verb {
            Verb::Group | Verb::ListGroup if reply.code == codes::GROUP_SELECTED => {
                // "211 count first last name"
                if let Some(name) = reply.message.split_whitespace().nth(3) {
                    self.current_group = Some(name.to_string());
                }
            }
            Verb::XFeature if reply.code == codes::FEATURE_ENABLED => {
                debug!("XFEATURE COMPRESS GZIP enabled");
                self.compression_mode = CompressionMode::Gzip;
            }
            Verb::Quit => {
                self.state = ConnectionState::Closed;
                self.compression_mode = CompressionMode::None;
                self.current_group = None;
            }
            _ => {}
        }
    }

    fn violation(&mut self, verb: Verb, reply: &StatusReply) -> NntpError {
        warn!("Unexpected reply to {}: {} {}", verb, reply.code, reply.message);
        self.mark_broken();
        NntpError::ProtocolViolation(format!(
            "unexpected reply to {}: {} {}",
            verb, reply.code, reply.message
        ))
    }
}

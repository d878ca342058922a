//! Article upload (POST, RFC 3977 Section 6.3.1)

use super::io::stuff_line;
use super::{NntpClient, Outcome};
use crate::commands;
use crate::error::{NntpError, Result};
use crate::response::codes;
use tracing::debug;

/// Stuff and frame an article for the wire
///
/// Lines may end in LF or CRLF. A NUL or a bare CR inside a line cannot be
/// sent and is rejected.
fn encode_article(article: &str) -> Result<Vec<u8>> {
    let mut wire = Vec::with_capacity(article.len() + article.len() / 32 + 8);

    let body = article.strip_suffix('\n').unwrap_or(article);
    if !body.is_empty() {
        for line in body.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.contains(['\0', '\r']) {
                return Err(NntpError::InvalidArticle(format!(
                    "line contains NUL or bare CR: {:?}",
                    line
                )));
            }
            wire.extend_from_slice(stuff_line(line).as_bytes());
            wire.extend_from_slice(b"\r\n");
        }
    }

    wire.extend_from_slice(b".\r\n");
    Ok(wire)
}

impl NntpClient {
    /// Post an article (headers, empty line, body)
    ///
    /// # Two-Phase Protocol
    ///
    /// 1. Client sends POST; server answers 340 (send article) or 440
    /// 2. Client sends the dot-stuffed article and the "." terminator
    /// 3. Server answers 240 (posted) or 441 (posting failed)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{NntpClient, ServerConfig};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = ServerConfig::tls("news.example.com", "user", "pass");
    /// # let mut client = NntpClient::connect(Arc::new(config)).await?;
    /// let article = "From: user@example.com\r\n\
    ///                Newsgroups: test.group\r\n\
    ///                Subject: Test Article\r\n\
    ///                \r\n\
    ///                This is a test article.\r\n";
    /// if let Some(id) = client.post(article).await? {
    ///     println!("posted as {}", id);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`NntpError::CommandRejected`] - 440 posting not permitted, 441 posting failed
    /// - [`NntpError::InvalidArticle`] - Article contains NUL or bare CR
    /// - [`NntpError::InvalidResponse`] - The server answered POST without 340
    ///
    /// Returns the message-id the server assigned when its 240 reply starts
    /// with one ("240 <id@host> Article received"), `None` otherwise.
    pub async fn post(&mut self, article: &str) -> Result<Option<String>> {
        let wire = encode_article(article)?;
        debug!("Posting article ({} bytes on the wire)", wire.len());

        match self.execute(&commands::post()).await? {
            Outcome::Continue(reply) if reply.code == codes::SEND_ARTICLE => {}
            other => {
                let reply = other.status();
                return Err(NntpError::InvalidResponse(format!(
                    "unexpected POST reply {} {}",
                    reply.code, reply.message
                )));
            }
        }

        if let Err(e) = self.send_raw(&wire).await {
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

        match reply.code {
            codes::ARTICLE_POSTED => {
                let message_id = posted_message_id(&reply.message);
                debug!("Article posted successfully: {:?}", message_id);
                Ok(message_id)
            }
            _ if reply.is_error() => Err(reply.into_rejection()),
            code => Err(NntpError::InvalidResponse(format!(
                "unexpected reply after article: {} {}",
                code, reply.message
            ))),
        }
    }
}

/// Message-id leading a 240 reply, if the server put one there
fn posted_message_id(message: &str) -> Option<String> {
    let token = message.split_whitespace().next()?;
    (token.len() > 2 && token.starts_with('<') && token.ends_with('>')).then(|| token.to_string())
}

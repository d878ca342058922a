//! Article retrieval and navigation commands (RFC 3977 §6.1.3, §6.1.4, §6.2)
//!
//! ARTICLE, HEAD and BODY hand back the raw [`ResponseStream`]: an article
//! can be large, and the caller decides whether to read it as text or as
//! bytes. The `_decoded` variants strip yEnc framing and return the binary
//! payload instead. STAT, NEXT and LAST are single-line.

use super::{BodyDecoding, DecodedBody, NntpClient, ResponseStream};
use crate::commands::{self, ArticleInfo};
use crate::error::Result;
use tracing::trace;

/// Header fields in wire order, continuation lines folded
pub type Headers = Vec<(String, String)>;

/// Lines up to the empty line that ends the header block
async fn header_lines(stream: &mut ResponseStream<'_>) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    while let Some(line) = stream.next_line().await? {
        if line.is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines)
}

fn subject_says_yenc(headers: &Headers) -> bool {
    headers
        .iter()
        .any(|(name, value)| name.eq_ignore_ascii_case("subject") && value.contains("yEnc"))
}

impl NntpClient {
    /// Fetch a full article (headers, empty line, body)
    ///
    /// `id` is a message-id ("<abc@example.com>") or an article number in
    /// the current group; `None` fetches the current article.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{NntpClient, ServerConfig};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = ServerConfig::tls("news.example.com", "user", "pass");
    /// # let mut client = NntpClient::connect(Arc::new(config)).await?;
    /// let mut article = client.article(Some("<abc@example.com>")).await?;
    /// while let Some(line) = article.next_bytes().await? {
    ///     // process raw bytes
    ///     let _ = line;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`NntpError::CommandRejected`](crate::NntpError::CommandRejected) -
    ///   430/423 for a missing article, 412 with no group selected
    pub async fn article(&mut self, id: Option<&str>) -> Result<ResponseStream<'_>> {
        trace!("Fetching article: {:?}", id);
        self.command_body(&commands::article(id)).await
    }

    /// Fetch article headers only
    ///
    /// Servers with negotiated compression may send this body compressed;
    /// the stream decodes it transparently.
    pub async fn head(&mut self, id: Option<&str>) -> Result<ResponseStream<'_>> {
        trace!("Fetching headers: {:?}", id);
        self.command_body(&commands::head(id)).await
    }

    /// Fetch article headers and parse them into name/value pairs
    ///
    /// # Errors
    ///
    /// - [`NntpError::InvalidResponse`](crate::NntpError::InvalidResponse) -
    ///   a line that is neither `Name: value` nor a continuation
    pub async fn head_parsed(&mut self, id: Option<&str>) -> Result<Headers> {
        let lines = self.head(id).await?.collect_lines().await?;
        commands::parse_headers(lines)
    }

    /// Fetch article body only
    pub async fn body(&mut self, id: Option<&str>) -> Result<ResponseStream<'_>> {
        trace!("Fetching body: {:?}", id);
        self.command_body(&commands::body(id)).await
    }

    /// Fetch article body with a yEnc payload decoded
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{BodyDecoding, NntpClient};
    /// # async fn example(client: &mut NntpClient) -> nntp_stream::Result<()> {
    /// let part = client
    ///     .body_decoded(Some("<part1of1@example.com>"), BodyDecoding::Auto)
    ///     .await?
    ///     .collect_bytes()
    ///     .await?;
    /// std::fs::write("file.bin", part)?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn body_decoded(
        &mut self,
        id: Option<&str>,
        decoding: BodyDecoding,
    ) -> Result<DecodedBody<'_>> {
        let stream = self.body(id).await?;
        Ok(DecodedBody::new(stream, decoding))
    }

    /// Fetch a full article: parsed headers plus a decoding body reader
    ///
    /// In [`BodyDecoding::Auto`] mode a Subject mentioning "yEnc" forces
    /// yEnc decoding; otherwise the body's first line decides.
    pub async fn article_decoded(
        &mut self,
        id: Option<&str>,
        decoding: BodyDecoding,
    ) -> Result<(Headers, DecodedBody<'_>)> {
        let mut stream = self.article(id).await?;
        let headers = commands::parse_headers(header_lines(&mut stream).await?)?;

        let decoding = match decoding {
            BodyDecoding::Auto if subject_says_yenc(&headers) => BodyDecoding::Yenc,
            other => other,
        };
        Ok((headers, DecodedBody::new(stream, decoding)))
    }

    /// Check that an article exists without transferring it (STAT)
    pub async fn stat(&mut self, id: Option<&str>) -> Result<ArticleInfo> {
        trace!("Checking article status: {:?}", id);
        let reply = self.command_status(&commands::stat(id)).await?;
        commands::parse_article_status(&reply)
    }

    /// Move to the next article in the current group
    ///
    /// # Errors
    ///
    /// - [`NntpError::CommandRejected`](crate::NntpError::CommandRejected) -
    ///   412 no group, 420 no current article, 421 no next article
    pub async fn next(&mut self) -> Result<ArticleInfo> {
        trace!("Navigating to next article");
        let reply = self.command_status(&commands::next()).await?;
        commands::parse_article_status(&reply)
    }

    /// Move to the previous article in the current group
    pub async fn last(&mut self) -> Result<ArticleInfo> {
        trace!("Navigating to previous article");
        let reply = self.command_status(&commands::last()).await?;
        commands::parse_article_status(&reply)
    }
}

//! Article metadata retrieval commands (OVER/XOVER/XZVER, HDR/XHDR/XZHDR, XPAT)
//!
//! These commands fetch per-article metadata without downloading article
//! content. Bodies can span millions of lines, so every operation returns a
//! lazy [`Records`] stream. The XZ variants arrive yEnc-wrapped and deflated;
//! once gzip compression is negotiated the plain ones may arrive as a zlib
//! block. Both are decoded transparently.

use super::{NntpClient, Records};
use crate::commands::{self, HdrEntry, OverviewEntry};
use crate::error::Result;
use tracing::trace;

impl NntpClient {
    /// Overview data for a range of articles (XOVER, RFC 2980)
    ///
    /// # Arguments
    ///
    /// * `range` - Article range specification (e.g., "100-200", "100-")
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{NntpClient, ServerConfig};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = ServerConfig::tls("news.example.com", "user", "pass");
    /// # let mut client = NntpClient::connect(Arc::new(config)).await?;
    /// client.group("comp.lang.rust").await?;
    /// let entries = client.xover("1-100").await?.collect().await?;
    /// for entry in entries {
    ///     println!("{}: {}", entry.article_number, entry.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`NntpError::CommandRejected`](crate::NntpError::CommandRejected) -
    ///   412 with no group selected, 420 for an empty range
    pub async fn xover(&mut self, range: &str) -> Result<Records<'_, OverviewEntry>> {
        trace!("Fetching XOVER: {}", range);
        let stream = self.command_body(&commands::xover(range)).await?;
        Ok(Records::new(stream, commands::parse_overview_line))
    }

    /// XOVER with a yEnc-wrapped deflate body
    ///
    /// Records are identical to [`xover`](Self::xover); only the transfer
    /// encoding differs.
    pub async fn xzver(&mut self, range: &str) -> Result<Records<'_, OverviewEntry>> {
        trace!("Fetching XZVER: {}", range);
        let stream = self.command_body(&commands::xzver(range)).await?;
        Ok(Records::new(stream, commands::parse_overview_line))
    }

    /// Overview data (OVER, RFC 3977 Section 8.3)
    ///
    /// `range_or_msgid` may be a range, a message-id, or `None` for the
    /// current article.
    pub async fn over(
        &mut self,
        range_or_msgid: Option<&str>,
    ) -> Result<Records<'_, OverviewEntry>> {
        trace!("Fetching OVER: {:?}", range_or_msgid);
        let stream = self.command_body(&commands::over(range_or_msgid)).await?;
        Ok(Records::new(stream, commands::parse_overview_line))
    }

    /// Values of one header field (HDR, RFC 3977 Section 8.5)
    ///
    /// Records for articles selected by message-id carry article number 0.
    pub async fn hdr(
        &mut self,
        field: &str,
        range_or_msgid: Option<&str>,
    ) -> Result<Records<'_, HdrEntry>> {
        trace!("Fetching HDR {} {:?}", field, range_or_msgid);
        let stream = self
            .command_body(&commands::hdr(field, range_or_msgid))
            .await?;
        Ok(Records::new(stream, commands::parse_hdr_line))
    }

    /// Values of one header field (XHDR, RFC 2980 Section 2.6)
    pub async fn xhdr(
        &mut self,
        field: &str,
        range_or_msgid: Option<&str>,
    ) -> Result<Records<'_, HdrEntry>> {
        trace!("Fetching XHDR {} {:?}", field, range_or_msgid);
        let stream = self
            .command_body(&commands::xhdr(field, range_or_msgid))
            .await?;
        Ok(Records::new(stream, commands::parse_hdr_line))
    }

    /// XHDR with a yEnc-wrapped deflate body
    pub async fn xzhdr(
        &mut self,
        field: &str,
        range_or_msgid: Option<&str>,
    ) -> Result<Records<'_, HdrEntry>> {
        trace!("Fetching XZHDR {} {:?}", field, range_or_msgid);
        let stream = self
            .command_body(&commands::xzhdr(field, range_or_msgid))
            .await?;
        Ok(Records::new(stream, commands::parse_hdr_line))
    }

    /// Header values matching any of `patterns` (XPAT, RFC 2980 Section 2.9)
    ///
    /// `target` is a range or a message-id; patterns are wildmats.
    pub async fn xpat(
        &mut self,
        field: &str,
        target: &str,
        patterns: &[&str],
    ) -> Result<Records<'_, HdrEntry>> {
        trace!("Fetching XPAT {} {} {:?}", field, target, patterns);
        let stream = self
            .command_body(&commands::xpat(field, target, patterns))
            .await?;
        Ok(Records::new(stream, commands::parse_hdr_line))
    }
}

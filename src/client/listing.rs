//! Newsgroup listing commands (RFC 3977 §7.3, §7.4, §7.6, §8.4, §8.6)
//!
//! This module contains the LIST variants, NEWGROUPS and NEWNEWS. Every
//! operation returns a lazy [`Records`] stream: a full active list can run
//! to hundreds of thousands of lines.

use super::{NntpClient, Records};
use crate::commands::{self, ActiveGroup, GroupTime, NewsgroupInfo, OverviewField};
use crate::error::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

impl NntpClient {
    /// List active newsgroups (RFC 3977 Section 7.6.3)
    ///
    /// Each record carries the group name, high and low water marks and the
    /// posting status ('y', 'n', 'm').
    ///
    /// # Arguments
    ///
    /// * `wildmat` - Wildmat pattern (e.g., "comp.*"); `None` lists every group
    pub async fn list_active(&mut self, wildmat: Option<&str>) -> Result<Records<'_, ActiveGroup>> {
        debug!("Listing active groups matching: {:?}", wildmat);
        let stream = self.command_body(&commands::list_active(wildmat)).await?;
        Ok(Records::new(stream, commands::parse_active_line))
    }

    /// List newsgroup creation times (RFC 3977 Section 7.6.4)
    pub async fn list_active_times(
        &mut self,
        wildmat: Option<&str>,
    ) -> Result<Records<'_, GroupTime>> {
        debug!("Listing active times matching: {:?}", wildmat);
        let stream = self
            .command_body(&commands::list_active_times(wildmat))
            .await?;
        Ok(Records::new(stream, commands::parse_active_times_line))
    }

    /// List newsgroups with descriptions (RFC 3977 Section 7.6.6)
    ///
    /// The wildmat pattern supports `*` (matches any sequence) and `?`
    /// (matches single character).
    pub async fn list_newsgroups(
        &mut self,
        wildmat: Option<&str>,
    ) -> Result<Records<'_, NewsgroupInfo>> {
        debug!("Listing newsgroups matching: {:?}", wildmat);
        let stream = self.command_body(&commands::list_newsgroups(wildmat)).await?;
        Ok(Records::new(stream, commands::parse_newsgroup_line))
    }

    /// List the overview format fields (RFC 3977 Section 8.4)
    ///
    /// Fields come in the order they appear in OVER/XOVER output, after the
    /// article number.
    pub async fn list_overview_fmt(&mut self) -> Result<Vec<OverviewField>> {
        debug!("Requesting overview format");
        let stream = self.command_body(&commands::list_overview_fmt()).await?;
        Records::new(stream, commands::parse_overview_fmt_line)
            .collect()
            .await
    }

    /// Header fields available for HDR (RFC 3977 Section 8.6)
    ///
    /// `variant` is `Some("MSGID")` or `Some("RANGE")` to ask about one form
    /// of HDR. A ":" entry means any header may be retrieved.
    pub async fn list_headers(&mut self, variant: Option<&str>) -> Result<Vec<String>> {
        debug!("Requesting header fields list (variant: {:?})", variant);
        let stream = self.command_body(&commands::list_headers(variant)).await?;
        Records::new(stream, commands::parse_token_line)
            .collect()
            .await
    }

    /// Extensions of a pre-RFC 3977 server (LIST EXTENSIONS, answers 202)
    pub async fn list_extensions(&mut self) -> Result<Vec<String>> {
        debug!("Requesting extension list");
        let stream = self.command_body(&commands::list_extensions()).await?;
        Records::new(stream, commands::parse_token_line)
            .collect()
            .await
    }

    /// Newsgroups created since `since` (RFC 3977 Section 7.3)
    pub async fn newgroups(&mut self, since: DateTime<Utc>) -> Result<Records<'_, ActiveGroup>> {
        debug!("Listing groups created since {}", since);
        let stream = self.command_body(&commands::newgroups(since)).await?;
        Ok(Records::new(stream, commands::parse_active_line))
    }

    /// Message-ids of articles posted since `since` (RFC 3977 Section 7.4)
    pub async fn newnews(
        &mut self,
        wildmat: &str,
        since: DateTime<Utc>,
    ) -> Result<Records<'_, String>> {
        debug!("Listing new articles in {} since {}", wildmat, since);
        let stream = self.command_body(&commands::newnews(wildmat, since)).await?;
        Ok(Records::new(stream, commands::parse_token_line))
    }
}

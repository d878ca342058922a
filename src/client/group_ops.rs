//! Newsgroup selection (RFC 3977 §6.1.1, §6.1.2)

use super::{NntpClient, Records};
use crate::commands::{self, GroupInfo};
use crate::error::Result;
use tracing::debug;

impl NntpClient {
    /// Select a newsgroup
    ///
    /// Returns [`GroupInfo`] with article count and range, and makes the
    /// group current for NEXT, LAST, STAT and the range forms of OVER/HDR.
    ///
    /// # Errors
    ///
    /// - [`NntpError::CommandRejected`](crate::NntpError::CommandRejected) -
    ///   411 when the newsgroup does not exist
    /// - [`NntpError::InvalidResponse`](crate::NntpError::InvalidResponse) -
    ///   Could not parse the 211 status line
    pub async fn group(&mut self, newsgroup: &str) -> Result<GroupInfo> {
        debug!("Selecting newsgroup: {}", newsgroup);

        let reply = self.command_status(&commands::group(newsgroup)).await?;
        let info = commands::parse_group_response(&reply)?;

        debug!(
            "Group {} selected: {} articles ({}-{})",
            info.name, info.count, info.first, info.last
        );
        Ok(info)
    }

    /// Article numbers in a newsgroup (RFC 3977 Section 6.1.2)
    ///
    /// With `newsgroup` set the group is also selected. `range` takes the
    /// usual forms ("100-200", "100-").
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{NntpClient, ServerConfig};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = ServerConfig::tls("news.example.com", "user", "pass");
    /// # let mut client = NntpClient::connect(Arc::new(config)).await?;
    /// let mut numbers = client.listgroup(Some("alt.test"), Some("1000-2000")).await?;
    /// while let Some(n) = numbers.next_record().await? {
    ///     println!("{}", n);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn listgroup(
        &mut self,
        newsgroup: Option<&str>,
        range: Option<&str>,
    ) -> Result<Records<'_, u64>> {
        debug!("Listing articles in {:?} (range: {:?})", newsgroup, range);
        let stream = self
            .command_body(&commands::listgroup(newsgroup, range))
            .await?;
        Ok(Records::new(stream, commands::parse_article_number_line))
    }
}

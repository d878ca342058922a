//! Server-level commands
//!
//! RFC 3977 §5.2 (CAPABILITIES), §5.3 (MODE READER), §7.1 (DATE), §7.2 (HELP)

use super::NntpClient;
use crate::capabilities::Capabilities;
use crate::commands;
use crate::error::{NntpError, Result};
use crate::response::codes;
use chrono::{DateTime, Utc};
use tracing::debug;

impl NntpClient {
    /// Request server capabilities (RFC 3977 Section 5.2)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{NntpClient, ServerConfig};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = ServerConfig::tls("news.example.com", "user", "pass");
    /// # let mut client = NntpClient::connect(Arc::new(config)).await?;
    /// let caps = client.capabilities().await?;
    /// if caps.supports_gzip() {
    ///     client.enable_compression(caps.supports_gzip_terminator()).await?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn capabilities(&mut self) -> Result<Capabilities> {
        debug!("Requesting server capabilities");

        let lines = self
            .command_body(&commands::capabilities())
            .await?
            .collect_lines()
            .await?;

        let caps = Capabilities::parse(&lines);
        debug!("Received {} capabilities", lines.len());
        Ok(caps)
    }

    /// Switch to reader mode (RFC 3977 Section 5.3)
    ///
    /// Returns `true` if posting is allowed (code 200), `false` if not (201).
    pub async fn mode_reader(&mut self) -> Result<bool> {
        debug!("Switching to reader mode");

        let reply = self.command_status(&commands::mode_reader()).await?;
        self.posting_allowed = match reply.code {
            codes::READY_POSTING_ALLOWED => true,
            codes::READY_NO_POSTING => false,
            code => {
                return Err(NntpError::InvalidResponse(format!(
                    "unexpected MODE READER reply {} {}",
                    code, reply.message
                )));
            }
        };

        debug!("Reader mode enabled, posting allowed: {}", self.posting_allowed);
        Ok(self.posting_allowed)
    }

    /// Server's current UTC time (RFC 3977 Section 7.1)
    pub async fn date(&mut self) -> Result<DateTime<Utc>> {
        let reply = self.command_status(&commands::date()).await?;
        if reply.code != codes::SERVER_DATE {
            return Err(NntpError::InvalidResponse(format!(
                "unexpected DATE reply {} {}",
                reply.code, reply.message
            )));
        }

        let date = commands::parse_date_response(&reply.message)?;
        debug!("Server date/time: {}", date);
        Ok(date)
    }

    /// Help text (RFC 3977 Section 7.2)
    pub async fn help(&mut self) -> Result<Vec<String>> {
        let lines = self
            .command_body(&commands::help())
            .await?
            .collect_lines()
            .await?;
        debug!("Received help text ({} lines)", lines.len());
        Ok(lines)
    }

    /// End the session (RFC 3977 Section 5.4)
    ///
    /// The server answers 205 and closes the connection. Compression and
    /// the selected group are reset; the client should be dropped after.
    pub async fn quit(&mut self) -> Result<()> {
        debug!("Closing NNTP connection");

        let reply = self.command_status(&commands::quit()).await?;
        if reply.code != codes::CLOSING_CONNECTION {
            debug!("QUIT answered {} {}", reply.code, reply.message);
        }
        Ok(())
    }
}

//! NNTP authentication support (AUTHINFO USER/PASS)

use super::NntpClient;
use super::state::ConnectionState;
use crate::commands;
use crate::error::{NntpError, Result};
use crate::response::codes;
use std::sync::Arc;
use tracing::debug;

/// A rejected AUTHINFO step is an authentication failure, not a plain
/// command rejection
fn auth_error(error: NntpError) -> NntpError {
    match error {
        NntpError::CommandRejected { code, message } => {
            NntpError::AuthFailed(format!("{} {}", code, message))
        }
        other => other,
    }
}

impl NntpClient {
    /// Authenticate with username and password (AUTHINFO USER/PASS)
    ///
    /// Sends AUTHINFO USER followed by AUTHINFO PASS to authenticate
    /// with the server using credentials from the client configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use nntp_stream::{NntpClient, ServerConfig};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ServerConfig::tls("news.example.com", "user", "pass");
    /// let mut client = NntpClient::connect(Arc::new(config)).await?;
    /// client.authenticate().await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`NntpError::AuthFailed`] - Invalid credentials, or already authenticated
    /// - [`NntpError::ConnectionClosed`] - QUIT was already sent, or the
    ///   server closed the connection
    /// - [`NntpError::Timeout`] - Server did not respond in time
    pub async fn authenticate(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Closed => return Err(NntpError::ConnectionClosed),
            ConnectionState::Authenticated => {
                return Err(NntpError::AuthFailed("Already authenticated".to_string()));
            }
            ConnectionState::Ready | ConnectionState::InProgress => {}
        }
        debug!("Authenticating as {}", self.config.username);

        let previous = self.state;
        self.state = ConnectionState::InProgress;
        let result = self.authinfo_exchange().await;

        self.state = match result {
            Ok(()) => {
                debug!("Authentication successful");
                ConnectionState::Authenticated
            }
            Err(_) => previous,
        };
        result
    }

    async fn authinfo_exchange(&mut self) -> Result<()> {
        let config = Arc::clone(&self.config);

        let (_, reply) = self
            .exchange(&commands::authinfo_user(&config.username))
            .await
            .map_err(auth_error)?;

        // 281 right away: the server needs no password
        let reply = if reply.code == codes::AUTH_CONTINUE {
            self.exchange(&commands::authinfo_pass(&config.password))
                .await
                .map_err(auth_error)?
                .1
        } else {
            reply
        };

        if reply.code != codes::AUTH_ACCEPTED {
            return Err(NntpError::AuthFailed(reply.message));
        }
        Ok(())
    }
}

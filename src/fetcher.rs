//! Mail fetcher: the IMAP phase of the pipeline.
//!
//! The [`MailFetcher`] owns the single IMAP session of a pipeline run. It
//! connects, authenticates, selects the configured mailbox, fetches the
//! messages matching the search query, and tears the session down again
//! (`CLOSE` + `LOGOUT`) before any other protocol phase begins.
//!
//! # Example
//!
//! ```no_run
//! use pdfwatch::{MailFetcher, WatchConfig};
//!
//! # async fn example() -> pdfwatch::Result<()> {
//! # let config = WatchConfig::builder()
//! #     .host("mail.example.com").user("a@b.c").password("x")
//! #     .mailbox("INBOX").pattern("x").recipient("d@e.f").build()?;
//! let mut fetcher = MailFetcher::connect(&config).await?;
//! let messages = fetcher.fetch_matching().await?;
//! fetcher.close().await?;
//! println!("{} unread messages", messages.len());
//! # Ok(())
//! # }
//! ```

use crate::config::WatchConfig;
use crate::connection;
use crate::error::{Error, Result};
use crate::session::{self, AuthConfig, ImapSession};
use futures::StreamExt;
use mailparse::ParsedMail;
use tracing::{debug, instrument};

/// A fetched email message.
///
/// Holds the raw RFC 822 bytes as returned by the server; [`Message::parsed`]
/// yields the structured MIME view on demand. Immutable once fetched.
pub struct Message {
    uid: Option<u32>,
    body: Vec<u8>,
}

impl Message {
    /// Creates a message from raw RFC 822 bytes.
    ///
    /// Primarily useful for tests; pipeline messages come from
    /// [`MailFetcher::fetch_matching`].
    #[must_use]
    pub fn from_bytes(body: Vec<u8>) -> Self {
        Self { uid: None, body }
    }

    /// Returns the server-assigned UID, when known.
    #[must_use]
    pub fn uid(&self) -> Option<u32> {
        self.uid
    }

    /// Returns the raw RFC 822 bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parses the message into its MIME structure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseMail`] if the bytes are not a parseable message.
    pub fn parsed(&self) -> Result<ParsedMail<'_>> {
        mailparse::parse_mail(&self.body).map_err(|source| Error::ParseMail { source })
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("uid", &self.uid)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// The IMAP phase of a pipeline run.
///
/// # Lifecycle
///
/// 1. Create with [`connect`](Self::connect)
/// 2. Call [`fetch_matching`](Self::fetch_matching) once
/// 3. Call [`close`](Self::close) - on the error path as well, so the
///    session is torn down before the SMTP phase can open
pub struct MailFetcher {
    session: Box<ImapSession>,
    config: WatchConfig,
}

impl MailFetcher {
    /// Connects to the IMAP server, authenticates, and selects the
    /// configured mailbox.
    ///
    /// The session is encrypted from the first byte: the connection uses
    /// implicit TLS on the configured IMAP port (993 by default) rather
    /// than an in-band STARTTLS upgrade of a plaintext connection.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the connection cannot be established, or
    /// a command-failed/command-errored error naming `login` or `select` if
    /// the server rejects those operations.
    #[instrument(
        name = "MailFetcher::connect",
        skip_all,
        fields(
            user = %config.user(),
            imap_addr = %config.imap_address(),
            mailbox = %config.mailbox
        )
    )]
    pub async fn connect(config: &WatchConfig) -> Result<Self> {
        let target_addr = config.imap_address();
        let timeouts = &config.timeouts;

        let tls_stream = tokio::time::timeout(
            timeouts.connect,
            connection::establish_tls_connection(config.host(), &target_addr),
        )
        .await
        .map_err(|_| Error::ConnectTimeout {
            target: target_addr.clone(),
            timeout: timeouts.connect,
        })??;

        debug!("TLS connection established");

        let auth_config = AuthConfig {
            user: config.user(),
            password: config.password(),
        };

        let mut session = tokio::time::timeout(
            timeouts.auth,
            session::authenticate(tls_stream, &auth_config),
        )
        .await
        .map_err(|_| Error::CommandTimeout {
            operation: "login",
            timeout: timeouts.auth,
        })??;

        debug!("Authenticated");

        tokio::time::timeout(
            timeouts.select,
            session::select_mailbox(&mut session, &config.mailbox),
        )
        .await
        .map_err(|_| Error::CommandTimeout {
            operation: "select",
            timeout: timeouts.select,
        })??;

        debug!("Mailbox selected");

        Ok(Self {
            session: Box::new(session),
            config: config.clone(),
        })
    }

    /// Fetches the full messages matching the configured search query.
    ///
    /// An empty search result is a valid outcome and yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns a command error naming `search` or `fetch` if the server
    /// rejects either operation, or a transport error on connection failure.
    #[instrument(
        name = "MailFetcher::fetch_matching",
        skip(self),
        fields(query = %self.config.search_query)
    )]
    pub async fn fetch_matching(&mut self) -> Result<Vec<Message>> {
        let timeouts = self.config.timeouts.clone();
        let query = self.config.search_query.clone();

        let uids = tokio::time::timeout(timeouts.search, session::search(&mut self.session, &query))
            .await
            .map_err(|_| Error::CommandTimeout {
                operation: "search",
                timeout: timeouts.search,
            })??;

        if uids.is_empty() {
            debug!("No messages match the search query");
            return Ok(Vec::new());
        }

        let uid_set = uids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut stream = tokio::time::timeout(
            timeouts.fetch,
            session::fetch_messages(&mut self.session, &uid_set),
        )
        .await
        .map_err(|_| Error::CommandTimeout {
            operation: "fetch",
            timeout: timeouts.fetch,
        })??;

        let mut messages = Vec::with_capacity(uids.len());

        while let Some(item) = stream.next().await {
            let fetch = item.map_err(session::classify_fetch_item)?;
            match fetch.body() {
                Some(body) => messages.push(Message {
                    uid: fetch.uid,
                    body: body.to_vec(),
                }),
                None => debug!(uid = ?fetch.uid, "Fetched message has no body, skipping"),
            }
        }

        debug!(message_count = messages.len(), "Fetch complete");

        Ok(messages)
    }

    /// Closes the mailbox and logs out, consuming the fetcher.
    ///
    /// Call this on every exit path so the IMAP session is fully torn down
    /// before the pipeline proceeds.
    ///
    /// # Errors
    ///
    /// Returns a command error naming `close` or `logout` if the server
    /// rejects the teardown.
    #[instrument(name = "MailFetcher::close", skip(self))]
    pub async fn close(mut self) -> Result<()> {
        let timeout = self.config.timeouts.logout;

        tokio::time::timeout(timeout, session::close_and_logout(&mut self.session))
            .await
            .map_err(|_| Error::CommandTimeout {
                operation: "logout",
                timeout,
            })?
    }
}

impl std::fmt::Debug for MailFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailFetcher")
            .field("user", &self.config.user())
            .field("imap_addr", &self.config.imap_address())
            .field("mailbox", &self.config.mailbox)
            .finish_non_exhaustive()
    }
}

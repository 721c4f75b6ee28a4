//! Internal IMAP session management.
//!
//! This module is a thin wrapping adapter around async-imap: every
//! operation inspects the server's status discriminator and translates it
//! into the typed taxonomy in [`crate::error`]. A `NO` reply becomes
//! [`Error::CommandFailed`], a `BAD` reply becomes [`Error::CommandErrored`],
//! and anything below the protocol level becomes [`Error::ImapTransport`] -
//! each naming the offending operation.

use crate::connection::TlsStream;
use crate::error::{Error, Result};
use async_imap::Session;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, instrument};

/// Type alias for IMAP session over TLS.
pub(crate) type ImapSession = Session<TlsStream>;

/// Authentication configuration for IMAP.
pub(crate) struct AuthConfig<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

/// Translates an async-imap error into the typed command taxonomy.
fn classify(operation: &'static str, err: async_imap::error::Error) -> Error {
    match err {
        async_imap::error::Error::No(reply) => Error::CommandFailed { operation, reply },
        async_imap::error::Error::Bad(reply) => Error::CommandErrored { operation, reply },
        source => Error::ImapTransport { operation, source },
    }
}

/// Authenticates to the IMAP server and returns a session.
#[instrument(
    name = "session::authenticate",
    skip_all,
    fields(user = %config.user)
)]
pub(crate) async fn authenticate(
    tls_stream: TlsStream,
    config: &AuthConfig<'_>,
) -> Result<ImapSession> {
    let client = async_imap::Client::new(tls_stream);

    debug!("Authenticating to IMAP server");

    client
        .login(config.user, config.password)
        .await
        .map_err(|e| classify("login", e.0))
}

/// Selects the configured mailbox.
#[instrument(name = "session::select", skip(session), fields(mailbox = %mailbox))]
pub(crate) async fn select_mailbox(session: &mut ImapSession, mailbox: &str) -> Result<()> {
    debug!("Selecting mailbox");

    session
        .select(mailbox)
        .await
        .map_err(|e| classify("select", e))?;

    Ok(())
}

/// Runs a `UID SEARCH` with the given query and returns the matching UIDs
/// in ascending order.
///
/// An empty result is a valid, non-error outcome.
#[instrument(name = "session::search", skip(session), fields(query = %query))]
pub(crate) async fn search(session: &mut ImapSession, query: &str) -> Result<Vec<u32>> {
    let uids = session
        .uid_search(query)
        .await
        .map_err(|e| classify("search", e))?;

    let mut uids: Vec<u32> = uids.into_iter().collect();
    uids.sort_unstable();

    debug!(uid_count = uids.len(), "Search complete");

    Ok(uids)
}

/// Fetches full message bodies for a UID set (comma-separated).
///
/// Returns a boxed stream of fetch results; stream items are classified by
/// the caller since they surface during iteration.
pub(crate) async fn fetch_messages<'a>(
    session: &'a mut ImapSession,
    uid_set: &str,
) -> Result<BoxStream<'a, std::result::Result<async_imap::types::Fetch, async_imap::error::Error>>>
{
    debug!(uid_set = %uid_set, "Fetching messages");

    let stream = session
        .uid_fetch(uid_set, "BODY[]")
        .await
        .map_err(|e| classify("fetch", e))?;

    Ok(stream.boxed())
}

/// Classifies an error surfaced by the fetch stream.
pub(crate) fn classify_fetch_item(err: async_imap::error::Error) -> Error {
    classify("fetch", err)
}

/// Closes the selected mailbox (expunging per the protocol) and logs out.
#[instrument(name = "session::close", skip(session))]
pub(crate) async fn close_and_logout(session: &mut ImapSession) -> Result<()> {
    debug!("Closing mailbox");

    session.close().await.map_err(|e| classify("close", e))?;

    debug!("Logging out");

    session.logout().await.map_err(|e| classify("logout", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn test_classify_no_reply() {
        let err = classify(
            "login",
            async_imap::error::Error::No("LOGIN failed".to_string()),
        );
        assert_eq!(err.category(), ErrorCategory::CommandFailed);
        assert_eq!(err.operation(), Some("login"));
        assert!(err.to_string().contains("LOGIN failed"));
    }

    #[test]
    fn test_classify_bad_reply() {
        let err = classify(
            "search",
            async_imap::error::Error::Bad("unknown search key".to_string()),
        );
        assert_eq!(err.category(), ErrorCategory::CommandErrored);
        assert_eq!(err.operation(), Some("search"));
    }

    #[test]
    fn test_classify_io_is_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = classify("fetch", async_imap::error::Error::Io(io));
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert_eq!(err.operation(), Some("fetch"));
    }
}

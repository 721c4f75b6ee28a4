//! The one-shot pipeline: fetch, extract, match, notify.
//!
//! Control flow is strictly linear and each phase owns its session. The
//! IMAP session is fully torn down (on the error path as well) before the
//! SMTP phase can open; no two sessions are ever open concurrently.
//! Empty stages ("no unread mail", "no PDFs", "no matches") are successful
//! no-ops, not errors.

use crate::attachments;
use crate::config::WatchConfig;
use crate::error::Result;
use crate::fetcher::{MailFetcher, Message};
use crate::matcher::{matching_lines, LineMatcher, RegexLineMatcher};
use crate::notifier::{self, NotificationTemplate};
use crate::text;
use tracing::{info, instrument, warn};

/// What one pipeline run did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages returned by the mailbox search.
    pub messages: usize,
    /// PDF attachments found in those messages.
    pub documents: usize,
    /// Lines of extracted text matching the pattern.
    pub matches: usize,
    /// Whether a notification was sent.
    pub notified: bool,
}

/// Result of the offline half of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// PDF attachments extracted from the messages.
    pub documents: usize,
    /// Matching lines in document, page, line order.
    pub matches: Vec<String>,
}

/// The offline half of the pipeline: extract PDF attachments from fetched
/// messages, extract their text, and collect matching lines.
///
/// # Errors
///
/// Propagates decode errors (malformed MIME or attachment transfer
/// encoding) and parse errors (corrupt PDFs); both fail fast.
pub fn scan(messages: &[Message], matcher: &dyn LineMatcher) -> Result<ScanOutcome> {
    let pdfs = attachments::extract_pdf_attachments(messages)?;
    if pdfs.is_empty() {
        return Ok(ScanOutcome {
            documents: 0,
            matches: Vec::new(),
        });
    }

    let texts = text::extract_all(&pdfs)?;
    let matches = matching_lines(&texts, matcher);

    Ok(ScanOutcome {
        documents: pdfs.len(),
        matches,
    })
}

/// Runs the whole pipeline once.
///
/// Phases: load template and compile matcher (configuration), IMAP fetch
/// (open, search, fetch, close), offline scan, and - only if any line
/// matched - one SMTP notification.
///
/// # Errors
///
/// Surfaces the first error from any phase; there is no retry and no
/// partial-result reporting. Configuration errors (unreadable template)
/// are raised before any network activity.
#[instrument(name = "pipeline::run", skip_all, fields(mailbox = %config.mailbox))]
pub async fn run(config: &WatchConfig) -> Result<RunSummary> {
    let template = NotificationTemplate::load(&config.template_path)?;
    let matcher = RegexLineMatcher::from_regex(config.pattern().clone());

    info!(
        imap_addr = %config.imap_address(),
        mailbox = %config.mailbox,
        "Connecting to IMAP server"
    );

    let mut fetcher = MailFetcher::connect(config).await?;
    let fetched = fetcher.fetch_matching().await;
    let closed = fetcher.close().await;

    let messages = match fetched {
        Ok(messages) => {
            // A clean fetch with a failed teardown is still a failed run.
            closed?;
            messages
        }
        Err(e) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "IMAP teardown failed after fetch error");
            }
            return Err(e);
        }
    };

    if messages.is_empty() {
        info!(mailbox = %config.mailbox, "No messages matched the search, nothing to do");
        return Ok(RunSummary {
            messages: 0,
            documents: 0,
            matches: 0,
            notified: false,
        });
    }

    info!(message_count = messages.len(), "Scanning fetched messages");

    let outcome = scan(&messages, &matcher)?;

    let mut summary = RunSummary {
        messages: messages.len(),
        documents: outcome.documents,
        matches: outcome.matches.len(),
        notified: false,
    };

    if outcome.documents == 0 {
        info!("No PDF attachments found, nothing to do");
        return Ok(summary);
    }

    if outcome.matches.is_empty() {
        info!(
            document_count = outcome.documents,
            pattern = %config.pattern().as_str(),
            "No lines matched the pattern, nothing to do"
        );
        return Ok(summary);
    }

    info!(
        match_count = outcome.matches.len(),
        "Matches found, sending notification"
    );

    notifier::send_notification(config, &template).await?;
    summary.notified = true;

    info!(recipient = %config.recipient(), "Notification sent");

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ClosureLineMatcher;

    #[test]
    fn test_scan_no_messages() {
        let matcher = ClosureLineMatcher::new(|_| true, "accept all");
        let outcome = scan(&[], &matcher).unwrap();
        assert_eq!(outcome.documents, 0);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_scan_flat_messages_yield_no_documents() {
        let matcher = ClosureLineMatcher::new(|_| true, "accept all");
        let messages = vec![Message::from_bytes(
            b"From: a@example.com\r\n\r\nplain body".to_vec(),
        )];
        let outcome = scan(&messages, &matcher).unwrap();
        assert_eq!(outcome.documents, 0);
        assert!(outcome.matches.is_empty());
    }
}

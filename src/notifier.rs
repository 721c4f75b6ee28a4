//! Notifier: builds and sends the alert email over SMTP.
//!
//! The notification content comes from a template file: the first line is
//! the Subject, the remaining lines (joined by newline) form the Body.
//! From/To come from configuration. The SMTP session is opened with
//! STARTTLS, authenticated with the shared credentials, used for exactly
//! one message, and dropped.

use crate::config::WatchConfig;
use crate::error::{Error, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{debug, instrument};

/// Notification subject and body, loaded from a template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    subject: String,
    body: String,
}

impl NotificationTemplate {
    /// Reads a template file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateRead`] (a configuration error) if the file
    /// is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::TemplateRead {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Splits template text into subject (first line) and body (remaining
    /// lines joined by newline).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut lines = text.split('\n');
        let subject = lines.next().unwrap_or_default().trim_end_matches('\r').to_string();
        let body = lines.collect::<Vec<_>>().join("\n");
        Self { subject, body }
    }

    /// Returns the notification subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the notification body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Builds the outbound notification message.
///
/// # Errors
///
/// Returns a configuration error if an address cannot be used as a mailbox,
/// or [`Error::BuildMessage`] if the message cannot be assembled.
pub fn build_notification(config: &WatchConfig, template: &NotificationTemplate) -> Result<Message> {
    let from: Mailbox = parse_mailbox(config.user())?;
    let to: Mailbox = parse_mailbox(config.recipient())?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(template.subject())
        .header(ContentType::TEXT_PLAIN)
        .body(template.body().to_string())
        .map_err(|source| Error::BuildMessage { source })
}

/// Sends the notification email.
///
/// Opens an authenticated STARTTLS session to the configured submission
/// endpoint, sends exactly one message, and terminates the session.
///
/// # Errors
///
/// Server rejections are classified like the fetcher's: a permanent
/// rejection is a command-failed error naming `send`, a transient rejection
/// a command-errored one; connection and TLS failures surface as transport
/// errors.
#[instrument(
    name = "notifier::send",
    skip_all,
    fields(
        smtp_host = %config.host(),
        smtp_port = config.smtp_port,
        recipient = %config.recipient()
    )
)]
pub async fn send_notification(
    config: &WatchConfig,
    template: &NotificationTemplate,
) -> Result<()> {
    let message = build_notification(config, template)?;

    let credentials = Credentials::new(config.user().to_string(), config.password().to_string());

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.host())
        .map_err(classify_smtp)?
        .port(config.smtp_port)
        .credentials(credentials)
        .build();

    debug!("Submitting notification");

    let timeout = config.timeouts.smtp_send;
    tokio::time::timeout(timeout, transport.send(message))
        .await
        .map_err(|_| Error::CommandTimeout {
            operation: "send",
            timeout,
        })?
        .map_err(classify_smtp)?;

    debug!("Notification sent");

    Ok(())
}

/// Translates an SMTP error into the typed command taxonomy.
fn classify_smtp(err: lettre::transport::smtp::Error) -> Error {
    if err.is_permanent() {
        Error::CommandFailed {
            operation: "send",
            reply: err.to_string(),
        }
    } else if err.is_transient() {
        Error::CommandErrored {
            operation: "send",
            reply: err.to_string(),
        }
    } else {
        Error::SmtpTransport { source: err }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|_| Error::InvalidEmailFormat {
        email: address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> WatchConfig {
        WatchConfig::builder()
            .host("mail.example.com")
            .user("watcher@example.com")
            .password("secret")
            .mailbox("INBOX")
            .pattern(r"INVOICE #\d+")
            .recipient("alerts@example.com")
            .build()
            .unwrap()
    }

    #[test]
    fn test_template_parse_subject_and_body() {
        let template =
            NotificationTemplate::parse("Matches found\nA PDF matched the pattern.\nCheck the inbox.");
        assert_eq!(template.subject(), "Matches found");
        assert_eq!(template.body(), "A PDF matched the pattern.\nCheck the inbox.");
    }

    #[test]
    fn test_template_parse_subject_only() {
        let template = NotificationTemplate::parse("Just a subject");
        assert_eq!(template.subject(), "Just a subject");
        assert_eq!(template.body(), "");
    }

    #[test]
    fn test_template_parse_crlf() {
        let template = NotificationTemplate::parse("Subject\r\nBody line");
        assert_eq!(template.subject(), "Subject");
        assert_eq!(template.body(), "Body line");
    }

    #[test]
    fn test_template_load_missing_file_is_config_error() {
        let result = NotificationTemplate::load(Path::new("/nonexistent/alert.txt"));
        assert!(matches!(result, Err(Error::TemplateRead { .. })));
    }

    #[test]
    fn test_template_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Alert subject\nAlert body line 1\nAlert body line 2").unwrap();

        let template = NotificationTemplate::load(file.path()).unwrap();
        assert_eq!(template.subject(), "Alert subject");
        assert_eq!(template.body(), "Alert body line 1\nAlert body line 2");
    }

    #[test]
    fn test_build_notification_headers_and_body() {
        let config = test_config();
        let template = NotificationTemplate::parse("Matches found\nSee attached report.");
        let message = build_notification(&config, &template).unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Matches found"));
        assert!(formatted.contains("From: watcher@example.com"));
        assert!(formatted.contains("To: alerts@example.com"));
        assert!(formatted.contains("See attached report."));
    }
}

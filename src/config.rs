//! Configuration for the watch pipeline.
//!
//! All configuration is read exactly once, at process start, into a
//! [`WatchConfig`] that is passed by reference into every component. Use
//! [`WatchConfig::from_env`] in the binary, or [`WatchConfigBuilder`] for
//! programmatic construction:
//!
//! ```
//! use pdfwatch::WatchConfig;
//!
//! let config = WatchConfig::builder()
//!     .host("mail.example.com")
//!     .user("watcher@example.com")
//!     .password("app-password")
//!     .mailbox("INBOX")
//!     .pattern(r"INVOICE #\d+")
//!     .recipient("alerts@example.com")
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use email_address::EmailAddress;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default IMAP search query: unread messages only.
pub const DEFAULT_SEARCH_QUERY: &str = "UNSEEN";

/// Default notification template path.
pub const DEFAULT_TEMPLATE_PATH: &str = "emailText.txt";

/// Configuration for one pipeline run.
///
/// Create using [`WatchConfig::builder()`] or [`WatchConfig::from_env()`].
///
/// Note: The `password` field is stored as a [`SecretString`] to prevent
/// accidental logging of sensitive credentials. The `user` and `recipient`
/// fields are stored as validated [`EmailAddress`] types, and the line
/// pattern is compiled at build time so an invalid regex is reported before
/// any network activity.
#[derive(Clone)]
pub struct WatchConfig {
    /// Mail server hostname, shared by the IMAP and SMTP sessions.
    host: String,
    /// Account address, used for login and as the notification sender.
    user: EmailAddress,
    /// Account password (protected from accidental logging).
    password: SecretString,
    /// Mailbox to select for the search.
    pub mailbox: String,
    /// IMAP search query selecting the messages to scan.
    pub search_query: String,
    /// Compiled line pattern.
    pattern: Regex,
    /// Notification recipient address.
    recipient: EmailAddress,
    /// Path to the notification template file.
    pub template_path: PathBuf,
    /// IMAP server port (default: 993 for IMAPS).
    pub imap_port: u16,
    /// SMTP submission port (default: 587 for STARTTLS).
    pub smtp_port: u16,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl std::fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchConfig")
            .field("host", &self.host)
            .field("user", &self.user.as_str())
            .field("password", &"[REDACTED]")
            .field("mailbox", &self.mailbox)
            .field("search_query", &self.search_query)
            .field("pattern", &self.pattern.as_str())
            .field("recipient", &self.recipient.as_str())
            .field("template_path", &self.template_path)
            .field("imap_port", &self.imap_port)
            .field("smtp_port", &self.smtp_port)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl WatchConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> WatchConfigBuilder {
        WatchConfigBuilder::default()
    }

    /// Reads the configuration from the process environment.
    ///
    /// Required variables: `EMAIL_HOST`, `IMAP_PORT`, `SMTP_PORT`,
    /// `EMAIL_USER`, `EMAIL_PASSWD`, `EMAIL_INBOX`, `REGEX_PATTERN`,
    /// `EMAIL_RECIPIENT`. Optional: `EMAIL_TEMPLATE` (default
    /// `emailText.txt`) and `EMAIL_SEARCH` (default `UNSEEN`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEnv`] naming the first absent required
    /// variable, or the relevant configuration error for an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder()
            .host(require_env("EMAIL_HOST")?)
            .user(require_env("EMAIL_USER")?)
            .password(require_env("EMAIL_PASSWD")?)
            .mailbox(require_env("EMAIL_INBOX")?)
            .pattern(require_env("REGEX_PATTERN")?)
            .recipient(require_env("EMAIL_RECIPIENT")?)
            .imap_port(parse_port("IMAP_PORT", &require_env("IMAP_PORT")?)?)
            .smtp_port(parse_port("SMTP_PORT", &require_env("SMTP_PORT")?)?);

        if let Ok(path) = env::var("EMAIL_TEMPLATE") {
            builder = builder.template_path(path);
        }
        if let Ok(query) = env::var("EMAIL_SEARCH") {
            builder = builder.search_query(query);
        }

        builder.build()
    }

    /// Returns the mail server hostname.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the account address as a string slice.
    #[must_use]
    pub fn user(&self) -> &str {
        self.user.as_str()
    }

    /// Returns the password as a string slice.
    ///
    /// Use this method when you need to pass the password to authentication.
    /// The password is intentionally not directly accessible to prevent
    /// accidental logging.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Returns the notification recipient address as a string slice.
    #[must_use]
    pub fn recipient(&self) -> &str {
        self.recipient.as_str()
    }

    /// Returns the compiled line pattern.
    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns the full IMAP server address as "host:port".
    #[must_use]
    pub fn imap_address(&self) -> String {
        format!("{}:{}", self.host, self.imap_port)
    }
}

/// Timeout configuration for protocol operations.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing TCP/TLS connection.
    pub connect: Duration,
    /// Timeout for IMAP authentication.
    pub auth: Duration,
    /// Timeout for selecting a mailbox.
    pub select: Duration,
    /// Timeout for the mailbox search.
    pub search: Duration,
    /// Timeout for fetching message content.
    pub fetch: Duration,
    /// Timeout for closing the mailbox and logging out.
    pub logout: Duration,
    /// Timeout for the SMTP submission.
    pub smtp_send: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            auth: Duration::from_secs(30),
            select: Duration::from_secs(10),
            search: Duration::from_secs(10),
            fetch: Duration::from_secs(60),
            logout: Duration::from_secs(5),
            smtp_send: Duration::from_secs(30),
        }
    }
}

fn require_env(name: &'static str) -> Result<String> {
    env::var(name).map_err(|_| Error::MissingEnv { name })
}

fn parse_port(name: &str, value: &str) -> Result<u16> {
    value.trim().parse().map_err(|_| Error::InvalidConfig {
        message: format!("{name} must be a TCP port number, got '{value}'"),
    })
}

/// Validates an email address format.
fn validate_email(email: &str) -> Result<EmailAddress> {
    EmailAddress::parse_with_options(email, email_address::Options::default()).map_err(|_| {
        Error::InvalidEmailFormat {
            email: email.to_string(),
        }
    })
}

/// Builder for [`WatchConfig`].
#[derive(Debug, Default)]
pub struct WatchConfigBuilder {
    host: Option<String>,
    user: Option<String>,
    password: Option<String>,
    mailbox: Option<String>,
    search_query: Option<String>,
    pattern: Option<String>,
    recipient: Option<String>,
    template_path: Option<PathBuf>,
    imap_port: Option<u16>,
    smtp_port: Option<u16>,
    timeouts: Option<TimeoutConfig>,
}

impl WatchConfigBuilder {
    /// Sets the mail server hostname (required).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the account address (required).
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the account password (required).
    ///
    /// For Gmail/Outlook, use an app-specific password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the mailbox to select (required).
    #[must_use]
    pub fn mailbox(mut self, mailbox: impl Into<String>) -> Self {
        self.mailbox = Some(mailbox.into());
        self
    }

    /// Sets the IMAP search query.
    ///
    /// Default is `UNSEEN`, which selects unread messages.
    #[must_use]
    pub fn search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Sets the line pattern (required).
    ///
    /// The pattern is compiled at [`build()`](Self::build) time; an invalid
    /// pattern is a configuration error.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the notification recipient address (required).
    #[must_use]
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Sets the notification template path.
    ///
    /// Default is `emailText.txt` in the working directory.
    #[must_use]
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Sets the IMAP server port. Default is 993 (IMAPS with TLS).
    #[must_use]
    pub fn imap_port(mut self, port: u16) -> Self {
        self.imap_port = Some(port);
        self
    }

    /// Sets the SMTP submission port. Default is 587 (STARTTLS).
    #[must_use]
    pub fn smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = Some(port);
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = timeout;
        self
    }

    /// Sets the message fetch timeout.
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .fetch = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, an address is not a
    /// valid email address, or the pattern is not a valid regex.
    pub fn build(self) -> Result<WatchConfig> {
        let host = self.host.ok_or_else(|| Error::InvalidConfig {
            message: "host is required".into(),
        })?;

        let user = validate_email(&self.user.ok_or_else(|| Error::InvalidConfig {
            message: "user is required".into(),
        })?)?;

        let password = self.password.ok_or_else(|| Error::InvalidConfig {
            message: "password is required".into(),
        })?;

        let mailbox = self.mailbox.ok_or_else(|| Error::InvalidConfig {
            message: "mailbox is required".into(),
        })?;

        let pattern_raw = self.pattern.ok_or_else(|| Error::InvalidConfig {
            message: "pattern is required".into(),
        })?;
        let pattern = Regex::new(&pattern_raw).map_err(|source| Error::InvalidPattern {
            pattern: pattern_raw,
            source,
        })?;

        let recipient = validate_email(&self.recipient.ok_or_else(|| Error::InvalidConfig {
            message: "recipient is required".into(),
        })?)?;

        Ok(WatchConfig {
            host,
            user,
            password: SecretString::from(password),
            mailbox,
            search_query: self
                .search_query
                .unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string()),
            pattern,
            recipient,
            template_path: self
                .template_path
                .unwrap_or_else(|| Path::new(DEFAULT_TEMPLATE_PATH).to_path_buf()),
            imap_port: self.imap_port.unwrap_or(993),
            smtp_port: self.smtp_port.unwrap_or(587),
            timeouts: self.timeouts.unwrap_or_default(),
        })
    }
}

//! Error types for the pdfwatch crate.
//!
//! All errors implement [`std::error::Error`] and carry the name of the
//! protocol operation that produced them where one exists. Errors are
//! categorized into the pipeline's failure taxonomy - see [`Error::category`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a pipeline run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration errors (raised before any network activity)
    // ─────────────────────────────────────────────────────────────────────────
    /// A required environment variable is not set.
    #[error("missing environment variable {name}")]
    MissingEnv {
        /// The variable name.
        name: &'static str,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid email address format.
    #[error("invalid email address: {email}")]
    InvalidEmailFormat {
        /// The invalid email address.
        email: String,
    },

    /// The configured line pattern is not a valid regular expression.
    #[error("invalid regex pattern '{pattern}'")]
    InvalidPattern {
        /// The pattern string that failed to compile.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The notification template file could not be read.
    #[error("failed to read notification template '{path}'")]
    TemplateRead {
        /// The template file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid DNS name for TLS.
    #[error("invalid DNS name for host '{host}'")]
    InvalidDnsName {
        /// The invalid hostname.
        host: String,
        /// The underlying DNS name error.
        #[source]
        source: rustls::client::InvalidDnsNameError,
    },

    /// The outbound notification could not be constructed.
    ///
    /// Every input to the message builder comes from configuration (the
    /// addresses and the template text), so this is a configuration error.
    #[error("failed to build notification email")]
    BuildMessage {
        /// The underlying message builder error.
        #[source]
        source: lettre::error::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors (connection-level, abort the current phase)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to establish TCP connection.
    #[error("failed to connect to {target}")]
    TcpConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to establish TLS connection.
    #[error("failed to establish TLS connection to {target}")]
    TlsConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Connection timeout.
    #[error("connection timeout to {target} after {timeout:?}")]
    ConnectTimeout {
        /// The target address.
        target: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// A protocol operation exceeded its configured timeout.
    #[error("{operation} timed out after {timeout:?}")]
    CommandTimeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// An IMAP operation failed below the protocol level (I/O, lost
    /// connection, unparseable server data).
    #[error("IMAP {operation} failed at the transport level")]
    ImapTransport {
        /// The operation that was in flight.
        operation: &'static str,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// The SMTP submission failed below the protocol level.
    #[error("SMTP transport failure")]
    SmtpTransport {
        /// The underlying SMTP error.
        #[source]
        source: lettre::transport::smtp::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Server command rejections (NO / permanent vs BAD / transient)
    // ─────────────────────────────────────────────────────────────────────────
    /// The server explicitly rejected an operation.
    ///
    /// For IMAP this is a `NO` response (bad credentials, nonexistent
    /// mailbox); for SMTP a permanent rejection.
    #[error("{operation} failed: {reply}")]
    CommandFailed {
        /// The operation the server rejected.
        operation: &'static str,
        /// The server's reply text.
        reply: String,
    },

    /// The server flagged an operation as malformed.
    ///
    /// For IMAP this is a `BAD` response; for SMTP a transient rejection.
    /// Same fatality as [`Error::CommandFailed`], distinguished for
    /// diagnostic clarity.
    #[error("{operation} errored: {reply}")]
    CommandErrored {
        /// The operation the server flagged.
        operation: &'static str,
        /// The server's reply text.
        reply: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Content errors (malformed mail or attachments)
    // ─────────────────────────────────────────────────────────────────────────
    /// A fetched message could not be parsed as MIME.
    #[error("failed to parse fetched message")]
    ParseMail {
        /// The underlying parse error.
        #[source]
        source: mailparse::MailParseError,
    },

    /// An attachment payload could not be transfer-decoded.
    #[error("failed to decode attachment payload")]
    DecodeAttachment {
        /// The underlying decode error.
        #[source]
        source: mailparse::MailParseError,
    },

    /// A PDF attachment could not be parsed or its text extracted.
    #[error("failed to extract text from PDF attachment")]
    ParsePdf {
        /// The underlying PDF error.
        #[source]
        source: lopdf::Error,
    },
}

impl Error {
    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingEnv { .. }
            | Error::InvalidConfig { .. }
            | Error::InvalidEmailFormat { .. }
            | Error::InvalidPattern { .. }
            | Error::TemplateRead { .. }
            | Error::InvalidDnsName { .. }
            | Error::BuildMessage { .. } => ErrorCategory::Configuration,

            Error::TcpConnect { .. }
            | Error::TlsConnect { .. }
            | Error::ConnectTimeout { .. }
            | Error::CommandTimeout { .. }
            | Error::ImapTransport { .. }
            | Error::SmtpTransport { .. } => ErrorCategory::Transport,

            Error::CommandFailed { .. } => ErrorCategory::CommandFailed,
            Error::CommandErrored { .. } => ErrorCategory::CommandErrored,

            Error::ParseMail { .. } | Error::DecodeAttachment { .. } => ErrorCategory::Decode,

            Error::ParsePdf { .. } => ErrorCategory::Parse,
        }
    }

    /// Returns the name of the protocol operation this error is attached to,
    /// if there is one.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Error::CommandTimeout { operation, .. }
            | Error::ImapTransport { operation, .. }
            | Error::CommandFailed { operation, .. }
            | Error::CommandErrored { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

/// Failure categories for the pipeline's error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid configuration; reported before network activity.
    Configuration,
    /// Connection, TLS, or timeout failures reaching a server.
    Transport,
    /// The server explicitly rejected a command.
    CommandFailed,
    /// The server flagged a command as malformed.
    CommandErrored,
    /// Malformed MIME structure or attachment transfer encoding.
    Decode,
    /// Corrupt PDF content.
    Parse,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::CommandFailed => write!(f, "command-failed"),
            ErrorCategory::CommandErrored => write!(f, "command-errored"),
            ErrorCategory::Decode => write!(f, "decode"),
            ErrorCategory::Parse => write!(f, "parse"),
        }
    }
}

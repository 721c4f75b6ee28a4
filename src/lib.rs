//! # pdfwatch
//!
//! One-shot email automation: fetch unread messages from an IMAP mailbox,
//! extract their PDF attachments, scan the extracted text for lines
//! matching a configured pattern, and send an SMTP notification when
//! anything matched.
//!
//! The pipeline is strictly linear - fetch, extract, match, notify - and
//! holds one protocol session at a time. It is intended to be run by an
//! external scheduler (cron, systemd timer); nothing is persisted between
//! runs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfwatch::WatchConfig;
//!
//! # async fn example() -> pdfwatch::Result<()> {
//! let config = WatchConfig::builder()
//!     .host("mail.example.com")
//!     .user("watcher@example.com")
//!     .password("app-password")
//!     .mailbox("INBOX")
//!     .pattern(r"INVOICE #\d+")
//!     .recipient("alerts@example.com")
//!     .build()?;
//!
//! let summary = pdfwatch::run(&config).await?;
//! println!(
//!     "{} messages, {} PDFs, {} matches, notified: {}",
//!     summary.messages, summary.documents, summary.matches, summary.notified
//! );
//! # Ok(())
//! # }
//! ```
//!
//! The binary reads the same configuration from the environment
//! (`EMAIL_HOST`, `IMAP_PORT`, `SMTP_PORT`, `EMAIL_USER`, `EMAIL_PASSWD`,
//! `EMAIL_INBOX`, `REGEX_PATTERN`, `EMAIL_RECIPIENT`, and optionally
//! `EMAIL_TEMPLATE` and `EMAIL_SEARCH`) via [`WatchConfig::from_env`].
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and carry the name of the
//! protocol operation that produced them. Server rejections are split into
//! command-failed (IMAP `NO`, permanent SMTP codes) and command-errored
//! (IMAP `BAD`, transient SMTP codes); see [`Error::category`]. Errors
//! propagate uncaught to the top level - there is no retry or backoff.
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. Protocol operations emit
//! spans with structured fields (`user`, `imap_addr`, `mailbox`, `query`,
//! `smtp_host`); the binary installs an env-filtered subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod attachments;
pub mod config;
pub mod error;
pub mod matcher;
pub mod notifier;
pub mod pipeline;
pub mod text;

// Internal modules
mod connection;
mod fetcher;
mod session;

// Re-exports for ergonomic API
pub use config::{TimeoutConfig, WatchConfig, WatchConfigBuilder};
pub use email_address::EmailAddress;
pub use error::{Error, ErrorCategory, Result};
pub use fetcher::{MailFetcher, Message};
pub use notifier::NotificationTemplate;
pub use pipeline::{run, RunSummary, ScanOutcome};
pub use text::DocumentText;

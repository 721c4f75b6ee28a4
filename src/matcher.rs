//! Line matching over extracted document text.
//!
//! This module provides a flexible [`LineMatcher`] trait with a regex
//! implementation, plus [`matching_lines`] which flattens per-document,
//! per-page line lists into the flat ordered match list the notifier
//! triggers on.
//!
//! # Example
//!
//! ```
//! use pdfwatch::matcher::{LineMatcher, RegexLineMatcher};
//!
//! let matcher = RegexLineMatcher::new(r"INVOICE #\d+").unwrap();
//! assert!(matcher.matches("re: INVOICE #4471 overdue"));
//! assert!(!matcher.matches("nothing to see"));
//! ```

use crate::text::DocumentText;
use regex::Regex;

/// Trait for deciding whether a line of extracted text is a match.
///
/// Matching uses search semantics: the pattern may match anywhere within
/// the line, not only at line start.
pub trait LineMatcher: Send + Sync {
    /// Returns `true` if the line matches.
    fn matches(&self, line: &str) -> bool;

    /// Returns a human-readable description of what this matcher looks for.
    ///
    /// Used in logging.
    fn description(&self) -> &str;
}

/// Regex-based line matcher.
#[derive(Debug, Clone)]
pub struct RegexLineMatcher {
    regex: Regex,
    description: String,
}

impl RegexLineMatcher {
    /// Creates a matcher from a pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self::from_regex(regex))
    }

    /// Creates a matcher from an already-compiled regex.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            description: format!("regex pattern: {}", regex.as_str()),
            regex,
        }
    }
}

impl LineMatcher for RegexLineMatcher {
    fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Matcher using a closure for custom logic.
///
/// # Example
///
/// ```
/// use pdfwatch::matcher::{ClosureLineMatcher, LineMatcher};
///
/// let matcher = ClosureLineMatcher::new(
///     |line| line.starts_with("TOTAL"),
///     "total line finder",
/// );
/// assert!(matcher.matches("TOTAL 42.00"));
/// ```
pub struct ClosureLineMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    matcher_fn: F,
    description: String,
}

impl<F> ClosureLineMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    /// Creates a new closure-based matcher.
    #[must_use]
    pub fn new(matcher_fn: F, description: impl Into<String>) -> Self {
        Self {
            matcher_fn,
            description: description.into(),
        }
    }
}

impl<F> LineMatcher for ClosureLineMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, line: &str) -> bool {
        (self.matcher_fn)(line)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<F> std::fmt::Debug for ClosureLineMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureLineMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Returns every line across all documents that the matcher accepts.
///
/// Order follows document order, then page order, then in-page line order.
/// No deduplication is performed.
#[must_use]
pub fn matching_lines(documents: &[DocumentText], matcher: &dyn LineMatcher) -> Vec<String> {
    documents
        .iter()
        .flat_map(DocumentText::lines)
        .filter(|line| matcher.matches(line))
        .map(str::to_string)
        .collect()
}

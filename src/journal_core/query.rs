//! Validated query inputs: limits, filters, export formats and search patterns.
//!
//! Every type here is checked once at construction so the store can rely on
//! it without re-validating.

use super::Entry;
use crate::errors::{AppError, AppResult};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// A positive cap on the number of entries a query returns.
///
/// # Examples
///
/// ```
/// use chronicle::journal_core::Limit;
///
/// assert_eq!(Limit::new(3).unwrap().get(), 3);
/// assert!(Limit::new(0).is_err());
/// assert!("-1".parse::<Limit>().is_err());
/// assert!("ten".parse::<Limit>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(NonZeroUsize);

impl Limit {
    /// Validates a raw limit.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when `raw` is zero or negative.
    pub fn new(raw: i64) -> AppResult<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Limit)
            .ok_or_else(invalid_limit)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl FromStr for Limit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse().map_err(|_| invalid_limit())?;
        Limit::new(raw)
    }
}

fn invalid_limit() -> AppError {
    AppError::Validation("limit must be a positive integer".to_string())
}

/// Output shape for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// A single JSON array of records.
    Json,
    /// One JSON record per line.
    Jsonl,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    /// Parses a format name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" => Ok(ExportFormat::Jsonl),
            _ => Err(AppError::Validation(format!(
                "Unknown export format '{}'. Use json or jsonl.",
                s
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Optional exact-match restrictions on kind and tag.
///
/// Both filters must hold when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub kind: Option<String>,
    pub tag: Option<String>,
}

impl EntryFilter {
    /// A filter that accepts every entry.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.kind.as_deref().map_or(true, |kind| entry.kind() == kind)
            && self.tag.as_deref().map_or(true, |tag| entry.has_tag(tag))
    }
}

/// A compiled, case-insensitive search query.
///
/// The query is first compiled as a regular expression. If that fails, the
/// escaped text is compiled instead so it matches literally.
///
/// # Examples
///
/// ```
/// use chronicle::journal_core::SearchPattern;
///
/// let pattern = SearchPattern::compile("ship|deploy").unwrap();
/// assert!(!pattern.is_literal());
///
/// let pattern = SearchPattern::compile("fix (broken").unwrap();
/// assert!(pattern.is_literal());
/// assert!(pattern.is_match("Need to FIX (broken) tests"));
///
/// assert!(SearchPattern::compile("   ").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
    literal: bool,
}

impl SearchPattern {
    /// Compiles a user query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the query is blank after trimming.
    pub fn compile(query: &str) -> AppResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("query cannot be empty".to_string()));
        }

        if let Ok(regex) = case_insensitive(query) {
            return Ok(SearchPattern {
                regex,
                literal: false,
            });
        }

        let regex = case_insensitive(&regex::escape(query)).map_err(|e| {
            AppError::Validation(format!("query cannot be compiled: {}", e))
        })?;
        Ok(SearchPattern {
            regex,
            literal: true,
        })
    }

    /// True when the query was not a valid regex and is matched literally.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches against the message, any tag, or any meta key or value.
    pub fn matches(&self, entry: &Entry) -> bool {
        self.is_match(entry.message())
            || entry.tags().iter().any(|tag| self.is_match(tag))
            || entry
                .meta()
                .iter()
                .any(|(key, value)| self.is_match(key) || self.is_match(value))
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

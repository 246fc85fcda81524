//! Core journal functionality without I/O operations.
//!
//! This module contains the pure logic for journal entries: construction from
//! user input, reconstruction from stored records, and the normalization and
//! validation rules both paths share. Nothing here touches the filesystem.

pub mod query;

use crate::constants::{META_PAIR_SEPARATOR, REQUIRED_RECORD_KEYS, TAG_SEPARATOR};
use crate::errors::{AppError, AppResult, CorruptionError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub use query::{EntryFilter, ExportFormat, Limit, SearchPattern};

/// Key-value metadata attached to an entry.
pub type Meta = BTreeMap<String, String>;

/// One immutable, validated journal item.
///
/// Entries are created either through [`Entry::build`] (fresh id, current time)
/// or through [`Entry::from_record`] when read back from storage. There are no
/// setters; once constructed an entry never changes.
///
/// # Examples
///
/// ```
/// use chronicle::journal_core::{Entry, Meta};
///
/// let entry = Entry::build("Ship it", "note", ["release,v1", "release"], Meta::new()).unwrap();
/// assert_eq!(entry.tags(), ["release", "v1"]);
/// assert_eq!(entry.kind(), "note");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: String,
    at: String,
    timestamp: DateTime<Utc>,
    kind: String,
    tags: Vec<String>,
    message: String,
    meta: Meta,
}

/// Plain serializable form of an [`Entry`].
///
/// Field order matches the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: String,
    pub at: String,
    pub kind: String,
    pub tags: Vec<String>,
    pub message: String,
    pub meta: Meta,
}

impl Entry {
    /// Builds a new entry from user input.
    ///
    /// A fresh UUID and the current UTC time are assigned. Tags go through
    /// [`normalize_tags`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `message` or `kind` is blank, or if a
    /// meta key is empty.
    pub fn build<I, S>(message: &str, kind: &str, tags: I, meta: Meta) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = Utc::now();
        Self::new(
            Uuid::new_v4().to_string(),
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            kind.to_string(),
            normalize_tags(tags),
            message.to_string(),
            meta,
        )
    }

    /// Reconstructs an entry from a deserialized record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Corruption` if any of the six required keys is absent,
    /// and `AppError::Validation` if a field has the wrong shape or breaks one of
    /// the rules enforced by [`Entry::build`].
    pub fn from_record(record: &Map<String, Value>) -> AppResult<Self> {
        let missing: Vec<String> = REQUIRED_RECORD_KEYS
            .iter()
            .filter(|key| !record.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CorruptionError::MissingFields { missing }.into());
        }

        let tags = match &record["tags"] {
            Value::Array(items) => items
                .iter()
                .map(|item| string_field("tags", item))
                .collect::<AppResult<Vec<_>>>()?,
            _ => return Err(AppError::Validation("tags must be a list".to_string())),
        };

        let meta = match &record["meta"] {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| -> AppResult<(String, String)> {
                    Ok((key.clone(), meta_value(key, value)?))
                })
                .collect::<AppResult<Meta>>()?,
            Value::Null => Meta::new(),
            _ => return Err(AppError::Validation("meta must be a mapping".to_string())),
        };

        Self::new(
            string_field("id", &record["id"])?,
            string_field("at", &record["at"])?,
            string_field("kind", &record["kind"])?,
            normalize_tags(tags),
            string_field("message", &record["message"])?,
            meta,
        )
    }

    fn new(
        id: String,
        at: String,
        kind: String,
        tags: Vec<String>,
        message: String,
        meta: Meta,
    ) -> AppResult<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&at)
            .map_err(|e| AppError::Validation(format!("invalid timestamp '{}': {}", at, e)))?
            .with_timezone(&Utc);

        if kind.trim().is_empty() {
            return Err(AppError::Validation("kind cannot be empty".to_string()));
        }
        if message.trim().is_empty() {
            return Err(AppError::Validation("message cannot be empty".to_string()));
        }
        if meta.keys().any(|key| key.is_empty()) {
            return Err(AppError::Validation(
                "meta keys cannot be empty".to_string(),
            ));
        }

        Ok(Entry {
            id,
            at,
            timestamp,
            kind,
            tags,
            message,
            meta,
        })
    }

    /// Produces the plain record with exactly the six stored fields.
    pub fn to_record(&self) -> EntryRecord {
        EntryRecord {
            id: self.id.clone(),
            at: self.at.clone(),
            kind: self.kind.clone(),
            tags: self.tags.clone(),
            message: self.message.clone(),
            meta: self.meta.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The timestamp exactly as stored.
    pub fn at(&self) -> &str {
        &self.at
    }

    /// The parsed UTC instant of [`Entry::at`].
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Normalized tags, sorted and unique.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Returns true if the entry carries `tag` exactly.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.binary_search_by(|t| t.as_str().cmp(tag)).is_ok()
    }
}

fn string_field(name: &str, value: &Value) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(AppError::Validation(format!("{} must be a string", name))),
    }
}

// Scalars are accepted and string-converted; nested values are not.
fn meta_value(key: &str, value: &Value) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(AppError::Validation(format!(
            "meta value for '{}' must be a string",
            key
        ))),
    }
}

/// Normalizes raw tag input.
///
/// Each raw tag may hold several comma-separated tags. Pieces are trimmed,
/// empty pieces dropped, duplicates removed, and the result sorted by byte
/// order. The output does not depend on input order.
///
/// # Examples
///
/// ```
/// use chronicle::journal_core::normalize_tags;
///
/// assert_eq!(normalize_tags(["b,a", "a"]), vec!["a", "b"]);
/// assert_eq!(normalize_tags(["a", "b,a"]), vec!["a", "b"]);
/// assert!(normalize_tags([" , "]).is_empty());
/// ```
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = tags
        .into_iter()
        .flat_map(|raw| {
            raw.as_ref()
                .split(TAG_SEPARATOR)
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Parses `KEY=VALUE` strings into a [`Meta`] map.
///
/// The pair is split on the first `=`, and both sides are trimmed. Later
/// duplicates overwrite earlier ones.
///
/// # Errors
///
/// Returns `AppError::Validation` if a pair has no `=` or an empty key.
///
/// # Examples
///
/// ```
/// use chronicle::journal_core::parse_meta_pairs;
///
/// let meta = parse_meta_pairs([" key = value ", "url=a=b"]).unwrap();
/// assert_eq!(meta["key"], "value");
/// assert_eq!(meta["url"], "a=b");
/// assert!(parse_meta_pairs(["novalue"]).is_err());
/// ```
pub fn parse_meta_pairs<I, S>(pairs: I) -> AppResult<Meta>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut meta = Meta::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once(META_PAIR_SEPARATOR)
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!("Invalid meta '{}'. Use key=value.", pair))
            })?;
        meta.insert(key.to_string(), value.to_string());
    }
    Ok(meta)
}

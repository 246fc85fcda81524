//! Constants used throughout the application.
//!
//! This module contains all constants used in the Chronicle application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "chronicle";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A personal journal of timestamped, tagged entries";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Log level used when `--verbose` is passed.
pub const VERBOSE_LOG_LEVEL: &str = "debug";
/// Default kind for new entries.
pub const DEFAULT_KIND: &str = "note";
/// Default timezone label written by `init`.
pub const DEFAULT_TIMEZONE: &str = "UTC";
/// Default number of entries shown by `list` and `search`.
pub const DEFAULT_QUERY_LIMIT: i64 = 50;
/// Default export format name.
pub const DEFAULT_EXPORT_FORMAT: &str = "json";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the journal directory.
pub const ENV_VAR_CHRONICLE_DIR: &str = "CHRONICLE_DIR";
/// Environment variable for selecting the log output format.
pub const ENV_VAR_CHRONICLE_LOG_FORMAT: &str = "CHRONICLE_LOG_FORMAT";
/// Standard environment variable for the log filter.
pub const ENV_VAR_RUST_LOG: &str = "RUST_LOG";
/// Default journal directory, relative to the user's home directory.
pub const DEFAULT_JOURNAL_DIR: &str = "~/.chronicle";

// File System Layout
/// Name of the persisted store configuration file.
pub const CONFIG_FILE_NAME: &str = "config.yml";
/// Name of the directory holding the monthly partitions.
pub const ENTRIES_DIR_NAME: &str = "entries";
/// Extension of partition files.
pub const PARTITION_FILE_EXTENSION: &str = "jsonl";
/// `chrono` format for partition file stems (UTC year-month).
pub const PARTITION_STEM_FORMAT: &str = "%Y-%m";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Record Shape
/// Keys every stored record must carry.
pub const REQUIRED_RECORD_KEYS: [&str; 6] = ["id", "at", "kind", "tags", "message", "meta"];
/// Separator used inside a single raw tag to carry several tags.
pub const TAG_SEPARATOR: char = ',';
/// Separator between key and value in a meta pair.
pub const META_PAIR_SEPARATOR: char = '=';

// Rendering
/// Placeholder printed when a query yields nothing.
pub const EMPTY_LISTING: &str = "(no entries)";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "chronicle";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

//! Configuration management for the chronicle application.
//!
//! Two kinds of configuration live here:
//!
//! - [`StoreConfig`]: the record persisted as `config.yml` at the journal root
//!   by `init`. Its presence marks a journal as initialized.
//! - [`Config`]: process-level settings resolved from CLI flags and
//!   environment variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `CHRONICLE_DIR`: Path to the journal directory (defaults to ~/.chronicle)
//! - `CHRONICLE_LOG_FORMAT`: `text` or `json` (defaults to text)
//! - `RUST_LOG`: tracing filter directives

use crate::constants::{
    DEFAULT_JOURNAL_DIR, DEFAULT_LOG_LEVEL, DEFAULT_TIMEZONE, ENV_VAR_CHRONICLE_DIR, ENV_VAR_CHRONICLE_LOG_FORMAT,
    LOG_FORMAT_JSON, LOG_FORMAT_TEXT, VERBOSE_LOG_LEVEL,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::debug;

/// Settings persisted at the journal root.
///
/// # Examples
///
/// ```
/// use chronicle::config::StoreConfig;
///
/// let config = StoreConfig::new("Europe/Berlin");
/// let yaml = config.to_yaml().unwrap();
/// assert!(yaml.contains("timezone: Europe/Berlin"));
/// assert_eq!(StoreConfig::from_yaml(&yaml).unwrap(), config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Free-form timezone label. Stored for the user; timestamps stay UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new(DEFAULT_TIMEZONE)
    }
}

impl StoreConfig {
    pub fn new(timezone: impl Into<String>) -> Self {
        StoreConfig {
            timezone: timezone.into(),
        }
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Parses a config document. An empty or null document is the default config.
    pub fn from_yaml(text: &str) -> AppResult<Self> {
        if text.trim().is_empty() {
            return Ok(StoreConfig::default());
        }
        serde_yaml::from_str::<Option<StoreConfig>>(text)
            .map(Option::unwrap_or_default)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Reads the config file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> AppResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loaded store config from {:?}", path);
                Self::from_yaml(&text).map(Some)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the config file atomically.
    ///
    /// Content goes to a temporary file in the same directory, is synced, and
    /// is then renamed over `path`. Readers see either the old file or the new
    /// one, never a partial write. The temporary file is removed on failure.
    pub fn write_atomic(&self, path: &Path) -> AppResult<()> {
        let dir = path.parent().ok_or_else(|| {
            AppError::Config(format!("Config path has no parent: {}", path.display()))
        })?;
        let yaml = self.to_yaml()?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(yaml.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| AppError::Io(e.error))?;

        debug!("Wrote store config to {:?}", path);
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Invalid log format: {}. Use '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }
}

/// Process-level configuration.
///
/// # Examples
///
/// ```
/// use chronicle::config::{Config, LogFormat};
/// use std::path::PathBuf;
///
/// let config = Config {
///     journal_dir: PathBuf::from("/path/to/journal"),
///     log_format: LogFormat::Text,
///     log_level: "info".to_string(),
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// Root of the journal store.
    pub journal_dir: PathBuf,
    /// Log output format.
    pub log_format: LogFormat,
    /// Default filter level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("journal_dir", &"[REDACTED_PATH]")
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Resolves configuration from CLI overrides and the environment.
    ///
    /// The journal directory comes from `dir_override`, then `CHRONICLE_DIR`,
    /// then `~/.chronicle`. It is expanded with `shellexpand` and made absolute
    /// against the current directory. The log format comes from
    /// `log_format_override`, then `CHRONICLE_LOG_FORMAT`, then text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if path expansion fails, the path is empty,
    /// or the log format is unknown.
    pub fn load(
        dir_override: Option<&str>,
        log_format_override: Option<&str>,
        verbose: bool,
    ) -> AppResult<Self> {
        let dir_raw = match dir_override {
            Some(dir) => dir.to_string(),
            None => env::var(ENV_VAR_CHRONICLE_DIR)
                .unwrap_or_else(|_| DEFAULT_JOURNAL_DIR.to_string()),
        };
        let journal_dir = resolve_journal_dir(&dir_raw)?;

        let log_format = match log_format_override {
            Some(format) => format.parse()?,
            None => match env::var(ENV_VAR_CHRONICLE_LOG_FORMAT) {
                Ok(format) => format.parse()?,
                Err(_) => LogFormat::default(),
            },
        };

        let log_level = if verbose {
            VERBOSE_LOG_LEVEL
        } else {
            DEFAULT_LOG_LEVEL
        }
        .to_string();

        let config = Config {
            journal_dir,
            log_format,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the journal directory is empty or relative,
    /// or the log level is empty.
    pub fn validate(&self) -> AppResult<()> {
        if self.journal_dir.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Journal directory path is empty".to_string(),
            ));
        }

        if !self.journal_dir.is_absolute() {
            return Err(AppError::Config(
                "Journal directory must be an absolute path".to_string(),
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err(AppError::Config("Log level is empty".to_string()));
        }

        Ok(())
    }
}

fn resolve_journal_dir(raw: &str) -> AppResult<PathBuf> {
    if raw.trim().is_empty() {
        return Err(AppError::Config(
            "Journal directory path is empty".to_string(),
        ));
    }

    // Expand the path (handles ~ and environment variables)
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    let path = PathBuf::from(expanded.into_owned());

    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

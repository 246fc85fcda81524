//! Journal I/O operations and file management.
//!
//! This module owns the on-disk layout of a journal:
//!
//! ```text
//! <root>/config.yml                 # persisted StoreConfig
//! <root>/entries/<YYYY-MM>.jsonl    # one encoded entry per line
//! ```
//!
//! Entries are appended to the partition named after their UTC year-month.
//! Reads walk partitions newest-first and lines within a partition
//! last-written-first, producing entries lazily so a limit stops the walk
//! early.

use crate::codec;
use crate::config::StoreConfig;
use crate::constants::{
    CONFIG_FILE_NAME, ENTRIES_DIR_NAME, PARTITION_FILE_EXTENSION, PARTITION_STEM_FORMAT,
};
use crate::errors::{AppError, AppResult, CorruptionError, LockError};
use crate::journal_core::{Entry, EntryFilter, ExportFormat, Limit, SearchPattern};
use fs2::FileExt;
use once_cell::unsync::OnceCell;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// A file-backed, month-partitioned journal.
///
/// # Examples
///
/// ```no_run
/// use chronicle::journal_core::{Entry, EntryFilter, Limit, Meta};
/// use chronicle::journal_io::Store;
///
/// let mut store = Store::new("/path/to/journal");
/// store.init("UTC")?;
/// store.append(&Entry::build("Ship it", "note", ["release"], Meta::new())?)?;
///
/// let hits = store.search("ship", Some(Limit::new(10)?), &EntryFilter::any())?;
/// assert_eq!(hits.len(), 1);
/// # Ok::<(), chronicle::AppError>(())
/// ```
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    config: OnceCell<StoreConfig>,
}

impl Store {
    /// Creates a handle on the journal at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Store {
            root: root.into(),
            config: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR_NAME)
    }

    fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Path of the partition file that holds `entry`.
    pub fn partition_path_for(&self, entry: &Entry) -> PathBuf {
        let stem = entry.timestamp().format(PARTITION_STEM_FORMAT);
        self.entries_dir()
            .join(format!("{}.{}", stem, PARTITION_FILE_EXTENSION))
    }

    /// Initializes the journal.
    ///
    /// Creates the root and entries directories if absent and (re)writes the
    /// config atomically. Existing entries are never touched, so running it
    /// again only replaces the config.
    pub fn init(&mut self, timezone: &str) -> AppResult<()> {
        ensure_directory_exists(&self.root)?;
        ensure_directory_exists(&self.entries_dir())?;

        let config = StoreConfig::new(timezone);
        config.write_atomic(&self.config_path())?;
        self.config = OnceCell::with_value(config);

        info!(timezone, "Initialized journal");
        Ok(())
    }

    /// Returns the store config, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotInitialized` if the config file does not exist.
    pub fn config(&self) -> AppResult<&StoreConfig> {
        self.config.get_or_try_init(|| {
            StoreConfig::read(&self.config_path())?.ok_or_else(|| AppError::NotInitialized {
                root: self.root.clone(),
            })
        })
    }

    fn ensure_initialized(&self) -> AppResult<()> {
        self.config()?;
        ensure_directory_exists(&self.entries_dir())
    }

    /// Appends an entry to its month partition.
    ///
    /// The encoded line is written with a single `write_all` under an
    /// exclusive lock on the partition file and synced to disk before
    /// returning.
    ///
    /// # Errors
    ///
    /// - `AppError::NotInitialized` if `init` has not run.
    /// - `AppError::Lock` if the partition cannot be locked.
    /// - `AppError::Io` on write or sync failures.
    pub fn append(&self, entry: &Entry) -> AppResult<()> {
        self.ensure_initialized()?;

        let path = self.partition_path_for(entry);
        let line = codec::encode_line(entry)?;
        let mut file = open_partition_for_append(&path)?;

        file.lock_exclusive()
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.clone(),
                source,
            })?;
        let written = file
            .write_all(line.as_bytes())
            .and_then(|_| file.sync_all());
        let unlocked = file.unlock().map_err(|source| LockError::ReleaseFailed {
            path: path.clone(),
            source,
        });
        written?;
        unlocked?;

        info!(entry_id = entry.id(), partition = ?path, "Appended entry");
        Ok(())
    }

    /// Lazily walks every stored entry, newest first.
    ///
    /// Each call starts a fresh walk. Partitions are listed up front; lines
    /// are read one partition at a time.
    pub fn entries(&self) -> AppResult<Entries> {
        self.ensure_initialized()?;
        Ok(Entries::new(list_partitions(&self.entries_dir())?))
    }

    /// Returns entries newest first, filtered, then capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotInitialized` before `init`, or the first
    /// corruption error met during the walk.
    pub fn list(&self, limit: Option<Limit>, filter: &EntryFilter) -> AppResult<Vec<Entry>> {
        collect_matching(self.entries()?, limit, |entry| filter.matches(entry))
    }

    /// Like [`Store::list`], keeping only entries matched by `query`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank query, plus the errors of
    /// [`Store::list`].
    pub fn search(
        &self,
        query: &str,
        limit: Option<Limit>,
        filter: &EntryFilter,
    ) -> AppResult<Vec<Entry>> {
        self.ensure_initialized()?;
        let pattern = SearchPattern::compile(query)?;
        debug!(literal = pattern.is_literal(), "Compiled search pattern");

        collect_matching(self.entries()?, limit, |entry| {
            filter.matches(entry) && pattern.matches(entry)
        })
    }

    /// Serializes entries newest first in the requested format.
    pub fn export(&self, format: ExportFormat, limit: Option<Limit>) -> AppResult<String> {
        let entries = self.list(limit, &EntryFilter::any())?;
        debug!(%format, count = entries.len(), "Exporting entries");

        match format {
            ExportFormat::Json => {
                let records: Vec<_> = entries.iter().map(Entry::to_record).collect();
                Ok(serde_json::to_string(&records)?)
            }
            ExportFormat::Jsonl => entries.iter().map(codec::encode_line).collect(),
        }
    }
}

fn collect_matching<F>(entries: Entries, limit: Option<Limit>, mut keep: F) -> AppResult<Vec<Entry>>
where
    F: FnMut(&Entry) -> bool,
{
    let cap = limit.map(Limit::get);
    let mut matched = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !keep(&entry) {
            continue;
        }
        matched.push(entry);
        if Some(matched.len()) == cap {
            break;
        }
    }
    Ok(matched)
}

/// Newest-first iterator over stored entries.
///
/// Yields `Err` for the first unreadable partition or undecodable line and
/// then stops.
#[derive(Debug)]
pub struct Entries {
    partitions: std::vec::IntoIter<PathBuf>,
    current: Option<Partition>,
    failed: bool,
}

#[derive(Debug)]
struct Partition {
    path: PathBuf,
    // (1-based line number, raw bytes), in reverse file order
    lines: std::vec::IntoIter<(usize, Vec<u8>)>,
}

impl Entries {
    fn new(partitions: Vec<PathBuf>) -> Self {
        Entries {
            partitions: partitions.into_iter(),
            current: None,
            failed: false,
        }
    }
}

impl Iterator for Entries {
    type Item = AppResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(partition) = self.current.as_mut() {
                for (number, raw) in partition.lines.by_ref() {
                    let decoded = match std::str::from_utf8(&raw) {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => codec::decode_line(line),
                        Err(source) => Err(CorruptionError::InvalidUtf8 {
                            path: None,
                            line: None,
                            source,
                        }
                        .into()),
                    };
                    let decoded = decoded.map_err(|e| match e {
                        AppError::Corruption(c) => {
                            AppError::Corruption(c.at_location(partition.path.clone(), number))
                        }
                        other => other,
                    });
                    if decoded.is_err() {
                        self.failed = true;
                    }
                    return Some(decoded);
                }
                self.current = None;
            }

            let path = self.partitions.next()?;
            debug!("Reading partition {:?}", path);
            match read_partition(&path) {
                Ok(partition) => self.current = Some(partition),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn read_partition(path: &Path) -> AppResult<Partition> {
    let content = fs::read(path)?;
    let mut lines: Vec<(usize, Vec<u8>)> = content
        .split(|byte| *byte == b'\n')
        .enumerate()
        .map(|(index, line)| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            (index + 1, line.to_vec())
        })
        .collect();
    lines.reverse();

    Ok(Partition {
        path: path.to_path_buf(),
        lines: lines.into_iter(),
    })
}

/// Partition files under `entries_dir`, newest month first.
///
/// A missing directory yields no partitions. Any other traversal failure,
/// including a partition link that cannot be resolved, is returned.
fn list_partitions(entries_dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !entries_dir.exists() {
        return Ok(Vec::new());
    }

    let mut partitions = Vec::new();
    for entry in WalkDir::new(entries_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path
                .extension()
                .map_or(false, |ext| ext == PARTITION_FILE_EXTENSION)
        {
            partitions.push(entry.into_path());
        }
    }

    partitions.sort();
    partitions.reverse();
    Ok(partitions)
}

/// Ensures a directory exists, creating it (and parents) if necessary.
///
/// Newly created directories get 0o700 permissions on Unix.
pub fn ensure_directory_exists(dir: &Path) -> AppResult<()> {
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", dir.display(), e),
        ))
    })?;

    #[cfg(unix)]
    {
        use crate::constants::DEFAULT_DIR_PERMISSIONS;
        fs::set_permissions(dir, fs::Permissions::from_mode(DEFAULT_DIR_PERMISSIONS))?;
        debug!("Set 0o700 permissions on {:?}", dir);
    }
    Ok(())
}

/// Opens a partition for appending, creating it with 0o600 permissions on Unix.
fn open_partition_for_append(path: &Path) -> AppResult<File> {
    if let Some(parent) = path.parent() {
        ensure_directory_exists(parent)?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use crate::constants::DEFAULT_FILE_PERMISSIONS;
        options.mode(DEFAULT_FILE_PERMISSIONS);
    }

    debug!("Opening partition {:?}", path);
    Ok(options.open(path)?)
}

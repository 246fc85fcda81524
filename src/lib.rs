/*!
# Chronicle

Chronicle is a personal journal for short, timestamped entries. Each entry has
a kind, a set of tags and free-form key-value metadata, and is appended to a
month-partitioned JSONL log on local disk.

## Core Features

- Append validated entries with durable, line-atomic writes
- List entries newest first, filtered by kind and tag
- Search message, tags and metadata with case-insensitive regex or literal text
- Export everything as a JSON array or as JSONL

## Architecture

The codebase follows a modular architecture with clear separation of concerns:

- `journal_core`: Entry construction, validation and query types (no I/O)
- `codec`: One-line JSON encoding of entries
- `journal_io`: The partitioned record store
- `config`: Persisted store config and process configuration
- `cli`: Command-line interface handling using clap
- `logging`: Tracing subscriber setup
- `errors`: Error handling infrastructure

## Usage Example

```rust,no_run
use chronicle::journal_core::{Entry, EntryFilter, Limit, Meta};
use chronicle::journal_io::Store;

fn main() -> chronicle::AppResult<()> {
    let mut store = Store::new("/path/to/journal");
    store.init("UTC")?;

    let entry = Entry::build("Refactor the parser", "task", ["dev"], Meta::new())?;
    store.append(&entry)?;

    for entry in store.list(Some(Limit::new(10)?), &EntryFilter::any().with_tag("dev"))? {
        println!("{} {}", entry.at(), entry.message());
    }
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Entry line encoding
pub mod codec;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Error types and utilities for error handling
pub mod errors;
/// Entry model and query types
pub mod journal_core;
/// Partitioned record store
pub mod journal_io;
/// Tracing setup
pub mod logging;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::{Config, StoreConfig};
pub use errors::{AppError, AppResult};
pub use journal_core::{Entry, EntryFilter, ExportFormat, Limit, Meta};
pub use journal_io::Store;

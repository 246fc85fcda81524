//! Command-line interface for chronicle.
//!
//! Parsing is done with clap derive. [`execute`] runs a parsed command against
//! a [`Store`] and returns the text to print, so commands can be exercised
//! without spawning a process.

use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_EXPORT_FORMAT, DEFAULT_KIND, DEFAULT_QUERY_LIMIT,
    DEFAULT_TIMEZONE, EMPTY_LISTING,
};
use crate::errors::{AppError, AppResult};
use crate::journal_core::{parse_meta_pairs, Entry, EntryFilter, ExportFormat, Limit};
use crate::journal_io::Store;
use clap::{Args, Parser, Subcommand};

/// A personal journal of timestamped, tagged entries
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Journal directory (default: $CHRONICLE_DIR or ~/.chronicle)
    #[clap(long, global = true, value_name = "PATH")]
    pub dir: Option<String>,

    /// Log output format: text or json
    #[clap(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Initialize a journal directory
    Init {
        /// Timezone label stored in config
        #[clap(long, default_value = DEFAULT_TIMEZONE)]
        timezone: String,
    },

    /// Add an entry
    Add {
        /// Entry text; words are joined with spaces
        message: Vec<String>,

        /// Entry kind
        #[clap(long, default_value = DEFAULT_KIND)]
        kind: String,

        /// Tag (repeatable, may hold comma-separated tags)
        #[clap(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Metadata as KEY=VALUE (repeatable)
        #[clap(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// List recent entries
    List(QueryArgs),

    /// Search entries by regex or literal text
    Search {
        /// Query; words are joined with spaces
        query: Vec<String>,

        #[clap(flatten)]
        filters: QueryArgs,
    },

    /// Export entries (json or jsonl)
    Export {
        /// json or jsonl
        #[clap(long, default_value = DEFAULT_EXPORT_FORMAT)]
        format: String,

        /// Limit entries
        #[clap(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
}

/// Options shared by `list` and `search`.
#[derive(Args, Debug, PartialEq, Eq)]
pub struct QueryArgs {
    /// Max entries
    #[clap(long, default_value_t = DEFAULT_QUERY_LIMIT, allow_negative_numbers = true)]
    pub limit: i64,

    /// Filter by kind
    #[clap(long)]
    pub kind: Option<String>,

    /// Filter by tag
    #[clap(long)]
    pub tag: Option<String>,

    /// Output as JSON
    #[clap(long)]
    pub json: bool,
}

impl QueryArgs {
    fn filter(&self) -> EntryFilter {
        EntryFilter {
            kind: self.kind.clone(),
            tag: self.tag.clone(),
        }
    }
}

/// Runs a command and returns what should be printed to stdout.
///
/// # Errors
///
/// Returns `AppError::Validation` for missing message or query text and
/// propagates every store error.
pub fn execute(command: &Command, store: &mut Store) -> AppResult<String> {
    match command {
        Command::Init { timezone } => {
            store.init(timezone)?;
            Ok(format!("Initialized journal at {}", store.root().display()))
        }
        Command::Add {
            message,
            kind,
            tags,
            meta,
        } => {
            let message = join_words(message, "MESSAGE")?;
            let entry = Entry::build(&message, kind, tags, parse_meta_pairs(meta)?)?;
            store.append(&entry)?;
            Ok(serde_json::to_string_pretty(&entry.to_record())?)
        }
        Command::List(args) => {
            let entries = store.list(Some(Limit::new(args.limit)?), &args.filter())?;
            render(&entries, args.json)
        }
        Command::Search { query, filters } => {
            let query = join_words(query, "QUERY")?;
            let entries = store.search(&query, Some(Limit::new(filters.limit)?), &filters.filter())?;
            render(&entries, filters.json)
        }
        Command::Export { format, limit } => {
            let format: ExportFormat = format.parse()?;
            let limit = limit.map(Limit::new).transpose()?;
            store.export(format, limit)
        }
    }
}

fn join_words(words: &[String], name: &str) -> AppResult<String> {
    let joined = words.join(" ").trim().to_string();
    if joined.is_empty() {
        return Err(AppError::Validation(format!("{} is required", name)));
    }
    Ok(joined)
}

fn render(entries: &[Entry], json: bool) -> AppResult<String> {
    if json {
        render_json(entries)
    } else {
        Ok(render_text(entries))
    }
}

/// Pretty JSON array of entry records.
pub fn render_json(entries: &[Entry]) -> AppResult<String> {
    let records: Vec<_> = entries.iter().map(Entry::to_record).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// One line per entry: `<at> <kind>[ [tags]] — <message>`.
pub fn render_text(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return EMPTY_LISTING.to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let tags = if entry.tags().is_empty() {
                String::new()
            } else {
                format!(" [{}]", entry.tags().join(","))
            };
            format!(
                "{} {}{} \u{2014} {}",
                entry.at(),
                entry.kind(),
                tags,
                entry.message()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

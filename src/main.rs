/*!
# Chronicle - A Personal Journal

Chronicle is a command-line tool for keeping a journal of short, timestamped
entries with kinds, tags and metadata.

This file contains the main application flow, coordinating the various components.

## Usage

```
chronicle <COMMAND> [OPTIONS]

Commands:
  init      Initialize a journal directory
  add       Add an entry
  list      List recent entries
  search    Search entries
  export    Export entries (json or jsonl)

Options:
      --dir <PATH>            Journal directory (default: $CHRONICLE_DIR or ~/.chronicle)
      --log-format <FORMAT>   Log output format: text or json
  -v, --verbose               Print verbose output
  -h, --help                  Print help information
  -V, --version               Print version information
```
*/

use chronicle::cli::{self, CliArgs};
use chronicle::config::Config;
use chronicle::constants::{TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use chronicle::errors::AppResult;
use chronicle::journal_io::Store;
use chronicle::logging;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info_span};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Runs one invocation.
///
/// 1. Loads configuration from flags and environment
/// 2. Initializes logging
/// 3. Executes the command against the journal store
/// 4. Prints the command output
fn run(args: CliArgs) -> AppResult<()> {
    let config = Config::load(args.dir.as_deref(), args.log_format.as_deref(), args.verbose)?;
    logging::init_tracing(config.log_format, &config.log_level)?;

    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = span.enter();

    debug!("CLI arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    let mut store = Store::new(config.journal_dir);
    let output = cli::execute(&args.command, &mut store)?;
    if output.ends_with('\n') {
        print!("{}", output);
    } else {
        println!("{}", output);
    }
    Ok(())
}

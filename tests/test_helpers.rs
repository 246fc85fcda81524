#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

/// Creates a `Command` for the `chronicle` binary with a clean, non-interactive
/// environment pointed at `journal_dir`.
pub fn base_chronicle_command(journal_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chronicle").expect("chronicle binary not built");
    configure_chronicle_command(&mut cmd);
    cmd.env("CHRONICLE_DIR", journal_dir);
    cmd
}

/// Applies the standard non-interactive environment to an existing `Command`.
pub fn configure_chronicle_command(cmd: &mut Command) {
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    if let Ok(tmpdir) = std::env::var("TMPDIR") {
        cmd.env("TMPDIR", tmpdir);
    }
}

//! CLI entry point for the repo-local architecture lint.
//!
//! With no arguments the lint checks `client/` under the workspace root. A
//! single argument names a different client directory to check.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let client_dir = match client_dir(std::env::args_os().nth(1).map(PathBuf::from)) {
        Some(dir) => dir,
        None => {
            let _ = writeln!(
                io::stderr().lock(),
                "unable to locate workspace root (directory containing a workspace Cargo.toml)"
            );
            return ExitCode::FAILURE;
        }
    };
    match architecture_lint::lint_client_sources(&client_dir) {
        Ok(()) => {
            let _ = writeln!(
                io::stdout().lock(),
                "architecture lint passed for {}",
                client_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = writeln!(io::stderr().lock(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn client_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let candidates = [
        std::env::var_os("CARGO_WORKSPACE_DIR").map(PathBuf::from),
        std::env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    candidates
        .iter()
        .flatten()
        .find_map(|start| workspace_root(start))
        .map(|root| root.join("client"))
}

fn workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .is_ok_and(|contents| contents.contains("[workspace]"))
        })
        .map(Path::to_path_buf)
}

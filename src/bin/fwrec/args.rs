//! HexView-style command-line handling.
//!
//! Supports both `/` and `-` prefixes with `:` or `=` value separators.
//! Option matching is case-insensitive.
//!
//! Processing order:
//! 1. Parse arguments
//! 2. Load INI defaults (/P)
//! 3. Read and merge every input
//! 4. Compose the output format (/XI, /XS, /XA)
//! 5. Write to `-o` or stdout

mod error;
mod execute;
mod ini;
mod parse;
mod parse_util;
mod types;

use std::process::ExitCode;

pub use types::Args;

pub fn run() -> ExitCode {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref path) = args.error_log {
        let _ = std::fs::write(path, "");
    }

    if let Err(e) = args.execute() {
        tracing::debug!(error = %e, "conversion failed");
        if let Some(ref path) = args.error_log {
            let _ = std::fs::write(path, format!("{e}"));
        }
        if !args.silent {
            eprintln!("Error: {e}");
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

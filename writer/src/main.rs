//! `depset` entrypoint.
//!
//! Parses arguments, installs the logger, and maps the outcome of
//! [`commands::run`] to an exit code.

use clap::Parser;
use depset_writer::cli::Cli;
use depset_writer::commands;
use depset_writer::error::Result;
use std::error::Error as _;
use std::io::{self, Write};

/// Environment variable that overrides the level chosen by `-v`/`-q`.
const LOG_ENV: &str = "DEPSET_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    let run_result = commands::run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env(LOG_ENV)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format_args!("error: {err}"));
            let mut source = err.source();
            while let Some(cause) = source {
                write_stderr_line(stderr, format_args!("  caused by: {cause}"));
                source = cause.source();
            }
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

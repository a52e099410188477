//! CLI argument definitions for `depset`.
//!
//! Parsing lives here so the binary stays a thin wrapper around
//! [`commands::run`](crate::commands::run).

use crate::config::DepsetConfig;
use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;

/// Generate dependency manifests and nested-jar indexes for the runtime
/// loader.
#[derive(Parser, Debug)]
#[command(name = "depset")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Write a manifest from a resolution report:\n",
    "    $ depset write --report build/resolution.json\n\n",
    "  Write a manifest with relocation, using depset.toml for the rules:\n",
    "    $ depset write --report build/resolution.json \\\n",
    "        --relocation-report build/relocator.json\n\n",
    "  Stage nested jars:\n",
    "    $ depset nest --output-dir build/nested-jars libs/*.jar\n\n",
    "  Summarise an existing manifest:\n",
    "    $ depset inspect build/generated/depset/dependencies.txt",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Return the log level selected by `-v` and `-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use depset_writer::cli::Cli;
    /// use log::LevelFilter;
    ///
    /// let cli = Cli::parse_from(["depset", "-v", "inspect", "deps.txt"]);
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the dependency manifest.
    Write(WriteArgs),

    /// Copy nested jars into a staging directory and index them.
    Nest(NestArgs),

    /// Write only the nested-jar index.
    Index(IndexArgs),

    /// Parse a manifest and print a summary.
    Inspect(InspectArgs),
}

/// Arguments for the write command.
#[derive(Args, Debug, Clone, Default)]
pub struct WriteArgs {
    /// Resolution report of the application's runtime dependencies.
    #[arg(short, long, value_name = "FILE")]
    pub report: Utf8PathBuf,

    /// Resolution report of the relocator's dependencies.
    #[arg(long, value_name = "FILE")]
    pub relocation_report: Option<Utf8PathBuf>,

    /// Configuration file [default: depset.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory to write the manifest into.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// File name of the manifest.
    #[arg(long, value_name = "NAME")]
    pub output_file_name: Option<String>,

    /// Repository base URL, after those configured (can be repeated).
    #[arg(long = "repo", value_name = "URL")]
    pub repositories: Vec<String>,

    /// List direct dependencies only.
    #[arg(long)]
    pub no_transitive: bool,
}

impl WriteArgs {
    /// Overlay the command-line settings on `config`.
    ///
    /// Flags win over configured values; `--repo` entries are appended.
    ///
    /// # Examples
    ///
    /// ```
    /// use depset_writer::cli::WriteArgs;
    /// use depset_writer::config::DepsetConfig;
    ///
    /// let args = WriteArgs {
    ///     no_transitive: true,
    ///     ..WriteArgs::default()
    /// };
    /// let merged = args.apply(DepsetConfig::default());
    /// assert!(!merged.transitive);
    /// ```
    #[must_use]
    pub fn apply(&self, mut config: DepsetConfig) -> DepsetConfig {
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(name) = &self.output_file_name {
            config.output_file_name.clone_from(name);
        }
        if self.no_transitive {
            config.transitive = false;
        }
        config.repositories.extend(self.repositories.iter().cloned());
        config
    }
}

/// Arguments for the nest command.
#[derive(Args, Debug, Clone)]
pub struct NestArgs {
    /// Staging directory; its contents are replaced.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Configuration file [default: depset.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Jars to stage, in index order.
    #[arg(value_name = "FILE")]
    pub files: Vec<Utf8PathBuf>,
}

/// Arguments for the index command.
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Index file to write.
    #[arg(short, long, value_name = "FILE")]
    pub output: Utf8PathBuf,

    /// Jars to list, in index order.
    #[arg(value_name = "FILE")]
    pub files: Vec<Utf8PathBuf>,
}

/// Arguments for the inspect command.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Manifest to read.
    #[arg(value_name = "FILE")]
    pub manifest: Utf8PathBuf,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

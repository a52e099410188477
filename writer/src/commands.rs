//! Command dispatch for the `depset` binary.

use crate::cli::{Cli, Command, IndexArgs, InspectArgs, NestArgs, WriteArgs};
use crate::config::{CONFIG_FILE_NAME, DepsetConfig};
use crate::error::{GenerationError, Result};
use crate::manifest_parser::parse_manifest_file;
use crate::nested::{NestedJarStager, write_index};
use crate::pipeline::{GenerationRequest, generate};
use crate::report::ResolutionReport;
use crate::resolve::StreamingHasher;
use camino::Utf8Path;
use depset_common::digest::HashAlgorithm;
use log::debug;
use std::fmt;
use std::io::Write;

/// Run the command selected by `cli`, printing results to `out`.
///
/// # Errors
///
/// Returns the first error the command hits; nothing is retried.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Write(args) => write_manifest(args, out),
        Command::Nest(args) => nest(args, out),
        Command::Index(args) => index(args, out),
        Command::Inspect(args) => inspect(args, out),
    }
}

/// Load `path`, or `depset.toml` in the working directory when present, or
/// fall back to defaults.
fn load_config(path: Option<&Utf8Path>) -> Result<DepsetConfig> {
    let implicit = Utf8Path::new(CONFIG_FILE_NAME);
    match path {
        Some(path) => Ok(DepsetConfig::load(path)?),
        None if implicit.is_file() => {
            debug!("using {implicit}");
            Ok(DepsetConfig::load(implicit)?)
        }
        None => Ok(DepsetConfig::default()),
    }
}

fn write_manifest(args: &WriteArgs, out: &mut dyn Write) -> Result<()> {
    let config = args.apply(load_config(args.config.as_deref())?);
    config.validate()?;

    let relocation_report = args
        .relocation_report
        .as_deref()
        .map(ResolutionReport::load)
        .transpose()?;
    let request = GenerationRequest {
        report: ResolutionReport::load(&args.report)?,
        relocation_report,
        repositories: config.repository_urls()?,
        relocations: config.relocation.clone(),
        transitive: config.transitive,
        output_path: config.output_path(),
    };

    let summary = generate(&request, &StreamingHasher::new(HashAlgorithm::Sha256))?;
    write_line(
        out,
        format_args!(
            "wrote {} ({} dependencies, {} relocation rule(s))",
            summary.output_path, summary.dependencies, summary.relocation_rules
        ),
    );
    Ok(())
}

fn nest(args: &NestArgs, out: &mut dyn Write) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => load_config(args.config.as_deref())?.nested.output_dir,
    };
    let stager = NestedJarStager::new(output_dir);
    let index = stager.stage(&args.files)?;
    write_line(
        out,
        format_args!(
            "staged {} jar(s) in {}",
            index.names().len(),
            stager.output_dir()
        ),
    );
    Ok(())
}

fn index(args: &IndexArgs, out: &mut dyn Write) -> Result<()> {
    let index = write_index(&args.files, &args.output)?;
    write_line(
        out,
        format_args!("indexed {} jar(s) in {}", index.names().len(), args.output),
    );
    Ok(())
}

fn inspect(args: &InspectArgs, out: &mut dyn Write) -> Result<()> {
    let manifest =
        parse_manifest_file(&args.manifest).map_err(|source| GenerationError::Inspect {
            path: args.manifest.clone(),
            source,
        })?;
    write_line(out, &args.manifest);
    write_line(
        out,
        format_args!("  repositories: {}", manifest.repositories().len()),
    );
    for repository in manifest.repositories() {
        write_line(out, format_args!("    {repository}"));
    }
    write_line(
        out,
        format_args!("  dependencies: {}", manifest.dependencies().len()),
    );
    if manifest.has_relocation_section() {
        write_line(
            out,
            format_args!(
                "  relocation: {} dependencies, {} rule(s)",
                manifest.relocation_dependencies().len(),
                manifest.relocations().len()
            ),
        );
    } else {
        write_line(out, "  relocation: none");
    }
    Ok(())
}

fn write_line(out: &mut dyn Write, message: impl fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

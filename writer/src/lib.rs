//! Build-time half of depset.
//!
//! This crate turns a host build tool's resolution report into the text
//! manifest the runtime loader reads, and stages nested jars together with
//! their index. It backs the `depset` binary and can be driven directly from
//! build scripts or tests.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Command dispatch for the binary
//! - [`config`] - `depset.toml` loading and defaults
//! - [`error`] - Run-level error type
//! - [`graph`] - Dependency graph flattening
//! - [`manifest`] - Manifest assembly and encoding
//! - [`manifest_parser`] - Manifest decoding and validation
//! - [`nested`] - Nested-jar staging and indexing
//! - [`pipeline`] - One generation run, end to end
//! - [`relocation`] - Package relocation rules
//! - [`report`] - Resolution report loading
//! - [`resolve`] - Artifact resolution and hashing

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod manifest_parser;
pub mod nested;
pub mod pipeline;
pub mod relocation;
pub mod report;
pub mod resolve;

pub use error::{GenerationError, Result};
pub use manifest::{Manifest, ManifestBuilder, ManifestEntry};
pub use pipeline::{GenerationRequest, GenerationSummary, build_manifest, generate};

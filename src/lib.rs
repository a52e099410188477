//! depset: build-time dependency manifests for a runtime dependency loader.
//!
//! A project built with depset ships without its third-party jars. Instead it
//! carries a small text manifest naming every runtime dependency, the
//! repositories to fetch them from, their content hashes, and any package
//! relocations to apply. This crate re-exports the two halves of the
//! build-time tooling:
//!
//! - [`common`] - coordinates, artifact names, digests, and repository URLs
//! - [`writer`] - graph flattening, relocation rules, manifest encoding, and
//!   nested-jar indexing
//!
//! # Examples
//!
//! ```
//! use depset::common::{Coordinate, HexDigest};
//! use depset::writer::{Manifest, ManifestEntry};
//!
//! let entry = ManifestEntry::new(
//!     Coordinate::parse("g:a:1.0")?,
//!     HexDigest::try_from("a".repeat(64))?,
//! );
//! let manifest = Manifest::builder().dependency(entry).build()?;
//! assert!(manifest.encode().contains("g:a:1.0 aaaa"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use depset_common as common;
pub use depset_writer as writer;

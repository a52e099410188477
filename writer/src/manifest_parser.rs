//! Parsing manifests back from their text encoding.
//!
//! The parser is strict in the same places the runtime loader is: content
//! outside a section, a header inside a section, a stray `__end__`, and
//! unknown section names are all rejected. Entries pass through
//! [`ManifestBuilder`], so a parsed manifest obeys the same ordering and
//! uniqueness rules as a generated one.

use crate::manifest::{
    DEPS_SECTION, Manifest, ManifestBuilder, ManifestEntry, ManifestError, RELOCATION_DEP_PREFIX,
    RELOCATION_SECTION, REPOS_SECTION, SECTION_END,
};
use crate::relocation::Relocation;
use camino::{Utf8Path, Utf8PathBuf};
use depset_common::coordinate::Coordinate;
use depset_common::digest::{HashAlgorithm, HexDigest};
use depset_common::error::ModelError;
use depset_common::repository::RepositoryUrl;
use std::fs;
use thiserror::Error;

/// Errors arising from manifest parsing.
#[derive(Debug, Error)]
pub enum ManifestParseError {
    /// The manifest file could not be read.
    #[error("failed to read {path}")]
    Read {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `__end__` appeared outside a section.
    #[error("line {line}: section end without an open section")]
    UnexpectedEnd {
        /// 1-based line number.
        line: usize,
    },

    /// A section header appeared before the previous section was closed.
    #[error("line {line}: section \"{name}\" opened inside section \"{open}\"")]
    NestedSection {
        /// 1-based line number.
        line: usize,
        /// Name of the new section.
        name: String,
        /// Name of the section still open.
        open: &'static str,
    },

    /// A non-header line appeared outside a section.
    #[error("line {line}: content outside a section")]
    ContentOutsideSection {
        /// 1-based line number.
        line: usize,
    },

    /// A header names a section the format does not define.
    #[error("line {line}: unknown section \"{name}\"")]
    UnknownSection {
        /// 1-based line number.
        line: usize,
        /// The unrecognised name.
        name: String,
    },

    /// A section appeared twice or out of order.
    #[error("line {line}: section \"{name}\" is repeated or out of order")]
    SectionOrder {
        /// 1-based line number.
        line: usize,
        /// The misplaced section.
        name: &'static str,
    },

    /// The input ended while a section was open.
    #[error("section \"{name}\" is not terminated")]
    Unterminated {
        /// Name of the open section.
        name: &'static str,
    },

    /// A mandatory section is absent.
    #[error("missing section \"{name}\"")]
    MissingSection {
        /// Name of the absent section.
        name: &'static str,
    },

    /// A line inside a section could not be interpreted.
    #[error("line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A repository, coordinate, or hash failed validation.
    #[error("line {line}: invalid value")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// The validation failure.
        #[source]
        source: ModelError,
    },

    /// The entries do not form a valid manifest.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Result type alias using [`ManifestParseError`].
pub type Result<T> = std::result::Result<T, ManifestParseError>;

/// Sections in the order they must appear.
const SECTIONS: [&str; 3] = [REPOS_SECTION, DEPS_SECTION, RELOCATION_SECTION];

/// Number of leading [`SECTIONS`] every manifest must contain.
const MANDATORY_SECTIONS: usize = 2;

/// Parse manifest text.
///
/// # Errors
///
/// Returns a [`ManifestParseError`] describing the first structural or
/// validation problem, with its line number where one applies.
///
/// # Examples
///
/// ```
/// use depset_writer::manifest_parser::parse_manifest;
///
/// let text = "__repos__\nhttps://repo.example.com/\n__end__\n__deps__\n__end__\n";
/// let manifest = parse_manifest(text)?;
/// assert_eq!(manifest.repositories().len(), 1);
/// assert_eq!(manifest.encode(), text);
/// # Ok::<(), depset_writer::manifest_parser::ManifestParseError>(())
/// ```
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let mut builder = Manifest::builder();
    let mut open: Option<&'static str> = None;
    let mut next_section = 0;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw == SECTION_END {
            if open.take().is_none() {
                return Err(ManifestParseError::UnexpectedEnd { line });
            }
            continue;
        }
        if let Some(name) = section_header(raw) {
            if let Some(open) = open {
                return Err(ManifestParseError::NestedSection {
                    line,
                    name: name.to_owned(),
                    open,
                });
            }
            let (position, section) = SECTIONS
                .into_iter()
                .enumerate()
                .find(|(_, section)| *section == name)
                .ok_or_else(|| ManifestParseError::UnknownSection {
                    line,
                    name: name.to_owned(),
                })?;
            if position < next_section {
                return Err(ManifestParseError::SectionOrder {
                    line,
                    name: section,
                });
            }
            if let Some(name) = first_missing(next_section, position) {
                return Err(ManifestParseError::MissingSection { name });
            }
            next_section = position + 1;
            open = Some(section);
            continue;
        }
        builder = match open {
            None => return Err(ManifestParseError::ContentOutsideSection { line }),
            Some(REPOS_SECTION) => builder.repository(parse_repository(line, raw)?),
            Some(DEPS_SECTION) => builder.dependency(parse_entry(line, raw)?),
            Some(_) => match raw.strip_prefix(RELOCATION_DEP_PREFIX) {
                Some(entry) => builder.relocation_dependency(parse_entry(line, entry)?),
                None => builder.relocation(parse_rule(line, raw)?),
            },
        };
    }

    if let Some(name) = open {
        return Err(ManifestParseError::Unterminated { name });
    }
    if let Some(name) = first_missing(next_section, SECTIONS.len()) {
        return Err(ManifestParseError::MissingSection { name });
    }
    finish(builder)
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`ManifestParseError::Read`] if the file cannot be read, or any
/// error [`parse_manifest`] reports.
pub fn parse_manifest_file(path: &Utf8Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|source| ManifestParseError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_manifest(&text)
}

/// Return the first mandatory section skipped when jumping from
/// `next_section` to `position`.
fn first_missing(next_section: usize, position: usize) -> Option<&'static str> {
    SECTIONS
        .into_iter()
        .take(position.min(MANDATORY_SECTIONS))
        .nth(next_section)
}

fn finish(builder: ManifestBuilder) -> Result<Manifest> {
    Ok(builder.build()?)
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix("__")
        .and_then(|rest| rest.strip_suffix("__"))
        .filter(|name| !name.is_empty())
}

fn parse_repository(line: usize, raw: &str) -> Result<RepositoryUrl> {
    if !raw.ends_with('/') {
        return Err(ManifestParseError::MalformedLine {
            line,
            reason: format!("repository \"{raw}\" does not end with '/'"),
        });
    }
    RepositoryUrl::parse(raw).map_err(|source| ManifestParseError::InvalidValue { line, source })
}

fn parse_entry(line: usize, raw: &str) -> Result<ManifestEntry> {
    let (coordinate, hash) = raw
        .split_once(' ')
        .ok_or_else(|| ManifestParseError::MalformedLine {
            line,
            reason: format!("expected \"<coordinate> <hash>\", found \"{raw}\""),
        })?;
    let invalid = |source| ManifestParseError::InvalidValue { line, source };
    let coordinate = Coordinate::parse(coordinate).map_err(invalid)?;
    let hash = HexDigest::try_from(hash).map_err(invalid)?;
    if hash.algorithm() != HashAlgorithm::Sha256 {
        return Err(ManifestParseError::MalformedLine {
            line,
            reason: format!("{} hash for {coordinate}; expected SHA-256", hash.algorithm()),
        });
    }
    Ok(ManifestEntry::new(coordinate, hash))
}

fn parse_rule(line: usize, raw: &str) -> Result<Relocation> {
    let malformed = |reason: String| ManifestParseError::MalformedLine { line, reason };
    let mut tokens = raw.split(' ');
    let (Some(from), Some(to)) = (tokens.next(), tokens.next()) else {
        return Err(malformed(format!("expected \"<from> <to>\", found \"{raw}\"")));
    };
    let mut relocation = Relocation::new(from, to);
    for token in tokens {
        relocation = if let Some(glob) = token.strip_prefix(':') {
            relocation.include(glob)
        } else if let Some(glob) = token.strip_prefix('-') {
            relocation.exclude(glob)
        } else {
            return Err(malformed(format!(
                "filter \"{token}\" must start with ':' or '-'"
            )));
        };
    }
    relocation
        .validate()
        .map_err(|e| malformed(e.to_string()))?;
    Ok(relocation)
}

#[cfg(test)]
#[path = "manifest_parser_tests.rs"]
mod tests;

//! Streaming content digests for artifact files.
//!
//! Files are folded into a running digest in fixed-size chunks, so arbitrarily
//! large artifacts are hashed without being loaded into memory. Each thread
//! keeps one digest instance per algorithm and resets it before every use;
//! no digest state is ever shared between concurrent computations.

use super::error::{ModelError, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;
use sha2::digest::{Digest, FixedOutputReset, Reset};
use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Read buffer size used when folding a stream into a digest.
const CHUNK_SIZE: usize = 8192;

thread_local! {
    static SHA256_DIGEST: RefCell<Sha256> = RefCell::new(Sha256::new());
    static SHA1_DIGEST: RefCell<Sha1> = RefCell::new(Sha1::new());
}

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, the algorithm the runtime loader verifies against.
    #[default]
    Sha256,
    /// SHA-1, kept for legacy manifests.
    Sha1,
}

impl HashAlgorithm {
    /// Return the conventional algorithm name (`SHA-256`, `SHA-1`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha1 => "SHA-1",
        }
    }

    /// Return the width of a hex-encoded digest for this algorithm.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha1 => 40,
        }
    }

    /// Find the algorithm whose digests are `len` hex characters wide.
    #[must_use]
    pub const fn for_hex_len(len: usize) -> Option<Self> {
        match len {
            64 => Some(Self::Sha256),
            40 => Some(Self::Sha1),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            _ => Err(ModelError::UnsupportedAlgorithm {
                value: s.to_owned(),
            }),
        }
    }
}

/// A validated lowercase hex digest.
///
/// The width determines the algorithm: 64 characters for SHA-256 and 40
/// for SHA-1.
///
/// # Examples
///
/// ```
/// use depset_common::digest::{HashAlgorithm, HexDigest};
///
/// let digest = HexDigest::try_from("a".repeat(64))?;
/// assert_eq!(digest.algorithm(), HashAlgorithm::Sha256);
/// # Ok::<(), depset_common::error::ModelError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexDigest(String);

impl HexDigest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Return the algorithm implied by the digest width.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        // Width is checked on construction.
        HashAlgorithm::for_hex_len(self.0.len()).unwrap_or_default()
    }
}

impl TryFrom<&str> for HexDigest {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self> {
        validate_hex(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for HexDigest {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        validate_hex(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate that `value` is a lowercase hex digest of a supported width.
fn validate_hex(value: &str) -> Result<()> {
    if HashAlgorithm::for_hex_len(value.len()).is_none() {
        return Err(ModelError::InvalidDigest {
            reason: format!("expected 64 or 40 hex characters, got {}", value.len()),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ModelError::InvalidDigest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ModelError::InvalidDigest {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}

/// Compute the digest of the file at `path`.
///
/// # Errors
///
/// Returns any I/O error raised while opening or reading the file.
///
/// # Examples
///
/// ```no_run
/// use depset_common::digest::{HashAlgorithm, hash_file};
/// use std::path::Path;
///
/// let digest = hash_file(Path::new("lib/gson-2.10.1.jar"), HashAlgorithm::Sha256)?;
/// assert_eq!(digest.as_str().len(), 64);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> io::Result<HexDigest> {
    let mut file = File::open(path)?;
    let digest = hash_reader(&mut file, algorithm)?;
    trace!("{algorithm} {} = {digest}", path.display());
    Ok(digest)
}

/// Compute the digest of everything `reader` yields.
///
/// # Errors
///
/// Returns the first non-interrupt I/O error raised by `reader`.
///
/// # Examples
///
/// ```
/// use depset_common::digest::{HashAlgorithm, hash_reader};
///
/// let digest = hash_reader(&mut "abc".as_bytes(), HashAlgorithm::Sha1)?;
/// assert_eq!(digest.as_str(), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R, algorithm: HashAlgorithm) -> io::Result<HexDigest> {
    match algorithm {
        HashAlgorithm::Sha256 => SHA256_DIGEST.with(|cell| fold(&mut *cell.borrow_mut(), reader)),
        HashAlgorithm::Sha1 => SHA1_DIGEST.with(|cell| fold(&mut *cell.borrow_mut(), reader)),
    }
}

/// Reset `digest`, fold `reader` into it chunk by chunk, and render the
/// result as lowercase hex. The digest is left reset on success.
fn fold<D, R>(digest: &mut D, reader: &mut R) -> io::Result<HexDigest>
where
    D: Digest + FixedOutputReset + Reset,
    R: Read + ?Sized,
{
    Digest::reset(digest);
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let chunk = buffer
            .get(..bytes_read)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "reader overran buffer"))?;
        Digest::update(digest, chunk);
    }
    Ok(HexDigest(hex::encode(Digest::finalize_reset(digest))))
}

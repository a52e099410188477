//! Repository base URLs recorded in the manifest's `repos` section.

use super::error::{ModelError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Schemes the runtime loader can fetch from.
const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// An absolute `http` or `https` repository URL ending in `/`.
///
/// The trailing slash lets the loader append artifact paths directly.
///
/// # Examples
///
/// ```
/// use depset_common::repository::RepositoryUrl;
///
/// let repo = RepositoryUrl::parse("https://repo.maven.apache.org/maven2")?;
/// assert_eq!(repo.as_str(), "https://repo.maven.apache.org/maven2/");
/// # Ok::<(), depset_common::error::ModelError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryUrl(Url);

impl RepositoryUrl {
    /// Parse and normalize a repository URL.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRepository`] when the value is not an
    /// absolute URL or carries a query or fragment, and
    /// [`ModelError::UnsupportedRepositoryScheme`] when the scheme is not
    /// `http` or `https`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let mut url = Url::parse(trimmed).map_err(|e| ModelError::InvalidRepository {
            value: value.to_owned(),
            reason: e.to_string(),
        })?;

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(ModelError::UnsupportedRepositoryScheme {
                value: value.to_owned(),
                scheme: url.scheme().to_owned(),
            });
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ModelError::InvalidRepository {
                value: value.to_owned(),
                reason: "query strings and fragments are not allowed".to_owned(),
            });
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    /// Return the normalized URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Return the underlying URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepositoryUrl {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for RepositoryUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RepositoryUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

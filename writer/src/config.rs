//! `depset.toml` configuration.
//!
//! Every key is optional. Values left out fall back to the defaults the
//! build pipeline expects, so an empty file is a valid configuration.
//! Unknown keys are rejected to catch typos early.

use crate::relocation::Relocation;
use camino::{Utf8Path, Utf8PathBuf};
use depset_common::error::ModelError;
use depset_common::repository::RepositoryUrl;
use log::warn;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "depset.toml";

/// Errors arising from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}")]
    Read {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unexpected keys.
    #[error("invalid configuration")]
    Parse(#[from] toml::de::Error),

    /// A repository URL is malformed.
    #[error("invalid repository")]
    Repository(#[source] ModelError),

    /// The output file name is empty or contains a path separator.
    #[error("output_file_name \"{value}\" must be a plain file name")]
    InvalidOutputFileName {
        /// The rejected value.
        value: String,
    },
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for one manifest-generation run.
///
/// # Examples
///
/// ```
/// use depset_writer::config::DepsetConfig;
///
/// let config = DepsetConfig::from_toml_str("transitive = false\n")?;
/// assert!(!config.transitive);
/// assert_eq!(config.output_file_name, "dependencies.txt");
/// # Ok::<(), depset_writer::config::ConfigError>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DepsetConfig {
    /// Directory the manifest is written into.
    pub output_dir: Utf8PathBuf,
    /// File name of the manifest inside `output_dir`.
    pub output_file_name: String,
    /// Include transitive dependencies, not just direct ones.
    pub transitive: bool,
    /// Repository base URLs, in lookup order. Entries that are not
    /// `http` or `https` are skipped with a warning.
    pub repositories: Vec<String>,
    /// Relocation rules, in application order.
    pub relocation: Vec<Relocation>,
    /// Nested-jar staging settings.
    pub nested: NestedConfig,
}

impl DepsetConfig {
    const DEFAULT_OUTPUT_DIR: &'static str = "build/generated/depset";
    const DEFAULT_OUTPUT_FILE_NAME: &'static str = "dependencies.txt";

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys and
    /// [`ConfigError::InvalidOutputFileName`] for an unusable file name.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or any
    /// error [`Self::from_toml_str`] reports.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check values serde cannot validate on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOutputFileName`] when the output file
    /// name is blank or contains a path separator.
    pub fn validate(&self) -> Result<()> {
        let name = self.output_file_name.as_str();
        if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::InvalidOutputFileName {
                value: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Return the full manifest path.
    #[must_use]
    pub fn output_path(&self) -> Utf8PathBuf {
        self.output_dir.join(&self.output_file_name)
    }

    /// Return the usable repositories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Repository`] for a malformed URL.
    pub fn repository_urls(&self) -> Result<Vec<RepositoryUrl>> {
        supported_repositories(&self.repositories)
    }
}

impl Default for DepsetConfig {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from(Self::DEFAULT_OUTPUT_DIR),
            output_file_name: Self::DEFAULT_OUTPUT_FILE_NAME.to_owned(),
            transitive: true,
            repositories: Vec::new(),
            relocation: Vec::new(),
            nested: NestedConfig::default(),
        }
    }
}

/// Settings for nested-jar staging.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NestedConfig {
    /// Directory nested jars and their index are staged into.
    pub output_dir: Utf8PathBuf,
}

impl Default for NestedConfig {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("build/nested-jars"),
        }
    }
}

/// Parse repository URLs, skipping those the runtime loader cannot fetch
/// from.
///
/// # Errors
///
/// Returns [`ConfigError::Repository`] for a malformed URL.
pub fn supported_repositories<S: AsRef<str>>(raw: &[S]) -> Result<Vec<RepositoryUrl>> {
    let mut repositories = Vec::with_capacity(raw.len());
    for value in raw {
        match RepositoryUrl::parse(value.as_ref()) {
            Ok(url) => repositories.push(url),
            Err(ModelError::UnsupportedRepositoryScheme { value, scheme }) => {
                warn!("skipping repository {value}: {scheme} repositories are not supported");
            }
            Err(e) => return Err(ConfigError::Repository(e)),
        }
    }
    Ok(repositories)
}

//! Nested-jar staging and indexing.
//!
//! When dependencies must travel inside the shipped artifact, their files
//! are copied unchanged into a staging directory next to an `index.txt`
//! that lists each copied file name on its own line. The index is what the
//! runtime loader reads to discover the embedded jars.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::io;
use thiserror::Error;

/// File name of the index written into the staging directory.
pub const INDEX_FILE_NAME: &str = "index.txt";

/// Errors raised while staging or indexing nested jars.
#[derive(Debug, Error)]
pub enum NestedJarError {
    /// An input path has no file name component.
    #[error("{path} does not name a file")]
    MissingFileName {
        /// The offending path.
        path: Utf8PathBuf,
    },

    /// Two inputs share a file name and would overwrite each other.
    #[error("more than one input is named {name}")]
    DuplicateName {
        /// The repeated file name.
        name: String,
    },

    /// An input is named like the index file.
    #[error("{path} clashes with the reserved index name")]
    ReservedName {
        /// The offending path.
        path: Utf8PathBuf,
    },

    /// The staging directory could not be cleared or recreated.
    #[error("failed to prepare staging directory {path}")]
    Prepare {
        /// The staging directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file could not be copied into the staging directory.
    #[error("failed to copy {from} to {to}")]
    Copy {
        /// The source file.
        from: Utf8PathBuf,
        /// The destination file.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The index could not be written.
    #[error("failed to write index {path}")]
    WriteIndex {
        /// The index file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Result type alias using [`NestedJarError`].
pub type Result<T> = std::result::Result<T, NestedJarError>;

/// The ordered file names of a set of nested jars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedJarIndex {
    names: Vec<String>,
}

impl NestedJarIndex {
    /// Collect the file names of `files` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a path has no file name, two paths share a file
    /// name, or a file is named [`INDEX_FILE_NAME`].
    pub fn from_files(files: &[Utf8PathBuf]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(files.len());
        for path in files {
            let name = path
                .file_name()
                .ok_or_else(|| NestedJarError::MissingFileName { path: path.clone() })?;
            if name == INDEX_FILE_NAME {
                return Err(NestedJarError::ReservedName { path: path.clone() });
            }
            if !seen.insert(name) {
                return Err(NestedJarError::DuplicateName {
                    name: name.to_owned(),
                });
            }
            names.push(name.to_owned());
        }
        Ok(Self { names })
    }

    /// Return the file names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render the index: every name followed by a newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.names.iter().fold(String::new(), |mut text, name| {
            text.push_str(name);
            text.push('\n');
            text
        })
    }

    /// Write the rendered index to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`NestedJarError::WriteIndex`] if the file cannot be written.
    pub fn write_to(&self, path: &Utf8Path) -> Result<()> {
        let write_error = |source| NestedJarError::WriteIndex {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, self.render()).map_err(write_error)
    }
}

/// Copies nested jars into a dedicated staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedJarStager {
    output_dir: Utf8PathBuf,
}

impl NestedJarStager {
    /// Create a stager owning `output_dir`. Its contents are replaced on
    /// every [`stage`](Self::stage).
    #[must_use]
    pub const fn new(output_dir: Utf8PathBuf) -> Self {
        Self { output_dir }
    }

    /// Return the staging directory.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Return the path the index is written to.
    #[must_use]
    pub fn index_path(&self) -> Utf8PathBuf {
        self.output_dir.join(INDEX_FILE_NAME)
    }

    /// Clear the staging directory, copy every file into it, and write the
    /// index.
    ///
    /// Inputs are validated before anything on disk is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are invalid, the directory cannot be
    /// cleared or created, a file cannot be copied, or the index cannot be
    /// written.
    pub fn stage(&self, files: &[Utf8PathBuf]) -> Result<NestedJarIndex> {
        let index = NestedJarIndex::from_files(files)?;
        self.reset_output_dir()?;

        for (from, name) in files.iter().zip(index.names()) {
            let to = self.output_dir.join(name);
            fs::copy(from, &to).map_err(|source| NestedJarError::Copy {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            debug!("staged {from} as {to}");
        }

        index.write_to(&self.index_path())?;
        info!(
            "staged {} nested jar(s) in {}",
            index.names().len(),
            self.output_dir
        );
        Ok(index)
    }

    fn reset_output_dir(&self) -> Result<()> {
        let prepare_error = |source| NestedJarError::Prepare {
            path: self.output_dir.clone(),
            source,
        };
        match fs::remove_dir_all(&self.output_dir) {
            Ok(()) => debug!("cleared {}", self.output_dir),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(prepare_error(e)),
        }
        fs::create_dir_all(&self.output_dir).map_err(prepare_error)
    }
}

/// Write only the index of `files` to `output`, without copying anything.
///
/// # Errors
///
/// Returns an error if the inputs are invalid or the index cannot be
/// written.
///
/// # Examples
///
/// ```no_run
/// use camino::{Utf8Path, Utf8PathBuf};
/// use depset_writer::nested::write_index;
///
/// let files = vec![Utf8PathBuf::from("libs/gson-2.10.1.jar")];
/// let index = write_index(&files, Utf8Path::new("build/nested/index.txt"))?;
/// assert_eq!(index.render(), "gson-2.10.1.jar\n");
/// # Ok::<(), depset_writer::nested::NestedJarError>(())
/// ```
pub fn write_index(files: &[Utf8PathBuf], output: &Utf8Path) -> Result<NestedJarIndex> {
    let index = NestedJarIndex::from_files(files)?;
    index.write_to(output)?;
    info!("indexed {} nested jar(s) in {output}", index.names().len());
    Ok(index)
}

//! Maven-style dependency coordinates.
//!
//! A [`Coordinate`] renders canonically as
//! `group:artifactId:version[:classifier][@extension]`. The canonical form is
//! what the manifest records and what the runtime loader resolves against its
//! repositories, so it must round-trip through [`Coordinate::parse`].

use super::error::{ModelError, Result};
use std::fmt;
use std::str::FromStr;

/// Packaging type assumed when a coordinate carries no extension.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Characters that would make the canonical notation ambiguous.
const RESERVED: [char; 2] = [':', '@'];

/// Identifies a single artifact file of a dependency.
///
/// Blank classifiers and the default `jar` extension are normalized away on
/// construction, so two coordinates are equal exactly when their canonical
/// strings are equal.
///
/// # Examples
///
/// ```
/// use depset_common::coordinate::Coordinate;
///
/// let coordinate = Coordinate::new("com.example", "widget", "1.2.0")?
///     .with_classifier("linux")?
///     .with_extension("zip")?;
/// assert_eq!(coordinate.to_string(), "com.example:widget:1.2.0:linux@zip");
/// # Ok::<(), depset_common::error::ModelError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    group: String,
    artifact_id: String,
    version: String,
    classifier: Option<String>,
    extension: Option<String>,
}

impl Coordinate {
    /// Create a coordinate with no classifier and the default extension.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidCoordinatePart`] if any part is empty or
    /// contains whitespace, `:` or `@`.
    pub fn new(
        group: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let group = group.into();
        let artifact_id = artifact_id.into();
        let version = version.into();
        validate_part("group", &group)?;
        validate_part("artifactId", &artifact_id)?;
        validate_part("version", &version)?;
        Ok(Self {
            group,
            artifact_id,
            version,
            classifier: None,
            extension: None,
        })
    }

    /// Attach a classifier. A blank classifier clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidCoordinatePart`] if the classifier
    /// contains whitespace, `:` or `@`.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Result<Self> {
        let classifier = classifier.into();
        self.classifier = if classifier.trim().is_empty() {
            None
        } else {
            validate_part("classifier", &classifier)?;
            Some(classifier)
        };
        Ok(self)
    }

    /// Attach an extension. A blank value or `jar` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidCoordinatePart`] if the extension
    /// contains whitespace, `:` or `@`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Result<Self> {
        let extension = extension.into();
        self.extension = if extension.trim().is_empty() || extension == DEFAULT_EXTENSION {
            None
        } else {
            validate_part("extension", &extension)?;
            Some(extension)
        };
        Ok(self)
    }

    /// Parse a canonical notation back into a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedCoordinate`] when the notation does not
    /// have three or four `:`-separated parts or carries a blank classifier
    /// or `@` extension, and [`ModelError::InvalidCoordinatePart`] when a part is
    /// invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use depset_common::coordinate::Coordinate;
    ///
    /// let coordinate = Coordinate::parse("g:a:1.0@pom")?;
    /// assert_eq!(coordinate.extension(), Some("pom"));
    /// assert_eq!(coordinate.classifier(), None);
    /// # Ok::<(), depset_common::error::ModelError>(())
    /// ```
    pub fn parse(notation: &str) -> Result<Self> {
        let malformed = |reason: &str| ModelError::MalformedCoordinate {
            value: notation.to_owned(),
            reason: reason.to_owned(),
        };

        let (body, extension) = match notation.split_once('@') {
            Some((_, extension)) if extension.trim().is_empty() => {
                return Err(malformed("blank extension after '@'"));
            }
            Some((body, extension)) => (body, Some(extension)),
            None => (notation, None),
        };

        let parts: Vec<&str> = body.split(':').collect();
        let coordinate = match parts.as_slice() {
            [group, artifact_id, version] => Self::new(*group, *artifact_id, *version)?,
            [group, artifact_id, version, classifier] => {
                if classifier.trim().is_empty() {
                    return Err(malformed("blank classifier"));
                }
                Self::new(*group, *artifact_id, *version)?.with_classifier(*classifier)?
            }
            _ => {
                return Err(malformed(&format!(
                    "expected 3 or 4 ':'-separated parts, found {}",
                    parts.len()
                )));
            }
        };

        match extension {
            Some(extension) => coordinate.with_extension(extension),
            None => Ok(coordinate),
        }
    }

    /// Return the group identifier.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Return the artifact identifier.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Return the version as recorded in the manifest.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the classifier, if any.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Return the non-default extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Return the extension, falling back to [`DEFAULT_EXTENSION`].
    #[must_use]
    pub fn extension_or_default(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if let Some(extension) = &self.extension {
            write!(f, "@{extension}")?;
        }
        Ok(())
    }
}

impl FromStr for Coordinate {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Validate one coordinate part.
fn validate_part(field: &'static str, value: &str) -> Result<()> {
    let invalid = |reason: String| ModelError::InvalidCoordinatePart {
        field,
        value: value.to_owned(),
        reason,
    };
    if value.is_empty() {
        return Err(invalid("must not be empty".to_owned()));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| c.is_whitespace() || RESERVED.contains(c))
    {
        return Err(invalid(format!("contains reserved character {bad:?}")));
    }
    Ok(())
}

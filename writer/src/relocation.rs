//! Byte-code package relocation rules.
//!
//! A [`Relocation`] asks the runtime relocator to rename `from` to `to`,
//! optionally restricted by include and exclude globs. The manifest's
//! [`RelocationRegistry`] and the [`ShadeRules`] list of a shading step both
//! accept relocations through the [`Relocate`] trait, so a build script can
//! configure either one, or both, with the same calls.

use crate::manifest::{ManifestEntry, RELOCATION_DEP_PREFIX};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors raised when a relocation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelocationError {
    /// A package name is empty or contains whitespace.
    #[error("invalid {field} package \"{value}\": {reason}")]
    InvalidPackage {
        /// Which side of the relocation (`from` or `to`).
        field: &'static str,
        /// The rejected package name.
        value: String,
        /// Description of the validation failure.
        reason: &'static str,
    },

    /// An include or exclude glob is empty or contains whitespace.
    #[error("invalid {kind} glob \"{value}\": {reason}")]
    InvalidGlob {
        /// `include` or `exclude`.
        kind: &'static str,
        /// The rejected glob.
        value: String,
        /// Description of the validation failure.
        reason: &'static str,
    },

    /// No rule carries the requested identifier.
    #[error("no relocation rule with id {id}")]
    UnknownRule {
        /// The requested identifier.
        id: RuleId,
    },
}

/// Result type alias using [`RelocationError`].
pub type Result<T> = std::result::Result<T, RelocationError>;

/// A package relocation with optional class filters.
///
/// Globs are kept in sorted sets, so two relocations with the same filters
/// render identically whatever order the filters were added in.
///
/// # Examples
///
/// ```
/// use depset_writer::relocation::Relocation;
///
/// let relocation = Relocation::new("com.google.gson", "shaded.gson")
///     .include("com.google.gson.**")
///     .exclude("com.google.gson.internal.**");
/// assert_eq!(
///     relocation.to_string(),
///     "com.google.gson shaded.gson :com.google.gson.** -com.google.gson.internal.**",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Relocation {
    /// Package to rename.
    pub from: String,
    /// Replacement package.
    pub to: String,
    /// Only classes matching one of these globs are relocated.
    #[serde(default)]
    pub includes: BTreeSet<String>,
    /// Classes matching one of these globs are left alone.
    #[serde(default)]
    pub excludes: BTreeSet<String>,
}

impl Relocation {
    /// Create a relocation with no filters.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            includes: BTreeSet::new(),
            excludes: BTreeSet::new(),
        }
    }

    /// Add an include glob.
    #[must_use]
    pub fn include(mut self, glob: impl Into<String>) -> Self {
        self.includes.insert(glob.into());
        self
    }

    /// Add an exclude glob.
    #[must_use]
    pub fn exclude(mut self, glob: impl Into<String>) -> Self {
        self.excludes.insert(glob.into());
        self
    }

    /// Check package names and globs.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidPackage`] or
    /// [`RelocationError::InvalidGlob`] for empty values or values
    /// containing whitespace, which would corrupt the rule line. A `from`
    /// package equal to the relocator dependency marker is also rejected,
    /// as its rule line would read back as a dependency.
    pub fn validate(&self) -> Result<()> {
        if self.from == RELOCATION_DEP_PREFIX.trim_end() {
            return Err(RelocationError::InvalidPackage {
                field: "from",
                value: self.from.clone(),
                reason: "is reserved for relocator dependency lines",
            });
        }
        for (field, value) in [("from", &self.from), ("to", &self.to)] {
            if let Some(reason) = token_problem(value) {
                return Err(RelocationError::InvalidPackage {
                    field,
                    value: value.clone(),
                    reason,
                });
            }
        }
        let globs = self
            .includes
            .iter()
            .map(|glob| ("include", glob))
            .chain(self.excludes.iter().map(|glob| ("exclude", glob)));
        for (kind, glob) in globs {
            if let Some(reason) = token_problem(glob) {
                return Err(RelocationError::InvalidGlob {
                    kind,
                    value: glob.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Relocation {
    /// Render the manifest rule line, without the trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.to)?;
        for include in &self.includes {
            write!(f, " :{include}")?;
        }
        for exclude in &self.excludes {
            write!(f, " -{exclude}")?;
        }
        Ok(())
    }
}

fn token_problem(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("must not be empty")
    } else if value.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else {
        None
    }
}

/// Identifies a rule within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered relocation together with its creation sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRule {
    id: RuleId,
    relocation: Relocation,
}

impl RelocationRule {
    /// Return the rule's identifier.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Return the relocation.
    #[must_use]
    pub const fn relocation(&self) -> &Relocation {
        &self.relocation
    }

    /// Add an include glob to the registered rule.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidGlob`] for an empty glob or one
    /// containing whitespace.
    pub fn include(&mut self, glob: impl Into<String>) -> Result<&mut Self> {
        let glob = glob.into();
        check_glob("include", &glob)?;
        self.relocation.includes.insert(glob);
        Ok(self)
    }

    /// Add an exclude glob to the registered rule.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::InvalidGlob`] for an empty glob or one
    /// containing whitespace.
    pub fn exclude(&mut self, glob: impl Into<String>) -> Result<&mut Self> {
        let glob = glob.into();
        check_glob("exclude", &glob)?;
        self.relocation.excludes.insert(glob);
        Ok(self)
    }
}

fn check_glob(kind: &'static str, glob: &str) -> Result<()> {
    match token_problem(glob) {
        Some(reason) => Err(RelocationError::InvalidGlob {
            kind,
            value: glob.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Accepts package relocations.
pub trait Relocate {
    /// Register a pre-built `relocation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the relocation fails validation.
    fn add_relocation(&mut self, relocation: Relocation) -> Result<()>;

    /// Relocate `from` to `to`, restricted by include and exclude globs.
    ///
    /// # Errors
    ///
    /// Returns an error if the relocation fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use depset_writer::relocation::{Relocate, RelocationRegistry};
    ///
    /// let mut registry = RelocationRegistry::new();
    /// registry.relocate("com.foo", "shaded.com.foo", ["com.foo.api.*"], ["com.foo.api.Internal"])?;
    /// assert_eq!(
    ///     registry.rules()[0].relocation().to_string(),
    ///     "com.foo shaded.com.foo :com.foo.api.* -com.foo.api.Internal"
    /// );
    /// # Ok::<(), depset_writer::relocation::RelocationError>(())
    /// ```
    fn relocate<I, E>(&mut self, from: &str, to: &str, includes: I, excludes: E) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let relocation = includes
            .into_iter()
            .fold(Relocation::new(from, to), |relocation, glob| relocation.include(glob));
        let relocation = excludes
            .into_iter()
            .fold(relocation, |relocation, glob| relocation.exclude(glob));
        self.add_relocation(relocation)
    }
}

/// Relocation rules and relocator dependencies destined for the manifest.
///
/// Rules keep their registration order; no merging or conflict detection
/// takes place.
///
/// # Examples
///
/// ```
/// use depset_writer::relocation::{Relocation, RelocationRegistry};
///
/// let mut registry = RelocationRegistry::new();
/// registry
///     .add_rule(Relocation::new("com.foo", "shaded.com.foo"))?
///     .exclude("com.foo.api.*")?;
/// assert_eq!(registry.rules().len(), 1);
/// # Ok::<(), depset_writer::relocation::RelocationError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationRegistry {
    rules: Vec<RelocationRule>,
    next_id: u32,
    dependencies: Vec<ManifestEntry>,
}

impl RelocationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a rule, returning it for further filtering.
    ///
    /// # Errors
    ///
    /// Returns an error if the relocation fails validation.
    pub fn add_rule(&mut self, relocation: Relocation) -> Result<&mut RelocationRule> {
        relocation.validate()?;
        let id = RuleId(self.next_id);
        self.next_id += 1;
        debug!("relocation #{id}: {relocation}");
        self.rules.push(RelocationRule { id, relocation });
        self.rules
            .last_mut()
            .ok_or(RelocationError::UnknownRule { id })
    }

    /// Look up a registered rule for modification.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::UnknownRule`] if no rule has `id`.
    pub fn rule_mut(&mut self, id: RuleId) -> Result<&mut RelocationRule> {
        self.rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or(RelocationError::UnknownRule { id })
    }

    /// Record a dependency of the relocator tool.
    pub fn add_dependency(&mut self, entry: ManifestEntry) {
        self.dependencies.push(entry);
    }

    /// Return the rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[RelocationRule] {
        &self.rules
    }

    /// Return the relocator dependencies in insertion order.
    #[must_use]
    pub fn dependencies(&self) -> &[ManifestEntry] {
        &self.dependencies
    }

    /// Return `true` when no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Relocate for RelocationRegistry {
    fn add_relocation(&mut self, relocation: Relocation) -> Result<()> {
        self.add_rule(relocation).map(|_| ())
    }
}

/// Relocations for a shading step that rewrites classes at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadeRules {
    relocations: Vec<Relocation>,
}

impl ShadeRules {
    /// Create an empty rule list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the relocations in registration order.
    #[must_use]
    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }
}

impl Relocate for ShadeRules {
    fn add_relocation(&mut self, relocation: Relocation) -> Result<()> {
        relocation.validate()?;
        self.relocations.push(relocation);
        Ok(())
    }
}

/// Something that can receive relocations.
#[derive(Debug)]
pub enum RelocationTarget<'a> {
    /// The manifest's registry; rules are applied by the runtime loader.
    Manifest(&'a mut RelocationRegistry),
    /// A shading step; rules are applied while building the artifact.
    Shade(&'a mut ShadeRules),
}

impl Relocate for RelocationTarget<'_> {
    fn add_relocation(&mut self, relocation: Relocation) -> Result<()> {
        match self {
            Self::Manifest(registry) => registry.add_relocation(relocation),
            Self::Shade(rules) => rules.add_relocation(relocation),
        }
    }
}

/// Relocate each package `pkg` in `packages` to `<prefix>.pkg`.
///
/// # Errors
///
/// Stops at the first relocation the target rejects.
///
/// # Examples
///
/// ```
/// use depset_writer::relocation::{RelocationRegistry, relocate_with_prefix};
///
/// let mut registry = RelocationRegistry::new();
/// relocate_with_prefix(&mut registry, "myplugin.libs", ["com.google.gson", "org.yaml"])?;
/// let lines: Vec<String> = registry
///     .rules()
///     .iter()
///     .map(|rule| rule.relocation().to_string())
///     .collect();
/// assert_eq!(lines, [
///     "com.google.gson myplugin.libs.com.google.gson",
///     "org.yaml myplugin.libs.org.yaml",
/// ]);
/// # Ok::<(), depset_writer::relocation::RelocationError>(())
/// ```
pub fn relocate_with_prefix<R, I, P>(target: &mut R, prefix: &str, packages: I) -> Result<()>
where
    R: Relocate + ?Sized,
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    for package in packages {
        let package = package.as_ref();
        target.add_relocation(Relocation::new(package, format!("{prefix}.{package}")))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "relocation_tests.rs"]
mod tests;

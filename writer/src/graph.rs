//! Dependency-graph flattening.
//!
//! A [`DependencyGraph`] holds the components the host build tool selected,
//! keyed by display name, together with the outgoing edges of each one.
//! [`DependencyGraph::flatten`] walks the graph from the root and returns
//! every reachable component exactly once, sorted by display name, so the
//! result is independent of traversal order.

use depset_common::component::ComponentId;
use log::{debug, trace};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Variant attribute carrying the category of a resolved dependency.
pub const CATEGORY_ATTRIBUTE: &str = "org.gradle.category";

/// Categories that only contribute version constraints and never files.
const CONSTRAINT_CATEGORIES: [&str; 2] = ["platform", "enforced-platform"];

/// Errors raised while building or flattening a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The host build tool could not resolve a requested dependency.
    #[error("could not resolve {requested} (required by {from}): {reason}")]
    Unresolved {
        /// Display name of the component declaring the dependency.
        from: String,
        /// The dependency as it was requested.
        requested: String,
        /// Failure reported by the resolver.
        reason: String,
    },

    /// An edge selects a component the graph does not contain.
    #[error("{from} depends on {selected}, which is missing from the graph")]
    MissingComponent {
        /// Display name of the component declaring the dependency.
        from: String,
        /// Display name of the selected but absent component.
        selected: String,
    },

    /// An edge was added from a component the graph does not contain.
    #[error("unknown component {name}")]
    UnknownComponent {
        /// The display name that could not be found.
        name: String,
    },
}

/// Result type alias using [`GraphError`].
pub type Result<T> = std::result::Result<T, GraphError>;

/// Where a dependency edge points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeTarget {
    /// The resolver selected the component with this display name.
    Resolved(String),
    /// The resolver failed to select a component.
    Unresolved {
        /// The dependency as it was requested.
        requested: String,
        /// Failure reported by the resolver.
        reason: String,
    },
}

/// A directed edge from one component to a dependency, with the attributes
/// of the variant the resolver picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// The selected component or the resolution failure.
    pub target: EdgeTarget,
    /// Variant attributes, such as [`CATEGORY_ATTRIBUTE`].
    pub attributes: BTreeMap<String, String>,
}

impl DependencyEdge {
    /// Create a resolved edge with no variant attributes.
    #[must_use]
    pub fn resolved(selected: impl Into<String>) -> Self {
        Self {
            target: EdgeTarget::Resolved(selected.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Create an edge the resolver failed to satisfy.
    #[must_use]
    pub fn unresolved(requested: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: EdgeTarget::Unresolved {
                requested: requested.into(),
                reason: reason.into(),
            },
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a variant attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Return `true` when the edge selects a platform (BOM) variant.
    #[must_use]
    pub fn is_platform(&self) -> bool {
        self.attributes
            .get(CATEGORY_ATTRIBUTE)
            .is_some_and(|category| CONSTRAINT_CATEGORIES.contains(&category.as_str()))
    }
}

/// A component and its outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// The component identifier.
    pub id: ComponentId,
    /// Outgoing dependency edges in declaration order.
    pub edges: Vec<DependencyEdge>,
}

/// A resolved dependency graph rooted at the component being built.
///
/// # Examples
///
/// ```
/// use depset_common::component::ComponentId;
/// use depset_writer::graph::{DependencyEdge, DependencyGraph};
///
/// let mut graph = DependencyGraph::new(ComponentId::new("com.example", "app", "1.0"));
/// graph.insert(ComponentId::new("g", "a", "1.0"));
/// graph.add_edge("com.example:app:1.0", DependencyEdge::resolved("g:a:1.0"))?;
///
/// let flattened = graph.flatten(true)?;
/// assert_eq!(flattened.len(), 1);
/// assert_eq!(flattened[0].display_name(), "g:a:1.0");
/// # Ok::<(), depset_writer::graph::GraphError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    root_name: String,
    root: GraphNode,
    nodes: BTreeMap<String, GraphNode>,
}

impl DependencyGraph {
    /// Create a graph containing only `root`.
    #[must_use]
    pub fn new(root: ComponentId) -> Self {
        Self {
            root_name: root.display_name(),
            root: GraphNode {
                id: root,
                edges: Vec::new(),
            },
            nodes: BTreeMap::new(),
        }
    }

    /// Add a component with no edges. An existing node with the same
    /// display name keeps its edges but takes the new identifier.
    pub fn insert(&mut self, id: ComponentId) {
        let name = id.display_name();
        match self.node_mut(&name) {
            Some(node) => node.id = id,
            None => {
                self.nodes.insert(
                    name,
                    GraphNode {
                        id,
                        edges: Vec::new(),
                    },
                );
            }
        }
    }

    /// Append an outgoing edge to the component named `from`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownComponent`] if `from` is not in the graph.
    pub fn add_edge(&mut self, from: &str, edge: DependencyEdge) -> Result<()> {
        let node = self
            .node_mut(from)
            .ok_or_else(|| GraphError::UnknownComponent {
                name: from.to_owned(),
            })?;
        node.edges.push(edge);
        Ok(())
    }

    /// Return the root component.
    #[must_use]
    pub const fn root(&self) -> &ComponentId {
        &self.root.id
    }

    /// Look up a component by display name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        if name == self.root_name {
            Some(&self.root)
        } else {
            self.nodes.get(name)
        }
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut GraphNode> {
        if name == self.root_name {
            Some(&mut self.root)
        } else {
            self.nodes.get_mut(name)
        }
    }

    /// Return the number of components, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() + 1
    }

    /// Return `true` when the graph holds nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Linearize the graph into the components the application needs.
    ///
    /// Walks depth-first from the root's direct edges. Platform edges are
    /// skipped together with everything beneath them. With `transitive`
    /// unset only the root's direct dependencies are visited. Each
    /// component appears once and the root never appears; the result is
    /// sorted by display name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Unresolved`] for a visited edge the resolver
    /// could not satisfy and [`GraphError::MissingComponent`] for an edge
    /// selecting a component absent from the graph.
    pub fn flatten(&self, transitive: bool) -> Result<Vec<ComponentId>> {
        let mut seen: HashSet<&str> = HashSet::from([self.root_name.as_str()]);
        let mut selected: Vec<&ComponentId> = Vec::new();
        let mut pending: Vec<&GraphNode> = vec![&self.root];

        while let Some(node) = pending.pop() {
            for edge in &node.edges {
                let name = match &edge.target {
                    EdgeTarget::Unresolved { requested, reason } => {
                        return Err(GraphError::Unresolved {
                            from: node.id.display_name(),
                            requested: requested.clone(),
                            reason: reason.clone(),
                        });
                    }
                    EdgeTarget::Resolved(name) => name,
                };
                if edge.is_platform() {
                    trace!("skipping platform {name}");
                    continue;
                }
                if !seen.insert(name.as_str()) {
                    continue;
                }
                let child = self
                    .nodes
                    .get(name)
                    .ok_or_else(|| GraphError::MissingComponent {
                        from: node.id.display_name(),
                        selected: name.clone(),
                    })?;
                trace!("{} -> {name}", node.id);
                selected.push(&child.id);
                if transitive {
                    pending.push(child);
                }
            }
        }

        let mut flattened: Vec<ComponentId> = selected.into_iter().cloned().collect();
        flattened.sort_by_cached_key(ComponentId::display_name);
        debug!(
            "flattened {} component(s) under {} (transitive: {transitive})",
            flattened.len(),
            self.root.id
        );
        Ok(flattened)
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;

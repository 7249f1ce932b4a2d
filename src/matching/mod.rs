//! Child matching between definitions and instances
//!
//! Matching pairs every distinct child declared by a definition element with
//! the instance children it describes:
//!
//! - [`harvest`] collects the declared children of a definition element,
//!   collapsing consecutive slices of one element into a single entry
//! - [`names`] decides whether a declared name describes an instance child
//! - [`match_children`] distributes the instance children over the declared
//!   children and reports what is left over
//!
//! Every instance child ends up in exactly one place: one correspondence or
//! the unmatched list.

pub mod harvest;
pub mod matcher;
pub mod names;

pub use harvest::harvest;
pub use matcher::{match_children, match_declared};
pub use names::{name_matches, NameRule};

use std::fmt;

/// A distinct child declared by a definition element
#[derive(Debug, Clone)]
pub struct DeclaredChild<C> {
    slot: usize,
    path_name: String,
    is_value_constraint: bool,
    cursor: C,
}

impl<C> DeclaredChild<C> {
    pub(crate) fn new(slot: usize, path_name: String, is_value_constraint: bool, cursor: C) -> Self {
        Self {
            slot,
            path_name,
            is_value_constraint,
            cursor,
        }
    }

    /// Position among the harvested declarations
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Declared name (last path segment)
    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    /// Whether this declaration is the scalar value of its parent
    pub fn is_value_constraint(&self) -> bool {
        self.is_value_constraint
    }

    /// Cursor positioned at the declaration
    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    /// Take the cursor positioned at the declaration
    pub fn into_cursor(self) -> C {
        self.cursor
    }
}

/// An instance child together with its position among its siblings
#[derive(Debug)]
pub struct InstanceChild<'a, N> {
    /// Position in the parent's child list
    pub position: usize,
    /// The child node
    pub node: &'a N,
}

impl<N> Clone for InstanceChild<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for InstanceChild<'_, N> {}

/// One entry of a correspondence
#[derive(Debug)]
pub enum InstanceRef<'a, N> {
    /// A child of the matched instance node
    Child(InstanceChild<'a, N>),
    /// The scalar value of the matched instance node itself
    Value(&'a N),
}

impl<N> Clone for InstanceRef<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for InstanceRef<'_, N> {}

impl<'a, N> InstanceRef<'a, N> {
    /// The referenced node; for a value entry, the parent node
    pub fn node(&self) -> &'a N {
        match self {
            InstanceRef::Child(child) => child.node,
            InstanceRef::Value(node) => node,
        }
    }

    /// Position among the parent's children, for child entries
    pub fn position(&self) -> Option<usize> {
        match self {
            InstanceRef::Child(child) => Some(child.position),
            InstanceRef::Value(_) => None,
        }
    }

    /// Whether this entry is the parent's scalar value
    pub fn is_value(&self) -> bool {
        matches!(self, InstanceRef::Value(_))
    }
}

/// A declared child and the instance data it describes
#[derive(Debug)]
pub struct Correspondence<'a, C, N> {
    /// The declaration
    pub declared: DeclaredChild<C>,
    /// Matching instance entries, in document order
    pub instances: Vec<InstanceRef<'a, N>>,
}

impl<C, N> Correspondence<'_, C, N> {
    /// Whether no instance data matched the declaration
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Outcome of matching one definition element against one instance node
#[derive(Debug)]
pub struct MatchResult<'a, C, N> {
    /// One correspondence per harvested declaration, in harvested order
    pub matches: Vec<Correspondence<'a, C, N>>,
    /// Instance children no declaration claimed, in document order
    pub unmatched: Vec<InstanceChild<'a, N>>,
}

impl<'a, C, N> MatchResult<'a, C, N> {
    /// First correspondence for a declared name
    pub fn get(&self, path_name: &str) -> Option<&Correspondence<'a, C, N>> {
        self.matches
            .iter()
            .find(|m| m.declared.path_name() == path_name)
    }

    /// Whether every instance child was claimed by a declaration
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Number of instance children claimed by declarations
    pub fn matched_children(&self) -> usize {
        self.matches
            .iter()
            .flat_map(|m| &m.instances)
            .filter(|r| !r.is_value())
            .count()
    }
}

impl<C, N> fmt::Display for MatchResult<'_, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} declarations, {} matched children, {} unmatched",
            self.matches.len(),
            self.matched_children(),
            self.unmatched.len()
        )
    }
}

//! Cursor navigation over structure definitions
//!
//! The matching core only needs a small set of cursor operations on the
//! definition side; they are captured by [`DefinitionCursor`].
//! [`ElementDefinitionNavigator`] implements them over a shared, immutable
//! [`StructureDefinition`], so copies of a navigator are just a reference
//! count and a position.

use crate::definitions::{ElementDefinition, StructureDefinition};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Cursor over the elements of a schema definition
///
/// A cursor is an exclusively owned, non-reentrant resource: moving it
/// while another operation holds one of its bookmarks is allowed, but two
/// threads must not move the same cursor.
pub trait DefinitionCursor: Sized {
    /// Opaque position marker
    type Bookmark;

    /// Name of the current element (last path segment)
    fn path_name(&self) -> &str;

    /// Whether the current element is the scalar value of its parent
    fn is_primitive_value_constraint(&self) -> bool;

    /// Move to the first child of the current element
    fn move_to_first_child(&mut self) -> bool;

    /// Move to the next sibling of the current element
    fn move_to_next(&mut self) -> bool;

    /// Take a marker for the current position
    fn bookmark(&self) -> Self::Bookmark;

    /// Return to a marked position
    fn return_to_bookmark(&mut self, bookmark: Self::Bookmark) -> Result<()>;

    /// Copy of this cursor with its own position
    fn shallow_copy(&self) -> Self;
}

/// Position marker of an [`ElementDefinitionNavigator`]
#[derive(Clone)]
pub struct Bookmark {
    definition: Arc<StructureDefinition>,
    position: usize,
}

impl fmt::Debug for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bookmark")
            .field("position", &self.position)
            .finish()
    }
}

impl Bookmark {
    /// Snapshot position this bookmark refers to
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Navigator over the snapshot of a structure definition
#[derive(Debug, Clone)]
pub struct ElementDefinitionNavigator {
    definition: Arc<StructureDefinition>,
    position: usize,
}

impl ElementDefinitionNavigator {
    /// Create a navigator positioned at the root element
    pub fn new(definition: Arc<StructureDefinition>) -> Self {
        Self {
            definition,
            position: 0,
        }
    }

    /// The definition being navigated
    pub fn definition(&self) -> &Arc<StructureDefinition> {
        &self.definition
    }

    /// Current element
    pub fn current(&self) -> &ElementDefinition {
        &self.definition.elements()[self.position]
    }

    /// Full path of the current element
    pub fn path(&self) -> &str {
        &self.current().path
    }

    /// Current snapshot position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to the first element with the given path
    pub fn move_to_path(&mut self, path: &str) -> bool {
        match self.definition.position_of(path) {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    /// Whether the current element has child elements
    pub fn has_children(&self) -> bool {
        self.first_child_position().is_some()
    }

    fn first_child_position(&self) -> Option<usize> {
        let current = self.current();
        let prefix = format!("{}.", current.path);
        let child_depth = current.depth() + 1;

        self.definition.elements()[self.position + 1..]
            .iter()
            .take_while(|e| e.path.starts_with(&prefix))
            .position(|e| e.depth() == child_depth)
            .map(|offset| self.position + 1 + offset)
    }

    fn next_sibling_position(&self) -> Option<usize> {
        let current = self.current();
        let (parent, _) = current.path.rsplit_once('.')?;
        let prefix = format!("{}.", parent);
        let depth = current.depth();

        self.definition.elements()[self.position + 1..]
            .iter()
            .take_while(|e| e.path.starts_with(&prefix))
            .position(|e| e.depth() == depth)
            .map(|offset| self.position + 1 + offset)
    }
}

impl DefinitionCursor for ElementDefinitionNavigator {
    type Bookmark = Bookmark;

    fn path_name(&self) -> &str {
        self.current().path_name()
    }

    fn is_primitive_value_constraint(&self) -> bool {
        self.current().is_primitive_value_constraint()
    }

    fn move_to_first_child(&mut self) -> bool {
        match self.first_child_position() {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    fn move_to_next(&mut self) -> bool {
        match self.next_sibling_position() {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    fn bookmark(&self) -> Bookmark {
        Bookmark {
            definition: Arc::clone(&self.definition),
            position: self.position,
        }
    }

    fn return_to_bookmark(&mut self, bookmark: Bookmark) -> Result<()> {
        if !Arc::ptr_eq(&bookmark.definition, &self.definition) {
            return Err(Error::CursorRestore(
                "bookmark belongs to a different definition".to_string(),
            ));
        }
        if bookmark.position >= self.definition.len() {
            return Err(Error::CursorRestore(format!(
                "bookmark position {} is outside the definition",
                bookmark.position
            )));
        }
        self.position = bookmark.position;
        Ok(())
    }

    fn shallow_copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator(paths: &[&str]) -> ElementDefinitionNavigator {
        let elements = paths.iter().map(|p| ElementDefinition::new(*p)).collect();
        ElementDefinitionNavigator::new(Arc::new(
            StructureDefinition::from_elements(elements).unwrap(),
        ))
    }

    fn sibling_names(nav: &mut ElementDefinitionNavigator) -> Vec<String> {
        let mut names = vec![nav.path_name().to_string()];
        while nav.move_to_next() {
            names.push(nav.path_name().to_string());
        }
        names
    }

    #[test]
    fn test_first_child_and_siblings() {
        let mut nav = navigator(&[
            "Patient",
            "Patient.name",
            "Patient.name.family",
            "Patient.name.given",
            "Patient.birthDate",
            "Patient.contact",
            "Patient.contact.name",
        ]);
        assert_eq!(nav.path(), "Patient");
        assert!(nav.move_to_first_child());
        assert_eq!(sibling_names(&mut nav), vec!["name", "birthDate", "contact"]);
    }

    #[test]
    fn test_nested_children_stop_at_parent_boundary() {
        let mut nav = navigator(&[
            "Patient",
            "Patient.name",
            "Patient.name.family",
            "Patient.name.given",
            "Patient.birthDate",
        ]);
        assert!(nav.move_to_path("Patient.name"));
        assert!(nav.move_to_first_child());
        assert_eq!(sibling_names(&mut nav), vec!["family", "given"]);
    }

    #[test]
    fn test_slices_are_siblings() {
        let mut nav = navigator(&[
            "Patient",
            "Patient.identifier",
            "Patient.identifier",
            "Patient.identifier.system",
            "Patient.identifier",
            "Patient.name",
        ]);
        assert!(nav.move_to_first_child());
        assert_eq!(
            sibling_names(&mut nav),
            vec!["identifier", "identifier", "identifier", "name"]
        );
    }

    #[test]
    fn test_leaf_has_no_children() {
        let mut nav = navigator(&["Patient", "Patient.active"]);
        assert!(nav.has_children());
        assert!(nav.move_to_first_child());
        assert!(!nav.has_children());
        assert!(!nav.move_to_first_child());
        assert_eq!(nav.path(), "Patient.active");
    }

    #[test]
    fn test_root_has_no_siblings() {
        let mut nav = navigator(&["Patient", "Patient.active"]);
        assert!(!nav.move_to_next());
        assert_eq!(nav.position(), 0);
    }

    #[test]
    fn test_bookmark_round_trip() {
        let mut nav = navigator(&["Patient", "Patient.name", "Patient.active"]);
        let bookmark = nav.bookmark();
        nav.move_to_first_child();
        nav.move_to_next();
        assert_eq!(nav.path(), "Patient.active");
        nav.return_to_bookmark(bookmark).unwrap();
        assert_eq!(nav.path(), "Patient");
    }

    #[test]
    fn test_bookmark_from_other_definition() {
        let mut nav = navigator(&["Patient", "Patient.name"]);
        let other = navigator(&["Patient", "Patient.name"]);
        let err = nav.return_to_bookmark(other.bookmark()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_shallow_copy_is_independent() {
        let mut nav = navigator(&["Patient", "Patient.name"]);
        let copy = nav.shallow_copy();
        nav.move_to_first_child();
        assert_eq!(copy.path(), "Patient");
        assert_eq!(nav.path(), "Patient.name");
        assert!(Arc::ptr_eq(copy.definition(), nav.definition()));
    }
}

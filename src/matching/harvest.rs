//! Harvesting the declared children of a definition element

use super::DeclaredChild;
use crate::error::Result;
use crate::navigator::DefinitionCursor;
use tracing::{debug, error, trace};

/// Holds a cursor's starting position and puts the cursor back there.
///
/// `finish` restores and reports failure; if the guard is dropped without
/// `finish` (a panic mid-walk), the drop restores on a best-effort basis.
struct CursorGuard<'c, C: DefinitionCursor> {
    cursor: &'c mut C,
    bookmark: Option<C::Bookmark>,
}

impl<'c, C: DefinitionCursor> CursorGuard<'c, C> {
    fn new(cursor: &'c mut C) -> Self {
        let bookmark = Some(cursor.bookmark());
        Self { cursor, bookmark }
    }

    fn finish(mut self) -> Result<()> {
        match self.bookmark.take() {
            Some(bookmark) => self.cursor.return_to_bookmark(bookmark),
            None => Ok(()),
        }
    }
}

impl<C: DefinitionCursor> Drop for CursorGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(bookmark) = self.bookmark.take() {
            if let Err(e) = self.cursor.return_to_bookmark(bookmark) {
                error!(error = %e, "definition cursor left displaced");
            }
        }
    }
}

/// Collect the distinct children declared below the cursor's element.
///
/// Consecutive children with the same name are slices of one element; only
/// the first of each run is kept. The cursor is back at its starting
/// position when this returns. An `Err` means the cursor could not be
/// restored: the result is lost and the cursor must not be used again.
pub fn harvest<C: DefinitionCursor>(cursor: &mut C) -> Result<Vec<DeclaredChild<C>>> {
    let mut guard = CursorGuard::new(cursor);
    let mut declared: Vec<DeclaredChild<C>> = Vec::new();

    if guard.cursor.move_to_first_child() {
        loop {
            let name = guard.cursor.path_name();
            let is_new = declared.last().map_or(true, |last| last.path_name() != name);

            if is_new {
                declared.push(DeclaredChild::new(
                    declared.len(),
                    name.to_string(),
                    guard.cursor.is_primitive_value_constraint(),
                    guard.cursor.shallow_copy(),
                ));
            } else {
                trace!(name, "collapsed slice entry");
            }

            if !guard.cursor.move_to_next() {
                break;
            }
        }
    }

    guard.finish()?;
    debug!(declared = declared.len(), "harvested declared children");
    Ok(declared)
}

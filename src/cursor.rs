//! The fail-fast cursor over the order thread: a detached position (no
//! borrow of the tree) plus a `mod_count` snapshot, so external mutation
//! between calls can be detected rather than forbidden at compile time.
//! `iter()` (see [`crate::Iter`]) covers the common, compile-time-checked
//! case; this type exists specifically to support the Java-style
//! "structural modification during iteration fails loudly, except when the
//! iterator performs its own removal" contract.

use thiserror::Error;

use crate::bound::IntervalBounds;
use crate::node::{Link, NodeId};
use crate::treap::Tree;

/// Errors raised by [`Cursor`] operations.
#[derive(Debug, Error)]
pub enum CursorError {
    /// `remove()` was called before the first `next()`, or twice for the
    /// same element.
    #[error("remove() called before next() or twice for the same element")]
    RemoveWithoutNext,
    /// The tree was structurally modified (through any path other than
    /// this cursor's own `remove`) since this cursor last observed it.
    #[error("the tree was structurally modified since this cursor last observed it")]
    ConcurrentModification,
    /// `next()` was called with no more elements to yield.
    #[error("no more elements")]
    NoMoreElements,
}

/// A `Copy`, tree-independent position in the canonical interval order.
///
/// Obtained from [`Tree::cursor`]. Unlike [`crate::Iter`], a `Cursor` does
/// not borrow the tree, so the tree may be mutated between calls to
/// [`Cursor::next`] — the next call detects that and fails with
/// [`CursorError::ConcurrentModification`] instead of returning a
/// potentially stale or duplicated element. [`Cursor::remove`] is the sole
/// exception: removing the most recently yielded element through the
/// cursor succeeds and resynchronizes the snapshot without invalidating it.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    next: Link,
    last: Option<NodeId>,
    mod_count: u64,
}

impl Cursor {
    pub(crate) fn new<B: IntervalBounds>(tree: &Tree<B>) -> Self {
        Self {
            next: tree.header.1,
            last: None,
            mod_count: tree.mod_count,
        }
    }

    /// Whether a further call to `next` would yield an element, without
    /// checking for concurrent modification.
    pub fn has_next(&self) -> bool {
        self.next != Link::Header
    }

    /// Yields the next interval in canonical order, or fails if the tree
    /// was structurally modified since this cursor last observed it.
    pub fn next<'a, B: IntervalBounds>(
        &mut self,
        tree: &'a Tree<B>,
    ) -> Result<&'a B, CursorError> {
        if tree.mod_count != self.mod_count {
            return Err(CursorError::ConcurrentModification);
        }

        match self.next {
            Link::Header => Err(CursorError::NoMoreElements),
            Link::Node(id) => {
                let node = tree.arena.get(id);
                self.last = Some(id);
                self.next = node.next;
                Ok(&node.interval)
            }
        }
    }

    /// Removes the most recently yielded element. Succeeds and
    /// resynchronizes this cursor's snapshot rather than invalidating it;
    /// the following `next` proceeds normally.
    pub fn remove<B: IntervalBounds>(&mut self, tree: &mut Tree<B>) -> Result<B, CursorError> {
        let id = self.last.ok_or(CursorError::RemoveWithoutNext)?;

        if tree.mod_count != self.mod_count {
            return Err(CursorError::ConcurrentModification);
        }

        self.last = None;
        let interval = tree.arena.get(id).interval.clone();
        tree.remove(&interval);
        self.mod_count = tree.mod_count;
        Ok(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Interval;

    #[test]
    fn plain_traversal_is_in_canonical_order() {
        let mut tree = Tree::new();
        for v in [5, 1, 3, 4, 2] {
            tree.add(Interval::closed(v, v).unwrap());
        }

        let mut cursor = tree.cursor();
        let mut seen = Vec::new();
        while cursor.has_next() {
            seen.push(cursor.next(&tree).unwrap().clone());
        }
        assert_eq!(
            seen,
            (1..=5)
                .map(|v| Interval::closed(v, v).unwrap())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn remove_through_cursor_resyncs_without_invalidating() {
        let mut tree = Tree::new();
        for v in 0..5 {
            tree.add(Interval::closed(v, v).unwrap());
        }

        let mut cursor = tree.cursor();
        let first = cursor.next(&tree).unwrap().clone();
        assert_eq!(first, Interval::closed(0, 0).unwrap());

        cursor.remove(&mut tree).unwrap();
        assert!(cursor.has_next());

        let second = cursor.next(&tree).unwrap().clone();
        assert_eq!(second, Interval::closed(1, 1).unwrap());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn remove_without_next_is_illegal_state() {
        let mut tree = Tree::new();
        tree.add(Interval::closed(0, 0).unwrap());

        let mut cursor = tree.cursor();
        assert!(matches!(
            cursor.remove(&mut tree),
            Err(CursorError::RemoveWithoutNext)
        ));
    }

    #[test]
    fn external_mutation_between_calls_fails_fast() {
        let mut tree = Tree::new();
        tree.add(Interval::closed(0, 0).unwrap());
        tree.add(Interval::closed(1, 1).unwrap());

        let mut cursor = tree.cursor();
        assert!(cursor.has_next());

        tree.add(Interval::closed(5, 5).unwrap());

        assert!(matches!(
            cursor.next(&tree),
            Err(CursorError::ConcurrentModification)
        ));
    }
}

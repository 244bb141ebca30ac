//! The four spatial query drivers, each a depth-first walk over the treap
//! pruned by the search-tree order and the `max_upper` augmentation. Every
//! driver keeps an explicit stack of pending subtree roots and yields
//! matches lazily; duplicates are impossible because the tree never stores
//! two canonically-equal intervals.

use std::cmp::Ordering;

use crate::bound::{bound_as_ref, cross_le, lower_cmp, upper_cmp, IntervalBounds};
use crate::node::NodeId;
use crate::treap::Tree;

impl<B: IntervalBounds> Tree<B> {
    /// Every stored interval that overlaps `query` or abuts it without a
    /// gap on a shared boundary (closed/closed touches connect;
    /// closed/open and open/open touches do not).
    pub fn connected<'a>(&'a self, query: &B) -> Connected<'a, B> {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            push_gated_by_lower(self, &mut stack, root, query);
        }
        Connected {
            tree: self,
            query: query.clone(),
            stack,
        }
    }

    /// Every stored interval fully contained in `query`.
    pub fn enclosed_by<'a>(&'a self, query: &B) -> EnclosedBy<'a, B> {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            push_gated_by_lower(self, &mut stack, root, query);
        }
        EnclosedBy {
            tree: self,
            query: query.clone(),
            stack,
        }
    }

    /// Every stored interval that fully contains `query`.
    pub fn enclosing<'a>(&'a self, query: &B) -> Enclosing<'a, B> {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            push_gated_by_upper(self, &mut stack, root, query);
        }
        Enclosing {
            tree: self,
            query: query.clone(),
            stack,
        }
    }

    /// Every stored interval that contains `point`; equivalent to
    /// `enclosing` a singleton interval `[point, point]`.
    pub fn containing<'a>(&'a self, point: &B::Point) -> Enclosing<'a, B> {
        self.enclosing(&B::singleton(point.clone()))
    }
}

/// Necessary condition to recurse into a subtree for `connected`/`enclosed_by`:
/// the query's lower bound does not strictly exceed the subtree's maximum
/// upper bound.
fn push_gated_by_lower<B: IntervalBounds>(
    tree: &Tree<B>,
    stack: &mut Vec<NodeId>,
    id: NodeId,
    query: &B,
) {
    let max_upper = &tree.arena.get(id).max_upper;
    if cross_le(query.lower(), bound_as_ref(max_upper)) {
        stack.push(id);
    }
}

/// Necessary condition to recurse into a subtree for `enclosing`: the
/// query's upper bound is no greater than the subtree's maximum upper
/// bound, under the upper-bound order.
fn push_gated_by_upper<B: IntervalBounds>(
    tree: &Tree<B>,
    stack: &mut Vec<NodeId>,
    id: NodeId,
    query: &B,
) {
    let max_upper = &tree.arena.get(id).max_upper;
    if upper_cmp(query.upper(), bound_as_ref(max_upper)) != Ordering::Greater {
        stack.push(id);
    }
}

/// Lazy result sequence of [`Tree::connected`].
#[derive(Debug)]
pub struct Connected<'a, B: IntervalBounds> {
    tree: &'a Tree<B>,
    query: B,
    stack: Vec<NodeId>,
}

impl<'a, B: IntervalBounds> Iterator for Connected<'a, B> {
    type Item = &'a B;

    fn next(&mut self) -> Option<&'a B> {
        while let Some(id) = self.stack.pop() {
            let node = self.tree.arena.get(id);

            if let Some(l) = node.left {
                push_gated_by_lower(self.tree, &mut self.stack, l, &self.query);
            }
            if cross_le(node.interval.lower(), self.query.upper()) {
                if let Some(r) = node.right {
                    push_gated_by_lower(self.tree, &mut self.stack, r, &self.query);
                }
            }
            if node.interval.is_connected(&self.query) {
                return Some(&node.interval);
            }
        }
        None
    }
}

/// Lazy result sequence of [`Tree::enclosed_by`].
#[derive(Debug)]
pub struct EnclosedBy<'a, B: IntervalBounds> {
    tree: &'a Tree<B>,
    query: B,
    stack: Vec<NodeId>,
}

impl<'a, B: IntervalBounds> Iterator for EnclosedBy<'a, B> {
    type Item = &'a B;

    fn next(&mut self) -> Option<&'a B> {
        while let Some(id) = self.stack.pop() {
            let node = self.tree.arena.get(id);

            if lower_cmp(self.query.lower(), node.interval.lower()) != Ordering::Greater {
                if let Some(l) = node.left {
                    push_gated_by_lower(self.tree, &mut self.stack, l, &self.query);
                }
            }
            if let Some(r) = node.right {
                push_gated_by_lower(self.tree, &mut self.stack, r, &self.query);
            }
            if self.query.encloses(&node.interval) {
                return Some(&node.interval);
            }
        }
        None
    }
}

/// Lazy result sequence of [`Tree::enclosing`] and [`Tree::containing`].
#[derive(Debug)]
pub struct Enclosing<'a, B: IntervalBounds> {
    tree: &'a Tree<B>,
    query: B,
    stack: Vec<NodeId>,
}

impl<'a, B: IntervalBounds> Iterator for Enclosing<'a, B> {
    type Item = &'a B;

    fn next(&mut self) -> Option<&'a B> {
        while let Some(id) = self.stack.pop() {
            let node = self.tree.arena.get(id);

            if let Some(l) = node.left {
                push_gated_by_upper(self.tree, &mut self.stack, l, &self.query);
            }
            if lower_cmp(node.interval.lower(), self.query.lower()) != Ordering::Greater {
                if let Some(r) = node.right {
                    push_gated_by_upper(self.tree, &mut self.stack, r, &self.query);
                }
            }
            if node.interval.encloses(&self.query) {
                return Some(&node.interval);
            }
        }
        None
    }
}

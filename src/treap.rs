//! The augmented treap itself: BST keyed by the canonical interval order,
//! min-heap on randomized priorities, each node carrying the maximum upper
//! bound of its subtree. Insertion and removal are written in the
//! return-a-new-subtree-root style recommended for ownership-disciplined
//! languages: a function takes the old subtree by value (here, by
//! [`NodeId`]) and returns the new one, so the caller rebinds its child
//! slot — there are no parent back-pointers, the recursion stack is the
//! parent chain.

use std::cmp::Ordering;

use crate::bound::{bound_as_ref, bound_cloned, cmp_intervals, upper_cmp, IntervalBounds};
use crate::node::{Arena, Link, NodeId};
use crate::priority::next_priority;

/// A mutable, ordered collection of intervals supporting the four spatial
/// queries in [`crate::query`] in expected `O(log n + k)` time.
pub struct Tree<B: IntervalBounds> {
    pub(crate) arena: Arena<B>,
    pub(crate) root: Option<NodeId>,
    pub(crate) header: (Link, Link),
    pub(crate) len: usize,
    pub(crate) mod_count: u64,
}

impl<B: IntervalBounds> Default for Tree<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: IntervalBounds> Tree<B> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            arena: Arena::default(),
            root: None,
            header: (Link::Header, Link::Header),
            len: 0,
            mod_count: 0,
        }
    }

    /// The number of intervals stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no intervals.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every interval, resetting the tree to empty.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.header = (Link::Header, Link::Header);
        self.len = 0;
        self.mod_count += 1;
    }

    /// Whether an interval equal (under the canonical order) to `interval`
    /// is stored in the tree.
    pub fn contains(&self, interval: &B) -> bool {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.arena.get(id);
            cur = match cmp_intervals(interval, &node.interval) {
                Ordering::Equal => return true,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        false
    }

    /// Inserts `interval`, returning `true` if it was not already present.
    pub fn add(&mut self, interval: B) -> bool {
        let modified = match self.root {
            None => {
                let id = self.arena.insert(interval, next_priority());
                self.splice_after(Link::Header, id);
                self.root = Some(id);
                true
            }
            Some(root) => {
                let (new_root, modified) = self.insert(root, interval);
                self.root = Some(new_root);
                modified
            }
        };

        if modified {
            self.len += 1;
            self.mod_count += 1;
        }
        modified
    }

    /// Removes the interval equal (under the canonical order) to
    /// `interval`, returning `true` if one was present.
    pub fn remove(&mut self, interval: &B) -> bool {
        let modified = match self.root {
            None => false,
            Some(root) => {
                let (new_root, modified) = self.remove_at(root, interval);
                self.root = new_root;
                modified
            }
        };

        if modified {
            self.len -= 1;
            self.mod_count += 1;
        }
        modified
    }

    fn insert(&mut self, n: NodeId, interval: B) -> (NodeId, bool) {
        match cmp_intervals(&interval, &self.arena.get(n).interval) {
            Ordering::Equal => (n, false),
            Ordering::Less => {
                let modified = match self.arena.get(n).left {
                    None => {
                        let m = self.arena.insert(interval, next_priority());
                        self.splice_before(Link::Node(n), m);
                        self.arena.get_mut(n).left = Some(m);
                        true
                    }
                    Some(l) => {
                        let (new_l, modified) = self.insert(l, interval);
                        self.arena.get_mut(n).left = Some(new_l);
                        modified
                    }
                };
                if !modified {
                    return (n, false);
                }
                self.recompute_max_upper(n);
                (self.maybe_rotate_up(n, true), true)
            }
            Ordering::Greater => {
                let modified = match self.arena.get(n).right {
                    None => {
                        let m = self.arena.insert(interval, next_priority());
                        self.splice_after(Link::Node(n), m);
                        self.arena.get_mut(n).right = Some(m);
                        true
                    }
                    Some(r) => {
                        let (new_r, modified) = self.insert(r, interval);
                        self.arena.get_mut(n).right = Some(new_r);
                        modified
                    }
                };
                if !modified {
                    return (n, false);
                }
                self.recompute_max_upper(n);
                (self.maybe_rotate_up(n, false), true)
            }
        }
    }

    fn remove_at(&mut self, n: NodeId, interval: &B) -> (Option<NodeId>, bool) {
        match cmp_intervals(interval, &self.arena.get(n).interval) {
            Ordering::Less => match self.arena.get(n).left {
                None => (Some(n), false),
                Some(l) => {
                    let (new_l, modified) = self.remove_at(l, interval);
                    self.arena.get_mut(n).left = new_l;
                    if modified {
                        self.recompute_max_upper(n);
                    }
                    (Some(n), modified)
                }
            },
            Ordering::Greater => match self.arena.get(n).right {
                None => (Some(n), false),
                Some(r) => {
                    let (new_r, modified) = self.remove_at(r, interval);
                    self.arena.get_mut(n).right = new_r;
                    if modified {
                        self.recompute_max_upper(n);
                    }
                    (Some(n), modified)
                }
            },
            Ordering::Equal => {
                self.unlink(n);
                let node = self.arena.remove(n);
                (self.merge(node.left, node.right), true)
            }
        }
    }

    /// Merges two subtrees whose intervals are known to sort entirely
    /// before/after each other, preserving the heap property: whichever
    /// root has the smaller priority stays on top, the other subtree is
    /// merged into its adjacent child.
    fn merge(&mut self, l: Option<NodeId>, r: Option<NodeId>) -> Option<NodeId> {
        match (l, r) {
            (None, x) | (x, None) => x,
            (Some(l), Some(r)) => {
                if self.arena.get(l).priority <= self.arena.get(r).priority {
                    let lr = self.arena.get(l).right;
                    let merged = self.merge(lr, Some(r));
                    self.arena.get_mut(l).right = merged;
                    self.recompute_max_upper(l);
                    Some(l)
                } else {
                    let rl = self.arena.get(r).left;
                    let merged = self.merge(Some(l), rl);
                    self.arena.get_mut(r).left = merged;
                    self.recompute_max_upper(r);
                    Some(r)
                }
            }
        }
    }

    fn maybe_rotate_up(&mut self, n: NodeId, child_is_left: bool) -> NodeId {
        let child = if child_is_left {
            self.arena.get(n).left
        } else {
            self.arena.get(n).right
        };

        match child {
            Some(c) if self.arena.get(c).priority < self.arena.get(n).priority => {
                if child_is_left {
                    self.rotate_right(n)
                } else {
                    self.rotate_left(n)
                }
            }
            _ => n,
        }
    }

    fn rotate_right(&mut self, n: NodeId) -> NodeId {
        let l = self.arena.get(n).left.expect("rotate_right needs a left child");
        let lr = self.arena.get(l).right;

        self.arena.get_mut(n).left = lr;
        self.arena.get_mut(l).right = Some(n);

        self.recompute_max_upper(n);
        self.recompute_max_upper(l);

        l
    }

    fn rotate_left(&mut self, n: NodeId) -> NodeId {
        let r = self.arena.get(n).right.expect("rotate_left needs a right child");
        let rl = self.arena.get(r).left;

        self.arena.get_mut(n).right = rl;
        self.arena.get_mut(r).left = Some(n);

        self.recompute_max_upper(n);
        self.recompute_max_upper(r);

        r
    }

    fn recompute_max_upper(&mut self, n: NodeId) {
        let node = self.arena.get(n);
        let mut max = bound_cloned(node.interval.upper());

        if let Some(l) = node.left {
            let candidate = self.arena.get(l).max_upper.clone();
            if upper_cmp(bound_as_ref(&candidate), bound_as_ref(&max)) == Ordering::Greater {
                max = candidate;
            }
        }
        if let Some(r) = node.right {
            let candidate = self.arena.get(r).max_upper.clone();
            if upper_cmp(bound_as_ref(&candidate), bound_as_ref(&max)) == Ordering::Greater {
                max = candidate;
            }
        }

        self.arena.get_mut(n).max_upper = max;
    }

    fn thread_link(&self, link: Link) -> (Link, Link) {
        match link {
            Link::Header => self.header,
            Link::Node(id) => {
                let node = self.arena.get(id);
                (node.prev, node.next)
            }
        }
    }

    fn set_next(&mut self, link: Link, next: Link) {
        match link {
            Link::Header => self.header.1 = next,
            Link::Node(id) => self.arena.get_mut(id).next = next,
        }
    }

    fn set_prev(&mut self, link: Link, prev: Link) {
        match link {
            Link::Header => self.header.0 = prev,
            Link::Node(id) => self.arena.get_mut(id).prev = prev,
        }
    }

    fn link(&mut self, a: Link, b: Link) {
        self.set_next(a, b);
        self.set_prev(b, a);
    }

    fn splice_before(&mut self, n: Link, new: NodeId) {
        let (prev, _) = self.thread_link(n);
        self.link(prev, Link::Node(new));
        self.link(Link::Node(new), n);
    }

    fn splice_after(&mut self, n: Link, new: NodeId) {
        let (_, next) = self.thread_link(n);
        self.link(Link::Node(new), next);
        self.link(n, Link::Node(new));
    }

    fn unlink(&mut self, n: NodeId) {
        let (prev, next) = self.thread_link(Link::Node(n));
        self.link(prev, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Interval;

    fn check_invariants(tree: &Tree<Interval<i32>>) {
        fn walk(
            tree: &Tree<Interval<i32>>,
            id: Option<NodeId>,
            lo: Option<&Interval<i32>>,
            hi: Option<&Interval<i32>>,
        ) -> usize {
            let Some(id) = id else { return 0 };
            let node = tree.arena.get(id);

            if let Some(lo) = lo {
                assert_eq!(cmp_intervals(lo, &node.interval), Ordering::Less);
            }
            if let Some(hi) = hi {
                assert_eq!(cmp_intervals(&node.interval, hi), Ordering::Less);
            }

            if let Some(l) = node.left {
                assert!(tree.arena.get(l).priority >= node.priority);
            }
            if let Some(r) = node.right {
                assert!(tree.arena.get(r).priority >= node.priority);
            }

            let mut expected_max = bound_cloned(node.interval.upper());
            if let Some(l) = node.left {
                let m = tree.arena.get(l).max_upper.clone();
                if upper_cmp(bound_as_ref(&m), bound_as_ref(&expected_max)) == Ordering::Greater {
                    expected_max = m;
                }
            }
            if let Some(r) = node.right {
                let m = tree.arena.get(r).max_upper.clone();
                if upper_cmp(bound_as_ref(&m), bound_as_ref(&expected_max)) == Ordering::Greater {
                    expected_max = m;
                }
            }
            assert_eq!(
                upper_cmp(bound_as_ref(&node.max_upper), bound_as_ref(&expected_max)),
                Ordering::Equal
            );

            1 + walk(tree, node.left, lo, Some(&node.interval))
                + walk(tree, node.right, Some(&node.interval), hi)
        }

        let size = walk(tree, tree.root, None, None);
        assert_eq!(size, tree.len());

        let mut thread_len = 0;
        let mut cur = tree.header.1;
        let mut prev_interval: Option<Interval<i32>> = None;
        while let Link::Node(id) = cur {
            let node = tree.arena.get(id);
            if let Some(prev) = &prev_interval {
                assert_eq!(cmp_intervals(prev, &node.interval), Ordering::Less);
            }
            prev_interval = Some(node.interval.clone());
            thread_len += 1;
            cur = node.next;
        }
        assert_eq!(thread_len, tree.len());
    }

    #[test]
    fn insert_remove_idempotence() {
        let mut tree = Tree::new();
        for v in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
            assert!(tree.add(Interval::closed(v, v + 1).unwrap()));
            assert!(!tree.add(Interval::closed(v, v + 1).unwrap()));
            check_invariants(&tree);
        }
        assert_eq!(tree.len(), 10);

        for v in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
            assert!(tree.remove(&Interval::closed(v, v + 1).unwrap()));
            assert!(!tree.remove(&Interval::closed(v, v + 1).unwrap()));
            check_invariants(&tree);
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn add_then_remove_is_identity() {
        let mut tree = Tree::new();
        tree.add(Interval::closed(0, 5).unwrap());
        let before = tree.len();

        tree.add(Interval::closed(10, 20).unwrap());
        tree.remove(&Interval::closed(10, 20).unwrap());

        assert_eq!(tree.len(), before);
        assert!(tree.contains(&Interval::closed(0, 5).unwrap()));
        check_invariants(&tree);
    }

    #[test]
    fn uniqueness_under_random_insert_remove() {
        let mut tree = Tree::new();
        for v in 0..64 {
            tree.add(Interval::closed(v, v).unwrap());
        }
        for v in (0..64).step_by(2) {
            tree.remove(&Interval::closed(v, v).unwrap());
        }
        check_invariants(&tree);
        assert_eq!(tree.len(), 32);
    }
}

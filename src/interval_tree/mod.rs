//! An augmented interval tree keyed on `(start, end)`.
//!
//! This is the arena-backed Rust analogue of `gap5`'s red-black
//! `interval_tree`: rather than an intrusive-pointer tree we keep nodes in a
//! `Vec` and hand callers an opaque `IntervalHandle` (an arena index) in
//! place of a raw node pointer. Each node additionally stores `last`, the
//! maximum `end` over its own subtree, used to prune range queries exactly
//! as described by the spec. The tree is an unbalanced BST: duplicate keys
//! are legal and sibling order among them is unspecified, matching the
//! historical note that callers must not depend on it.

use std::fmt;

mod iter;
pub use iter::RangeIter;

/// Opaque reference to a stored interval. Stable across insertions and
/// across deletions of *other* intervals; invalidated only by deleting the
/// interval it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalHandle(pub(crate) usize);

struct Node<T> {
    start: i64,
    end: i64,
    last: i64,
    left: Option<usize>,
    right: Option<usize>,
    parent: Option<usize>,
    // `None` only ever observed transiently mid-removal; a live arena slot
    // always carries its payload.
    payload: Option<T>,
}

/// An augmented ordered tree of `(start, end)` intervals, each carrying a
/// payload of type `T`. Owns its payloads: dropping the tree drops them.
pub struct IntervalTree<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
}

impl<T> Default for IntervalTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntervalTree<T> {
    pub fn new() -> Self {
        IntervalTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `(start, end)` key a handle was last inserted or reinserted
    /// with. Does not reflect in-place growth of a payload's *logical*
    /// interval performed by the clustering engine -- see its module docs.
    pub fn key(&self, handle: IntervalHandle) -> (i64, i64) {
        let node = &self.nodes[handle.0];
        (node.start, node.end)
    }

    pub fn get(&self, handle: IntervalHandle) -> Option<&T> {
        self.nodes[handle.0].payload.as_ref()
    }

    pub fn get_mut(&mut self, handle: IntervalHandle) -> Option<&mut T> {
        self.nodes[handle.0].payload.as_mut()
    }

    /// Borrow two distinct handles' payloads mutably at once. Panics if the
    /// handles are equal.
    pub fn get_pair_mut(&mut self, a: IntervalHandle, b: IntervalHandle) -> (&mut T, &mut T) {
        assert_ne!(a.0, b.0, "get_pair_mut called with the same handle twice");
        let (lo, hi, swapped) = if a.0 < b.0 {
            (a.0, b.0, false)
        } else {
            (b.0, a.0, true)
        };
        let (left, right) = self.nodes.split_at_mut(hi);
        let pa = left[lo].payload.as_mut().expect("dangling interval handle");
        let pb = right[0].payload.as_mut().expect("dangling interval handle");
        if swapped {
            (pb, pa)
        } else {
            (pa, pb)
        }
    }

    /// Inserts a new interval. O(log N) on a reasonably balanced tree, O(N)
    /// worst case since this tree never rebalances -- acceptable at the
    /// block sizes the clustering engine bounds its work to.
    pub fn add(&mut self, start: i64, end: i64, payload: T) -> IntervalHandle {
        let idx = self.alloc(start, end, payload);

        let mut cur = self.root;
        let mut parent = None;
        while let Some(c) = cur {
            parent = Some(c);
            cur = if start < self.nodes[c].start {
                self.nodes[c].left
            } else {
                // start >= node.start: duplicates and ties go right,
                // consistent with "secondary key end ascending" not being
                // load-bearing for tree shape, only for query results.
                self.nodes[c].right
            };
        }

        self.nodes[idx].parent = parent;
        match parent {
            None => self.root = Some(idx),
            Some(p) => {
                if start < self.nodes[p].start {
                    self.nodes[p].left = Some(idx);
                } else {
                    self.nodes[p].right = Some(idx);
                }
            }
        }

        self.len += 1;
        self.propagate_last_increase(parent, end);
        IntervalHandle(idx)
    }

    /// Removes a previously returned handle, returning its payload. Only
    /// safe to call on handles the caller still owns exclusively -- the
    /// standard usage is to stage handles collected from a `range_iter` in
    /// a side `Vec` and call `del` on each only after the iterator has been
    /// dropped.
    pub fn del(&mut self, handle: IntervalHandle) -> Option<T> {
        let idx = handle.0;
        if self.nodes[idx].payload.is_none() {
            return None;
        }

        let removed_payload = self.nodes[idx].payload.take();
        let removed_end = self.nodes[idx].end;

        let left = self.nodes[idx].left;
        let right = self.nodes[idx].right;

        let recompute_from = if left.is_some() && right.is_some() {
            // Two children: splice in the in-order successor's key and
            // payload, then physically remove the (now-spliced) successor
            // node, which has at most a right child.
            let succ = self.min_node(right.unwrap());
            let succ_start = self.nodes[succ].start;
            let succ_end = self.nodes[succ].end;
            let succ_payload = self.nodes[succ].payload.take();

            let succ_parent = self.nodes[succ].parent.unwrap();
            let succ_right = self.nodes[succ].right;
            self.replace_child(succ_parent, succ, succ_right);
            if let Some(r) = succ_right {
                self.nodes[r].parent = Some(succ_parent);
            }
            self.free(succ);

            self.nodes[idx].start = succ_start;
            self.nodes[idx].end = succ_end;
            self.nodes[idx].payload = succ_payload;

            if succ_parent == idx {
                // successor was idx's direct right child with no left
                // subtree of its own -- recompute starts at idx itself.
                Some(idx)
            } else {
                Some(succ_parent)
            }
        } else {
            // Zero or one child: splice the single child (if any) into
            // idx's place, then free idx.
            let child = left.or(right);
            let parent = self.nodes[idx].parent;
            self.replace_child_of_parent(parent, idx, child);
            if let Some(c) = child {
                self.nodes[c].parent = parent;
            }
            self.free(idx);
            parent
        };

        self.len -= 1;
        self.recompute_last_upward(recompute_from, removed_end);
        removed_payload
    }

    /// Stateful in-order iterator over every stored interval overlapping
    /// `[lo, hi]`. Prunes whole subtrees whenever a node's `last < lo` and
    /// skips right subtrees whenever a node's `start > hi`.
    pub fn range_iter(&self, lo: i64, hi: i64) -> RangeIter<'_, T> {
        RangeIter::new(self, lo, hi)
    }

    /// Callback-driven equivalent of `range_iter`, kept as an optional
    /// alternative per the historical note in the spec: the iterator form
    /// is sufficient for every clustering use. `func` returning `<0` aborts
    /// with an error, `0` stops early, `>0` continues.
    pub fn range_query<F>(&self, lo: i64, hi: i64, mut func: F) -> Result<usize, ()>
    where
        F: FnMut(IntervalHandle, &T) -> i32,
    {
        let mut count = 0;
        for handle in self.range_iter(lo, hi) {
            let payload = self.get(handle).expect("dangling interval handle");
            let r = func(handle, payload);
            if r < 0 {
                return Err(());
            }
            count += 1;
            if r == 0 {
                break;
            }
        }
        Ok(count)
    }

    /// Recursively checks `last = max(end, left.last, right.last)` for
    /// every node. Used by the property tests; not on any hot path.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.check_node(self.root).map(|_| ())
    }

    fn check_node(&self, idx: Option<usize>) -> Result<i64, String> {
        let idx = match idx {
            None => return Ok(i64::MIN),
            Some(i) => i,
        };
        let node = &self.nodes[idx];
        let left_last = self.check_node(node.left)?;
        let right_last = self.check_node(node.right)?;
        let expected = node.end.max(left_last).max(right_last);
        if expected != node.last {
            return Err(format!(
                "node {} ({}..{}): last={} but expected {}",
                idx, node.start, node.end, node.last, expected
            ));
        }
        Ok(node.last)
    }

    fn alloc(&mut self, start: i64, end: i64, payload: T) -> usize {
        let node = Node {
            start,
            end,
            last: end,
            left: None,
            right: None,
            parent: None,
            payload: Some(payload),
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn free(&mut self, idx: usize) {
        self.free.push(idx);
    }

    fn min_node(&self, mut idx: usize) -> usize {
        while let Some(l) = self.nodes[idx].left {
            idx = l;
        }
        idx
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: Option<usize>) {
        if self.nodes[parent].left == Some(old) {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    fn replace_child_of_parent(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => self.root = new,
            Some(p) => self.replace_child(p, old, new),
        }
    }

    /// Called after inserting a node with the given `end` below `start`.
    /// Walks upward OR-ing `end` into `last`, stopping as soon as a node's
    /// `last` already covers it.
    fn propagate_last_increase(&mut self, mut idx: Option<usize>, end: i64) {
        while let Some(i) = idx {
            if self.nodes[i].last >= end {
                break;
            }
            self.nodes[i].last = end;
            idx = self.nodes[i].parent;
        }
    }

    /// Called after a structural change rooted at `idx` that may have
    /// shrunk `last` (a deletion removed an interval that used to supply
    /// part of it). Recomputes `last` bottom-up from `idx` to the root,
    /// stopping as soon as a level's recomputed value matches what it
    /// already had stored -- if this level is unchanged, no ancestor's max
    /// can be affected by it either.
    fn recompute_last_upward(&mut self, mut idx: Option<usize>, _removed_end: i64) {
        while let Some(i) = idx {
            let node = &self.nodes[i];
            let mut new_last = node.end;
            if let Some(l) = node.left {
                new_last = new_last.max(self.nodes[l].last);
            }
            if let Some(r) = node.right {
                new_last = new_last.max(self.nodes[r].last);
            }

            let old_last = self.nodes[i].last;
            self.nodes[i].last = new_last;

            if new_last == old_last {
                break;
            }
            idx = self.nodes[i].parent;
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntervalTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<(i64, i64)> = self
            .range_iter(i64::MIN, i64::MAX)
            .map(|h| self.key(h))
            .collect();
        f.debug_struct("IntervalTree")
            .field("len", &self.len)
            .field("intervals", &entries)
            .finish()
    }
}

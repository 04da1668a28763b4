/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The generic aggregating B+-tree: the one engine every dynamic
//! sequence in this crate is built from. Parameterised over a leaf
//! container (`Leaf`, implemented by [`crate::bitblock::BitBlock`] and
//! [`crate::vlcblock::VlcBlock`]) and the monoid aggregate it tracks
//! (`Aggregate`, implemented by [`CountPopcount`] and [`CountSum`]).
//!
//! Node storage lives in a [`crate::arena::NodeArena`] addressed by
//! [`crate::arena::NodeId`] rather than raw pointers or `Rc<RefCell<_>>`
//! — see `DESIGN.md`. Descent and mutation use plain recursion: tree
//! depth is `O(log_D n)`, so the native call stack plays the role of
//! the "path stack" the design calls for, without unsafe code.

use log::trace;

use crate::arena::{NodeArena, NodeId};

/// A monoid aggregate cached on every internal-node child slot.
pub trait Aggregate: Copy + Default + PartialEq + std::fmt::Debug {
    fn combine(self, other: Self) -> Self;
    /// Number of elements in the subtree this aggregate summarizes.
    fn count(&self) -> usize;
    /// The tracked statistic (popcount, or sum) over the subtree.
    fn stat(&self) -> u64;
}

/// Aggregate for dynamic bit sequences: element count and popcount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountPopcount {
    pub count: u64,
    pub popcount: u64,
}

impl Aggregate for CountPopcount {
    fn combine(self, other: Self) -> Self {
        CountPopcount {
            count: self.count + other.count,
            popcount: self.popcount + other.popcount,
        }
    }
    fn count(&self) -> usize {
        self.count as usize
    }
    fn stat(&self) -> u64 {
        self.popcount
    }
}

/// Aggregate for dynamic integer (prefix-sum) sequences and both halves
/// of a dynamic permutation: element count and sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountSum {
    pub count: u64,
    pub sum: u64,
}

impl Aggregate for CountSum {
    fn combine(self, other: Self) -> Self {
        CountSum {
            count: self.count + other.count,
            sum: self.sum + other.sum,
        }
    }
    fn count(&self) -> usize {
        self.count as usize
    }
    fn stat(&self) -> u64 {
        self.sum
    }
}

/// The contract a leaf block must satisfy to sit at the bottom of an
/// aggregating B+-tree: the interface described in `SPEC_FULL.md`
/// Design Notes ("re-express as an interface the leaf must satisfy").
pub trait Leaf: Clone + std::fmt::Debug {
    type Item: Copy;
    type Agg: Aggregate;

    const CAPACITY: usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.len() == Self::CAPACITY
    }

    /// Minimum occupancy before a non-root leaf is considered
    /// underflowed. Half capacity, matching the internal-node
    /// `D/2..D` occupancy rule.
    fn min_len() -> usize {
        Self::CAPACITY / 2
    }

    fn aggregate(&self) -> Self::Agg;
    fn at(&self, i: usize) -> Self::Item;
    fn insert(&mut self, i: usize, v: Self::Item);
    fn remove(&mut self, i: usize) -> Self::Item;
    fn split_off(&mut self, at: usize) -> Self;
    fn append_block(&mut self, other: &Self);
    fn from_slice(items: &[Self::Item]) -> Self;

    /// Cumulative stat over the first `i` elements (`rank1` for bit
    /// blocks, `prefix_sum` for VLC blocks).
    fn prefix_stat(&self, i: usize) -> u64;

    /// Smallest index `k` with `prefix_stat(k+1) >= s`, or `len()` if
    /// unreachable (`select1`-via-threshold for bit blocks, `search`
    /// for VLC blocks).
    fn search_stat(&self, s: u64) -> usize;
}

impl Leaf for crate::bitblock::BitBlock {
    type Item = bool;
    type Agg = CountPopcount;
    const CAPACITY: usize = crate::bitblock::BitBlock::CAPACITY;

    fn len(&self) -> usize {
        crate::bitblock::BitBlock::len(self)
    }
    fn aggregate(&self) -> Self::Agg {
        CountPopcount {
            count: self.len() as u64,
            popcount: self.popcount() as u64,
        }
    }
    fn at(&self, i: usize) -> bool {
        self.get(i)
    }
    fn insert(&mut self, i: usize, v: bool) {
        crate::bitblock::BitBlock::insert(self, i, v)
    }
    fn remove(&mut self, i: usize) -> bool {
        crate::bitblock::BitBlock::remove(self, i)
    }
    fn split_off(&mut self, at: usize) -> Self {
        self.split_off(at)
    }
    fn append_block(&mut self, other: &Self) {
        crate::bitblock::BitBlock::append_block(self, other)
    }
    fn from_slice(items: &[bool]) -> Self {
        crate::bitblock::BitBlock::from_slice(items)
    }
    fn prefix_stat(&self, i: usize) -> u64 {
        self.rank1(i) as u64
    }
    fn search_stat(&self, s: u64) -> usize {
        self.search1(s)
    }
}

impl Leaf for crate::vlcblock::VlcBlock {
    type Item = u64;
    type Agg = CountSum;
    const CAPACITY: usize = crate::vlcblock::VlcBlock::CAPACITY;

    fn len(&self) -> usize {
        crate::vlcblock::VlcBlock::len(self)
    }
    fn aggregate(&self) -> Self::Agg {
        CountSum {
            count: self.len() as u64,
            sum: self.sum(),
        }
    }
    fn at(&self, i: usize) -> u64 {
        crate::vlcblock::VlcBlock::at(self, i)
    }
    fn insert(&mut self, i: usize, v: u64) {
        crate::vlcblock::VlcBlock::insert(self, i, v)
    }
    fn remove(&mut self, i: usize) -> u64 {
        crate::vlcblock::VlcBlock::remove(self, i)
    }
    fn split_off(&mut self, at: usize) -> Self {
        self.split_off(at)
    }
    fn append_block(&mut self, other: &Self) {
        crate::vlcblock::VlcBlock::append_block(self, other)
    }
    fn from_slice(items: &[u64]) -> Self {
        crate::vlcblock::VlcBlock::from_slice(items)
    }
    fn prefix_stat(&self, i: usize) -> u64 {
        self.prefix_sum(i)
    }
    fn search_stat(&self, s: u64) -> usize {
        self.search(s)
    }
}

#[derive(Clone, Debug)]
struct InternalNode<L: Leaf> {
    children: Vec<NodeId>,
    aggs: Vec<L::Agg>,
}

#[derive(Clone, Debug)]
enum Node<L: Leaf> {
    Leaf(L),
    Internal(InternalNode<L>),
}

fn node_aggregate<L: Leaf>(node: &Node<L>) -> L::Agg {
    match node {
        Node::Leaf(leaf) => leaf.aggregate(),
        Node::Internal(internal) => internal
            .aggs
            .iter()
            .fold(L::Agg::default(), |a, &b| a.combine(b)),
    }
}

fn node_aggregate_at<L: Leaf>(arena: &NodeArena<Node<L>>, id: NodeId) -> L::Agg {
    node_aggregate(arena.get(id))
}

fn node_len<L: Leaf>(node: &Node<L>) -> usize {
    match node {
        Node::Leaf(leaf) => leaf.len(),
        Node::Internal(internal) => internal.children.len(),
    }
}

fn node_min_len<L: Leaf>(node: &Node<L>, min_children: usize) -> usize {
    match node {
        Node::Leaf(_) => L::min_len(),
        Node::Internal(_) => min_children,
    }
}

fn steal_from_left<L: Leaf>(left: &mut Node<L>, right: &mut Node<L>) {
    match (left, right) {
        (Node::Leaf(l), Node::Leaf(r)) => {
            let v = l.remove(l.len() - 1);
            r.insert(0, v);
        }
        (Node::Internal(l), Node::Internal(r)) => {
            let cid = l.children.pop().expect("steal_from_left on childless node");
            let cagg = l.aggs.pop().expect("steal_from_left aggs/children mismatch");
            r.children.insert(0, cid);
            r.aggs.insert(0, cagg);
        }
        _ => unreachable!("sibling node kind mismatch"),
    }
}

fn steal_from_right<L: Leaf>(left: &mut Node<L>, right: &mut Node<L>) {
    match (left, right) {
        (Node::Leaf(l), Node::Leaf(r)) => {
            let v = r.remove(0);
            l.insert(l.len(), v);
        }
        (Node::Internal(l), Node::Internal(r)) => {
            let cid = r.children.remove(0);
            let cagg = r.aggs.remove(0);
            l.children.push(cid);
            l.aggs.push(cagg);
        }
        _ => unreachable!("sibling node kind mismatch"),
    }
}

fn merge_into_left<L: Leaf>(left: &mut Node<L>, right: &Node<L>) {
    match (left, right) {
        (Node::Leaf(l), Node::Leaf(r)) => l.append_block(r),
        (Node::Internal(l), Node::Internal(r)) => {
            l.children.extend_from_slice(&r.children);
            l.aggs.extend_from_slice(&r.aggs);
        }
        _ => unreachable!("sibling node kind mismatch"),
    }
}

fn set_child_agg<L: Leaf>(arena: &mut NodeArena<Node<L>>, parent: NodeId, pos: usize, agg: L::Agg) {
    if let Node::Internal(internal) = arena.get_mut(parent) {
        internal.aggs[pos] = agg;
    }
}

fn refresh_child_agg<L: Leaf>(arena: &mut NodeArena<Node<L>>, parent: NodeId, pos: usize, child: NodeId) {
    let agg = node_aggregate_at(arena, child);
    set_child_agg(arena, parent, pos, agg);
}

fn remove_child_entry<L: Leaf>(arena: &mut NodeArena<Node<L>>, parent: NodeId, pos: usize) {
    if let Node::Internal(internal) = arena.get_mut(parent) {
        internal.children.remove(pos);
        internal.aggs.remove(pos);
    }
}

/// Picks the child index to descend into for a position in `[0, total]`
/// (inclusive upper bound, for insert-style descents where appending at
/// the very end is valid). Returns `(child_index, base_before_child)`.
fn locate_inclusive<L: Leaf>(internal: &InternalNode<L>, pos: usize) -> (usize, usize) {
    let n = internal.children.len();
    let mut base = 0usize;
    for i in 0..n {
        let c = internal.aggs[i].count();
        if pos <= base + c || i == n - 1 {
            return (i, base);
        }
        base += c;
    }
    unreachable!("internal node with no children")
}

/// Picks the child index to descend into for a position in `[0, total)`
/// (strict, for access/remove-style descents).
fn locate_exclusive<L: Leaf>(internal: &InternalNode<L>, pos: usize) -> (usize, usize) {
    let n = internal.children.len();
    let mut base = 0usize;
    for i in 0..n {
        let c = internal.aggs[i].count();
        if pos < base + c || i == n - 1 {
            return (i, base);
        }
        base += c;
    }
    unreachable!("internal node with no children")
}

fn insert_rec<L: Leaf>(
    arena: &mut NodeArena<Node<L>>,
    id: NodeId,
    pos: usize,
    value: L::Item,
    fanout: usize,
) -> Option<(NodeId, L::Agg)> {
    let is_leaf = matches!(arena.get(id), Node::Leaf(_));
    if is_leaf {
        let split_off = if let Node::Leaf(leaf) = arena.get_mut(id) {
            leaf.insert(pos, value);
            if leaf.is_full() {
                let split_at = leaf.len() / 2;
                Some(leaf.split_off(split_at))
            } else {
                None
            }
        } else {
            unreachable!()
        };
        if let Some(right) = split_off {
            let right_agg = right.aggregate();
            trace!("leaf split (full at {})", L::CAPACITY);
            let right_id = arena.insert(Node::Leaf(right));
            return Some((right_id, right_agg));
        }
        return None;
    }

    let (idx, base) = match arena.get(id) {
        Node::Internal(internal) => locate_inclusive(internal, pos),
        Node::Leaf(_) => unreachable!(),
    };
    let child_id = match arena.get(id) {
        Node::Internal(internal) => internal.children[idx],
        Node::Leaf(_) => unreachable!(),
    };
    let local_pos = pos - base;

    let split = insert_rec(arena, child_id, local_pos, value, fanout);
    refresh_child_agg(arena, id, idx, child_id);

    if let Some((right_id, right_agg)) = split {
        if let Node::Internal(internal) = arena.get_mut(id) {
            internal.children.insert(idx + 1, right_id);
            internal.aggs.insert(idx + 1, right_agg);
        }
    }

    let overflowed = match arena.get(id) {
        Node::Internal(internal) => internal.children.len() > fanout,
        Node::Leaf(_) => unreachable!(),
    };
    if overflowed {
        let (right_children, right_aggs) = if let Node::Internal(internal) = arena.get_mut(id) {
            let split_at = internal.children.len() / 2;
            let right_children = internal.children.split_off(split_at);
            let right_aggs = internal.aggs.split_off(split_at);
            (right_children, right_aggs)
        } else {
            unreachable!()
        };
        let right_agg = right_aggs.iter().fold(L::Agg::default(), |a, &b| a.combine(b));
        let right_node = InternalNode {
            children: right_children,
            aggs: right_aggs,
        };
        trace!("internal node split (fanout {fanout})");
        let right_id = arena.insert(Node::Internal(right_node));
        return Some((right_id, right_agg));
    }
    None
}

fn rebalance_child<L: Leaf>(
    arena: &mut NodeArena<Node<L>>,
    parent: NodeId,
    idx: usize,
    min_children: usize,
) {
    let (child_id, left_id, right_id) = match arena.get(parent) {
        Node::Internal(internal) => {
            let n = internal.children.len();
            (
                internal.children[idx],
                (idx > 0).then(|| internal.children[idx - 1]),
                (idx + 1 < n).then(|| internal.children[idx + 1]),
            )
        }
        Node::Leaf(_) => unreachable!(),
    };

    if let Some(lid) = left_id {
        let left_len = node_len(arena.get(lid));
        let left_min = node_min_len(arena.get(lid), min_children);
        if left_len > left_min {
            let (left_ref, child_ref) = arena.get2_mut(lid, child_id);
            steal_from_left(left_ref, child_ref);
            refresh_child_agg(arena, parent, idx - 1, lid);
            refresh_child_agg(arena, parent, idx, child_id);
            trace!("stole one element from left sibling");
            return;
        }
    }
    if let Some(rid) = right_id {
        let right_len = node_len(arena.get(rid));
        let right_min = node_min_len(arena.get(rid), min_children);
        if right_len > right_min {
            let (child_ref, right_ref) = arena.get2_mut(child_id, rid);
            steal_from_right(child_ref, right_ref);
            refresh_child_agg(arena, parent, idx, child_id);
            refresh_child_agg(arena, parent, idx + 1, rid);
            trace!("stole one element from right sibling");
            return;
        }
    }
    if let Some(lid) = left_id {
        let (left_ref, child_ref) = arena.get2_mut(lid, child_id);
        merge_into_left(left_ref, child_ref);
        remove_child_entry(arena, parent, idx);
        refresh_child_agg(arena, parent, idx - 1, lid);
        arena.remove(child_id);
        trace!("merged node into left sibling");
        return;
    }
    if let Some(rid) = right_id {
        let (child_ref, right_ref) = arena.get2_mut(child_id, rid);
        merge_into_left(child_ref, right_ref);
        remove_child_entry(arena, parent, idx + 1);
        refresh_child_agg(arena, parent, idx, child_id);
        arena.remove(rid);
        trace!("merged right sibling into node");
    }
}

fn remove_rec<L: Leaf>(
    arena: &mut NodeArena<Node<L>>,
    id: NodeId,
    pos: usize,
    min_children: usize,
) -> (L::Item, bool) {
    let is_leaf = matches!(arena.get(id), Node::Leaf(_));
    if is_leaf {
        if let Node::Leaf(leaf) = arena.get_mut(id) {
            let item = leaf.remove(pos);
            let underflow = leaf.len() < L::min_len();
            return (item, underflow);
        }
        unreachable!();
    }

    let (idx, base) = match arena.get(id) {
        Node::Internal(internal) => locate_exclusive(internal, pos),
        Node::Leaf(_) => unreachable!(),
    };
    let child_id = match arena.get(id) {
        Node::Internal(internal) => internal.children[idx],
        Node::Leaf(_) => unreachable!(),
    };
    let local_pos = pos - base;

    let (item, child_underflow) = remove_rec(arena, child_id, local_pos, min_children);
    refresh_child_agg(arena, id, idx, child_id);

    if child_underflow {
        rebalance_child(arena, id, idx, min_children);
    }

    let self_underflow = match arena.get(id) {
        Node::Internal(internal) => internal.children.len() < min_children,
        Node::Leaf(_) => unreachable!(),
    };
    (item, self_underflow)
}

/// Read-only cursor over a tree's elements, in left-to-right order.
///
/// Any structural mutation on the originating tree (insert, remove,
/// clear, swap) invalidates every outstanding cursor: `next` panics if
/// the tree's generation counter has moved on, forcing callers to
/// re-seek rather than silently reading stale positions.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    pos: usize,
    generation: u64,
}

impl Cursor {
    pub fn next<L: Leaf>(&mut self, tree: &BTree<L>) -> Option<L::Item> {
        assert_eq!(
            self.generation, tree.generation,
            "Cursor used after a structural mutation; re-seek with BTree::cursor()"
        );
        if self.pos >= tree.len() {
            return None;
        }
        let item = tree.at(self.pos);
        self.pos += 1;
        Some(item)
    }
}

/// A generic aggregating B+-tree over leaves of type `L`.
#[derive(Clone, Debug)]
pub struct BTree<L: Leaf> {
    arena: NodeArena<Node<L>>,
    root: NodeId,
    len: usize,
    fanout: usize,
    generation: u64,
}

impl<L: Leaf> BTree<L> {
    pub fn new(fanout: usize) -> Self {
        assert!(fanout >= 4, "internal fanout must be >= 4");
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::Leaf(L::from_slice(&[])));
        BTree {
            arena,
            root,
            len: 0,
            fanout,
            generation: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_agg(&self) -> L::Agg {
        node_aggregate_at(&self.arena, self.root)
    }

    fn min_children(&self) -> usize {
        self.fanout.div_ceil(2)
    }

    /// Builds a balanced tree from a full slice of elements in O(n):
    /// leaves are packed to capacity (the last leaf redistributed with
    /// its neighbor if it would otherwise be underfull), then internal
    /// levels are packed bottom-up to `fanout` children each.
    pub fn build(values: &[L::Item], fanout: usize) -> Self {
        if values.is_empty() {
            return Self::new(fanout);
        }
        let mut leaves: Vec<L> = values.chunks(L::CAPACITY).map(L::from_slice).collect();
        if leaves.len() >= 2 && leaves.last().unwrap().len() < L::min_len() {
            let last = leaves.pop().unwrap();
            let prev = leaves.last_mut().unwrap();
            let combined_len = prev.len() + last.len();
            if combined_len <= L::CAPACITY {
                prev.append_block(&last);
            } else {
                prev.append_block(&last);
                let split_at = prev.len() / 2;
                let right = prev.split_off(split_at);
                leaves.push(right);
            }
        }
        Self::build_from_leaves(leaves, fanout)
    }

    /// Builds a balanced tree directly from an already-chunked,
    /// left-to-right ordered list of leaves (e.g. a leaf stream read
    /// back by the serializer). Leaves are taken as-is: the caller is
    /// responsible for occupancy (this is exactly what
    /// `serde_io::load_*` does, since a saved leaf stream was valid
    /// when written).
    pub fn build_from_leaves(leaves: Vec<L>, fanout: usize) -> Self {
        assert!(fanout >= 4, "internal fanout must be >= 4");
        if leaves.is_empty() {
            return Self::new(fanout);
        }
        let len = leaves.iter().map(|l| l.len()).sum();

        let mut arena: NodeArena<Node<L>> = NodeArena::with_capacity(leaves.len() * 2);
        let mut level_ids: Vec<NodeId> = Vec::with_capacity(leaves.len());
        let mut level_aggs: Vec<L::Agg> = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let agg = leaf.aggregate();
            level_ids.push(arena.insert(Node::Leaf(leaf)));
            level_aggs.push(agg);
        }

        while level_ids.len() > 1 {
            // Group into chunks of `fanout` index ranges, then fix up an
            // underfull last group by folding it into the previous one
            // rather than leaving a sub-minimum internal node.
            let mut bounds: Vec<(usize, usize)> = Vec::new();
            let mut start = 0;
            while start < level_ids.len() {
                let end = (start + fanout).min(level_ids.len());
                bounds.push((start, end));
                start = end;
            }
            let min_children = fanout.div_ceil(2);
            if bounds.len() >= 2 {
                let (last_start, last_end) = *bounds.last().unwrap();
                if last_end - last_start < min_children {
                    bounds.pop();
                    let (prev_start, _prev_end) = bounds.pop().unwrap();
                    bounds.push((prev_start, last_end));
                }
            }
            let groups: Vec<std::ops::Range<usize>> = bounds.iter().map(|&(s, e)| s..e).collect();

            let mut next_ids = Vec::with_capacity(groups.len());
            let mut next_aggs = Vec::with_capacity(groups.len());
            for group in groups {
                let children: Vec<NodeId> = group.clone().map(|i| level_ids[i]).collect();
                let aggs: Vec<L::Agg> = group.map(|i| level_aggs[i]).collect();
                let agg = aggs.iter().fold(L::Agg::default(), |a, &b| a.combine(b));
                let node = InternalNode { children, aggs };
                next_ids.push(arena.insert(Node::Internal(node)));
                next_aggs.push(agg);
            }
            level_ids = next_ids;
            level_aggs = next_aggs;
        }

        let root = level_ids[0];
        trace!("bulk-built tree: {len} elements, fanout {fanout}");
        BTree {
            arena,
            root,
            len,
            fanout,
            generation: 0,
        }
    }

    /// Element at position `i`.
    ///
    /// # Panics
    /// If `i >= len()`.
    pub fn at(&self, i: usize) -> L::Item {
        assert!(i < self.len, "BTree::at index {i} out of bounds (len {})", self.len);
        let mut id = self.root;
        let mut local = i;
        loop {
            match self.arena.get(id) {
                Node::Leaf(leaf) => return leaf.at(local),
                Node::Internal(internal) => {
                    let (idx, base) = locate_exclusive(internal, local);
                    local -= base;
                    id = internal.children[idx];
                }
            }
        }
    }

    /// Cumulative stat (popcount, or sum) over the first `i` elements.
    ///
    /// # Panics
    /// If `i > len()`.
    pub fn rank_stat(&self, i: usize) -> u64 {
        assert!(i <= self.len, "BTree::rank_stat index {i} out of bounds (len {})", self.len);
        let mut id = self.root;
        let mut local = i;
        let mut acc = 0u64;
        loop {
            match self.arena.get(id) {
                Node::Leaf(leaf) => return acc + leaf.prefix_stat(local),
                Node::Internal(internal) => {
                    let (idx, base) = locate_inclusive(internal, local);
                    for agg in &internal.aggs[..idx] {
                        acc += agg.stat();
                    }
                    local -= base;
                    id = internal.children[idx];
                }
            }
        }
    }

    /// Smallest global index `k` with `rank_stat(k+1) >= s`, or `len()`
    /// if `s` exceeds the tree's total stat.
    pub fn search_stat(&self, s: u64) -> usize {
        self.search_by(s, |agg| agg.stat(), |leaf, local| leaf.search_stat(local))
    }

    /// Generic "search by threshold" descent: picks, at every level,
    /// the leftmost child whose cumulative `weight` would first reach
    /// or exceed `target`, then asks `leaf_search` to resolve the exact
    /// index inside the chosen leaf. Used directly for `search_stat`
    /// (natural aggregate) and by [`crate::bitseq::DynamicBitSequence`]
    /// for `select0` (the "count of zero bits" complement aggregate,
    /// which has no cached field of its own but is cheaply derived as
    /// `count - stat` at every child).
    pub fn search_by<W, S>(&self, target: u64, weight: W, leaf_search: S) -> usize
    where
        W: Fn(L::Agg) -> u64,
        S: Fn(&L, u64) -> usize,
    {
        let mut id = self.root;
        let mut base = 0usize;
        let mut remaining = target;
        loop {
            match self.arena.get(id) {
                Node::Leaf(leaf) => return base + leaf_search(leaf, remaining),
                Node::Internal(internal) => {
                    let n = internal.children.len();
                    let mut chosen = n - 1;
                    for i in 0..n {
                        let w = weight(internal.aggs[i]);
                        if remaining <= w || i == n - 1 {
                            chosen = i;
                            break;
                        }
                        remaining -= w;
                        base += internal.aggs[i].count();
                    }
                    id = internal.children[chosen];
                }
            }
        }
    }

    /// Inserts `value` at position `i`.
    ///
    /// # Panics
    /// If `i > len()`.
    pub fn insert(&mut self, i: usize, value: L::Item) {
        assert!(i <= self.len, "BTree::insert index {i} out of bounds (len {})", self.len);
        let split = insert_rec(&mut self.arena, self.root, i, value, self.fanout);
        self.len += 1;
        if let Some((right_id, right_agg)) = split {
            let left_agg = node_aggregate_at(&self.arena, self.root);
            let new_root = InternalNode {
                children: vec![self.root, right_id],
                aggs: vec![left_agg, right_agg],
            };
            self.root = self.arena.insert(Node::Internal(new_root));
            trace!("root split: tree grew by one level");
        }
        self.generation += 1;
    }

    pub fn push_back(&mut self, value: L::Item) {
        self.insert(self.len, value);
    }

    pub fn push_front(&mut self, value: L::Item) {
        self.insert(0, value);
    }

    /// Removes and returns the element at position `i`.
    ///
    /// # Panics
    /// If `i >= len()`.
    pub fn remove(&mut self, i: usize) -> L::Item {
        assert!(i < self.len, "BTree::remove index {i} out of bounds (len {})", self.len);
        let (item, _) = remove_rec(&mut self.arena, self.root, i, self.min_children());
        self.len -= 1;
        loop {
            let only_child = match self.arena.get(self.root) {
                Node::Internal(internal) if internal.children.len() == 1 => {
                    Some(internal.children[0])
                }
                _ => None,
            };
            match only_child {
                Some(child) => {
                    let old_root = self.root;
                    self.root = child;
                    self.arena.remove(old_root);
                    trace!("root shrank by one level");
                }
                None => break,
            }
        }
        self.generation += 1;
        item
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.insert(Node::Leaf(L::from_slice(&[])));
        self.len = 0;
        self.generation += 1;
    }

    /// Exchanges the entire contents (arena, root, length, fanout) of
    /// `self` and `other`. Any cursor outstanding on either side is
    /// invalidated, since a swap counts as a structural mutation on
    /// both trees even though neither tree's own element values moved.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
        self.generation = self.generation.wrapping_add(1);
        other.generation = other.generation.wrapping_add(1);
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            pos: 0,
            generation: self.generation,
        }
    }

    /// Every leaf, left to right. Used by the serializer, which
    /// persists the leaf stream and discards tree topology entirely
    /// (`spec.md` §4.8: "The tree topology is not persisted").
    pub fn leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, id: NodeId, out: &mut Vec<&'a L>) {
        match self.arena.get(id) {
            Node::Leaf(leaf) => out.push(leaf),
            Node::Internal(internal) => {
                for &child in &internal.children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    pub fn to_vec(&self) -> Vec<L::Item> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.cursor();
        while let Some(item) = cursor.next(self) {
            out.push(item);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitblock::BitBlock;
    use crate::vlcblock::VlcBlock;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn bit_tree_insert_matches_naive() {
        let mut tree: BTree<BitBlock> = BTree::new(8);
        let mut naive: Vec<bool> = Vec::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..3000 {
            let i = rng.random_range(0..=naive.len());
            let b = rng.random_bool(0.5);
            tree.insert(i, b);
            naive.insert(i, b);
        }
        assert_eq!(tree.len(), naive.len());
        assert_eq!(tree.to_vec(), naive);
        for i in 0..=naive.len() {
            let naive_rank = naive[..i].iter().filter(|&&x| x).count() as u64;
            assert_eq!(tree.rank_stat(i), naive_rank, "rank_stat({i})");
        }
    }

    #[test]
    fn bit_tree_remove_matches_naive() {
        let mut tree: BTree<BitBlock> = BTree::new(8);
        let mut naive: Vec<bool> = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let i = rng.random_range(0..=naive.len());
            let b = rng.random_bool(0.5);
            tree.insert(i, b);
            naive.insert(i, b);
        }
        for _ in 0..1500 {
            let i = rng.random_range(0..naive.len());
            let expected = naive.remove(i);
            let got = tree.remove(i);
            assert_eq!(got, expected);
        }
        assert_eq!(tree.to_vec(), naive);
    }

    #[test]
    fn int_tree_bulk_build_matches_naive() {
        let values: Vec<u64> = (0..5000).collect();
        let tree: BTree<VlcBlock> = BTree::build(&values, 16);
        assert_eq!(tree.len(), values.len());
        assert_eq!(tree.to_vec(), values);
        assert_eq!(tree.total_agg().sum, values.iter().sum::<u64>());
        for i in (0..values.len()).step_by(97) {
            let naive_prefix: u64 = values[..i].iter().sum();
            assert_eq!(tree.rank_stat(i), naive_prefix);
        }
    }

    #[test]
    fn search_stat_matches_scenario() {
        let values: Vec<u64> = (1..=10).collect();
        let tree: BTree<VlcBlock> = BTree::build(&values, 4);
        assert_eq!(tree.rank_stat(3), 6);
        assert_eq!(tree.search_stat(9), 3);
        assert_eq!(tree.search_stat(1000), 10);
    }

    #[test]
    fn cursor_detects_mutation() {
        let tree: BTree<VlcBlock> = BTree::build(&[1, 2, 3], 4);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.next(&tree), Some(1));
        let mut tree2 = tree.clone();
        tree2.insert(0, 99);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cursor.next(&tree2)));
        assert!(result.is_err(), "cursor must reject a tree with a different generation");
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a: BTree<VlcBlock> = BTree::build(&[1, 2, 3], 4);
        let mut b: BTree<VlcBlock> = BTree::build(&[9, 8], 4);
        a.swap(&mut b);
        assert_eq!(a.to_vec(), vec![9, 8]);
        assert_eq!(b.to_vec(), vec![1, 2, 3]);
    }
}

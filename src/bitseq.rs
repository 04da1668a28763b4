/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! [`DynamicBitSequence`]: a B+-tree of [`crate::bitblock::BitBlock`]
//! leaves under the `(count, popcount)` aggregate, per `spec.md` §4.4.

use std::fmt;
use std::io::{Read, Write};

use crate::bitblock::BitBlock;
use crate::btree::{BTree, Cursor};
use crate::config::TreeConfig;
use crate::error::Result;
use crate::serde_io::{self, StructureTag};

/// A dynamic bit sequence supporting O(log n) access, update, insert,
/// remove, rank, and select.
#[derive(Clone)]
pub struct DynamicBitSequence {
    tree: BTree<BitBlock>,
}

impl Default for DynamicBitSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynamicBitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBitSequence")
            .field("size", &self.size())
            .field("popcount", &self.count_c(true))
            .finish()
    }
}

impl fmt::Display for DynamicBitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size() {
            write!(f, "{}", if self.access(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl DynamicBitSequence {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        DynamicBitSequence {
            tree: BTree::new(config.internal_fanout),
        }
    }

    /// Bulk-builds a sequence from a slice of bits in O(n).
    pub fn build(bits: &[bool]) -> Self {
        Self::build_with_config(bits, TreeConfig::default())
    }

    pub fn build_with_config(bits: &[bool], config: TreeConfig) -> Self {
        DynamicBitSequence {
            tree: BTree::build(bits, config.internal_fanout),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Bit at position `i`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn access(&self, i: usize) -> bool {
        self.tree.at(i)
    }

    /// Number of 1-bits strictly before position `i`.
    ///
    /// # Panics
    /// If `i > size()`.
    pub fn rank1(&self, i: usize) -> usize {
        self.tree.rank_stat(i) as usize
    }

    /// Number of 0-bits strictly before position `i`.
    ///
    /// # Panics
    /// If `i > size()`.
    pub fn rank0(&self, i: usize) -> usize {
        i - self.rank1(i)
    }

    /// Position of the `k`-th (0-indexed) 1-bit.
    ///
    /// # Panics
    /// If fewer than `k + 1` 1-bits exist; callers must check
    /// `k < count_c(true)` first, per `spec.md` §4.4.
    pub fn select1(&self, k: usize) -> usize {
        assert!(k < self.count_c(true), "select1({k}) out of range");
        self.tree
            .search_by(k as u64 + 1, |agg| agg.popcount, |leaf, s| leaf.search1(s))
    }

    /// Position of the `k`-th (0-indexed) 0-bit.
    ///
    /// # Panics
    /// If fewer than `k + 1` 0-bits exist.
    pub fn select0(&self, k: usize) -> usize {
        assert!(k < self.count_c(false), "select0({k}) out of range");
        self.tree.search_by(
            k as u64 + 1,
            |agg| agg.count - agg.popcount,
            |leaf, s| leaf.search0(s),
        )
    }

    /// Position of the `k`-th occurrence of bit `b`.
    pub fn select_b(&self, k: usize, b: bool) -> usize {
        if b {
            self.select1(k)
        } else {
            self.select0(k)
        }
    }

    /// Total count of bit `b`.
    pub fn count_c(&self, b: bool) -> usize {
        let ones = self.tree.total_agg().popcount as usize;
        if b {
            ones
        } else {
            self.size() - ones
        }
    }

    /// Inserts `b` at position `i`.
    ///
    /// # Panics
    /// If `i > size()`.
    pub fn insert(&mut self, i: usize, b: bool) {
        self.tree.insert(i, b);
    }

    /// Removes and returns the bit at position `i`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn remove(&mut self, i: usize) -> bool {
        self.tree.remove(i)
    }

    pub fn push_back(&mut self, b: bool) {
        self.tree.push_back(b);
    }

    pub fn push_front(&mut self, b: bool) {
        self.tree.push_front(b);
    }

    /// Appends every bit of `bits` to the end of the sequence. Spec
    /// allows (but does not require) a faster bulk path than repeated
    /// `push_back`; this implementation keeps the simpler repeated
    /// insert for now, since `BTree` has no dedicated bulk-append entry
    /// point distinct from single-element insert.
    pub fn push_many(&mut self, bits: &[bool]) {
        for &b in bits {
            self.push_back(b);
        }
    }

    pub fn to_vector(&self) -> Vec<bool> {
        self.tree.to_vec()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    pub fn cursor(&self) -> Cursor {
        self.tree.cursor()
    }

    /// Serializes this sequence to `w` per `spec.md` §6's bit-sequence
    /// wire format (tag `0x01`).
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        serde_io::save_bit_sequence(w, &self.tree)
    }

    /// Deserializes a sequence from `r`. On any I/O or format error the
    /// caller gets an [`Error`]; no partial tree is returned.
    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let tree = serde_io::load_bit_sequence(r, StructureTag::Bit)?;
        Ok(DynamicBitSequence { tree })
    }

    pub(crate) fn tree(&self) -> &BTree<BitBlock> {
        &self.tree
    }

    pub(crate) fn from_tree(tree: BTree<BitBlock>) -> Self {
        DynamicBitSequence { tree }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn scenario_from_spec() {
        let bits = [true, false, true, false, true, false, true, false, true, true];
        let s = DynamicBitSequence::build(&bits);
        assert_eq!(s.rank1(4), 2);
        assert_eq!(s.rank0(4), 2);
        assert_eq!(s.select1(2), 4);
        assert_eq!(s.select0(2), 5);
        assert_eq!(s.select0(4), 9);
    }

    #[test]
    fn insert_then_remove_is_identity() {
        let bits = [true, false, true, false, true, false, true, false, true, true];
        let mut s = DynamicBitSequence::build(&bits);
        s.insert(4, true);
        s.remove(4);
        assert_eq!(s.to_vector(), bits);
    }

    #[test]
    fn rank0_plus_rank1_equals_position() {
        let bits: Vec<bool> = (0..500).map(|i| i % 5 < 2).collect();
        let s = DynamicBitSequence::build(&bits);
        for i in 0..=s.size() {
            assert_eq!(s.rank1(i) + s.rank0(i), i);
        }
    }

    #[test]
    fn select_inverts_rank() {
        let bits: Vec<bool> = (0..500).map(|i| (i * 7) % 11 < 4).collect();
        let s = DynamicBitSequence::build(&bits);
        for k in 0..s.count_c(true) {
            let pos = s.select1(k);
            assert_eq!(s.rank1(pos), k);
            assert!(s.access(pos));
        }
        for k in 0..s.count_c(false) {
            let pos = s.select0(k);
            assert_eq!(s.rank0(pos), k);
            assert!(!s.access(pos));
        }
    }

    #[test]
    fn round_trip_save_load() {
        let bits: Vec<bool> = (0..900).map(|i| (i * 13) % 17 < 8).collect();
        let s = DynamicBitSequence::build(&bits);
        let mut buf = Vec::new();
        s.save(&mut buf).unwrap();
        let loaded = DynamicBitSequence::load(&mut &buf[..]).unwrap();
        assert_eq!(loaded.to_vector(), bits);
    }

    #[test]
    fn differential_against_vec_oracle() {
        let mut rng = StdRng::seed_from_u64(123);
        let mut oracle: Vec<bool> = Vec::new();
        let mut seq = DynamicBitSequence::new();
        for _ in 0..4000 {
            match rng.random_range(0..3) {
                0 => {
                    let i = rng.random_range(0..=oracle.len());
                    let b = rng.random_bool(0.5);
                    oracle.insert(i, b);
                    seq.insert(i, b);
                }
                1 if !oracle.is_empty() => {
                    let i = rng.random_range(0..oracle.len());
                    assert_eq!(seq.remove(i), oracle.remove(i));
                }
                _ => {
                    if !oracle.is_empty() {
                        let i = rng.random_range(0..oracle.len());
                        assert_eq!(seq.access(i), oracle[i]);
                    }
                }
            }
        }
        assert_eq!(seq.to_vector(), oracle);
    }

    #[test]
    fn clear_then_build_equals_build() {
        let bits: Vec<bool> = (0..50).map(|i| i % 3 == 0).collect();
        let mut a = DynamicBitSequence::build(&bits);
        a.clear();
        let rebuilt = DynamicBitSequence::build(&bits);
        a.push_many(&bits);
        assert_eq!(a.to_vector(), rebuilt.to_vector());
    }
}

/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! [`DynamicIntSequence`]: a B+-tree of [`crate::vlcblock::VlcBlock`]
//! leaves under the `(count, sum)` aggregate, per `spec.md` §4.5.
//!
//! Searchable Partial Sums with Indels ("SPSI") is the name the
//! succinct-data-structures literature (and the original C++ source
//! this crate's behavior was distilled from) uses for this structure;
//! it is noted here only as a pointer for readers already familiar
//! with that term.

use std::fmt;
use std::io::{Read, Write};

use crate::btree::{BTree, Cursor};
use crate::config::TreeConfig;
use crate::error::Result;
use crate::serde_io::{self, StructureTag};
use crate::vlcblock::VlcBlock;

/// A dynamic sequence of unsigned integers supporting O(log n) access,
/// update, insert, remove, prefix-sum, and predecessor search.
#[derive(Clone)]
pub struct DynamicIntSequence {
    tree: BTree<VlcBlock>,
}

impl Default for DynamicIntSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynamicIntSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicIntSequence")
            .field("size", &self.size())
            .field("sum", &self.sum())
            .finish()
    }
}

impl fmt::Display for DynamicIntSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.size() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.at(i))?;
        }
        write!(f, "]")
    }
}

impl DynamicIntSequence {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        DynamicIntSequence {
            tree: BTree::new(config.internal_fanout),
        }
    }

    /// Bulk-builds a sequence from a slice of values in O(n).
    pub fn build(values: &[u64]) -> Self {
        Self::build_with_config(values, TreeConfig::default())
    }

    pub fn build_with_config(values: &[u64], config: TreeConfig) -> Self {
        DynamicIntSequence {
            tree: BTree::build(values, config.internal_fanout),
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

    /// Value at position `i`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn at(&self, i: usize) -> u64 {
        self.tree.at(i)
    }

    /// Sum of the first `i` values.
    ///
    /// # Panics
    /// If `i > size()`.
    pub fn prefix_sum(&self, i: usize) -> u64 {
        self.tree.rank_stat(i)
    }

    /// Total sum of all values.
    pub fn sum(&self) -> u64 {
        self.tree.total_agg().sum
    }

    /// Smallest index `k` with `prefix_sum(k+1) >= s`, or `size()` if
    /// `s` exceeds the total sum.
    pub fn search(&self, s: u64) -> usize {
        self.tree.search_stat(s)
    }

    /// Inserts `v` at position `i`.
    ///
    /// # Panics
    /// If `i > size()`.
    pub fn insert(&mut self, i: usize, v: u64) {
        self.tree.insert(i, v);
    }

    /// Removes and returns the value at position `i`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn remove(&mut self, i: usize) -> u64 {
        self.tree.remove(i)
    }

    pub fn push_back(&mut self, v: u64) {
        self.tree.push_back(v);
    }

    pub fn push_front(&mut self, v: u64) {
        self.tree.push_front(v);
    }

    pub fn push_many(&mut self, values: &[u64]) {
        for &v in values {
            self.push_back(v);
        }
    }

    /// Overwrites the value at `i` with `v`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn set(&mut self, i: usize, v: u64) {
        let old = self.at(i);
        if v >= old {
            self.increment(i, v - old);
        } else {
            self.decrement(i, old - v);
        }
    }

    /// Adds `delta` to the value at `i`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn increment(&mut self, i: usize, delta: u64) {
        let v = self.at(i);
        self.remove(i);
        self.insert(i, v + delta);
    }

    /// Subtracts `delta` from the value at `i`.
    ///
    /// # Panics
    /// If `i >= size()` or `delta` exceeds the current value.
    pub fn decrement(&mut self, i: usize, delta: u64) {
        let v = self.at(i);
        assert!(delta <= v, "decrement({i}, {delta}) would underflow value {v}");
        self.remove(i);
        self.insert(i, v - delta);
    }

    pub fn to_vector(&self) -> Vec<u64> {
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

    /// Serializes this sequence to `w` per `spec.md` §6's prefix-sum
    /// wire format (tag `0x02`).
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        serde_io::save_int_sequence(w, &self.tree)
    }

    /// Deserializes a sequence from `r`.
    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let tree = serde_io::load_int_sequence(r, StructureTag::PrefixSum)?;
        Ok(DynamicIntSequence { tree })
    }

    pub(crate) fn tree(&self) -> &BTree<VlcBlock> {
        &self.tree
    }

    pub(crate) fn from_tree(tree: BTree<VlcBlock>) -> Self {
        DynamicIntSequence { tree }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn scenario_from_spec() {
        let values: Vec<u64> = (1..=10).collect();
        let s = DynamicIntSequence::build(&values);
        assert_eq!(s.prefix_sum(3), 6);
        assert_eq!(s.search(9), 3);
        assert_eq!(s.search(1000), 10);
    }

    #[test]
    fn increment_decrement_roundtrip() {
        let values: Vec<u64> = (1..=10).collect();
        let mut s = DynamicIntSequence::build(&values);
        s.increment(3, 10);
        assert_eq!(s.at(3), 14);
        s.decrement(3, 10);
        assert_eq!(s.at(3), 4);
        assert_eq!(s.to_vector(), values);
    }

    #[test]
    fn zero_is_a_valid_value() {
        let mut s = DynamicIntSequence::new();
        s.push_back(0);
        s.push_back(5);
        s.push_back(0);
        assert_eq!(s.sum(), 5);
        assert_eq!(s.prefix_sum(2), 5);
    }

    #[test]
    fn insert_then_remove_is_identity() {
        let values: Vec<u64> = (0..200).map(|i| i * i % 37).collect();
        let mut s = DynamicIntSequence::build(&values);
        s.insert(50, 999);
        s.remove(50);
        assert_eq!(s.to_vector(), values);
    }

    #[test]
    fn search_matches_naive_predecessor() {
        let values: Vec<u64> = (0..300).map(|i| (i % 5) as u64).collect();
        let s = DynamicIntSequence::build(&values);
        let total = s.sum();
        for target in (0..=total + 5).step_by(3) {
            let k = s.search(target);
            let naive = {
                let mut acc = 0u64;
                let mut found = values.len();
                for (idx, &v) in values.iter().enumerate() {
                    acc += v;
                    if acc >= target {
                        found = idx;
                        break;
                    }
                }
                found
            };
            assert_eq!(k, naive, "search({target})");
        }
    }

    #[test]
    fn round_trip_save_load() {
        let values: Vec<u64> = (0..700).map(|i| (i * 31) % 5000).collect();
        let s = DynamicIntSequence::build(&values);
        let mut buf = Vec::new();
        s.save(&mut buf).unwrap();
        let loaded = DynamicIntSequence::load(&mut &buf[..]).unwrap();
        assert_eq!(loaded.to_vector(), values);
    }

    #[test]
    fn differential_against_vec_oracle() {
        let mut rng = StdRng::seed_from_u64(321);
        let mut oracle: Vec<u64> = Vec::new();
        let mut seq = DynamicIntSequence::new();
        for _ in 0..3000 {
            match rng.random_range(0..4) {
                0 => {
                    let i = rng.random_range(0..=oracle.len());
                    let v = rng.random_range(0..1000);
                    oracle.insert(i, v);
                    seq.insert(i, v);
                }
                1 if !oracle.is_empty() => {
                    let i = rng.random_range(0..oracle.len());
                    assert_eq!(seq.remove(i), oracle.remove(i));
                }
                2 if !oracle.is_empty() => {
                    let i = rng.random_range(0..oracle.len());
                    let delta = rng.random_range(0..500);
                    oracle[i] += delta;
                    seq.increment(i, delta);
                }
                _ => {
                    if !oracle.is_empty() {
                        let i = rng.random_range(0..oracle.len());
                        assert_eq!(seq.at(i), oracle[i]);
                    }
                }
            }
        }
        assert_eq!(seq.to_vector(), oracle);
        assert_eq!(seq.sum(), oracle.iter().sum::<u64>());
    }
}

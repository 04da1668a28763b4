/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! [`DynamicPermutation`]: a pair of dynamic integer sequences, πFwd and
//! πInv, each holding the other side's current position for the same
//! element, plus [`PermutationBuilder`] for bulk construction.
//!
//! The defining invariant (`spec.md` §4.7) is `πInv[πFwd[i]] = i` for
//! every `i`. Because `πFwd[i]` is itself a valid index into `πInv` (and
//! vice versa), an edit on one side that shifts positions past some
//! threshold must walk the other side and shift every stored value past
//! that same threshold to keep pointing at the right slot. That walk is
//! what makes `insert`/`erase`/`move_pi_index` `O(n)` rather than
//! `O(log n)` — see `DESIGN.md`.

use std::fmt;
use std::io::{Read, Write};

use crate::error::Error;
use crate::error::Result;
use crate::intseq::DynamicIntSequence;
use crate::serde_io::{self, StructureTag};

/// A dynamic permutation: two coupled sequences of cross-references
/// supporting O(log n) access, inverse lookup, insert, erase, and
/// position move.
#[derive(Clone)]
pub struct DynamicPermutation {
    fwd: DynamicIntSequence,
    inv: DynamicIntSequence,
}

impl Default for DynamicPermutation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynamicPermutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicPermutation")
            .field("size", &self.size())
            .finish()
    }
}

impl fmt::Display for DynamicPermutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.size() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.fwd.at(i))?;
        }
        write!(f, "]")
    }
}

impl DynamicPermutation {
    pub fn new() -> Self {
        DynamicPermutation {
            fwd: DynamicIntSequence::new(),
            inv: DynamicIntSequence::new(),
        }
    }

    /// Bulk-builds a permutation from `values`, a permutation of
    /// `0..values.len()`. `values[i]` becomes `πFwd[i]`; the inverse
    /// side is the ordinary mathematical inverse of that permutation,
    /// which already satisfies `πInv[πFwd[i]] = i`.
    ///
    /// # Panics
    /// If `values` is not a permutation of `0..values.len()`.
    pub fn build(values: &[u64]) -> Self {
        let n = values.len();
        let mut inv_values = vec![u64::MAX; n];
        for (i, &v) in values.iter().enumerate() {
            let idx = usize::try_from(v).expect("permutation value out of range");
            assert!(idx < n, "DynamicPermutation::build: value {v} is not < {n}");
            assert_eq!(inv_values[idx], u64::MAX, "DynamicPermutation::build: {v} repeated");
            inv_values[idx] = i as u64;
        }
        let fwd = DynamicIntSequence::build(values);
        let inv = DynamicIntSequence::build(&inv_values);
        DynamicPermutation { fwd, inv }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.fwd.size()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// `πFwd[i]`: the inverse-side position paired with forward
    /// position `i`.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn access(&self, i: usize) -> u64 {
        self.fwd.at(i)
    }

    /// `πInv[j]`: the forward-side position paired with inverse
    /// position `j`. For an instance built from a dense `0..n`
    /// permutation, this is the ordinary inverse-permutation lookup
    /// (the forward position holding value `j`), and in general it
    /// satisfies `inverse(access(k)) == k` for every valid `k`.
    ///
    /// # Panics
    /// If `j >= size()`.
    pub fn inverse(&self, j: usize) -> u64 {
        self.inv.at(j)
    }

    /// Inserts a new element pairing forward position `i` with inverse
    /// position `j`.
    ///
    /// Every existing forward value `>= j` is incremented, since the
    /// new inverse row at `j` pushes every inverse position at or past
    /// `j` one slot to the right; symmetrically every existing inverse
    /// value `>= i` is incremented. This keeps `πInv[πFwd[k]] = k` for
    /// every `k`, old and new.
    ///
    /// # Panics
    /// If `i > size()` or `j > size()`.
    pub fn insert(&mut self, i: usize, j: usize) {
        assert!(i <= self.size(), "DynamicPermutation::insert: i={i} out of bounds");
        assert!(j <= self.size(), "DynamicPermutation::insert: j={j} out of bounds");
        for k in 0..self.fwd.size() {
            let v = self.fwd.at(k);
            if v >= j as u64 {
                self.fwd.set(k, v + 1);
            }
        }
        for k in 0..self.inv.size() {
            let v = self.inv.at(k);
            if v >= i as u64 {
                self.inv.set(k, v + 1);
            }
        }
        self.fwd.insert(i, j as u64);
        self.inv.insert(j, i as u64);
    }

    /// Removes forward position `i` and its paired inverse entry.
    ///
    /// # Panics
    /// If `i >= size()`.
    pub fn erase(&mut self, i: usize) {
        assert!(i < self.size(), "DynamicPermutation::erase: i={i} out of bounds");
        let j = self.fwd.at(i) as usize;
        self.fwd.remove(i);
        self.inv.remove(j);
        for k in 0..self.fwd.size() {
            let v = self.fwd.at(k);
            if v > j as u64 {
                self.fwd.set(k, v - 1);
            }
        }
        for k in 0..self.inv.size() {
            let v = self.inv.at(k);
            if v > i as u64 {
                self.inv.set(k, v - 1);
            }
        }
    }

    /// Moves the entry at forward position `i` to forward position
    /// `i'`, keeping it paired with the same inverse-side entry: the
    /// paired `πInv` slot is repointed at `i'` instead of gaining a
    /// fresh pairing, and every other cross-reference past the moved
    /// span is shifted to compensate.
    ///
    /// # Panics
    /// If `i >= size()` or `i' >= size()`.
    pub fn move_pi_index(&mut self, i: usize, i_prime: usize) {
        assert!(i < self.size(), "DynamicPermutation::move_pi_index: i={i} out of bounds");
        assert!(i_prime < self.size(), "DynamicPermutation::move_pi_index: i'={i_prime} out of bounds");
        if i == i_prime {
            return;
        }
        let v = self.fwd.at(i) as usize;
        self.fwd.remove(i);
        for k in 0..self.inv.size() {
            if k == v {
                continue;
            }
            let val = self.inv.at(k);
            if val > i as u64 {
                self.inv.set(k, val - 1);
            }
        }
        self.fwd.insert(i_prime, v as u64);
        for k in 0..self.inv.size() {
            if k == v {
                continue;
            }
            let val = self.inv.at(k);
            if val >= i_prime as u64 {
                self.inv.set(k, val + 1);
            }
        }
        self.inv.set(v, i_prime as u64);
    }

    pub fn clear(&mut self) {
        self.fwd.clear();
        self.inv.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.fwd.swap(&mut other.fwd);
        self.inv.swap(&mut other.inv);
    }

    pub fn get_pi_vector(&self) -> Vec<u64> {
        self.fwd.to_vector()
    }

    pub fn get_inverse_pi_vector(&self) -> Vec<u64> {
        self.inv.to_vector()
    }

    /// Serializes this permutation per `spec.md` §6 (tag `0x04`): a
    /// shared element count, then the forward prefix-sum body, then the
    /// inverse prefix-sum body.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        serde_io::write_tag_and_len(w, StructureTag::Permutation, self.size() as u64)?;
        serde_io::write_int_body(w, self.fwd.tree())?;
        serde_io::write_int_body(w, self.inv.tree())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        serde_io::read_tag(r, StructureTag::Permutation)?;
        let declared_len = serde_io::read_len(r)?;
        let fwd_tree = serde_io::read_int_body(r)?;
        let inv_tree = serde_io::read_int_body(r)?;
        if fwd_tree.len() as u64 != declared_len || inv_tree.len() as u64 != declared_len {
            return Err(Error::ChecksumMismatch {
                expected: declared_len,
                found: fwd_tree.len() as u64,
            });
        }
        let fwd = DynamicIntSequence::from_tree(fwd_tree);
        let inv = DynamicIntSequence::from_tree(inv_tree);
        Ok(DynamicPermutation { fwd, inv })
    }
}

/// Accumulates values for a bulk `DynamicPermutation` build, avoiding
/// one-at-a-time `insert` calls when the whole permutation is known up
/// front.
#[derive(Clone, Default)]
pub struct PermutationBuilder {
    values: Vec<u64>,
}

impl PermutationBuilder {
    pub fn new() -> Self {
        PermutationBuilder { values: Vec::new() }
    }

    pub fn push(&mut self, v: u64) {
        self.values.push(v);
    }

    pub fn push_front(&mut self, v: u64) {
        self.values.insert(0, v);
    }

    pub fn extend(&mut self, values: &[u64]) {
        self.values.extend_from_slice(values);
    }

    pub fn build(self) -> DynamicPermutation {
        DynamicPermutation::build(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Checks `πInv[πFwd[k]] = k` for every position, the defining
    /// invariant of the representation.
    fn check_invariant(p: &DynamicPermutation) {
        for k in 0..p.size() {
            let j = p.access(k) as usize;
            assert_eq!(p.inverse(j), k as u64, "inverse(access({k})) must equal {k}");
        }
    }

    #[test]
    fn scenario_from_spec() {
        let values: Vec<u64> = vec![0, 3, 1, 2, 5, 4, 9, 8, 7, 6];
        let p = DynamicPermutation::build(&values);
        assert_eq!(p.access(3), 2);
        assert_eq!(p.inverse(3), 1);
        check_invariant(&p);
    }

    #[test]
    fn insert_matches_spec_scenario_six() {
        let values: Vec<u64> = vec![0, 3, 1, 2, 5, 4, 9, 8, 7, 6];
        let mut p = DynamicPermutation::build(&values);
        p.insert(1, 2);
        assert_eq!(p.size(), 11);
        check_invariant(&p);
        for k in 0..p.size() {
            assert_eq!(p.inverse(p.access(k) as usize), k as u64);
        }
    }

    #[test]
    fn insert_then_erase_is_identity() {
        let values: Vec<u64> = (0..20).collect();
        let mut p = DynamicPermutation::build(&values);
        p.insert(5, 5);
        assert_eq!(p.size(), 21);
        check_invariant(&p);
        p.erase(5);
        assert_eq!(p.get_pi_vector(), values);
        assert_eq!(p.get_inverse_pi_vector(), values);
    }

    #[test]
    fn move_pi_index_preserves_id_and_inverse() {
        let values: Vec<u64> = (0..10).collect();
        let mut p = DynamicPermutation::build(&values);
        let id = p.access(1);
        let dual = p.inverse(id as usize);
        assert_eq!(dual, 1);
        p.move_pi_index(1, 0);
        assert_eq!(p.access(0), id);
        assert_eq!(p.inverse(id as usize), 0);
        check_invariant(&p);
    }

    #[test]
    fn move_pi_index_to_a_later_position() {
        let values: Vec<u64> = vec![0, 3, 1, 2, 5, 4, 9, 8, 7, 6];
        let mut p = DynamicPermutation::build(&values);
        let id = p.access(1);
        p.move_pi_index(1, 6);
        assert_eq!(p.access(6), id);
        assert_eq!(p.inverse(id as usize), 6);
        check_invariant(&p);
    }

    #[test]
    fn round_trip_save_load() {
        let values: Vec<u64> = (0..64).collect();
        let mut p = DynamicPermutation::build(&values);
        p.insert(3, 10);
        p.erase(20);
        let mut buf = Vec::new();
        p.save(&mut buf).unwrap();
        let loaded = DynamicPermutation::load(&mut &buf[..]).unwrap();
        assert_eq!(loaded.get_pi_vector(), p.get_pi_vector());
        assert_eq!(loaded.get_inverse_pi_vector(), p.get_inverse_pi_vector());
        check_invariant(&loaded);
    }

    #[test]
    fn builder_matches_build() {
        let values: Vec<u64> = vec![4, 0, 3, 1, 2];
        let mut b = PermutationBuilder::new();
        b.extend(&values);
        let p = b.build();
        assert_eq!(p.get_pi_vector(), values);
        check_invariant(&p);
    }

    #[test]
    fn differential_against_naive_oracle() {
        let mut rng = StdRng::seed_from_u64(77);
        let values: Vec<u64> = (0..30).collect();
        let mut p = DynamicPermutation::build(&values);
        // Oracle mirrors the same cross-reference representation, but
        // on plain `Vec<u64>` rather than through the B+-tree engine,
        // so this test exercises `DynamicIntSequence` under the exact
        // access pattern `DynamicPermutation` drives it with.
        let mut oracle_fwd = values.clone();
        let mut oracle_inv = values.clone();

        for _ in 0..500 {
            if oracle_fwd.len() > 1 && rng.random_bool(0.15) {
                let i = rng.random_range(0..oracle_fwd.len());
                let mut i_prime = rng.random_range(0..oracle_fwd.len());
                while i_prime == i {
                    i_prime = rng.random_range(0..oracle_fwd.len());
                }
                let v = oracle_fwd.remove(i);
                for val in oracle_inv.iter_mut() {
                    if *val as usize == v as usize {
                        continue;
                    }
                    if *val > i as u64 {
                        *val -= 1;
                    }
                }
                oracle_fwd.insert(i_prime, v);
                for val in oracle_inv.iter_mut() {
                    if *val as usize == v as usize {
                        continue;
                    }
                    if *val >= i_prime as u64 {
                        *val += 1;
                    }
                }
                oracle_inv[v as usize] = i_prime as u64;
                p.move_pi_index(i, i_prime);
            } else if !oracle_fwd.is_empty() && rng.random_bool(0.4) {
                let i = rng.random_range(0..oracle_fwd.len());
                let j = oracle_fwd[i] as usize;
                oracle_fwd.remove(i);
                oracle_inv.remove(j);
                for v in oracle_fwd.iter_mut() {
                    if *v > j as u64 {
                        *v -= 1;
                    }
                }
                for v in oracle_inv.iter_mut() {
                    if *v > i as u64 {
                        *v -= 1;
                    }
                }
                p.erase(i);
            } else {
                let i = rng.random_range(0..=oracle_fwd.len());
                let j = rng.random_range(0..=oracle_inv.len());
                for v in oracle_fwd.iter_mut() {
                    if *v >= j as u64 {
                        *v += 1;
                    }
                }
                for v in oracle_inv.iter_mut() {
                    if *v >= i as u64 {
                        *v += 1;
                    }
                }
                oracle_fwd.insert(i, j as u64);
                oracle_inv.insert(j, i as u64);
                p.insert(i, j);
            }
        }
        assert_eq!(p.get_pi_vector(), oracle_fwd);
        assert_eq!(p.get_inverse_pi_vector(), oracle_inv);
        check_invariant(&p);
    }
}

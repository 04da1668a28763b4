/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Tunable capacity constants for the B+-tree engine and its leaves.
//!
//! The defaults below are compile-time constants, but every tree
//! constructor also accepts a [`TreeConfig`] so callers can tune fanout
//! and leaf capacity without forking the crate.

/// Number of `u64` words backing a bit block (8 words = 512 bits, one
/// cache line's worth of payload).
pub const BIT_BLOCK_WORDS: usize = 8;

/// Bit block capacity in bits.
pub const B_BITS: usize = BIT_BLOCK_WORDS * 64;

/// Maximum number of values held in a single VLC block.
pub const B_VALS: usize = 128;

/// Default internal-node fanout.
pub const D: usize = 64;

/// Runtime-tunable shape of an aggregating B+-tree.
///
/// Only `internal_fanout` is actually read by the tree today (leaf
/// capacity is fixed by the block type at compile time), but the field
/// is kept distinct from the constant above so a future leaf type with a
/// runtime-chosen capacity has somewhere to live without changing every
/// call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum children per internal node (must be >= 4).
    pub internal_fanout: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig { internal_fanout: D }
    }
}

impl TreeConfig {
    /// Builds a config with a custom internal fanout.
    ///
    /// # Panics
    /// If `internal_fanout < 4` (a fanout that small cannot satisfy the
    /// "every non-root node holds between `ceil(D/2)` and `D` children"
    /// invariant alongside a 2-element minimum split).
    pub fn with_fanout(internal_fanout: usize) -> Self {
        assert!(internal_fanout >= 4, "internal_fanout must be >= 4");
        TreeConfig { internal_fanout }
    }
}

/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
// No warnings
//#![deny(warnings)]
// for now we don't need any new feature but we might remove this in the future
#![deny(unstable_features)]
// no dead code
//#![deny(dead_code)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
//#![deny(unused_results)]

// the code must be documented and everything should have a debug print implementation
#![deny(unused_doc_comments)]
//#![deny(missing_docs)]
//#![deny(clippy::missing_docs_in_private_items)]
//#![deny(clippy::missing_errors_doc)]
//#![deny(clippy::missing_panics_doc)]
//#![deny(clippy::missing_safety_doc)]

mod arena;
mod bitblock;
pub mod bitseq;
mod btree;
pub mod config;
pub mod error;
pub mod intseq;
pub mod permutation;
mod serde_io;
mod vlcblock;
pub mod wavelet;

pub use bitseq::DynamicBitSequence;
pub use config::TreeConfig;
pub use error::{Error, Result};
pub use intseq::DynamicIntSequence;
pub use permutation::{DynamicPermutation, PermutationBuilder};
pub use wavelet::DynamicWaveletTree;

/// Prelude module re-exporting this crate's five public types and its
/// error/config surface in one place.
pub mod prelude {
    pub use crate::config::TreeConfig;
    pub use crate::error::{Error, Result};
    pub use crate::{
        DynamicBitSequence, DynamicIntSequence, DynamicPermutation, DynamicWaveletTree,
        PermutationBuilder,
    };
}

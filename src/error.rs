/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Error type for the fallible surfaces of this crate: serialization and
//! deserialization. In-memory tree operations never fail (see the crate
//! root docs); they panic on precondition violation instead.

/// Errors produced while saving or loading a sequence.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The leading tag byte did not match the structure being loaded.
    #[error("tag mismatch: expected {expected:#04x}, found {found:#04x}")]
    TagMismatch { expected: u8, found: u8 },

    /// The trailing aggregate checksum did not match the leaves read.
    #[error("checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: u64, found: u64 },

    /// A leaf claimed a length that cannot fit in its declared capacity,
    /// or exceeds the format's maximum.
    #[error("invalid leaf length: capacity {capacity}, found {found}")]
    InvalidLeafLength { capacity: usize, found: usize },

    /// A wavelet tree's persisted alphabet size did not match its body.
    #[error("alphabet mismatch: declared {declared} symbols, found {found}")]
    AlphabetMismatch { declared: usize, found: usize },
}

/// A `Result` defaulting its error to this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn tag_mismatch(expected: u8, found: u8) -> Self {
        Error::TagMismatch { expected, found }
    }
}

/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Bit-packed save/load format shared by every structure in this
//! crate, per `spec.md` §4.8 and §6. Hand-rolled over `std::io::{Read,
//! Write}` rather than through `serde`/`epserde` derive machinery: the
//! wire layout here is a fixed bit-packed format dictated by the spec,
//! not an arbitrary Rust value graph, and the tree topology is
//! deliberately *not* persisted (`load` always bulk-rebuilds from the
//! leaf stream), so there is no value-graph shape for a derive macro to
//! mirror in the first place.

use std::io::{Read, Write};

use crate::bitblock::BitBlock;
use crate::btree::BTree;
use crate::config::D;
use crate::error::{Error, Result};
use crate::vlcblock::VlcBlock;

/// Leading tag byte identifying which structure a stream holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StructureTag {
    Bit = 0x01,
    PrefixSum = 0x02,
    Wavelet = 0x03,
    Permutation = 0x04,
}

fn write_u8<W: Write>(w: &mut W, v: u8) -> Result<()> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32_le<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Appends fixed-width values to a byte buffer LSB-first, one bit at a
/// time, matching the wire format's "packed codewords"/"packed bits"
/// framing.
struct BitPacker {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitPacker {
    fn new() -> Self {
        BitPacker {
            bytes: Vec::new(),
            bit_len: 0,
        }
    }

    fn push_bits(&mut self, value: u64, width: u32) {
        for i in 0..width {
            let bit = (value >> i) & 1 == 1;
            let byte_idx = self.bit_len / 8;
            if byte_idx == self.bytes.len() {
                self.bytes.push(0);
            }
            if bit {
                self.bytes[byte_idx] |= 1 << (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

struct BitUnpacker<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitUnpacker<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitUnpacker { bytes, bit_pos: 0 }
    }

    fn read_bits(&mut self, width: u32) -> u64 {
        let mut v = 0u64;
        for i in 0..width {
            let byte_idx = self.bit_pos / 8;
            let bit = (self.bytes[byte_idx] >> (self.bit_pos % 8)) & 1;
            v |= (bit as u64) << i;
            self.bit_pos += 1;
        }
        v
    }
}

/// Writes a bit-sequence body (leaf count + per-leaf bit length/packed
/// bits), without the outer tag/length header — reused standalone by
/// every internal node of a wavelet tree.
pub(crate) fn write_bit_body<W: Write>(w: &mut W, tree: &BTree<BitBlock>) -> Result<()> {
    let leaves = tree.leaves();
    write_u64_le(w, leaves.len() as u64)?;
    for leaf in leaves {
        let bits = leaf.to_vec();
        write_u32_le(w, bits.len() as u32)?;
        let mut packer = BitPacker::new();
        for b in &bits {
            packer.push_bits(*b as u64, 1);
        }
        w.write_all(&packer.into_bytes())?;
    }
    Ok(())
}

pub(crate) fn read_bit_body<R: Read>(r: &mut R) -> Result<BTree<BitBlock>> {
    let leaf_count = read_u64_le(r)?;
    let mut leaves = Vec::new();
    for _ in 0..leaf_count {
        let bit_len = read_u32_le(r)? as usize;
        if bit_len > BitBlock::CAPACITY {
            return Err(Error::InvalidLeafLength {
                capacity: BitBlock::CAPACITY,
                found: bit_len,
            });
        }
        let nbytes = bit_len.div_ceil(8);
        let mut buf = vec![0u8; nbytes];
        r.read_exact(&mut buf)?;
        let mut unpacker = BitUnpacker::new(&buf);
        let bits: Vec<bool> = (0..bit_len).map(|_| unpacker.read_bits(1) == 1).collect();
        leaves.push(BitBlock::from_slice(&bits));
    }
    Ok(BTree::build_from_leaves(leaves, D))
}

pub fn save_bit_sequence<W: Write>(w: &mut W, tree: &BTree<BitBlock>) -> Result<()> {
    write_u8(w, StructureTag::Bit as u8)?;
    write_u64_le(w, tree.len() as u64)?;
    write_bit_body(w, tree)
}

pub fn load_bit_sequence<R: Read>(r: &mut R, expected: StructureTag) -> Result<BTree<BitBlock>> {
    let tag = read_u8(r)?;
    if tag != expected as u8 {
        return Err(Error::tag_mismatch(expected as u8, tag));
    }
    let declared_len = read_u64_le(r)?;
    let tree = read_bit_body(r)?;
    if tree.len() as u64 != declared_len {
        return Err(Error::ChecksumMismatch {
            expected: declared_len,
            found: tree.len() as u64,
        });
    }
    Ok(tree)
}

/// Writes a prefix-sum body (leaf count + per-leaf width/count/packed
/// codewords, then a trailing sum checksum), without the outer
/// tag/length header — reused standalone by both halves of a
/// permutation.
pub(crate) fn write_int_body<W: Write>(w: &mut W, tree: &BTree<VlcBlock>) -> Result<()> {
    let leaves = tree.leaves();
    write_u64_le(w, leaves.len() as u64)?;
    for leaf in &leaves {
        let width = leaf.width();
        assert!(width <= 64, "codeword width {width} exceeds u64");
        write_u8(w, width as u8)?;
        write_u32_le(w, leaf.len() as u32)?;
        let mut packer = BitPacker::new();
        for &v in leaf.raw_values() {
            packer.push_bits(v, width);
        }
        w.write_all(&packer.into_bytes())?;
    }
    write_u64_le(w, tree.total_agg().sum)
}

pub(crate) fn read_int_body<R: Read>(r: &mut R) -> Result<BTree<VlcBlock>> {
    let leaf_count = read_u64_le(r)?;
    let mut leaves = Vec::new();
    for _ in 0..leaf_count {
        let width = read_u8(r)? as u32;
        let count = read_u32_le(r)? as usize;
        if count > VlcBlock::CAPACITY {
            return Err(Error::InvalidLeafLength {
                capacity: VlcBlock::CAPACITY,
                found: count,
            });
        }
        let total_bits = width as usize * count;
        let nbytes = total_bits.div_ceil(8);
        let mut buf = vec![0u8; nbytes];
        r.read_exact(&mut buf)?;
        let mut unpacker = BitUnpacker::new(&buf);
        let values: Vec<u64> = (0..count).map(|_| unpacker.read_bits(width)).collect();
        leaves.push(VlcBlock::from_slice(&values));
    }
    let checksum = read_u64_le(r)?;
    let tree = BTree::build_from_leaves(leaves, D);
    if tree.total_agg().sum != checksum {
        return Err(Error::ChecksumMismatch {
            expected: checksum,
            found: tree.total_agg().sum,
        });
    }
    Ok(tree)
}

pub fn save_int_sequence<W: Write>(w: &mut W, tree: &BTree<VlcBlock>) -> Result<()> {
    write_u8(w, StructureTag::PrefixSum as u8)?;
    write_u64_le(w, tree.len() as u64)?;
    write_int_body(w, tree)
}

pub fn load_int_sequence<R: Read>(r: &mut R, expected: StructureTag) -> Result<BTree<VlcBlock>> {
    let tag = read_u8(r)?;
    if tag != expected as u8 {
        return Err(Error::tag_mismatch(expected as u8, tag));
    }
    let declared_len = read_u64_le(r)?;
    let tree = read_int_body(r)?;
    if tree.len() as u64 != declared_len {
        return Err(Error::ChecksumMismatch {
            expected: declared_len,
            found: tree.len() as u64,
        });
    }
    Ok(tree)
}

pub(crate) fn write_tag_and_len<W: Write>(w: &mut W, tag: StructureTag, len: u64) -> Result<()> {
    write_u8(w, tag as u8)?;
    write_u64_le(w, len)
}

pub(crate) fn read_tag<R: Read>(r: &mut R, expected: StructureTag) -> Result<()> {
    let tag = read_u8(r)?;
    if tag != expected as u8 {
        return Err(Error::tag_mismatch(expected as u8, tag));
    }
    Ok(())
}

pub(crate) fn read_len<R: Read>(r: &mut R) -> Result<u64> {
    read_u64_le(r)
}

pub(crate) fn write_u8_pub<W: Write>(w: &mut W, v: u8) -> Result<()> {
    write_u8(w, v)
}

pub(crate) fn read_u8_pub<R: Read>(r: &mut R) -> Result<u8> {
    read_u8(r)
}

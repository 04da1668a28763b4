/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![feature(test)]
extern crate test;
use test::{black_box, Bencher};

use succinct_seq::{DynamicBitSequence, DynamicIntSequence};

const VALUES: usize = 10_000;
const SEED: u64 = 0x8c2b_781f_2866_90fd;

struct Rng(u64);
impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x << 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

fn random_bits(n: usize, seed: u64) -> Vec<bool> {
    let mut rng = Rng(seed);
    (0..n).map(|_| rng.next() % 2 == 0).collect()
}

fn random_values(n: usize, seed: u64, modulus: u64) -> Vec<u64> {
    let mut rng = Rng(seed);
    (0..n).map(|_| rng.next() % modulus).collect()
}

#[bench]
fn bit_insert(b: &mut Bencher) {
    let bits = random_bits(VALUES, SEED);
    b.iter(|| {
        let mut s = DynamicBitSequence::new();
        for &bit in &bits {
            s.push_back(black_box(bit));
        }
        black_box(s.size());
    });
}

#[bench]
fn bit_rank(b: &mut Bencher) {
    let bits = random_bits(VALUES, SEED);
    let s = DynamicBitSequence::build(&bits);
    let mut rng = Rng(SEED ^ 1);
    b.iter(|| {
        let i = (rng.next() as usize) % (s.size() + 1);
        black_box(s.rank1(black_box(i)));
    });
}

#[bench]
fn bit_select(b: &mut Bencher) {
    let bits = random_bits(VALUES, SEED);
    let s = DynamicBitSequence::build(&bits);
    let ones = s.count_c(true);
    let mut rng = Rng(SEED ^ 2);
    b.iter(|| {
        let k = (rng.next() as usize) % ones.max(1);
        black_box(s.select1(black_box(k)));
    });
}

#[bench]
fn int_insert(b: &mut Bencher) {
    let values = random_values(VALUES, SEED, 1_000_000);
    b.iter(|| {
        let mut s = DynamicIntSequence::new();
        for &v in &values {
            s.push_back(black_box(v));
        }
        black_box(s.size());
    });
}

#[bench]
fn int_search(b: &mut Bencher) {
    let values = random_values(VALUES, SEED, 1_000);
    let s = DynamicIntSequence::build(&values);
    let total = s.sum();
    let mut rng = Rng(SEED ^ 3);
    b.iter(|| {
        let target = rng.next() % (total + 1);
        black_box(s.search(black_box(target)));
    });
}

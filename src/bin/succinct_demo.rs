/*
 * SPDX-FileCopyrightText: 2026 The succinct-seq authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A small walkthrough binary exercising each of the four structures'
//! scenarios end-to-end, mirroring the original C++ examples
//! (`dynamic_bit_example.cpp`, `spsi_example.cpp`,
//! `dynamic_wavelet_tree_example.cpp`, `dynamic_permutation_example.cpp`).
//! This binary is example tooling, not part of the library's core.

use anyhow::Result;
use clap::{Parser, Subcommand};
use succinct_seq::{DynamicBitSequence, DynamicIntSequence, DynamicPermutation, DynamicWaveletTree};

#[derive(Parser, Debug)]
#[command(about = "Walks through a scenario for one of the four succinct-seq structures", long_about = None)]
struct Args {
    #[command(subcommand)]
    scenario: Scenario,
}

#[derive(Subcommand, Debug)]
enum Scenario {
    /// Dynamic bit sequence scenario.
    Bit,
    /// Dynamic prefix-sum sequence scenario.
    Spsi,
    /// Dynamic wavelet tree scenario.
    Wavelet,
    /// Dynamic permutation scenario.
    Permutation,
}

fn bit_scenario() {
    let values = [true, false, true, false, true, false, true, false, true, true];
    println!("Build DynamicBitSequence S from {values:?}");
    let mut s = DynamicBitSequence::build(&values);
    println!("S = {s}");

    println!("rank1(4) = {}", s.rank1(4));
    println!("rank0(4) = {}", s.rank0(4));
    println!("select1(2) = {}", s.select1(2));
    println!("select0(2) = {}", s.select0(2));
    println!("select0(4) = {}", s.select0(4));

    println!("Insert 1 into S at position 4");
    s.insert(4, true);
    println!("S = {s}");

    println!("Delete S[4] from S");
    s.remove(4);
    println!("S = {s}");

    println!("Push 0 to the tail of S, push 1 to the head of S");
    s.push_back(false);
    s.push_front(true);
    println!("S = {s}");

    println!("Push [1,0,1,0] onto the tail of S");
    s.push_many(&[true, false, true, false]);
    println!("S = {s}");

    log::info!("serializing S to a buffer");
    let mut buf = Vec::new();
    s.save(&mut buf).expect("save should not fail on an in-memory buffer");

    println!("Clear S");
    s.clear();
    println!("S = {s}");

    println!("Load S from the buffer");
    let mut loaded = DynamicBitSequence::load(&mut &buf[..]).expect("round-tripped buffer should load");
    s.swap(&mut loaded);
    println!("S = {s}");
}

fn spsi_scenario() {
    let values: Vec<u64> = (1..=10).collect();
    println!("Build DynamicIntSequence S from {values:?}");
    let mut s = DynamicIntSequence::build(&values);
    println!("S = {s}");

    println!("prefix_sum(3) = {}", s.prefix_sum(3));
    println!("search(9) = {}", s.search(9));
    println!("search(1000) = {}", s.search(1000));
    println!("S[3] = {}", s.at(3));

    println!("S[3] += 10");
    s.increment(3, 10);
    println!("S[3] = {}", s.at(3));
    println!("S[3] -= 10");
    s.decrement(3, 10);
    println!("S[3] = {}", s.at(3));

    println!("Insert 100 into S at position 4");
    s.insert(4, 100);
    println!("S = {s}");

    println!("Delete S[4] from S");
    s.remove(4);
    println!("S = {s}");

    println!("Push 0 to the tail of S, push 9 to the head of S");
    s.push_back(0);
    s.push_front(9);
    println!("S = {s}");

    println!("Push [1,2,3,4] onto the tail of S");
    s.push_many(&[1, 2, 3, 4]);
    println!("S = {s}");

    log::info!("serializing S to a buffer");
    let mut buf = Vec::new();
    s.save(&mut buf).expect("save should not fail on an in-memory buffer");

    println!("Clear S");
    s.clear();
    println!("S = {s}");

    println!("Load S from the buffer");
    let mut loaded = DynamicIntSequence::load(&mut &buf[..]).expect("round-tripped buffer should load");
    s.swap(&mut loaded);
    println!("S = {s}");
}

fn wavelet_scenario() {
    let text = b"ababababab";
    let alphabet = b"abc";
    println!("Build DynamicWaveletTree S from {text:?} with alphabet {alphabet:?}");
    let mut s = DynamicWaveletTree::build_with_alphabet(text, alphabet);
    println!("S = {s}");

    println!("rank(4, 'a') = {}", s.rank(4, b'a'));
    println!("rank(4, 'b') = {}", s.rank(4, b'b'));
    println!("select(2, 'a') = {}", s.select(2, b'a'));
    println!("select(2, 'b') = {}", s.select(2, b'b'));
    println!("select(4, 'b') = {}", s.select(4, b'b'));

    println!("Insert 'c' into S at position 4");
    s.insert(4, b'c');
    println!("S = {s}");

    println!("Delete S[4] from S");
    s.remove(4);
    println!("S = {s}");

    println!("Push 'c' to the tail of S");
    s.push_back(b'c');
    println!("S = {s}");

    log::info!("serializing S to a buffer");
    let mut buf = Vec::new();
    s.save(&mut buf).expect("save should not fail on an in-memory buffer");

    println!("Clear S");
    s.clear();
    println!("S = {s}");

    println!("Load S from the buffer");
    let mut loaded = DynamicWaveletTree::load(&mut &buf[..]).expect("round-tripped buffer should load");
    s.swap(&mut loaded);
    println!("S = {s}");
}

fn permutation_scenario() {
    let values: Vec<u64> = vec![0, 3, 1, 2, 5, 4, 9, 8, 7, 6];
    println!("Build DynamicPermutation S from {values:?}");
    let mut s = DynamicPermutation::build(&values);
    println!("S = {s}");

    println!("S[3] = {}", s.access(3));
    println!("S^-1[3] = {}", s.inverse(3));

    println!("Insert 2 into S at position 1");
    s.insert(1, 2);
    println!("S = {s}");

    println!("Delete S[4] from S");
    s.erase(4);
    println!("S = {s}");

    println!("Move S[1] to position 0");
    s.move_pi_index(1, 0);
    println!("S = {s}");

    log::info!("serializing S to a buffer");
    let mut buf = Vec::new();
    s.save(&mut buf).expect("save should not fail on an in-memory buffer");

    println!("Clear S");
    s.clear();
    println!("S = {s}");

    println!("Load S from the buffer");
    let mut loaded = DynamicPermutation::load(&mut &buf[..]).expect("round-tripped buffer should load");
    s.swap(&mut loaded);
    println!("S = {s}");
}

pub fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    match args.scenario {
        Scenario::Bit => bit_scenario(),
        Scenario::Spsi => spsi_scenario(),
        Scenario::Wavelet => wavelet_scenario(),
        Scenario::Permutation => permutation_scenario(),
    }
    Ok(())
}

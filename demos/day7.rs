// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 7, running the amplifiers as a [Network].
//!
//! [Network]: intcode::network::Network

use intcode::network::{Wiring, max_signal};

fn main() {
    use std::env::args_os;
    use std::fs::read_to_string;
    let input =
        read_to_string(args_os().nth(1).expect("missing file name")).expect("failed to read file");

    let code = input
        .trim()
        .split(',')
        .map(str::parse)
        .collect::<Result<Vec<i64>, _>>()
        .unwrap();

    let (_, part1) = max_signal(&code, &[0, 1, 2, 3, 4], Wiring::Chain)
        .unwrap()
        .unwrap();
    println!("part 1: {part1}");
    let (_, part2) = max_signal(&code, &[5, 6, 7, 8, 9], Wiring::Ring)
        .unwrap()
        .unwrap();
    println!("part 2: {part2}");
}

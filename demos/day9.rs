// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 9 built using the `intcode` library.

use intcode::prelude::*;

fn boost(mut i: Interpreter, mode: i64) -> i64 {
    let (output, state) = i.run_through_inputs([mode]).unwrap();
    assert_eq!(state, State::Halted, "intcode did not halt");
    assert_eq!(output.len(), 1, "{output:?}");
    output[0]
}

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
    let interpreter = Interpreter::new(code);
    println!("part 1: {}", boost(interpreter.clone(), 1));
    println!("part 2: {}", boost(interpreter, 2));
}

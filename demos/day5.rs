// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 5, driving the interpreter one interrupt at a time.

use intcode::prelude::*;

/// Run the diagnostic program for the system with the given ID, returning the diagnostic code
fn diagnose(mut i: Interpreter, system_id: i64) -> i64 {
    let mut outputs = Vec::new();
    loop {
        match i.run().unwrap() {
            Interrupt::WaitingForInput => i.supply(system_id).unwrap(),
            Interrupt::Output(o) => outputs.push(o),
            Interrupt::Halted => break,
        }
    }
    let diagnostic = outputs.pop().expect("no diagnostic code");
    assert!(outputs.into_iter().all(|o| o == 0), "diagnostic failed");
    diagnostic
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
    println!("part 1: {}", diagnose(interpreter.clone(), 1));
    println!("part 2: {}", diagnose(interpreter, 5));
}

// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! A solution to Advent of Code 2019 Day 11, where the interpreter controls a hull-painting robot
//! by alternately emitting a color and a turn for every panel color it is fed.

use intcode::prelude::*;

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum PanelColor {
    #[default]
    Black,
    White,
}

impl PanelColor {
    fn report(self) -> i64 {
        i64::from(self == Self::White)
    }

    fn from_code(color: i64) -> Self {
        match color {
            0 => Self::Black,
            1 => Self::White,
            i => panic!("invalid paint color: {i}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Direction {
    Up,
    Right,
    Down,
    Left,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct Location {
    x: i32,
    y: i32,
}

impl Direction {
    fn turn(&mut self, code: i64) {
        *self = match (*self, code) {
            (Self::Up, 0) | (Self::Down, 1) => Self::Left,
            (Self::Right, 0) | (Self::Left, 1) => Self::Up,
            (Self::Down, 0) | (Self::Up, 1) => Self::Right,
            (Self::Left, 0) | (Self::Right, 1) => Self::Down,
            (_, i) => panic!("invalid direction code: {i}"),
        }
    }
}

impl std::ops::AddAssign<Direction> for Location {
    fn add_assign(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.y -= 1,
            Direction::Right => self.x += 1,
            Direction::Down => self.y += 1,
            Direction::Left => self.x -= 1,
        }
    }
}

/// Run the robot until its program halts, returning every panel it painted
fn paint(mut interpreter: Interpreter, start: PanelColor) -> HashMap<Location, PanelColor> {
    let mut panels = HashMap::new();
    let mut location = Location::default();
    let mut direction = Direction::Up;
    let mut expecting_color = true;

    loop {
        match interpreter.run().unwrap() {
            Interrupt::WaitingForInput => {
                let color = panels.get(&location).copied().unwrap_or(
                    if location == Location::default() {
                        start
                    } else {
                        PanelColor::Black
                    },
                );
                interpreter.supply(color.report()).unwrap();
            }
            Interrupt::Output(code) if expecting_color => {
                panels.insert(location, PanelColor::from_code(code));
                expecting_color = false;
            }
            Interrupt::Output(code) => {
                direction.turn(code);
                location += direction;
                expecting_color = true;
            }
            Interrupt::Halted => break panels,
        }
    }
}

fn part1(interpreter: Interpreter) -> usize {
    paint(interpreter, PanelColor::Black).len()
}

fn part2(interpreter: Interpreter) {
    let panels = paint(interpreter, PanelColor::White);

    let bounds = |coords: Vec<i32>| {
        let lo = coords.iter().copied().min().unwrap_or_default();
        let hi = coords.iter().copied().max().unwrap_or_default();
        lo..=hi
    };
    let xs = bounds(panels.keys().map(|l| l.x).collect());
    let ys = bounds(panels.keys().map(|l| l.y).collect());

    for y in ys {
        for x in xs.clone() {
            print!(
                "{}",
                match panels.get(&Location { x, y }).copied().unwrap_or_default() {
                    PanelColor::Black => ' ',
                    PanelColor::White => '#',
                }
            );
        }
        println!();
    }
}

fn main() {
    use std::env::args;
    use std::fs::read_to_string;
    let interpreter = Interpreter::new(
        read_to_string(args().nth(1).as_deref().expect("must provide file"))
            .expect("Failed to read file!")
            .trim()
            .split(',')
            .map(|s| s.parse().expect("Could not parse i64")),
    );

    println!("part 1: {}", part1(interpreter.clone()));
    println!("part 2:");
    part2(interpreter);
}

// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Drive several [Interpreter]s whose outputs feed each other's inputs
//!
//! The interpreters know nothing of each other. A [Network] owns them, polls each in turn, and
//! moves values between their input queues. This is how the amplifier controller software from
//! [Day 7] is meant to be run.
//!
//! # Example
//!
//! ```
//! use intcode::network::{Network, Wiring};
//! let program = [
//!     3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
//!     1005, 28, 6, 99, 0, 0, 5,
//! ];
//! let mut network = Network::new(&program, &[9, 8, 7, 6, 5]);
//! assert_eq!(network.run(0, Wiring::Ring), Ok(139629729));
//! ```
//!
//! [Day 7]: https://adventofcode.com/2019/day/7

use itertools::Itertools;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display};

use crate::{Interpreter, InterpreterError, Interrupt, State};

/// How the last interpreter in a [Network] is connected
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Wiring {
    /// Each interpreter feeds the next one, and the last one's output is only collected
    Chain,
    /// Like [Chain](Wiring::Chain), but the last interpreter also feeds the first
    Ring,
}

/// An error that stopped a [Network]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NetworkError {
    /// An interpreter failed
    Fault {
        /// Position of the failing interpreter within the network
        node: usize,
        /// Address of the instruction that failed
        instr_ptr: u64,
        /// What went wrong
        error: InterpreterError,
    },
    /// A full round passed without any interpreter consuming input, producing output, or halting
    Deadlock,
    /// The last interpreter halted without ever producing output
    NoSignal,
    /// The network has no interpreters
    Empty,
    /// Input was addressed to an interpreter position the network does not have
    NoSuchNode(usize),
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fault {
                node,
                instr_ptr,
                error,
            } => write!(f, "interpreter {node} failed at instruction {instr_ptr}: {error}"),
            Self::Deadlock => write!(f, "no interpreter can make progress"),
            Self::NoSignal => write!(f, "last interpreter halted without output"),
            Self::Empty => write!(f, "network has no interpreters"),
            Self::NoSuchNode(node) => write!(f, "network has no interpreter {node}"),
        }
    }
}

impl Error for NetworkError {}

#[derive(Debug, Clone)]
struct Node {
    interp: Interpreter,
    inbox: VecDeque<i64>,
}

/// A set of interpreters, polled round-robin
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
}

impl Network {
    /// One interpreter running `program` per entry in `phases`, each of which has its phase
    /// queued up as its first input.
    pub fn new(program: &[i64], phases: &[i64]) -> Self {
        Self {
            nodes: phases
                .iter()
                .map(|&phase| Node {
                    interp: Interpreter::new(program.iter().copied()),
                    inbox: VecDeque::from([phase]),
                })
                .collect(),
        }
    }

    /// Wrap already-constructed interpreters, in order
    pub fn from_interpreters(interps: impl IntoIterator<Item = Interpreter>) -> Self {
        Self {
            nodes: interps
                .into_iter()
                .map(|interp| Node {
                    interp,
                    inbox: VecDeque::new(),
                })
                .collect(),
        }
    }

    /// Queue `value` as input for the interpreter at `node`
    pub fn feed(&mut self, node: usize, value: i64) -> Result<(), NetworkError> {
        self.nodes
            .get_mut(node)
            .ok_or(NetworkError::NoSuchNode(node))?
            .inbox
            .push_back(value);
        Ok(())
    }

    /// Number of interpreters in the network
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the network has no interpreters
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow the interpreters, in order
    pub fn interpreters(&self) -> impl Iterator<Item = &Interpreter> {
        self.nodes.iter().map(|node| &node.interp)
    }

    /// Send `signal` to the first interpreter and poll every interpreter in turn. A
    /// [Chain](Wiring::Chain) stops once the last interpreter halts, and a [Ring](Wiring::Ring)
    /// once all of them have. Returns the last value the last interpreter produced.
    pub fn run(&mut self, signal: i64, wiring: Wiring) -> Result<i64, NetworkError> {
        let last = self.nodes.len().checked_sub(1).ok_or(NetworkError::Empty)?;
        self.feed(0, signal)?;
        let mut result = None;
        loop {
            let mut progressed = false;
            for i in 0..self.nodes.len() {
                let outputs = self.poll(i, &mut progressed)?;
                let target = match (i == last, wiring) {
                    (false, _) => Some(i + 1),
                    (true, Wiring::Ring) => Some(0),
                    (true, Wiring::Chain) => None,
                };
                if i == last {
                    result = outputs.last().copied().or(result);
                }
                if let Some(target) = target {
                    self.nodes[target].inbox.extend(outputs);
                }
            }
            let halted = |node: &Node| node.interp.state() == State::Halted;
            let done = match wiring {
                Wiring::Chain => halted(&self.nodes[last]),
                Wiring::Ring => self.nodes.iter().all(halted),
            };
            if done {
                break result.ok_or(NetworkError::NoSignal);
            }
            if !progressed {
                break Err(NetworkError::Deadlock);
            }
        }
    }

    /// Run the interpreter at `i` until it halts or needs input that is not queued
    fn poll(&mut self, i: usize, progressed: &mut bool) -> Result<Vec<i64>, NetworkError> {
        let node = &mut self.nodes[i];
        let fault = |interp: &Interpreter, error| NetworkError::Fault {
            node: i,
            instr_ptr: interp.instr_ptr(),
            error,
        };
        let was_halted = node.interp.state() == State::Halted;
        let mut outputs = Vec::new();
        loop {
            match node.interp.run().map_err(|e| fault(&node.interp, e))? {
                Interrupt::WaitingForInput => match node.inbox.pop_front() {
                    Some(value) => {
                        node.interp.supply(value).map_err(|e| fault(&node.interp, e))?;
                        *progressed = true;
                    }
                    None => break,
                },
                Interrupt::Output(value) => {
                    outputs.push(value);
                    *progressed = true;
                }
                Interrupt::Halted => {
                    *progressed |= !was_halted;
                    break;
                }
            }
        }
        Ok(outputs)
    }
}

/// Try every ordering of `phases`, returning the one that produces the highest signal from the
/// last interpreter when the first is sent `0`, along with that signal.
///
/// Returns `Ok(None)` if `phases` is empty.
///
/// ```
/// use intcode::network::{max_signal, Wiring};
/// let program = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];
/// assert_eq!(
///     max_signal(&program, &[0, 1, 2, 3, 4], Wiring::Chain),
///     Ok(Some((vec![4, 3, 2, 1, 0], 43210)))
/// );
/// ```
pub fn max_signal(
    program: &[i64],
    phases: &[i64],
    wiring: Wiring,
) -> Result<Option<(Vec<i64>, i64)>, NetworkError> {
    if phases.is_empty() {
        return Ok(None);
    }
    itertools::process_results(
        phases
            .iter()
            .copied()
            .permutations(phases.len())
            .map(|order| {
                Network::new(program, &order)
                    .run(0, wiring)
                    .map(|signal| (order, signal))
            }),
        |results| results.max_by_key(|&(_, signal)| signal),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEEDBACK_LOOP: [i64; 57] = [
        3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001, 54, -5,
        54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55, 53, 4, 53,
        1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
    ];

    #[test]
    fn chain_examples() {
        let cases: [(&[i64], [i64; 5], i64); 3] = [
            (
                &[3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0],
                [4, 3, 2, 1, 0],
                43210,
            ),
            (
                &[
                    3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23,
                    23, 4, 23, 99, 0, 0,
                ],
                [0, 1, 2, 3, 4],
                54321,
            ),
            (
                &[
                    3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002, 33, 7,
                    33, 1, 33, 31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
                ],
                [1, 0, 4, 3, 2],
                65210,
            ),
        ];
        for (program, phases, signal) in cases {
            assert_eq!(Network::new(program, &phases).run(0, Wiring::Chain), Ok(signal));
            assert_eq!(
                max_signal(program, &[0, 1, 2, 3, 4], Wiring::Chain),
                Ok(Some((phases.to_vec(), signal)))
            );
        }
    }

    #[test]
    fn feedback_loop() {
        let mut network = Network::new(&FEEDBACK_LOOP, &[9, 7, 8, 5, 6]);
        assert_eq!(network.run(0, Wiring::Ring), Ok(18216));
        assert!(network.interpreters().all(|i| i.state() == State::Halted));
        assert_eq!(
            max_signal(&FEEDBACK_LOOP, &[5, 6, 7, 8, 9], Wiring::Ring),
            Ok(Some((vec![9, 7, 8, 5, 6], 18216)))
        );
    }

    #[test]
    fn fault_reports_node_and_instruction() {
        // the third node gets an opcode it cannot handle once its input arrives
        let good = Interpreter::new([3, 0, 4, 0, 99]);
        let bad = Interpreter::new([3, 2]);
        let mut network = Network::from_interpreters([good.clone(), good, bad]);
        assert_eq!(
            network.run(77, Wiring::Chain),
            Err(NetworkError::Fault {
                node: 2,
                instr_ptr: 2,
                error: crate::InterpreterError::InvalidOpcode(77),
            })
        );
    }

    #[test]
    fn ring_waits_for_every_node() {
        // the first node expects a second round after the last one has already halted
        let first = Interpreter::new([3, 0, 4, 0, 3, 0, 4, 0, 99]);
        let last = Interpreter::new([3, 0, 4, 0, 99]);
        let mut network = Network::from_interpreters([first.clone(), last.clone()]);
        assert_eq!(network.run(5, Wiring::Ring), Ok(5));
        assert!(network.interpreters().all(|i| i.state() == State::Halted));

        // a chain is done as soon as its last node is
        let mut network = Network::from_interpreters([first, last]);
        assert_eq!(network.run(5, Wiring::Chain), Ok(5));
        let states: Vec<State> = network.interpreters().map(Interpreter::state).collect();
        assert_eq!(states, [State::Awaiting, State::Halted]);
    }

    #[test]
    fn ring_stuck_after_last_node_halts() {
        let first = Interpreter::new([3, 0, 4, 0, 3, 0, 3, 0, 99]);
        let last = Interpreter::new([3, 0, 4, 0, 99]);
        let mut network = Network::from_interpreters([first, last]);
        assert_eq!(network.run(1, Wiring::Ring), Err(NetworkError::Deadlock));
    }

    #[test]
    fn feed_checks_node() {
        let mut network = Network::from_interpreters([Interpreter::new([3, 0, 4, 0, 99])]);
        assert_eq!(network.feed(1, 3), Err(NetworkError::NoSuchNode(1)));
        assert_eq!(network.feed(0, 3), Ok(()));
        // the fed value is consumed before the signal
        assert_eq!(network.run(8, Wiring::Chain), Ok(3));
    }

    #[test]
    fn deadlock_is_detected() {
        // each node wants two inputs before it produces anything
        let interp = Interpreter::new([3, 0, 3, 1, 4, 1, 99]);
        let mut network = Network::from_interpreters([interp.clone(), interp]);
        assert_eq!(network.run(1, Wiring::Ring), Err(NetworkError::Deadlock));
    }

    #[test]
    fn silent_last_node() {
        let mut network = Network::from_interpreters([Interpreter::new([99])]);
        assert_eq!(network.run(0, Wiring::Chain), Err(NetworkError::NoSignal));
    }

    #[test]
    fn empty_network() {
        let mut network = Network::new(&[99], &[]);
        assert!(network.is_empty());
        assert_eq!(network.run(0, Wiring::Ring), Err(NetworkError::Empty));
        assert_eq!(max_signal(&[99], &[], Wiring::Chain), Ok(None));
    }
}

// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD
#![warn(missing_docs)]

//! Library providing an Intcode virtual machine
//!
//! The interpreter supports all of the [Opcodes] and [Parameter Modes] defined in the completed
//! Intcode computer for [Day 9]. It is driven cooperatively: [`Interpreter::run`] executes until
//! the program halts, needs input, or produces output, and hands control back to the caller with an
//! [`Interrupt`] describing why it stopped.
//!
//! # Example
//!
//! ```rust
//! use intcode::prelude::*;
//! let mut interpreter = Interpreter::new([3, 9, 1002, 9, 2, 9, 4, 9, 99, 0]);
//!
//! assert_eq!(interpreter.run(), Ok(Interrupt::WaitingForInput));
//! interpreter.supply(21).unwrap();
//! assert_eq!(interpreter.run(), Ok(Interrupt::Output(42)));
//! assert_eq!(interpreter.run(), Ok(Interrupt::Halted));
//! ```
//!
//! Callers that just want to feed a batch of inputs can use [`Interpreter::run_through_inputs`]:
//!
//! ```rust
//! use intcode::prelude::*;
//! let mut interpreter = Interpreter::new(vec![104, 1024, 99]);
//!
//! assert_eq!(
//!     interpreter.run_through_inputs(empty()).unwrap(),
//!     (vec![1024], State::Halted)
//! );
//! ```
//!
//! Several interpreters can be wired together with the [network] module.
//!
//! [Opcodes]: https://esolangs.org/wiki/Intcode#Opcodes
//! [Parameter Modes]: https://esolangs.org/wiki/Intcode#Parameter_Modes
//! [Day 9]: https://adventofcode.com/2019/day/9

/// Paged memory tape backing each interpreter
mod mem;

mod internals;
pub mod network;
pub mod trace;

use std::error::Error;
use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

use mem::IntcodeMem;
use trace::Trace;

/// A small module that re-exports items needed when working with the Intcode interpreter
pub mod prelude {
    pub use crate::{Interpreter, Interrupt, State};
    pub use std::iter::empty;
}

/// The reason [`Interpreter::run`] handed control back to its caller
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Interrupt {
    /// A `HALT` instruction has been executed. No further instructions will ever run.
    Halted,
    /// An `IN` instruction needs a value. Provide one with [`Interpreter::supply`], then call
    /// [`Interpreter::run`] again.
    WaitingForInput,
    /// An `OUT` instruction produced a value. Calling [`Interpreter::run`] again continues from
    /// the following instruction.
    Output(i64),
}

/// The externally visible execution state of an [Interpreter]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    /// More instructions can be executed right away
    Running,
    /// Execution is suspended on an `IN` instruction with no input supplied yet
    Awaiting,
    /// Execution is suspended right after an `OUT` instruction
    Emitted,
    /// Execution has halted
    Halted,
    /// A fatal error occurred. The instance will not execute anything else.
    Faulted,
}

/// Outcome of a single [`Interpreter::step`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOutcome {
    /// Execution can continue with another step
    Running,
    /// Execution stopped, for the provided reason
    Stopped(Interrupt),
}

/// An error that occurred while executing Intcode
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InterpreterError {
    /// The instruction word (included) does not end in a recognized opcode
    InvalidOpcode(i64),
    /// A parameter mode digit other than 0, 1 or 2 was encountered
    UnknownMode(i64),
    /// An instruction tried to write to an immediate-mode parameter (included)
    InvalidWriteTarget(i64),
    /// A negative address (included) was resolved
    AddressError(i64),
    /// An addition, multiplication or relative address computation overflowed an `i64`
    ArithmeticOverflow,
    /// [`Interpreter::supply`] was called while the interpreter was not waiting for input
    NotAwaitingInput,
}

impl Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOpcode(n) => write!(f, "encountered unrecognized opcode in {n}"),
            Self::UnknownMode(mode) => write!(f, "encountered unknown parameter mode {mode}"),
            Self::InvalidWriteTarget(i) => write!(f, "code attempted to write to immediate {i}"),
            Self::AddressError(addr) => write!(f, "attempted to access negative address {addr}"),
            Self::ArithmeticOverflow => write!(f, "arithmetic overflowed a 64-bit integer"),
            Self::NotAwaitingInput => write!(f, "input supplied while not awaiting input"),
        }
    }
}

impl Error for InterpreterError {}

/// Parameter mode for Intcode instruction
///
/// Intcode instruction parameters each have a mode:  [positional], [immediate], or [relative].
///
/// When executing an intcode instruction, the instruction's parameters are interpreted in
/// accordance with their associated modes.
///
/// [positional]: ParamMode::Positional
/// [immediate]: ParamMode::Immediate
/// [relative]: ParamMode::Relative
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ParamMode {
    /// Positional Mode
    ///
    /// A parameter in positional mode evaluates to the value at the address specified by the
    /// parameter.
    Positional = 0,
    /// Immediate Mode
    ///
    /// A parameter in immediate mode evaluates directly to the value specified. Instructions which
    /// write to memory may not use immediate mode for their destinations.
    #[doc(alias = "#")]
    Immediate = 1,
    /// Relative Mode
    ///
    /// A parameter in relative mode evaluates to the value at the address specified by the
    /// parameter, added to the relative base, which starts out as `0` but can be modified
    /// throughout the program's execution.
    #[doc(alias = "@")]
    Relative = 2,
}

impl ParamMode {
    /// Extract the modes of all three parameters from an instruction word
    ///
    /// Given a 5 digit number, digits ABCDE are used as follows:
    /// DE is the two-digit opcode,
    /// C is the 1st parameter's mode,
    /// B is the 2nd parameter's mode,
    /// A is the 3rd parameter's mode.
    ///
    /// ```
    /// use intcode::ParamMode;
    /// assert_eq!(
    ///     ParamMode::extract(1202),
    ///     Ok([ParamMode::Relative, ParamMode::Immediate, ParamMode::Positional])
    /// );
    /// ```
    pub fn extract(instruction: i64) -> Result<[Self; 3], InterpreterError> {
        Ok([
            ((instruction / 100) % 10).try_into()?,
            ((instruction / 1000) % 10).try_into()?,
            ((instruction / 10000) % 10).try_into()?,
        ])
    }
}

impl Display for ParamMode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMode::Positional => Ok(()),
            ParamMode::Immediate => write!(fmt, "#"),
            ParamMode::Relative => write!(fmt, "@"),
        }
    }
}

impl TryFrom<i64> for ParamMode {
    type Error = InterpreterError;
    fn try_from(i: i64) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(ParamMode::Positional),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(InterpreterError::UnknownMode(i)),
        }
    }
}

/// An Intcode opcode
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs, reason = "self-explanatory")]
pub enum OpCode {
    Add = 1,
    Mul = 2,
    In = 3,
    Out = 4,
    Jnz = 5,
    Jz = 6,
    Lt = 7,
    Eq = 8,
    Rbo = 9,
    Halt = 99,
}

impl OpCode {
    /// Number of memory cells an instruction with this opcode occupies
    pub const fn width(self) -> u64 {
        match self {
            Self::Add | Self::Mul | Self::Lt | Self::Eq => 4,
            Self::Jnz | Self::Jz => 3,
            Self::In | Self::Out | Self::Rbo => 2,
            Self::Halt => 1,
        }
    }
}

impl TryFrom<i64> for OpCode {
    type Error = i64;
    fn try_from(i: i64) -> Result<Self, i64> {
        match i {
            1 => Ok(Self::Add),
            2 => Ok(Self::Mul),
            3 => Ok(Self::In),
            4 => Ok(Self::Out),
            5 => Ok(Self::Jnz),
            6 => Ok(Self::Jz),
            7 => Ok(Self::Lt),
            8 => Ok(Self::Eq),
            9 => Ok(Self::Rbo),
            99 => Ok(Self::Halt),
            i => Err(i),
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "ADD",
            Self::Mul => "MUL",
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Jnz => "JNZ",
            Self::Jz => "JZ",
            Self::Lt => "LT",
            Self::Eq => "EQ",
            Self::Rbo => "RBO",
            Self::Halt => "HALT",
        })
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Exec {
    Running,
    Awaiting { dest: u64 },
    InputReady { dest: u64, value: i64 },
    Emitted(i64),
    Halted,
    Faulted(InterpreterError),
}

/// An Intcode interpreter, which can optionally [trace](Interpreter::start_trace) the
/// instructions it executes.
#[derive(Debug, Clone)]
pub struct Interpreter {
    index: u64,
    rel_offset: i64,
    code: IntcodeMem,
    exec: Exec,
    trace: Option<Trace>,
}

// ignore the trace field
impl PartialEq for Interpreter {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.rel_offset == other.rel_offset
            && self.exec == other.exec
            && self.code == other.code
    }
}

impl Index<u64> for Interpreter {
    type Output = i64;

    fn index(&self, i: u64) -> &Self::Output {
        self.code.index(i)
    }
}

impl IndexMut<u64> for Interpreter {
    fn index_mut(&mut self, i: u64) -> &mut Self::Output {
        self.code.index_mut(i)
    }
}

impl Interpreter {
    /// Create a new interpreter. Collects `code` into the starting memory state.
    pub fn new(code: impl IntoIterator<Item = i64>) -> Self {
        Self {
            index: 0,
            rel_offset: 0,
            code: code.into_iter().collect(),
            exec: Exec::Running,
            trace: None,
        }
    }

    /// Execute until the program halts, needs input, or produces output.
    ///
    /// Once [`Interrupt::Halted`] has been returned, every later call returns it again without
    /// touching memory. If an error is returned, the interpreter is faulted and every later call
    /// returns the same error.
    pub fn run(&mut self) -> Result<Interrupt, InterpreterError> {
        loop {
            if let StepOutcome::Stopped(interrupt) = self.step()? {
                break Ok(interrupt);
            }
        }
    }

    /// Execute a single instruction, or finish an `IN` instruction whose input has been supplied.
    pub fn step(&mut self) -> Result<StepOutcome, InterpreterError> {
        match self.exec {
            Exec::Halted => return Ok(StepOutcome::Stopped(Interrupt::Halted)),
            Exec::Faulted(err) => return Err(err),
            Exec::Awaiting { .. } => return Ok(StepOutcome::Stopped(Interrupt::WaitingForInput)),
            Exec::InputReady { dest, value } => {
                self.finish_input(dest, value);
                return Ok(StepOutcome::Running);
            }
            Exec::Running | Exec::Emitted(_) => self.exec = Exec::Running,
        }
        self.exec_instruction().inspect_err(|&err| self.exec = Exec::Faulted(err))
    }

    /// Provide the value for a pending `IN` instruction.
    ///
    /// The value is stored the next time [`run`](Self::run) or [`step`](Self::step) is called.
    /// Returns [`InterpreterError::NotAwaitingInput`] unless the last interrupt was
    /// [`Interrupt::WaitingForInput`] and no input has been supplied since.
    pub fn supply(&mut self, input: i64) -> Result<(), InterpreterError> {
        match self.exec {
            Exec::Awaiting { dest } => {
                self.exec = Exec::InputReady { dest, value: input };
                Ok(())
            }
            _ => Err(InterpreterError::NotAwaitingInput),
        }
    }

    /// Execute until either the program halts, or it tries to read nonexistent input.
    /// If the interpreter stopped, returns `Ok((v, s))`, where `v` is a [`Vec<i64>`] containing all
    /// outputs that it found, and `s` is the [`State`] at the time it stopped, which is either
    /// [`State::Halted`] or [`State::Awaiting`].
    ///
    /// On error, it will return an [`InterpreterError`] that reflects the error.
    pub fn run_through_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = i64>,
    ) -> Result<(Vec<i64>, State), InterpreterError> {
        let mut outputs = Vec::new();
        let mut inputs = inputs.into_iter();
        loop {
            match self.run()? {
                Interrupt::Output(out) => outputs.push(out),
                Interrupt::Halted => break Ok((outputs, State::Halted)),
                Interrupt::WaitingForInput => match inputs.next() {
                    Some(input) => self.supply(input)?,
                    None => break Ok((outputs, State::Awaiting)),
                },
            }
        }
    }

    /// Pre-compute as much as possible - that is, run every instruction up to, but not including,
    /// the first `IN`, `OUT`, or `HALT` instruction, bubbling up any errors that occur.
    pub fn precompute(&mut self) -> Result<(), InterpreterError> {
        while matches!(self.exec, Exec::Running | Exec::Emitted(_)) {
            // an undecodable instruction is left for `step` to report
            if let Ok((OpCode::In | OpCode::Out | OpCode::Halt, _)) =
                Self::parse_op(self.code[self.index])
            {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Get the memory at `address`
    #[doc(alias = "mem_get")]
    pub fn peek(&self, address: i64) -> Result<i64, InterpreterError> {
        self.code.read(address)
    }

    /// Manually set a memory location
    ///
    /// ```
    /// use intcode::prelude::*;
    /// let mut interp = Interpreter::new([1, 0, 0, 0, 99]);
    /// interp.poke(1, 4).unwrap();
    /// interp.run().unwrap();
    /// assert_eq!(interp.peek(0), Ok(100));
    /// ```
    #[doc(alias("mem_override", "write"))]
    pub fn poke(&mut self, address: i64, value: i64) -> Result<(), InterpreterError> {
        self.code.write(address, value)
    }

    /// Render the memory tape as a comma-separated list, in the style of the [Debug] impl of a
    /// [Vec]. Cells from address `0` are always shown; past the first page, runs of untouched or
    /// all-zero memory are collapsed into `<gap start..end>` entries.
    pub fn debug_dump(&self) -> String {
        self.code.dump()
    }

    /// Current execution state
    pub fn state(&self) -> State {
        match self.exec {
            Exec::Running | Exec::InputReady { .. } => State::Running,
            Exec::Awaiting { .. } => State::Awaiting,
            Exec::Emitted(_) => State::Emitted,
            Exec::Halted => State::Halted,
            Exec::Faulted(_) => State::Faulted,
        }
    }

    /// Address of the next instruction to execute. If the interpreter is faulted, this is the
    /// address of the instruction that failed.
    pub fn instr_ptr(&self) -> u64 {
        self.index
    }

    /// Current relative base
    pub fn rel_base(&self) -> i64 {
        self.rel_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::empty;

    /// Example program from day 9, which takes no input and outputs its own code
    #[test]
    fn quine() {
        let quine_code = vec![
            109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
        ];
        let mut interpreter = Interpreter::new(quine_code.clone());
        let (outputs, State::Halted) = interpreter.run_through_inputs(empty()).unwrap() else {
            panic!("Did not halt");
        };
        assert_eq!(quine_code, outputs);
    }

    #[test]
    fn self_referential_add() {
        let mut interpreter = Interpreter::new([1, 0, 0, 0, 99]);
        assert_eq!(interpreter.run(), Ok(Interrupt::Halted));
        assert!(interpreter.debug_dump().starts_with("[2, 0, 0, 0, 99, 0, "));
    }

    /// Ensure that running out of input leaves the interpreter in a sane state that can be
    /// recovered from
    #[test]
    fn missing_input_recoverable() {
        let mut interpreter = Interpreter::new(vec![3, 10, 4, 10, 99]);
        let old_dump = interpreter.debug_dump();

        let starved_run = interpreter.run_through_inputs(empty());

        assert_eq!(starved_run, Ok((vec![], State::Awaiting)));
        assert_eq!(interpreter.state(), State::Awaiting);
        assert_eq!(interpreter.instr_ptr(), 0);
        assert_eq!(interpreter.debug_dump(), old_dump);

        // make sure that interpreter can still be used
        assert_eq!(
            interpreter.run_through_inputs(vec![1]),
            Ok((vec![1], State::Halted))
        );
    }

    #[test]
    fn waiting_is_side_effect_free() {
        let mut interpreter = Interpreter::new([3, 0, 4, 0, 99]);
        assert_eq!(interpreter.run(), Ok(Interrupt::WaitingForInput));
        let snapshot = interpreter.clone();
        for _ in 0..3 {
            assert_eq!(interpreter.run(), Ok(Interrupt::WaitingForInput));
        }
        assert_eq!(interpreter, snapshot);

        interpreter.supply(5).unwrap();
        assert_eq!(interpreter.state(), State::Running);
        assert_eq!(interpreter.run(), Ok(Interrupt::Output(5)));
        assert_eq!(interpreter.instr_ptr(), 4);
        assert_eq!(interpreter.state(), State::Emitted);
        assert_eq!(interpreter.run(), Ok(Interrupt::Halted));
        assert_eq!(interpreter.peek(0), Ok(5));
    }

    #[test]
    fn supply_requires_pending_input() {
        let mut interpreter = Interpreter::new([3, 0, 99]);
        assert_eq!(interpreter.supply(1), Err(InterpreterError::NotAwaitingInput));
        assert_eq!(interpreter.run(), Ok(Interrupt::WaitingForInput));
        assert_eq!(interpreter.supply(1), Ok(()));
        assert_eq!(interpreter.supply(2), Err(InterpreterError::NotAwaitingInput));
        assert_eq!(interpreter.run(), Ok(Interrupt::Halted));
        assert_eq!(interpreter.peek(0), Ok(1));
        assert_eq!(interpreter.supply(3), Err(InterpreterError::NotAwaitingInput));
    }

    #[test]
    fn halted_is_terminal() {
        let mut interpreter = Interpreter::new([1101, 2, 3, 5, 99, 0]);
        assert_eq!(interpreter.run(), Ok(Interrupt::Halted));
        let snapshot = interpreter.clone();
        // clobber the halt instruction - a halted interpreter must not look at it again
        interpreter[4] = 1;
        let mut expected = snapshot.clone();
        expected[4] = 1;
        for _ in 0..3 {
            assert_eq!(interpreter.run(), Ok(Interrupt::Halted));
        }
        assert_eq!(interpreter, expected);
        assert_eq!(interpreter.peek(5), Ok(5));
    }

    #[test]
    fn faults_are_sticky() {
        let mut interpreter = Interpreter::new([1101, 1, 1, 5, 42]);
        assert_eq!(interpreter.run(), Err(InterpreterError::InvalidOpcode(42)));
        assert_eq!(interpreter.state(), State::Faulted);
        assert_eq!(interpreter.instr_ptr(), 4);
        // fixing memory does not revive a faulted interpreter
        interpreter[4] = 99;
        assert_eq!(interpreter.run(), Err(InterpreterError::InvalidOpcode(42)));
    }

    #[test]
    fn error_kinds() {
        macro_rules! fails_with {
            ([$($code: expr),*], $err: expr) => {{
                let mut interpreter = Interpreter::new([$($code),*]);
                assert_eq!(interpreter.run_through_inputs([0]), Err($err));
            }};
        }
        fails_with!([-1], InterpreterError::InvalidOpcode(-1));
        fails_with!([0], InterpreterError::InvalidOpcode(0));
        fails_with!([301, 0, 0, 0, 99], InterpreterError::UnknownMode(3));
        fails_with!([11101, 1, 1, 5, 99], InterpreterError::InvalidWriteTarget(5));
        fails_with!([103, 7, 99], InterpreterError::InvalidWriteTarget(7));
        fails_with!([4, -3, 99], InterpreterError::AddressError(-3));
        fails_with!([1, 0, 0, -2, 99], InterpreterError::AddressError(-2));
        fails_with!([1105, 1, -4], InterpreterError::AddressError(-4));
        fails_with!([204, -1, 99], InterpreterError::AddressError(-1));
        fails_with!([1101, i64::MAX, 1, 0, 99], InterpreterError::ArithmeticOverflow);
        fails_with!([1102, i64::MAX, 2, 0, 99], InterpreterError::ArithmeticOverflow);
        fails_with!([109, i64::MAX, 109, 1, 99], InterpreterError::ArithmeticOverflow);
    }

    #[test]
    fn relative_base_addressing() {
        // RBO #50, then output @-3, which reads address 47
        let mut code = vec![109, 50, 204, -3, 99];
        code.resize(48, 0);
        code[47] = 1234;
        let mut interpreter = Interpreter::new(code);
        assert_eq!(interpreter.run(), Ok(Interrupt::Output(1234)));
        assert_eq!(interpreter.rel_base(), 50);
    }

    #[test]
    fn writes_past_program_end() {
        let mut interpreter = Interpreter::new([1101, 40, 2, 2000, 4, 2000, 99]);
        assert_eq!(
            interpreter.run_through_inputs(empty()),
            Ok((vec![42], State::Halted))
        );
        assert_eq!(interpreter.peek(2000), Ok(42));
        assert_eq!(interpreter.peek(1_000_000), Ok(0));
    }

    #[test]
    fn precompute_stops_before_io() {
        let mut interpreter = Interpreter::new([1101, 2, 3, 11, 1002, 11, 2, 11, 4, 11, 99, 0]);
        interpreter.precompute().unwrap();
        assert_eq!(interpreter.instr_ptr(), 8);
        assert_eq!(interpreter.peek(11), Ok(10));
        assert_eq!(interpreter.run(), Ok(Interrupt::Output(10)));
    }

    #[test]
    fn precompute_reports_bad_instructions() {
        // the first instruction writes an invalid opcode into the second
        let mut interpreter = Interpreter::new([1101, 40, 37, 4, 0]);
        assert_eq!(interpreter.precompute(), Err(InterpreterError::InvalidOpcode(77)));
        assert_eq!(interpreter.instr_ptr(), 4);
        assert_eq!(interpreter.state(), State::Faulted);

        let mut interpreter = Interpreter::new([30001, 0, 0, 0, 99]);
        assert_eq!(interpreter.precompute(), Err(InterpreterError::UnknownMode(3)));
        assert_eq!(interpreter.run(), Err(InterpreterError::UnknownMode(3)));
    }

    #[test]
    fn deterministic() {
        let code = [3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
        let mut a = Interpreter::new(code);
        let mut b = Interpreter::new(code);
        assert_eq!(a.run_through_inputs([8]), b.run_through_inputs([8]));
        assert_eq!(a, b);
        assert_eq!(a.debug_dump(), b.debug_dump());
    }
}

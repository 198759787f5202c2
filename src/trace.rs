// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Opt-in logging of every instruction an [Interpreter] executes
//!
//! # Example
//!
//! ```
//! use intcode::prelude::*;
//! let mut interp = Interpreter::new([1101, 90, 9, 5, 104, 0, 99]);
//! interp.start_trace();
//! interp.run_through_inputs(empty()).unwrap();
//!
//! let trace = interp.end_trace().unwrap();
//! assert_eq!(trace.0.len(), 3);
//! assert_eq!(trace.0[0].stored_val(), Some(99));
//! assert_eq!(
//!     trace.0[1].to_string(),
//!     "ran instruction at 0004: op int 104   | [OUT #99 (resolves to 99)]"
//! );
//! ```
use std::fmt::{self, Debug, Display};

use super::{Interpreter, OpCode, ParamMode};

#[derive(Clone, Copy)]
struct PackedModes(u8);
impl PackedModes {
    const fn pack(modes: [ParamMode; 3]) -> Self {
        Self(modes[0] as u8 | ((modes[1] as u8) << 2) | ((modes[2] as u8) << 4))
    }
    const fn unpack(self) -> [ParamMode; 3] {
        const fn unpack_bit_pair(bit_pair: u8) -> ParamMode {
            match bit_pair {
                0b00 => ParamMode::Positional,
                0b01 => ParamMode::Immediate,
                _ => ParamMode::Relative,
            }
        }
        [
            unpack_bit_pair(self.0 & 0b11),
            unpack_bit_pair((self.0 & 0b1100) >> 2),
            unpack_bit_pair((self.0 & 0b11_0000) >> 4),
        ]
    }
}

/// A parameter as it appeared in memory, paired with what it resolved to
type Resolved = (i64, i64);

#[derive(Clone, Copy)]
enum TracedOp {
    Arith(Resolved, Resolved, Resolved),
    In(Resolved),
    Out(Resolved),
    Jump(Resolved, Resolved),
    Rbo(Resolved),
    Halt,
}

#[derive(Clone)]
/// An opaque type containing information about what instruction was executed, which can be queried
/// with its various methods, or converted into a [String] using its [Display] impl.
pub struct TracedInstr {
    op: TracedOp,
    op_int: i64,
    instr_ptr: u64,
    rel_base: i64,
    packed_modes: PackedModes,
    opcode: OpCode,
    stored: Option<i64>,
}

impl TracedInstr {
    /// Return the relative base at the time the traced instruction was excuted
    pub fn rel_base(&self) -> i64 {
        self.rel_base
    }

    /// Return the instruction pointer's position when the traced instruction was executed
    pub fn instr_ptr(&self) -> u64 {
        self.instr_ptr
    }

    /// Return the actual integer of the traced instruction
    pub fn op_int(&self) -> i64 {
        self.op_int
    }

    /// Return the opcode of the traced instruction
    pub fn op_code(&self) -> OpCode {
        self.opcode
    }

    /// If the instruction stored a value, return that value
    pub fn stored_val(&self) -> Option<i64> {
        self.stored
    }

    /// Return an array of the parameter modes of the traced instruction
    pub fn param_modes(&self) -> [ParamMode; 3] {
        self.packed_modes.unpack()
    }

    fn build(
        op_int: i64,
        instr_ptr: u64,
        rel_base: i64,
        (opcode, modes): (OpCode, [ParamMode; 3]),
        params: &[Resolved],
        stored: Option<i64>,
    ) -> Self {
        let op = match (opcode, params) {
            (OpCode::Add | OpCode::Mul | OpCode::Lt | OpCode::Eq, &[a, b, c]) => {
                TracedOp::Arith(a, b, c)
            }
            (OpCode::Jnz | OpCode::Jz, &[a, b]) => TracedOp::Jump(a, b),
            (OpCode::In, &[a]) => TracedOp::In(a),
            (OpCode::Out, &[a]) => TracedOp::Out(a),
            (OpCode::Rbo, &[a]) => TracedOp::Rbo(a),
            _ => {
                debug_assert_eq!(opcode, OpCode::Halt, "wrong parameter count for {opcode}");
                TracedOp::Halt
            }
        };
        Self {
            op,
            op_int,
            instr_ptr,
            rel_base,
            packed_modes: PackedModes::pack(modes),
            opcode,
            stored,
        }
    }
}

impl Interpreter {
    /// Begin a [Trace] of executed instructions. If a trace is already running, this replaces that
    /// trace and returns it in a [`Some`], otherwise, it returns [`None`].
    pub fn start_trace(&mut self) -> Option<Trace> {
        self.trace.replace(Trace::new())
    }

    /// Stop tracing executed instructions into a [Trace]. If no trace was active, returns [`None`]
    ///
    /// see [Interpreter::start_trace]
    pub fn end_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Get a view of the current trace
    pub fn show_trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}

#[derive(Debug, Default, Clone)]
/// A log of instructions that an [Interpreter] has executed since a call to
/// [Interpreter::start_trace]
pub struct Trace(pub Vec<TracedInstr>);

impl Trace {
    pub(crate) fn push(
        &mut self,
        op_int: i64,
        instr_ptr: u64,
        rel_base: i64,
        decoded: (OpCode, [ParamMode; 3]),
        params: &[Resolved],
        stored: Option<i64>,
    ) {
        self.0.push(TracedInstr::build(
            op_int, instr_ptr, rel_base, decoded, params, stored,
        ));
    }

    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|instr| writeln!(f, "{instr}"))
    }
}

impl Debug for TracedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! arg {
            ($arg: ident) => {
                format_args!("{} => {}", $arg.0, $arg.1)
            };
        }
        macro_rules! variant {
            ($name: literal, ($($arg: ident),*)) => {
                f.debug_tuple($name)
                $(.field(&arg!($arg) ))*
                .finish()
            }
        }
        match self {
            Self::Arith(a0, a1, a2) => variant!("Arith", (a0, a1, a2)),
            Self::In(a0) => variant!("In", (a0)),
            Self::Out(a0) => variant!("Out", (a0)),
            Self::Jump(a0, a1) => variant!("Jump", (a0, a1)),
            Self::Rbo(a0) => variant!("Rbo", (a0)),
            Self::Halt => write!(f, "Halt"),
        }
    }
}

impl Debug for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedInstr")
            .field("op", &self.op)
            .field("op_int", &self.op_int)
            .field("instr_ptr", &self.instr_ptr)
            .field("rel_base", &self.rel_base)
            .field("modes", &self.packed_modes.unpack())
            .field("opcode", &self.opcode)
            .field("stored", &self.stored)
            .finish()
    }
}

impl Display for TracedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ran instruction at {:0>4}: op int {: <5} | ",
            self.instr_ptr, self.op_int
        )?;
        let modes = self.packed_modes.unpack();

        match self.op {
            TracedOp::Arith((pa, va), (pb, vb), (dest, idx)) => write!(
                f,
                "[{} {}{pa} (resolves to {va}), {}{pb} (resolves to {vb}), {}{dest} (stored {} at {idx})]",
                self.opcode,
                modes[0],
                modes[1],
                modes[2],
                self.stored.unwrap_or_default(),
            ),
            TracedOp::Jump((p_cond, v_cond), (p_dest, v_dest)) => {
                let jumped = (self.opcode == OpCode::Jnz) == (v_cond != 0);
                write!(
                    f,
                    "[{} {}{p_cond} (resolves to {v_cond}), {}{p_dest} ({} to {v_dest})]",
                    self.opcode,
                    modes[0],
                    modes[1],
                    if jumped { "jumped" } else { "didn't jump" }
                )
            }
            TracedOp::In((p, v)) => {
                write!(f, "[{} {}{p} (stored {v})]", self.opcode, modes[0])
            }
            TracedOp::Out((p, v)) => {
                write!(f, "[{} {}{p} (resolves to {v})]", self.opcode, modes[0])
            }
            TracedOp::Rbo((p, v)) => write!(
                f,
                "[{} {}{p} (resolves to {v}) (went from {} to {})]",
                self.opcode,
                modes[0],
                self.rel_base,
                self.rel_base + v,
            ),
            TracedOp::Halt => {
                write!(f, "[{}]", self.opcode)
            }
        }
    }
}

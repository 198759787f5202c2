// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use super::*;

impl Interpreter {
    pub(crate) fn parse_op(op: i64) -> Result<(OpCode, [ParamMode; 3]), InterpreterError> {
        Ok((
            OpCode::try_from(op % 100).map_err(|_| InterpreterError::InvalidOpcode(op))?,
            ParamMode::extract(op)?,
        ))
    }

    /// The raw int of the parameter `offset` cells after the current instruction
    fn raw_param(&self, offset: u64) -> i64 {
        self.code[self.index + offset]
    }

    /// Processes the parameter `offset` cells after the current instruction into a concrete
    /// value using the method appropriate for `mode`.
    pub(crate) fn resolve_param(
        &self,
        mode: ParamMode,
        offset: u64,
    ) -> Result<i64, InterpreterError> {
        let raw = self.raw_param(offset);
        match mode {
            ParamMode::Immediate => Ok(raw),
            mode => Ok(self.code[IntcodeMem::resolve(raw, mode, self.rel_offset)?]),
        }
    }

    /// Turns the parameter `offset` cells after the current instruction into the address it
    /// refers to, according to `mode`.
    pub(crate) fn resolve_dest(
        &self,
        mode: ParamMode,
        offset: u64,
    ) -> Result<u64, InterpreterError> {
        IntcodeMem::resolve(self.raw_param(offset), mode, self.rel_offset)
    }

    fn trace(
        &mut self,
        opcode: OpCode,
        modes: [ParamMode; 3],
        params: &[(i64, i64)],
        stored: Option<i64>,
    ) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(
                self.code[self.index],
                self.index,
                self.rel_offset,
                (opcode, modes),
                params,
                stored,
            );
        }
    }

    pub(crate) fn exec_instruction(&mut self) -> Result<StepOutcome, InterpreterError> {
        let (opcode, modes) = Self::parse_op(self.code[self.index])?;

        match opcode {
            OpCode::Add => self.op3(opcode, modes, i64::checked_add),
            OpCode::Mul => self.op3(opcode, modes, i64::checked_mul),
            OpCode::Lt => self.op3(opcode, modes, |a, b| Some(i64::from(a < b))),
            OpCode::Eq => self.op3(opcode, modes, |a, b| Some(i64::from(a == b))),
            OpCode::Jnz => self.jump(opcode, modes, |v| v != 0),
            OpCode::Jz => self.jump(opcode, modes, |v| v == 0),
            OpCode::In => {
                // the write happens once input is supplied
                let dest = self.resolve_dest(modes[0], 1)?;
                self.exec = Exec::Awaiting { dest };
                Ok(StepOutcome::Stopped(Interrupt::WaitingForInput))
            }
            OpCode::Out => {
                let val = self.resolve_param(modes[0], 1)?;
                self.trace(opcode, modes, &[(self.raw_param(1), val)], None);
                self.index += opcode.width();
                self.exec = Exec::Emitted(val);
                Ok(StepOutcome::Stopped(Interrupt::Output(val)))
            }
            OpCode::Rbo => {
                let val = self.resolve_param(modes[0], 1)?;
                let new_base = self
                    .rel_offset
                    .checked_add(val)
                    .ok_or(InterpreterError::ArithmeticOverflow)?;
                self.trace(opcode, modes, &[(self.raw_param(1), val)], None);
                self.rel_offset = new_base;
                self.index += opcode.width();
                Ok(StepOutcome::Running)
            }
            OpCode::Halt => {
                self.trace(opcode, modes, &[], None);
                self.exec = Exec::Halted;
                Ok(StepOutcome::Stopped(Interrupt::Halted))
            }
        }
    }

    /// Complete an `IN` instruction that was suspended waiting for `value`
    pub(crate) fn finish_input(&mut self, dest: u64, value: i64) {
        if let Ok((opcode, modes)) = Self::parse_op(self.code[self.index]) {
            self.trace(opcode, modes, &[(self.raw_param(1), value)], Some(value));
        }
        self.code[dest] = value;
        self.index += OpCode::In.width();
        self.exec = Exec::Running;
    }

    /// common logic of all 4 instructions that take 3 parameters
    fn op3(
        &mut self,
        opcode: OpCode,
        modes: [ParamMode; 3],
        operation: impl Fn(i64, i64) -> Option<i64>,
    ) -> Result<StepOutcome, InterpreterError> {
        let a = self.resolve_param(modes[0], 1)?;
        let b = self.resolve_param(modes[1], 2)?;
        let dest = self.resolve_dest(modes[2], 3)?;
        let val = operation(a, b).ok_or(InterpreterError::ArithmeticOverflow)?;
        self.trace(
            opcode,
            modes,
            &[
                (self.raw_param(1), a),
                (self.raw_param(2), b),
                (self.raw_param(3), dest.cast_signed()),
            ],
            Some(val),
        );
        self.code[dest] = val;
        self.index += opcode.width();
        Ok(StepOutcome::Running)
    }

    fn jump(
        &mut self,
        opcode: OpCode,
        modes: [ParamMode; 3],
        cond: impl Fn(i64) -> bool,
    ) -> Result<StepOutcome, InterpreterError> {
        let expr = self.resolve_param(modes[0], 1)?;
        let dest = self.resolve_param(modes[1], 2)?;
        let jumping = cond(expr);
        let target = if jumping {
            u64::try_from(dest).map_err(|_| InterpreterError::AddressError(dest))?
        } else {
            self.index + opcode.width()
        };
        self.trace(
            opcode,
            modes,
            &[(self.raw_param(1), expr), (self.raw_param(2), dest)],
            None,
        );
        self.index = target;
        Ok(StepOutcome::Running)
    }
}

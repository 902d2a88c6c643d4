//! Reference executor for pseudo-instruction programs.
//!
//! Eight signed 64-bit registers, one signed 64-bit stack shared by
//! `PUSH_R`/`POP_R` and return addresses, and an instruction pointer.
//! Execution starts at address 0 and ends when the instruction pointer
//! reaches the end of the program; register 0 is the result.

use log::trace;
use pseudo::{Instruction, MAX_REGISTERS, Program, RETURN_REGISTER, Reg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Instructions executed before giving up.
    pub step_limit: usize,
    /// Maximum stack depth.
    pub stack_limit: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            step_limit: 1_000_000,
            stack_limit: 1 << 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("stack underflow at {at}")]
    StackUnderflow { at: usize },
    #[error("stack overflow at {at} (limit {limit})")]
    StackOverflow { at: usize, limit: usize },
    #[error("step limit of {limit} reached at {at}")]
    StepLimit { at: usize, limit: usize },
    #[error("jump from {at} to {target} is outside the program")]
    JumpOutOfRange { at: usize, target: i64 },
}

#[derive(Debug)]
pub struct Machine<'p> {
    program: &'p Program,
    config: MachineConfig,
    regs: [i64; MAX_REGISTERS],
    stack: Vec<i64>,
    ip: usize,
    steps: usize,
}

impl<'p> Machine<'p> {
    pub fn new(program: &'p Program, config: MachineConfig) -> Self {
        Self {
            program,
            config,
            regs: [0; MAX_REGISTERS],
            stack: Vec::new(),
            ip: 0,
            steps: 0,
        }
    }

    /// Start from the given register contents instead of all zeroes.
    pub fn with_registers(mut self, regs: [i64; MAX_REGISTERS]) -> Self {
        self.regs = regs;
        self
    }

    pub fn registers(&self) -> &[i64; MAX_REGISTERS] {
        &self.regs
    }

    pub fn register(&self, reg: Reg) -> i64 {
        self.regs[reg.index()]
    }

    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.ip >= self.program.len()
    }

    fn push(&mut self, value: i64) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.stack_limit {
            return Err(RuntimeError::StackOverflow {
                at: self.ip,
                limit: self.config.stack_limit,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<i64, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.ip })
    }

    /// Where control goes next; `len` itself means "halt".
    fn target(&self, target: i64) -> Result<usize, RuntimeError> {
        usize::try_from(target)
            .ok()
            .filter(|&t| t <= self.program.len())
            .ok_or(RuntimeError::JumpOutOfRange {
                at: self.ip,
                target,
            })
    }

    fn jump(&self, target: usize) -> Result<usize, RuntimeError> {
        self.target(i64::try_from(target).unwrap_or(i64::MAX))
    }

    /// Execute one instruction. Returns `false` once halted.
    pub fn step(&mut self) -> Result<bool, RuntimeError> {
        let Some(&instr) = self.program.get(self.ip) else {
            return Ok(false);
        };
        if self.steps >= self.config.step_limit {
            return Err(RuntimeError::StepLimit {
                at: self.ip,
                limit: self.config.step_limit,
            });
        }
        self.steps += 1;
        trace!("{:>4}: {instr:<20} {:?}", self.ip, self.regs);

        let r = |reg: Reg| reg.index();
        let mut next = self.ip + 1;
        match instr {
            Instruction::MoveI { src, dst } => self.regs[r(dst)] = src,
            Instruction::MoveR { src, dst } => self.regs[r(dst)] = self.regs[r(src)],
            Instruction::AddI { src, dst } => {
                self.regs[r(dst)] = self.regs[r(dst)].wrapping_add(src);
            }
            Instruction::AddR { src, dst } => {
                self.regs[r(dst)] = self.regs[r(dst)].wrapping_add(self.regs[r(src)]);
            }
            Instruction::SubI { src, dst } => {
                self.regs[r(dst)] = self.regs[r(dst)].wrapping_sub(src);
            }
            Instruction::SubR { src, dst } => {
                self.regs[r(dst)] = self.regs[r(dst)].wrapping_sub(self.regs[r(src)]);
            }
            Instruction::Ret => {
                let addr = self.pop()?;
                next = self.target(addr)?;
            }
            Instruction::JumpI { target } => next = self.jump(target)?,
            Instruction::CallI { target } => {
                let target = self.jump(target)?;
                let ret = i64::try_from(next).unwrap_or(i64::MAX);
                self.push(ret)?;
                next = target;
            }
            Instruction::PushR { src } => self.push(self.regs[r(src)])?,
            Instruction::PopR { dst } => self.regs[r(dst)] = self.pop()?,
            Instruction::BneR { a, b, target } => {
                if self.regs[r(a)] != self.regs[r(b)] {
                    next = self.jump(target)?;
                }
            }
            Instruction::BneI { a, b, target } => {
                if a != self.regs[r(b)] {
                    next = self.jump(target)?;
                }
            }
        }
        self.ip = next;
        Ok(true)
    }

    /// Execute one instruction and describe it: address, instruction, and
    /// the register it wrote or the stack after it. `None` once halted.
    pub fn step_report(&mut self) -> Result<Option<String>, RuntimeError> {
        let at = self.ip();
        let Some(&instr) = self.program.get(at) else {
            return Ok(None);
        };
        self.step()?;
        let effect = match instr.written_register() {
            Some(reg) => format!("{reg} = {}", self.register(reg)),
            None => format!("stack {:?}", self.stack),
        };
        Ok(Some(format!("{at:>4}: {:<20} {effect}", instr.to_string())))
    }

    /// Run until the program ends and return register 0.
    pub fn run(&mut self) -> Result<i64, RuntimeError> {
        while self.step()? {}
        Ok(self.register(RETURN_REGISTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pseudo::InstructionBuilder;

    fn r(i: usize) -> Reg {
        Reg::new(i).expect("register in range")
    }

    fn run(b: InstructionBuilder) -> Result<i64, RuntimeError> {
        let program = b.finish();
        Machine::new(&program, MachineConfig::default()).run()
    }

    #[test]
    fn empty_program_halts() {
        assert_eq!(run(InstructionBuilder::new()), Ok(0));
    }

    #[test]
    fn arithmetic_wraps() {
        let mut b = InstructionBuilder::new();
        b.move_i(i64::MAX, r(1));
        b.add_i(1, r(1));
        b.move_r(r(1), r(0));
        b.sub_i(1, r(0));
        assert_eq!(run(b), Ok(i64::MAX));
    }

    #[test]
    fn call_and_return() {
        let mut b = InstructionBuilder::new();
        let skip = b.jump_forward();
        let entry = b.here();
        b.add_i(2, r(0));
        b.ret();
        b.bind(skip);
        b.move_i(40, r(0));
        b.call(entry);
        let program = b.finish();
        let mut machine = Machine::new(&program, MachineConfig::default());
        assert_eq!(machine.run(), Ok(42));
        assert!(machine.stack().is_empty());
        assert!(machine.is_halted());
        assert_eq!(machine.steps(), 5);
    }

    #[test]
    fn branches() {
        // r0 = (r1 != 3) ? 1 : 2
        let mut b = InstructionBuilder::new();
        b.bne_i(3, r(1), 3);
        b.move_i(2, r(0));
        b.jump(4);
        b.move_i(1, r(0));
        let program = b.finish();
        let run_with = |x| {
            let mut regs = [0; MAX_REGISTERS];
            regs[1] = x;
            Machine::new(&program, MachineConfig::default())
                .with_registers(regs)
                .run()
        };
        assert_eq!(run_with(3), Ok(2));
        assert_eq!(run_with(5), Ok(1));
    }

    #[test]
    fn stack_errors() {
        let mut b = InstructionBuilder::new();
        b.pop(r(0));
        assert_eq!(run(b), Err(RuntimeError::StackUnderflow { at: 0 }));

        let mut b = InstructionBuilder::new();
        b.ret();
        assert_eq!(run(b), Err(RuntimeError::StackUnderflow { at: 0 }));

        let mut b = InstructionBuilder::new();
        b.push(r(0));
        b.jump(0);
        let program = b.finish();
        let config = MachineConfig {
            stack_limit: 4,
            ..MachineConfig::default()
        };
        let err = Machine::new(&program, config).run().unwrap_err();
        assert_eq!(err, RuntimeError::StackOverflow { at: 0, limit: 4 });
    }

    #[test]
    fn step_limit() {
        let mut b = InstructionBuilder::new();
        b.jump(0);
        let program = b.finish();
        let config = MachineConfig {
            step_limit: 10,
            ..MachineConfig::default()
        };
        let mut machine = Machine::new(&program, config);
        assert_eq!(machine.run(), Err(RuntimeError::StepLimit { at: 0, limit: 10 }));
        assert_eq!(machine.steps(), 10);
    }

    #[test]
    fn step_reports() {
        let mut b = InstructionBuilder::new();
        b.move_i(7, r(2));
        b.push(r(2));
        b.pop(r(0));
        let program = b.finish();
        let mut machine = Machine::new(&program, MachineConfig::default());

        let mut lines = Vec::new();
        while let Some(line) = machine.step_report().unwrap() {
            lines.push(line);
        }
        assert_eq!(lines, [
            format!("   0: {:<20} r2 = 7", "MOVE_I 7 r2"),
            format!("   1: {:<20} stack [7]", "PUSH_R r2"),
            format!("   2: {:<20} r0 = 7", "POP_R r0"),
        ]);
        assert_eq!(machine.ip(), 3);
        assert_eq!(machine.step_report(), Ok(None));
    }

    #[test]
    fn jump_out_of_range() {
        let mut b = InstructionBuilder::new();
        b.jump(5);
        assert_eq!(run(b), Err(RuntimeError::JumpOutOfRange { at: 0, target: 5 }));

        let mut b = InstructionBuilder::new();
        b.move_i(-1, r(1));
        b.push(r(1));
        b.ret();
        assert_eq!(run(b), Err(RuntimeError::JumpOutOfRange { at: 2, target: -1 }));
    }
}

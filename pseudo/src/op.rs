/// Pseudo-instruction opcodes.
///
/// Operands are written source first, destination last. Registers are
/// indices into the executor's register file, immediates are signed 64-bit
/// literals and targets are absolute instruction indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Load an immediate into a register.
    /// Operands: `src:imm`, `dst:reg`
    MoveI,

    /// Copy a register into another register.
    /// Operands: `src:reg`, `dst:reg`
    MoveR,

    /// `dst += src`.
    /// Operands: `src:imm`, `dst:reg`
    AddI,

    /// `dst += src`.
    /// Operands: `src:reg`, `dst:reg`
    AddR,

    /// `dst -= src`.
    /// Operands: `src:imm`, `dst:reg`
    SubI,

    /// `dst -= src`.
    /// Operands: `src:reg`, `dst:reg`
    SubR,

    /// Pop a return address off the operand stack and jump to it.
    Ret,

    /// Unconditional jump.
    /// Operands: `target:addr`
    JumpI,

    /// Push the address of the next instruction, then jump.
    /// Operands: `target:addr`
    CallI,

    /// Push a register onto the operand stack.
    /// Operands: `src:reg`
    PushR,

    /// Pop the operand stack into a register.
    /// Operands: `dst:reg`
    PopR,

    /// Branch if the registers differ, otherwise fall through.
    /// Operands: `a:reg`, `b:reg`, `target:addr`
    BneR,

    /// Branch if the immediate differs from the register, otherwise fall
    /// through.
    /// Operands: `a:imm`, `b:reg`, `target:addr`
    BneI,
}

impl Op {
    pub const COUNT: usize = Op::BneI as usize + 1;

    pub const ALL: [Op; Op::COUNT] = [
        Op::MoveI,
        Op::MoveR,
        Op::AddI,
        Op::AddR,
        Op::SubI,
        Op::SubR,
        Op::Ret,
        Op::JumpI,
        Op::CallI,
        Op::PushR,
        Op::PopR,
        Op::BneR,
        Op::BneI,
    ];

    /// Mnemonic used in listings.
    pub const fn name(self) -> &'static str {
        match self {
            Op::MoveI => "MOVE_I",
            Op::MoveR => "MOVE_R",
            Op::AddI => "ADD_I",
            Op::AddR => "ADD_R",
            Op::SubI => "SUB_I",
            Op::SubR => "SUB_R",
            Op::Ret => "RET",
            Op::JumpI => "JUMP_I",
            Op::CallI => "CALL_I",
            Op::PushR => "PUSH_R",
            Op::PopR => "POP_R",
            Op::BneR => "BNE_R",
            Op::BneI => "BNE_I",
        }
    }

    /// Number of operands an executor must decode.
    pub const fn arity(self) -> usize {
        match self {
            Op::Ret => 0,
            Op::JumpI | Op::CallI | Op::PushR | Op::PopR => 1,
            Op::MoveI
            | Op::MoveR
            | Op::AddI
            | Op::AddR
            | Op::SubI
            | Op::SubR => 2,
            Op::BneR | Op::BneI => 3,
        }
    }
}

impl core::fmt::Display for Op {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

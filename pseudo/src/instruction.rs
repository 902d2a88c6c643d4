use core::fmt;

use crate::op::Op;
use crate::value::Reg;

/// A pseudo-instruction with typed operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    MoveI {
        src: i64,
        dst: Reg,
    },
    MoveR {
        src: Reg,
        dst: Reg,
    },
    AddI {
        src: i64,
        dst: Reg,
    },
    AddR {
        src: Reg,
        dst: Reg,
    },
    SubI {
        src: i64,
        dst: Reg,
    },
    SubR {
        src: Reg,
        dst: Reg,
    },
    Ret,
    JumpI {
        target: usize,
    },
    CallI {
        target: usize,
    },
    PushR {
        src: Reg,
    },
    PopR {
        dst: Reg,
    },
    BneR {
        a: Reg,
        b: Reg,
        target: usize,
    },
    BneI {
        a: i64,
        b: Reg,
        target: usize,
    },
}

/// A single decoded operand, in the order an executor reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    Imm(i64),
    Addr(usize),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg(reg) => write!(f, "{reg}"),
            Self::Imm(n) => write!(f, "{n}"),
            Self::Addr(addr) => write!(f, "{addr}"),
        }
    }
}

impl Instruction {
    pub const fn op(&self) -> Op {
        match self {
            Self::MoveI { .. } => Op::MoveI,
            Self::MoveR { .. } => Op::MoveR,
            Self::AddI { .. } => Op::AddI,
            Self::AddR { .. } => Op::AddR,
            Self::SubI { .. } => Op::SubI,
            Self::SubR { .. } => Op::SubR,
            Self::Ret => Op::Ret,
            Self::JumpI { .. } => Op::JumpI,
            Self::CallI { .. } => Op::CallI,
            Self::PushR { .. } => Op::PushR,
            Self::PopR { .. } => Op::PopR,
            Self::BneR { .. } => Op::BneR,
            Self::BneI { .. } => Op::BneI,
        }
    }

    pub fn operands(&self) -> Vec<Operand> {
        use Operand::{Addr, Imm, Reg};
        match *self {
            Self::MoveI { src, dst }
            | Self::AddI { src, dst }
            | Self::SubI { src, dst } => vec![Imm(src), Reg(dst)],
            Self::MoveR { src, dst }
            | Self::AddR { src, dst }
            | Self::SubR { src, dst } => vec![Reg(src), Reg(dst)],
            Self::Ret => Vec::new(),
            Self::JumpI { target } | Self::CallI { target } => {
                vec![Addr(target)]
            }
            Self::PushR { src } => vec![Reg(src)],
            Self::PopR { dst } => vec![Reg(dst)],
            Self::BneR { a, b, target } => vec![Reg(a), Reg(b), Addr(target)],
            Self::BneI { a, b, target } => vec![Imm(a), Reg(b), Addr(target)],
        }
    }

    /// The register this instruction overwrites, if any.
    pub const fn written_register(&self) -> Option<Reg> {
        match *self {
            Self::MoveI { dst, .. }
            | Self::MoveR { dst, .. }
            | Self::AddI { dst, .. }
            | Self::AddR { dst, .. }
            | Self::SubI { dst, .. }
            | Self::SubR { dst, .. }
            | Self::PopR { dst } => Some(dst),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op().name())?;
        for operand in self.operands() {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

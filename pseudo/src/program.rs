use core::fmt;
use std::collections::BTreeMap;

use crate::instruction::Instruction;

/// A finished, flat pseudo-instruction sequence plus its listing comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    code: Vec<Instruction>,
    comments: BTreeMap<usize, String>,
}

impl Program {
    pub fn new(code: Vec<Instruction>, comments: BTreeMap<usize, String>) -> Self {
        Self { code, comments }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn get(&self, addr: usize) -> Option<&Instruction> {
        self.code.get(addr)
    }

    pub fn comment(&self, addr: usize) -> Option<&str> {
        self.comments.get(&addr).map(String::as_str)
    }

    /// Human-readable listing, one instruction per line.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.code.len().saturating_sub(1).to_string().len();
        for (addr, instr) in self.code.iter().enumerate() {
            if addr > 0 {
                writeln!(f)?;
            }
            write!(f, "{addr:>width$}: {instr}")?;
            if let Some(comment) = self.comments.get(&addr) {
                write!(f, "  # {comment}")?;
            }
        }
        Ok(())
    }
}

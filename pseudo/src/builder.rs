use std::collections::BTreeMap;

use crate::instruction::Instruction;
use crate::program::Program;
use crate::value::Reg;

/// A forward jump whose target has not yet been resolved.
///
/// Created by [`InstructionBuilder::jump_forward`]. Resolve it with
/// [`InstructionBuilder::bind`].
#[derive(Debug)]
#[must_use = "an unbound label leaves a jump to address 0"]
pub struct Label {
    /// Index of the placeholder jump.
    at: usize,
}

/// Builds a flat pseudo-instruction sequence.
///
/// Addresses are instruction indices, so [`here`](Self::here) is both the
/// number of instructions emitted so far and the address of the next one.
#[derive(Debug, Default)]
pub struct InstructionBuilder {
    code: Vec<Instruction>,
    comments: BTreeMap<usize, String>,
}

impl InstructionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the next instruction to be emitted.
    pub fn here(&self) -> usize {
        self.code.len()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    pub fn finish(self) -> Program {
        Program::new(self.code, self.comments)
    }

    /// Append an instruction and return its address.
    pub fn emit(&mut self, instr: Instruction) -> usize {
        let at = self.code.len();
        self.code.push(instr);
        at
    }

    /// Attach a listing comment to the instruction at `at`. A second
    /// comment on the same instruction is appended after a `;`.
    pub fn comment(&mut self, at: usize, text: impl Into<String>) {
        let text = text.into();
        self.comments
            .entry(at)
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(&text);
            })
            .or_insert(text);
    }

    // ── emit helpers ───────────────────────────────────────────────

    /// `MOVE_I <src> <dst>`
    pub fn move_i(&mut self, src: i64, dst: Reg) -> usize {
        self.emit(Instruction::MoveI { src, dst })
    }

    /// `MOVE_R <src> <dst>`
    pub fn move_r(&mut self, src: Reg, dst: Reg) -> usize {
        self.emit(Instruction::MoveR { src, dst })
    }

    /// `ADD_I <src> <dst>` — `dst += src`.
    pub fn add_i(&mut self, src: i64, dst: Reg) -> usize {
        self.emit(Instruction::AddI { src, dst })
    }

    /// `ADD_R <src> <dst>` — `dst += src`.
    pub fn add_r(&mut self, src: Reg, dst: Reg) -> usize {
        self.emit(Instruction::AddR { src, dst })
    }

    /// `SUB_I <src> <dst>` — `dst -= src`.
    pub fn sub_i(&mut self, src: i64, dst: Reg) -> usize {
        self.emit(Instruction::SubI { src, dst })
    }

    /// `SUB_R <src> <dst>` — `dst -= src`.
    pub fn sub_r(&mut self, src: Reg, dst: Reg) -> usize {
        self.emit(Instruction::SubR { src, dst })
    }

    /// `RET`
    pub fn ret(&mut self) -> usize {
        self.emit(Instruction::Ret)
    }

    /// `CALL_I <target>`
    pub fn call(&mut self, target: usize) -> usize {
        self.emit(Instruction::CallI { target })
    }

    /// `PUSH_R <src>`
    pub fn push(&mut self, src: Reg) -> usize {
        self.emit(Instruction::PushR { src })
    }

    /// `POP_R <dst>`
    pub fn pop(&mut self, dst: Reg) -> usize {
        self.emit(Instruction::PopR { dst })
    }

    /// `BNE_R <a> <b> <target>`
    pub fn bne_r(&mut self, a: Reg, b: Reg, target: usize) -> usize {
        self.emit(Instruction::BneR { a, b, target })
    }

    /// `BNE_I <a> <b> <target>`
    pub fn bne_i(&mut self, a: i64, b: Reg, target: usize) -> usize {
        self.emit(Instruction::BneI { a, b, target })
    }

    /// Emit an unconditional jump to a known address.
    pub fn jump(&mut self, target: usize) -> usize {
        self.emit(Instruction::JumpI { target })
    }

    /// Emit an unconditional forward jump. Returns a [`Label`] that must be
    /// resolved later with [`bind`](Self::bind).
    pub fn jump_forward(&mut self) -> Label {
        let at = self.jump(0);
        Label { at }
    }

    /// Address of the placeholder jump behind `label`.
    pub fn label_address(&self, label: &Label) -> usize {
        label.at
    }

    /// Bind a forward jump label to the current position.
    pub fn bind(&mut self, label: Label) {
        let target = self.here();
        if let Some(Instruction::JumpI { target: slot }) =
            self.code.get_mut(label.at)
        {
            *slot = target;
        }
    }
}

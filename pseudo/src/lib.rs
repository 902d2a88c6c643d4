//! # Pseudo
//!
//! The architecture-agnostic instruction set the `imp` code generator
//! emits, and the compile-time values it reasons about.
//!
//! ```text
//!  Value (Register | Number | Command)     compile-time operands
//!      │
//!      ▼
//!  InstructionBuilder ──────────────────▶ Program ──▶ executor / listing
//!   (labels, comments)                    (flat Vec<Instruction>)
//! ```
//!
//! Addresses are instruction indices. The executor contract is documented
//! on [`Op`].

mod builder;
mod instruction;
mod op;
mod program;
mod value;

pub use builder::{InstructionBuilder, Label};
pub use instruction::{Instruction, Operand};
pub use op::Op;
pub use program::Program;
pub use value::{Command, Kind, MAX_REGISTERS, RETURN_REGISTER, Reg, Value};

#[cfg(test)]
mod tests {
    use super::*;

    fn r(i: usize) -> Reg {
        Reg::new(i).expect("register in range")
    }

    #[test]
    fn register_range() {
        assert!(Reg::new(MAX_REGISTERS - 1).is_some());
        assert!(Reg::new(MAX_REGISTERS).is_none());
        assert_eq!(Reg::all().count(), MAX_REGISTERS);
        assert_eq!(Reg::all().next_back(), Reg::new(7));
    }

    #[test]
    fn emit_sequence() {
        let mut b = InstructionBuilder::new();
        b.move_i(5, r(0));
        b.move_r(r(0), r(1));
        b.add_i(2, r(1));
        b.sub_r(r(0), r(1));
        b.push(r(1));
        b.pop(r(2));
        b.ret();

        assert_eq!(b.finish().instructions(), &[
            Instruction::MoveI { src: 5, dst: r(0) },
            Instruction::MoveR { src: r(0), dst: r(1) },
            Instruction::AddI { src: 2, dst: r(1) },
            Instruction::SubR { src: r(0), dst: r(1) },
            Instruction::PushR { src: r(1) },
            Instruction::PopR { dst: r(2) },
            Instruction::Ret,
        ]);
    }

    #[test]
    fn forward_jump() {
        let mut b = InstructionBuilder::new();
        let label = b.jump_forward();
        assert_eq!(b.label_address(&label), 0);
        b.add_i(1, r(0));
        b.ret();
        b.bind(label);
        b.move_i(0, r(1));

        assert_eq!(b.finish().instructions(), &[
            Instruction::JumpI { target: 3 },
            Instruction::AddI { src: 1, dst: r(0) },
            Instruction::Ret,
            Instruction::MoveI { src: 0, dst: r(1) },
        ]);
    }

    #[test]
    fn bind_to_end_of_program() {
        let mut b = InstructionBuilder::new();
        let label = b.jump_forward();
        b.bind(label);
        assert_eq!(b.instructions(), &[Instruction::JumpI { target: 1 }]);
    }

    #[test]
    fn here_tracks_addresses() {
        let mut b = InstructionBuilder::new();
        assert_eq!(b.here(), 0);
        assert_eq!(b.call(0), 0);
        assert_eq!(b.bne_i(3, r(1), 4), 1);
        assert_eq!(b.here(), 2);
    }

    #[test]
    fn operand_counts_match_arity() {
        let samples = [
            Instruction::MoveI { src: 1, dst: r(0) },
            Instruction::MoveR { src: r(1), dst: r(0) },
            Instruction::AddI { src: 1, dst: r(0) },
            Instruction::AddR { src: r(1), dst: r(0) },
            Instruction::SubI { src: 1, dst: r(0) },
            Instruction::SubR { src: r(1), dst: r(0) },
            Instruction::Ret,
            Instruction::JumpI { target: 9 },
            Instruction::CallI { target: 9 },
            Instruction::PushR { src: r(3) },
            Instruction::PopR { dst: r(3) },
            Instruction::BneR { a: r(1), b: r(2), target: 9 },
            Instruction::BneI { a: 4, b: r(2), target: 9 },
        ];
        assert_eq!(samples.len(), Op::COUNT);
        for (instr, op) in samples.iter().zip(Op::ALL) {
            assert_eq!(instr.op(), op);
            assert_eq!(instr.operands().len(), op.arity(), "{op}");
        }
    }

    #[test]
    fn written_register() {
        assert_eq!(
            Instruction::PopR { dst: r(4) }.written_register(),
            Some(r(4))
        );
        assert_eq!(Instruction::PushR { src: r(4) }.written_register(), None);
        assert_eq!(
            Instruction::BneR { a: r(1), b: r(2), target: 0 }.written_register(),
            None
        );
    }

    #[test]
    fn display_instructions() {
        assert_eq!(
            Instruction::MoveI { src: -3, dst: r(2) }.to_string(),
            "MOVE_I -3 r2"
        );
        assert_eq!(
            Instruction::BneR { a: r(1), b: r(2), target: 17 }.to_string(),
            "BNE_R r1 r2 17"
        );
        assert_eq!(Instruction::Ret.to_string(), "RET");
    }

    #[test]
    fn dump_with_comments() {
        let mut b = InstructionBuilder::new();
        let label = b.jump_forward();
        b.comment(0, "skip f");
        for _ in 0..9 {
            b.add_i(1, r(0));
        }
        let ret = b.ret();
        b.comment(ret, "return");
        b.comment(ret, "tail");
        b.bind(label);

        let dump = b.finish().dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], " 0: JUMP_I 11  # skip f");
        assert_eq!(lines[1], " 1: ADD_I 1 r0");
        assert_eq!(lines[10], "10: RET  # return; tail");
    }

    #[test]
    fn value_kinds() {
        let cmd = Command { entry: 1, params: vec![Kind::Register, Kind::Number] };
        assert_eq!(Value::from(r(3)).kind(), Kind::Register);
        assert_eq!(Value::from(7i64).kind(), Kind::Number);
        assert_eq!(Value::Command(cmd.clone()).kind(), Kind::Command);
        assert_eq!(cmd.to_string(), "command@1(register, number)");
    }
}

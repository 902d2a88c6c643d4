use pseudo::{InstructionBuilder, Kind, Reg, Value};

use super::error::{CompileError, Count};

/// What a builtin emitter gets to work with.
pub struct BuiltinContext<'a> {
    pub builder: &'a mut InstructionBuilder,
    /// Entry address of the declaration being lowered, if any.
    pub entry: Option<usize>,
}

pub type BuiltinFunction =
    fn(&mut BuiltinContext<'_>, &[Value]) -> Result<(), CompileError>;

/// A primitive command. Arguments are resolved without a parameter
/// template; the emitter checks operand kinds itself.
#[derive(Debug, Copy, Clone)]
pub struct BuiltinDesc {
    pub name: &'static str,
    pub arity: Count,
    pub emit: BuiltinFunction,
}

impl BuiltinDesc {
    pub const fn new(name: &'static str, arity: Count, emit: BuiltinFunction) -> Self {
        Self { name, arity, emit }
    }

    /// Check arity, then emit.
    pub fn lower(
        &self,
        ctx: &mut BuiltinContext<'_>,
        args: &[Value],
    ) -> Result<(), CompileError> {
        if !self.arity.accepts(args.len()) {
            return Err(CompileError::CountMismatch {
                expected: self.arity,
                found: args.len(),
            });
        }
        (self.emit)(ctx, args)
    }
}

pub const BUILTINS: &[BuiltinDesc] = &[
    BuiltinDesc::new("move", Count::Exactly(2), move_),
    BuiltinDesc::new("add", Count::Exactly(2), add),
    BuiltinDesc::new("subtract", Count::Exactly(2), subtract),
    BuiltinDesc::new("return", Count::OneOf(&[0, 2]), return_),
    BuiltinDesc::new("recurse", Count::OneOf(&[0, 2]), recurse),
];

pub fn find(name: &str) -> Option<&'static BuiltinDesc> {
    BUILTINS.iter().find(|desc| desc.name == name)
}

fn register(value: &Value) -> Result<Reg, CompileError> {
    match value {
        Value::Register(reg) => Ok(*reg),
        other => Err(CompileError::TypeMismatch {
            expected: Kind::Register,
            found: other.kind(),
            subject: other.to_string(),
        }),
    }
}

fn command_operand(value: &Value) -> CompileError {
    CompileError::unsupported(format!("command operand `{value}`"))
}

fn move_(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<(), CompileError> {
    let dst = register(&args[1])?;
    match &args[0] {
        Value::Register(src) => ctx.builder.move_r(*src, dst),
        Value::Number(n) => ctx.builder.move_i(*n, dst),
        other => return Err(command_operand(other)),
    };
    Ok(())
}

fn add(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<(), CompileError> {
    let dst = register(&args[1])?;
    match &args[0] {
        Value::Register(src) => ctx.builder.add_r(*src, dst),
        Value::Number(n) => ctx.builder.add_i(*n, dst),
        other => return Err(command_operand(other)),
    };
    Ok(())
}

fn subtract(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<(), CompileError> {
    let dst = register(&args[1])?;
    match &args[0] {
        Value::Register(src) => ctx.builder.sub_r(*src, dst),
        Value::Number(n) => ctx.builder.sub_i(*n, dst),
        other => return Err(command_operand(other)),
    };
    Ok(())
}

/// With two operands, emit a branch over the next instruction that is
/// taken when they differ.
fn guard(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<(), CompileError> {
    let [a, b] = args else {
        return Ok(());
    };
    let b = register(b)?;
    let skip = ctx.builder.here() + 2;
    match a {
        Value::Register(a) => ctx.builder.bne_r(*a, b, skip),
        Value::Number(a) => ctx.builder.bne_i(*a, b, skip),
        other => return Err(command_operand(other)),
    };
    Ok(())
}

fn return_(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<(), CompileError> {
    guard(ctx, args)?;
    ctx.builder.ret();
    Ok(())
}

fn recurse(ctx: &mut BuiltinContext<'_>, args: &[Value]) -> Result<(), CompileError> {
    let entry = ctx
        .entry
        .ok_or_else(|| CompileError::unsupported("`recurse` outside a declaration"))?;
    guard(ctx, args)?;
    ctx.builder.call(entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::error::ErrorKind;
    use pseudo::Instruction;

    fn r(i: usize) -> Reg {
        Reg::new(i).expect("register in range")
    }

    fn emit(name: &str, entry: Option<usize>, args: &[Value]) -> Result<Vec<Instruction>, CompileError> {
        let mut builder = InstructionBuilder::new();
        builder.move_i(0, r(7)); // offset addresses by one
        let desc = find(name).expect("builtin exists");
        desc.lower(&mut BuiltinContext { builder: &mut builder, entry }, args)?;
        Ok(builder.instructions()[1..].to_vec())
    }

    #[test]
    fn table_names_are_unique() {
        for (i, desc) in BUILTINS.iter().enumerate() {
            assert!(BUILTINS[i + 1..].iter().all(|d| d.name != desc.name), "{}", desc.name);
        }
        assert!(find("move").is_some());
        assert!(find("mov").is_none());
    }

    #[test]
    fn arithmetic() {
        assert_eq!(emit("move", None, &[Value::Number(3), Value::Register(r(1))]), Ok(vec![
            Instruction::MoveI { src: 3, dst: r(1) }
        ]));
        assert_eq!(emit("add", None, &[Value::Register(r(2)), Value::Register(r(1))]), Ok(vec![
            Instruction::AddR { src: r(2), dst: r(1) }
        ]));
        assert_eq!(emit("subtract", None, &[Value::Number(-1), Value::Register(r(0))]), Ok(vec![
            Instruction::SubI { src: -1, dst: r(0) }
        ]));
    }

    #[test]
    fn destination_must_be_register() {
        let err = emit("add", None, &[Value::Register(r(2)), Value::Number(4)]).unwrap_err();
        assert_eq!(err, CompileError::TypeMismatch {
            expected: Kind::Register,
            found: Kind::Number,
            subject: "4".into(),
        });
    }

    #[test]
    fn arity() {
        let err = emit("move", None, &[Value::Number(3)]).unwrap_err();
        assert_eq!(err, CompileError::CountMismatch { expected: Count::Exactly(2), found: 1 });
        let err = emit("return", None, &[Value::Number(3)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CountMismatch);
    }

    #[test]
    fn guarded_return() {
        assert_eq!(emit("return", None, &[]), Ok(vec![Instruction::Ret]));
        assert_eq!(emit("return", None, &[Value::Number(0), Value::Register(r(1))]), Ok(vec![
            Instruction::BneI { a: 0, b: r(1), target: 3 },
            Instruction::Ret,
        ]));
        assert_eq!(emit("return", None, &[Value::Register(r(2)), Value::Register(r(1))]), Ok(vec![
            Instruction::BneR { a: r(2), b: r(1), target: 3 },
            Instruction::Ret,
        ]));
    }

    #[test]
    fn recurse_needs_a_declaration() {
        let err = emit("recurse", None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(emit("recurse", Some(4), &[]), Ok(vec![Instruction::CallI { target: 4 }]));
        assert_eq!(emit("recurse", Some(4), &[Value::Register(r(3)), Value::Register(r(0))]), Ok(vec![
            Instruction::BneR { a: r(3), b: r(0), target: 3 },
            Instruction::CallI { target: 4 },
        ]));
    }
}

//! Lexical scopes and alias resolution.
//!
//! The chain is a stack of [`Scope`]s. The bottom one is the global scope,
//! seeded with the register aliases `0` through `7`; every declaration body
//! is lowered inside a child scope that is popped as soon as the body is
//! done. Lookups walk from the innermost scope outward and the first match
//! wins.

use std::collections::HashMap;

use log::trace;
use parser::Alias;
use pseudo::{Command, Kind, MAX_REGISTERS, Reg, Value};

use super::error::{CompileError, Count};

/// Parse number-alias text as an integer literal.
///
/// Accepts an optional `-` sign and `0x`/`0o`/`0b` radix prefixes. Values
/// must fit in an `i64`.
pub fn parse_literal(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0o" | "0O") => (8, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    // from_str_radix tolerates a sign of its own.
    if !digits.bytes().next().is_some_and(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// The kind a parameter or argument alias is spelled as.
pub fn alias_kind(alias: &Alias) -> Kind {
    match alias {
        Alias::Register(_) => Kind::Register,
        Alias::Number(_) => Kind::Number,
        Alias::Command(_) => Kind::Command,
    }
}

/// One lexical level of the symbol table.
#[derive(Debug, Default)]
pub struct Scope {
    name: String,
    /// Entry address of the declaration whose body this scope belongs to.
    entry: Option<usize>,
    commands: HashMap<String, Command>,
    registers: HashMap<String, Reg>,
    numbers: HashMap<String, Value>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The outermost scope, with `@0` .. `@7` naming the register file.
    pub fn global() -> Self {
        let mut scope = Self::new("global");
        for reg in Reg::all() {
            scope.bind_register(reg.index().to_string(), reg);
        }
        scope
    }

    /// Scope for the body of the declaration entered at `entry`.
    pub fn for_declaration(name: impl Into<String>, entry: usize) -> Self {
        Self {
            entry: Some(entry),
            ..Self::new(name)
        }
    }

    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    pub fn bind_command(&mut self, name: impl Into<String>, command: Command) {
        self.commands.insert(name.into(), command);
    }

    pub fn bind_register(&mut self, name: impl Into<String>, reg: Reg) {
        self.registers.insert(name.into(), reg);
    }

    pub fn bind_number(&mut self, name: impl Into<String>, value: Value) {
        self.numbers.insert(name.into(), value);
    }

    /// Look `alias` up in this level only.
    fn get(&self, alias: &Alias) -> Option<Value> {
        match alias {
            Alias::Register(id) => self.registers.get(&id.name).copied().map(Value::Register),
            Alias::Number(id) => self.numbers.get(&id.name).cloned(),
            Alias::Command(id) => self.commands.get(&id.name).cloned().map(Value::Command),
        }
    }
}

/// A stack of scopes, innermost last. Never empty.
#[derive(Debug)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    /// A chain holding only a freshly seeded global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::global()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self, scope: Scope) {
        trace!("scope push `{}` (depth {})", scope.name, self.scopes.len() + 1);
        self.scopes.push(scope);
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() == 1 {
            return None;
        }
        let scope = self.scopes.pop();
        if let Some(scope) = &scope {
            trace!("scope pop `{}` (depth {})", scope.name, self.scopes.len());
        }
        scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Bind `name` to `command` in the innermost scope. A second definition
    /// in the same scope replaces the first.
    pub fn define(&mut self, name: &str, command: Command) {
        self.scope_mut().bind_command(name, command);
    }

    /// Resolve `alias`, innermost scope first.
    ///
    /// A number alias whose text is an integer literal always resolves to
    /// that literal.
    pub fn lookup(&self, alias: &Alias) -> Result<Value, CompileError> {
        if let Alias::Number(id) = alias {
            if let Some(n) = parse_literal(&id.name) {
                return Ok(Value::Number(n));
            }
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(alias))
            .ok_or_else(|| CompileError::Undefined {
                name: alias.to_string(),
                line: alias.line(),
            })
    }

    /// The declared command `name`, if any scope defines one.
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.commands.get(name))
    }

    /// Entry address of the innermost declaration being lowered.
    pub fn entry(&self) -> Option<usize> {
        self.scopes.iter().rev().find_map(Scope::entry)
    }

    /// Check `args` against a parameter template and resolve them.
    ///
    /// Without a template every argument is simply looked up. With one, a
    /// register parameter takes a register alias and a number parameter
    /// takes a register or number alias. Commands are never accepted as
    /// arguments.
    pub fn typecheck(
        &self,
        args: &[Alias],
        params: Option<&[Kind]>,
    ) -> Result<Vec<Value>, CompileError> {
        let Some(params) = params else {
            return args.iter().map(|arg| self.resolve_argument(arg)).collect();
        };

        if args.len() != params.len() {
            return Err(CompileError::CountMismatch {
                expected: Count::Exactly(params.len()),
                found: args.len(),
            });
        }

        args.iter()
            .zip(params)
            .map(|(arg, &param)| {
                if let Alias::Command(_) = arg {
                    return self.resolve_argument(arg);
                }
                match (param, alias_kind(arg)) {
                    (Kind::Command, _) => Err(CompileError::unsupported(
                        "command parameters",
                    )),
                    (Kind::Register, Kind::Register)
                    | (Kind::Number, Kind::Register | Kind::Number) => {
                        self.resolve_argument(arg)
                    }
                    (expected, found) => Err(CompileError::TypeMismatch {
                        expected,
                        found,
                        subject: arg.to_string(),
                    }),
                }
            })
            .collect()
    }

    fn resolve_argument(&self, arg: &Alias) -> Result<Value, CompileError> {
        match arg {
            Alias::Command(id) => Err(CompileError::unsupported(format!(
                "command `{}` passed as an argument (line {})",
                id.name, id.line
            ))),
            _ => self.lookup(arg),
        }
    }
}

/// Bind declaration parameters positionally to argument registers and
/// return the resulting parameter template.
pub fn bind_params(
    scope: &mut Scope,
    params: &[Alias],
) -> Result<Vec<Kind>, CompileError> {
    let mut template = Vec::with_capacity(params.len());
    for (i, param) in params.iter().enumerate() {
        let reg = Reg::new(i).ok_or_else(|| {
            CompileError::unsupported(format!(
                "more than {MAX_REGISTERS} parameters"
            ))
        })?;
        match param {
            Alias::Register(id) => scope.bind_register(id.name.clone(), reg),
            Alias::Number(id) => {
                if parse_literal(&id.name).is_some() {
                    return Err(CompileError::unsupported(format!(
                        "number parameter `{param}` is spelled as a literal (line {})",
                        id.line
                    )));
                }
                scope.bind_number(id.name.clone(), Value::Register(reg));
            }
            Alias::Command(id) => {
                return Err(CompileError::unsupported(format!(
                    "command parameter `{}` (line {})",
                    id.name, id.line
                )));
            }
        }
        template.push(alias_kind(param));
    }
    Ok(template)
}

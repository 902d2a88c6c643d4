//! The alias/statement tree.
//!
//! A program is a list of [`Stmt`]s. Every leaf is an [`Alias`] that names
//! a register, a number, or a command and remembers the line it came from.
//! Declarations own their bodies; the tree has no sharing and no cycles.

use std::fmt;
use std::fmt::Write as _;

/// A name as it appeared in the source, plus its line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub line: usize,
}

impl Ident {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

/// A named reference to a register, a number, or a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Alias {
    /// `@name`
    Register(Ident),
    /// `#name`, where `name` may itself be an integer literal.
    Number(Ident),
    /// A bare command name.
    Command(Ident),
}

impl Alias {
    pub fn register(name: impl Into<String>, line: usize) -> Self {
        Self::Register(Ident::new(name, line))
    }

    pub fn number(name: impl Into<String>, line: usize) -> Self {
        Self::Number(Ident::new(name, line))
    }

    pub fn command(name: impl Into<String>, line: usize) -> Self {
        Self::Command(Ident::new(name, line))
    }

    pub fn ident(&self) -> &Ident {
        match self {
            Self::Register(id) | Self::Number(id) | Self::Command(id) => id,
        }
    }

    pub fn name(&self) -> &str {
        &self.ident().name
    }

    pub fn line(&self) -> usize {
        self.ident().line
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(id) => write!(f, "@{}", id.name),
            Self::Number(id) => write!(f, "#{}", id.name),
            Self::Command(id) => write!(f, "{}", id.name),
        }
    }
}

/// `name arg, arg, ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub command: Ident,
    pub args: Vec<Alias>,
}

/// `name: param, ... { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub command: Ident,
    pub params: Vec<Alias>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Call(Call),
    Decl(Decl),
}

impl Stmt {
    pub fn call(name: impl Into<String>, line: usize, args: Vec<Alias>) -> Self {
        Self::Call(Call {
            command: Ident::new(name, line),
            args,
        })
    }

    pub fn decl(
        name: impl Into<String>,
        line: usize,
        params: Vec<Alias>,
        body: Vec<Stmt>,
    ) -> Self {
        Self::Decl(Decl {
            command: Ident::new(name, line),
            params,
            body,
        })
    }

    /// The command this statement calls or declares.
    pub fn command(&self) -> &Ident {
        match self {
            Self::Call(call) => &call.command,
            Self::Decl(decl) => &decl.command,
        }
    }

    pub fn line(&self) -> usize {
        self.command().line
    }
}

/// Short description used when an error is attributed to a statement.
impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call(call) => write!(f, "call to `{}`", call.command.name),
            Self::Decl(decl) => {
                write!(f, "declaration of `{}`", decl.command.name)
            }
        }
    }
}

fn join(aliases: &[Alias]) -> String {
    aliases
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn dump_into(out: &mut String, stmts: &[Stmt], depth: usize) {
    let indent = "  ".repeat(depth);
    for stmt in stmts {
        let (tag, aliases) = match stmt {
            Stmt::Call(call) => ("Call", &call.args),
            Stmt::Decl(decl) => ("Decl", &decl.params),
        };
        let cmd = stmt.command();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{indent}{:>3}: {tag} {} [{}]",
            cmd.line,
            cmd.name,
            join(aliases)
        );
        if let Stmt::Decl(decl) = stmt {
            dump_into(out, &decl.body, depth + 1);
        }
    }
}

/// Render the tree as an indented listing, one statement per line:
///
/// ```text
///   1: Decl double [@x]
///     2: Call add [@x, @x]
///     3: Call return []
///   5: Call double [#5]
/// ```
pub fn dump(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    dump_into(&mut out, stmts, 0);
    out
}

use core::fmt;

/// Number of registers in the machine's register file.
pub const MAX_REGISTERS: usize = 8;

/// Register a callee leaves its result in.
pub const RETURN_REGISTER: Reg = Reg(0);

/// A register index, always below [`MAX_REGISTERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(u8);

impl Reg {
    /// Returns `None` when `index` is outside the register file.
    pub const fn new(index: usize) -> Option<Self> {
        if index < MAX_REGISTERS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Every register, lowest index first.
    pub fn all() -> impl DoubleEndedIterator<Item = Reg> {
        (0..MAX_REGISTERS as u8).map(Reg)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The kind of a pseudo-value. Parameter templates are sequences of kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Register,
    Number,
    Command,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Register => "register",
            Self::Number => "number",
            Self::Command => "command",
        })
    }
}

/// Call target of a compiled declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Index of the first instruction of the body.
    pub entry: usize,
    /// Expected argument kinds, one per parameter.
    pub params: Vec<Kind>,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command@{}(", self.entry)?;
        for (i, kind) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        f.write_str(")")
    }
}

/// A compile-time value an alias resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Register(Reg),
    Number(i64),
    Command(Command),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Register(_) => Kind::Register,
            Self::Number(_) => Kind::Number,
            Self::Command(_) => Kind::Command,
        }
    }
}

impl From<Reg> for Value {
    fn from(reg: Reg) -> Self {
        Self::Register(reg)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(reg) => write!(f, "{reg}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Command(cmd) => write!(f, "{cmd}"),
        }
    }
}

use std::fmt;

use pseudo::Kind;

/// How many operands something accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Exactly(usize),
    OneOf(&'static [usize]),
}

impl Count {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Self::Exactly(expected) => *expected == n,
            Self::OneOf(options) => options.contains(&n),
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::OneOf(options) => {
                for (i, n) in options.iter().enumerate() {
                    match i {
                        0 => write!(f, "{n}")?,
                        _ if i + 1 == options.len() => write!(f, " or {n}")?,
                        _ => write!(f, ", {n}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Broad class of a [`CompileError`], ignoring statement context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Undefined,
    Unsupported,
    TypeMismatch,
    CountMismatch,
}

/// A lowering failure. The first one aborts the whole compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// An alias or command that no reachable scope (nor the builtin table)
    /// defines.
    #[error("`{name}` is undefined (line {line})")]
    Undefined { name: String, line: usize },

    #[error("unsupported: {what}")]
    Unsupported { what: String },

    #[error("type mismatch: expected {expected}, found {found} `{subject}`")]
    TypeMismatch {
        expected: Kind,
        found: Kind,
        subject: String,
    },

    #[error("expected {expected} arguments, found {found}")]
    CountMismatch { expected: Count, found: usize },

    /// Context added by each enclosing statement as the error returns.
    #[error("in {stmt} (line {line}): {inner}")]
    In {
        stmt: String,
        line: usize,
        inner: Box<CompileError>,
    },
}

impl CompileError {
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported { what: what.into() }
    }

    /// The innermost error, with all statement context stripped.
    pub fn root(&self) -> &CompileError {
        let mut err = self;
        while let Self::In { inner, .. } = err {
            err = inner;
        }
        err
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Self::Undefined { .. } => ErrorKind::Undefined,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::CountMismatch { .. } => ErrorKind::CountMismatch,
            Self::In { .. } => unreachable!("root() strips context"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_display() {
        assert_eq!(Count::Exactly(2).to_string(), "2");
        assert_eq!(Count::OneOf(&[0, 2]).to_string(), "0 or 2");
        assert_eq!(Count::OneOf(&[0, 1, 2]).to_string(), "0, 1 or 2");
        assert!(Count::OneOf(&[0, 2]).accepts(0));
        assert!(!Count::OneOf(&[0, 2]).accepts(1));
    }

    #[test]
    fn root_and_kind_see_through_context() {
        let err = CompileError::In {
            stmt: "declaration of `f`".into(),
            line: 1,
            inner: Box::new(CompileError::In {
                stmt: "call to `foo`".into(),
                line: 2,
                inner: Box::new(CompileError::Undefined {
                    name: "foo".into(),
                    line: 2,
                }),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::Undefined);
        assert_eq!(
            err.root(),
            &CompileError::Undefined {
                name: "foo".into(),
                line: 2
            }
        );
        assert_eq!(
            err.to_string(),
            "in declaration of `f` (line 1): in call to `foo` (line 2): `foo` is undefined (line 2)"
        );
        // The message already carries every level; no cause chain on top.
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn mismatch_messages() {
        let err = CompileError::TypeMismatch {
            expected: Kind::Register,
            found: Kind::Number,
            subject: "#5".into(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch: expected register, found number `#5`"
        );
        let err = CompileError::CountMismatch {
            expected: Count::OneOf(&[0, 2]),
            found: 1,
        };
        assert_eq!(err.to_string(), "expected 0 or 2 arguments, found 1");
    }
}

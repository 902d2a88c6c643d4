/// Token types produced by the imp lexer.
use crate::span::Span;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A command name, e.g. `double`, `add`, `zero?`.
    Command(String),
    /// A register alias without its `@` prefix, e.g. `x` for `@x`.
    Register(String),
    /// A number alias without its `#` prefix, e.g. `5` for `#5`, `n` for `#n`.
    Number(String),

    /// `:` — separates a declaration's name from its parameters.
    Colon,
    /// `,`
    Comma,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// End of line; terminates a call.
    Newline,

    /// A line comment: `; ...` (text does NOT include the leading `;`).
    Comment(String),

    /// End of input.
    Eof,
    /// An unrecognized character or malformed token.
    Error(String),
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Command(_) => "command name",
            Self::Register(_) => "register alias",
            Self::Number(_) => "number alias",
            Self::Colon => "`:`",
            Self::Comma => "`,`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::Newline => "end of line",
            Self::Comment(_) => "comment",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }
}

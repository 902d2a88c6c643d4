//! # Parser
//!
//! A streaming lexer and parser for the imp register-machine language.
//!
//! ## Architecture
//!
//! ```text
//!  impl Read (file, &[u8], …)
//!      │
//!      ▼
//!  ┌────────┐    Token stream     ┌────────┐    Stmt stream
//!  │ Lexer  │ ──────────────────▶ │ Parser │ ──────────────────▶
//!  └────────┘  (impl Iterator)    └────────┘  (impl Iterator)
//! ```
//!
//! ```rust
//! use parser::{Alias, Stmt};
//!
//! let stmts = parser::parse("double: @x {\n add @x, @x\n return\n}\n").unwrap();
//! let Stmt::Decl(decl) = &stmts[0] else { unreachable!() };
//! assert_eq!(decl.params, vec![Alias::register("x", 1)]);
//! assert_eq!(decl.body.len(), 2);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{Alias, Call, Decl, Ident, Stmt};
pub use lexer::Lexer;
pub use parser::{ParseError, Parser, parse};
pub use span::{Pos, Span};
pub use token::{Token, TokenKind};

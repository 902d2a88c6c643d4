/// Streaming lexer for imp source text.
///
/// The [`Lexer`] consumes bytes from any [`std::io::Read`] source and
/// implements [`Iterator`] over [`Token`]s, tracking byte offset, line,
/// and column for every token it produces.
///
/// # Token syntax
///
/// | Syntax        | Token               | Notes                              |
/// |---------------|---------------------|------------------------------------|
/// | `name`        | [`TokenKind::Command`]  | `[A-Za-z0-9_?]`, at most 16 bytes |
/// | `@name`       | [`TokenKind::Register`] | `[A-Za-z0-9_-]`, at most 8 bytes  |
/// | `#name`       | [`TokenKind::Number`]   | `[A-Za-z0-9_-]`, at most 21 bytes |
/// | `: , { }`     | punctuation         |                                    |
/// | newline       | [`TokenKind::Newline`]  | terminates a call                  |
/// | `; …`         | [`TokenKind::Comment`]  | runs to end of line                |
///
/// Blanks (space, tab, carriage return) separate tokens and are skipped.
use std::io::Read;

use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

/// Longest accepted command name.
pub const MAX_COMMAND_LENGTH: usize = 16;
/// Longest accepted register alias name (without `@`).
pub const MAX_REGISTER_LENGTH: usize = 8;
/// Longest accepted number alias name (without `#`); fits every `i64`
/// including its sign.
pub const MAX_NUMBER_LENGTH: usize = 21;

fn is_command_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'?'
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

// ═══════════════════════════════════════════════════════════════════
// Read buffer — one-byte lookahead over Read
// ═══════════════════════════════════════════════════════════════════

struct ReadBuf<R: Read> {
    reader: R,
    /// The next unconsumed byte, if any.
    next: Option<u8>,
    /// A read failure, reported once in place of end of input.
    error: Option<std::io::Error>,
    offset: usize,
    line: usize,
    column: usize,
}

impl<R: Read> ReadBuf<R> {
    fn new(reader: R) -> Self {
        let mut rb = Self {
            reader,
            next: None,
            error: None,
            offset: 0,
            line: 1,
            column: 1,
        };
        rb.fill();
        rb
    }

    /// Pull the next byte from the reader. A read error ends the stream
    /// and is kept for the lexer to report.
    fn fill(&mut self) {
        let mut one = [0u8; 1];
        self.next = loop {
            match self.reader.read(&mut one) {
                Ok(0) => break None,
                Ok(_) => break Some(one[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.error = Some(e);
                    break None;
                }
            }
        };
    }

    fn pos(&self) -> Pos {
        Pos::new(self.offset, self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.next
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.next?;
        self.fill();
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Lexer
// ═══════════════════════════════════════════════════════════════════

/// A streaming lexer for imp source code.
///
/// ```rust
/// use parser::{Lexer, TokenKind};
///
/// let kinds: Vec<TokenKind> =
///     Lexer::from_str("add @x, #1\n").map(|t| t.kind).collect();
/// assert_eq!(kinds[0], TokenKind::Command("add".into()));
/// assert_eq!(kinds[1], TokenKind::Register("x".into()));
/// ```
pub struct Lexer<R: Read> {
    rb: ReadBuf<R>,
    emitted_eof: bool,
}

impl<R: Read> Lexer<R> {
    /// Create a new lexer over the given readable stream.
    pub fn new(reader: R) -> Self {
        Self {
            rb: ReadBuf::new(reader),
            emitted_eof: false,
        }
    }
}

impl<'a> Lexer<&'a [u8]> {
    /// Create a new lexer from a source string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &'a str) -> Self {
        Self::new(source.as_bytes())
    }
}

impl<R: Read> Lexer<R> {
    fn pos(&self) -> Pos {
        self.rb.pos()
    }

    fn peek(&self) -> Option<u8> {
        self.rb.peek()
    }

    fn advance(&mut self) -> Option<u8> {
        self.rb.advance()
    }

    fn skip_blanks(&mut self) {
        while let Some(b' ' | b'\t' | b'\r') = self.peek() {
            self.advance();
        }
    }

    /// Consume bytes while `pred` holds.
    fn take_while(&mut self, pred: fn(u8) -> bool) -> String {
        let mut text = String::new();
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            text.push(b as char);
            self.advance();
        }
        text
    }

    fn punct(&mut self, kind: TokenKind, start: Pos) -> Token {
        self.advance();
        Token::new(kind, Span::new(start, self.pos()))
    }

    /// `; ...` to end of line. The newline itself is left for the caller.
    fn lex_comment(&mut self) -> Token {
        let start = self.pos();
        self.advance();
        let mut bytes = Vec::new();
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            bytes.push(b);
            self.advance();
        }
        let text = String::from_utf8_lossy(&bytes).trim().to_string();
        Token::new(TokenKind::Comment(text), Span::new(start, self.pos()))
    }

    fn lex_command(&mut self) -> Token {
        let start = self.pos();
        let name = self.take_while(is_command_char);
        let span = Span::new(start, self.pos());
        if name.len() > MAX_COMMAND_LENGTH {
            return Token::new(
                TokenKind::Error(format!(
                    "command name `{name}` is longer than {MAX_COMMAND_LENGTH} characters"
                )),
                span,
            );
        }
        Token::new(TokenKind::Command(name), span)
    }

    /// `@name` or `#name`.
    fn lex_prefixed(&mut self) -> Token {
        let start = self.pos();
        let prefix = self.advance();
        let name = self.take_while(is_name_char);
        let span = Span::new(start, self.pos());

        let (what, max, kind): (&str, usize, fn(String) -> TokenKind) =
            match prefix {
                Some(b'@') => {
                    ("register", MAX_REGISTER_LENGTH, TokenKind::Register)
                }
                _ => ("number", MAX_NUMBER_LENGTH, TokenKind::Number),
            };

        if name.is_empty() {
            let msg = format!("expected {what} name after `{}`", prefix.unwrap_or(b'#') as char);
            return Token::new(TokenKind::Error(msg), span);
        }
        if name.len() > max {
            return Token::new(
                TokenKind::Error(format!(
                    "{what} name `{name}` is longer than {max} characters"
                )),
                span,
            );
        }
        Token::new(kind(name), span)
    }

    /// Produce the next token. After end of input this keeps returning
    /// [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Token {
        self.skip_blanks();
        let start = self.pos();

        let Some(b) = self.peek() else {
            if let Some(err) = self.rb.error.take() {
                let msg = format!("read error: {err}");
                return Token::new(TokenKind::Error(msg), Span::point(start));
            }
            return Token::new(TokenKind::Eof, Span::point(start));
        };

        match b {
            b'\n' => self.punct(TokenKind::Newline, start),
            b':' => self.punct(TokenKind::Colon, start),
            b',' => self.punct(TokenKind::Comma, start),
            b'{' => self.punct(TokenKind::LBrace, start),
            b'}' => self.punct(TokenKind::RBrace, start),
            b';' => self.lex_comment(),
            b'@' | b'#' => self.lex_prefixed(),
            c if is_command_char(c) => self.lex_command(),
            other => {
                self.advance();
                let msg = if other.is_ascii_graphic() {
                    format!("unrecognized character `{}`", other as char)
                } else {
                    format!("unrecognized byte 0x{other:02x}")
                };
                Token::new(TokenKind::Error(msg), Span::new(start, self.pos()))
            }
        }
    }
}

impl<R: Read> Iterator for Lexer<R> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let tok = self.next_token();
        if tok.is_eof() {
            self.emitted_eof = true;
        }
        Some(tok)
    }
}

use crate::ast::{Alias, Call, Decl, Ident, Stmt};
use crate::lexer::Lexer;
use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line()
    }
}

/// Parse a whole source text. The first error aborts parsing.
pub fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
    Parser::new(Lexer::from_str(source)).collect()
}

/// Recursive-descent parser over a token stream, yielding top-level
/// statements one at a time.
pub struct Parser<I: Iterator<Item = Token>> {
    tokens: std::iter::Peekable<I>,
    last_span: Span,
    done: bool,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            tokens: tokens.peekable(),
            last_span: Span::point(Pos::origin()),
            done: false,
        }
    }

    fn skip_comments(&mut self) {
        while let Some(tok) = self.tokens.next_if(Token::is_comment) {
            self.last_span = tok.span;
        }
    }

    fn peek_kind(&mut self) -> &TokenKind {
        self.skip_comments();
        match self.tokens.peek() {
            Some(tok) => &tok.kind,
            None => &TokenKind::Eof,
        }
    }

    fn advance(&mut self) -> Token {
        self.skip_comments();
        match self.tokens.next() {
            Some(tok) => {
                self.last_span = tok.span;
                tok
            }
            None => Token::new(TokenKind::Eof, self.last_span),
        }
    }

    fn check(&mut self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn unexpected(tok: Token, expected: &str) -> ParseError {
        match tok.kind {
            TokenKind::Error(message) => ParseError::new(message, tok.span),
            other => ParseError::new(
                format!("expected {expected}, found {}", other.name()),
                tok.span,
            ),
        }
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<Token, ParseError> {
        let tok = self.advance();
        if std::mem::discriminant(&tok.kind) == std::mem::discriminant(expected)
        {
            Ok(tok)
        } else {
            Err(Self::unexpected(tok, expected.name()))
        }
    }

    /// `stmt := call | decl`
    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.advance();
        let command = match tok.kind {
            TokenKind::Command(name) => Ident::new(name, tok.span.line()),
            other => {
                return Err(Self::unexpected(
                    Token::new(other, tok.span),
                    "command name",
                ));
            }
        };

        if self.check(&TokenKind::Colon) {
            self.advance();
            return self.parse_decl(command);
        }

        let args = self.parse_aliases()?;
        // A call ends at a newline; `}` and end of input also close it
        // without being consumed.
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
            }
            TokenKind::RBrace | TokenKind::Eof => {}
            _ => return Err(Self::unexpected(self.advance(), "end of line")),
        }
        Ok(Stmt::Call(Call { command, args }))
    }

    /// `decl := CMD ':' [aliases] '{' { stmt | NEWLINE } '}'`, after the `:`.
    fn parse_decl(&mut self, command: Ident) -> Result<Stmt, ParseError> {
        let params = if self.check(&TokenKind::LBrace) {
            Vec::new()
        } else {
            self.parse_aliases()?
        };
        let open = self.expect(&TokenKind::LBrace)?;

        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        format!("unclosed `{{` of `{}`", command.name),
                        open.span,
                    ));
                }
                _ => body.push(self.parse_statement()?),
            }
        }
        Ok(Stmt::Decl(Decl {
            command,
            params,
            body,
        }))
    }

    /// `[ alias { ',' alias } ]`
    fn parse_aliases(&mut self) -> Result<Vec<Alias>, ParseError> {
        let mut aliases = Vec::new();
        if matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof
        ) {
            return Ok(aliases);
        }
        aliases.push(self.parse_alias()?);
        while self.check(&TokenKind::Comma) {
            self.advance();
            aliases.push(self.parse_alias()?);
        }
        Ok(aliases)
    }

    fn parse_alias(&mut self) -> Result<Alias, ParseError> {
        let tok = self.advance();
        let line = tok.span.line();
        match tok.kind {
            TokenKind::Register(name) => Ok(Alias::register(name, line)),
            TokenKind::Number(name) => Ok(Alias::number(name, line)),
            TokenKind::Command(name) => Ok(Alias::command(name, line)),
            other => Err(Self::unexpected(Token::new(other, tok.span), "alias")),
        }
    }
}

impl<I: Iterator<Item = Token>> Iterator for Parser<I> {
    type Item = Result<Stmt, ParseError>;

    fn next(&mut self) -> Option<Result<Stmt, ParseError>> {
        if self.done {
            return None;
        }
        self.skip_newlines();
        if self.check(&TokenKind::Eof) {
            self.done = true;
            return None;
        }
        let result = self.parse_statement();
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty() {
        assert_eq!(parse(""), Ok(vec![]));
        assert_eq!(parse("\n\n ; only a comment\n"), Ok(vec![]));
    }

    #[test]
    fn parse_call_without_args() {
        assert_eq!(parse("return\n"), Ok(vec![Stmt::call("return", 1, vec![])]));
        assert_eq!(parse("return"), Ok(vec![Stmt::call("return", 1, vec![])]));
    }

    #[test]
    fn parse_call_with_args() {
        assert_eq!(
            parse("\nmove #-3, @acc ; load\n"),
            Ok(vec![Stmt::call("move", 2, vec![
                Alias::number("-3", 2),
                Alias::register("acc", 2),
            ])])
        );
    }

    #[test]
    fn parse_declaration() {
        let src = "double: @x {\n  add @x, @x\n  return\n}\ndouble #5\n";
        assert_eq!(
            parse(src),
            Ok(vec![
                Stmt::decl("double", 1, vec![Alias::register("x", 1)], vec![
                    Stmt::call("add", 2, vec![
                        Alias::register("x", 2),
                        Alias::register("x", 2),
                    ]),
                    Stmt::call("return", 3, vec![]),
                ]),
                Stmt::call("double", 5, vec![Alias::number("5", 5)]),
            ])
        );
    }

    #[test]
    fn parse_declaration_without_params_on_one_line() {
        assert_eq!(
            parse("f: { return }"),
            Ok(vec![Stmt::decl("f", 1, vec![], vec![Stmt::call(
                "return",
                1,
                vec![]
            )])])
        );
    }

    #[test]
    fn parse_nested_declarations() {
        let stmts = parse("outer: {\n inner: #n {\n }\n inner #1\n}\n").unwrap();
        let Stmt::Decl(outer) = &stmts[0] else {
            panic!("expected declaration");
        };
        assert_eq!(outer.body.len(), 2);
        assert!(matches!(&outer.body[0], Stmt::Decl(d) if d.params == vec![Alias::number("n", 2)]));
        assert_eq!(outer.body[1].line(), 4);
    }

    #[test]
    fn command_alias_argument() {
        assert_eq!(
            parse("f g"),
            Ok(vec![Stmt::call("f", 1, vec![Alias::command("g", 1)])])
        );
    }

    #[test]
    fn error_unclosed_brace() {
        let err = parse("f: {\n return\n").unwrap_err();
        assert!(err.message.contains("unclosed"), "{err}");
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn error_missing_comma() {
        let err = parse("add @a @b\n").unwrap_err();
        assert_eq!(err.message, "expected end of line, found register alias");
        assert_eq!(err.span.start.column, 8);
    }

    #[test]
    fn error_statement_starts_with_alias() {
        let err = parse("\n@x\n").unwrap_err();
        assert_eq!(err.message, "expected command name, found register alias");
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn error_trailing_comma() {
        let err = parse("add @a,\n").unwrap_err();
        assert_eq!(err.message, "expected alias, found end of line");
    }

    #[test]
    fn lexer_errors_surface() {
        let err = parse("add @a, $\n").unwrap_err();
        assert_eq!(err.message, "unrecognized character `$`");
    }

    #[test]
    fn parser_stops_after_first_error() {
        let results: Vec<_> = Parser::new(Lexer::from_str("@a\nb\n")).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn display_error() {
        let err = parse("}").unwrap_err();
        assert_eq!(err.to_string(), "expected command name, found `}` at 1:1");
    }
}

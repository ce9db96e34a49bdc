use calchart_ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Equals,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Turns continuity source text into a token stream. Whitespace and
/// newlines carry no grammatical meaning (a procedure's extent is decided
/// by its keyword's arity, not by line breaks) but line/column are still
/// tracked so every token can carry an accurate [`Span`].
pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Returns the next token. Always succeeds: an unrecognised byte is
    /// reported as `TokenKind::Ident` containing just that byte, which the
    /// parser will reject at the point it expected something meaningful —
    /// keeping lexing itself infallible simplifies the one call site.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start_line = self.line;
        let start_column = self.column;

        let Some(b) = self.peek_byte() else {
            return Token {
                kind: TokenKind::Eof,
                span: Span::new(start_line, start_column, 0),
            };
        };

        let single = |kind: TokenKind, len: u32| Token {
            kind,
            span: Span::new(start_line, start_column, len),
        };

        match b {
            b'(' => {
                self.bump();
                single(TokenKind::LParen, 1)
            }
            b')' => {
                self.bump();
                single(TokenKind::RParen, 1)
            }
            b'+' => {
                self.bump();
                single(TokenKind::Plus, 1)
            }
            b'-' => {
                self.bump();
                single(TokenKind::Minus, 1)
            }
            b'*' => {
                self.bump();
                single(TokenKind::Star, 1)
            }
            b'/' => {
                self.bump();
                single(TokenKind::Slash, 1)
            }
            b'=' => {
                self.bump();
                single(TokenKind::Equals, 1)
            }
            b'0'..=b'9' | b'.' => self.lex_number(start_line, start_column),
            b if b.is_ascii_alphabetic() => self.lex_ident(start_line, start_column),
            other => {
                self.bump();
                Token {
                    kind: TokenKind::Ident((other as char).to_string()),
                    span: Span::new(start_line, start_column, 1),
                }
            }
        }
    }

    fn lex_number(&mut self, start_line: u32, start_column: u32) -> Token {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
            self.bump();
        }
        if self.peek_byte() == Some(b'.') {
            self.bump();
            while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
                self.bump();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("0");
        let value = text.parse::<f64>().unwrap_or(0.0);
        Token {
            kind: TokenKind::Number(value),
            span: Span::new(start_line, start_column, (self.pos - start) as u32),
        }
    }

    fn lex_ident(&mut self, start_line: u32, start_column: u32) -> Token {
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap_or("")
            .to_ascii_uppercase();
        Token {
            kind: TokenKind::Ident(text),
            span: Span::new(start_line, start_column, (self.pos - start) as u32),
        }
    }
}

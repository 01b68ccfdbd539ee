//! Hand-written lexer for the query language.
//!
//! Produces positioned tokens with decoded literal values. Any malformed
//! token is a hard error: `lex` stops at the first one and returns no
//! partial token stream. Normal end of input appends an `Eof` token.
//!
//! Barewords are only legal as field names (followed by `:`) or as the
//! keywords `AND`, `OR`, `NOT` and `TO`. Keywords are case-sensitive.

mod cursor;
mod token;


pub use token::{Token, TokenKind, TokenValue};

use cursor::Cursor;

use crate::span::{Position, Span};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{span}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unexpected bareword `{0}`")]
    UnexpectedBareword(String),
    #[error("unterminated phrase")]
    UnterminatedPhrase,
    #[error("unterminated quoted field")]
    UnterminatedField,
    #[error("unterminated regex")]
    UnterminatedRegex,
    #[error("newline in phrase")]
    NewlineInPhrase,
    #[error("newline in quoted field")]
    NewlineInField,
    #[error("newline in regex")]
    NewlineInRegex,
    #[error("invalid escape `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
    #[error("invalid regex flag `{0}`")]
    InvalidRegexFlag(char),
    #[error("malformed number `{0}`")]
    MalformedNumber(String),
    #[error("double unread")]
    DoubleUnread,
}

const REGEX_FLAGS: &[char] = &['i', 'm', 's', 'U'];

/// Tokenizes `source`, ending with an `Eof` token.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tracing::debug!(tokens = tokens.len(), "lexed query");
    Ok(tokens)
}

pub struct Lexer<'s> {
    cursor: Cursor<'s>,
    /// Start of the token being scanned.
    start: Position,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            cursor: Cursor::new(source),
            start: Position::START,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace()?;
        self.start = self.cursor.pos();

        let Some(c) = self.cursor.read() else {
            return Ok(self.token(TokenKind::Eof, TokenValue::None));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ':' => TokenKind::Colon,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '*' => TokenKind::Star,
            '!' => TokenKind::Bang,
            '<' => self.with_equals(TokenKind::Lt, TokenKind::Lte)?,
            '>' => self.with_equals(TokenKind::Gt, TokenKind::Gte)?,
            '&' => self.doubled('&', TokenKind::And)?,
            '|' => self.doubled('|', TokenKind::Or)?,
            '"' => return self.phrase(),
            '\'' => return self.quoted_field(),
            '/' => return self.regex(),
            '+' | '-' => {
                if self.peek()?.is_some_and(|n| n.is_ascii_digit()) {
                    return self.word();
                }
                if c == '+' {
                    TokenKind::Plus
                } else {
                    TokenKind::Minus
                }
            }
            c if is_word_start(c) => return self.word(),
            c => return Err(self.error(LexErrorKind::UnexpectedChar(c))),
        };

        Ok(self.token(kind, TokenValue::None))
    }

    fn peek(&mut self) -> Result<Option<char>, LexError> {
        self.cursor.peek().map_err(|kind| self.error(kind))
    }

    fn eat(&mut self, c: char) -> Result<bool, LexError> {
        self.cursor.eat(c).map_err(|kind| self.error(kind))
    }

    fn skip_whitespace(&mut self) -> Result<(), LexError> {
        while self.peek()?.is_some_and(char::is_whitespace) {
            self.cursor.read();
        }
        Ok(())
    }

    fn with_equals(&mut self, bare: TokenKind, with_eq: TokenKind) -> Result<TokenKind, LexError> {
        Ok(if self.eat('=')? { with_eq } else { bare })
    }

    /// `&&` and `||`; a single `&` or `|` is not a token.
    fn doubled(&mut self, c: char, kind: TokenKind) -> Result<TokenKind, LexError> {
        if self.eat(c)? {
            return Ok(kind);
        }
        Err(self.error(LexErrorKind::UnexpectedChar(c)))
    }

    /// Bareword or number. A leading sign has already been consumed.
    fn word(&mut self) -> Result<Token, LexError> {
        while self.peek()?.is_some_and(is_word_char) {
            self.cursor.read();
        }
        let text = self.cursor.slice(self.start);

        if self.peek()? == Some(':') {
            return Ok(self.token(TokenKind::Field, TokenValue::Str(text.to_string())));
        }

        let unsigned = text.trim_start_matches(['+', '-']);
        if unsigned.starts_with(|c: char| c.is_ascii_digit()) {
            return match parse_number(text) {
                Some(n) => Ok(self.token(TokenKind::Number, TokenValue::Number(n))),
                None => Err(self.error(LexErrorKind::MalformedNumber(text.to_string()))),
            };
        }

        let kind = match text {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "TO" => TokenKind::To,
            _ => {
                return Err(self.error(LexErrorKind::UnexpectedBareword(text.to_string())));
            }
        };
        Ok(self.token(kind, TokenValue::None))
    }

    fn phrase(&mut self) -> Result<Token, LexError> {
        let text = self.quoted(
            '"',
            LexErrorKind::UnterminatedPhrase,
            LexErrorKind::NewlineInPhrase,
        )?;
        Ok(self.token(TokenKind::Phrase, TokenValue::Str(text)))
    }

    fn quoted_field(&mut self) -> Result<Token, LexError> {
        let name = self.quoted(
            '\'',
            LexErrorKind::UnterminatedField,
            LexErrorKind::NewlineInField,
        )?;
        Ok(self.token(TokenKind::Field, TokenValue::Str(name)))
    }

    /// Body of a quoted token up to the closing `quote`, escapes decoded.
    fn quoted(
        &mut self,
        quote: char,
        unterminated: LexErrorKind,
        newline: LexErrorKind,
    ) -> Result<String, LexError> {
        let mut out = String::new();
        loop {
            match self.cursor.read() {
                None => return Err(self.error(unterminated)),
                Some('\n') => return Err(self.error(newline)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape(quote, &unterminated)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, quote: char, unterminated: &LexErrorKind) -> Result<char, LexError> {
        let c = match self.cursor.read() {
            Some(c) if c == quote => c,
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => self.unicode_escape()?,
            Some(other) => return Err(self.error(LexErrorKind::InvalidEscape(other))),
            None => return Err(self.error(unterminated.clone())),
        };
        Ok(c)
    }

    /// Four hex digits after `\u`.
    fn unicode_escape(&mut self) -> Result<char, LexError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .cursor
                .read()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(LexErrorKind::InvalidUnicodeEscape))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(LexErrorKind::InvalidUnicodeEscape))
    }

    /// `/pattern/flags`. Escapes are kept verbatim; flags fold into an
    /// inline group so `/a/i` becomes `(?i)a`.
    fn regex(&mut self) -> Result<Token, LexError> {
        let mut body = String::new();
        loop {
            match self.cursor.read() {
                None => return Err(self.error(LexErrorKind::UnterminatedRegex)),
                Some('\n') => return Err(self.error(LexErrorKind::NewlineInRegex)),
                Some('/') => break,
                Some('\\') => {
                    body.push('\\');
                    match self.cursor.read() {
                        None => return Err(self.error(LexErrorKind::UnterminatedRegex)),
                        Some('\n') => return Err(self.error(LexErrorKind::NewlineInRegex)),
                        Some(c) => body.push(c),
                    }
                }
                Some(c) => body.push(c),
            }
        }

        let mut flags = String::new();
        while let Some(c) = self.peek()?.filter(|c| c.is_alphabetic()) {
            self.cursor.read();
            if !REGEX_FLAGS.contains(&c) {
                return Err(self.error(LexErrorKind::InvalidRegexFlag(c)));
            }
            if !flags.contains(c) {
                flags.push(c);
            }
        }

        let pattern = if flags.is_empty() {
            body
        } else {
            format!("(?{flags}){body}")
        };
        Ok(Token::new(
            TokenKind::Regex,
            pattern.clone(),
            TokenValue::Str(pattern),
            self.span(),
        ))
    }

    fn span(&self) -> Span {
        Span::new(self.start, self.cursor.pos())
    }

    fn token(&self, kind: TokenKind, value: TokenValue) -> Token {
        Token::new(kind, self.cursor.slice(self.start), value, self.span())
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            span: self.span(),
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_')
}

/// `[+-]? digits ('_' digits)* ('.' digits ('_' digits)*)? ([eE] [+-]? digits)?`
fn parse_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    i = digit_groups(bytes, i)?;
    if bytes.get(i) == Some(&b'.') {
        i = digit_groups(bytes, i + 1)?;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        i += digits;
    }
    if i != bytes.len() {
        return None;
    }

    text.replace('_', "").parse().ok()
}

/// Digit groups separated by single underscores. Returns the index past them.
fn digit_groups(bytes: &[u8], mut i: usize) -> Option<usize> {
    loop {
        let digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        i += digits;
        if bytes.get(i) != Some(&b'_') {
            return Some(i);
        }
        i += 1;
    }
}

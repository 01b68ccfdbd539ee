//! Positioned tokens produced by the lexer.

use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Field name: a bareword followed by `:`, or `'quoted'`.
    Field,
    /// `"quoted phrase"`.
    Phrase,
    Number,
    /// `/pattern/flags`.
    Regex,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Caret,
    Tilde,
    Star,
    Plus,
    Minus,
    Bang,
    Lt,
    Lte,
    Gt,
    Gte,
    /// `AND` or `&&`.
    And,
    /// `OR` or `||`.
    Or,
    Not,
    To,
    Eof,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Field => "Field",
            Self::Phrase => "Phrase",
            Self::Number => "Number",
            Self::Regex => "Regex",
            Self::LParen => "LParen",
            Self::RParen => "RParen",
            Self::LBracket => "LBracket",
            Self::RBracket => "RBracket",
            Self::LBrace => "LBrace",
            Self::RBrace => "RBrace",
            Self::Colon => "Colon",
            Self::Caret => "Caret",
            Self::Tilde => "Tilde",
            Self::Star => "Star",
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Bang => "Bang",
            Self::Lt => "Lt",
            Self::Lte => "Lte",
            Self::Gt => "Gt",
            Self::Gte => "Gte",
            Self::And => "And",
            Self::Or => "Or",
            Self::Not => "Not",
            Self::To => "To",
            Self::Eof => "EOF",
        }
    }

    /// Human-facing description for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Field => "field name",
            Self::Phrase => "phrase",
            Self::Number => "number",
            Self::Regex => "regex",
            Self::LParen => "`(`",
            Self::RParen => "`)`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::Colon => "`:`",
            Self::Caret => "`^`",
            Self::Tilde => "`~`",
            Self::Star => "`*`",
            Self::Plus => "`+`",
            Self::Minus => "`-`",
            Self::Bang => "`!`",
            Self::Lt => "`<`",
            Self::Lte => "`<=`",
            Self::Gt => "`>`",
            Self::Gte => "`>=`",
            Self::And => "`AND`",
            Self::Or => "`OR`",
            Self::Not => "`NOT`",
            Self::To => "`TO`",
            Self::Eof => "end of input",
        }
    }

    /// Tokens that begin a primary expression. Seeing one right after a
    /// complete primary inserts an implicit AND.
    pub fn starts_primary(self) -> bool {
        matches!(
            self,
            Self::Field
                | Self::Phrase
                | Self::Number
                | Self::Regex
                | Self::Star
                | Self::LParen
                | Self::LBracket
                | Self::LBrace
                | Self::Lt
                | Self::Lte
                | Self::Gt
                | Self::Gte
                | Self::Not
                | Self::Bang
                | Self::Plus
                | Self::Minus
        )
    }

    /// Literal atoms accepted as comparator operands and range bounds.
    pub fn is_literal(self) -> bool {
        matches!(self, Self::Phrase | Self::Number | Self::Star)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded literal carried by a token.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    Str(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. For regexes this is the pattern with
    /// flags folded in as an inline group, e.g. `(?i)testing`.
    pub text: String,
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, value: TokenValue, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            value,
            span,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// `Number(42)`, `Phrase("whee")`, `Colon`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::None => write!(f, "{}", self.kind),
            TokenValue::Str(s) => write!(f, "{}({s:?})", self.kind),
            TokenValue::Number(n) => write!(f, "{}({n})", self.kind),
        }
    }
}

//! Operator-precedence parser.
//!
//! An explicit two-state machine over an operator stack and a node stack.
//! In `ExpectingPrimary` the parser takes prefix operators and operands; in
//! `AfterPrimary` it takes binary and postfix operators. Seeing the start of
//! another primary while in `AfterPrimary` inserts an implicit AND.
//!
//! Binding precedence, higher binds tighter:
//!
//! | Operator                      | Precedence |
//! | ----------------------------- | ---------- |
//! | `OR`, `||`                    | 10         |
//! | `AND`, `&&`, implicit AND     | 20         |
//! | `NOT`, `!`, `+`, `-`          | 30         |
//! | `field:`                      | 85         |
//!
//! The parser never aborts: malformed input is reported as a diagnostic and
//! replaced by a placeholder leaf so the rest of the query is still checked.

pub mod ast;

#[cfg(test)]
mod tests;

pub use ast::{ANY_FIELD, Ast, AstKind, Literal, Modifier, Predicate, PredicateKind};

use lucid_bytecode::CompareOp;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::lexer::{Token, TokenKind};
use crate::span::{Position, Span};

const PREC_OR: u8 = 10;
const PREC_AND: u8 = 20;
const PREC_FIELD: u8 = 85;

/// Fuzziness of a bare `~`.
pub const DEFAULT_FUZZ: f64 = 2.0;

#[derive(Debug)]
pub struct ParseResult {
    pub root: Ast,
    pub diagnostics: Diagnostics,
}

/// Parse a token stream produced by [`lex`](crate::lexer::lex).
pub fn parse(tokens: &[Token]) -> ParseResult {
    let result = Parser::new(tokens).parse();
    tracing::debug!(
        nodes = result.root.node_count(),
        diagnostics = result.diagnostics.len(),
        "parsed query"
    );
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectingPrimary,
    AfterPrimary,
}

#[derive(Debug, Clone, PartialEq)]
enum OpKind {
    Or,
    And,
    ImplicitAnd,
    Not,
    Require,
    Prohibit,
    Field(String),
    /// `(` barrier; never reduced by precedence.
    Group,
}

impl OpKind {
    fn precedence(&self) -> u8 {
        match self {
            Self::Or => PREC_OR,
            Self::And | Self::ImplicitAnd => PREC_AND,
            Self::Not | Self::Require | Self::Prohibit => 30,
            Self::Field(_) => PREC_FIELD,
            Self::Group => 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Op {
    kind: OpKind,
    span: Span,
}

enum Step {
    Continue,
    Done,
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    state: State,
    ops: Vec<Op>,
    nodes: Vec<Ast>,
    diagnostics: Diagnostics,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            state: State::ExpectingPrimary,
            ops: Vec::with_capacity(8),
            nodes: Vec::with_capacity(8),
            diagnostics: Diagnostics::new(),
        }
    }

    fn parse(mut self) -> ParseResult {
        loop {
            let step = match self.state {
                State::ExpectingPrimary => self.expecting_primary(),
                State::AfterPrimary => self.after_primary(),
            };
            if let Step::Done = step {
                break;
            }
        }
        self.finish()
    }

    fn nth(&self, lookahead: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + lookahead)
    }

    fn nth_kind(&self, lookahead: usize) -> TokenKind {
        self.nth(lookahead).map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Span of the current token, or an empty span past the last one.
    fn current_span(&self) -> Span {
        match (self.nth(0), self.tokens.last()) {
            (Some(t), _) => t.span,
            (None, Some(last)) => Span::point(last.span.end),
            (None, None) => Span::point(Position::START),
        }
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.nth(0)?;
        self.pos += 1;
        Some(token)
    }

    fn push_op(&mut self, kind: OpKind, span: Span) {
        self.ops.push(Op { kind, span });
    }

    fn push_node(&mut self, node: Ast) {
        self.nodes.push(node);
        self.state = State::AfterPrimary;
    }

    fn expecting_primary(&mut self) -> Step {
        let Some(token) = self.nth(0) else {
            return self.end_of_input(self.current_span());
        };
        let span = token.span;

        match token.kind {
            TokenKind::Field => {
                self.bump();
                let name = token.as_str().unwrap_or_default().to_string();
                if self.nth_kind(0) == TokenKind::Colon {
                    self.bump();
                } else {
                    self.diagnostics
                        .report(DiagnosticKind::ExpectedColon, Span::point(span.end))
                        .emit();
                }
                self.push_op(OpKind::Field(name), span);
            }
            TokenKind::Not | TokenKind::Bang => {
                self.bump();
                self.push_op(OpKind::Not, span);
            }
            TokenKind::Plus => {
                self.bump();
                self.push_op(OpKind::Require, span);
            }
            TokenKind::Minus => {
                self.bump();
                self.push_op(OpKind::Prohibit, span);
            }
            TokenKind::LParen if self.at_range_start() => self.range(),
            TokenKind::LParen => {
                self.bump();
                self.push_op(OpKind::Group, span);
            }
            TokenKind::LBracket | TokenKind::LBrace => self.range(),
            TokenKind::Lt | TokenKind::Lte | TokenKind::Gt | TokenKind::Gte => self.comparator(),
            TokenKind::Phrase => {
                self.bump();
                let text = token.as_str().unwrap_or_default().to_string();
                self.push_node(Ast::new(AstKind::Literal(Literal::String(text)), span));
            }
            TokenKind::Number => {
                self.bump();
                let raw = Literal::Number(token.text.clone());
                self.push_node(Ast::new(AstKind::Literal(raw), span));
            }
            TokenKind::Star => {
                self.bump();
                self.push_node(Ast::new(AstKind::Literal(Literal::Unbounded), span));
            }
            TokenKind::Regex => {
                self.bump();
                let pattern = token.as_str().unwrap_or_default().to_string();
                let predicate = Predicate::unbound(PredicateKind::Regex(pattern));
                self.push_node(Ast::predicate(predicate, span));
            }
            TokenKind::RParen => {
                // `()` or a dangling operator before `)`; the `)` itself is
                // handled in AfterPrimary.
                self.diagnostics
                    .report(DiagnosticKind::ExpectedExpression, span)
                    .emit();
                self.push_node(Ast::placeholder(Span::point(span.start)));
            }
            TokenKind::Eof => return self.end_of_input(span),
            TokenKind::And
            | TokenKind::Or
            | TokenKind::Caret
            | TokenKind::Tilde
            | TokenKind::Colon
            | TokenKind::To
            | TokenKind::RBracket
            | TokenKind::RBrace => {
                self.bump();
                self.unexpected(token);
            }
        }
        Step::Continue
    }

    fn after_primary(&mut self) -> Step {
        let Some(token) = self.nth(0) else {
            return Step::Done;
        };
        let span = token.span;

        match token.kind {
            TokenKind::And => {
                self.bump();
                self.binary(OpKind::And, span);
            }
            TokenKind::Or => {
                self.bump();
                self.binary(OpKind::Or, span);
            }
            TokenKind::Caret => {
                self.bump();
                self.boost(span);
            }
            TokenKind::Tilde => {
                self.bump();
                self.fuzz(span);
            }
            TokenKind::RParen => {
                self.bump();
                self.close_group(span);
            }
            TokenKind::Eof => return Step::Done,
            kind if kind.starts_primary() => {
                self.binary(OpKind::ImplicitAnd, Span::point(span.start));
            }
            _ => {
                self.bump();
                self.unexpected(token);
            }
        }
        Step::Continue
    }

    /// End of input while an operand is still owed.
    fn end_of_input(&mut self, span: Span) -> Step {
        if !self.ops.is_empty() || !self.nodes.is_empty() {
            self.diagnostics
                .report(DiagnosticKind::ExpectedExpression, span)
                .emit();
            self.nodes.push(Ast::placeholder(span));
        }
        Step::Done
    }

    fn unexpected(&mut self, token: &Token) {
        self.diagnostics
            .report(DiagnosticKind::UnexpectedToken, token.span)
            .message(token.kind.describe())
            .emit();
    }

    /// Left-associative binary operator.
    fn binary(&mut self, kind: OpKind, span: Span) {
        self.reduce_while(kind.precedence());
        self.push_op(kind, span);
        self.state = State::ExpectingPrimary;
    }

    /// `(` followed by a literal and `TO` opens a range, not a group.
    fn at_range_start(&self) -> bool {
        self.nth_kind(1).is_literal() && self.nth_kind(2) == TokenKind::To
    }

    /// `[lo TO hi]`, `{lo TO hi}` and mixed forms. `(` and `)` are exclusive
    /// like braces.
    fn range(&mut self) {
        let Some(open) = self.bump() else {
            return;
        };
        let include_low = open.kind == TokenKind::LBracket;

        match self.range_body(include_low) {
            Some((kind, close)) => {
                let span = open.span.cover(close);
                self.push_node(Ast::predicate(Predicate::unbound(kind), span));
            }
            None => {
                let span = open.span.cover(self.current_span());
                self.diagnostics
                    .report(DiagnosticKind::MalformedRange, span)
                    .emit();
                self.skip_past_range_close();
                self.push_node(Ast::placeholder(span));
            }
        }
    }

    fn range_body(&mut self, include_low: bool) -> Option<(PredicateKind, Span)> {
        let low = self.bound()?;
        if self.nth_kind(0) != TokenKind::To {
            return None;
        }
        self.bump();
        let high = self.bound()?;
        let include_high = match self.nth_kind(0) {
            TokenKind::RBracket => true,
            TokenKind::RBrace | TokenKind::RParen => false,
            _ => return None,
        };
        let close = self.bump()?.span;
        let kind = PredicateKind::Range {
            low,
            high,
            include_low,
            include_high,
        };
        Some((kind, close))
    }

    fn bound(&mut self) -> Option<Literal> {
        let literal = literal(self.nth(0)?)?;
        self.bump();
        Some(literal)
    }

    /// Recovery: drop tokens up to and including the next closing bracket.
    fn skip_past_range_close(&mut self) {
        while let Some(token) = self.nth(0) {
            match token.kind {
                TokenKind::RBracket | TokenKind::RBrace | TokenKind::RParen => {
                    self.bump();
                    return;
                }
                TokenKind::Eof => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// `<`, `<=`, `>`, `>=` followed by one literal.
    fn comparator(&mut self) {
        let Some(op_token) = self.bump() else {
            return;
        };
        let Some(op) = CompareOp::from_symbol(&op_token.text) else {
            self.unexpected(op_token);
            return;
        };

        let value = self
            .nth(0)
            .filter(|t| t.kind != TokenKind::Star)
            .and_then(literal);
        let Some(value) = value else {
            let span = Span::point(op_token.span.end);
            self.diagnostics
                .report(DiagnosticKind::ExpectedValue, span)
                .message(format!("`{op}` needs a number or phrase"))
                .emit();
            self.push_node(Ast::placeholder(op_token.span));
            return;
        };

        let value_span = self.current_span();
        self.bump();
        let predicate = Predicate::unbound(PredicateKind::Comparator { op, value });
        self.push_node(Ast::predicate(predicate, op_token.span.cover(value_span)));
    }

    /// `^number` on the most recent node.
    fn boost(&mut self, caret: Span) {
        self.reduce_while(PREC_FIELD);
        let Some(value) = self.nth(0).and_then(Token::as_number) else {
            self.diagnostics
                .report(DiagnosticKind::ExpectedNumber, Span::point(caret.end))
                .message("boost needs a number, e.g., `^2`")
                .emit();
            return;
        };
        let span = caret.cover(self.current_span());
        self.bump();
        self.modify_last(span, |p| p.boost = Some(value));
    }

    /// `~` with an optional number on the most recent node.
    fn fuzz(&mut self, tilde: Span) {
        self.reduce_while(PREC_FIELD);
        let mut span = tilde;
        let mut value = DEFAULT_FUZZ;
        if let Some(n) = self.nth(0).and_then(Token::as_number) {
            span = span.cover(self.current_span());
            value = n;
            self.bump();
        }
        self.modify_last(span, |p| p.fuzz = Some(value));
    }

    /// Apply a postfix modifier. Only predicates carry boost and fuzz; any
    /// other node passes through unchanged.
    fn modify_last(&mut self, span: Span, apply: impl FnOnce(&mut Predicate)) {
        if let Some(node) = self.nodes.last_mut()
            && let AstKind::Predicate(p) = &mut node.kind
        {
            apply(p);
            node.span = node.span.cover(span);
            return;
        }
        self.diagnostics
            .report(DiagnosticKind::ModifierIgnored, span)
            .hint("boost and fuzz apply to a single field value")
            .emit();
    }

    fn close_group(&mut self, close: Span) {
        while let Some(op) = self.ops.last() {
            if op.kind == OpKind::Group {
                let open = op.span;
                self.ops.pop();
                if let Some(node) = self.nodes.last_mut() {
                    node.span = node.span.cover(open).cover(close);
                }
                return;
            }
            self.reduce_top();
        }
        self.diagnostics
            .report(DiagnosticKind::UnmatchedParen, close)
            .emit();
    }

    fn reduce_while(&mut self, precedence: u8) {
        while let Some(op) = self.ops.last() {
            if op.kind == OpKind::Group || op.kind.precedence() < precedence {
                break;
            }
            self.reduce_top();
        }
    }

    fn reduce_top(&mut self) {
        let Some(op) = self.ops.pop() else {
            return;
        };

        let node = match op.kind {
            OpKind::And | OpKind::ImplicitAnd => {
                let rhs = self.pop_node(op.span);
                let lhs = self.pop_node(op.span);
                Ast::and(lhs, rhs)
            }
            OpKind::Or => {
                let rhs = self.pop_node(op.span);
                let lhs = self.pop_node(op.span);
                Ast::or(lhs, rhs)
            }
            OpKind::Not => {
                let child = self.pop_node(op.span);
                let span = op.span.cover(child.span);
                Ast::new(AstKind::Not(Box::new(child)), span)
            }
            OpKind::Require | OpKind::Prohibit => {
                let modifier = if op.kind == OpKind::Require {
                    Modifier::Require
                } else {
                    Modifier::Prohibit
                };
                let child = self.pop_node(op.span);
                let span = op.span.cover(child.span);
                Ast::new(AstKind::Modifier(modifier, Box::new(child)), span)
            }
            OpKind::Field(name) => {
                let child = self.pop_node(op.span);
                let span = op.span.cover(child.span);
                let mut node = child.apply_field(&name);
                node.span = span;
                node
            }
            OpKind::Group => {
                self.diagnostics
                    .report(DiagnosticKind::UnclosedGroup, op.span)
                    .emit();
                return;
            }
        };
        self.nodes.push(node);
    }

    fn pop_node(&mut self, span: Span) -> Ast {
        if let Some(node) = self.nodes.pop() {
            return node;
        }
        self.diagnostics
            .report(DiagnosticKind::UnbalancedStacks, span)
            .message("operator is missing an operand")
            .emit();
        Ast::placeholder(span)
    }

    fn finish(mut self) -> ParseResult {
        while !self.ops.is_empty() {
            self.reduce_top();
        }

        let root = match self.nodes.len() {
            0 => Ast::placeholder(self.current_span()),
            1 => self.nodes.remove(0),
            _ => {
                let nodes = std::mem::take(&mut self.nodes);
                let span = nodes[0].span.cover(nodes[nodes.len() - 1].span);
                self.diagnostics
                    .report(DiagnosticKind::UnbalancedStacks, span)
                    .message(format!("{} roots left after parsing", nodes.len()))
                    .emit();
                Ast::new(AstKind::And(nodes), span)
            }
        };

        ParseResult {
            root,
            diagnostics: self.diagnostics,
        }
    }
}

fn literal(token: &Token) -> Option<Literal> {
    match token.kind {
        TokenKind::Phrase => Some(Literal::String(token.as_str()?.to_string())),
        TokenKind::Number => Some(Literal::Number(token.text.clone())),
        TokenKind::Star => Some(Literal::Unbounded),
        _ => None,
    }
}

//! Untyped syntax tree.
//!
//! Every node owns its children and carries the span it was parsed from.
//! Leaves are either predicates bound to a field or bare literals still
//! waiting for a field.

use std::fmt;

use lucid_bytecode::CompareOp;

use crate::span::Span;

/// Field name of the placeholder leaf that matches every record.
pub const ANY_FIELD: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub kind: AstKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstKind {
    And(Vec<Ast>),
    Or(Vec<Ast>),
    Not(Box<Ast>),
    Modifier(Modifier, Box<Ast>),
    Predicate(Predicate),
    Literal(Literal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `+expr`
    Require,
    /// `-expr`
    Prohibit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Empty until a field-apply reaches this leaf.
    pub field: String,
    pub kind: PredicateKind,
    pub boost: Option<f64>,
    pub fuzz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateKind {
    EqualsString(String),
    NotEqualsString(String),
    Prefix(String),
    Glob(String),
    Regex(String),
    Phrase(String),
    Exists,
    Comparator {
        op: CompareOp,
        value: Literal,
    },
    Range {
        low: Literal,
        high: Literal,
        include_low: bool,
        include_high: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// Raw lexeme; the typer coerces it to the field's type.
    Number(String),
    /// `*`
    Unbounded,
}

impl Ast {
    pub fn new(kind: AstKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Matches every record; stands in for missing or malformed input.
    pub fn placeholder(span: Span) -> Self {
        Self::new(
            AstKind::Predicate(Predicate::new(ANY_FIELD, PredicateKind::Exists)),
            span,
        )
    }

    pub fn predicate(predicate: Predicate, span: Span) -> Self {
        Self::new(AstKind::Predicate(predicate), span)
    }

    /// Conjunction, merging child lists of nested conjunctions.
    pub fn and(lhs: Ast, rhs: Ast) -> Self {
        let span = lhs.span.cover(rhs.span);
        let mut children = Vec::new();
        for side in [lhs, rhs] {
            match side.kind {
                AstKind::And(inner) => children.extend(inner),
                _ => children.push(side),
            }
        }
        Self::new(AstKind::And(children), span)
    }

    /// Disjunction, merging child lists of nested disjunctions.
    pub fn or(lhs: Ast, rhs: Ast) -> Self {
        let span = lhs.span.cover(rhs.span);
        let mut children = Vec::new();
        for side in [lhs, rhs] {
            match side.kind {
                AstKind::Or(inner) => children.extend(inner),
                _ => children.push(side),
            }
        }
        Self::new(AstKind::Or(children), span)
    }

    /// Bind `field` to every leaf that has none yet. Bare literals become
    /// predicates.
    pub fn apply_field(self, field: &str) -> Self {
        let kind = match self.kind {
            AstKind::And(children) => {
                AstKind::And(children.into_iter().map(|c| c.apply_field(field)).collect())
            }
            AstKind::Or(children) => {
                AstKind::Or(children.into_iter().map(|c| c.apply_field(field)).collect())
            }
            AstKind::Not(child) => AstKind::Not(Box::new(child.apply_field(field))),
            AstKind::Modifier(m, child) => {
                AstKind::Modifier(m, Box::new(child.apply_field(field)))
            }
            AstKind::Predicate(mut p) => {
                if p.field.is_empty() {
                    p.field = field.to_string();
                }
                AstKind::Predicate(p)
            }
            AstKind::Literal(lit) => {
                AstKind::Predicate(Predicate::new(field, lit.into_predicate_kind()))
            }
        };
        Self::new(kind, self.span)
    }

    pub fn node_count(&self) -> usize {
        match &self.kind {
            AstKind::And(children) | AstKind::Or(children) => {
                1 + children.iter().map(Ast::node_count).sum::<usize>()
            }
            AstKind::Not(child) | AstKind::Modifier(_, child) => 1 + child.node_count(),
            AstKind::Predicate(_) | AstKind::Literal(_) => 1,
        }
    }

    pub fn as_predicate(&self) -> Option<&Predicate> {
        match &self.kind {
            AstKind::Predicate(p) => Some(p),
            _ => None,
        }
    }
}

impl Predicate {
    pub fn new(field: impl Into<String>, kind: PredicateKind) -> Self {
        Self {
            field: field.into(),
            kind,
            boost: None,
            fuzz: None,
        }
    }

    pub fn unbound(kind: PredicateKind) -> Self {
        Self::new(String::new(), kind)
    }
}

impl Literal {
    /// Predicate a literal denotes once a field is applied to it.
    ///
    /// A string whose only wildcard is one trailing `*` is a prefix match;
    /// any other `*` or `?` makes it a glob.
    pub fn into_predicate_kind(self) -> PredicateKind {
        match self {
            Literal::String(s) => {
                if let Some(head) = s.strip_suffix('*')
                    && !head.is_empty()
                    && !head.contains(['*', '?'])
                {
                    return PredicateKind::Prefix(head.to_string());
                }
                if s.contains(['*', '?']) {
                    PredicateKind::Glob(s)
                } else {
                    PredicateKind::Phrase(s)
                }
            }
            Literal::Number(raw) => PredicateKind::EqualsString(raw),
            Literal::Unbounded => PredicateKind::Exists,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Number(raw) => f.write_str(raw),
            Literal::Unbounded => f.write_str("*"),
        }
    }
}

struct FieldName<'a>(&'a str);

impl fmt::Display for FieldName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = !self.0.is_empty() && !self.0.contains(char::is_whitespace);
        if plain {
            f.write_str(self.0)
        } else {
            write!(f, "'{}'", self.0)
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = FieldName(&self.field);
        match &self.kind {
            PredicateKind::EqualsString(v) => write!(f, "(eq {field} {v:?})")?,
            PredicateKind::NotEqualsString(v) => write!(f, "(neq {field} {v:?})")?,
            PredicateKind::Prefix(v) => write!(f, "(prefix {field} {v:?})")?,
            PredicateKind::Glob(v) => write!(f, "(glob {field} {v:?})")?,
            PredicateKind::Regex(v) => write!(f, "(regex {field} /{v}/)")?,
            PredicateKind::Phrase(v) => write!(f, "(phrase {field} {v:?})")?,
            PredicateKind::Exists => write!(f, "(exists {field})")?,
            PredicateKind::Comparator { op, value } => write!(f, "(cmp {field} {op} {value})")?,
            PredicateKind::Range {
                low,
                high,
                include_low,
                include_high,
            } => {
                let open = if *include_low { '[' } else { '{' };
                let close = if *include_high { ']' } else { '}' };
                write!(f, "(range {field} {open}{low} TO {high}{close})")?;
            }
        }
        if let Some(boost) = self.boost {
            write!(f, "^{boost}")?;
        }
        if let Some(fuzz) = self.fuzz {
            write!(f, "~{fuzz}")?;
        }
        Ok(())
    }
}

/// S-expression rendering, e.g. `(and (eq level "42") (phrase message "whee"))`.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |f: &mut fmt::Formatter<'_>, head: &str, children: &[Ast]| {
            write!(f, "({head}")?;
            for child in children {
                write!(f, " {child}")?;
            }
            f.write_str(")")
        };
        match &self.kind {
            AstKind::And(children) => list(f, "and", children),
            AstKind::Or(children) => list(f, "or", children),
            AstKind::Not(child) => write!(f, "(not {child})"),
            AstKind::Modifier(Modifier::Require, child) => write!(f, "(require {child})"),
            AstKind::Modifier(Modifier::Prohibit, child) => write!(f, "(prohibit {child})"),
            AstKind::Predicate(p) => write!(f, "{p}"),
            AstKind::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

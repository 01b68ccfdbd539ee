//! Schema-driven typing: untyped syntax tree to typed IR.
//!
//! Every leaf is checked against its field's declared type and its literal
//! coerced to that type. Problems are reported as diagnostics and a
//! best-effort leaf is produced in their place, so one bad clause never
//! hides the others.

pub mod coerce;

#[cfg(test)]
mod tests;

use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr};

use lucid_bytecode::CompareOp;
use lucid_core::{FieldSpec, FieldType, Schema};
use regex_syntax::ast::parse::ParserBuilder;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{Bounds, Ir, Matcher};
use crate::parser::{ANY_FIELD, Ast, AstKind, Literal, Modifier, Predicate, PredicateKind};
use crate::span::Span;

#[derive(Debug)]
pub struct TypeResult {
    pub ir: Ir,
    pub diagnostics: Diagnostics,
}

pub fn type_check(ast: &Ast, schema: &Schema) -> TypeResult {
    let mut typer = Typer {
        schema,
        diagnostics: Diagnostics::new(),
    };
    let ir = typer.node(ast);
    tracing::debug!(
        nodes = ir.node_count(),
        diagnostics = typer.diagnostics.len(),
        "typed query"
    );
    TypeResult {
        ir,
        diagnostics: typer.diagnostics,
    }
}

struct Typer<'s> {
    schema: &'s Schema,
    diagnostics: Diagnostics,
}

impl<'s> Typer<'s> {
    fn node(&mut self, ast: &Ast) -> Ir {
        match &ast.kind {
            AstKind::And(children) => Ir::And(children.iter().map(|c| self.node(c)).collect()),
            AstKind::Or(children) => Ir::Or(children.iter().map(|c| self.node(c)).collect()),
            AstKind::Not(child) | AstKind::Modifier(Modifier::Prohibit, child) => {
                Ir::not(self.node(child))
            }
            AstKind::Modifier(Modifier::Require, child) => self.node(child),
            AstKind::Predicate(predicate) => self.predicate(predicate, ast.span),
            AstKind::Literal(literal) => {
                self.diagnostics
                    .report(DiagnosticKind::MissingField, ast.span)
                    .emit();
                let predicate = Predicate::unbound(literal.clone().into_predicate_kind());
                self.leaf(&predicate, &FieldSpec::new(FieldType::Keyword), ast.span)
            }
        }
    }

    fn predicate(&mut self, predicate: &Predicate, span: Span) -> Ir {
        if predicate.field == ANY_FIELD && matches!(predicate.kind, PredicateKind::Exists) {
            return Ir::True;
        }
        let spec = self.field_spec(&predicate.field, span);
        self.leaf(predicate, &spec, span)
    }

    /// Declared spec, or a synthetic keyword field after reporting why.
    fn field_spec(&mut self, field: &str, span: Span) -> Cow<'s, FieldSpec> {
        if let Some(spec) = self.schema.get(field) {
            return Cow::Borrowed(spec);
        }
        if field.is_empty() {
            self.diagnostics
                .report(DiagnosticKind::MissingField, span)
                .emit();
        } else {
            self.diagnostics
                .report(DiagnosticKind::UnknownField, span)
                .message(field)
                .emit();
        }
        Cow::Owned(FieldSpec::new(FieldType::Keyword))
    }

    fn leaf(&mut self, predicate: &Predicate, spec: &FieldSpec, span: Span) -> Ir {
        let field = predicate.field.as_str();
        let ir = match &predicate.kind {
            PredicateKind::EqualsString(value) => {
                return self.equality(predicate, value, CompareOp::Eq, spec, span);
            }
            PredicateKind::NotEqualsString(value) => {
                return self.equality(predicate, value, CompareOp::Neq, spec, span);
            }
            PredicateKind::Phrase(text) => return self.phrase(predicate, text, spec, span),
            PredicateKind::Prefix(prefix) => {
                self.require_textual(field, "prefix", spec, span);
                Ir::Prefix {
                    field: field.to_string(),
                    prefix: prefix.clone(),
                }
            }
            PredicateKind::Glob(pattern) => {
                self.require_textual(field, "wildcard", spec, span);
                Ir::Glob {
                    field: field.to_string(),
                    pattern: pattern.clone(),
                }
            }
            PredicateKind::Regex(pattern) => {
                self.require_textual(field, "regex", spec, span);
                Ir::Regex {
                    field: field.to_string(),
                    pattern: pattern.clone(),
                    matcher: self.compile_regex(pattern, span),
                }
            }
            PredicateKind::Exists => Ir::exists(field),
            PredicateKind::Comparator { op, value } => {
                self.comparator(field, *op, value, spec, span)
            }
            PredicateKind::Range {
                low,
                high,
                include_low,
                include_high,
            } => self.range(field, (low, high), (*include_low, *include_high), spec, span),
        };
        self.ignore_modifiers(predicate, span);
        ir
    }

    /// Equality against literal text, coerced to the field's type.
    fn equality(
        &mut self,
        predicate: &Predicate,
        raw: &str,
        op: CompareOp,
        spec: &FieldSpec,
        span: Span,
    ) -> Ir {
        let field = predicate.field.as_str();
        if spec.ty.is_textual() {
            if op == CompareOp::Eq && (predicate.boost.is_some() || predicate.fuzz.is_some()) {
                return Ir::Phrase {
                    field: field.to_string(),
                    text: raw.to_string(),
                    proximity: 0,
                    fuzz: predicate.fuzz,
                    boost: predicate.boost,
                };
            }
            self.ignore_modifiers(predicate, span);
            return string_equality(field, raw, op);
        }

        self.ignore_modifiers(predicate, span);
        let coerced = match spec.ty {
            FieldType::Numeric => coerce::number(raw)
                .map(|value| Ir::CompareNumber {
                    field: field.to_string(),
                    op,
                    value,
                })
                .ok_or(DiagnosticKind::InvalidNumber),
            FieldType::DateTime => coerce::datetime(raw, &spec.layouts)
                .map(|value| Ir::CompareDateTime {
                    field: field.to_string(),
                    op,
                    value,
                })
                .ok_or(DiagnosticKind::InvalidDateTime),
            FieldType::Ip if coerce::is_cidr(raw) => {
                return self.cidr(field, raw, op, span);
            }
            FieldType::Ip => coerce::ip(raw)
                .map(|value| Ir::CompareIp {
                    field: field.to_string(),
                    op,
                    value,
                })
                .ok_or(DiagnosticKind::InvalidIp),
            FieldType::Keyword | FieldType::Text => Ok(string_equality(field, raw, op)),
        };

        coerced.unwrap_or_else(|kind| {
            self.diagnostics.report(kind, span).message(raw).emit();
            string_equality(field, raw, op)
        })
    }

    fn cidr(&mut self, field: &str, raw: &str, op: CompareOp, span: Span) -> Ir {
        match coerce::cidr(raw) {
            Ok((network, prefix_len)) => {
                let leaf = Ir::InCidr {
                    field: field.to_string(),
                    network,
                    prefix_len,
                };
                if op == CompareOp::Neq {
                    Ir::not(leaf)
                } else {
                    leaf
                }
            }
            Err(err) => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidCidr, span)
                    .message(err.to_string())
                    .emit();
                string_equality(field, raw, op)
            }
        }
    }

    /// `~N` on a multi-term phrase is a proximity window, on a single term
    /// it is fuzziness.
    fn phrase(&mut self, predicate: &Predicate, text: &str, spec: &FieldSpec, span: Span) -> Ir {
        let field = predicate.field.as_str();
        let multi_term = text.split_whitespace().nth(1).is_some();
        let (proximity, fuzz) = match predicate.fuzz {
            Some(window) if multi_term => (Some(window), None),
            fuzz => (None, fuzz),
        };

        if proximity.is_some() && spec.ty != FieldType::Text {
            self.diagnostics
                .report(DiagnosticKind::ProximityNotAllowed, span)
                .message(format!("`{field}` is a {} field", spec.ty))
                .emit();
        }

        match spec.ty {
            FieldType::Text => Ir::Phrase {
                field: field.to_string(),
                text: text.to_string(),
                proximity: proximity.map_or(0, window),
                fuzz,
                boost: predicate.boost,
            },
            FieldType::Keyword if fuzz.is_some() || predicate.boost.is_some() => Ir::Phrase {
                field: field.to_string(),
                text: text.to_string(),
                proximity: 0,
                fuzz,
                boost: predicate.boost,
            },
            _ => {
                let plain = Predicate {
                    fuzz,
                    ..predicate.clone()
                };
                self.equality(&plain, text, CompareOp::Eq, spec, span)
            }
        }
    }

    fn comparator(
        &mut self,
        field: &str,
        op: CompareOp,
        value: &Literal,
        spec: &FieldSpec,
        span: Span,
    ) -> Ir {
        let text = literal_text(value);
        match spec.ty {
            FieldType::Numeric => Ir::CompareNumber {
                field: field.to_string(),
                op,
                value: self.number(text, span),
            },
            FieldType::DateTime => Ir::CompareDateTime {
                field: field.to_string(),
                op,
                value: self.datetime(text, &spec.layouts, span),
            },
            FieldType::Ip => Ir::CompareIp {
                field: field.to_string(),
                op,
                value: self.ip(text, span),
            },
            FieldType::Keyword | FieldType::Text => self.unordered(field, "comparison", spec, span),
        }
    }

    fn range(
        &mut self,
        field: &str,
        ends: (&Literal, &Literal),
        inclusive: (bool, bool),
        spec: &FieldSpec,
        span: Span,
    ) -> Ir {
        let field_name = field.to_string();
        match spec.ty {
            FieldType::Numeric => Ir::RangeNumber {
                field: field_name,
                bounds: self.bounds(ends, inclusive, |typer, text| {
                    typer.number(text, span)
                }),
            },
            FieldType::DateTime => Ir::RangeDateTime {
                field: field_name,
                bounds: self.bounds(ends, inclusive, |typer, text| {
                    typer.datetime(text, &spec.layouts, span)
                }),
            },
            FieldType::Ip => Ir::RangeIp {
                field: field_name,
                bounds: self.bounds(ends, inclusive, |typer, text| {
                    typer.ip(text, span)
                }),
            },
            FieldType::Keyword | FieldType::Text => self.unordered(field, "range", spec, span),
        }
    }

    /// `*` ends stay open.
    fn bounds<T>(
        &mut self,
        (low, high): (&Literal, &Literal),
        (include_low, include_high): (bool, bool),
        mut value: impl FnMut(&mut Self, &str) -> T,
    ) -> Bounds<T> {
        let mut bound = |typer: &mut Self, literal: &Literal| match literal {
            Literal::Unbounded => None,
            literal => Some(value(typer, literal_text(literal))),
        };
        let low = bound(self, low);
        let high = bound(self, high);
        Bounds::new(low, high, include_low, include_high)
    }

    /// Comparators and ranges on a string field: reported, then replaced by
    /// an equality against the empty string.
    fn unordered(&mut self, field: &str, what: &str, spec: &FieldSpec, span: Span) -> Ir {
        self.diagnostics
            .report(DiagnosticKind::TypeMismatch, span)
            .message(format!(
                "{what} needs a numeric, datetime or ip field, `{field}` is {}",
                spec.ty
            ))
            .emit();
        Ir::eq(field, "")
    }

    fn require_textual(&mut self, field: &str, what: &str, spec: &FieldSpec, span: Span) {
        if spec.ty.is_textual() {
            return;
        }
        self.diagnostics
            .report(DiagnosticKind::TypeMismatch, span)
            .message(format!(
                "{what} match needs a keyword or text field, `{field}` is {}",
                spec.ty
            ))
            .emit();
    }

    fn ignore_modifiers(&mut self, predicate: &Predicate, span: Span) {
        let modifier = match (predicate.boost, predicate.fuzz) {
            (Some(_), _) => "boost",
            (None, Some(_)) => "fuzziness",
            (None, None) => return,
        };
        self.diagnostics
            .report(DiagnosticKind::ModifierIgnored, span)
            .message(format!("{modifier} only applies to string matches"))
            .emit();
    }

    fn number(&mut self, text: &str, span: Span) -> f64 {
        coerce::number(text).unwrap_or_else(|| {
            self.diagnostics
                .report(DiagnosticKind::InvalidNumber, span)
                .message(text)
                .emit();
            0.0
        })
    }

    /// Epoch zero when unparseable.
    fn datetime(&mut self, text: &str, layouts: &[String], span: Span) -> i64 {
        coerce::datetime(text, layouts).unwrap_or_else(|| {
            self.diagnostics
                .report(DiagnosticKind::InvalidDateTime, span)
                .message(text)
                .emit();
            0
        })
    }

    /// `0.0.0.0` when unparseable.
    fn ip(&mut self, text: &str, span: Span) -> IpAddr {
        coerce::ip(text).unwrap_or_else(|| {
            self.diagnostics
                .report(DiagnosticKind::InvalidIp, span)
                .message(text)
                .emit();
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        })
    }

    fn compile_regex(&mut self, pattern: &str, span: Span) -> Option<Matcher> {
        if pattern.is_empty() {
            self.diagnostics
                .report(DiagnosticKind::EmptyRegex, span)
                .emit();
            return None;
        }

        if let Err(e) = ParserBuilder::new().build().parse(pattern) {
            self.diagnostics
                .report(DiagnosticKind::InvalidRegex, span)
                .message(e.kind().to_string())
                .emit();
            return None;
        }

        match Matcher::new(pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidRegex, span)
                    .message(e.to_string())
                    .emit();
                None
            }
        }
    }
}

fn string_equality(field: &str, value: &str, op: CompareOp) -> Ir {
    if op == CompareOp::Neq {
        Ir::neq(field, value)
    } else {
        Ir::eq(field, value)
    }
}

fn literal_text(literal: &Literal) -> &str {
    match literal {
        Literal::String(s) | Literal::Number(s) => s,
        Literal::Unbounded => "*",
    }
}

/// Proximity window in words.
fn window(n: f64) -> u32 {
    n.max(0.0).round() as u32
}

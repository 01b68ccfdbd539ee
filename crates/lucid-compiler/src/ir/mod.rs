//! Typed intermediate representation.
//!
//! Leaves are schema-checked predicates with values already coerced to
//! their field's type. Every node has a canonical [`key`](Ir::key): a
//! deterministic string encoding in which the children of `And`/`Or` are
//! sorted, so commutative reorderings share a key. Equality on `Ir` is key
//! equality.

pub mod nnf;
pub mod simplify;

#[cfg(test)]
mod nnf_tests;
#[cfg(test)]
mod properties_tests;

use std::fmt::{self, Write};
use std::net::IpAddr;

use lucid_bytecode::{CompareOp, format_interval};

pub use nnf::to_nnf;
pub use simplify::simplify;

/// Compiled regex attached to a `Regex` leaf.
pub type Matcher = regex_automata::meta::Regex;

/// Bounds of a range leaf; `None` is an open side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub low: Option<T>,
    pub high: Option<T>,
    pub include_low: bool,
    pub include_high: bool,
}

impl<T> Bounds<T> {
    pub fn new(low: Option<T>, high: Option<T>, include_low: bool, include_high: bool) -> Self {
        Self {
            low,
            high,
            include_low,
            include_high,
        }
    }

    /// Both ends present and inclusive.
    pub fn closed(low: T, high: T) -> Self {
        Self::new(Some(low), Some(high), true, true)
    }
}

#[derive(Debug, Clone)]
pub enum Ir {
    And(Vec<Ir>),
    Or(Vec<Ir>),
    Not(Box<Ir>),
    True,
    False,
    EqualsString {
        field: String,
        value: String,
    },
    NotEqualsString {
        field: String,
        value: String,
    },
    Prefix {
        field: String,
        prefix: String,
    },
    Glob {
        field: String,
        pattern: String,
    },
    Regex {
        field: String,
        pattern: String,
        /// `None` when the pattern failed to compile.
        matcher: Option<Matcher>,
    },
    Phrase {
        field: String,
        text: String,
        /// Word window; 0 means the terms must be adjacent.
        proximity: u32,
        fuzz: Option<f64>,
        boost: Option<f64>,
    },
    Exists {
        field: String,
    },
    CompareNumber {
        field: String,
        op: CompareOp,
        value: f64,
    },
    CompareDateTime {
        field: String,
        op: CompareOp,
        /// Epoch nanoseconds.
        value: i64,
    },
    CompareIp {
        field: String,
        op: CompareOp,
        value: IpAddr,
    },
    RangeNumber {
        field: String,
        bounds: Bounds<f64>,
    },
    RangeDateTime {
        field: String,
        bounds: Bounds<i64>,
    },
    RangeIp {
        field: String,
        bounds: Bounds<IpAddr>,
    },
    InCidr {
        field: String,
        network: IpAddr,
        prefix_len: u8,
    },
}

impl Ir {
    pub fn not(child: Ir) -> Self {
        Self::Not(Box::new(child))
    }

    pub fn eq(field: &str, value: &str) -> Self {
        Self::EqualsString {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn neq(field: &str, value: &str) -> Self {
        Self::NotEqualsString {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn compare_number(field: &str, op: CompareOp, value: f64) -> Self {
        Self::CompareNumber {
            field: field.to_string(),
            op,
            value,
        }
    }

    pub fn range_number(field: &str, bounds: Bounds<f64>) -> Self {
        Self::RangeNumber {
            field: field.to_string(),
            bounds,
        }
    }

    pub fn exists(field: &str) -> Self {
        Self::Exists {
            field: field.to_string(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            Self::And(_) | Self::Or(_) | Self::Not(_) | Self::True | Self::False
        )
    }

    /// Field tested by a leaf.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::EqualsString { field, .. }
            | Self::NotEqualsString { field, .. }
            | Self::Prefix { field, .. }
            | Self::Glob { field, .. }
            | Self::Regex { field, .. }
            | Self::Phrase { field, .. }
            | Self::Exists { field }
            | Self::CompareNumber { field, .. }
            | Self::CompareDateTime { field, .. }
            | Self::CompareIp { field, .. }
            | Self::RangeNumber { field, .. }
            | Self::RangeDateTime { field, .. }
            | Self::RangeIp { field, .. }
            | Self::InCidr { field, .. } => Some(field),
            Self::And(_) | Self::Or(_) | Self::Not(_) | Self::True | Self::False => None,
        }
    }

    /// Canonical encoding; children of `And`/`Or` are sorted.
    pub fn key(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out, true);
        out
    }

    pub fn node_count(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Ir::node_count).sum::<usize>()
            }
            Self::Not(child) => 1 + child.node_count(),
            _ => 1,
        }
    }

    fn write_to(&self, out: &mut String, sorted: bool) {
        match self {
            Self::And(children) => write_list(out, "and", children, sorted),
            Self::Or(children) => write_list(out, "or", children, sorted),
            Self::Not(child) => {
                out.push_str("not(");
                child.write_to(out, sorted);
                out.push(')');
            }
            leaf => write_leaf(out, leaf).expect("String write never fails"),
        }
    }
}

fn write_list(out: &mut String, head: &str, children: &[Ir], sorted: bool) {
    let mut parts: Vec<String> = children
        .iter()
        .map(|c| {
            let mut s = String::new();
            c.write_to(&mut s, sorted);
            s
        })
        .collect();
    if sorted {
        parts.sort();
    }
    out.push_str(head);
    out.push('(');
    out.push_str(&parts.join(","));
    out.push(')');
}

fn write_leaf(out: &mut String, leaf: &Ir) -> fmt::Result {
    match leaf {
        Ir::True => out.write_str("true"),
        Ir::False => out.write_str("false"),
        Ir::EqualsString { field, value } => write!(out, "eq({field:?},{value:?})"),
        Ir::NotEqualsString { field, value } => write!(out, "neq({field:?},{value:?})"),
        Ir::Prefix { field, prefix } => write!(out, "prefix({field:?},{prefix:?})"),
        Ir::Glob { field, pattern } => write!(out, "glob({field:?},{pattern:?})"),
        Ir::Regex { field, pattern, .. } => write!(out, "regex({field:?},/{pattern}/)"),
        Ir::Phrase {
            field,
            text,
            proximity,
            fuzz,
            boost,
        } => {
            write!(out, "phrase({field:?},{text:?}")?;
            if *proximity > 0 {
                write!(out, ",~{proximity}")?;
            }
            if let Some(fuzz) = fuzz {
                write!(out, ",fuzz={fuzz}")?;
            }
            if let Some(boost) = boost {
                write!(out, ",boost={boost}")?;
            }
            out.write_char(')')
        }
        Ir::Exists { field } => write!(out, "exists({field:?})"),
        Ir::CompareNumber { field, op, value } => {
            write!(out, "cmp.num({field:?},{},{value})", op.name())
        }
        Ir::CompareDateTime { field, op, value } => {
            write!(out, "cmp.time({field:?},{},{value})", op.name())
        }
        Ir::CompareIp { field, op, value } => {
            write!(out, "cmp.ip({field:?},{},{value})", op.name())
        }
        Ir::RangeNumber { field, bounds } => write!(out, "range.num({field:?},{})", interval(bounds)),
        Ir::RangeDateTime { field, bounds } => {
            write!(out, "range.time({field:?},{})", interval(bounds))
        }
        Ir::RangeIp { field, bounds } => write!(out, "range.ip({field:?},{})", interval(bounds)),
        Ir::InCidr {
            field,
            network,
            prefix_len,
        } => write!(out, "cidr({field:?},{network}/{prefix_len})"),
        Ir::And(_) | Ir::Or(_) | Ir::Not(_) => Ok(()),
    }
}

fn interval<T: fmt::Display>(bounds: &Bounds<T>) -> String {
    let low = bounds.low.as_ref().map(ToString::to_string);
    let high = bounds.high.as_ref().map(ToString::to_string);
    format_interval(
        low.as_deref(),
        high.as_deref(),
        bounds.include_low,
        bounds.include_high,
    )
}

impl PartialEq for Ir {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Same notation as [`Ir::key`], children in their original order.
impl fmt::Display for Ir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out, false);
        f.write_str(&out)
    }
}

//! Negation normal form.
//!
//! Pushes every `Not` down to the leaves with De Morgan's laws. Leaves with
//! an exact complement are inverted in place; the rest keep a single `Not`
//! wrapper. After this pass a `Not` only ever wraps a leaf.

use lucid_bytecode::CompareOp;

use super::{Bounds, Ir};

pub fn to_nnf(ir: Ir) -> Ir {
    rewrite(ir, false)
}

fn rewrite(ir: Ir, negated: bool) -> Ir {
    match ir {
        Ir::Not(child) => rewrite(*child, !negated),
        Ir::And(children) => {
            let children = children.into_iter().map(|c| rewrite(c, negated)).collect();
            if negated {
                Ir::Or(children)
            } else {
                Ir::And(children)
            }
        }
        Ir::Or(children) => {
            let children = children.into_iter().map(|c| rewrite(c, negated)).collect();
            if negated {
                Ir::And(children)
            } else {
                Ir::Or(children)
            }
        }
        Ir::True if negated => Ir::False,
        Ir::False if negated => Ir::True,
        leaf if negated => complement(&leaf).unwrap_or_else(|| Ir::not(leaf)),
        leaf => leaf,
    }
}

/// Exact logical complement of a leaf, when one exists as IR.
///
/// String equality flips to inequality, comparators flip their operator
/// and ranges split into the comparators outside the interval. Pattern,
/// phrase, existence and CIDR leaves have no complement.
pub fn complement(leaf: &Ir) -> Option<Ir> {
    let inverted = match leaf {
        Ir::EqualsString { field, value } => Ir::NotEqualsString {
            field: field.clone(),
            value: value.clone(),
        },
        Ir::NotEqualsString { field, value } => Ir::EqualsString {
            field: field.clone(),
            value: value.clone(),
        },
        Ir::CompareNumber { field, op, value } => Ir::CompareNumber {
            field: field.clone(),
            op: op.complement(),
            value: *value,
        },
        Ir::CompareDateTime { field, op, value } => Ir::CompareDateTime {
            field: field.clone(),
            op: op.complement(),
            value: *value,
        },
        Ir::CompareIp { field, op, value } => Ir::CompareIp {
            field: field.clone(),
            op: op.complement(),
            value: *value,
        },
        Ir::RangeNumber { field, bounds } => outside(bounds, |op, value| Ir::CompareNumber {
            field: field.clone(),
            op,
            value,
        }),
        Ir::RangeDateTime { field, bounds } => outside(bounds, |op, value| Ir::CompareDateTime {
            field: field.clone(),
            op,
            value,
        }),
        Ir::RangeIp { field, bounds } => outside(bounds, |op, value| Ir::CompareIp {
            field: field.clone(),
            op,
            value,
        }),
        _ => return None,
    };
    Some(inverted)
}

/// Comparators matching everything outside `bounds`.
fn outside<T: Copy>(bounds: &Bounds<T>, compare: impl Fn(CompareOp, T) -> Ir) -> Ir {
    let below = bounds.low.map(|low| {
        let op = if bounds.include_low {
            CompareOp::Lt
        } else {
            CompareOp::Lte
        };
        compare(op, low)
    });
    let above = bounds.high.map(|high| {
        let op = if bounds.include_high {
            CompareOp::Gt
        } else {
            CompareOp::Gte
        };
        compare(op, high)
    });

    match (below, above) {
        (Some(below), Some(above)) => Ir::Or(vec![below, above]),
        (Some(one), None) | (None, Some(one)) => one,
        // An unbounded range holds for every value.
        (None, None) => Ir::False,
    }
}

//! Boolean simplification.
//!
//! Bottom-up: children first, then flattening, constant folding, the
//! complementary-pair scan and deduplication by canonical key. The result
//! is a fixed point, so simplifying twice changes nothing.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::Ir;
use super::nnf::complement;

pub fn simplify(ir: Ir) -> Ir {
    match ir {
        Ir::And(children) => junction(children, Junction::And),
        Ir::Or(children) => junction(children, Junction::Or),
        Ir::Not(child) => match simplify(*child) {
            Ir::True => Ir::False,
            Ir::False => Ir::True,
            Ir::Not(inner) => *inner,
            child => Ir::not(child),
        },
        leaf => leaf,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Junction {
    And,
    Or,
}

impl Junction {
    /// Neutral element: dropped from the child list.
    fn identity(self) -> Ir {
        match self {
            Self::And => Ir::True,
            Self::Or => Ir::False,
        }
    }

    /// Absorbing element: collapses the whole node.
    fn absorbing(self) -> Ir {
        match self {
            Self::And => Ir::False,
            Self::Or => Ir::True,
        }
    }

    fn build(self, children: Vec<Ir>) -> Ir {
        match self {
            Self::And => Ir::And(children),
            Self::Or => Ir::Or(children),
        }
    }
}

fn junction(children: Vec<Ir>, kind: Junction) -> Ir {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        let child = simplify(child);
        match (kind, child) {
            (Junction::And, Ir::True) | (Junction::Or, Ir::False) => {}
            (Junction::And, Ir::False) | (Junction::Or, Ir::True) => return kind.absorbing(),
            (Junction::And, Ir::And(inner)) | (Junction::Or, Ir::Or(inner)) => flat.extend(inner),
            (_, child) => flat.push(child),
        }
    }

    let keys: Vec<String> = flat.iter().map(Ir::key).collect();
    if has_complementary_pair(&flat, &keys) {
        return kind.absorbing();
    }

    let mut unique: IndexMap<String, Ir> = IndexMap::with_capacity(flat.len());
    for (child, key) in flat.into_iter().zip(keys) {
        unique.entry(key).or_insert(child);
    }

    match unique.len() {
        0 => kind.identity(),
        1 => unique.swap_remove_index(0).map_or_else(|| kind.identity(), |(_, child)| child),
        _ => kind.build(unique.into_values().collect()),
    }
}

/// Some child is the negation of a sibling: `x` next to `not(x)`, or two
/// leaves that are exact complements such as `eq` and `neq`.
fn has_complementary_pair(children: &[Ir], keys: &[String]) -> bool {
    let present: HashSet<&str> = keys.iter().map(String::as_str).collect();
    children.iter().any(|child| match child {
        Ir::Not(inner) => present.contains(inner.key().as_str()),
        leaf if leaf.is_leaf() => complement(leaf)
            .filter(Ir::is_leaf)
            .is_some_and(|inverse| present.contains(inverse.key().as_str())),
        _ => false,
    })
}

//! Algebraic properties of NNF and simplification over generated trees.

use lucid_bytecode::CompareOp;
use proptest::prelude::*;

use super::{Bounds, Ir, simplify, to_nnf};

fn field() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b"]).prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = CompareOp> {
    prop::sample::select(vec![
        CompareOp::Eq,
        CompareOp::Neq,
        CompareOp::Lt,
        CompareOp::Lte,
        CompareOp::Gt,
        CompareOp::Gte,
    ])
}

fn leaf() -> impl Strategy<Value = Ir> {
    // Small alphabets so generated trees actually repeat and contradict.
    let value = prop::sample::select(vec!["x", "y"]);
    prop_oneof![
        (field(), value.clone()).prop_map(|(f, v)| Ir::eq(&f, v)),
        (field(), value).prop_map(|(f, v)| Ir::neq(&f, v)),
        (field(), op(), 0u8..3).prop_map(|(f, op, n)| Ir::compare_number(&f, op, f64::from(n))),
        field().prop_map(|f| Ir::exists(&f)),
        (
            field(),
            prop::option::of(0u8..3),
            prop::option::of(3u8..6),
            any::<bool>(),
            any::<bool>()
        )
            .prop_map(|(f, low, high, include_low, include_high)| {
                let bounds = Bounds::new(
                    low.map(f64::from),
                    high.map(f64::from),
                    include_low,
                    include_high,
                );
                Ir::range_number(&f, bounds)
            }),
    ]
}

fn tree() -> impl Strategy<Value = Ir> {
    let base = prop_oneof![
        8 => leaf(),
        1 => Just(Ir::True),
        1 => Just(Ir::False),
    ];
    base.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Ir::And),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Ir::Or),
            inner.prop_map(Ir::not),
        ]
    })
}

fn not_only_over_leaves(ir: &Ir) -> bool {
    match ir {
        Ir::Not(child) => child.is_leaf(),
        Ir::And(children) | Ir::Or(children) => children.iter().all(not_only_over_leaves),
        _ => true,
    }
}

proptest! {
    #[test]
    fn simplify_is_idempotent(ir in tree()) {
        let once = simplify(ir);
        let twice = simplify(once.clone());
        prop_assert_eq!(twice.key(), once.key());
    }

    #[test]
    fn simplify_ignores_operand_order(a in tree(), b in tree()) {
        let ab = simplify(Ir::And(vec![a.clone(), b.clone()]));
        let ba = simplify(Ir::And(vec![b.clone(), a.clone()]));
        prop_assert_eq!(ab.key(), ba.key());

        let ab = simplify(Ir::Or(vec![a.clone(), b.clone()]));
        let ba = simplify(Ir::Or(vec![b, a]));
        prop_assert_eq!(ab.key(), ba.key());
    }

    #[test]
    fn double_negation_of_leaf_is_identity(leaf in leaf()) {
        prop_assert_eq!(to_nnf(Ir::not(Ir::not(leaf.clone()))).key(), leaf.key());
    }

    #[test]
    fn nnf_pushes_not_to_leaves(ir in tree()) {
        let nnf = to_nnf(ir);
        prop_assert!(not_only_over_leaves(&nnf), "{}", nnf);
    }

    #[test]
    fn simplify_preserves_nnf(ir in tree()) {
        let simplified = simplify(to_nnf(ir));
        prop_assert!(not_only_over_leaves(&simplified), "{}", simplified);
    }

    #[test]
    fn leaf_and_its_negation_contradict(leaf in leaf()) {
        prop_assert_eq!(simplify(Ir::And(vec![leaf.clone(), Ir::not(leaf.clone())])), Ir::False);
        prop_assert_eq!(simplify(Ir::Or(vec![Ir::not(leaf.clone()), leaf])), Ir::True);
    }
}

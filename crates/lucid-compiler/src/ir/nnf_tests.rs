use std::net::{IpAddr, Ipv4Addr};

use lucid_bytecode::CompareOp;

use super::{Bounds, Ir, to_nnf};

fn nnf_of(ir: Ir) -> String {
    to_nnf(ir).to_string()
}

#[test]
fn positive_leaf_passes_through() {
    assert_eq!(nnf_of(Ir::eq("level", "warn")), r#"eq("level","warn")"#);
}

#[test]
fn string_equality_inverts() {
    assert_eq!(
        nnf_of(Ir::not(Ir::eq("level", "warn"))),
        r#"neq("level","warn")"#
    );
    assert_eq!(
        nnf_of(Ir::not(Ir::neq("level", "warn"))),
        r#"eq("level","warn")"#
    );
}

#[test]
fn comparator_takes_complement() {
    assert_eq!(
        nnf_of(Ir::not(Ir::compare_number("n", CompareOp::Lt, 5.0))),
        r#"cmp.num("n",gte,5)"#
    );
    assert_eq!(
        nnf_of(Ir::not(Ir::compare_number("n", CompareOp::Lte, 5.0))),
        r#"cmp.num("n",gt,5)"#
    );
    assert_eq!(
        nnf_of(Ir::not(Ir::compare_number("n", CompareOp::Eq, 5.0))),
        r#"cmp.num("n",neq,5)"#
    );
}

#[test]
fn de_morgan_swaps_junctions() {
    let ir = Ir::not(Ir::And(vec![Ir::eq("a", "1"), Ir::Or(vec![Ir::eq("b", "2"), Ir::eq("c", "3")])]));
    assert_eq!(
        nnf_of(ir),
        r#"or(neq("a","1"),and(neq("b","2"),neq("c","3")))"#
    );
}

#[test]
fn double_negation_cancels() {
    let leaf = Ir::Prefix {
        field: "msg".into(),
        prefix: "err".into(),
    };
    assert_eq!(to_nnf(Ir::not(Ir::not(leaf.clone()))), leaf);
    assert_eq!(nnf_of(Ir::not(Ir::not(Ir::not(leaf)))), r#"not(prefix("msg","err"))"#);
}

#[test]
fn leaves_without_complement_keep_not() {
    let ir = Ir::not(Ir::Or(vec![
        Ir::exists("host"),
        Ir::Glob {
            field: "path".into(),
            pattern: "/var/*".into(),
        },
    ]));
    assert_eq!(
        nnf_of(ir),
        r#"and(not(exists("host")),not(glob("path","/var/*")))"#
    );
}

#[test]
fn cidr_keeps_not() {
    let ir = Ir::not(Ir::InCidr {
        field: "ip".into(),
        network: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)),
        prefix_len: 8,
    });
    assert_eq!(nnf_of(ir), r#"not(cidr("ip",10.0.0.0/8))"#);
}

#[test]
fn constants_swap() {
    assert_eq!(to_nnf(Ir::not(Ir::True)), Ir::False);
    assert_eq!(to_nnf(Ir::not(Ir::False)), Ir::True);
    assert_eq!(to_nnf(Ir::True), Ir::True);
}

#[test]
fn closed_range_splits_into_two_comparators() {
    let ir = Ir::not(Ir::range_number("n", Bounds::closed(1.0, 5.0)));
    assert_eq!(nnf_of(ir), r#"or(cmp.num("n",lt,1),cmp.num("n",gt,5))"#);
}

#[test]
fn exclusive_bounds_flip_to_inclusive_comparators() {
    let ir = Ir::not(Ir::range_number(
        "n",
        Bounds::new(Some(1.0), Some(5.0), false, false),
    ));
    assert_eq!(nnf_of(ir), r#"or(cmp.num("n",lte,1),cmp.num("n",gte,5))"#);
}

#[test]
fn half_open_range_inverts_to_one_comparator() {
    let ir = Ir::not(Ir::range_number("n", Bounds::new(Some(1.0), None, true, false)));
    assert_eq!(nnf_of(ir), r#"cmp.num("n",lt,1)"#);

    let ir = Ir::not(Ir::RangeDateTime {
        field: "ts".into(),
        bounds: Bounds::new(None, Some(1_000), false, true),
    });
    assert_eq!(nnf_of(ir), r#"cmp.time("ts",gt,1000)"#);
}

#[test]
fn unbounded_range_inverts_to_false_in_every_domain() {
    fn open<T>(low: bool, high: bool) -> Bounds<T> {
        Bounds::new(None, None, low, high)
    }

    let ranges = [
        Ir::range_number("n", open(true, true)),
        Ir::RangeDateTime {
            field: "ts".into(),
            bounds: open(false, false),
        },
        Ir::RangeIp {
            field: "ip".into(),
            bounds: open(true, false),
        },
    ];
    for range in ranges {
        assert_eq!(to_nnf(Ir::not(range)), Ir::False);
    }
}

#[test]
fn ip_range_inverts() {
    let low = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    let high = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));
    let ir = Ir::not(Ir::RangeIp {
        field: "ip".into(),
        bounds: Bounds::new(Some(low), Some(high), true, false),
    });
    assert_eq!(
        nnf_of(ir),
        r#"or(cmp.ip("ip",lt,10.0.0.1),cmp.ip("ip",gte,10.0.0.9))"#
    );
}

#[test]
fn not_only_wraps_leaves() {
    fn check(ir: &Ir) {
        match ir {
            Ir::Not(child) => assert!(child.is_leaf(), "not over {child}"),
            Ir::And(children) | Ir::Or(children) => children.iter().for_each(check),
            _ => {}
        }
    }

    let ir = Ir::not(Ir::Or(vec![
        Ir::not(Ir::And(vec![Ir::exists("a"), Ir::not(Ir::exists("b"))])),
        Ir::not(Ir::not(Ir::exists("c"))),
    ]));
    let nnf = to_nnf(ir);
    check(&nnf);
    assert_eq!(
        nnf.to_string(),
        r#"and(and(exists("a"),not(exists("b"))),not(exists("c")))"#
    );
}

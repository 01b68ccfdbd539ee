use indoc::indoc;

use super::*;
use crate::lexer::lex;

fn parsed(source: &str) -> ParseResult {
    parse(&lex(source).unwrap())
}

fn tree(source: &str) -> String {
    let result = parsed(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}:\n{}",
        result.diagnostics
    );
    result.root.to_string()
}

/// Tree and diagnostics, for malformed input.
fn recovered(source: &str) -> String {
    let result = parsed(source);
    format!("{}\n{}", result.root, result.diagnostics)
}

#[test]
fn explicit_and() {
    insta::assert_snapshot!(
        tree(r#"level:42 && message:"whee""#),
        @r#"(and (eq level "42") (phrase message "whee"))"#
    );
}

#[test]
fn implicit_and() {
    insta::assert_snapshot!(tree("a:1 b:2"), @r#"(and (eq a "1") (eq b "2"))"#);
}

#[test]
fn and_binds_tighter_than_or() {
    insta::assert_snapshot!(
        tree("a:1 OR b:2 AND c:3"),
        @r#"(or (eq a "1") (and (eq b "2") (eq c "3")))"#
    );
    insta::assert_snapshot!(
        tree("a:1 AND b:2 || c:3"),
        @r#"(or (and (eq a "1") (eq b "2")) (eq c "3"))"#
    );
}

#[test]
fn associative_operators_flatten() {
    insta::assert_snapshot!(
        tree("a:1 OR b:2 OR c:3"),
        @r#"(or (eq a "1") (eq b "2") (eq c "3"))"#
    );
    insta::assert_snapshot!(
        tree("(a:1 b:2) AND (c:3 d:4)"),
        @r#"(and (eq a "1") (eq b "2") (eq c "3") (eq d "4"))"#
    );
}

#[test]
fn prefix_operators() {
    insta::assert_snapshot!(
        tree("NOT a:1 AND b:2"),
        @r#"(and (not (eq a "1")) (eq b "2"))"#
    );
    insta::assert_snapshot!(
        tree("+a:1 -b:2 !c:3"),
        @r#"(and (require (eq a "1")) (prohibit (eq b "2")) (not (eq c "3")))"#
    );
    insta::assert_snapshot!(tree("NOT NOT a:1"), @r#"(not (not (eq a "1")))"#);
}

#[test]
fn not_applies_to_group() {
    insta::assert_snapshot!(
        tree("NOT (a:1 OR b:2)"),
        @r#"(not (or (eq a "1") (eq b "2")))"#
    );
}

#[test]
fn field_propagates_into_group() {
    insta::assert_snapshot!(
        tree(r#"a:(1 OR "x" OR NOT 2)"#),
        @r#"(or (eq a "1") (phrase a "x") (not (eq a "2")))"#
    );
}

#[test]
fn inner_field_wins() {
    insta::assert_snapshot!(
        tree("a:(b:1 OR 2)"),
        @r#"(or (eq b "1") (eq a "2"))"#
    );
}

#[test]
fn ranges() {
    insta::assert_snapshot!(tree("(level:[1 TO *})"), @"(range level [1 TO *})");
    insta::assert_snapshot!(tree("n:{1 TO 5]"), @"(range n {1 TO 5])");
    insta::assert_snapshot!(tree("n:(1 TO 5)"), @"(range n {1 TO 5})");
    insta::assert_snapshot!(
        tree(r#"ts:["2024-01-01" TO "2024-02-01"]"#),
        @r#"(range ts ["2024-01-01" TO "2024-02-01"])"#
    );
}

#[test]
fn range_inclusivity_and_bounds() {
    let root = parsed("(level:[1 TO *})").root;
    let predicate = root.as_predicate().unwrap();
    assert_eq!(predicate.field, "level");
    assert_eq!(
        predicate.kind,
        PredicateKind::Range {
            low: Literal::Number("1".to_string()),
            high: Literal::Unbounded,
            include_low: true,
            include_high: false,
        }
    );
}

#[test]
fn comparators() {
    insta::assert_snapshot!(tree("level:>=5"), @"(cmp level >= 5)");
    insta::assert_snapshot!(tree("level:<5 level:>1"), @"(and (cmp level < 5) (cmp level > 1))");
    insta::assert_snapshot!(tree(r#"ts:<="2024-01-01""#), @r#"(cmp ts <= "2024-01-01")"#);
}

#[test]
fn value_forms() {
    insta::assert_snapshot!(tree("level:*"), @"(exists level)");
    insta::assert_snapshot!(tree(r#"name:"jo*""#), @r#"(prefix name "jo")"#);
    insta::assert_snapshot!(tree(r#"name:"j?n*""#), @r#"(glob name "j?n*")"#);
    insta::assert_snapshot!(tree(r#"name:"*son""#), @r#"(glob name "*son")"#);
    insta::assert_snapshot!(tree("message:/testing/i"), @"(regex message /(?i)testing/)");
}

#[test]
fn quoted_field_name() {
    insta::assert_snapshot!(
        tree(r#"'the level':42 && 'the message':"whee""#),
        @r#"(and (eq 'the level' "42") (phrase 'the message' "whee"))"#
    );
}

#[test]
fn boost_and_fuzz() {
    insta::assert_snapshot!(tree(r#"title:"foo"^2"#), @r#"(phrase title "foo")^2"#);
    insta::assert_snapshot!(tree(r#"title:"foo"~"#), @r#"(phrase title "foo")~2"#);
    insta::assert_snapshot!(
        tree(r#"title:"foo bar"~3^1.5"#),
        @r#"(phrase title "foo bar")^1.5~3"#
    );
    insta::assert_snapshot!(
        tree(r#"title:"foo"^2 body:"bar""#),
        @r#"(and (phrase title "foo")^2 (phrase body "bar"))"#
    );
}

#[test]
fn boost_on_group_is_ignored() {
    let result = parsed("(a:1 OR b:2)^2");
    assert_eq!(result.root.to_string(), r#"(or (eq a "1") (eq b "2"))"#);
    assert!(!result.diagnostics.has_errors());
    assert_eq!(result.diagnostics.warning_count(), 1);
}

#[test]
fn empty_query_is_match_all() {
    let result = parsed("");
    assert_eq!(result.root.to_string(), "(exists *)");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn empty_group() {
    insta::assert_snapshot!(recovered("()"), @r"
    (exists *)
    1:2-1:3: expected an expression
    ");
}

#[test]
fn dangling_operator() {
    insta::assert_snapshot!(recovered("a:1 AND"), @r#"
    (and (eq a "1") (exists *))
    1:8-1:8: expected an expression
    "#);
}

#[test]
fn unclosed_group() {
    insta::assert_snapshot!(recovered("(a:1"), @r#"
    (eq a "1")
    1:1-1:2: missing closing `)`
    "#);
}

#[test]
fn unmatched_paren() {
    insta::assert_snapshot!(recovered("a:1)"), @r#"
    (eq a "1")
    1:4-1:5: unmatched `)`
    "#);
}

#[test]
fn missing_colon() {
    insta::assert_snapshot!(recovered("'level' 42"), @r#"
    (eq level "42")
    1:8-1:8: expected `:` after field name [e.g., `level:42`]
    "#);
}

#[test]
fn leading_binary_operator() {
    insta::assert_snapshot!(recovered("AND a:1"), @r#"
    (eq a "1")
    1:1-1:4: unexpected `AND`
    "#);
}

#[test]
fn malformed_range() {
    let result = parsed("a:[1 TO");
    assert_eq!(result.root.to_string(), "(exists *)");
    let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, [DiagnosticKind::MalformedRange]);
}

#[test]
fn malformed_range_recovers() {
    let result = parsed("a:[1 5] b:2");
    assert_eq!(result.root.to_string(), r#"(and (exists *) (eq b "2"))"#);
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn comparator_without_value() {
    let result = parsed("a:>");
    assert_eq!(result.root.to_string(), "(exists *)");
    insta::assert_snapshot!(
        result.diagnostics,
        @"1:4-1:4: expected a value: `>` needs a number or phrase"
    );
}

#[test]
fn several_errors_in_one_pass() {
    let result = parsed("(a:1 OR) AND b:>");
    assert_eq!(result.diagnostics.len(), 2);
    assert_eq!(
        result.root.to_string(),
        r#"(and (or (eq a "1") (exists *)) (exists *))"#
    );
}

#[test]
fn spans_widen_over_reductions() {
    let root = parsed("level:42").root;
    assert_eq!(root.span.to_string(), "1:1-1:9");

    let root = parsed("NOT (a:1 b:2)").root;
    assert_eq!(root.span.to_string(), "1:1-1:14");
}

#[test]
fn node_count() {
    assert_eq!(parsed("a:1").root.node_count(), 1);
    assert_eq!(parsed("a:1 b:2 OR NOT c:3").root.node_count(), 6);
}

#[test]
fn multi_line_query() {
    let source = indoc! {r#"
        level:>=3
        AND message:"disk full"
    "#};
    insta::assert_snapshot!(
        tree(source),
        @r#"(and (cmp level >= 3) (phrase message "disk full"))"#
    );
}

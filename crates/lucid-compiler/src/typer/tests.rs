use lucid_core::{FieldSpec, FieldType, Schema};

use super::{TypeResult, type_check};
use crate::diagnostics::DiagnosticKind;
use crate::ir::Ir;
use crate::lexer::lex;
use crate::parser::parse;

fn schema() -> Schema {
    Schema::new()
        .with_field("level", FieldType::Numeric)
        .with_field("message", FieldType::Text)
        .with_field("tag", FieldType::Keyword)
        .with_field(
            "ts",
            FieldSpec::new(FieldType::DateTime).with_layouts(["%Y-%m-%d"]),
        )
        .with_field("ip", FieldType::Ip)
        .with_field("the level", FieldType::Numeric)
        .with_field("the message", FieldType::Text)
}

fn typed(source: &str) -> TypeResult {
    let tokens = lex(source).expect("query should lex");
    let parsed = parse(&tokens);
    assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
    type_check(&parsed.root, &schema())
}

/// Typed IR of a query that must type cleanly.
fn ir(source: &str) -> String {
    let result = typed(source);
    assert!(result.diagnostics.is_empty(), "{}", result.diagnostics);
    result.ir.to_string()
}

/// Diagnostic messages, one per line.
fn messages(source: &str) -> String {
    typed(source)
        .diagnostics
        .iter()
        .map(|d| d.message().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn kinds(source: &str) -> Vec<DiagnosticKind> {
    typed(source).diagnostics.iter().map(|d| d.kind()).collect()
}

#[test]
fn numbers_coerce_per_field_type() {
    assert_eq!(ir("level:42"), r#"cmp.num("level",eq,42)"#);
    assert_eq!(ir("level:1_000"), r#"cmp.num("level",eq,1000)"#);
    assert_eq!(ir("tag:42"), r#"eq("tag","42")"#);
    assert_eq!(ir("message:42"), r#"eq("message","42")"#);
}

#[test]
fn phrases_by_field_type() {
    assert_eq!(ir(r#"message:"disk full""#), r#"phrase("message","disk full")"#);
    assert_eq!(ir(r#"tag:"disk full""#), r#"eq("tag","disk full")"#);
    assert_eq!(ir(r#"level:"7""#), r#"cmp.num("level",eq,7)"#);
    assert_eq!(ir(r#"ts:"1970-01-02""#), r#"cmp.time("ts",eq,86400000000000)"#);
    assert_eq!(ir(r#"ip:"10.0.0.1""#), r#"cmp.ip("ip",eq,10.0.0.1)"#);
}

#[test]
fn cidr_on_ip_field() {
    assert_eq!(ir(r#"ip:"10.0.0.0/8""#), r#"cidr("ip",10.0.0.0/8)"#);
    assert_eq!(ir(r#"ip:"fe80::/10""#), r#"cidr("ip",fe80::/10)"#);
    assert_eq!(
        messages(r#"ip:"10.0.0.0/33""#),
        "invalid network prefix: prefix length 33 exceeds 32 bits"
    );
    assert_eq!(typed(r#"ip:"10.0.0.0/33""#).ir, Ir::eq("ip", "10.0.0.0/33"));
}

#[test]
fn comparators() {
    assert_eq!(ir("level:>=3"), r#"cmp.num("level",gte,3)"#);
    assert_eq!(ir("level:<-1.5"), r#"cmp.num("level",lt,-1.5)"#);
    assert_eq!(ir(r#"ts:>"1970-01-01""#), r#"cmp.time("ts",gt,0)"#);
    assert_eq!(ir(r#"ip:<="10.0.0.1""#), r#"cmp.ip("ip",lte,10.0.0.1)"#);
}

#[test]
fn ranges() {
    assert_eq!(ir("level:[1 TO *}"), r#"range.num("level",[1..+∞))"#);
    assert_eq!(ir("(level:[1 TO *})"), r#"range.num("level",[1..+∞))"#);
    assert_eq!(ir("level:{* TO 10]"), r#"range.num("level",(-∞..10])"#);
    assert_eq!(
        ir(r#"ts:{"1970-01-01" TO "1970-01-02"]"#),
        r#"range.time("ts",(0..86400000000000])"#
    );
    assert_eq!(
        ir(r#"ip:["10.0.0.1" TO "10.0.0.9"]"#),
        r#"range.ip("ip",[10.0.0.1..10.0.0.9])"#
    );
}

#[test]
fn open_range_has_absent_bounds() {
    let result = typed("level:[1 TO *}");
    let Ir::RangeNumber { field, bounds } = result.ir else {
        panic!("expected a numeric range, got {}", result.ir);
    };
    assert_eq!(field, "level");
    assert_eq!(bounds.low, Some(1.0));
    assert_eq!(bounds.high, None);
    assert!(bounds.include_low);
    assert!(!bounds.include_high);
}

#[test]
fn regex_compiles() {
    let result = typed("message:/testing/i");
    assert!(result.diagnostics.is_empty());
    let Ir::Regex {
        field,
        pattern,
        matcher,
    } = result.ir
    else {
        panic!("expected a regex, got {}", result.ir);
    };
    assert_eq!(field, "message");
    assert_eq!(pattern, "(?i)testing");
    let matcher = matcher.expect("pattern should compile");
    assert!(matcher.is_match("TESTING 1 2 3"));
}

#[test]
fn invalid_regex_keeps_leaf_without_matcher() {
    let result = typed("message:/(unclosed/");
    assert_eq!(kinds("message:/(unclosed/"), [DiagnosticKind::InvalidRegex]);
    assert!(matches!(result.ir, Ir::Regex { matcher: None, .. }));
}

#[test]
fn empty_regex() {
    assert_eq!(kinds("message://"), [DiagnosticKind::EmptyRegex]);
}

#[test]
fn wildcards() {
    assert_eq!(ir(r#"tag:"err*""#), r#"prefix("tag","err")"#);
    assert_eq!(ir(r#"message:"e?r*""#), r#"glob("message","e?r*")"#);
    assert_eq!(ir("tag:*"), r#"exists("tag")"#);
    assert_eq!(ir("level:*"), r#"exists("level")"#);
}

#[test]
fn pattern_on_ordered_field_is_reported_but_kept() {
    let result = typed(r#"level:"4*""#);
    assert_eq!(result.ir.to_string(), r#"prefix("level","4")"#);
    assert_eq!(
        messages(r#"level:"4*""#),
        "prefix match needs a keyword or text field, `level` is numeric"
    );
    assert_eq!(kinds("level:/4+/"), [DiagnosticKind::TypeMismatch]);
}

#[test]
fn modifiers_and_negation() {
    assert_eq!(
        ir(r#"-tag:"a" +level:1 NOT message:"x""#),
        r#"and(not(eq("tag","a")),cmp.num("level",eq,1),not(phrase("message","x")))"#
    );
}

#[test]
fn field_group_distributes() {
    assert_eq!(
        ir(r#"tag:("a" OR "b")"#),
        r#"or(eq("tag","a"),eq("tag","b"))"#
    );
}

#[test]
fn boost_and_fuzz_on_strings() {
    assert_eq!(ir(r#"tag:"a"^2"#), r#"phrase("tag","a",boost=2)"#);
    assert_eq!(ir(r#"message:"disk"~"#), r#"phrase("message","disk",fuzz=2)"#);
    assert_eq!(
        ir(r#"message:"disk"~1^3"#),
        r#"phrase("message","disk",fuzz=1,boost=3)"#
    );
}

#[test]
fn proximity_on_text() {
    assert_eq!(
        ir(r#"message:"disk full"~3"#),
        r#"phrase("message","disk full",~3)"#
    );
}

#[test]
fn proximity_outside_text_is_reported() {
    let result = typed(r#"tag:"disk full"~3"#);
    assert_eq!(result.ir, Ir::eq("tag", "disk full"));
    assert_eq!(
        messages(r#"tag:"disk full"~3"#),
        "proximity requires a text field: `tag` is a keyword field"
    );
}

#[test]
fn boost_on_ordered_field_is_ignored() {
    let result = typed("level:3^2");
    assert_eq!(result.ir.to_string(), r#"cmp.num("level",eq,3)"#);
    assert!(!result.diagnostics.has_errors());
    assert_eq!(
        messages("level:3^2"),
        "modifier has no effect here: boost only applies to string matches"
    );
}

#[test]
fn quoted_field_names() {
    assert_eq!(
        ir(r#"'the level':42 && 'the message':"whee""#),
        r#"and(cmp.num("the level",eq,42),phrase("the message","whee"))"#
    );
}

#[test]
fn unknown_field_types_as_keyword() {
    let result = typed("nope:1");
    assert_eq!(result.ir, Ir::eq("nope", "1"));
    assert_eq!(
        result.diagnostics.to_string(),
        "1:1-1:7: `nope` is not a known field"
    );
}

#[test]
fn bare_value_has_no_field() {
    let result = typed("42");
    assert_eq!(result.ir, Ir::eq("", "42"));
    assert_eq!(
        result.diagnostics.to_string(),
        "1:1-1:3: value has no field [prefix the value with a field, e.g., `message:\"text\"`]"
    );
}

#[test]
fn empty_query_matches_everything() {
    assert_eq!(typed("").ir, Ir::True);
}

#[test]
fn invalid_values_fall_back() {
    assert_eq!(typed(r#"level:"forty""#).ir, Ir::eq("level", "forty"));
    assert_eq!(messages(r#"level:"forty""#), "`forty` is not a valid number");

    assert_eq!(typed(r#"ip:"nope""#).ir, Ir::eq("ip", "nope"));
    assert_eq!(messages(r#"ip:"nope""#), "`nope` is not a valid IP address");

    assert_eq!(typed(r#"ts:"soon""#).ir, Ir::eq("ts", "soon"));
    assert_eq!(kinds(r#"ts:"soon""#), [DiagnosticKind::InvalidDateTime]);
}

#[test]
fn invalid_bounds_use_sentinels() {
    let result = typed(r#"ts:["soon" TO "1970-01-02"]"#);
    assert_eq!(
        result.ir.to_string(),
        r#"range.time("ts",[0..86400000000000])"#
    );
    assert_eq!(result.diagnostics.len(), 1);

    let result = typed(r#"ip:>"nope""#);
    assert_eq!(result.ir.to_string(), r#"cmp.ip("ip",gt,0.0.0.0)"#);
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn ordered_operations_on_strings_become_placeholders() {
    let result = typed("tag:>3");
    assert_eq!(result.ir, Ir::eq("tag", ""));
    assert_eq!(
        messages("tag:>3"),
        "comparison needs a numeric, datetime or ip field, `tag` is keyword"
    );

    let result = typed("message:[1 TO 2]");
    assert_eq!(result.ir, Ir::eq("message", ""));
    assert_eq!(kinds("message:[1 TO 2]"), [DiagnosticKind::TypeMismatch]);
}

#[test]
fn several_problems_in_one_query() {
    assert_eq!(
        kinds(r#"nope:1 level:"x" message://"#),
        [
            DiagnosticKind::UnknownField,
            DiagnosticKind::InvalidNumber,
            DiagnosticKind::EmptyRegex,
        ]
    );
}

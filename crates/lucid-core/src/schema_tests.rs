use crate::schema::*;

#[test]
fn bare_and_full_forms() {
    let schema = Schema::from_json(
        r#"{
            "level": "numeric",
            "message": "text",
            "host": { "type": "ip" },
            "ts": { "type": "datetime", "layouts": ["%d/%m/%Y"] }
        }"#,
    )
    .unwrap();

    assert_eq!(schema.len(), 4);
    assert_eq!(schema.get("level"), Some(&FieldSpec::new(FieldType::Numeric)));
    assert_eq!(schema.get("host").unwrap().ty, FieldType::Ip);
    assert_eq!(schema.get("ts").unwrap().layouts, vec!["%d/%m/%Y".to_string()]);
    assert!(schema.get("missing").is_none());
}

#[test]
fn preserves_declaration_order() {
    let schema = Schema::from_json(r#"{"z": "keyword", "a": "text", "m": "ip"}"#).unwrap();
    let names: Vec<_> = schema.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["z", "a", "m"]);
}

#[test]
fn rejects_unknown_type() {
    let err = Schema::from_json(r#"{"x": "blob"}"#).unwrap_err();
    assert!(err.to_string().starts_with("invalid schema"));
}

#[test]
fn builder_and_collect() {
    let built = Schema::new()
        .with_field("level", FieldType::Numeric)
        .with_field("msg", FieldType::Text);
    let collected: Schema = [("level", FieldType::Numeric), ("msg", FieldType::Text)]
        .into_iter()
        .collect();
    assert_eq!(built, collected);
}

#[test]
fn serializes_bare_types_as_objects() {
    let schema = Schema::new().with_field("level", FieldType::Numeric);
    let json = serde_json::to_string(&schema).unwrap();
    assert_eq!(json, r#"{"level":{"type":"numeric"}}"#);
    assert_eq!(Schema::from_json(&json).unwrap(), schema);
}

#[test]
fn type_predicates() {
    assert!(FieldType::Keyword.is_textual());
    assert!(!FieldType::Keyword.is_ordered());
    assert!(FieldType::DateTime.is_ordered());
    assert_eq!(FieldType::Ip.to_string(), "ip");
}

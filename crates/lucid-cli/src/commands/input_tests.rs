use std::io::Write;
use std::path::{Path, PathBuf};

use lucid_core::FieldType;

use super::input::{LoadError, QueryInput, load_schema};

#[test]
fn inline_text_wins() {
    let input = QueryInput::new(Some(PathBuf::from("missing.lq")), Some("a:1".to_string()));
    assert_eq!(input.load().unwrap(), "a:1");
    assert_eq!(input.display_name(), "<query>");
}

#[test]
fn missing_query() {
    let err = QueryInput::default().load().unwrap_err();
    assert!(matches!(err, LoadError::MissingQuery));
}

#[test]
fn unreadable_file() {
    let input = QueryInput::new(Some(PathBuf::from("/nonexistent/query.lq")), None);
    let err = input.load().unwrap_err();
    assert!(err.to_string().starts_with("failed to read '/nonexistent/query.lq'"));
    assert_eq!(input.display_name(), "/nonexistent/query.lq");
}

#[test]
fn stdin_display_name() {
    let input = QueryInput::new(Some(PathBuf::from("-")), None);
    assert_eq!(input.display_name(), "<stdin>");
}

#[test]
fn no_schema_is_empty() {
    assert!(load_schema(None).unwrap().is_empty());
}

#[test]
fn schema_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"level":"numeric","tag":"keyword"}"#)
        .unwrap();

    let schema = load_schema(Some(file.path())).unwrap();
    assert_eq!(schema.get("level").map(|s| s.ty), Some(FieldType::Numeric));
    assert_eq!(schema.get("tag").map(|s| s.ty), Some(FieldType::Keyword));
}

#[test]
fn invalid_schema_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"level":"decimal"}"#).unwrap();

    let err = load_schema(Some(file.path())).unwrap_err();
    assert!(matches!(err, LoadError::Schema { .. }));
}

#[test]
fn query_file_drops_trailing_newline() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"level:42\n").unwrap();

    let input = QueryInput::new(Some(file.path().to_path_buf()), None);
    assert_eq!(input.load().unwrap(), "level:42");
}

#[test]
fn missing_schema_file() {
    let err = load_schema(Some(Path::new("/nonexistent/fields.json"))).unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
}

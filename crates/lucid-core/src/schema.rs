//! Field schema consulted by the typer.
//!
//! A schema maps each field name to its declared type and, for datetime
//! fields, an ordered list of parse layouts. It is read-only during
//! compilation, so one schema can serve any number of concurrent compiles.
//!
//! Schemas deserialize from JSON. A field is either a bare type name or an
//! object with `type` and optional `layouts`:
//!
//! ```
//! use lucid_core::{FieldType, Schema};
//!
//! let schema = Schema::from_json(r#"{
//!     "level": "numeric",
//!     "ts": { "type": "datetime", "layouts": ["%Y-%m-%d %H:%M:%S"] }
//! }"#).unwrap();
//!
//! assert_eq!(schema.get("level").unwrap().ty, FieldType::Numeric);
//! assert_eq!(schema.get("ts").unwrap().layouts.len(), 1);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Exact-match string.
    Keyword,
    /// Analyzed free text (phrases, proximity).
    Text,
    Numeric,
    DateTime,
    #[serde(alias = "IP")]
    Ip,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::DateTime => "datetime",
            Self::Ip => "ip",
        }
    }

    /// Keyword and Text fields hold strings.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Keyword | Self::Text)
    }

    /// Numeric, DateTime and IP fields support comparators and ranges.
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Numeric | Self::DateTime | Self::Ip)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FieldSpecRepr")]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Datetime parse layouts (chrono strftime syntax), tried in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layouts: Vec<String>,
}

impl FieldSpec {
    pub fn new(ty: FieldType) -> Self {
        Self {
            ty,
            layouts: Vec::new(),
        }
    }

    pub fn with_layouts<I, S>(mut self, layouts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layouts = layouts.into_iter().map(Into::into).collect();
        self
    }
}

impl From<FieldType> for FieldSpec {
    fn from(ty: FieldType) -> Self {
        Self::new(ty)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldSpecRepr {
    Bare(FieldType),
    Full {
        #[serde(rename = "type")]
        ty: FieldType,
        #[serde(default)]
        layouts: Vec<String>,
    },
}

impl From<FieldSpecRepr> for FieldSpec {
    fn from(repr: FieldSpecRepr) -> Self {
        match repr {
            FieldSpecRepr::Bare(ty) => Self::new(ty),
            FieldSpecRepr::Full { ty, layouts } => Self { ty, layouts },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid schema: {0}")]
    Json(#[from] serde_json::Error),
}

/// Field name to declaration mapping, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builder-style insert.
    pub fn with_field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.insert(name, spec);
        self
    }

    /// Insert or replace a field declaration.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) {
        self.fields.insert(name.into(), spec.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<N: Into<String>, S: Into<FieldSpec>> FromIterator<(N, S)> for Schema {
    fn from_iter<T: IntoIterator<Item = (N, S)>>(iter: T) -> Self {
        let mut schema = Schema::new();
        for (name, spec) in iter {
            schema.insert(name, spec);
        }
        schema
    }
}

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use lucid_core::{Schema, SchemaError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("query is required: use a positional argument or -q/--query")]
    MissingQuery,
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("'{}': {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

/// Where the query text comes from: `-q` wins over the positional path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    pub path: Option<PathBuf>,
    pub text: Option<String>,
}

impl QueryInput {
    pub fn new(path: Option<PathBuf>, text: Option<String>) -> Self {
        Self { path, text }
    }

    pub fn load(&self) -> Result<String, LoadError> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        match self.path.as_deref() {
            Some(path) if path.as_os_str() == "-" => load_stdin(),
            Some(path) => read(path),
            None => Err(LoadError::MissingQuery),
        }
    }

    /// Name shown in diagnostic snippets.
    pub fn display_name(&self) -> String {
        match (&self.text, &self.path) {
            (None, Some(path)) if path.as_os_str() == "-" => "<stdin>".to_string(),
            (None, Some(path)) => path.display().to_string(),
            _ => "<query>".to_string(),
        }
    }
}

/// Without a path the schema is empty and every field is unknown.
pub fn load_schema(path: Option<&Path>) -> Result<Schema, LoadError> {
    let Some(path) = path else {
        return Ok(Schema::new());
    };
    let text = read(path)?;
    Schema::from_json(&text).map_err(|source| LoadError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

fn load_stdin() -> Result<String, LoadError> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(LoadError::Stdin)?;
    Ok(buf)
}

/// Query files may end with a newline; the query itself does not.
fn read(path: &Path) -> Result<String, LoadError> {
    let mut text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let trimmed = text.trim_end_matches(['\n', '\r']).len();
    text.truncate(trimmed);
    Ok(text)
}

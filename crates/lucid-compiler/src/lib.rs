//! Lucid compiler: Lucene-style query text to bytecode.
//!
//! This crate provides the compilation pipeline:
//! - `lexer` - positioned tokens
//! - `parser` - operator-precedence parser producing an untyped tree
//! - `typer` - schema checks and value coercion into typed IR
//! - `ir` - typed IR, negation normal form, simplification
//! - `emit` - code generation, peephole rewrites, label resolution
//! - `diagnostics` - error reporting
//! - `query` - high-level Query facade

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod emit;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod span;
pub mod typer;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use emit::EmitError;
pub use ir::Ir;
pub use lexer::{LexError, LexErrorKind, Token, TokenKind};
pub use parser::Ast;
pub use query::{CompileOptions, Query};
pub use span::{Position, Span};

/// Errors that stop a compilation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Malformed token; nothing past it was read.
    #[error("lexing failed: {0}")]
    Lex(#[from] LexError),

    #[error("query parsing failed with {} errors", .0.error_count())]
    Parse(Diagnostics),

    #[error("query typing failed with {} errors", .0.error_count())]
    Type(Diagnostics),

    #[error("query has {count} nodes, the limit is {limit}")]
    NodeLimitExceeded { limit: u32, count: usize },

    /// Compiler bug, never caused by the query text.
    #[error("internal compiler error: {0}")]
    Internal(#[from] EmitError),
}

impl Error {
    /// Diagnostics carried by parse and type failures.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Parse(d) | Self::Type(d) => Some(d),
            _ => None,
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, Error>;

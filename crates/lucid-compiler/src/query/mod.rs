//! High-level facade over the pipeline.
//!
//! Every stage method reruns the stages before it; nothing is cached
//! between calls, so a `Query` is cheap to build and to share.
//!
//! ```
//! use lucid_compiler::Query;
//! use lucid_core::{FieldType, Schema};
//!
//! let schema = Schema::new().with_field("level", FieldType::Numeric);
//! let program = Query::new("level:>=3", &schema).compile().unwrap();
//! assert_eq!(program.fields(), ["level"]);
//! ```


use lucid_bytecode::Program;
use lucid_core::Schema;

use crate::diagnostics::Diagnostics;
use crate::emit;
use crate::ir::{self, Ir};
use crate::lexer::{self, Token};
use crate::parser::{self, Ast};
use crate::typer;
use crate::{Error, Result};

pub const DEFAULT_NODE_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run the peephole optimizer.
    pub optimize: bool,
    /// Reject queries whose syntax tree exceeds this many nodes.
    pub node_limit: Option<u32>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            node_limit: Some(DEFAULT_NODE_LIMIT),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_node_limit(mut self, limit: Option<u32>) -> Self {
        self.node_limit = limit;
        self
    }
}

/// Syntax tree plus parser warnings.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub ast: Ast,
    pub diagnostics: Diagnostics,
}

/// Typed IR plus every warning so far.
#[derive(Debug, Clone)]
pub struct Typed {
    pub ir: Ir,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    source: &'a str,
    schema: &'a Schema,
    options: CompileOptions,
}

impl<'a> Query<'a> {
    pub fn new(source: &'a str, schema: &'a Schema) -> Self {
        Self {
            source,
            schema,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn tokens(&self) -> Result<Vec<Token>> {
        Ok(lexer::lex(self.source)?)
    }

    /// Fails on lexer errors, parser errors and the node limit.
    pub fn parse(&self) -> Result<Parsed> {
        let tokens = self.tokens()?;
        let parsed = parser::parse(&tokens);
        if parsed.diagnostics.has_errors() {
            return Err(Error::Parse(parsed.diagnostics));
        }

        let count = parsed.root.node_count();
        if let Some(limit) = self.options.node_limit
            && count > limit as usize
        {
            return Err(Error::NodeLimitExceeded { limit, count });
        }

        Ok(Parsed {
            ast: parsed.root,
            diagnostics: parsed.diagnostics,
        })
    }

    pub fn typed(&self) -> Result<Typed> {
        let Parsed {
            ast,
            mut diagnostics,
        } = self.parse()?;
        let typed = typer::type_check(&ast, self.schema);
        diagnostics.extend(typed.diagnostics);
        if diagnostics.has_errors() {
            return Err(Error::Type(diagnostics));
        }
        Ok(Typed {
            ir: typed.ir,
            diagnostics,
        })
    }

    pub fn nnf(&self) -> Result<Ir> {
        Ok(ir::to_nnf(self.typed()?.ir))
    }

    pub fn simplified(&self) -> Result<Ir> {
        let simplified = ir::simplify(self.nnf()?);
        tracing::debug!(key_len = simplified.key().len(), "simplified query");
        Ok(simplified)
    }

    pub fn compile(&self) -> Result<Program> {
        let ir = self.simplified()?;
        Ok(emit::emit(&ir, self.options.optimize)?)
    }

    /// Warnings of a query that compiles.
    pub fn check(&self) -> Result<Diagnostics> {
        self.compile_with_warnings().map(|(_, warnings)| warnings)
    }

    /// Program plus the warnings reported on the way.
    pub fn compile_with_warnings(&self) -> Result<(Program, Diagnostics)> {
        let Typed { ir, diagnostics } = self.typed()?;
        let ir = ir::simplify(ir::to_nnf(ir));
        let program = emit::emit(&ir, self.options.optimize)?;
        Ok((program, diagnostics))
    }
}

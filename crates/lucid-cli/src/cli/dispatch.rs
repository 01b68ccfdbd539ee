//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` mirror the command `*Args` but keep the raw flag values, so the
//! dispatch tests can assert what clap parsed before any defaults kick in.

use std::path::PathBuf;

use clap::ArgMatches;
use lucid_compiler::CompileOptions;

use super::{ColorChoice, IrStage};
use crate::commands::ast::AstArgs;
use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::input::QueryInput;
use crate::commands::ir::IrArgs;
use crate::commands::lex::LexArgs;

pub struct LexParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub color: ColorChoice,
}

impl LexParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            query_path: m.get_one::<PathBuf>("query_path").cloned(),
            query_text: m.get_one::<String>("query_text").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<LexParams> for LexArgs {
    fn from(p: LexParams) -> Self {
        Self {
            input: QueryInput::new(p.query_path, p.query_text),
            color: p.color.should_colorize(),
        }
    }
}

pub struct AstParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub node_limit: Option<u32>,
    pub color: ColorChoice,
}

impl AstParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            query_path: m.get_one::<PathBuf>("query_path").cloned(),
            query_text: m.get_one::<String>("query_text").cloned(),
            node_limit: m.get_one::<u32>("node_limit").copied(),
            color: parse_color(m),
        }
    }
}

impl From<AstParams> for AstArgs {
    fn from(p: AstParams) -> Self {
        Self {
            input: QueryInput::new(p.query_path, p.query_text),
            options: compile_options(p.node_limit, true),
            color: p.color.should_colorize(),
        }
    }
}

pub struct IrParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub node_limit: Option<u32>,
    pub stage: IrStage,
    pub color: ColorChoice,
}

impl IrParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let stage = match m.get_one::<String>("stage").map(String::as_str) {
            Some("typed") => IrStage::Typed,
            Some("nnf") => IrStage::Nnf,
            _ => IrStage::Simplified,
        };
        Self {
            query_path: m.get_one::<PathBuf>("query_path").cloned(),
            query_text: m.get_one::<String>("query_text").cloned(),
            schema_path: m.get_one::<PathBuf>("schema").cloned(),
            node_limit: m.get_one::<u32>("node_limit").copied(),
            stage,
            color: parse_color(m),
        }
    }
}

impl From<IrParams> for IrArgs {
    fn from(p: IrParams) -> Self {
        Self {
            input: QueryInput::new(p.query_path, p.query_text),
            schema_path: p.schema_path,
            options: compile_options(p.node_limit, true),
            stage: p.stage,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub node_limit: Option<u32>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            query_path: m.get_one::<PathBuf>("query_path").cloned(),
            query_text: m.get_one::<String>("query_text").cloned(),
            schema_path: m.get_one::<PathBuf>("schema").cloned(),
            node_limit: m.get_one::<u32>("node_limit").copied(),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            input: QueryInput::new(p.query_path, p.query_text),
            schema_path: p.schema_path,
            options: compile_options(p.node_limit, true),
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub node_limit: Option<u32>,
    pub no_opt: bool,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            query_path: m.get_one::<PathBuf>("query_path").cloned(),
            query_text: m.get_one::<String>("query_text").cloned(),
            schema_path: m.get_one::<PathBuf>("schema").cloned(),
            node_limit: m.get_one::<u32>("node_limit").copied(),
            no_opt: m.get_flag("no_opt"),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            input: QueryInput::new(p.query_path, p.query_text),
            schema_path: p.schema_path,
            options: compile_options(p.node_limit, !p.no_opt),
            color: p.color.should_colorize(),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// `--node-limit 0` lifts the cap; no flag keeps the default.
pub(super) fn compile_options(node_limit: Option<u32>, optimize: bool) -> CompileOptions {
    let options = CompileOptions::new().with_optimize(optimize);
    match node_limit {
        None => options,
        Some(0) => options.with_node_limit(None),
        Some(limit) => options.with_node_limit(Some(limit)),
    }
}

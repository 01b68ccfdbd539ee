//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Query file, or `-` for stdin (positional).
pub fn query_path_arg() -> Arg {
    Arg::new("query_path")
        .value_name("QUERY")
        .value_parser(value_parser!(PathBuf))
        .conflicts_with("query_text")
        .help("Query file, or - to read stdin")
}

/// Inline query text (-q/--query).
pub fn query_text_arg() -> Arg {
    Arg::new("query_text")
        .short('q')
        .long("query")
        .value_name("TEXT")
        .help("Inline query text")
}

/// Field schema as JSON (--schema).
pub fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Field schema (JSON object of field name to type)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Log pipeline events to stderr (-v for debug, -vv for trace)")
}

/// IR stage to print (--stage).
pub fn stage_arg() -> Arg {
    Arg::new("stage")
        .long("stage")
        .value_name("STAGE")
        .default_value("simplified")
        .value_parser(["typed", "nnf", "simplified"])
        .help("Pipeline stage to print")
}

/// Skip the peephole optimizer (--no-opt).
pub fn no_opt_arg() -> Arg {
    Arg::new("no_opt")
        .long("no-opt")
        .action(ArgAction::SetTrue)
        .help("Disable peephole optimization")
}

/// AST node cap (--node-limit).
pub fn node_limit_arg() -> Arg {
    Arg::new("node_limit")
        .long("node-limit")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Reject queries with more AST nodes (0 disables the limit)")
}

/// Treat warnings as errors (--strict).
pub fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as errors")
}

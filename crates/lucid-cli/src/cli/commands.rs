//! Command builders for the CLI.
//!
//! Every command takes a query from a file or `-q`, so the shared input
//! args are attached in one place.

use clap::Command;

use super::args::*;

fn with_query_args(cmd: Command) -> Command {
    cmd.arg(query_path_arg())
        .arg(query_text_arg())
        .arg(color_arg())
}

/// Input args plus the schema, for commands that type the query.
fn with_schema_args(cmd: Command) -> Command {
    with_query_args(cmd)
        .arg(schema_arg())
        .arg(node_limit_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("lucid")
        .about("Compile Lucene-style queries to bytecode")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(lex_command())
        .subcommand(ast_command())
        .subcommand(ir_command())
        .subcommand(check_command())
        .subcommand(dump_command())
}

/// Show the token stream.
pub fn lex_command() -> Command {
    let cmd = Command::new("lex")
        .about("Show the token stream of a query")
        .override_usage(
            "\
  lucid lex <QUERY>
  lucid lex -q <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  lucid lex query.lq
  lucid lex -q 'level:42 && message:"whee"'"#,
        );
    with_query_args(cmd)
}

/// Show the untyped syntax tree.
pub fn ast_command() -> Command {
    let cmd = Command::new("ast")
        .about("Show the syntax tree of a query")
        .override_usage(
            "\
  lucid ast <QUERY>
  lucid ast -q <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  lucid ast -q 'a:1 OR b:2 AND NOT c:3'
  lucid ast -q 'msg:("error" OR "warn")'   # field propagates into the group"#,
        );
    with_query_args(cmd).arg(node_limit_arg())
}

/// Show the typed IR at a chosen stage.
pub fn ir_command() -> Command {
    let cmd = Command::new("ir")
        .about("Show the typed IR of a query")
        .override_usage(
            "\
  lucid ir <QUERY> --schema <FILE>
  lucid ir -q <TEXT> --schema <FILE> [--stage <STAGE>]",
        )
        .after_help(
            r#"EXAMPLES:
  lucid ir -q 'NOT level:[1 TO 5]' --schema fields.json --stage nnf
  lucid ir -q 'tag:"x" AND NOT tag:"x"' --schema fields.json"#,
        );
    with_schema_args(cmd).arg(stage_arg())
}

/// Validate a query.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate a query against a schema")
        .override_usage(
            "\
  lucid check <QUERY> --schema <FILE>
  lucid check -q <TEXT> --schema <FILE>",
        )
        .after_help(
            r#"EXAMPLES:
  lucid check query.lq --schema fields.json
  lucid check -q 'level:3^2' --schema fields.json --strict"#,
        );
    with_schema_args(cmd).arg(strict_arg())
}

/// Show the compiled program.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Show compiled bytecode")
        .override_usage(
            "\
  lucid dump <QUERY> --schema <FILE>
  lucid dump -q <TEXT> --schema <FILE> [--no-opt]",
        )
        .after_help(
            r#"EXAMPLES:
  lucid dump -q 'level:42' --schema fields.json
  lucid dump query.lq --schema fields.json --no-opt   # unoptimized"#,
        );
    with_schema_args(cmd).arg(no_opt_arg())
}

//! Input loading and error reporting shared by every command.

use std::path::Path;
use std::process;

use lucid_compiler::{Diagnostics, Error, Query};
use lucid_core::Schema;

use super::input::{QueryInput, load_schema};

/// Query text, or exit with the load error.
pub fn load_query(input: &QueryInput) -> String {
    input.load().unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(1);
    })
}

pub fn load_schema_or_exit(path: Option<&Path>) -> Schema {
    load_schema(path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(1);
    })
}

/// Renders diagnostics against the query source.
pub fn render(diagnostics: &Diagnostics, query: &Query<'_>, name: &str, color: bool) -> String {
    diagnostics
        .printer()
        .source(query.source())
        .path(name)
        .colored(color)
        .render()
}

pub fn print_warnings(warnings: &Diagnostics, query: &Query<'_>, input: &QueryInput, color: bool) {
    if warnings.is_empty() {
        return;
    }
    let name = input.display_name();
    eprint!("{}", render(warnings, query, &name, color));
}

/// Prints a compilation failure and exits non-zero.
pub fn fail(err: Error, query: &Query<'_>, input: &QueryInput, color: bool) -> ! {
    match err.diagnostics() {
        Some(diagnostics) => {
            let name = input.display_name();
            eprint!("{}", render(diagnostics, query, &name, color));
        }
        None => eprintln!("error: {err}"),
    }
    process::exit(1);
}

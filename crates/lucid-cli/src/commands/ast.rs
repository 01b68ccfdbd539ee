use lucid_compiler::{CompileOptions, Query};
use lucid_core::Schema;

use super::input::QueryInput;
use super::run_common::{fail, load_query, print_warnings};

pub struct AstArgs {
    pub input: QueryInput,
    pub options: CompileOptions,
    pub color: bool,
}

/// Parses without a schema; field names are not checked here.
pub fn run(args: AstArgs) {
    let source = load_query(&args.input);
    let schema = Schema::new();
    let query = Query::new(&source, &schema).with_options(args.options);

    let parsed = query
        .parse()
        .unwrap_or_else(|err| fail(err, &query, &args.input, args.color));
    print_warnings(&parsed.diagnostics, &query, &args.input, args.color);
    println!("{}", parsed.ast);
}

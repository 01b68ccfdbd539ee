use std::path::PathBuf;
use std::process;

use lucid_compiler::{CompileOptions, Query};

use super::input::QueryInput;
use super::run_common::{fail, load_query, load_schema_or_exit, print_warnings};

pub struct CheckArgs {
    pub input: QueryInput,
    pub schema_path: Option<PathBuf>,
    pub options: CompileOptions,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let source = load_query(&args.input);
    let schema = load_schema_or_exit(args.schema_path.as_deref());
    let query = Query::new(&source, &schema).with_options(args.options);

    let warnings = query
        .check()
        .unwrap_or_else(|err| fail(err, &query, &args.input, args.color));
    print_warnings(&warnings, &query, &args.input, args.color);

    if args.strict && warnings.has_warnings() {
        process::exit(1);
    }

    // Silent on success (like cargo check)
}

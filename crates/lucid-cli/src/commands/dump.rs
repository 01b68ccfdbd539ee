use std::path::PathBuf;

use lucid_bytecode::dump;
use lucid_compiler::{CompileOptions, Query};
use lucid_core::Colors;

use super::input::QueryInput;
use super::run_common::{fail, load_query, load_schema_or_exit, print_warnings};

pub struct DumpArgs {
    pub input: QueryInput,
    pub schema_path: Option<PathBuf>,
    pub options: CompileOptions,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let source = load_query(&args.input);
    let schema = load_schema_or_exit(args.schema_path.as_deref());
    let query = Query::new(&source, &schema).with_options(args.options);

    let (program, warnings) = query
        .compile_with_warnings()
        .unwrap_or_else(|err| fail(err, &query, &args.input, args.color));
    print_warnings(&warnings, &query, &args.input, args.color);

    let colors = Colors::new(args.color);
    print!("{}", dump(&program, colors));
}

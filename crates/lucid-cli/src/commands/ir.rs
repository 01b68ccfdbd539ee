use std::path::PathBuf;

use lucid_compiler::ir::{simplify, to_nnf};
use lucid_compiler::{CompileOptions, Query};

use super::input::QueryInput;
use super::run_common::{fail, load_query, load_schema_or_exit, print_warnings};
use crate::cli::IrStage;

pub struct IrArgs {
    pub input: QueryInput,
    pub schema_path: Option<PathBuf>,
    pub options: CompileOptions,
    pub stage: IrStage,
    pub color: bool,
}

pub fn run(args: IrArgs) {
    let source = load_query(&args.input);
    let schema = load_schema_or_exit(args.schema_path.as_deref());
    let query = Query::new(&source, &schema).with_options(args.options);

    let typed = query
        .typed()
        .unwrap_or_else(|err| fail(err, &query, &args.input, args.color));
    print_warnings(&typed.diagnostics, &query, &args.input, args.color);

    let ir = match args.stage {
        IrStage::Typed => typed.ir,
        IrStage::Nnf => to_nnf(typed.ir),
        IrStage::Simplified => simplify(to_nnf(typed.ir)),
    };
    println!("{ir}");
}

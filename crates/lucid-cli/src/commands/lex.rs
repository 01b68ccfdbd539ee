use lucid_compiler::Query;
use lucid_core::Schema;

use super::input::QueryInput;
use super::run_common::{fail, load_query};

pub struct LexArgs {
    pub input: QueryInput,
    pub color: bool,
}

/// One token per line: span, then the token with its decoded value.
pub fn run(args: LexArgs) {
    let source = load_query(&args.input);
    let schema = Schema::new();
    let query = Query::new(&source, &schema);

    let tokens = query
        .tokens()
        .unwrap_or_else(|err| fail(err, &query, &args.input, args.color));
    for token in tokens {
        println!("{:<12} {token}", token.span.to_string());
    }
}

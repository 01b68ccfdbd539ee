mod cli;
mod commands;

use cli::{AstParams, CheckParams, DumpParams, IrParams, LexParams, build_cli};
use tracing::Level;

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("lex", m)) => {
            let params = LexParams::from_matches(m);
            commands::lex::run(params.into());
        }
        Some(("ast", m)) => {
            let params = AstParams::from_matches(m);
            commands::ast::run(params.into());
        }
        Some(("ir", m)) => {
            let params = IrParams::from_matches(m);
            commands::ir::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Pipeline events go to stderr; stdout stays clean for listings.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

mod args;
mod commands;
mod dispatch;


pub use commands::build_cli;
pub use dispatch::{AstParams, CheckParams, DumpParams, IrParams, LexParams};

/// Color output mode for CLI commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            // Diagnostics go to stderr and listings to stdout; piping either
            // one turns colors off for both.
            ColorChoice::Auto => {
                std::io::IsTerminal::is_terminal(&std::io::stdout())
                    && std::io::IsTerminal::is_terminal(&std::io::stderr())
            }
        }
    }
}

/// Pipeline stage printed by `lucid ir`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IrStage {
    Typed,
    Nnf,
    #[default]
    Simplified,
}

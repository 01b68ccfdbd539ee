//! Bytecode emission from simplified IR.
//!
//! Three passes over a flat instruction list:
//! - code generation with `LABEL` pseudo-instructions and symbolic jumps
//! - peephole rewriting (optional)
//! - label resolution to absolute addresses

mod codegen;
mod peephole;
mod resolve;

#[cfg(test)]
mod peephole_tests;

use lucid_bytecode::{PoolOverflow, Program};

use crate::ir::Ir;

pub use codegen::{Labeled, generate};
pub use peephole::optimize;
pub use resolve::{ResolveError, resolve};

/// Emission failures. None of these are caused by user input: a well-typed,
/// simplified IR never triggers them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("label resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    PoolOverflow(#[from] PoolOverflow),
}

/// Emit a finished program; `optimize` runs the peephole pass.
pub fn emit(ir: &Ir, optimize: bool) -> Result<Program, EmitError> {
    let Labeled { pools, code } = generate(ir);
    pools.validate()?;

    let generated = code.len();
    let code = if optimize {
        peephole::optimize(code)
    } else {
        code
    };
    tracing::debug!(before = generated, after = code.len(), optimize, "peephole");

    let code = resolve(code)?;
    tracing::debug!(
        instructions = code.len(),
        fields = pools.fields.len(),
        strings = pools.strings.len(),
        numbers = pools.numbers.len(),
        datetimes = pools.datetimes.len(),
        ips = pools.ips.len(),
        regexes = pools.regexes.len(),
        "emitted program"
    );
    Ok(Program::new(pools, code))
}

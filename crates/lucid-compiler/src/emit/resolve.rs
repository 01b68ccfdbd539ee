//! Label resolution.
//!
//! Phase 1 assigns every `LABEL` the address of the next real instruction.
//! Phase 2 drops the pseudo-instructions and rewrites jump operands from
//! label ids to absolute addresses.

use std::collections::BTreeMap;

use lucid_bytecode::{Instruction, LabelId, Operand};

/// Malformed labeled code. Indicates a code generator or optimizer bug,
/// never bad user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("jump at {addr} targets unbound label {label}")]
    UnboundLabel { label: LabelId, addr: u32 },
    #[error("jump at {addr} has no target operand")]
    MissingJumpOperand { addr: u32 },
    #[error("jump at {addr} has a non-label target operand")]
    InvalidJumpOperand { addr: u32 },
    #[error("label before address {addr} has no identifier")]
    LabelWithoutId { addr: u32 },
    #[error("label {0} is bound more than once")]
    DuplicateLabel(LabelId),
}

pub fn resolve(code: Vec<Instruction>) -> Result<Vec<Instruction>, ResolveError> {
    let mut addresses = BTreeMap::new();
    let mut pc: u32 = 0;
    for insn in &code {
        if !insn.is_label() {
            pc += 1;
            continue;
        }
        let id = insn
            .bound_label()
            .ok_or(ResolveError::LabelWithoutId { addr: pc })?;
        if addresses.insert(id, pc).is_some() {
            return Err(ResolveError::DuplicateLabel(id));
        }
    }

    let mut out = Vec::with_capacity(pc as usize);
    for insn in code {
        if insn.opcode.is_pseudo() {
            continue;
        }
        if !insn.opcode.is_jump() {
            out.push(insn);
            continue;
        }

        let addr = out.len() as u32;
        let label = match insn.operand(0) {
            Some(Operand::Label(label)) => label,
            Some(_) => return Err(ResolveError::InvalidJumpOperand { addr }),
            None => return Err(ResolveError::MissingJumpOperand { addr }),
        };
        let target = addresses
            .get(&label)
            .copied()
            .ok_or(ResolveError::UnboundLabel { label, addr })?;
        out.push(Instruction::new(insn.opcode, vec![Operand::Addr(target)]));
    }
    Ok(out)
}

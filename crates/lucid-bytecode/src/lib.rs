//! Bytecode format for compiled Lucid queries.
//!
//! This crate contains:
//! - The instruction set (`Opcode`, `Operand`, `Instruction`)
//! - The compiled artifact (`Program`) and its constant pools
//! - The disassembler (`dump`)
//!
//! Execution is not part of this crate: a `Program` only exposes its pools
//! and instruction list, and an interpreter elsewhere evaluates it against
//! records.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compare_op;
pub mod dump;
pub mod format;
pub mod instruction;
pub mod opcode;
pub mod pool;
pub mod program;

#[cfg(test)]
mod dump_tests;

pub use compare_op::CompareOp;
pub use dump::{dump, write_listing};
pub use format::{format_interval, width_for_count};
pub use instruction::{Instruction, LabelId, NO_INDEX, Operand};
pub use opcode::{Domain, Opcode};
pub use pool::{ConstantPool, ConstantPools, PoolOverflow};
pub use program::Program;

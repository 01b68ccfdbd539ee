//! The compiled artifact.

use std::net::IpAddr;

use crate::instruction::Instruction;
use crate::pool::ConstantPools;

/// A finished program: constant pools plus resolved instructions.
///
/// Instructions reference constants only by pool index. Jump operands are
/// absolute addresses into `instructions()`; no label pseudo-instructions
/// remain.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pools: ConstantPools,
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(pools: ConstantPools, instructions: Vec<Instruction>) -> Self {
        Self {
            pools,
            instructions,
        }
    }

    pub fn fields(&self) -> &[String] {
        self.pools.fields.as_slice()
    }

    pub fn strings(&self) -> &[String] {
        self.pools.strings.as_slice()
    }

    pub fn numbers(&self) -> &[f64] {
        self.pools.numbers.as_slice()
    }

    /// Epoch nanoseconds.
    pub fn datetimes(&self) -> &[i64] {
        self.pools.datetimes.as_slice()
    }

    pub fn ips(&self) -> &[IpAddr] {
        self.pools.ips.as_slice()
    }

    pub fn regexes(&self) -> &[String] {
        self.pools.regexes.as_slice()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

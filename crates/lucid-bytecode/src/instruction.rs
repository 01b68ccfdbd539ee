//! Instructions with variable-length operand lists.
//!
//! Pre-resolution instructions use `Operand::Label` for jump targets and
//! `Opcode::Label` pseudo-instructions to bind them. Label resolution strips
//! the pseudo-instructions and rewrites jump operands to `Operand::Addr`.

use crate::compare_op::CompareOp;
use crate::opcode::{Domain, Opcode};

/// Pool index marking an absent range bound.
pub const NO_INDEX: i32 = -1;

/// Symbolic jump target, only meaningful during emission.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LabelId(pub u32);

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Operand {
    Imm(i64),
    Float(f64),
    Bool(bool),
    /// Constant pool index, or `NO_INDEX`.
    Index(i32),
    Label(LabelId),
    /// Resolved absolute instruction address.
    Addr(u32),
}

impl Operand {
    pub fn as_index(self) -> Option<i32> {
        match self {
            Self::Index(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_label(self) -> Option<LabelId> {
        match self {
            Self::Label(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_addr(self) -> Option<u32> {
        match self {
            Self::Addr(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imm(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Index(NO_INDEX) => f.write_str("-"),
            Self::Index(i) => write!(f, "{i}"),
            Self::Label(l) => write!(f, "{l}"),
            Self::Addr(a) => write!(f, "{a}"),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Vec::new())
    }

    pub fn nop() -> Self {
        Self::bare(Opcode::Nop)
    }

    pub fn ret() -> Self {
        Self::bare(Opcode::Ret)
    }

    pub fn not() -> Self {
        Self::bare(Opcode::Not)
    }

    pub fn lda(value: i64) -> Self {
        Self::new(Opcode::Lda, vec![Operand::Imm(value)])
    }

    pub fn label(id: LabelId) -> Self {
        Self::new(Opcode::Label, vec![Operand::Label(id)])
    }

    pub fn jmp(target: LabelId) -> Self {
        Self::new(Opcode::Jmp, vec![Operand::Label(target)])
    }

    pub fn jz(target: LabelId) -> Self {
        Self::new(Opcode::Jz, vec![Operand::Label(target)])
    }

    pub fn jnz(target: LabelId) -> Self {
        Self::new(Opcode::Jnz, vec![Operand::Label(target)])
    }

    pub fn set_field(field: u32) -> Self {
        Self::new(Opcode::SetField, vec![index(field)])
    }

    /// Single-constant match such as `EQ.STR`, `REGEX` or `GT.NUM`.
    pub fn with_index(opcode: Opcode, idx: u32) -> Self {
        Self::new(opcode, vec![index(idx)])
    }

    pub fn compare(op: CompareOp, domain: Domain, idx: u32) -> Self {
        Self::with_index(Opcode::Compare(op, domain), idx)
    }

    pub fn range(
        domain: Domain,
        low: Option<u32>,
        high: Option<u32>,
        include_low: bool,
        include_high: bool,
    ) -> Self {
        Self::new(
            Opcode::Range(domain),
            vec![
                low.map_or(Operand::Index(NO_INDEX), index),
                high.map_or(Operand::Index(NO_INDEX), index),
                Operand::Bool(include_low),
                Operand::Bool(include_high),
            ],
        )
    }

    pub fn phrase(idx: u32, proximity: u32) -> Self {
        Self::new(
            Opcode::Phrase,
            vec![index(idx), Operand::Imm(i64::from(proximity))],
        )
    }

    pub fn in_cidr(ip: u32, prefix_len: u8) -> Self {
        Self::new(
            Opcode::InCidr,
            vec![index(ip), Operand::Imm(i64::from(prefix_len))],
        )
    }

    pub fn load_boost(boost: f64) -> Self {
        Self::new(Opcode::LoadBoost, vec![Operand::Float(boost)])
    }

    pub fn load_fuzz(fuzz: f64) -> Self {
        Self::new(Opcode::LoadFuzz, vec![Operand::Float(fuzz)])
    }

    pub fn operand(&self, n: usize) -> Option<Operand> {
        self.operands.get(n).copied()
    }

    pub fn is_label(&self) -> bool {
        self.opcode == Opcode::Label
    }

    /// Label bound by a `LABEL` pseudo-instruction.
    pub fn bound_label(&self) -> Option<LabelId> {
        if !self.is_label() {
            return None;
        }
        self.operand(0).and_then(Operand::as_label)
    }

    /// Unresolved jump target.
    pub fn target_label(&self) -> Option<LabelId> {
        if !self.opcode.is_jump() {
            return None;
        }
        self.operand(0).and_then(Operand::as_label)
    }

    /// Resolved jump target.
    pub fn target_addr(&self) -> Option<u32> {
        if !self.opcode.is_jump() {
            return None;
        }
        self.operand(0).and_then(Operand::as_addr)
    }

    /// Pool index operand at position `n`, `None` when absent or `NO_INDEX`.
    pub fn pool_index(&self, n: usize) -> Option<usize> {
        let i = self.operand(n)?.as_index()?;
        usize::try_from(i).ok()
    }
}

fn index(idx: u32) -> Operand {
    Operand::Index(i32::try_from(idx).unwrap_or(i32::MAX))
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(label) = self.bound_label() {
            return write!(f, "{label}:");
        }
        f.write_str(self.opcode.mnemonic())?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{operand}")?;
        }
        Ok(())
    }
}

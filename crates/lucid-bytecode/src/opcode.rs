//! Instruction opcodes.
//!
//! One authoritative table. Boolean structure is compiled to jumps, so
//! there are no stack-combining AND/OR opcodes: a match instruction sets the
//! condition flag, `JZ`/`JNZ` branch on it, and `NOT` inverts it.
//!
//! | Opcode          | Operands                          | Effect                                  |
//! | --------------- | --------------------------------- | --------------------------------------- |
//! | `NOP`           | -                                 | nothing                                 |
//! | `RET`           | -                                 | return the accumulator                  |
//! | `LDA`           | imm                               | accumulator = imm                       |
//! | `JMP`           | target                            | unconditional jump                      |
//! | `JZ` / `JNZ`    | target                            | jump if flag is clear / set             |
//! | `NOT`           | -                                 | flag = !flag                            |
//! | `LABEL`         | label                             | pseudo-instruction, stripped by resolve |
//! | `SET.FIELD`     | field                             | select the field under test             |
//! | `EQ.STR` ...    | string                            | string match on the selected field      |
//! | `REGEX`         | regex                             | pattern match                           |
//! | `PHRASE`        | string, proximity                 | phrase match within a window            |
//! | `EXISTS`        | field                             | field is present                        |
//! | `<CMP>.<DOM>`   | constant                          | ordered comparison                      |
//! | `RANGE.<DOM>`   | low, high, incl-low, incl-high    | interval test, `-1` marks an open side  |
//! | `IN.CIDR`       | ip, prefix length                 | address inside network                  |
//! | `LOAD.BOOST`    | f64                               | scoring metadata for the next match     |
//! | `LOAD.FUZZ`     | f64                               | fuzziness metadata for the next match   |

use crate::compare_op::CompareOp;

/// Value domain of ordered comparisons and ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Num,
    Time,
    Ip,
}

impl Domain {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Num => "NUM",
            Self::Time => "TIME",
            Self::Ip => "IP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    Ret,
    Lda,
    Jmp,
    Jz,
    Jnz,
    Not,
    Label,
    SetField,
    EqStr,
    NeqStr,
    Prefix,
    Glob,
    Regex,
    Phrase,
    Exists,
    Compare(CompareOp, Domain),
    Range(Domain),
    InCidr,
    LoadBoost,
    LoadFuzz,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        use CompareOp::*;
        use Domain::*;

        match self {
            Self::Nop => "NOP",
            Self::Ret => "RET",
            Self::Lda => "LDA",
            Self::Jmp => "JMP",
            Self::Jz => "JZ",
            Self::Jnz => "JNZ",
            Self::Not => "NOT",
            Self::Label => "LABEL",
            Self::SetField => "SET.FIELD",
            Self::EqStr => "EQ.STR",
            Self::NeqStr => "NEQ.STR",
            Self::Prefix => "PREFIX",
            Self::Glob => "GLOB",
            Self::Regex => "REGEX",
            Self::Phrase => "PHRASE",
            Self::Exists => "EXISTS",
            Self::Compare(Eq, Num) => "EQ.NUM",
            Self::Compare(Neq, Num) => "NEQ.NUM",
            Self::Compare(Lt, Num) => "LT.NUM",
            Self::Compare(Lte, Num) => "LTE.NUM",
            Self::Compare(Gt, Num) => "GT.NUM",
            Self::Compare(Gte, Num) => "GTE.NUM",
            Self::Compare(Eq, Time) => "EQ.TIME",
            Self::Compare(Neq, Time) => "NEQ.TIME",
            Self::Compare(Lt, Time) => "LT.TIME",
            Self::Compare(Lte, Time) => "LTE.TIME",
            Self::Compare(Gt, Time) => "GT.TIME",
            Self::Compare(Gte, Time) => "GTE.TIME",
            Self::Compare(Eq, Ip) => "EQ.IP",
            Self::Compare(Neq, Ip) => "NEQ.IP",
            Self::Compare(Lt, Ip) => "LT.IP",
            Self::Compare(Lte, Ip) => "LTE.IP",
            Self::Compare(Gt, Ip) => "GT.IP",
            Self::Compare(Gte, Ip) => "GTE.IP",
            Self::Range(Num) => "RANGE.NUM",
            Self::Range(Time) => "RANGE.TIME",
            Self::Range(Ip) => "RANGE.IP",
            Self::InCidr => "IN.CIDR",
            Self::LoadBoost => "LOAD.BOOST",
            Self::LoadFuzz => "LOAD.FUZZ",
        }
    }

    /// Jumps carry a single target operand.
    pub fn is_jump(self) -> bool {
        matches!(self, Self::Jmp | Self::Jz | Self::Jnz)
    }

    /// Control never falls through to the next instruction.
    pub fn is_terminator(self) -> bool {
        matches!(self, Self::Jmp | Self::Ret)
    }

    /// Pseudo-instructions never reach a finished program.
    pub fn is_pseudo(self) -> bool {
        matches!(self, Self::Label)
    }

    /// Inverted branch condition, for conditional jumps only.
    pub fn inverted_branch(self) -> Option<Self> {
        match self {
            Self::Jz => Some(Self::Jnz),
            Self::Jnz => Some(Self::Jz),
            _ => None,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

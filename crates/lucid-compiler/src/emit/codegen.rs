//! Continuation-passing code generation.
//!
//! Every node is emitted with a true label and a false label; control
//! reaches exactly one of them. Boolean structure lives entirely in jumps.

use lucid_bytecode::{ConstantPools, Domain, Instruction, LabelId, Opcode};

use crate::ir::{Bounds, Ir};

/// Generated code still carrying `LABEL` pseudo-instructions.
#[derive(Debug, Clone)]
pub struct Labeled {
    pub pools: ConstantPools,
    pub code: Vec<Instruction>,
}

/// Emit `ir` wrapped in the accumulator epilogue:
///
/// ```text
///   <body true=T false=F>
/// T:  LDA 1
///     JMP DONE
/// F:  LDA 0
/// DONE:
///     RET
/// ```
pub fn generate(ir: &Ir) -> Labeled {
    let mut codegen = Codegen::default();
    let on_true = codegen.fresh_label();
    let on_false = codegen.fresh_label();
    let done = codegen.fresh_label();

    codegen.node(ir, on_true, on_false);
    codegen.push(Instruction::label(on_true));
    codegen.push(Instruction::lda(1));
    codegen.push(Instruction::jmp(done));
    codegen.push(Instruction::label(on_false));
    codegen.push(Instruction::lda(0));
    codegen.push(Instruction::label(done));
    codegen.push(Instruction::ret());

    Labeled {
        pools: codegen.pools,
        code: codegen.code,
    }
}

#[derive(Default)]
struct Codegen {
    pools: ConstantPools,
    code: Vec<Instruction>,
    next_label: u32,
}

impl Codegen {
    fn fresh_label(&mut self) -> LabelId {
        let id = LabelId(self.next_label);
        self.next_label += 1;
        id
    }

    fn push(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    fn node(&mut self, ir: &Ir, on_true: LabelId, on_false: LabelId) {
        match ir {
            Ir::True => self.push(Instruction::jmp(on_true)),
            Ir::False => self.push(Instruction::jmp(on_false)),
            Ir::And(children) => {
                let Some((last, init)) = children.split_last() else {
                    self.push(Instruction::jmp(on_true));
                    return;
                };
                for child in init {
                    let next = self.fresh_label();
                    self.node(child, next, on_false);
                    self.push(Instruction::label(next));
                }
                self.node(last, on_true, on_false);
            }
            Ir::Or(children) => {
                let Some((last, init)) = children.split_last() else {
                    self.push(Instruction::jmp(on_false));
                    return;
                };
                for child in init {
                    let next = self.fresh_label();
                    self.node(child, on_true, next);
                    self.push(Instruction::label(next));
                }
                self.node(last, on_true, on_false);
            }
            Ir::Not(child) => {
                let splice = self.fresh_label();
                self.node(child, on_false, splice);
                self.push(Instruction::label(splice));
                self.push(Instruction::not());
                self.push(Instruction::jmp(on_true));
            }
            leaf => {
                self.leaf(leaf);
                self.push(Instruction::jnz(on_true));
                self.push(Instruction::jmp(on_false));
            }
        }
    }

    /// Field select, optional scoring metadata, then the match itself.
    fn leaf(&mut self, leaf: &Ir) {
        let Some(field) = leaf.field() else {
            return;
        };
        let field = self.pools.intern_field(field);
        self.push(Instruction::set_field(field));

        let matcher = match leaf {
            Ir::EqualsString { value, .. } => {
                Instruction::with_index(Opcode::EqStr, self.pools.intern_string(value))
            }
            Ir::NotEqualsString { value, .. } => {
                Instruction::with_index(Opcode::NeqStr, self.pools.intern_string(value))
            }
            Ir::Prefix { prefix, .. } => {
                Instruction::with_index(Opcode::Prefix, self.pools.intern_string(prefix))
            }
            Ir::Glob { pattern, .. } => {
                Instruction::with_index(Opcode::Glob, self.pools.intern_string(pattern))
            }
            Ir::Regex { pattern, .. } => {
                Instruction::with_index(Opcode::Regex, self.pools.intern_regex(pattern))
            }
            Ir::Phrase {
                text,
                proximity,
                fuzz,
                boost,
                ..
            } => {
                if let Some(boost) = boost {
                    self.push(Instruction::load_boost(*boost));
                }
                if let Some(fuzz) = fuzz {
                    self.push(Instruction::load_fuzz(*fuzz));
                }
                Instruction::phrase(self.pools.intern_string(text), *proximity)
            }
            Ir::Exists { .. } => Instruction::with_index(Opcode::Exists, field),
            Ir::CompareNumber { op, value, .. } => {
                Instruction::compare(*op, Domain::Num, self.pools.intern_number(*value))
            }
            Ir::CompareDateTime { op, value, .. } => {
                Instruction::compare(*op, Domain::Time, self.pools.intern_datetime(*value))
            }
            Ir::CompareIp { op, value, .. } => {
                Instruction::compare(*op, Domain::Ip, self.pools.intern_ip(*value))
            }
            Ir::RangeNumber { bounds, .. } => {
                let pools = &mut self.pools;
                range(Domain::Num, bounds, |v| pools.intern_number(v))
            }
            Ir::RangeDateTime { bounds, .. } => {
                let pools = &mut self.pools;
                range(Domain::Time, bounds, |v| pools.intern_datetime(v))
            }
            Ir::RangeIp { bounds, .. } => {
                let pools = &mut self.pools;
                range(Domain::Ip, bounds, |v| pools.intern_ip(v))
            }
            Ir::InCidr {
                network,
                prefix_len,
                ..
            } => Instruction::in_cidr(self.pools.intern_ip(*network), *prefix_len),
            Ir::And(_) | Ir::Or(_) | Ir::Not(_) | Ir::True | Ir::False => return,
        };
        self.push(matcher);
    }
}

fn range<T: Copy>(
    domain: Domain,
    bounds: &Bounds<T>,
    mut intern: impl FnMut(T) -> u32,
) -> Instruction {
    let low = bounds.low.map(&mut intern);
    let high = bounds.high.map(&mut intern);
    Instruction::range(domain, low, high, bounds.include_low, bounds.include_high)
}

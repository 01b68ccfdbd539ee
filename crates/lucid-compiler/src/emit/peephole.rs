//! Peephole rewrites over labeled code.
//!
//! One forward pass, before label resolution. Rewrites:
//! - `SET.FIELD f` when `f` is already selected on every path reaching it
//! - `NOT; NOT`
//! - `RANGE.<DOM> i, i, true, true` becomes `EQ.<DOM> i`
//! - a jump to a label bound in the run of labels right after it
//! - `Jcc L; JMP M; L:` becomes `Jinv M; L:`
//!
//! Field tracking merges the state of every jump into its target label, so
//! the redundant-select rule stays sound across branches. Labels targeted
//! from later in the code are entered with an unknown field.

use std::collections::{BTreeMap, BTreeSet};

use lucid_bytecode::{CompareOp, Instruction, LabelId, Opcode, Operand};
use tracing::trace;

/// Selected field operand; `None` when unknown.
type Selected = Option<Operand>;

pub fn optimize(code: Vec<Instruction>) -> Vec<Instruction> {
    let mut pass = Peephole {
        out: Vec::with_capacity(code.len()),
        selected: None,
        falls_through: true,
        incoming: BTreeMap::new(),
        backward: backward_targets(&code),
    };

    let mut i = 0;
    while i < code.len() {
        i += pass.step(&code, i);
    }
    pass.out
}

struct Peephole {
    out: Vec<Instruction>,
    selected: Selected,
    /// Control can reach the next instruction from the previous one.
    falls_through: bool,
    /// Merged field state of the jumps seen so far, per target.
    incoming: BTreeMap<LabelId, Selected>,
    backward: BTreeSet<LabelId>,
}

impl Peephole {
    /// Process `code[i]`, returning how many instructions were consumed.
    fn step(&mut self, code: &[Instruction], i: usize) -> usize {
        let insn = &code[i];
        match insn.opcode {
            Opcode::Label => self.bind(insn),
            opcode if opcode.is_jump() => return self.jump(code, i),
            Opcode::SetField => {
                let field = insn.operand(0);
                if self.falls_through && field.is_some() && self.selected == field {
                    trace!(at = i, "dropped redundant SET.FIELD");
                } else {
                    self.selected = field;
                    self.out.push(insn.clone());
                }
            }
            Opcode::Not => {
                if self.out.last().is_some_and(|prev| prev.opcode == Opcode::Not) {
                    trace!(at = i, "cancelled double NOT");
                    self.out.pop();
                } else {
                    self.out.push(insn.clone());
                }
            }
            Opcode::Range(domain) => {
                let low = insn.pool_index(0);
                let high = insn.pool_index(1);
                let closed = insn.operand(2).and_then(Operand::as_bool) == Some(true)
                    && insn.operand(3).and_then(Operand::as_bool) == Some(true);
                match (low, high) {
                    (Some(low), Some(high)) if low == high && closed => {
                        trace!(at = i, "collapsed degenerate range");
                        let eq = Instruction::new(
                            Opcode::Compare(CompareOp::Eq, domain),
                            vec![insn.operands[0]],
                        );
                        self.out.push(eq);
                    }
                    _ => self.out.push(insn.clone()),
                }
            }
            opcode => {
                self.out.push(insn.clone());
                if opcode.is_terminator() {
                    self.falls_through = false;
                }
            }
        }
        1
    }

    fn bind(&mut self, label: &Instruction) {
        let Some(id) = label.bound_label() else {
            self.out.push(label.clone());
            return;
        };
        let from_jumps = self.incoming.remove(&id);
        let state = match (self.falls_through.then_some(self.selected), from_jumps) {
            (Some(a), Some(b)) => merge(a, b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => None,
        };
        self.selected = if self.backward.contains(&id) {
            None
        } else {
            state
        };
        self.falls_through = true;
        self.out.push(label.clone());
    }

    fn jump(&mut self, code: &[Instruction], i: usize) -> usize {
        let insn = &code[i];
        let Some(target) = insn.target_label() else {
            self.out.push(insn.clone());
            return 1;
        };

        if falls_to(code, i + 1, target) {
            trace!(at = i, %target, "dropped jump to next");
            return 1;
        }

        if let Some(inverted) = insn.opcode.inverted_branch()
            && let Some(next) = code.get(i + 1)
            && next.opcode == Opcode::Jmp
            && let Some(other) = next.target_label()
            && falls_to(code, i + 2, target)
        {
            if falls_to(code, i + 2, other) {
                trace!(at = i, "dropped branch pair to next");
                return 2;
            }
            trace!(at = i, %target, %other, "inverted branch over jump");
            self.arrive(other);
            self.out.push(Instruction::new(inverted, next.operands.clone()));
            return 2;
        }

        self.arrive(target);
        self.out.push(insn.clone());
        if insn.opcode.is_terminator() {
            self.falls_through = false;
        }
        1
    }

    /// Record the current field state flowing into `target`.
    fn arrive(&mut self, target: LabelId) {
        if !self.falls_through {
            return;
        }
        let state = self.selected;
        self.incoming
            .entry(target)
            .and_modify(|s| *s = merge(*s, state))
            .or_insert(state);
    }
}

fn merge(a: Selected, b: Selected) -> Selected {
    if a == b { a } else { None }
}

/// `target` is bound in the run of labels starting at `code[from]`.
fn falls_to(code: &[Instruction], from: usize, target: LabelId) -> bool {
    code[from.min(code.len())..]
        .iter()
        .take_while(|insn| insn.is_label())
        .any(|insn| insn.bound_label() == Some(target))
}

/// Labels bound before some jump that targets them.
fn backward_targets(code: &[Instruction]) -> BTreeSet<LabelId> {
    let mut bound = BTreeSet::new();
    let mut backward = BTreeSet::new();
    for insn in code {
        if let Some(id) = insn.bound_label() {
            bound.insert(id);
        } else if let Some(target) = insn.target_label()
            && bound.contains(&target)
        {
            backward.insert(target);
        }
    }
    backward
}

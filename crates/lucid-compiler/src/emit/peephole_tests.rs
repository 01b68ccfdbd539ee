use indoc::indoc;
use lucid_bytecode::{Domain, Instruction, LabelId, Opcode};

use super::{generate, optimize};
use crate::ir::{Bounds, Ir};

fn l(n: u32) -> LabelId {
    LabelId(n)
}

fn listing(code: &[Instruction]) -> String {
    let mut out = String::new();
    for insn in code {
        out.push_str(&insn.to_string());
        out.push('\n');
    }
    out
}

fn optimized(code: Vec<Instruction>) -> String {
    listing(&optimize(code))
}

#[test]
fn double_not_cancels() {
    let code = vec![Instruction::not(), Instruction::not(), Instruction::ret()];
    assert_eq!(optimized(code), "RET\n");
}

#[test]
fn not_across_label_is_kept() {
    let code = vec![
        Instruction::not(),
        Instruction::label(l(0)),
        Instruction::not(),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "NOT\n@0:\nNOT\nRET\n");
}

#[test]
fn triple_not_leaves_one() {
    let code = vec![Instruction::not(), Instruction::not(), Instruction::not()];
    assert_eq!(optimized(code), "NOT\n");
}

#[test]
fn degenerate_range_becomes_equality() {
    let code = vec![Instruction::range(Domain::Num, Some(0), Some(0), true, true)];
    assert_eq!(optimized(code), "EQ.NUM 0\n");

    let code = vec![Instruction::range(Domain::Time, Some(2), Some(2), true, true)];
    assert_eq!(optimized(code), "EQ.TIME 2\n");
}

#[test]
fn other_ranges_are_kept() {
    let code = vec![
        Instruction::range(Domain::Num, Some(0), Some(0), true, false),
        Instruction::range(Domain::Num, Some(0), Some(1), true, true),
        Instruction::range(Domain::Ip, None, None, true, true),
    ];
    assert_eq!(
        optimized(code),
        indoc! {"
            RANGE.NUM 0, 0, true, false
            RANGE.NUM 0, 1, true, true
            RANGE.IP -, -, true, true
        "}
    );
}

#[test]
fn jump_to_next_is_dropped() {
    let code = vec![
        Instruction::jnz(l(0)),
        Instruction::label(l(0)),
        Instruction::jmp(l(2)),
        Instruction::label(l(1)),
        Instruction::label(l(2)),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "@0:\n@1:\n@2:\nRET\n");
}

#[test]
fn jump_past_real_instruction_is_kept() {
    let code = vec![
        Instruction::jmp(l(0)),
        Instruction::nop(),
        Instruction::label(l(0)),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "JMP @0\nNOP\n@0:\nRET\n");
}

#[test]
fn branch_over_jump_inverts() {
    let code = vec![
        Instruction::jnz(l(0)),
        Instruction::jmp(l(1)),
        Instruction::label(l(0)),
        Instruction::nop(),
        Instruction::label(l(1)),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "JZ @1\n@0:\nNOP\n@1:\nRET\n");

    let code = vec![
        Instruction::jz(l(0)),
        Instruction::jmp(l(1)),
        Instruction::label(l(0)),
        Instruction::nop(),
        Instruction::label(l(1)),
    ];
    assert_eq!(optimized(code), "JNZ @1\n@0:\nNOP\n@1:\n");
}

#[test]
fn branch_pair_to_next_vanishes() {
    let code = vec![
        Instruction::jnz(l(0)),
        Instruction::jmp(l(1)),
        Instruction::label(l(0)),
        Instruction::label(l(1)),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "@0:\n@1:\nRET\n");
}

#[test]
fn redundant_field_select_in_straight_line() {
    let code = vec![
        Instruction::set_field(0),
        Instruction::with_index(Opcode::EqStr, 0),
        Instruction::set_field(0),
        Instruction::with_index(Opcode::EqStr, 1),
        Instruction::set_field(1),
    ];
    assert_eq!(optimized(code), "SET.FIELD 0\nEQ.STR 0\nEQ.STR 1\nSET.FIELD 1\n");
}

#[test]
fn field_select_kept_when_paths_disagree() {
    let code = vec![
        Instruction::set_field(0),
        Instruction::jnz(l(0)),
        Instruction::set_field(1),
        Instruction::label(l(0)),
        Instruction::set_field(1),
        Instruction::ret(),
    ];
    assert_eq!(
        optimized(code),
        "SET.FIELD 0\nJNZ @0\nSET.FIELD 1\n@0:\nSET.FIELD 1\nRET\n"
    );
}

#[test]
fn field_select_dropped_when_paths_agree() {
    let code = vec![
        Instruction::set_field(0),
        Instruction::jnz(l(0)),
        Instruction::nop(),
        Instruction::label(l(0)),
        Instruction::set_field(0),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "SET.FIELD 0\nJNZ @0\nNOP\n@0:\nRET\n");
}

#[test]
fn label_reached_only_by_jumps_uses_their_state() {
    let code = vec![
        Instruction::set_field(0),
        Instruction::jmp(l(0)),
        Instruction::set_field(1),
        Instruction::label(l(0)),
        Instruction::set_field(0),
        Instruction::ret(),
    ];
    assert_eq!(
        optimized(code),
        "SET.FIELD 0\nJMP @0\nSET.FIELD 1\n@0:\nRET\n"
    );
}

#[test]
fn backward_target_forgets_field() {
    let code = vec![
        Instruction::set_field(0),
        Instruction::label(l(0)),
        Instruction::set_field(0),
        Instruction::jz(l(0)),
        Instruction::ret(),
    ];
    assert_eq!(
        optimized(code),
        "SET.FIELD 0\n@0:\nSET.FIELD 0\nJZ @0\nRET\n"
    );
}

#[test]
fn generated_leaf_is_tightened() {
    let code = generate(&Ir::eq("f", "a")).code;
    insta::assert_snapshot!(optimized(code), @r"
    SET.FIELD 0
    EQ.STR 0
    JZ @1
    @0:
    LDA 1
    JMP @2
    @1:
    LDA 0
    @2:
    RET
    ");
}

#[test]
fn generated_conjunction_on_one_field_selects_once() {
    let ir = Ir::And(vec![Ir::eq("f", "a"), Ir::eq("f", "b")]);
    let code = optimized(generate(&ir).code);
    assert!(code.starts_with(indoc! {"
        SET.FIELD 0
        EQ.STR 0
        JZ @1
        @3:
        EQ.STR 1
        JZ @1
        @0:
    "}));
}

#[test]
fn select_after_join_of_different_fields_is_kept() {
    let ir = Ir::And(vec![
        Ir::Or(vec![Ir::eq("f", "a"), Ir::eq("g", "b")]),
        Ir::eq("f", "c"),
    ]);
    let code = optimize(generate(&ir).code);
    let selects = code
        .iter()
        .filter(|i| i.opcode == Opcode::SetField)
        .count();
    assert_eq!(selects, 3);
}

#[test]
fn generated_degenerate_range() {
    let ir = Ir::range_number("level", Bounds::closed(5.0, 5.0));
    let labeled = generate(&ir);
    assert_eq!(labeled.pools.numbers.as_slice(), [5.0]);
    let code = optimized(labeled.code);
    assert!(code.starts_with("SET.FIELD 0\nEQ.NUM 0\n"), "{code}");
}

#[test]
fn select_after_terminator_is_kept() {
    let code = vec![
        Instruction::set_field(0),
        Instruction::ret(),
        Instruction::set_field(0),
        Instruction::ret(),
    ];
    assert_eq!(optimized(code), "SET.FIELD 0\nRET\nSET.FIELD 0\nRET\n");

    let code = vec![
        Instruction::set_field(0),
        Instruction::jmp(l(0)),
        Instruction::set_field(0),
        Instruction::label(l(0)),
        Instruction::ret(),
    ];
    assert_eq!(
        optimized(code),
        "SET.FIELD 0\nJMP @0\nSET.FIELD 0\n@0:\nRET\n"
    );
}

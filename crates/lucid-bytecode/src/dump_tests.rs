use std::net::{IpAddr, Ipv4Addr};

use indoc::indoc;
use lucid_core::Colors;

use crate::{CompareOp, ConstantPools, Domain, Instruction, Opcode, Operand, Program, dump};

fn jump(opcode: Opcode, addr: u32) -> Instruction {
    Instruction::new(opcode, vec![Operand::Addr(addr)])
}

fn level_eq_42() -> Program {
    let mut pools = ConstantPools::new();
    let field = pools.intern_field("level");
    let value = pools.intern_number(42.0);

    Program::new(
        pools,
        vec![
            Instruction::set_field(field),
            Instruction::compare(CompareOp::Eq, Domain::Num, value),
            jump(Opcode::Jz, 5),
            Instruction::lda(1),
            jump(Opcode::Jmp, 6),
            Instruction::lda(0),
            Instruction::ret(),
        ],
    )
}

#[test]
fn listing_with_labels_and_comments() {
    let out = dump(&level_eq_42(), Colors::OFF);

    assert_eq!(
        out,
        indoc! {r#"
            [fields]
            F0 "level"

            [numbers]
            N0 42

            [code]
              0  SET.FIELD  0     ; "level"
              1  EQ.NUM     0     ; = 42
              2  JZ         L001
              3  LDA        1
              4  JMP        L002
            L001:
              5  LDA        0
            L002:
              6  RET
        "#}
    );
}

#[test]
fn range_bounds_render_as_intervals() {
    let mut pools = ConstantPools::new();
    let field = pools.intern_field("level");
    let low = pools.intern_number(1.0);

    let program = Program::new(
        pools,
        vec![
            Instruction::set_field(field),
            Instruction::range(Domain::Num, Some(low), None, true, false),
            Instruction::ret(),
        ],
    );

    let out = dump(&program, Colors::OFF);
    assert!(out.contains("RANGE.NUM  0, -, true, false  ; [1..+∞)"), "{out}");
}

#[test]
fn cidr_and_regex_comments() {
    let mut pools = ConstantPools::new();
    let ip = pools.intern_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)));
    let re = pools.intern_regex("(?i)testing");

    let program = Program::new(
        pools,
        vec![
            Instruction::in_cidr(ip, 8),
            Instruction::with_index(Opcode::Regex, re),
            Instruction::ret(),
        ],
    );

    let out = dump(&program, Colors::OFF);
    assert!(out.contains("[ips]\nI0 10.0.0.0\n"), "{out}");
    assert!(out.contains("[regexes]\nR0 /(?i)testing/\n"), "{out}");
    assert!(out.contains("; 10.0.0.0/8"), "{out}");
    assert!(out.contains("; /(?i)testing/"), "{out}");
}

#[test]
fn labels_are_numbered_in_address_order() {
    let program = Program::new(
        ConstantPools::new(),
        vec![
            jump(Opcode::Jmp, 3),
            jump(Opcode::Jnz, 2),
            Instruction::nop(),
            Instruction::ret(),
        ],
    );

    let out = dump(&program, Colors::OFF);
    assert_eq!(
        out,
        "[code]\n  0  JMP  L002\n  1  JNZ  L001\nL001:\n  2  NOP\nL002:\n  3  RET\n"
    );
}

#[test]
fn colored_labels() {
    let out = dump(&level_eq_42(), Colors::ON);
    assert!(out.contains("\x1b[34mL001\x1b[0m:"));
    assert!(out.contains("\x1b[2m; = 42\x1b[0m"));
}

#[test]
fn empty_program() {
    let program = Program::new(ConstantPools::new(), Vec::new());
    assert_eq!(dump(&program, Colors::OFF), "[code]\n");
}

//! Human-readable program listing for debugging and documentation.
//!
//! Output layout:
//! ```text
//! [fields]
//! F0 "level"
//!
//! [numbers]
//! N0 42
//!
//! [code]
//!   0  SET.FIELD  0     ; "level"
//!   1  EQ.NUM     0     ; = 42
//!   2  JZ         L001
//!   3  LDA        1
//!   4  JMP        L002
//! L001:
//!   5  LDA        0
//! L002:
//!   6  RET
//! ```
//!
//! Jump targets get synthesized names (`L001`, `L002`, ...) in address order.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use lucid_core::Colors;

use crate::format::{cols, format_interval, pad_to, width_for_count};
use crate::instruction::{Instruction, NO_INDEX, Operand};
use crate::opcode::{Domain, Opcode};
use crate::program::Program;

/// Generate a listing of the whole program.
pub fn dump(program: &Program, colors: Colors) -> String {
    let mut out = String::new();
    write_listing(program, colors, &mut out).expect("String write never fails");
    out
}

/// Write the listing to any `fmt::Write` sink.
pub fn write_listing(program: &Program, colors: Colors, w: &mut impl Write) -> fmt::Result {
    let ctx = DumpContext::new(program, colors);
    dump_pools(w, program, &ctx)?;
    dump_code(w, program, &ctx)
}

/// Precomputed labels and column widths.
struct DumpContext<'p> {
    program: &'p Program,
    /// Jump target address to synthesized label name.
    labels: BTreeMap<u32, String>,
    addr_width: usize,
    opcode_width: usize,
    operand_width: usize,
    colors: Colors,
}

impl<'p> DumpContext<'p> {
    fn new(program: &'p Program, colors: Colors) -> Self {
        let code = program.instructions();

        let mut labels = BTreeMap::new();
        for addr in code.iter().filter_map(Instruction::target_addr) {
            labels.entry(addr).or_insert_with(String::new);
        }
        for (i, name) in labels.values_mut().enumerate() {
            *name = format!("L{:03}", i + 1);
        }

        let mut ctx = Self {
            program,
            labels,
            addr_width: width_for_count(code.len()),
            opcode_width: 0,
            operand_width: 0,
            colors,
        };
        ctx.opcode_width = code
            .iter()
            .map(|i| i.opcode.mnemonic().len())
            .max()
            .unwrap_or(0);
        ctx.operand_width = code
            .iter()
            .map(|i| ctx.format_operands(i).chars().count())
            .max()
            .unwrap_or(0);
        ctx
    }

    fn label_for(&self, addr: u32) -> Option<&str> {
        self.labels.get(&addr).map(String::as_str)
    }

    fn format_operands(&self, instr: &Instruction) -> String {
        instr
            .operands
            .iter()
            .map(|op| match op {
                Operand::Addr(a) => self
                    .label_for(*a)
                    .map(String::from)
                    .unwrap_or_else(|| a.to_string()),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Decoded comment for an instruction, empty when there is nothing to add.
    fn comment(&self, instr: &Instruction) -> String {
        let p = self.program;
        match instr.opcode {
            Opcode::SetField | Opcode::Exists => lookup(p.fields(), instr.pool_index(0))
                .map(|f| format!("{f:?}"))
                .unwrap_or_else(unresolved),
            Opcode::EqStr | Opcode::NeqStr | Opcode::Prefix | Opcode::Glob => {
                lookup(p.strings(), instr.pool_index(0))
                    .map(|s| format!("{s:?}"))
                    .unwrap_or_else(unresolved)
            }
            Opcode::Regex => lookup(p.regexes(), instr.pool_index(0))
                .map(|r| format!("/{r}/"))
                .unwrap_or_else(unresolved),
            Opcode::Phrase => {
                let text = lookup(p.strings(), instr.pool_index(0))
                    .map(|s| format!("{s:?}"))
                    .unwrap_or_else(unresolved);
                match instr.operand(1) {
                    Some(Operand::Imm(n)) if n > 0 => format!("{text}~{n}"),
                    _ => text,
                }
            }
            Opcode::Compare(op, domain) => {
                let value = self
                    .constant(domain, instr.pool_index(0))
                    .unwrap_or_else(unresolved);
                format!("{op} {value}")
            }
            Opcode::Range(domain) => {
                let low = self.bound(domain, instr.operand(0));
                let high = self.bound(domain, instr.operand(1));
                let include_low = instr.operand(2).and_then(Operand::as_bool) == Some(true);
                let include_high = instr.operand(3).and_then(Operand::as_bool) == Some(true);
                format_interval(low.as_deref(), high.as_deref(), include_low, include_high)
            }
            Opcode::InCidr => {
                let ip = lookup(p.ips(), instr.pool_index(0))
                    .map(ToString::to_string)
                    .unwrap_or_else(unresolved);
                match instr.operand(1) {
                    Some(Operand::Imm(len)) => format!("{ip}/{len}"),
                    _ => ip,
                }
            }
            _ => String::new(),
        }
    }

    fn constant(&self, domain: Domain, index: Option<usize>) -> Option<String> {
        let p = self.program;
        match domain {
            Domain::Num => lookup(p.numbers(), index).map(ToString::to_string),
            Domain::Time => lookup(p.datetimes(), index).map(ToString::to_string),
            Domain::Ip => lookup(p.ips(), index).map(ToString::to_string),
        }
    }

    /// Range bound text, `None` for an open side.
    fn bound(&self, domain: Domain, operand: Option<Operand>) -> Option<String> {
        match operand {
            Some(Operand::Index(NO_INDEX)) | None => None,
            Some(Operand::Index(i)) => Some(
                self.constant(domain, usize::try_from(i).ok())
                    .unwrap_or_else(unresolved),
            ),
            Some(other) => Some(other.to_string()),
        }
    }
}

fn lookup<T>(pool: &[T], index: Option<usize>) -> Option<&T> {
    index.and_then(|i| pool.get(i))
}

fn unresolved() -> String {
    "?".to_string()
}

fn dump_pools(w: &mut impl Write, program: &Program, ctx: &DumpContext) -> fmt::Result {
    let quoted = |s: &String| format!("{s:?}");
    dump_pool(w, ctx, "fields", 'F', program.fields(), quoted)?;
    dump_pool(w, ctx, "strings", 'S', program.strings(), quoted)?;
    dump_pool(w, ctx, "numbers", 'N', program.numbers(), ToString::to_string)?;
    dump_pool(w, ctx, "datetimes", 'D', program.datetimes(), ToString::to_string)?;
    dump_pool(w, ctx, "ips", 'I', program.ips(), ToString::to_string)?;
    dump_pool(w, ctx, "regexes", 'R', program.regexes(), |r| format!("/{r}/"))
}

fn dump_pool<T>(
    w: &mut impl Write,
    ctx: &DumpContext,
    title: &str,
    tag: char,
    values: &[T],
    render: impl Fn(&T) -> String,
) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    let c = &ctx.colors;
    let iw = width_for_count(values.len());

    writeln!(w, "{}[{title}]{}", c.blue, c.reset)?;
    for (i, v) in values.iter().enumerate() {
        writeln!(w, "{tag}{i:0iw$} {}{}{}", c.green, render(v), c.reset)?;
    }
    writeln!(w)
}

fn dump_code(w: &mut impl Write, program: &Program, ctx: &DumpContext) -> fmt::Result {
    let c = &ctx.colors;
    writeln!(w, "{}[code]{}", c.blue, c.reset)?;

    for (addr, instr) in program.instructions().iter().enumerate() {
        let addr = addr as u32;
        if let Some(label) = ctx.label_for(addr) {
            writeln!(w, "{}{label}{}:", c.blue, c.reset)?;
        }
        writeln!(w, "{}", format_line(addr, instr, ctx))?;
    }
    Ok(())
}

fn format_line(addr: u32, instr: &Instruction, ctx: &DumpContext) -> String {
    let c = &ctx.colors;
    let aw = ctx.addr_width;
    let gap = cols::GAP;

    let mut line = format!(
        "{:indent$}{addr:0aw$}{:gap$}{}",
        "",
        "",
        pad_to(instr.opcode.mnemonic(), ctx.opcode_width),
        indent = cols::INDENT,
    );

    let operands = ctx.format_operands(instr);
    let comment = ctx.comment(instr);
    if comment.is_empty() {
        if !operands.is_empty() {
            line.push_str(&format!("{:gap$}{operands}", ""));
        }
        return line.trim_end().to_string();
    }

    line.push_str(&format!(
        "{:gap$}{}{:gap$}{}; {comment}{}",
        "",
        pad_to(&operands, ctx.operand_width),
        "",
        c.dim,
        c.reset,
    ));
    line
}

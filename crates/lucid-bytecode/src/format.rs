//! Shared formatting utilities for the disassembler.
//!
//! Listing lines use a fixed column layout, auto-sized per program:
//! ```text
//! | 2 | addr | 2 | opcode | 2 | operands | 2 | ; comment |
//! ```

/// Column layout constants.
pub mod cols {
    /// Leading indentation (2 spaces).
    pub const INDENT: usize = 2;
    /// Gap between columns (2 spaces).
    pub const GAP: usize = 2;
}

/// Infinity glyphs for open interval ends.
pub const NEG_INF: &str = "-∞";
pub const POS_INF: &str = "+∞";

/// Calculate minimum width needed to display numbers up to `count - 1`.
pub fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10().floor() as usize + 1
    }
}

/// Render a range as an interval: `[lo..hi)`, `(lo..+∞)`, `(-∞..hi]`.
///
/// An absent bound is always open, whatever its inclusivity flag says.
pub fn format_interval(
    low: Option<&str>,
    high: Option<&str>,
    include_low: bool,
    include_high: bool,
) -> String {
    let open = if low.is_some() && include_low { '[' } else { '(' };
    let close = if high.is_some() && include_high { ']' } else { ')' };
    format!(
        "{open}{}..{}{close}",
        low.unwrap_or(NEG_INF),
        high.unwrap_or(POS_INF)
    )
}

/// Calculate display width of a string, ignoring ANSI escape sequences.
///
/// ANSI sequences have the form `\x1b[...m` and render as zero-width.
pub fn display_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;

    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Pad `s` with spaces to `width` display columns.
pub fn pad_to(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(s));
    format!("{s}{:pad$}", "")
}

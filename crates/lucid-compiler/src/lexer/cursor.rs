//! Character cursor with a single level of pushback.

use super::LexErrorKind;
use crate::span::Position;

pub(super) struct Cursor<'s> {
    source: &'s str,
    /// Position of the next character to read.
    pos: Position,
    /// Position before the most recent read.
    last: Position,
    /// The most recent read has been undone.
    unread: bool,
}

impl<'s> Cursor<'s> {
    pub(super) fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: Position::START,
            last: Position::START,
            unread: false,
        }
    }

    pub(super) fn pos(&self) -> Position {
        self.pos
    }

    pub(super) fn slice(&self, start: Position) -> &'s str {
        &self.source[start.offset..self.pos.offset]
    }

    /// Consume one character. At end of input returns `None`; a following
    /// `unread` is then a no-op.
    pub(super) fn read(&mut self) -> Option<char> {
        self.last = self.pos;
        self.unread = false;
        let c = self.source[self.pos.offset..].chars().next()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    /// Undo the most recent `read`. Only one level is kept.
    pub(super) fn unread(&mut self) -> Result<(), LexErrorKind> {
        if self.unread {
            return Err(LexErrorKind::DoubleUnread);
        }
        self.pos = self.last;
        self.unread = true;
        Ok(())
    }

    /// `read` then `unread`; uses up the pushback slot.
    pub(super) fn peek(&mut self) -> Result<Option<char>, LexErrorKind> {
        let c = self.read();
        self.unread()?;
        Ok(c)
    }

    /// Consume the next character if it equals `expected`.
    pub(super) fn eat(&mut self, expected: char) -> Result<bool, LexErrorKind> {
        if self.peek()? == Some(expected) {
            self.read();
            return Ok(true);
        }
        Ok(false)
    }
}

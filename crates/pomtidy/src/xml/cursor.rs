//! Byte cursor over the raw document

use crate::error::Pos;

/// Forward-only reader over the document bytes that keeps line/column
/// information for error reporting
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    at: Pos,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            at: Pos::new(0, 1, 1),
        }
    }

    pub fn current(&self) -> Option<u8> {
        self.input.get(self.at.offset).copied()
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.at.offset..).unwrap_or_default()
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.remaining().starts_with(pattern)
    }

    pub fn advance(&mut self) {
        let Some(byte) = self.current() else {
            return;
        };
        self.at.offset += 1;
        if byte == b'\n' {
            self.at.line += 1;
            self.at.col = 1;
        } else {
            self.at.col += 1;
        }
    }

    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Consume `pattern` if the input starts with it
    pub fn consume(&mut self, pattern: &[u8]) -> bool {
        let found = self.starts_with(pattern);
        if found {
            self.advance_by(pattern.len());
        }
        found
    }

    /// Consume bytes while `accept` holds and return them
    pub fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.at.offset;
        while self.current().is_some_and(&accept) {
            self.advance();
        }
        self.slice_from(start)
    }

    /// Bytes up to the next `terminator`, which is consumed but not returned.
    /// `None` when the input ends first.
    pub fn take_until(&mut self, terminator: &[u8]) -> Option<&'a [u8]> {
        let start = self.at.offset;
        while !self.is_eof() {
            if self.starts_with(terminator) {
                let taken = self.slice_from(start);
                self.advance_by(terminator.len());
                return Some(taken);
            }
            self.advance();
        }
        None
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    }

    pub const fn position(&self) -> Pos {
        self.at
    }

    pub const fn is_eof(&self) -> bool {
        self.at.offset >= self.input.len()
    }

    fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.at.offset).unwrap_or_default()
    }
}

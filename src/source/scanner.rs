//! memchr-accelerated cursor over XML text
//!
//! Every position the scanner stops at is an ASCII delimiter, so slices
//! taken between two positions are always on `char` boundaries.

use memchr::{memchr, memmem};

/// Cursor over the input text
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Text between two absolute positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Text from the cursor to the end of input
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    #[inline]
    pub fn starts_with(&self, needle: &str) -> bool {
        self.rest().starts_with(needle)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_position(self.pos + n);
    }

    /// Absolute position of the next `byte` at or after `from`
    #[inline]
    pub fn find_byte_from(&self, from: usize, byte: u8) -> Option<usize> {
        let bytes = self.input.as_bytes();
        if from >= bytes.len() {
            return None;
        }
        memchr(byte, &bytes[from..]).map(|i| from + i)
    }

    /// Absolute position of the next `needle` at or after `from`
    #[inline]
    pub fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        let bytes = self.input.as_bytes();
        if from >= bytes.len() {
            return None;
        }
        memmem::find(&bytes[from..], needle.as_bytes()).map(|i| from + i)
    }

    /// Position of the `>` closing the tag at the cursor, skipping quoted values
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let mut quote = None;
        for (pos, &b) in bytes.iter().enumerate().skip(self.pos) {
            match (quote, b) {
                (None, b'"' | b'\'') => quote = Some(b),
                (Some(q), _) if q == b => quote = None,
                (None, b'>') => return Some(pos),
                _ => {}
            }
        }
        None
    }

    /// Position of the `>` closing a DOCTYPE, skipping an internal subset
    pub fn find_doctype_end(&self) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let mut in_subset = false;
        for (pos, &b) in bytes.iter().enumerate().skip(self.pos) {
            match b {
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Some(pos),
                _ => {}
            }
        }
        None
    }

    #[inline]
    pub fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Read an XML name at the cursor
    pub fn read_name(&mut self) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() || !is_name_start_char(bytes[start]) {
            return None;
        }
        let mut end = start + 1;
        while end < bytes.len() && is_name_char(bytes[end]) {
            end += 1;
        }
        self.pos = end;
        Some(&self.input[start..end])
    }
}

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// ASCII letters, underscore, colon, and any non-ASCII byte
#[inline]
pub(crate) fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
pub(crate) fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

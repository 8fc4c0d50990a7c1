//! Shared document value backed by a rope.
//!
//! All offsets in the crate are character offsets. The cursor calculus only
//! needs O(1) length and O(k) slice of the edited span, which the rope
//! provides; hosts with modest documents could swap in a flat string behind
//! the same interface.

use ropey::Rope;

/// Returns true for chars in the navigation word class.
pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// The shared text value one or more users edit.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Creates a document from a string.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns true if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The character at `char_idx`, if in bounds.
    pub fn char_at(&self, char_idx: usize) -> Option<char> {
        if char_idx < self.len_chars() {
            Some(self.rope.char(char_idx))
        } else {
            None
        }
    }

    /// Replaces the character range `[start, end)` with `text`.
    /// Out-of-range bounds are clamped.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len_chars();
        let start = start.min(len);
        let end = end.min(len).max(start);
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
    }

    /// The text of the character range `[start, end)`, bounds clamped.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.len_chars();
        let start = start.min(len);
        let end = end.min(len).max(start);
        self.rope.slice(start..end).to_string()
    }

    /// Converts a character index to a 0-indexed (line, column) pair.
    pub fn char_to_line_col(&self, char_idx: usize) -> (usize, usize) {
        let char_idx = char_idx.min(self.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let col = char_idx - self.rope.line_to_char(line);
        (line, col)
    }

    /// Converts a 0-indexed (line, column) pair to a character index,
    /// clamping the column to the line length.
    pub fn line_col_to_char(&self, line: usize, col: usize) -> usize {
        if line >= self.len_lines() {
            return self.len_chars();
        }
        self.rope.line_to_char(line) + col.min(self.line_len_chars(line))
    }

    /// Length of a line in characters, excluding the newline.
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Character index of the start of a line.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }

    /// Character index of the end of a line (before its newline).
    pub fn line_end(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line) + self.line_len_chars(line)
        }
    }

    /// Column of the first non-whitespace character on a line, or the line
    /// length when the line is blank.
    pub fn first_non_whitespace_col(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let line_len = self.line_len_chars(line);
        let mut col = 0;
        while col < line_len && slice.char(col).is_whitespace() {
            col += 1;
        }
        col
    }

    /// Next word boundary to the left of `pos`: skips any separators, then
    /// the word run they precede.
    pub fn word_boundary_left(&self, pos: usize) -> usize {
        let mut i = pos.min(self.len_chars());
        while i > 0 && !is_word_char(self.rope.char(i - 1)) {
            i -= 1;
        }
        while i > 0 && is_word_char(self.rope.char(i - 1)) {
            i -= 1;
        }
        i
    }

    /// Next word boundary to the right of `pos`: skips any separators, then
    /// the word run that follows.
    pub fn word_boundary_right(&self, pos: usize) -> usize {
        let len = self.len_chars();
        let mut i = pos.min(len);
        while i < len && !is_word_char(self.rope.char(i)) {
            i += 1;
        }
        while i < len && is_word_char(self.rope.char(i)) {
            i += 1;
        }
        i
    }

    /// The entire document as a string.
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

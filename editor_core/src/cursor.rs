//! Cursor state and the pure edit calculus.
//!
//! A cursor is one selection endpoint pair plus vertical-navigation column
//! memory. Every `calculate_*` operation is pure: it takes the text it may
//! touch and returns the replacement text together with the deltas needed
//! to re-synchronize this cursor and everything behind the edit. Applying
//! the result to the document is the caller's job.

use crate::language::LanguageDescriptor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which endpoint leads the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Caret placement after an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InsertAdjust {
    /// Caret lands after the inserted text.
    #[default]
    None,
    /// The entire inserted text ends up selected.
    SelectAll,
    /// Caret is repositioned inside the inserted text (negative = step
    /// back from its end). Used for auto-close pairs and completions.
    Offset(i64),
}

/// One replaced span, as (start, removed chars, inserted chars).
///
/// Coordinates are relative to whatever text the producing operation was
/// handed; `User` rebases them to document offsets before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextEdit {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl TextEdit {
    /// Net length change.
    pub fn length_delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }
}

/// Result of one `calculate_*` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// Replacement for the text the operation was handed.
    pub text: String,
    /// Shift of this cursor's (selection start, selection end).
    pub selection_delta: [isize; 2],
    /// Net length change of the text.
    pub length_delta: isize,
    /// The replaced span, when text actually changed.
    pub edit: Option<TextEdit>,
}

impl EditOutcome {
    fn unchanged(value: &str) -> Self {
        Self {
            text: value.to_string(),
            selection_delta: [0, 0],
            length_delta: 0,
            edit: None,
        }
    }
}

/// Line-bounded context around a selection: the full line(s) it touches,
/// their absolute span, and the partial text at each edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    /// Full text of the touched lines, without the surrounding newlines.
    pub text: String,
    /// Offset of the first touched line's start.
    pub start: usize,
    /// Offset of the last touched line's end (before its newline).
    pub end: usize,
    /// Text between the line start and the selection start.
    pub prefix: String,
    /// Text between the selection end and the line end.
    pub suffix: String,
}

/// One selection endpoint pair. `offset` remembers the furthest column
/// reached during a streak of vertical moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cursor {
    pub pivot: usize,
    pub position: usize,
    pub offset: usize,
}

impl Cursor {
    /// A collapsed cursor at `pos`.
    pub fn new(pos: usize) -> Self {
        Self {
            pivot: pos,
            position: pos,
            offset: 0,
        }
    }

    /// A cursor spanning `pivot..position` (either order).
    pub fn with_range(pivot: usize, position: usize) -> Self {
        Self {
            pivot,
            position,
            offset: 0,
        }
    }

    pub fn selection_start(&self) -> usize {
        self.pivot.min(self.position)
    }

    pub fn selection_end(&self) -> usize {
        self.pivot.max(self.position)
    }

    pub fn selection_len(&self) -> usize {
        self.selection_end() - self.selection_start()
    }

    pub fn has_selection(&self) -> bool {
        self.pivot != self.position
    }

    pub fn direction(&self) -> Direction {
        if self.pivot <= self.position {
            Direction::Ltr
        } else {
            Direction::Rtl
        }
    }

    /// Sets both endpoints.
    pub fn select(&mut self, pivot: usize, position: usize) {
        self.pivot = pivot;
        self.position = position;
    }

    /// Collapses both endpoints onto `pos`.
    pub fn move_to(&mut self, pos: usize) {
        self.pivot = pos;
        self.position = pos;
    }

    /// Moves the leading endpoint only, extending the selection.
    pub fn highlight(&mut self, pos: usize) {
        self.position = pos;
    }

    /// Re-orients the cursor over `start..end` keeping `direction`.
    pub fn set_range_directed(&mut self, start: usize, end: usize, direction: Direction) {
        match direction {
            Direction::Ltr => {
                self.pivot = start;
                self.position = end;
            }
            Direction::Rtl => {
                self.pivot = end;
                self.position = start;
            }
        }
    }

    /// Applies a (start delta, end delta) pair, preserving direction.
    pub fn shift(&mut self, delta: [isize; 2]) {
        let start = (self.selection_start() as isize + delta[0]).max(0) as usize;
        let end = ((self.selection_end() as isize + delta[1]).max(0) as usize).max(start);
        self.set_range_directed(start, end, self.direction());
    }

    /// Remaps both endpoints through a foreign edit: offsets before the
    /// span stay, offsets after shift by the length delta, offsets inside
    /// land on the span's new boundary.
    pub fn rebase(&mut self, edit: &TextEdit) {
        self.pivot = rebase_offset(self.pivot, edit);
        self.position = rebase_offset(self.position, edit);
    }

    /// Clips both endpoints to `[0, len]`.
    pub fn clamp(&mut self, len: usize) {
        self.pivot = self.pivot.min(len);
        self.position = self.position.min(len);
    }

    // ==================== Edit operations ====================

    /// Replaces the selection with `text`.
    ///
    /// Priority rules: a lone newline auto-indents (unless `plain_newline`
    /// says the caret sits in a string/comment); a single complement char
    /// over a non-empty selection wraps it; otherwise multi-line text is
    /// re-indented relative to the current line before insertion.
    pub fn calculate_insert_text(
        &self,
        value: &str,
        text: &str,
        adjust: InsertAdjust,
        cursor_length: usize,
        lang: &LanguageDescriptor,
        plain_newline: bool,
    ) -> EditOutcome {
        let chars: Vec<char> = value.chars().collect();
        let s = self.selection_start().min(chars.len());
        let e = self.selection_end().min(chars.len());

        if text == "\n" && !plain_newline {
            return self.insert_newline(&chars, s, e, lang);
        }

        let mut text_chars: Vec<char> = text.chars().collect();

        if e > s && text_chars.len() == 1 && adjust == InsertAdjust::None {
            if let Some(close) = lang.complement_of(text_chars[0]) {
                let mut new: Vec<char> = Vec::with_capacity(chars.len() + 2);
                new.extend_from_slice(&chars[..s]);
                new.push(text_chars[0]);
                new.extend_from_slice(&chars[s..e]);
                new.push(close);
                new.extend_from_slice(&chars[e..]);
                return EditOutcome {
                    text: new.into_iter().collect(),
                    selection_delta: [1, 1],
                    length_delta: 2,
                    edit: Some(TextEdit {
                        start: s,
                        removed: e - s,
                        inserted: e - s + 2,
                    }),
                };
            }
        }

        if text_chars.contains(&'\n') {
            let line_start = line_start_of(&chars, s);
            let indent: String = chars[line_start..s]
                .iter()
                .take_while(|c| **c == ' ' || **c == '\t')
                .collect();
            text_chars = reindent(text, &indent).chars().collect();
        }

        let ins_len = text_chars.len();
        let mut new: Vec<char> = Vec::with_capacity(chars.len() - (e - s) + ins_len);
        new.extend_from_slice(&chars[..s]);
        new.extend_from_slice(&text_chars);
        new.extend_from_slice(&chars[e..]);
        let new_len = new.len();

        let (new_start, new_end) = match adjust {
            InsertAdjust::SelectAll => (s, s + ins_len),
            InsertAdjust::Offset(n) => {
                let caret = offset_within(s + ins_len, n, s, s + ins_len);
                (caret, (caret + cursor_length).min(new_len))
            }
            InsertAdjust::None => {
                let caret = s + ins_len;
                (caret, (caret + cursor_length).min(new_len))
            }
        };

        EditOutcome {
            text: new.into_iter().collect(),
            selection_delta: [
                new_start as isize - s as isize,
                new_end as isize - e as isize,
            ],
            length_delta: ins_len as isize - (e - s) as isize,
            edit: Some(TextEdit {
                start: s,
                removed: e - s,
                inserted: ins_len,
            }),
        }
    }

    fn insert_newline(
        &self,
        chars: &[char],
        s: usize,
        e: usize,
        lang: &LanguageDescriptor,
    ) -> EditOutcome {
        let line_start = line_start_of(chars, s);
        let mut indent = String::new();
        let mut i = line_start;
        while i < s && (chars[i] == ' ' || chars[i] == '\t') {
            indent.push(chars[i]);
            i += 1;
        }
        // carry a list bullet into the new line
        if i + 1 < s && matches!(chars[i], '-' | '*' | '+') && chars[i + 1] == ' ' {
            indent.push(chars[i]);
            indent.push(' ');
        }

        let left = if s > 0 { Some(chars[s - 1]) } else { None };
        let right = chars.get(e).copied();

        let mut insert = String::from("\n");
        insert.push_str(&indent);
        let mut trailing = String::new();
        if let Some(open) = left {
            if let Some(&close) = lang.tab_complements.get(&open) {
                insert.push_str(&lang.tab_unit());
                if right == Some(close) {
                    trailing.push('\n');
                    trailing.push_str(&indent);
                }
            }
        }

        let insert_len = insert.chars().count();
        let trailing_len = trailing.chars().count();
        let caret = s + insert_len;

        let mut new: Vec<char> = Vec::with_capacity(chars.len() + insert_len + trailing_len);
        new.extend_from_slice(&chars[..s]);
        new.extend(insert.chars());
        new.extend(trailing.chars());
        new.extend_from_slice(&chars[e..]);

        EditOutcome {
            text: new.into_iter().collect(),
            selection_delta: [caret as isize - s as isize, caret as isize - e as isize],
            length_delta: (insert_len + trailing_len) as isize - (e - s) as isize,
            edit: Some(TextEdit {
                start: s,
                removed: e - s,
                inserted: insert_len + trailing_len,
            }),
        }
    }

    /// Deletes the selection, or `amount` chars forward (positive) /
    /// backward (negative) from the caret, clamped to the text bounds.
    pub fn calculate_remove_text(&self, value: &str, amount: i64) -> EditOutcome {
        let chars: Vec<char> = value.chars().collect();
        let s = self.selection_start().min(chars.len());
        let e = self.selection_end().min(chars.len());

        let (start, removed) = if e > s {
            (s, e - s)
        } else if amount > 0 {
            (e, (amount as usize).min(chars.len() - e))
        } else {
            let k = (amount.unsigned_abs() as usize).min(s);
            (s - k, k)
        };
        if removed == 0 {
            return EditOutcome::unchanged(value);
        }

        let mut new: Vec<char> = Vec::with_capacity(chars.len() - removed);
        new.extend_from_slice(&chars[..start]);
        new.extend_from_slice(&chars[start + removed..]);

        EditOutcome {
            text: new.into_iter().collect(),
            selection_delta: [start as isize - s as isize, start as isize - e as isize],
            length_delta: -(removed as isize),
            edit: Some(TextEdit {
                start,
                removed,
                inserted: 0,
            }),
        }
    }

    /// Replaces the full line-span touching the selection with `text`.
    /// The replacement ends up selected.
    pub fn calculate_insert_lines(&self, value: &str, text: &str) -> EditOutcome {
        let ctx = self.selection_context(value);
        let chars: Vec<char> = value.chars().collect();
        let s = self.selection_start().min(chars.len());
        let e = self.selection_end().min(chars.len());

        let ins_len = text.chars().count();
        let mut new: Vec<char> =
            Vec::with_capacity(chars.len() - (ctx.end - ctx.start) + ins_len);
        new.extend_from_slice(&chars[..ctx.start]);
        new.extend(text.chars());
        new.extend_from_slice(&chars[ctx.end..]);

        EditOutcome {
            text: new.into_iter().collect(),
            selection_delta: [
                ctx.start as isize - s as isize,
                (ctx.start + ins_len) as isize - e as isize,
            ],
            length_delta: ins_len as isize - (ctx.end - ctx.start) as isize,
            edit: Some(TextEdit {
                start: ctx.start,
                removed: ctx.end - ctx.start,
                inserted: ins_len,
            }),
        }
    }

    /// Adds one tab-stop in front of every non-empty affected line.
    pub fn calculate_add_indent(&self, value: &str, lang: &LanguageDescriptor) -> EditOutcome {
        let ctx = self.selection_context(value);
        let unit = lang.tab_unit();
        let new_text = ctx
            .text
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    line.to_string()
                } else {
                    format!("{unit}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.calculate_insert_lines(value, &new_text)
    }

    /// Removes up to one tab-stop from every affected line; a partial stop
    /// is removed when fewer leading tab chars exist.
    pub fn calculate_remove_indent(&self, value: &str, lang: &LanguageDescriptor) -> EditOutcome {
        let ctx = self.selection_context(value);
        let unit_len = lang.tab_unit().chars().count();
        let new_text = ctx
            .text
            .split('\n')
            .map(|line| {
                let lead = line
                    .chars()
                    .take_while(|&c| c == lang.tab_char)
                    .count()
                    .min(unit_len);
                line.chars().skip(lead).collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.calculate_insert_lines(value, &new_text)
    }

    /// Comments all non-blank affected lines if any of them lacks the
    /// comment prefix, otherwise uncomments all of them.
    pub fn calculate_toggle_comment(&self, value: &str, lang: &LanguageDescriptor) -> EditOutcome {
        if lang.comment_string.is_empty() {
            return EditOutcome::unchanged(value);
        }
        let ctx = self.selection_context(value);
        let prefix = lang.comment_string.as_str();
        let lines: Vec<&str> = ctx.text.split('\n').collect();

        let needs_comment = lines
            .iter()
            .any(|l| !l.trim().is_empty() && !l.trim_start().starts_with(prefix));

        let new_lines: Vec<String> = lines
            .iter()
            .map(|line| {
                if line.trim().is_empty() {
                    return line.to_string();
                }
                let ws_chars = line.chars().take_while(|c| c.is_whitespace()).count();
                let split = line
                    .char_indices()
                    .nth(ws_chars)
                    .map(|(b, _)| b)
                    .unwrap_or(line.len());
                let (head, tail) = line.split_at(split);
                if needs_comment {
                    format!("{head}{prefix} {tail}")
                } else {
                    let rest = tail.strip_prefix(prefix).unwrap_or(tail);
                    let rest = rest.strip_prefix(' ').unwrap_or(rest);
                    format!("{head}{rest}")
                }
            })
            .collect();

        self.calculate_insert_lines(value, &new_lines.join("\n"))
    }

    /// The line-bounded context around the selection — the shared
    /// primitive behind every multi-line operation.
    pub fn selection_context(&self, value: &str) -> SelectionContext {
        let chars: Vec<char> = value.chars().collect();
        let s = self.selection_start().min(chars.len());
        let e = self.selection_end().min(chars.len());
        let start = line_start_of(&chars, s);
        let end = line_end_of(&chars, e);
        SelectionContext {
            text: chars[start..end].iter().collect(),
            start,
            end,
            prefix: chars[start..s].iter().collect(),
            suffix: chars[e..end].iter().collect(),
        }
    }
}

fn rebase_offset(p: usize, edit: &TextEdit) -> usize {
    if p <= edit.start {
        p
    } else if p >= edit.start + edit.removed {
        p - edit.removed + edit.inserted
    } else {
        edit.start + edit.inserted
    }
}

fn offset_within(base: usize, delta: i64, lo: usize, hi: usize) -> usize {
    (base as i64 + delta).clamp(lo as i64, hi as i64) as usize
}

fn line_start_of(chars: &[char], pos: usize) -> usize {
    let mut i = pos.min(chars.len());
    while i > 0 && chars[i - 1] != '\n' {
        i -= 1;
    }
    i
}

fn line_end_of(chars: &[char], pos: usize) -> usize {
    let mut i = pos.min(chars.len());
    while i < chars.len() && chars[i] != '\n' {
        i += 1;
    }
    i
}

/// Re-indents pasted multi-line text relative to `indent`, stripping the
/// minimum indentation of the non-blank lines after the first.
fn reindent(text: &str, indent: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return text.to_string();
    }
    let baseline = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|&c| c == ' ' || c == '\t').count())
        .min();
    let Some(baseline) = baseline else {
        return text.to_string();
    };

    let mut out = String::from(lines[0]);
    for line in &lines[1..] {
        out.push('\n');
        if line.trim().is_empty() {
            out.push_str(line);
        } else {
            let lead = line.chars().take_while(|&c| c == ' ' || c == '\t').count();
            out.push_str(indent);
            out.push_str(&line.chars().skip(baseline.min(lead)).collect::<String>());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js() -> LanguageDescriptor {
        LanguageDescriptor::javascript()
    }

    fn insert(cursor: &Cursor, value: &str, text: &str) -> EditOutcome {
        cursor.calculate_insert_text(value, text, InsertAdjust::None, 0, &js(), false)
    }

    #[test]
    fn test_selection_accessors() {
        let cursor = Cursor::with_range(10, 5);
        assert_eq!(cursor.selection_start(), 5);
        assert_eq!(cursor.selection_end(), 10);
        assert_eq!(cursor.direction(), Direction::Rtl);
        assert!(cursor.has_selection());
    }

    #[test]
    fn test_shift_preserves_direction() {
        let mut cursor = Cursor::with_range(10, 5);
        cursor.shift([2, 3]);
        assert_eq!(cursor.selection_start(), 7);
        assert_eq!(cursor.selection_end(), 13);
        assert_eq!(cursor.direction(), Direction::Rtl);
    }

    #[test]
    fn test_plain_insert() {
        let cursor = Cursor::new(2);
        let out = insert(&cursor, "abcd", "xy");
        assert_eq!(out.text, "abxycd");
        assert_eq!(out.selection_delta, [2, 2]);
        assert_eq!(out.length_delta, 2);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let cursor = Cursor::with_range(1, 3);
        let out = insert(&cursor, "abcd", "Z");
        // Z bears no complement, so no wrapping
        assert_eq!(out.text, "aZd");
        assert_eq!(out.selection_delta, [1, -1]);
        assert_eq!(out.length_delta, -1);
    }

    #[test]
    fn test_newline_copies_indent() {
        let cursor = Cursor::new(4);
        let out = insert(&cursor, "  ab", "\n");
        assert_eq!(out.text, "  ab\n  ");
        assert_eq!(out.selection_delta, [3, 3]);
    }

    #[test]
    fn test_newline_carries_bullet() {
        let cursor = Cursor::new(6);
        let out = insert(&cursor, "- item", "\n");
        assert_eq!(out.text, "- item\n- ");
    }

    #[test]
    fn test_newline_after_open_brace_indents_deeper() {
        // caret between `{` and the newline
        let cursor = Cursor::new(8);
        let out = insert(&cursor, "if (x) {\n  y\n}", "\n");
        assert_eq!(out.text, "if (x) {\n  \n  y\n}");
        // caret ends on the blank indented line
        assert_eq!(out.selection_delta, [3, 3]);
    }

    #[test]
    fn test_newline_between_braces_opens_closing_line() {
        let cursor = Cursor::new(1);
        let out = insert(&cursor, "{}", "\n");
        assert_eq!(out.text, "{\n  \n}");
        assert_eq!(out.selection_delta, [3, 3]);
        assert_eq!(out.length_delta, 4);
    }

    #[test]
    fn test_newline_suppressed_in_string() {
        let cursor = Cursor::new(4);
        let out = cursor.calculate_insert_text("  ab", "\n", InsertAdjust::None, 0, &js(), true);
        assert_eq!(out.text, "  ab\n");
        assert_eq!(out.selection_delta, [1, 1]);
    }

    #[test]
    fn test_wrap_selection_in_complements() {
        let cursor = Cursor::with_range(0, 5);
        let out = insert(&cursor, "hello", "(");
        assert_eq!(out.text, "(hello)");
        // selection still covers the original content
        assert_eq!(out.selection_delta, [1, 1]);
        assert_eq!(out.length_delta, 2);
    }

    #[test]
    fn test_wrap_applies_to_quotes() {
        let cursor = Cursor::with_range(0, 2);
        let out = insert(&cursor, "hi", "\"");
        assert_eq!(out.text, "\"hi\"");
    }

    #[test]
    fn test_explicit_adjust_disables_wrap() {
        let cursor = Cursor::with_range(0, 2);
        let out =
            cursor.calculate_insert_text("hi", "(", InsertAdjust::Offset(0), 0, &js(), false);
        assert_eq!(out.text, "(");
    }

    #[test]
    fn test_multiline_insert_reindents() {
        let cursor = Cursor::new(5);
        let out = insert(&cursor, "  foo", "a\n    b\n      c");
        assert_eq!(out.text, "  fooa\n  b\n    c");
    }

    #[test]
    fn test_adjust_offset_and_cursor_length() {
        let cursor = Cursor::new(0);
        let out =
            cursor.calculate_insert_text("", "()", InsertAdjust::Offset(-1), 0, &js(), false);
        assert_eq!(out.text, "()");
        // caret stepped back between the pair
        assert_eq!(out.selection_delta, [1, 1]);

        let out =
            cursor.calculate_insert_text("", "abc", InsertAdjust::Offset(-3), 3, &js(), false);
        assert_eq!(out.selection_delta, [0, 3]);
    }

    #[test]
    fn test_select_all_inserted() {
        let cursor = Cursor::with_range(1, 3);
        let out =
            cursor.calculate_insert_text("abcd", "xyz", InsertAdjust::SelectAll, 0, &js(), false);
        assert_eq!(out.text, "axyzd");
        assert_eq!(out.selection_delta, [0, 1]); // [1, 4] from [1, 3]
    }

    #[test]
    fn test_remove_selection_ignores_amount() {
        let cursor = Cursor::with_range(1, 3);
        let out = cursor.calculate_remove_text("abcd", 1);
        assert_eq!(out.text, "ad");
        assert_eq!(out.selection_delta, [0, -2]);
        assert_eq!(out.length_delta, -2);
    }

    #[test]
    fn test_remove_forward_and_backward() {
        let cursor = Cursor::new(2);
        let out = cursor.calculate_remove_text("abcd", 1);
        assert_eq!(out.text, "abd");
        assert_eq!(out.selection_delta, [0, 0]);

        let out = cursor.calculate_remove_text("abcd", -1);
        assert_eq!(out.text, "acd");
        assert_eq!(out.selection_delta, [-1, -1]);
    }

    #[test]
    fn test_remove_clamps_to_bounds() {
        let cursor = Cursor::new(1);
        let out = cursor.calculate_remove_text("ab", -5);
        assert_eq!(out.text, "b");
        assert_eq!(out.length_delta, -1);

        let out = cursor.calculate_remove_text("ab", 5);
        assert_eq!(out.text, "a");
        assert_eq!(out.length_delta, -1);

        let cursor = Cursor::new(0);
        let out = cursor.calculate_remove_text("ab", -1);
        assert_eq!(out.text, "ab");
        assert_eq!(out.edit, None);
    }

    #[test]
    fn test_insert_then_remove_round_trips() {
        let cursor = Cursor::new(2);
        let out = insert(&cursor, "abcd", "xy");
        assert_eq!(out.text, "abxycd");

        let mut after = cursor;
        after.shift(out.selection_delta);
        assert_eq!(after.position, 4);

        let back = after.calculate_remove_text(&out.text, -2);
        assert_eq!(back.text, "abcd");
        let mut restored = after;
        restored.shift(back.selection_delta);
        assert_eq!(restored.position, 2);
    }

    #[test]
    fn test_selection_context() {
        let cursor = Cursor::with_range(5, 9);
        let ctx = cursor.selection_context("ab\ncdef\nghi\njk");
        assert_eq!(ctx.text, "cdef\nghi");
        assert_eq!(ctx.start, 3);
        assert_eq!(ctx.end, 11);
        assert_eq!(ctx.prefix, "cd");
        assert_eq!(ctx.suffix, "hi");
    }

    #[test]
    fn test_insert_lines_replaces_line_span() {
        let cursor = Cursor::new(5);
        let out = cursor.calculate_insert_lines("ab\ncdef\ngh", "XY");
        assert_eq!(out.text, "ab\nXY\ngh");
        // replacement is selected
        assert_eq!(out.selection_delta, [-2, 0]);
    }

    #[test]
    fn test_add_indent() {
        let cursor = Cursor::with_range(0, 8);
        let out = cursor.calculate_add_indent("ab\ncd\nef", &js());
        assert_eq!(out.text, "  ab\n  cd\n  ef");
    }

    #[test]
    fn test_remove_indent_with_partial_stop() {
        let cursor = Cursor::with_range(0, 11);
        let out = cursor.calculate_remove_indent("  ab\n cd\nef", &js());
        assert_eq!(out.text, "ab\ncd\nef");
    }

    #[test]
    fn test_toggle_comment_round_trip() {
        let cursor = Cursor::new(3);
        let out = cursor.calculate_toggle_comment("  foo", &js());
        assert_eq!(out.text, "  // foo");

        let cursor = Cursor::new(3);
        let back = cursor.calculate_toggle_comment(&out.text, &js());
        assert_eq!(back.text, "  foo");
    }

    #[test]
    fn test_toggle_comment_mixed_state_comments_all() {
        let cursor = Cursor::with_range(0, 8);
        let out = cursor.calculate_toggle_comment("a\n// b\nc", &js());
        assert_eq!(out.text, "// a\n// // b\n// c");
    }

    #[test]
    fn test_toggle_comment_skips_blank_lines() {
        let cursor = Cursor::with_range(0, 4);
        let out = cursor.calculate_toggle_comment("a\n\nb", &js());
        assert_eq!(out.text, "// a\n\n// b");
    }

    #[test]
    fn test_rebase_through_foreign_edit() {
        // a foreign user replaced [2, 5) with 2 chars
        let edit = TextEdit {
            start: 2,
            removed: 3,
            inserted: 2,
        };
        let mut before = Cursor::new(1);
        before.rebase(&edit);
        assert_eq!(before.position, 1);

        let mut after = Cursor::new(10);
        after.rebase(&edit);
        assert_eq!(after.position, 9);

        let mut inside = Cursor::new(4);
        inside.rebase(&edit);
        assert_eq!(inside.position, 4); // start + inserted
    }

    #[test]
    fn test_clamp() {
        let mut cursor = Cursor::with_range(4, 9);
        cursor.clamp(6);
        assert_eq!(cursor.pivot, 4);
        assert_eq!(cursor.position, 6);
    }
}

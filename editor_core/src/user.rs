//! One participant's ordered cursor set and action application.
//!
//! A user owns at least one cursor. The front of the list is the primary
//! (most recently created) cursor; after every action the set is collapsed
//! so ranges are non-overlapping, non-touching, and sorted ascending.

use crate::action::{Action, MoveDirection};
use crate::cursor::{Cursor, EditOutcome, TextEdit};
use crate::document::Document;
use crate::language::LanguageDescriptor;
use crate::lexical::LexicalMask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One editing participant.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    pub id: String,
    pub display_name: String,
    /// Render color, as a CSS-style hex string.
    pub color: String,
    cursors: Vec<Cursor>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            color: color.into(),
            cursors: vec![Cursor::new(0)],
        }
    }

    /// Read-only view of the cursor list, for rendering queries.
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    /// The primary (front) cursor.
    pub fn primary(&self) -> &Cursor {
        &self.cursors[0]
    }

    pub(crate) fn set_cursors(&mut self, cursors: Vec<Cursor>) {
        if !cursors.is_empty() {
            self.cursors = cursors;
        }
    }

    /// Prepends a cursor at `pos`; it becomes the new primary.
    pub fn create_cursor(&mut self, pos: usize) {
        self.cursors.insert(0, Cursor::new(pos));
    }

    /// Collapses to a single cursor with column memory cleared.
    pub fn reset_cursor(&mut self) {
        let mut primary = self.cursors[0];
        primary.offset = 0;
        self.cursors = vec![primary];
    }

    /// Removes the most recently created cursor; at least one remains.
    pub fn destroy_last_cursor(&mut self) {
        if self.cursors.len() > 1 {
            self.cursors.remove(0);
        }
    }

    /// Select-next-occurrence: adds a cursor on the next occurrence of the
    /// primary selection's text that no cursor claims yet, wrapping to the
    /// earliest free occurrence, preserving the primary's direction.
    pub fn create_next_cursor(&mut self, value: &str) {
        let primary = self.cursors[0];
        if !primary.has_selection() {
            return;
        }
        let chars: Vec<char> = value.chars().collect();
        let s = primary.selection_start().min(chars.len());
        let e = primary.selection_end().min(chars.len());
        let needle = &chars[s..e];
        if needle.is_empty() {
            return;
        }

        let taken: Vec<usize> = self.cursors.iter().map(Cursor::selection_start).collect();
        let occurrences = occurrences_of(&chars, needle);
        let next = occurrences
            .iter()
            .copied()
            .find(|o| *o >= e && !taken.contains(o))
            .or_else(|| occurrences.iter().copied().find(|o| !taken.contains(o)));

        if let Some(start) = next {
            let mut cursor = Cursor::new(0);
            cursor.set_range_directed(start, start + needle.len(), primary.direction());
            self.cursors.insert(0, cursor);
            self.collapse_cursors();
        }
    }

    /// Sorts cursors by selection start and merges overlapping or touching
    /// ranges; the earlier cursor's direction wins.
    pub fn collapse_cursors(&mut self) {
        if self.cursors.len() <= 1 {
            return;
        }
        let mut sorted = std::mem::take(&mut self.cursors);
        sorted.sort_by_key(|c| (c.selection_start(), c.selection_end()));

        let mut merged: Vec<Cursor> = Vec::with_capacity(sorted.len());
        for cursor in sorted {
            match merged.last_mut() {
                Some(last) if cursor.selection_start() <= last.selection_end() => {
                    let start = last.selection_start();
                    let end = last.selection_end().max(cursor.selection_end());
                    let direction = last.direction();
                    last.set_range_directed(start, end, direction);
                }
                _ => merged.push(cursor),
            }
        }
        self.cursors = merged;
    }

    /// Remaps every cursor through a foreign user's ordered edits.
    pub fn rebase(&mut self, edits: &[TextEdit]) {
        for edit in edits {
            for cursor in &mut self.cursors {
                cursor.rebase(edit);
            }
        }
        self.collapse_cursors();
    }

    /// Clips every cursor to `[0, len]`.
    pub fn clamp(&mut self, len: usize) {
        for cursor in &mut self.cursors {
            cursor.clamp(len);
        }
    }

    fn reset_offsets(&mut self) {
        for cursor in &mut self.cursors {
            cursor.offset = 0;
        }
    }

    // ==================== Movement ====================

    /// Jumps every cursor to the document start or end.
    pub fn move_cursors_by_document(
        &mut self,
        doc: &Document,
        direction: MoveDirection,
        expand: bool,
    ) {
        let target = if direction.is_backward() {
            0
        } else {
            doc.len_chars()
        };
        for cursor in &mut self.cursors {
            if expand {
                cursor.highlight(target);
            } else {
                cursor.move_to(target);
            }
        }
        self.collapse_cursors();
    }

    /// Line home/end. Home toggles between column 0 and the first
    /// non-whitespace column.
    pub fn move_cursors_by_line(
        &mut self,
        doc: &Document,
        direction: MoveDirection,
        expand: bool,
    ) {
        for cursor in &mut self.cursors {
            let (line, _) = doc.char_to_line_col(cursor.position);
            let target = if direction.is_backward() {
                let line_start = doc.line_start(line);
                let fnw_col = doc.first_non_whitespace_col(line);
                if fnw_col >= doc.line_len_chars(line) {
                    line_start // blank line
                } else if cursor.position == line_start + fnw_col {
                    line_start
                } else {
                    line_start + fnw_col
                }
            } else {
                doc.line_end(line)
            };
            if expand {
                cursor.highlight(target);
            } else {
                cursor.move_to(target);
            }
        }
        self.collapse_cursors();
    }

    /// Word-boundary jumps.
    pub fn move_cursors_by_word(
        &mut self,
        doc: &Document,
        direction: MoveDirection,
        expand: bool,
    ) {
        for cursor in &mut self.cursors {
            let target = if direction.is_backward() {
                doc.word_boundary_left(cursor.position)
            } else {
                doc.word_boundary_right(cursor.position)
            };
            if expand {
                cursor.highlight(target);
            } else {
                cursor.move_to(target);
            }
        }
        self.collapse_cursors();
    }

    /// Character/line movement. Horizontal moves collapse a selection to
    /// its edge first (unless expanding); vertical moves keep the furthest
    /// column reached across the streak; `create` spawns a cursor at the
    /// primary's target instead of moving.
    pub fn move_cursors(
        &mut self,
        doc: &Document,
        direction: MoveDirection,
        amount: usize,
        expand: bool,
        create: bool,
    ) {
        if create {
            let target = if direction.is_vertical() {
                vertical_target(doc, self.primary(), direction, amount).0
            } else {
                horizontal_target(doc, self.primary(), direction, amount)
            };
            self.create_cursor(target);
            self.collapse_cursors();
            return;
        }

        for cursor in &mut self.cursors {
            if direction.is_vertical() {
                let (target, desired) = vertical_target(doc, cursor, direction, amount);
                if expand {
                    cursor.highlight(target);
                } else {
                    cursor.move_to(target);
                }
                cursor.offset = desired;
            } else if cursor.has_selection() && !expand {
                let edge = if direction.is_backward() {
                    cursor.selection_start()
                } else {
                    cursor.selection_end()
                };
                cursor.move_to(edge);
            } else {
                let target = horizontal_target(doc, cursor, direction, amount);
                if expand {
                    cursor.highlight(target);
                } else {
                    cursor.move_to(target);
                }
            }
        }
        self.collapse_cursors();
    }

    // ==================== Dispatch ====================

    /// Applies one validated action, mutating the document through this
    /// user's cursors. Returns the ordered edits performed, in document
    /// coordinates, for rebasing other users.
    pub fn apply(
        &mut self,
        action: &Action,
        doc: &mut Document,
        lang: &LanguageDescriptor,
        mask: &LexicalMask,
    ) -> Vec<TextEdit> {
        let len = doc.len_chars();
        let mut edits = Vec::new();

        match action {
            Action::Select { pivot, position } => {
                self.cursors = vec![Cursor::with_range((*pivot).min(len), (*position).min(len))];
            }
            Action::ResetCursor => self.reset_cursor(),
            Action::CollapseCursors => {}
            Action::CreateCursor { position } => {
                let pos = position.unwrap_or(self.primary().position).min(len);
                self.create_cursor(pos);
            }
            Action::CreateNextCursor => self.create_next_cursor(&doc.to_string()),
            Action::DestroyLastCursor => self.destroy_last_cursor(),
            Action::MoveCursors {
                direction,
                amount,
                expand,
                create_cursor,
            } => self.move_cursors(doc, *direction, *amount, *expand, *create_cursor),
            Action::MoveCursorsByLine { direction, expand } => {
                self.move_cursors_by_line(doc, *direction, *expand)
            }
            Action::MoveCursorsByWord { direction, expand } => {
                self.move_cursors_by_word(doc, *direction, *expand)
            }
            Action::MoveCursorsByDocument { direction, expand } => {
                self.move_cursors_by_document(doc, *direction, *expand)
            }
            Action::InsertText {
                text,
                adjust,
                cursor_length,
            } => {
                edits = self.apply_text_op(doc, |local, window, original| {
                    let probe = original.selection_start();
                    let plain = probe > 0
                        && (mask.in_string(probe - 1) || mask.in_comment(probe - 1));
                    local.calculate_insert_text(window, text, *adjust, *cursor_length, lang, plain)
                });
            }
            Action::RemoveText { amount } => {
                edits = self.apply_text_op(doc, |local, window, _| {
                    local.calculate_remove_text(window, *amount)
                });
            }
            Action::InsertLines { text } => {
                edits = self.apply_text_op(doc, |local, window, _| {
                    local.calculate_insert_lines(window, text)
                });
            }
            Action::AddIndent => {
                edits = self.apply_text_op(doc, |local, window, _| {
                    local.calculate_add_indent(window, lang)
                });
            }
            Action::RemoveIndent => {
                edits = self.apply_text_op(doc, |local, window, _| {
                    local.calculate_remove_indent(window, lang)
                });
            }
            Action::ToggleComment => {
                edits = self.apply_text_op(doc, |local, window, _| {
                    local.calculate_toggle_comment(window, lang)
                });
            }
            Action::NoOp => {}
        }

        let vertical_streak =
            matches!(action, Action::MoveCursors { direction, .. } if direction.is_vertical());
        if !vertical_streak {
            self.reset_offsets();
        }
        self.clamp(doc.len_chars());
        self.collapse_cursors();
        edits
    }

    /// Runs a `calculate_*` operation cursor-by-cursor, ascending, over
    /// the minimal line-bounded window spanning the outermost cursors.
    /// The closure receives the window-rebased cursor, the current window
    /// text, and the original cursor (for absolute lexical probes).
    fn apply_text_op<F>(&mut self, doc: &mut Document, op: F) -> Vec<TextEdit>
    where
        F: Fn(&Cursor, &str, &Cursor) -> EditOutcome,
    {
        let mut order: Vec<usize> = (0..self.cursors.len()).collect();
        order.sort_by_key(|&i| {
            (
                self.cursors[i].selection_start(),
                self.cursors[i].selection_end(),
            )
        });

        let first = self.cursors[order[0]].selection_start();
        let last = self.cursors[order[order.len() - 1]].selection_end();
        let (first_line, _) = doc.char_to_line_col(first);
        let (last_line, _) = doc.char_to_line_col(last);
        let lo = doc.line_start(first_line);
        let hi = doc.line_end(last_line);

        let mut window = doc.slice(lo, hi);
        let mut edits: Vec<TextEdit> = Vec::new();
        let mut acc: isize = 0;

        for &i in &order {
            let original = self.cursors[i];
            let start = (original.selection_start() as isize - lo as isize + acc).max(0) as usize;
            let end = ((original.selection_end() as isize - lo as isize + acc).max(0) as usize)
                .max(start);
            let mut local = original;
            local.set_range_directed(start, end, original.direction());

            let outcome = op(&local, &window, &original);
            window = outcome.text;
            if let Some(edit) = outcome.edit {
                edits.push(TextEdit {
                    start: lo + edit.start,
                    removed: edit.removed,
                    inserted: edit.inserted,
                });
            }
            local.shift(outcome.selection_delta);
            let mut updated = original;
            updated.set_range_directed(
                lo + local.selection_start(),
                lo + local.selection_end(),
                original.direction(),
            );
            self.cursors[i] = updated;
            acc += outcome.length_delta;
        }

        doc.replace(lo, hi, &window);
        edits
    }
}

fn horizontal_target(
    doc: &Document,
    cursor: &Cursor,
    direction: MoveDirection,
    amount: usize,
) -> usize {
    if direction.is_backward() {
        cursor.position.saturating_sub(amount)
    } else {
        (cursor.position + amount).min(doc.len_chars())
    }
}

/// Returns (target offset, column to remember) for a vertical move.
fn vertical_target(
    doc: &Document,
    cursor: &Cursor,
    direction: MoveDirection,
    amount: usize,
) -> (usize, usize) {
    let (line, col) = doc.char_to_line_col(cursor.position);
    let desired = col.max(cursor.offset);
    if direction.is_backward() {
        if line == 0 {
            (0, desired)
        } else {
            let target_line = line.saturating_sub(amount);
            (doc.line_col_to_char(target_line, desired), desired)
        }
    } else {
        let last = doc.len_lines() - 1;
        if line >= last {
            (doc.len_chars(), desired)
        } else {
            let target_line = (line + amount).min(last);
            (doc.line_col_to_char(target_line, desired), desired)
        }
    }
}

fn occurrences_of(chars: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > chars.len() {
        return Vec::new();
    }
    (0..=chars.len() - needle.len())
        .filter(|&i| &chars[i..i + needle.len()] == needle)
        .collect()
}

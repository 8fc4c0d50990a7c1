//! Offset-based lexical classification and complement matching.
//!
//! The classifier is a deliberate heuristic, not a grammar: three regex
//! passes per value change (strings, comments, blocks), each masking its
//! matches so later passes cannot match inside them. The result is a
//! per-offset class table that makes `in_string`/`in_comment`/`in_block`
//! O(1) point queries.

use crate::language::LanguageDescriptor;
use regex::Regex;

/// Maximum distance the complement walks travel in either direction.
pub const COMPLEMENT_SEARCH_LIMIT: usize = 1024;

/// Stand-in for characters already claimed by an earlier pass.
const MASK_SENTINEL: char = '\u{E000}';

/// Classification of one character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexClass {
    Plain,
    Str,
    Comment,
    Block,
}

/// Compiled per-language scanner. Rebuilt when the active language changes,
/// reused across rescans.
#[derive(Debug)]
pub struct LexicalScanner {
    passes: Vec<(Regex, LexClass)>,
}

impl LexicalScanner {
    /// Compiles the three passes for one descriptor. Passes with no
    /// delimiters are omitted.
    pub fn new(lang: &LanguageDescriptor) -> Self {
        let mut passes = Vec::new();

        let mut string_pats: Vec<String> = Vec::new();
        for (open, close) in &lang.multi_line_strings {
            string_pats.push(format!(
                "{}(?s:.)*?(?:{}|$)",
                regex::escape(open),
                regex::escape(close)
            ));
        }
        for quote in lang.single_line_quotes() {
            let q = regex::escape(&quote.to_string());
            // escape-aware; an unterminated string stops before the newline
            string_pats.push(format!(r"{q}(?:\\.|[^\\{q}\n])*{q}?"));
        }
        if let Some(re) = compile_alternation(&string_pats) {
            passes.push((re, LexClass::Str));
        }

        let comment_pats: Vec<String> = lang
            .comments
            .iter()
            .map(|(open, close)| region_pattern(open, close))
            .collect();
        if let Some(re) = compile_alternation(&comment_pats) {
            passes.push((re, LexClass::Comment));
        }

        let block_pats: Vec<String> = lang
            .blocks
            .iter()
            .map(|(open, close)| region_pattern(open, close))
            .collect();
        if let Some(re) = compile_alternation(&block_pats) {
            passes.push((re, LexClass::Block));
        }

        Self { passes }
    }

    /// Classifies every character offset of `value`.
    pub fn scan(&self, value: &str) -> LexicalMask {
        let char_len = value.chars().count();
        let mut classes = vec![LexClass::Plain; char_len];
        if char_len == 0 || self.passes.is_empty() {
            return LexicalMask { classes };
        }

        let mut masked = value.to_string();
        for (pass_idx, (re, class)) in self.passes.iter().enumerate() {
            let mut touched = false;
            let mut last_byte = 0usize;
            let mut last_char = 0usize;
            for m in re.find_iter(&masked) {
                let start_char = last_char + masked[last_byte..m.start()].chars().count();
                let match_chars = m.as_str().chars().count();
                for slot in classes[start_char..start_char + match_chars].iter_mut() {
                    // earlier passes win over later ones
                    if *slot == LexClass::Plain {
                        *slot = *class;
                        touched = true;
                    }
                }
                last_byte = m.end();
                last_char = start_char + match_chars;
            }
            if touched && pass_idx + 1 < self.passes.len() {
                masked = value
                    .chars()
                    .zip(classes.iter())
                    .map(|(c, class)| {
                        if *class == LexClass::Plain {
                            c
                        } else {
                            MASK_SENTINEL
                        }
                    })
                    .collect();
            }
        }
        LexicalMask { classes }
    }
}

fn region_pattern(open: &str, close: &str) -> String {
    if close == "\n" {
        format!("{}[^\n]*", regex::escape(open))
    } else {
        format!(
            "{}(?s:.)*?(?:{}|$)",
            regex::escape(open),
            regex::escape(close)
        )
    }
}

fn compile_alternation(patterns: &[String]) -> Option<Regex> {
    if patterns.is_empty() {
        return None;
    }
    let joined = patterns.join("|");
    Some(Regex::new(&joined).expect("generated lexical pattern is valid"))
}

/// Per-offset classification of one document version.
#[derive(Debug, Clone, Default)]
pub struct LexicalMask {
    classes: Vec<LexClass>,
}

impl LexicalMask {
    /// An empty mask (every query answers `Plain`).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class at `offset`; out-of-range offsets are plain.
    pub fn class(&self, offset: usize) -> LexClass {
        self.classes.get(offset).copied().unwrap_or(LexClass::Plain)
    }

    pub fn in_string(&self, offset: usize) -> bool {
        self.class(offset) == LexClass::Str
    }

    pub fn in_comment(&self, offset: usize) -> bool {
        self.class(offset) == LexClass::Comment
    }

    pub fn in_block(&self, offset: usize) -> bool {
        self.class(offset) == LexClass::Block
    }

    /// Finds the bracket (or quote) pair enclosing `offset`.
    ///
    /// Inside a string the enclosing quote span is returned, rejecting
    /// spans that cross a newline unless the opener is a multi-line string
    /// delimiter. Outside, a leftward walk with a reverse-complement stack
    /// locates the open bracket and a mirrored rightward walk its
    /// counterpart, skipping string/comment offsets. Both walks give up
    /// after [`COMPLEMENT_SEARCH_LIMIT`] characters.
    pub fn find_complements(
        &self,
        value: &str,
        offset: usize,
        lang: &LanguageDescriptor,
    ) -> Option<(usize, usize)> {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let offset = offset.min(chars.len() - 1);

        if self.in_string(offset) {
            return self.enclosing_quote_span(&chars, offset, lang);
        }

        // leftward: find the unbalanced open bracket
        let mut expect_open: Vec<char> = Vec::new();
        let mut open: Option<(usize, char)> = None;
        let lower = offset.saturating_sub(COMPLEMENT_SEARCH_LIMIT);
        let mut i = offset as isize;
        while i >= lower as isize {
            let idx = i as usize;
            if !(self.in_string(idx) || self.in_comment(idx)) {
                let c = chars[idx];
                if let Some(&opener) = lang.reverse_complements().get(&c) {
                    expect_open.push(opener);
                } else if lang.forward_complements.contains_key(&c) {
                    if expect_open.last() == Some(&c) {
                        expect_open.pop();
                    } else {
                        open = Some((idx, c));
                        break;
                    }
                }
            }
            i -= 1;
        }
        let (open_idx, open_char) = open?;
        let close_char = *lang.forward_complements.get(&open_char)?;

        // rightward: mirrored stack down to the matching close bracket
        let mut expect_close = vec![close_char];
        let upper = (open_idx + 1).saturating_add(COMPLEMENT_SEARCH_LIMIT).min(chars.len());
        for idx in (open_idx + 1)..upper {
            if self.in_string(idx) || self.in_comment(idx) {
                continue;
            }
            let c = chars[idx];
            if let Some(&close) = lang.forward_complements.get(&c) {
                expect_close.push(close);
            } else if expect_close.last() == Some(&c) {
                expect_close.pop();
                if expect_close.is_empty() {
                    return Some((open_idx, idx));
                }
            }
        }
        None
    }

    fn enclosing_quote_span(
        &self,
        chars: &[char],
        offset: usize,
        lang: &LanguageDescriptor,
    ) -> Option<(usize, usize)> {
        let lower = offset.saturating_sub(COMPLEMENT_SEARCH_LIMIT);
        let mut start = offset;
        while start > lower && self.in_string(start - 1) {
            start -= 1;
        }
        if start > 0 && self.in_string(start - 1) {
            return None; // run start beyond the search bound
        }

        let upper = offset
            .saturating_add(COMPLEMENT_SEARCH_LIMIT)
            .min(chars.len() - 1);
        let mut end = offset;
        while end < upper && self.in_string(end + 1) {
            end += 1;
        }
        if end + 1 < chars.len() && self.in_string(end + 1) {
            return None;
        }

        let opener_is_multi_line = lang.multi_line_strings.iter().any(|(open, _)| {
            let open_chars: Vec<char> = open.chars().collect();
            chars[start..].starts_with(&open_chars)
        });
        if !opener_is_multi_line && chars[start..=end].contains(&'\n') {
            return None;
        }
        Some((start, end))
    }
}

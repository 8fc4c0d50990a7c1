//! Phrase completion backed by a per-language reverse trie.
//!
//! Every prefix of every canned phrase is indexed by its characters read
//! backward, so a lookup can walk straight backward from the caret and
//! land on the phrase whose typed head is the longest.

use std::collections::HashMap;

use crate::document::is_word_char;

/// A suggested completion, ready to feed to `InsertText`: inserting
/// `text` with the given adjust and cursor length leaves the suffix
/// selected so the next keystroke can replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The unconsumed tail of the matched phrase.
    pub text: String,
    /// `InsertText` adjust: steps the caret back to the suffix start.
    pub adjust: i64,
    /// `InsertText` cursor length: selects the inserted suffix.
    pub cursor_length: usize,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    phrase: Option<usize>,
}

/// Per-language phrase index.
#[derive(Debug, Default)]
pub struct Completer {
    tries: HashMap<String, TrieNode>,
    phrases: Vec<String>,
}

impl Completer {
    /// An empty completer; every lookup answers `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A completer seeded with the built-in phrase sets.
    pub fn with_builtins() -> Self {
        let mut completer = Self::new();
        completer.add_phrases(
            "javascript",
            &[
                "function",
                "return",
                "typeof",
                "instanceof",
                "continue",
                "prototype",
                "document.getElementById(",
                "console.log(",
            ],
        );
        completer.add_phrases(
            "rust",
            &[
                "println!(",
                "return",
                "continue",
                "impl ",
                "match ",
                "struct ",
            ],
        );
        completer.add_phrases(
            "python",
            &["import ", "return", "continue", "lambda", "print(", "def "],
        );
        completer
    }

    /// Indexes `phrases` for `language`. When two phrases share a typed
    /// head, the one registered first wins.
    pub fn add_phrases(&mut self, language: &str, phrases: &[&str]) {
        let root = self.tries.entry(language.to_string()).or_default();
        for &phrase in phrases {
            let idx = self.phrases.len();
            self.phrases.push(phrase.to_string());
            let chars: Vec<char> = phrase.chars().collect();
            for prefix_len in 1..=chars.len() {
                let mut node = &mut *root;
                for &c in chars[..prefix_len].iter().rev() {
                    node = node.children.entry(c).or_default();
                }
                if node.phrase.is_none() {
                    node.phrase = Some(idx);
                }
            }
        }
    }

    /// Completes the text before the caret. Returns the longest
    /// legally-bounded match's unconsumed suffix, or `None` (unknown
    /// language, no match, or the phrase is already fully typed).
    pub fn suggest(&self, line: &str, language: &str) -> Option<Completion> {
        let root = self.tries.get(language)?;
        let chars: Vec<char> = line.chars().collect();

        let mut node = root;
        let mut depth = 0;
        let mut best: Option<(usize, usize)> = None; // (phrase index, consumed)
        for &c in chars.iter().rev() {
            let Some(next) = node.children.get(&c) else {
                break;
            };
            node = next;
            depth += 1;
            if let Some(idx) = node.phrase {
                let phrase_len = self.phrases[idx].chars().count();
                if phrase_len > depth && boundary_ok(&chars, depth) {
                    best = Some((idx, depth));
                }
            }
        }
        self.completion_for(best)
    }

    fn completion_for(&self, best: Option<(usize, usize)>) -> Option<Completion> {
        let (idx, consumed) = best?;
        let suffix: String = self.phrases[idx].chars().skip(consumed).collect();
        let suffix_len = suffix.chars().count();
        Some(Completion {
            text: suffix,
            adjust: -(suffix_len as i64),
            cursor_length: suffix_len,
        })
    }
}

/// The matched head must start at a word boundary.
fn boundary_ok(chars: &[char], depth: usize) -> bool {
    let start = chars.len() - depth;
    start == 0 || !is_word_char(chars[start - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_suffix() {
        let completer = Completer::with_builtins();
        let hit = completer.suggest("  fun", "javascript").unwrap();
        assert_eq!(hit.text, "ction");
        assert_eq!(hit.adjust, -5);
        assert_eq!(hit.cursor_length, 5);
    }

    #[test]
    fn test_longer_head_wins() {
        let mut completer = Completer::new();
        completer.add_phrases("t", &["in", "instanceof"]);
        let hit = completer.suggest("x insta", "t").unwrap();
        assert_eq!(hit.text, "nceof");
    }

    #[test]
    fn test_fully_typed_phrase_suggests_nothing() {
        let completer = Completer::with_builtins();
        assert_eq!(completer.suggest("function", "javascript"), None);
    }

    #[test]
    fn test_word_boundary_required() {
        let completer = Completer::with_builtins();
        assert!(completer.suggest("fun", "javascript").is_some());
        assert_eq!(completer.suggest("xfun", "javascript"), None);
    }

    #[test]
    fn test_boundary_after_separator() {
        let completer = Completer::with_builtins();
        let hit = completer.suggest("a.proto", "javascript").unwrap();
        assert_eq!(hit.text, "type");
    }

    #[test]
    fn test_unknown_language_is_soft_fail() {
        let completer = Completer::with_builtins();
        assert_eq!(completer.suggest("fun", "cobol"), None);
    }

    #[test]
    fn test_no_match() {
        let completer = Completer::with_builtins();
        assert_eq!(completer.suggest("zzz", "javascript"), None);
        assert_eq!(completer.suggest("", "javascript"), None);
    }

    #[test]
    fn test_custom_phrases() {
        let mut completer = Completer::new();
        completer.add_phrases("css", &["background-color: "]);
        let hit = completer.suggest("  backg", "css").unwrap();
        assert_eq!(hit.text, "round-color: ");
    }

    #[test]
    fn test_first_registered_phrase_wins_ties() {
        let mut completer = Completer::new();
        completer.add_phrases("t", &["forward", "format"]);
        let hit = completer.suggest("for", "t").unwrap();
        assert_eq!(hit.text, "ward");
    }
}

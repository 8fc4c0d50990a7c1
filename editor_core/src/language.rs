//! Language descriptors and the per-session registry.
//!
//! A descriptor is pure data: tab settings, comment/string/block delimiters
//! and bracket complement pairs. The editing engine never inspects syntax
//! beyond what these tables describe.

use std::collections::HashMap;

/// Default tab width when a descriptor does not override it.
pub const DEFAULT_TAB_WIDTH: usize = 2;

/// Static configuration for one language.
///
/// `comments`, `blocks` and `multi_line_strings` are ordered open→close
/// delimiter pairs; order matters because the lexical scanner tries them
/// in sequence. `reverse_complements` is derived from
/// `forward_complements` at construction and kept private so the
/// `reverse[v] = k ⟺ forward[k] = v` invariant cannot be broken later.
#[derive(Debug, Clone)]
pub struct LanguageDescriptor {
    /// Character used for indentation (space or tab).
    pub tab_char: char,
    /// Number of tab chars per indent stop (display width for '\t').
    pub tab_width: usize,
    /// Line comment prefix used by toggle-comment ("" disables it).
    pub comment_string: String,
    /// Comment delimiters, open→close ("\n" as close means line comment).
    pub comments: Vec<(String, String)>,
    /// Block delimiters, open→close (e.g. fenced code, templating tags).
    pub blocks: Vec<(String, String)>,
    /// String delimiters that may span lines, open→close.
    pub multi_line_strings: Vec<(String, String)>,
    /// Chars that deepen indentation when a newline is typed after them.
    pub tab_complements: HashMap<char, char>,
    /// Quote chars and their closing counterpart.
    pub string_complements: HashMap<char, char>,
    /// Bracket chars and their closing counterpart.
    pub forward_complements: HashMap<char, char>,
    reverse_complements: HashMap<char, char>,
}

impl Default for LanguageDescriptor {
    fn default() -> Self {
        Self::plain()
    }
}

impl LanguageDescriptor {
    /// A descriptor with every field at its documented default.
    pub fn plain() -> Self {
        Self {
            tab_char: ' ',
            tab_width: DEFAULT_TAB_WIDTH,
            comment_string: String::new(),
            comments: Vec::new(),
            blocks: Vec::new(),
            multi_line_strings: Vec::new(),
            tab_complements: HashMap::new(),
            string_complements: HashMap::new(),
            forward_complements: HashMap::new(),
            reverse_complements: HashMap::new(),
        }
    }

    /// JavaScript / TypeScript family.
    pub fn javascript() -> Self {
        let mut lang = Self::plain();
        lang.comment_string = "//".to_string();
        lang.comments = vec![
            ("//".to_string(), "\n".to_string()),
            ("/*".to_string(), "*/".to_string()),
        ];
        lang.multi_line_strings = vec![("`".to_string(), "`".to_string())];
        lang.tab_complements = HashMap::from([('{', '}'), ('[', ']'), ('(', ')')]);
        lang.string_complements = HashMap::from([('"', '"'), ('\'', '\''), ('`', '`')]);
        lang.forward_complements = HashMap::from([('(', ')'), ('[', ']'), ('{', '}')]);
        lang.derive_reverse();
        lang
    }

    /// Rust.
    pub fn rust() -> Self {
        let mut lang = Self::plain();
        lang.tab_width = 4;
        lang.comment_string = "//".to_string();
        lang.comments = vec![
            ("//".to_string(), "\n".to_string()),
            ("/*".to_string(), "*/".to_string()),
        ];
        lang.tab_complements = HashMap::from([('{', '}'), ('[', ']'), ('(', ')')]);
        lang.string_complements = HashMap::from([('"', '"')]);
        lang.forward_complements = HashMap::from([('(', ')'), ('[', ']'), ('{', '}')]);
        lang.derive_reverse();
        lang
    }

    /// Python.
    pub fn python() -> Self {
        let mut lang = Self::plain();
        lang.tab_width = 4;
        lang.comment_string = "#".to_string();
        lang.comments = vec![("#".to_string(), "\n".to_string())];
        lang.multi_line_strings = vec![
            ("\"\"\"".to_string(), "\"\"\"".to_string()),
            ("'''".to_string(), "'''".to_string()),
        ];
        lang.tab_complements = HashMap::from([('(', ')'), ('[', ']'), ('{', '}')]);
        lang.string_complements = HashMap::from([('"', '"'), ('\'', '\'')]);
        lang.forward_complements = HashMap::from([('(', ')'), ('[', ']'), ('{', '}')]);
        lang.derive_reverse();
        lang
    }

    /// Markdown: fenced code blocks are the only interesting region.
    pub fn markdown() -> Self {
        let mut lang = Self::plain();
        lang.blocks = vec![("```".to_string(), "```".to_string())];
        lang.forward_complements = HashMap::from([('(', ')'), ('[', ']')]);
        lang.derive_reverse();
        lang
    }

    /// Recomputes the derived reverse-complement table. Call after editing
    /// `forward_complements` on a hand-built descriptor.
    pub fn derive_reverse(&mut self) {
        self.reverse_complements = self
            .forward_complements
            .iter()
            .map(|(&open, &close)| (close, open))
            .collect();
    }

    /// Closing-bracket → opening-bracket table (derived).
    pub fn reverse_complements(&self) -> &HashMap<char, char> {
        &self.reverse_complements
    }

    /// The string inserted for one indent stop.
    pub fn tab_unit(&self) -> String {
        if self.tab_char == '\t' {
            "\t".to_string()
        } else {
            std::iter::repeat(self.tab_char).take(self.tab_width).collect()
        }
    }

    /// Single-line quote chars: string delimiters that terminate at a
    /// newline. Multi-line string openers are excluded even when their
    /// first char is also a quote char (e.g. Python `"""`).
    pub fn single_line_quotes(&self) -> Vec<char> {
        self.string_complements
            .keys()
            .copied()
            .filter(|&q| {
                !self
                    .multi_line_strings
                    .iter()
                    .any(|(open, _)| open.chars().count() == 1 && open.starts_with(q))
            })
            .collect()
    }

    /// Looks up the closing counterpart for a wrap char: brackets first,
    /// then quotes.
    pub fn complement_of(&self, ch: char) -> Option<char> {
        self.forward_complements
            .get(&ch)
            .or_else(|| self.string_complements.get(&ch))
            .copied()
    }
}

/// Registry of descriptors keyed by language id, built per editor session.
///
/// Lookups for unregistered ids fall back to the default descriptor rather
/// than failing.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: HashMap<String, LanguageDescriptor>,
    fallback: LanguageDescriptor,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl LanguageRegistry {
    /// An empty registry; every lookup returns the default descriptor.
    pub fn new() -> Self {
        Self {
            languages: HashMap::new(),
            fallback: LanguageDescriptor::plain(),
        }
    }

    /// A registry pre-populated with the built-in descriptors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("plain", LanguageDescriptor::plain());
        registry.register("javascript", LanguageDescriptor::javascript());
        registry.register("rust", LanguageDescriptor::rust());
        registry.register("python", LanguageDescriptor::python());
        registry.register("markdown", LanguageDescriptor::markdown());
        registry
    }

    /// Registers (or replaces) a descriptor under the given id.
    pub fn register(&mut self, id: impl Into<String>, lang: LanguageDescriptor) {
        self.languages.insert(id.into(), lang);
    }

    /// Returns the descriptor for `id`, or the default one for unknown ids.
    pub fn get(&self, id: &str) -> &LanguageDescriptor {
        self.languages.get(id).unwrap_or(&self.fallback)
    }

    /// Returns true if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.languages.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let lang = LanguageDescriptor::plain();
        assert_eq!(lang.tab_char, ' ');
        assert_eq!(lang.tab_width, DEFAULT_TAB_WIDTH);
        assert!(lang.comments.is_empty());
        assert!(lang.forward_complements.is_empty());
    }

    #[test]
    fn test_reverse_is_inverse_of_forward() {
        let lang = LanguageDescriptor::javascript();
        for (&open, &close) in &lang.forward_complements {
            assert_eq!(lang.reverse_complements()[&close], open);
        }
        assert_eq!(
            lang.forward_complements.len(),
            lang.reverse_complements().len()
        );
    }

    #[test]
    fn test_tab_unit() {
        let mut lang = LanguageDescriptor::plain();
        assert_eq!(lang.tab_unit(), "  ");
        lang.tab_char = '\t';
        assert_eq!(lang.tab_unit(), "\t");
    }

    #[test]
    fn test_single_line_quotes_exclude_multiline() {
        let js = LanguageDescriptor::javascript();
        let mut quotes = js.single_line_quotes();
        quotes.sort_unstable();
        assert_eq!(quotes, vec!['"', '\'']);

        let py = LanguageDescriptor::python();
        // Python's """ and ''' are three-char openers, so both quote chars
        // stay single-line.
        assert_eq!(py.single_line_quotes().len(), 2);
    }

    #[test]
    fn test_registry_fallback() {
        let registry = LanguageRegistry::with_builtins();
        assert!(registry.contains("javascript"));
        assert!(!registry.contains("cobol"));
        // Unknown ids resolve to the default descriptor.
        let lang = registry.get("cobol");
        assert_eq!(lang.tab_width, DEFAULT_TAB_WIDTH);
        assert!(lang.comment_string.is_empty());
    }
}

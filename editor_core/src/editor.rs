//! The orchestrator: owns the shared value, routes actions to users,
//! keeps every other user's cursors synchronized, and records history.
//!
//! Everything runs synchronously on the calling thread; an action's
//! positional deltas are applied to all other users before the call
//! returns.

use std::collections::HashMap;

use crate::action::{Action, ActionArg};
use crate::complete::{Completer, Completion};
use crate::document::Document;
use crate::error::EditorError;
use crate::history::{CursorSnapshot, History, RestorePoint};
use crate::language::{LanguageDescriptor, LanguageRegistry};
use crate::lexical::{LexicalMask, LexicalScanner};
use crate::user::User;

#[cfg(feature = "serde")]
use crate::history::HistoryEntry;

/// A hosted editing session: one document, one active language, one local
/// user plus any number of remote collaborators.
pub struct Editor {
    value: Document,
    language_id: String,
    languages: LanguageRegistry,
    scanner: LexicalScanner,
    mask: LexicalMask,
    users: Vec<User>,
    local_user: String,
    history: History,
    completer: Completer,
    initial_value: String,
    initial_cursors: CursorSnapshot,
}

impl Editor {
    /// Creates an empty session owned by `local`.
    pub fn new(local: User) -> Self {
        let languages = LanguageRegistry::with_builtins();
        let language_id = "plain".to_string();
        let scanner = LexicalScanner::new(languages.get(&language_id));
        let local_id = local.id.clone();
        let mut editor = Self {
            value: Document::new(),
            language_id,
            languages,
            scanner,
            mask: LexicalMask::new(),
            users: vec![local],
            local_user: local_id,
            history: History::default(),
            completer: Completer::with_builtins(),
            initial_value: String::new(),
            initial_cursors: HashMap::new(),
        };
        editor.initial_cursors = editor.cursor_snapshot();
        editor
    }

    // ==================== Configuration ====================

    /// Replaces the document value, clamps every cursor, and restarts
    /// history from the new baseline.
    pub fn set_value(&mut self, text: &str) {
        self.value = Document::from_str(text);
        self.rescan();
        let len = self.value.len_chars();
        for user in &mut self.users {
            user.clamp(len);
            user.collapse_cursors();
        }
        self.history = History::default();
        self.initial_value = text.to_string();
        self.initial_cursors = self.cursor_snapshot();
    }

    /// Switches the active language; unknown ids fall back to defaults.
    pub fn set_language(&mut self, id: &str) {
        self.language_id = id.to_string();
        self.scanner = LexicalScanner::new(self.languages.get(id));
        self.rescan();
        log::debug!("language set to {id}");
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    /// Registers a descriptor; rebuilt immediately when it is the active
    /// language.
    pub fn register_language(&mut self, id: &str, lang: LanguageDescriptor) {
        self.languages.register(id, lang);
        if id == self.language_id {
            self.scanner = LexicalScanner::new(self.languages.get(id));
            self.rescan();
        }
    }

    pub fn completer_mut(&mut self) -> &mut Completer {
        &mut self.completer
    }

    // ==================== Users ====================

    /// Adds a collaborator. Ignored when the id is already present.
    pub fn add_user(&mut self, user: User) {
        if self.users.iter().any(|u| u.id == user.id) {
            return;
        }
        let mut user = user;
        user.clamp(self.value.len_chars());
        log::info!("user {} ({}) joined", user.id, user.display_name);
        self.users.push(user);
    }

    /// Removes a collaborator; the local user can never be removed.
    pub fn remove_user(&mut self, user_id: &str) -> bool {
        if user_id == self.local_user {
            return false;
        }
        let before = self.users.len();
        self.users.retain(|u| u.id != user_id);
        before != self.users.len()
    }

    pub fn local_user_id(&self) -> &str {
        &self.local_user
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    // ==================== Action surface ====================

    /// Validates and performs `(name, args)` on behalf of `user_id`,
    /// returning the new document value. Rejections happen before any
    /// state is touched.
    pub fn perform_action(
        &mut self,
        user_id: &str,
        name: &str,
        args: &[ActionArg],
    ) -> Result<String, EditorError> {
        let action = Action::parse(name, args)?;
        self.perform(user_id, action)
    }

    /// Performs a pre-validated action.
    pub fn perform(&mut self, user_id: &str, action: Action) -> Result<String, EditorError> {
        let idx = self
            .users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or_else(|| EditorError::UnknownUser(user_id.to_string()))?;
        log::debug!("action {} by {}", action.name(), user_id);

        let lang = self.languages.get(&self.language_id);
        let edits = self.users[idx].apply(&action, &mut self.value, lang, &self.mask);

        if !edits.is_empty() {
            let len = self.value.len_chars();
            for (i, user) in self.users.iter_mut().enumerate() {
                if i != idx {
                    user.rebase(&edits);
                    user.clamp(len);
                }
            }
            self.rescan();
        }

        let snapshot = self.cursor_snapshot();
        let value = self.value.to_string();
        self.history.add_entry(user_id, action, snapshot, &value);
        Ok(value)
    }

    // ==================== History surface ====================

    pub fn can_goto(&self, user_id: &str, amount: i64) -> bool {
        self.history.can_goto(user_id, amount)
    }

    /// Travels `amount` goto stops of `user_id`'s own history (negative =
    /// undo). Traveling past the ends is a silent no-op.
    pub fn goto_history(&mut self, user_id: &str, amount: i64) -> Result<String, EditorError> {
        if !self.users.iter().any(|u| u.id == user_id) {
            return Err(EditorError::UnknownUser(user_id.to_string()));
        }
        let restore = if amount < 0 {
            self.history.back(user_id, amount.unsigned_abs() as usize)
        } else if amount > 0 {
            self.history.replay(user_id, amount as usize)
        } else {
            None
        };
        if let Some(point) = restore {
            self.apply_restore(point);
        }
        Ok(self.value.to_string())
    }

    fn apply_restore(&mut self, point: RestorePoint) {
        let text = point.value.unwrap_or_else(|| self.initial_value.clone());
        self.value = Document::from_str(&text);
        self.rescan();
        let cursors = point
            .cursors
            .unwrap_or_else(|| self.initial_cursors.clone());
        let len = self.value.len_chars();
        for user in &mut self.users {
            if let Some(snapshot) = cursors.get(&user.id) {
                user.set_cursors(snapshot.clone());
            }
            user.clamp(len);
            user.collapse_cursors();
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ==================== Query surface ====================

    /// The current document value.
    pub fn value(&self) -> String {
        self.value.to_string()
    }

    pub fn document(&self) -> &Document {
        &self.value
    }

    pub fn in_string(&self, offset: usize) -> bool {
        self.mask.in_string(offset)
    }

    pub fn in_comment(&self, offset: usize) -> bool {
        self.mask.in_comment(offset)
    }

    pub fn in_block(&self, offset: usize) -> bool {
        self.mask.in_block(offset)
    }

    /// The bracket/quote pair enclosing `offset`, if found within the
    /// search bound.
    pub fn find_complements(&self, offset: usize) -> Option<(usize, usize)> {
        let lang = self.languages.get(&self.language_id);
        self.mask
            .find_complements(&self.value.to_string(), offset, lang)
    }

    /// Completion for the text before `user_id`'s primary caret.
    pub fn suggest(&self, user_id: &str) -> Option<Completion> {
        let user = self.users.iter().find(|u| u.id == user_id)?;
        let caret = user.primary().position;
        let (line, col) = self.value.char_to_line_col(caret);
        let line_start = self.value.line_start(line);
        let before = self.value.slice(line_start, line_start + col);
        self.completer.suggest(&before, &self.language_id)
    }

    /// All of a user's caret positions as (line, col) pairs, for
    /// rendering.
    pub fn cursor_positions(&self, user_id: &str) -> Vec<(usize, usize)> {
        self.user(user_id)
            .map(|user| {
                user.cursors()
                    .iter()
                    .map(|c| self.value.char_to_line_col(c.position))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn cursor_snapshot(&self) -> CursorSnapshot {
        self.users
            .iter()
            .map(|u| (u.id.clone(), u.cursors().to_vec()))
            .collect()
    }

    fn rescan(&mut self) {
        self.mask = self.scanner.scan(&self.value.to_string());
    }
}

/// What a host persists to restore a session later: the value plus the
/// full action log, replayable through the action surface.
#[cfg(feature = "serde")]
#[derive(Debug, serde::Serialize)]
pub struct SessionSnapshot<'a> {
    pub value: String,
    pub history: Vec<&'a HistoryEntry>,
}

#[cfg(feature = "serde")]
impl Editor {
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            value: self.value.to_string(),
            history: self.history.log_entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> Editor {
        Editor::new(User::new("local", "Local", "#00aaff"))
    }

    fn insert(editor: &mut Editor, user: &str, text: &str) -> String {
        editor
            .perform_action(user, "InsertText", &[text.into()])
            .unwrap()
    }

    #[test]
    fn test_insert_and_value() {
        let mut ed = editor();
        let value = insert(&mut ed, "local", "hello");
        assert_eq!(value, "hello");
        assert_eq!(ed.value(), "hello");
        assert_eq!(ed.user("local").unwrap().primary().position, 5);
    }

    #[test]
    fn test_unknown_action_rejected_without_mutation() {
        let mut ed = editor();
        insert(&mut ed, "local", "abc");
        let err = ed.perform_action("local", "Explode", &[]).unwrap_err();
        assert_eq!(err, EditorError::UnknownAction("Explode".to_string()));
        assert_eq!(ed.value(), "abc");
    }

    #[test]
    fn test_unknown_user_rejected() {
        let mut ed = editor();
        let err = ed
            .perform_action("ghost", "InsertText", &["x".into()])
            .unwrap_err();
        assert_eq!(err, EditorError::UnknownUser("ghost".to_string()));
    }

    #[test]
    fn test_remote_cursor_rebased_through_edit() {
        let mut ed = editor();
        ed.set_value("0123456789abc");
        ed.add_user(User::new("remote", "Remote", "#ff0066"));
        ed.perform_action("remote", "Select", &[10i64.into(), 10i64.into()])
            .unwrap();

        // local replaces [2, 5) with two chars: net length delta -1
        ed.perform_action("local", "Select", &[2i64.into(), 5i64.into()])
            .unwrap();
        let value = insert(&mut ed, "local", "xy");
        assert_eq!(value, "01xy56789abc");
        assert_eq!(ed.user("remote").unwrap().primary().position, 9);
    }

    #[test]
    fn test_remote_cursor_inside_edited_span_remaps_to_boundary() {
        let mut ed = editor();
        ed.set_value("abcdef");
        ed.add_user(User::new("remote", "Remote", "#ff0066"));
        ed.perform_action("remote", "Select", &[3i64.into(), 3i64.into()])
            .unwrap();

        ed.perform_action("local", "Select", &[1i64.into(), 5i64.into()])
            .unwrap();
        ed.perform_action("local", "RemoveText", &[1i64.into()])
            .unwrap();
        assert_eq!(ed.value(), "af");
        assert_eq!(ed.user("remote").unwrap().primary().position, 1);
    }

    #[test]
    fn test_goto_round_trip_is_deterministic() {
        let mut ed = editor();
        insert(&mut ed, "local", "a");
        insert(&mut ed, "local", "b");
        insert(&mut ed, "local", "c");
        assert_eq!(ed.value(), "abc");

        let value = ed.goto_history("local", -3).unwrap();
        assert_eq!(value, "");
        assert!(!ed.can_goto("local", -1));
        assert!(ed.can_goto("local", 1));

        let value = ed.goto_history("local", 3).unwrap();
        assert_eq!(value, "abc");
        assert_eq!(ed.user("local").unwrap().primary().position, 3);
        assert!(!ed.can_goto("local", 1));
    }

    #[test]
    fn test_goto_beyond_bounds_is_noop() {
        let mut ed = editor();
        insert(&mut ed, "local", "a");
        let value = ed.goto_history("local", -5).unwrap();
        assert_eq!(value, "");
        let value = ed.goto_history("local", -1).unwrap();
        assert_eq!(value, "");
        let value = ed.goto_history("local", 1).unwrap();
        assert_eq!(value, "a");
    }

    #[test]
    fn test_undo_with_newer_foreign_stop_keeps_newest_snapshot() {
        let mut ed = editor();
        ed.add_user(User::new("remote", "Remote", "#ff0066"));
        insert(&mut ed, "local", "x");
        ed.perform_action("remote", "MoveCursorsByDocument", &["right".into()])
            .unwrap();
        insert(&mut ed, "remote", "y");
        assert_eq!(ed.value(), "xy");

        // local's stop is older than remote's; the newest remaining
        // snapshot wins, so the value stays
        let value = ed.goto_history("local", -1).unwrap();
        assert_eq!(value, "xy");

        // rewinding remote as well lands on the initial state
        let value = ed.goto_history("remote", -1).unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_toggle_comment_idempotence_through_actions() {
        let mut ed = editor();
        ed.set_language("javascript");
        ed.set_value("  foo");
        let value = ed.perform_action("local", "ToggleComment", &[]).unwrap();
        assert_eq!(value, "  // foo");
        let value = ed.perform_action("local", "ToggleComment", &[]).unwrap();
        assert_eq!(value, "  foo");
    }

    #[test]
    fn test_lexical_queries_through_editor() {
        let mut ed = editor();
        ed.set_language("javascript");
        ed.set_value("let s = \"a\"; // done");
        assert!(ed.in_string(9));
        assert!(ed.in_comment(14));
        assert!(!ed.in_block(0));
    }

    #[test]
    fn test_find_complements_through_editor() {
        let mut ed = editor();
        ed.set_language("javascript");
        ed.set_value("call(arg)");
        assert_eq!(ed.find_complements(4), Some((4, 8)));
    }

    #[test]
    fn test_suggest_through_editor() {
        let mut ed = editor();
        ed.set_language("javascript");
        insert(&mut ed, "local", "fun");
        let hit = ed.suggest("local").unwrap();
        assert_eq!(hit.text, "ction");
        assert_eq!(hit.adjust, -5);
        assert_eq!(hit.cursor_length, 5);

        // feeding it back through InsertText selects the suffix
        let value = ed
            .perform_action(
                "local",
                "InsertText",
                &[
                    hit.text.as_str().into(),
                    hit.adjust.into(),
                    (hit.cursor_length as i64).into(),
                ],
            )
            .unwrap();
        assert_eq!(value, "function");
        let primary = ed.user("local").unwrap().primary();
        assert_eq!(primary.selection_start(), 3);
        assert_eq!(primary.selection_end(), 8);
    }

    #[test]
    fn test_cursor_positions_for_rendering() {
        let mut ed = editor();
        insert(&mut ed, "local", "ab\ncd");
        assert_eq!(ed.cursor_positions("local"), vec![(1, 2)]);
        assert!(ed.cursor_positions("ghost").is_empty());
    }

    #[test]
    fn test_remove_user_keeps_local() {
        let mut ed = editor();
        ed.add_user(User::new("remote", "Remote", "#ff0066"));
        assert!(ed.remove_user("remote"));
        assert!(!ed.remove_user("local"));
        assert_eq!(ed.users().len(), 1);
    }

    #[test]
    fn test_auto_indent_scenario() {
        let mut ed = editor();
        ed.set_language("javascript");
        ed.set_value("if (x) {\n  y\n}");
        ed.perform_action("local", "Select", &[8i64.into(), 8i64.into()])
            .unwrap();
        let value = insert(&mut ed, "local", "\n");
        assert_eq!(value, "if (x) {\n  \n  y\n}");
        assert_eq!(ed.user("local").unwrap().primary().position, 11);
    }
}

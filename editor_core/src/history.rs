//! Shared multi-user undo/redo history.
//!
//! The document is a single timeline, but every user travels only their
//! own goto-enabled entries (the ones that inserted or removed text).
//! Entries between two stops travel with the stop, neutralized rather
//! than replayed. Goto stops materialize the resulting document value so
//! travel restores state from the nearest snapshot instead of replaying
//! operations.

use std::collections::HashMap;

use crate::action::Action;
use crate::cursor::Cursor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default per-user history depth.
pub const DEFAULT_HISTORY_DEPTH: usize = 1000;

/// Per-user cursor lists captured after an action.
pub type CursorSnapshot = HashMap<String, Vec<Cursor>>;

/// One recorded action.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// Globally increasing id; gives the cross-user timeline order.
    pub id: u64,
    pub user_id: String,
    pub action: Action,
    /// Every user's cursors after the action was applied.
    pub cursors: CursorSnapshot,
    /// Document value after the action; materialized at goto stops only.
    pub resulting_value: Option<String>,
    pub committed: bool,
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct UserStacks {
    past: Vec<HistoryEntry>,
    future: Vec<HistoryEntry>,
}

/// The state history travel lands on. `value: None` means the session's
/// initial state.
#[derive(Debug, Clone)]
pub struct RestorePoint {
    pub value: Option<String>,
    pub cursors: Option<CursorSnapshot>,
}

/// Append-only per-user action log with undo/redo travel.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct History {
    stacks: HashMap<String, UserStacks>,
    next_id: u64,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// Creates a history with the given per-user depth limit.
    pub fn new(max_depth: usize) -> Self {
        Self {
            stacks: HashMap::new(),
            next_id: 0,
            max_depth,
        }
    }

    /// Records an action by `user_id`. `value` is the document after the
    /// action; it is materialized only on goto-enabled entries.
    ///
    /// Identical back-to-back pure selection entries are dropped. A
    /// goto-enabled append discards the user's future stack and commits
    /// their trailing uncommitted entries.
    pub fn add_entry(
        &mut self,
        user_id: &str,
        action: Action,
        cursors: CursorSnapshot,
        value: &str,
    ) {
        let stacks = self.stacks.entry(user_id.to_string()).or_default();

        if action.is_selection_only() {
            if let Some(last) = stacks.past.last() {
                if last.action == action {
                    return;
                }
            }
        }

        let goto = action.is_goto_enabled();
        if goto {
            stacks.future.clear();
            for entry in stacks.past.iter_mut().rev() {
                if entry.committed {
                    break;
                }
                entry.committed = true;
            }
        }

        let entry = HistoryEntry {
            id: self.next_id,
            user_id: user_id.to_string(),
            action,
            cursors,
            resulting_value: goto.then(|| value.to_string()),
            committed: goto,
        };
        self.next_id += 1;
        log::trace!(
            "history: record #{} {} by {}",
            entry.id,
            entry.action.name(),
            user_id
        );

        stacks.past.push(entry);
        while stacks.past.len() > self.max_depth {
            stacks.past.remove(0);
        }
    }

    /// True if `user_id` can travel one step in the given direction.
    pub fn can_goto(&self, user_id: &str, amount: i64) -> bool {
        let Some(stacks) = self.stacks.get(user_id) else {
            return false;
        };
        if amount < 0 {
            stacks
                .past
                .iter()
                .any(|e| e.committed && e.action.is_goto_enabled())
        } else if amount > 0 {
            !stacks.future.is_empty()
        } else {
            false
        }
    }

    /// Rewinds `steps` goto stops of `user_id`'s own entries, dragging
    /// their trailing neutralized entries along. Returns the state to
    /// restore, or `None` when there was nothing to rewind.
    pub fn back(&mut self, user_id: &str, steps: usize) -> Option<RestorePoint> {
        let stacks = self.stacks.get_mut(user_id)?;
        let mut traveled = 0;
        for _ in 0..steps {
            if !stacks
                .past
                .iter()
                .any(|e| e.committed && e.action.is_goto_enabled())
            {
                break;
            }
            while let Some(entry) = stacks.past.pop() {
                let is_stop = entry.action.is_goto_enabled();
                stacks.future.push(entry);
                if is_stop {
                    traveled += 1;
                    break;
                }
            }
        }
        if traveled == 0 {
            return None;
        }
        log::debug!("history: {} rewound {} stop(s)", user_id, traveled);
        Some(self.restore_point())
    }

    /// Replays `steps` goto stops from `user_id`'s future stack, dragging
    /// the neutralized entries that followed each stop back with it.
    pub fn replay(&mut self, user_id: &str, steps: usize) -> Option<RestorePoint> {
        let stacks = self.stacks.get_mut(user_id)?;
        let mut traveled = 0;
        for _ in 0..steps {
            match stacks.future.last() {
                Some(top) if top.action.is_goto_enabled() => {
                    let entry = stacks.future.pop().expect("future top checked");
                    stacks.past.push(entry);
                    traveled += 1;
                    while stacks
                        .future
                        .last()
                        .is_some_and(|e| !e.action.is_goto_enabled())
                    {
                        let entry = stacks.future.pop().expect("future top checked");
                        stacks.past.push(entry);
                    }
                }
                _ => break,
            }
        }
        if traveled == 0 {
            return None;
        }
        log::debug!("history: {} replayed {} stop(s)", user_id, traveled);
        Some(self.restore_point())
    }

    /// The globally newest remaining materialized stop across all users,
    /// or the initial state when none remains.
    fn restore_point(&self) -> RestorePoint {
        let newest = self
            .stacks
            .values()
            .flat_map(|s| s.past.iter())
            .filter(|e| e.resulting_value.is_some())
            .max_by_key(|e| e.id);
        match newest {
            Some(entry) => RestorePoint {
                value: entry.resulting_value.clone(),
                cursors: Some(entry.cursors.clone()),
            },
            None => RestorePoint {
                value: None,
                cursors: None,
            },
        }
    }

    /// All entries across users, in timeline order. Used for session
    /// snapshots.
    pub fn log_entries(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self
            .stacks
            .values()
            .flat_map(|s| s.past.iter().chain(s.future.iter()))
            .collect();
        entries.sort_by_key(|e| e.id);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionArg;

    fn insert(text: &str) -> Action {
        Action::parse("InsertText", &[ActionArg::Str(text.to_string())]).unwrap()
    }

    fn select(pivot: i64, position: i64) -> Action {
        Action::parse("Select", &[ActionArg::Int(pivot), ActionArg::Int(position)]).unwrap()
    }

    fn snapshot(pos: usize) -> CursorSnapshot {
        HashMap::from([("u1".to_string(), vec![Cursor::new(pos)])])
    }

    #[test]
    fn test_selection_entries_deduplicate() {
        let mut history = History::default();
        history.add_entry("u1", select(0, 2), snapshot(2), "ab");
        history.add_entry("u1", select(0, 2), snapshot(2), "ab");
        history.add_entry("u1", select(0, 3), snapshot(3), "ab");
        assert_eq!(history.log_entries().len(), 2);
    }

    #[test]
    fn test_goto_append_discards_future_and_commits() {
        let mut history = History::default();
        history.add_entry("u1", insert("a"), snapshot(1), "a");
        history.add_entry("u1", insert("b"), snapshot(2), "ab");
        history.back("u1", 1).unwrap();
        assert!(history.can_goto("u1", 1));

        history.add_entry("u1", insert("c"), snapshot(2), "ac");
        assert!(!history.can_goto("u1", 1));
    }

    #[test]
    fn test_back_restores_previous_snapshot() {
        let mut history = History::default();
        history.add_entry("u1", insert("a"), snapshot(1), "a");
        history.add_entry("u1", insert("b"), snapshot(2), "ab");

        let rp = history.back("u1", 1).unwrap();
        assert_eq!(rp.value.as_deref(), Some("a"));

        let rp = history.back("u1", 1).unwrap();
        assert_eq!(rp.value, None); // initial state
    }

    #[test]
    fn test_back_with_nothing_to_rewind() {
        let mut history = History::default();
        assert!(history.back("u1", 1).is_none());

        history.add_entry("u1", select(0, 1), snapshot(1), "ab");
        assert!(history.back("u1", 1).is_none());
        assert!(!history.can_goto("u1", -1));
    }

    #[test]
    fn test_trailing_selection_entries_travel_with_stop() {
        let mut history = History::default();
        history.add_entry("u1", insert("a"), snapshot(1), "a");
        history.add_entry("u1", select(0, 1), snapshot(1), "a");
        history.add_entry("u1", select(1, 0), snapshot(0), "a");

        let rp = history.back("u1", 1).unwrap();
        assert_eq!(rp.value, None);
        assert!(!history.can_goto("u1", -1));

        let rp = history.replay("u1", 1).unwrap();
        assert_eq!(rp.value.as_deref(), Some("a"));
        // the neutralized selection entries came back with their stop
        assert_eq!(history.log_entries().len(), 3);
        assert!(history.can_goto("u1", -1));
        assert!(!history.can_goto("u1", 1));
    }

    #[test]
    fn test_back_then_replay_round_trips() {
        let mut history = History::default();
        history.add_entry("u1", insert("a"), snapshot(1), "a");
        history.add_entry("u1", insert("b"), snapshot(2), "ab");
        history.add_entry("u1", insert("c"), snapshot(3), "abc");

        history.back("u1", 3).unwrap();
        let rp = history.replay("u1", 3).unwrap();
        assert_eq!(rp.value.as_deref(), Some("abc"));
        let cursors = rp.cursors.unwrap();
        assert_eq!(cursors["u1"][0].position, 3);
    }

    #[test]
    fn test_multi_step_travel() {
        let mut history = History::default();
        history.add_entry("u1", insert("a"), snapshot(1), "a");
        history.add_entry("u1", insert("b"), snapshot(2), "ab");
        history.add_entry("u1", insert("c"), snapshot(3), "abc");

        let rp = history.back("u1", 2).unwrap();
        assert_eq!(rp.value.as_deref(), Some("a"));
        let rp = history.replay("u1", 1).unwrap();
        assert_eq!(rp.value.as_deref(), Some("ab"));
    }

    #[test]
    fn test_foreign_entries_stay_in_place() {
        let mut history = History::default();
        history.add_entry("a", insert("x"), snapshot(1), "x");
        history.add_entry("b", insert("y"), snapshot(2), "xy");

        // a's undo leaves b's newer stop as the restore target
        let rp = history.back("a", 1).unwrap();
        assert_eq!(rp.value.as_deref(), Some("xy"));
        assert!(history.can_goto("b", -1));
        assert!(history.can_goto("a", 1));
    }

    #[test]
    fn test_depth_limit_evicts_oldest() {
        let mut history = History::new(2);
        history.add_entry("u1", insert("a"), snapshot(1), "a");
        history.add_entry("u1", insert("b"), snapshot(2), "ab");
        history.add_entry("u1", insert("c"), snapshot(3), "abc");
        assert_eq!(history.log_entries().len(), 2);
        assert_eq!(history.log_entries()[0].resulting_value.as_deref(), Some("ab"));
    }
}

//! Codepad core - multi-user editing engine.
//!
//! Pure editing logic: multiple users' cursors over one shared document,
//! a branching undo/redo log, offset-based lexical classification, and
//! phrase completion. No rendering, no transport.

pub mod action;
pub mod complete;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod language;
pub mod lexical;
pub mod user;

pub use action::{Action, ActionArg, MoveDirection};
pub use complete::{Completer, Completion};
pub use cursor::{Cursor, EditOutcome, InsertAdjust, TextEdit};
pub use document::Document;
pub use editor::Editor;
pub use error::EditorError;
pub use history::{History, HistoryEntry};
pub use language::{LanguageDescriptor, LanguageRegistry};
pub use lexical::{LexicalMask, LexicalScanner};
pub use user::User;

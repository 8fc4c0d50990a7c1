//! The action surface: names, arguments, and boundary validation.
//!
//! Hosts hand in `(name, args)` pairs; parsing rejects unknown names and
//! mistyped arguments before anything touches the document.

use crate::cursor::InsertAdjust;
use crate::error::EditorError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a cursor movement action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveDirection {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDirection {
    /// Parses a direction argument; anything else is a caller bug.
    pub fn parse(s: &str) -> Result<Self, EditorError> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(EditorError::InvalidDirection(s.to_string())),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// True for the document/line start side (left, up).
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

/// One positional action argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionArg {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ActionArg {
    fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for ActionArg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ActionArg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for ActionArg {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for ActionArg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A fully validated action, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    Select {
        pivot: usize,
        position: usize,
    },
    ResetCursor,
    CollapseCursors,
    CreateCursor {
        position: Option<usize>,
    },
    CreateNextCursor,
    DestroyLastCursor,
    MoveCursors {
        direction: MoveDirection,
        amount: usize,
        expand: bool,
        create_cursor: bool,
    },
    MoveCursorsByLine {
        direction: MoveDirection,
        expand: bool,
    },
    MoveCursorsByWord {
        direction: MoveDirection,
        expand: bool,
    },
    MoveCursorsByDocument {
        direction: MoveDirection,
        expand: bool,
    },
    InsertText {
        text: String,
        adjust: InsertAdjust,
        cursor_length: usize,
    },
    RemoveText {
        amount: i64,
    },
    InsertLines {
        text: String,
    },
    AddIndent,
    RemoveIndent,
    ToggleComment,
    NoOp,
}

impl Action {
    /// Validates `(name, args)` into an action. Unknown names, missing
    /// required arguments and mistyped arguments are rejected here, before
    /// any state changes.
    pub fn parse(name: &str, args: &[ActionArg]) -> Result<Self, EditorError> {
        match name {
            "Select" => Ok(Self::Select {
                pivot: req_offset(name, args, 0)?,
                position: req_offset(name, args, 1)?,
            }),
            "ResetCursor" => Ok(Self::ResetCursor),
            "CollapseCursors" => Ok(Self::CollapseCursors),
            "CreateCursor" => Ok(Self::CreateCursor {
                position: opt_offset(name, args, 0)?,
            }),
            "CreateNextCursor" => Ok(Self::CreateNextCursor),
            "DestroyLastCursor" => Ok(Self::DestroyLastCursor),
            "MoveCursors" => Ok(Self::MoveCursors {
                direction: req_direction(name, args, 0)?,
                amount: opt_offset(name, args, 1)?.unwrap_or(1),
                expand: opt_bool(name, args, 2)?,
                create_cursor: opt_bool(name, args, 3)?,
            }),
            "MoveCursorsByLine" => Ok(Self::MoveCursorsByLine {
                direction: req_direction(name, args, 0)?,
                expand: opt_bool(name, args, 1)?,
            }),
            "MoveCursorsByWord" => Ok(Self::MoveCursorsByWord {
                direction: req_direction(name, args, 0)?,
                expand: opt_bool(name, args, 1)?,
            }),
            "MoveCursorsByDocument" => Ok(Self::MoveCursorsByDocument {
                direction: req_direction(name, args, 0)?,
                expand: opt_bool(name, args, 1)?,
            }),
            "InsertText" => {
                let text = req_str(name, args, 0)?.to_string();
                let adjust = match args.get(1) {
                    None => InsertAdjust::None,
                    Some(ActionArg::Bool(true)) => InsertAdjust::SelectAll,
                    Some(ActionArg::Bool(false)) => InsertAdjust::None,
                    Some(ActionArg::Int(n)) => InsertAdjust::Offset(*n),
                    Some(_) => {
                        return Err(bad_arg(name, "adjust must be a bool or an int"));
                    }
                };
                Ok(Self::InsertText {
                    text,
                    adjust,
                    cursor_length: opt_offset(name, args, 2)?.unwrap_or(0),
                })
            }
            "RemoveText" => Ok(Self::RemoveText {
                amount: req_int(name, args, 0)?,
            }),
            "InsertLines" => Ok(Self::InsertLines {
                text: req_str(name, args, 0)?.to_string(),
            }),
            "AddIndent" => Ok(Self::AddIndent),
            "RemoveIndent" => Ok(Self::RemoveIndent),
            "ToggleComment" => Ok(Self::ToggleComment),
            "NoOp" => Ok(Self::NoOp),
            _ => Err(EditorError::UnknownAction(name.to_string())),
        }
    }

    /// The wire name this action parses from.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "Select",
            Self::ResetCursor => "ResetCursor",
            Self::CollapseCursors => "CollapseCursors",
            Self::CreateCursor { .. } => "CreateCursor",
            Self::CreateNextCursor => "CreateNextCursor",
            Self::DestroyLastCursor => "DestroyLastCursor",
            Self::MoveCursors { .. } => "MoveCursors",
            Self::MoveCursorsByLine { .. } => "MoveCursorsByLine",
            Self::MoveCursorsByWord { .. } => "MoveCursorsByWord",
            Self::MoveCursorsByDocument { .. } => "MoveCursorsByDocument",
            Self::InsertText { .. } => "InsertText",
            Self::RemoveText { .. } => "RemoveText",
            Self::InsertLines { .. } => "InsertLines",
            Self::AddIndent => "AddIndent",
            Self::RemoveIndent => "RemoveIndent",
            Self::ToggleComment => "ToggleComment",
            Self::NoOp => "NoOp",
        }
    }

    /// Actions that count as undo/redo stop points: the ones that insert
    /// or remove text.
    pub fn is_goto_enabled(&self) -> bool {
        matches!(
            self,
            Self::InsertText { .. }
                | Self::RemoveText { .. }
                | Self::InsertLines { .. }
                | Self::AddIndent
                | Self::RemoveIndent
                | Self::ToggleComment
        )
    }

    /// Pure selection changes that may be de-duplicated when identical
    /// entries land back-to-back.
    pub fn is_selection_only(&self) -> bool {
        matches!(
            self,
            Self::Select { .. } | Self::CollapseCursors | Self::ResetCursor
        )
    }
}

fn bad_arg(action: &str, reason: &str) -> EditorError {
    EditorError::BadArgument {
        action: action.to_string(),
        reason: reason.to_string(),
    }
}

fn req_str<'a>(action: &str, args: &'a [ActionArg], idx: usize) -> Result<&'a str, EditorError> {
    args.get(idx)
        .and_then(ActionArg::as_str)
        .ok_or_else(|| bad_arg(action, "expected a string argument"))
}

fn req_int(action: &str, args: &[ActionArg], idx: usize) -> Result<i64, EditorError> {
    args.get(idx)
        .and_then(ActionArg::as_int)
        .ok_or_else(|| bad_arg(action, "expected a numeric argument"))
}

/// Required numeric offset; negative values are clamped to 0 (data error,
/// not a caller bug).
fn req_offset(action: &str, args: &[ActionArg], idx: usize) -> Result<usize, EditorError> {
    Ok(req_int(action, args, idx)?.max(0) as usize)
}

fn opt_offset(action: &str, args: &[ActionArg], idx: usize) -> Result<Option<usize>, EditorError> {
    match args.get(idx) {
        None => Ok(None),
        Some(arg) => arg
            .as_int()
            .map(|n| Some(n.max(0) as usize))
            .ok_or_else(|| bad_arg(action, "expected a numeric argument")),
    }
}

fn opt_bool(action: &str, args: &[ActionArg], idx: usize) -> Result<bool, EditorError> {
    match args.get(idx) {
        None => Ok(false),
        Some(arg) => arg
            .as_bool()
            .ok_or_else(|| bad_arg(action, "expected a boolean argument")),
    }
}

fn req_direction(
    action: &str,
    args: &[ActionArg],
    idx: usize,
) -> Result<MoveDirection, EditorError> {
    MoveDirection::parse(req_str(action, args, idx)?)
}

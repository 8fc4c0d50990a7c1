//! Error type for the action-dispatch boundary.
//!
//! Only caller bugs surface here; out-of-range offsets and similar data
//! errors are clamped silently, and soft-fail queries return `None`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("unknown user `{0}`")]
    UnknownUser(String),

    #[error("invalid direction `{0}`")]
    InvalidDirection(String),

    #[error("bad argument for `{action}`: {reason}")]
    BadArgument { action: String, reason: String },
}

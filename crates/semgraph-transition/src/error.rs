//! Error types for parser sessions.
//!
//! Constraint rejections are not errors: they only filter the valid-action
//! set. A [`TransitionError`] means the driver asked for something the state
//! cannot do, and the state is left exactly as it was.

use semgraph_core::action::Action;
use semgraph_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// The action is not in the current valid-action set.
    #[error("invalid action {action}: {reason}")]
    InvalidAction { action: Action, reason: String },

    /// The driver ran out of steps before the parse completed.
    #[error("step limit ({limit}) exceeded before completion")]
    StepLimitExceeded { limit: usize },

    /// No candidate action is valid in an incomplete state.
    #[error("no valid action at step {step}")]
    NoValidAction { step: usize },

    /// An output graph was requested from an incomplete parse.
    #[error("parse is not complete")]
    NotComplete,

    #[error(transparent)]
    Core(#[from] CoreError),
}

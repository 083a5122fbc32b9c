//! Validity verdicts.
//!
//! Every constraint predicate answers with a [`Verdict`]. A rejection always
//! carries a human-readable reason so that diagnostics can explain why an
//! action was filtered out.

use std::fmt;

/// Outcome of a constraint check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    /// `Valid` if `cond` holds, otherwise `Invalid` with the lazily built reason.
    pub fn check(cond: bool, reason: impl FnOnce() -> String) -> Verdict {
        if cond {
            Verdict::Valid
        } else {
            Verdict::Invalid(reason())
        }
    }

    /// Short-circuiting conjunction: the first rejection wins.
    pub fn and(self, next: impl FnOnce() -> Verdict) -> Verdict {
        match self {
            Verdict::Valid => next(),
            invalid => invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), String> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::Invalid(reason) => Err(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid"),
            Verdict::Invalid(reason) => write!(f, "invalid: {}", reason),
        }
    }
}

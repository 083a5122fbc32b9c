//! In-progress graph edges.
//!
//! A [`StateEdge`] refers to its endpoints by [`StateNodeId`]; no edge owns a
//! node. Parallel edges between the same pair are structurally allowed,
//! whether they are permitted is a constraint-layer decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::StateNodeId;

/// A directed, labeled relation between two nodes of the arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateEdge {
    pub parent: StateNodeId,
    pub child: StateNodeId,
    /// Edge label. `None` for unlabeled (anchoring) edges.
    pub lab: Option<String>,
    /// Secondary, non-primary edge.
    pub remote: bool,
}

impl StateEdge {
    pub fn new(parent: StateNodeId, child: StateNodeId, lab: Option<String>, remote: bool) -> Self {
        StateEdge {
            parent,
            child,
            lab,
            remote,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.lab.as_deref()
    }
}

impl fmt::Display for StateEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -{}{}-> {}",
            self.parent,
            self.lab.as_deref().unwrap_or(""),
            if self.remote { "*" } else { "" },
            self.child
        )
    }
}

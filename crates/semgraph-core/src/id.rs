//! Stable index newtypes for the parser's arena graph.
//!
//! Node and edge identity inside a parse session is positional: a node's
//! [`StateNodeId`] is its position in the session's node list and never
//! changes. Both ids are distinct wrappers over `u32` so that a node index
//! cannot be passed where an edge index is expected.

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

/// Position of a node in the session's node list. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateNodeId(pub u32);

/// Position of an edge in the session's edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateEdgeId(pub u32);

impl StateNodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl StateEdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StateEdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// Bridge between the newtypes and petgraph's indices.

impl From<NodeIndex<u32>> for StateNodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        StateNodeId(idx.index() as u32)
    }
}

impl From<StateNodeId> for NodeIndex<u32> {
    fn from(id: StateNodeId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

impl From<EdgeIndex<u32>> for StateEdgeId {
    fn from(idx: EdgeIndex<u32>) -> Self {
        StateEdgeId(idx.index() as u32)
    }
}

impl From<StateEdgeId> for EdgeIndex<u32> {
    fn from(id: StateEdgeId) -> Self {
        EdgeIndex::new(id.0 as usize)
    }
}

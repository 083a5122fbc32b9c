pub mod id;
pub mod error;
pub mod label;
pub mod anchor;
pub mod node;
pub mod edge;
pub mod graph;
pub mod action;
pub mod gold;
pub mod output;

// Re-export commonly used types
pub use action::{Action, ActionKind, ArcDirection, NodeRole};
pub use anchor::Span;
pub use edge::StateEdge;
pub use error::CoreError;
pub use gold::{GoldEdge, GoldEnd, GoldGraph, GoldNode, GoldRef, ResolvedEdge};
pub use graph::StateGraph;
pub use id::{StateEdgeId, StateNodeId};
pub use label::{NodeLabel, DEFAULT_DELIMITER};
pub use node::{NodeOrigin, StateNode};
pub use output::{OutputEdge, OutputGraph, OutputNode};

//! Core error types for semgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the arena graph and of gold-graph loading.

use thiserror::Error;

use crate::id::StateNodeId;

/// Core errors produced by the semgraph-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node index was not found in the arena.
    #[error("node not found: StateNodeId({id})", id = id.0)]
    NodeNotFound { id: StateNodeId },

    /// A gold edge refers to a node id that is not declared.
    #[error("gold graph references unknown node '{id}'")]
    UnknownGoldNode { id: String },

    /// A gold edge or anchor refers to a token past the end of the input.
    #[error("gold graph references token {offset}, but the input has {len} tokens")]
    TokenOutOfRange { offset: usize, len: usize },

    /// Two gold nodes share an id.
    #[error("duplicate gold node id '{id}'")]
    DuplicateGoldNode { id: String },

    /// A gold graph could not be decoded.
    #[error("malformed gold graph: {0}")]
    Decode(#[from] serde_json::Error),
}

//! Persistent output graph produced by a completed parse.
//!
//! [`OutputGraph`] is an immutable-by-convention record of the final nodes
//! and edges. It is the only artifact a completed parse exposes, and the
//! common form gold graphs are converted to for comparison.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::anchor::Span;

/// A finalized node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<Span>,
    #[serde(default)]
    pub is_root: bool,
}

impl OutputNode {
    /// Content equality used for isomorphism: ids, anchors and root flags
    /// are ignored.
    pub fn same_content(&self, other: &OutputNode) -> bool {
        self.text == other.text
            && self.label == other.label
            && self.category == other.category
            && self.properties == other.properties
    }

    pub fn is_terminal(&self) -> bool {
        self.text.is_some()
    }
}

/// A finalized edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub remote: bool,
}

/// The materialized result of a parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputGraph {
    graph: DiGraph<OutputNode, OutputEdge, u32>,
}

impl OutputGraph {
    pub fn new() -> Self {
        OutputGraph::default()
    }

    pub fn add_node(&mut self, node: OutputNode) -> NodeIndex<u32> {
        self.graph.add_node(node)
    }

    pub fn add_edge(&mut self, parent: NodeIndex<u32>, child: NodeIndex<u32>, edge: OutputEdge) {
        self.graph.add_edge(parent, child, edge);
    }

    pub fn node(&self, idx: NodeIndex<u32>) -> Option<&OutputNode> {
        self.graph.node_weight(idx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &OutputNode> {
        self.graph.node_weights()
    }

    /// `(parent, child, edge)` triples in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex<u32>, NodeIndex<u32>, &OutputEdge)> {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn roots(&self) -> impl Iterator<Item = &OutputNode> {
        self.graph.node_weights().filter(|n| n.is_root)
    }

    /// Children of `idx` with the connecting edge.
    pub fn children(
        &self,
        idx: NodeIndex<u32>,
    ) -> impl Iterator<Item = (&OutputNode, &OutputEdge)> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (&self.graph[e.target()], e.weight()))
    }

    /// Structural equality up to node ids: same node contents, same edges
    /// with the same labels.
    pub fn is_isomorphic(&self, other: &OutputGraph) -> bool {
        self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && petgraph::algo::is_isomorphic_matching(
                &self.graph,
                &other.graph,
                |a: &OutputNode, b: &OutputNode| a.same_content(b),
                |a: &OutputEdge, b: &OutputEdge| a == b,
            )
    }
}

//! Reference (gold) graphs used for oracle supervision.
//!
//! A gold graph is aligned to the same token sequence the parser reads.
//! Tokens are implicit terminal nodes; declared nodes are non-terminals.
//! A node's anchors imply unlabeled edges to the anchored terminals, and
//! edges may also target terminals explicitly.
//!
//! ```json
//! {
//!   "tokens": ["John", "arrived"],
//!   "nodes": [{"id": "n0", "label": "arrive-01", "anchors": [{"from": 1, "to": 2}]}],
//!   "edges": [{"source": "n0", "target": {"token": 0}, "label": "ARG0"}]
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::anchor::{compress_anchors, expand_anchors, Span};
use crate::error::CoreError;
use crate::label::NodeLabel;
use crate::output::{OutputEdge, OutputGraph, OutputNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tokens: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<GoldNode>,
    #[serde(default)]
    pub edges: Vec<GoldEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<Span>,
}

/// Endpoint of a gold edge as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoldRef {
    Node(String),
    Token(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldEdge {
    pub source: String,
    pub target: GoldRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub remote: bool,
}

/// Endpoint of a resolved gold edge: a token offset or a position in `nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GoldEnd {
    Token(usize),
    Node(usize),
}

/// A gold edge with endpoints resolved to positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEdge {
    /// Position of the parent in `nodes`.
    pub parent: usize,
    pub child: GoldEnd,
    pub label: Option<String>,
    pub remote: bool,
}

impl GoldGraph {
    /// Decodes and validates a gold graph.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let graph: GoldGraph = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Decodes a JSON array of gold graphs, or one graph per non-empty line.
    pub fn many_from_json(json: &str) -> Result<Vec<Self>, CoreError> {
        let graphs: Vec<GoldGraph> = if json.trim_start().starts_with('[') {
            serde_json::from_str(json)?
        } else {
            json.lines()
                .filter(|l| !l.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<Result<_, _>>()?
        };
        for graph in &graphs {
            graph.validate()?;
        }
        Ok(graphs)
    }

    pub fn node_position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Checks ids and token offsets.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(CoreError::DuplicateGoldNode {
                    id: node.id.clone(),
                });
            }
            for span in node.anchors.iter().filter(|s| s.to > s.from) {
                self.check_token(span.to - 1)?;
            }
        }
        for edge in &self.edges {
            if !seen.contains(edge.source.as_str()) {
                return Err(CoreError::UnknownGoldNode {
                    id: edge.source.clone(),
                });
            }
            match &edge.target {
                GoldRef::Node(id) if !seen.contains(id.as_str()) => {
                    return Err(CoreError::UnknownGoldNode { id: id.clone() })
                }
                GoldRef::Token(offset) => self.check_token(*offset)?,
                GoldRef::Node(_) => {}
            }
        }
        Ok(())
    }

    fn check_token(&self, offset: usize) -> Result<(), CoreError> {
        if offset >= self.tokens.len() {
            return Err(CoreError::TokenOutOfRange {
                offset,
                len: self.tokens.len(),
            });
        }
        Ok(())
    }

    /// All gold edges with resolved endpoints: explicit edges first, then one
    /// unlabeled edge per anchored token. Exact duplicates are dropped.
    pub fn resolve_edges(&self) -> Result<Vec<ResolvedEdge>, CoreError> {
        let positions: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let lookup = |id: &str| {
            positions
                .get(id)
                .copied()
                .ok_or_else(|| CoreError::UnknownGoldNode { id: id.to_string() })
        };

        let mut edges = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |edge: ResolvedEdge| {
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        };
        for edge in &self.edges {
            let child = match &edge.target {
                GoldRef::Node(id) => GoldEnd::Node(lookup(id)?),
                GoldRef::Token(offset) => {
                    self.check_token(*offset)?;
                    GoldEnd::Token(*offset)
                }
            };
            push(ResolvedEdge {
                parent: lookup(&edge.source)?,
                child,
                label: edge.label.clone(),
                remote: edge.remote,
            });
        }
        for (position, node) in self.nodes.iter().enumerate() {
            for offset in expand_anchors(&node.anchors) {
                self.check_token(offset)?;
                push(ResolvedEdge {
                    parent: position,
                    child: GoldEnd::Token(offset),
                    label: None,
                    remote: false,
                });
            }
        }
        Ok(edges)
    }

    /// Converts to an [`OutputGraph`]: one terminal per token, then the
    /// declared nodes. Parentless nodes are roots.
    pub fn to_output(&self, delimiter: char) -> Result<OutputGraph, CoreError> {
        let edges = self.resolve_edges()?;
        let mut has_parent = vec![false; self.nodes.len()];
        for edge in &edges {
            if let GoldEnd::Node(child) = edge.child {
                has_parent[child] = true;
            }
        }

        let mut output = OutputGraph::new();
        let terminals: Vec<_> = self
            .tokens
            .iter()
            .enumerate()
            .map(|(offset, token)| {
                output.add_node(OutputNode {
                    id: format!("t{}", offset),
                    text: Some(token.clone()),
                    label: Some(token.clone()),
                    category: None,
                    properties: BTreeMap::new(),
                    anchors: vec![Span::new(offset, offset + 1)],
                    is_root: false,
                })
            })
            .collect();
        let nodes: Vec<_> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| {
                let label = node.label.as_deref().map(|l| NodeLabel::parse(l, delimiter));
                output.add_node(OutputNode {
                    id: node.id.clone(),
                    text: None,
                    label: label.as_ref().map(|l| l.core.clone()),
                    category: label.and_then(|l| l.category),
                    properties: node.properties.clone(),
                    anchors: compress_anchors(&expand_anchors(&node.anchors)),
                    is_root: !has_parent[position],
                })
            })
            .collect();
        for edge in edges {
            let child = match edge.child {
                GoldEnd::Token(offset) => terminals[offset],
                GoldEnd::Node(position) => nodes[position],
            };
            output.add_edge(
                nodes[edge.parent],
                child,
                OutputEdge {
                    label: edge.label,
                    remote: edge.remote,
                },
            );
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARRIVE: &str = r#"{
        "tokens": ["John", "arrived"],
        "nodes": [{"id": "n0", "label": "arrive-01", "anchors": [{"from": 1, "to": 2}]}],
        "edges": [{"source": "n0", "target": {"token": 0}, "label": "ARG0"}]
    }"#;

    #[test]
    fn decode_and_resolve() {
        let gold = GoldGraph::from_json(ARRIVE).unwrap();
        let edges = gold.resolve_edges().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].child, GoldEnd::Token(0));
        assert_eq!(edges[0].label.as_deref(), Some("ARG0"));
        assert_eq!(edges[1].child, GoldEnd::Token(1));
        assert_eq!(edges[1].label, None);
    }

    #[test]
    fn explicit_anchor_edge_is_deduplicated() {
        let mut gold = GoldGraph::from_json(ARRIVE).unwrap();
        gold.edges.push(GoldEdge {
            source: "n0".into(),
            target: GoldRef::Token(1),
            label: None,
            remote: false,
        });
        assert_eq!(gold.resolve_edges().unwrap().len(), 2);
    }

    #[test]
    fn unknown_node_rejected() {
        let json = r#"{"tokens": ["a"], "nodes": [], "edges": [{"source": "x", "target": {"token": 0}}]}"#;
        assert!(matches!(
            GoldGraph::from_json(json),
            Err(CoreError::UnknownGoldNode { id }) if id == "x"
        ));
    }

    #[test]
    fn token_out_of_range_rejected() {
        let json = r#"{"tokens": ["a"], "nodes": [{"id": "n", "anchors": [{"from": 0, "to": 3}]}]}"#;
        assert!(matches!(
            GoldGraph::from_json(json),
            Err(CoreError::TokenOutOfRange { offset: 2, len: 1 })
        ));
    }

    #[test]
    fn empty_spans_cover_no_token() {
        let json = r#"{"tokens": ["a"], "nodes": [{"id": "n", "anchors": [{"from": 1, "to": 1}]}]}"#;
        let gold = GoldGraph::from_json(json).unwrap();
        assert!(gold.resolve_edges().unwrap().is_empty());
    }

    #[test]
    fn duplicate_node_rejected() {
        let json = r#"{"tokens": [], "nodes": [{"id": "n"}, {"id": "n"}]}"#;
        assert!(matches!(
            GoldGraph::from_json(json),
            Err(CoreError::DuplicateGoldNode { .. })
        ));
    }

    #[test]
    fn many_from_json_lines_and_array() {
        let lines = format!("{}\n\n{}\n", ARRIVE.replace('\n', " "), ARRIVE.replace('\n', " "));
        assert_eq!(GoldGraph::many_from_json(&lines).unwrap().len(), 2);
        let array = format!("[{}]", ARRIVE);
        assert_eq!(GoldGraph::many_from_json(&array).unwrap().len(), 1);
    }

    #[test]
    fn to_output_marks_roots_and_splits_labels() {
        let json = r#"{
            "tokens": ["Mary"],
            "nodes": [
                {"id": "p", "label": "person"},
                {"id": "n", "label": "name|ne", "properties": {"op1": "Mary"}, "anchors": [{"from": 0, "to": 1}]}
            ],
            "edges": [{"source": "p", "target": {"node": "n"}, "label": "name"}]
        }"#;
        let output = GoldGraph::from_json(json).unwrap().to_output('|').unwrap();
        assert_eq!(output.node_count(), 3);
        assert_eq!(output.edge_count(), 2);
        let roots: Vec<_> = output.roots().map(|n| n.id.clone()).collect();
        assert_eq!(roots, vec!["p".to_string()]);
        let name = output.nodes().find(|n| n.id == "n").unwrap();
        assert_eq!(name.label.as_deref(), Some("name"));
        assert_eq!(name.category.as_deref(), Some("ne"));
    }
}

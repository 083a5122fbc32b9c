//! In-progress graph nodes.
//!
//! A [`StateNode`] is the parser's temporary view of a graph node: only the
//! information the transition system and the constraint layer need. Nodes
//! live in the [`StateGraph`](crate::graph::StateGraph) arena and refer to
//! each other by [`StateNodeId`]. Their edge bookkeeping is maintained by the
//! arena, never set directly.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::anchor::{expand_anchors, Span};
use crate::edge::StateEdge;
use crate::id::{StateEdgeId, StateNodeId};
use crate::label::NodeLabel;

/// How a node came into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeOrigin {
    /// One of the input tokens.
    Terminal,
    /// Created as the parent of an existing node through `edge`.
    Parent { edge: StateEdgeId },
    /// Created as an implicit child of an existing node through `edge`.
    Child { edge: StateEdgeId },
    /// Copied from a previously materialized graph.
    Copied,
}

/// A node of the graph under construction.
///
/// Identity is the node's `index`: equality and hashing ignore the edge
/// lists, so a node keeps its identity while edges are attached.
#[derive(Debug, Clone)]
pub struct StateNode {
    /// Position in the session's node list.
    pub index: StateNodeId,
    /// Reference-node identifier. Empty for nodes created during parsing.
    pub id: String,
    /// Token text. Only terminals have text.
    pub text: Option<String>,
    /// Core label. Terminals are labeled with their text.
    pub label: Option<String>,
    /// Category split off the label, if any.
    pub category: Option<String>,
    pub is_root: bool,
    pub properties: BTreeMap<String, String>,
    /// Covered token offsets.
    pub anchors: BTreeSet<usize>,
    /// Ordering key used to forbid swapping the same pair twice.
    pub swap_index: f64,
    pub origin: NodeOrigin,
    pub(crate) height: usize,
    pub(crate) outgoing: SmallVec<[StateEdgeId; 4]>,
    pub(crate) incoming: SmallVec<[StateEdgeId; 4]>,
    pub(crate) children: SmallVec<[StateNodeId; 4]>,
    pub(crate) parents: SmallVec<[StateNodeId; 4]>,
    pub(crate) outgoing_labs: BTreeSet<String>,
    pub(crate) incoming_labs: BTreeSet<String>,
    pub(crate) terminals: OnceCell<Vec<StateNodeId>>,
}

impl StateNode {
    fn blank(index: StateNodeId, swap_index: f64, origin: NodeOrigin) -> Self {
        StateNode {
            index,
            id: String::new(),
            text: None,
            label: None,
            category: None,
            is_root: false,
            properties: BTreeMap::new(),
            anchors: BTreeSet::new(),
            swap_index,
            origin,
            height: 0,
            outgoing: SmallVec::new(),
            incoming: SmallVec::new(),
            children: SmallVec::new(),
            parents: SmallVec::new(),
            outgoing_labs: BTreeSet::new(),
            incoming_labs: BTreeSet::new(),
            terminals: OnceCell::new(),
        }
    }

    /// A terminal for the token at `offset`. Its swap index is its position.
    pub fn terminal(index: StateNodeId, text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let mut node = StateNode::blank(index, index.0 as f64, NodeOrigin::Terminal);
        node.label = Some(text.clone());
        node.text = Some(text);
        node.anchors.insert(offset);
        node
    }

    /// An unlabeled non-terminal. Its origin is fixed by the arena once the
    /// creating edge exists.
    pub fn non_terminal(index: StateNodeId, swap_index: f64) -> Self {
        StateNode::blank(index, swap_index, NodeOrigin::Copied)
    }

    /// A copy of a finalized node, keeping its id, label, properties and anchors.
    pub fn copy(
        index: StateNodeId,
        id: impl Into<String>,
        text: Option<String>,
        label: Option<NodeLabel>,
        is_root: bool,
        properties: BTreeMap<String, String>,
        anchors: &[Span],
    ) -> Self {
        let origin = if text.is_some() {
            NodeOrigin::Terminal
        } else {
            NodeOrigin::Copied
        };
        let mut node = StateNode::blank(index, index.0 as f64, origin);
        node.id = id.into();
        node.label = match (&label, &text) {
            (Some(label), _) => Some(label.core.clone()),
            (None, Some(text)) => Some(text.clone()),
            (None, None) => None,
        };
        node.category = label.and_then(|l| l.category);
        node.text = text;
        node.is_root = is_root;
        node.properties = properties;
        node.anchors = expand_anchors(anchors);
        node
    }

    pub fn is_terminal(&self) -> bool {
        self.text.is_some()
    }

    /// Created as an implicit child rather than bottom-up from its children.
    pub fn is_implicit(&self) -> bool {
        matches!(self.origin, NodeOrigin::Child { .. })
    }

    /// Longest distance to a descendant terminal; 0 for childless nodes.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn outgoing(&self) -> &[StateEdgeId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[StateEdgeId] {
        &self.incoming
    }

    pub fn children(&self) -> &[StateNodeId] {
        &self.children
    }

    pub fn parents(&self) -> &[StateNodeId] {
        &self.parents
    }

    /// Labels of all outgoing edges seen so far.
    pub fn outgoing_labs(&self) -> &BTreeSet<String> {
        &self.outgoing_labs
    }

    /// Labels of all incoming edges seen so far.
    pub fn incoming_labs(&self) -> &BTreeSet<String> {
        &self.incoming_labs
    }

    /// Full label including category, as it was assigned.
    pub fn full_label(&self, delimiter: char) -> Option<String> {
        self.label.as_ref().map(|core| {
            NodeLabel {
                core: core.clone(),
                category: self.category.clone(),
            }
            .joined(delimiter)
        })
    }

    pub(crate) fn add_outgoing(&mut self, id: StateEdgeId, edge: &StateEdge, child_height: usize) {
        self.outgoing.push(id);
        self.children.push(edge.child);
        if let Some(lab) = &edge.lab {
            self.outgoing_labs.insert(lab.clone());
        }
        self.height = self.height.max(child_height + 1);
        self.terminals.take();
    }

    pub(crate) fn add_incoming(&mut self, id: StateEdgeId, edge: &StateEdge) {
        self.incoming.push(id);
        self.parents.push(edge.parent);
        if let Some(lab) = &edge.lab {
            self.incoming_labs.insert(lab.clone());
        }
    }
}

impl PartialEq for StateNode {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for StateNode {}

impl Hash for StateNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Display for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root {
            write!(f, "ROOT")?;
        } else if let Some(text) = &self.text {
            write!(f, "\"{}\"", text)?;
        } else if !self.id.is_empty() {
            write!(f, "{}", self.id)?;
        } else {
            write!(f, "{}", self.index)?;
        }
        if self.text.is_none() {
            if let Some(label) = &self.label {
                write!(f, "/{}", label)?;
            }
        }
        if !self.properties.is_empty() {
            let props: Vec<String> = self
                .properties
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "({})", props.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_is_labeled_with_text() {
        let node = StateNode::terminal(StateNodeId(1), "arrived", 1);
        assert!(node.is_terminal());
        assert_eq!(node.label.as_deref(), Some("arrived"));
        assert_eq!(node.swap_index, 1.0);
        assert_eq!(node.anchors.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(node.height(), 0);
    }

    #[test]
    fn copy_splits_label_and_expands_anchors() {
        let node = StateNode::copy(
            StateNodeId(4),
            "n0",
            None,
            Some(NodeLabel::parse("name|person", '|')),
            true,
            BTreeMap::new(),
            &[Span::new(2, 4)],
        );
        assert_eq!(node.label.as_deref(), Some("name"));
        assert_eq!(node.category.as_deref(), Some("person"));
        assert_eq!(node.anchors.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(node.full_label('|').as_deref(), Some("name|person"));
        assert_eq!(node.origin, NodeOrigin::Copied);
    }

    #[test]
    fn identity_is_index() {
        let a = StateNode::non_terminal(StateNodeId(3), 3.0);
        let mut b = a.clone();
        b.label = Some("changed".into());
        b.outgoing.push(StateEdgeId(0));
        assert_eq!(a, b);
    }

    #[test]
    fn display_forms() {
        let t = StateNode::terminal(StateNodeId(0), "John", 0);
        assert_eq!(t.to_string(), "\"John\"");

        let mut n = StateNode::non_terminal(StateNodeId(2), 0.5);
        n.label = Some("arrive-01".into());
        n.properties.insert("polarity".into(), "-".into());
        assert_eq!(n.to_string(), "2/arrive-01(polarity=-)");

        n.is_root = true;
        assert_eq!(n.to_string(), "ROOT/arrive-01(polarity=-)");
    }
}

//! StateGraph: the arena holding every node and edge of a parse session.
//!
//! Nodes and edges live in a petgraph `DiGraph` and are addressed by
//! [`StateNodeId`]/[`StateEdgeId`]. Each node additionally keeps ordered
//! edge lists and label sets so that constraint checks are cheap lookups.
//!
//! Nodes are never removed. All mutations go through `StateGraph` methods,
//! which keep the derived bookkeeping consistent:
//! - `height` is propagated to ancestors when an edge is added (capped at the
//!   node count so that cyclic graphs terminate),
//! - cached terminal lists are invalidated on the new parent and all of its
//!   ancestors,
//! - a parent gains the anchor of any terminal child.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::action::NodeRole;
use crate::edge::StateEdge;
use crate::error::CoreError;
use crate::id::{StateEdgeId, StateNodeId};
use crate::label::NodeLabel;
use crate::node::{NodeOrigin, StateNode};

/// Arena of [`StateNode`]s and [`StateEdge`]s.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    graph: DiGraph<StateNode, StateEdge, u32>,
}

impl StateGraph {
    pub fn new() -> Self {
        StateGraph::default()
    }

    /// An arena holding one terminal per token, in token order.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut graph = StateGraph::new();
        for (offset, token) in tokens.iter().enumerate() {
            graph.add_terminal(token.as_ref(), offset);
        }
        graph
    }

    /// Id the next inserted node will receive.
    pub fn next_id(&self) -> StateNodeId {
        StateNodeId(self.graph.node_count() as u32)
    }

    pub fn add_terminal(&mut self, text: &str, offset: usize) -> StateNodeId {
        let id = self.next_id();
        self.graph.add_node(StateNode::terminal(id, text, offset));
        id
    }

    /// Inserts a prepared node, re-indexing it to the next free position.
    pub fn insert(&mut self, mut node: StateNode) -> StateNodeId {
        let id = self.next_id();
        node.index = id;
        self.graph.add_node(node);
        id
    }

    /// Creates an unlabeled non-terminal attached to `anchor`.
    ///
    /// With [`NodeRole::Parent`] the new node becomes a parent of `anchor`,
    /// with [`NodeRole::Child`] an implicit child. Both the node and its
    /// creating edge are added, or neither.
    pub fn create_node(
        &mut self,
        anchor: StateNodeId,
        role: NodeRole,
        lab: Option<String>,
        swap_index: f64,
    ) -> Result<(StateNodeId, StateEdgeId), CoreError> {
        if self.node(anchor).is_none() {
            return Err(CoreError::NodeNotFound { id: anchor });
        }
        let id = self.insert(StateNode::non_terminal(self.next_id(), swap_index));
        let edge = match role {
            NodeRole::Parent => self.add_edge(id, anchor, lab, false)?,
            NodeRole::Child => self.add_edge(anchor, id, lab, false)?,
        };
        self.graph[NodeIndex::from(id)].origin = match role {
            NodeRole::Parent => NodeOrigin::Parent { edge },
            NodeRole::Child => NodeOrigin::Child { edge },
        };
        Ok((id, edge))
    }

    /// Appends an edge to `parent`'s outgoing and `child`'s incoming lists.
    pub fn add_edge(
        &mut self,
        parent: StateNodeId,
        child: StateNodeId,
        lab: Option<String>,
        remote: bool,
    ) -> Result<StateEdgeId, CoreError> {
        let p = NodeIndex::from(parent);
        let c = NodeIndex::from(child);
        let (child_height, child_anchors) = match self.graph.node_weight(c) {
            Some(node) if node.is_terminal() => (node.height, Some(node.anchors.clone())),
            Some(node) => (node.height, None),
            None => return Err(CoreError::NodeNotFound { id: child }),
        };
        if self.graph.node_weight(p).is_none() {
            return Err(CoreError::NodeNotFound { id: parent });
        }

        let edge = StateEdge::new(parent, child, lab, remote);
        let id = StateEdgeId::from(self.graph.add_edge(p, c, edge.clone()));
        let old_height = self.graph[p].height;
        self.graph[p].add_outgoing(id, &edge, child_height);
        self.graph[c].add_incoming(id, &edge);
        if let Some(anchors) = child_anchors {
            self.graph[p].anchors.extend(anchors);
        }
        if self.graph[p].height != old_height {
            self.propagate_height(parent);
        }
        self.invalidate_terminals(parent);
        Ok(id)
    }

    pub fn node(&self, id: StateNodeId) -> Option<&StateNode> {
        self.graph.node_weight(id.into())
    }

    pub fn edge(&self, id: StateEdgeId) -> Option<&StateEdge> {
        self.graph.edge_weight(EdgeIndex::from(id))
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.graph.node_weights()
    }

    /// All edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &StateEdge> {
        self.graph.edge_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of `id`, in the order they were added.
    pub fn outgoing_edges(&self, id: StateNodeId) -> impl Iterator<Item = &StateEdge> + '_ {
        self.node(id)
            .map(|n| n.outgoing())
            .unwrap_or_default()
            .iter()
            .filter_map(|e| self.edge(*e))
    }

    /// Incoming edges of `id`, in the order they were added.
    pub fn incoming_edges(&self, id: StateNodeId) -> impl Iterator<Item = &StateEdge> + '_ {
        self.node(id)
            .map(|n| n.incoming())
            .unwrap_or_default()
            .iter()
            .filter_map(|e| self.edge(*e))
    }

    /// Whether an identical edge (same endpoints, label and remote flag) exists.
    pub fn contains_edge(&self, edge: &StateEdge) -> bool {
        self.outgoing_edges(edge.parent).any(|e| e == edge)
    }

    /// Whether any edge runs from `parent` to `child`.
    pub fn has_edge_between(&self, parent: StateNodeId, child: StateNodeId) -> bool {
        self.outgoing_edges(parent).any(|e| e.child == child)
    }

    /// `id` followed by every node reachable through outgoing edges, in
    /// breadth-first order. Each node appears once, cycles included.
    pub fn descendants(&self, id: StateNodeId) -> Vec<StateNodeId> {
        self.reachable(id, |node| node.children())
    }

    /// `id` followed by every node reachable through incoming edges.
    pub fn ancestors(&self, id: StateNodeId) -> Vec<StateNodeId> {
        self.reachable(id, |node| node.parents())
    }

    /// Terminal descendants of `id` in ascending index order.
    ///
    /// Computed on first use and cached until an edge is added below `id`.
    pub fn terminals(&self, id: StateNodeId) -> &[StateNodeId] {
        match self.node(id) {
            Some(node) => node.terminals.get_or_init(|| {
                let mut terminals: Vec<StateNodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|d| self.node(*d).is_some_and(StateNode::is_terminal))
                    .collect();
                terminals.sort();
                terminals
            }),
            None => &[],
        }
    }

    /// Whether adding `parent -> child` would close a directed cycle.
    pub fn would_create_cycle(&self, parent: StateNodeId, child: StateNodeId) -> bool {
        parent == child || self.descendants(child).contains(&parent)
    }

    pub fn set_label(&mut self, id: StateNodeId, label: NodeLabel) -> Result<(), CoreError> {
        let node = self
            .graph
            .node_weight_mut(id.into())
            .ok_or(CoreError::NodeNotFound { id })?;
        node.label = Some(label.core);
        node.category = label.category;
        Ok(())
    }

    pub fn set_property(
        &mut self,
        id: StateNodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        let node = self
            .graph
            .node_weight_mut(id.into())
            .ok_or(CoreError::NodeNotFound { id })?;
        node.properties.insert(name.into(), value.into());
        Ok(())
    }

    fn reachable<F>(&self, id: StateNodeId, next: F) -> Vec<StateNodeId>
    where
        F: Fn(&StateNode) -> &[StateNodeId],
    {
        let Some(start) = self.node(id) else {
            return Vec::new();
        };
        let mut result = vec![id];
        let mut visited: HashSet<StateNodeId> = HashSet::from([id]);
        let mut queue: VecDeque<StateNodeId> = next(start).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            if let Some(node) = self.node(current) {
                queue.extend(next(node).iter().copied());
            }
        }
        result
    }

    fn propagate_height(&mut self, from: StateNodeId) {
        let cap = self.graph.node_count();
        let mut queue: VecDeque<StateNodeId> =
            self.graph[NodeIndex::from(from)].parents.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            let idx = NodeIndex::from(id);
            let height = self.graph[idx]
                .children
                .iter()
                .map(|c| self.graph[NodeIndex::from(*c)].height + 1)
                .max()
                .unwrap_or(0)
                .min(cap);
            if height != self.graph[idx].height {
                self.graph[idx].height = height;
                queue.extend(self.graph[idx].parents.iter().copied());
            }
        }
    }

    fn invalidate_terminals(&mut self, from: StateNodeId) {
        for id in self.ancestors(from) {
            self.graph[NodeIndex::from(id)].terminals.take();
        }
    }
}

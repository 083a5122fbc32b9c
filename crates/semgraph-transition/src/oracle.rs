//! Dynamic oracle: action costs relative to a gold graph.
//!
//! The oracle keeps nothing across steps. Every query re-derives, from the
//! gold graph and the current [`ParserState`] alone:
//!
//! 1. an alignment of state nodes to gold ends: terminals by token offset,
//!    copied nodes by id, and created nodes by replaying their creation edge
//!    in index order (the first unaligned matching gold edge wins; implicit
//!    children prefer gold nodes that are built top-down),
//! 2. the pending gold items: unrealized edges, uncreated nodes, missing
//!    labels and missing properties,
//! 3. a cost per candidate action: the number of pending items it makes
//!    unreachable, or 1 for a labeled action no pending item asks for.
//!
//! A gold node is built top-down when no non-remote path leads from it to a
//! token; such nodes can only be created as implicit children.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use semgraph_core::action::{Action, ArcDirection, NodeRole};
use semgraph_core::error::CoreError;
use semgraph_core::gold::{GoldEnd, GoldGraph, ResolvedEdge};
use semgraph_core::graph::StateGraph;
use semgraph_core::id::{StateEdgeId, StateNodeId};
use semgraph_core::label::{has_placeholder, resolve_placeholders};
use semgraph_core::node::{NodeOrigin, StateNode};

use crate::catalog::ActionSet;
use crate::state::ParserState;

/// Cost of one valid action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCost {
    pub action: Action,
    pub cost: usize,
}

/// State-to-gold node alignment.
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    to_gold: HashMap<StateNodeId, GoldEnd>,
    from_gold: HashMap<GoldEnd, StateNodeId>,
}

impl Alignment {
    pub fn gold(&self, id: StateNodeId) -> Option<GoldEnd> {
        self.to_gold.get(&id).copied()
    }

    pub fn state(&self, end: GoldEnd) -> Option<StateNodeId> {
        self.from_gold.get(&end).copied()
    }

    fn is_aligned(&self, end: GoldEnd) -> bool {
        self.from_gold.contains_key(&end)
    }

    fn insert(&mut self, id: StateNodeId, end: GoldEnd) {
        if !self.is_aligned(end) {
            self.to_gold.insert(id, end);
            self.from_gold.insert(end, id);
        }
    }
}

/// Alignment plus the realized/pending status of every gold edge.
struct View {
    alignment: Alignment,
    realized: Vec<bool>,
}

pub struct Oracle<'g> {
    gold: &'g GoldGraph,
    edges: Vec<ResolvedEdge>,
    bottom_up: Vec<bool>,
}

impl<'g> Oracle<'g> {
    pub fn new(gold: &'g GoldGraph) -> Result<Self, CoreError> {
        let edges = gold.resolve_edges()?;
        let mut bottom_up = vec![false; gold.nodes.len()];
        loop {
            let mut changed = false;
            for edge in edges.iter().filter(|e| !e.remote) {
                let reaches = match edge.child {
                    GoldEnd::Token(_) => true,
                    GoldEnd::Node(child) => bottom_up[child],
                };
                if reaches && !bottom_up[edge.parent] {
                    bottom_up[edge.parent] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        for node in &gold.nodes {
            if let Some(label) = node.label.as_deref().filter(|l| has_placeholder(l)) {
                warn!(node = %node.id, label, "gold label has an unresolved placeholder, any label is accepted");
            }
        }
        Ok(Oracle {
            gold,
            edges,
            bottom_up,
        })
    }

    pub fn gold(&self) -> &GoldGraph {
        self.gold
    }

    /// Whether gold node `position` is created top-down.
    pub fn is_top_down(&self, position: usize) -> bool {
        !self.bottom_up[position]
    }

    /// Aligns every state node that can be traced to a gold end.
    pub fn align(&self, graph: &StateGraph) -> Alignment {
        let mut alignment = Alignment::default();
        for node in graph.nodes() {
            let end = match node.origin {
                NodeOrigin::Terminal => node.anchors.iter().next().map(|&k| GoldEnd::Token(k)),
                NodeOrigin::Copied => self.gold.node_position(&node.id).map(GoldEnd::Node),
                NodeOrigin::Parent { edge } => self.align_created(graph, edge, NodeRole::Parent, &alignment),
                NodeOrigin::Child { edge } => self.align_created(graph, edge, NodeRole::Child, &alignment),
            };
            if let Some(end) = end {
                alignment.insert(node.index, end);
            }
        }
        alignment
    }

    fn align_created(
        &self,
        graph: &StateGraph,
        edge: StateEdgeId,
        role: NodeRole,
        alignment: &Alignment,
    ) -> Option<GoldEnd> {
        let edge = graph.edge(edge)?;
        match role {
            NodeRole::Parent => {
                let child = alignment.gold(edge.child)?;
                self.parent_candidate(child, edge.label(), alignment)
                    .map(GoldEnd::Node)
            }
            NodeRole::Child => {
                let GoldEnd::Node(parent) = alignment.gold(edge.parent)? else {
                    return None;
                };
                let mut candidates = self.child_candidates(parent, edge.label(), alignment);
                candidates.sort_by_key(|&(order, child)| (self.bottom_up[child], order));
                candidates.first().map(|&(_, child)| GoldEnd::Node(child))
            }
        }
    }

    /// First unaligned gold parent of `child` through a non-remote edge
    /// labeled `label`.
    fn parent_candidate(&self, child: GoldEnd, label: Option<&str>, alignment: &Alignment) -> Option<usize> {
        self.edges
            .iter()
            .find(|e| {
                !e.remote
                    && e.child == child
                    && e.label.as_deref() == label
                    && !alignment.is_aligned(GoldEnd::Node(e.parent))
            })
            .map(|e| e.parent)
    }

    /// Unaligned gold children of `parent` through non-remote edges labeled
    /// `label`, as `(edge order, child position)`.
    fn child_candidates(&self, parent: usize, label: Option<&str>, alignment: &Alignment) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.remote && e.parent == parent && e.label.as_deref() == label)
            .filter_map(|(order, e)| match e.child {
                GoldEnd::Node(child) if !alignment.is_aligned(e.child) => Some((order, child)),
                _ => None,
            })
            .collect()
    }

    fn view(&self, graph: &StateGraph) -> View {
        let alignment = self.align(graph);
        let built: HashSet<(usize, GoldEnd, Option<&str>, bool)> = graph
            .edges()
            .filter_map(|e| {
                let GoldEnd::Node(parent) = alignment.gold(e.parent)? else {
                    return None;
                };
                let child = alignment.gold(e.child)?;
                Some((parent, child, e.label(), e.remote))
            })
            .collect();
        let realized = self
            .edges
            .iter()
            .map(|e| built.contains(&(e.parent, e.child, e.label.as_deref(), e.remote)))
            .collect();
        View {
            alignment,
            realized,
        }
    }

    fn label_pending(&self, position: usize, node: Option<&StateNode>) -> bool {
        self.gold.nodes[position].label.is_some() && node.map_or(true, |n| n.label.is_none())
    }

    fn properties_pending(&self, position: usize, node: Option<&StateNode>) -> usize {
        let gold = &self.gold.nodes[position].properties;
        match node {
            Some(node) => gold.keys().filter(|k| !node.properties.contains_key(*k)).count(),
            None => gold.len(),
        }
    }

    /// Pending items involving the node aligned to `end`.
    fn items_on(&self, graph: &StateGraph, view: &View, end: GoldEnd) -> usize {
        let edges = self
            .edges
            .iter()
            .zip(&view.realized)
            .filter(|(e, realized)| !**realized && (GoldEnd::Node(e.parent) == end || e.child == end))
            .count();
        match end {
            GoldEnd::Node(position) => {
                let node = view.alignment.state(end).and_then(|id| graph.node(id));
                edges
                    + usize::from(self.label_pending(position, node))
                    + self.properties_pending(position, node)
            }
            GoldEnd::Token(_) => edges,
        }
    }

    /// All pending gold items.
    fn total_pending(&self, graph: &StateGraph, view: &View) -> usize {
        let edges = view.realized.iter().filter(|r| !**r).count();
        let nodes: usize = (0..self.gold.nodes.len())
            .map(|position| {
                let end = GoldEnd::Node(position);
                let node = view.alignment.state(end).and_then(|id| graph.node(id));
                usize::from(node.is_none())
                    + usize::from(self.label_pending(position, node))
                    + self.properties_pending(position, node)
            })
            .sum();
        edges + nodes
    }

    fn edge_pending(
        &self,
        view: &View,
        parent: GoldEnd,
        child: GoldEnd,
        label: Option<&str>,
        remote: bool,
    ) -> bool {
        let GoldEnd::Node(parent) = parent else {
            return false;
        };
        self.edges.iter().zip(&view.realized).any(|(e, realized)| {
            !*realized
                && e.parent == parent
                && e.child == child
                && e.label.as_deref() == label
                && e.remote == remote
        })
    }

    /// Whether the label core matches gold node `position`, directly or
    /// after resolving placeholders against the node's first terminal.
    fn label_matches(&self, graph: &StateGraph, node: &StateNode, position: usize, label: &str) -> bool {
        let Some(gold) = self.gold.nodes[position].label.as_deref() else {
            return false;
        };
        if has_placeholder(gold) || label == gold {
            return true;
        }
        let word = graph
            .terminals(node.index)
            .first()
            .and_then(|t| graph.node(*t))
            .and_then(|t| t.text.as_deref());
        resolve_placeholders(label, word) == gold
    }

    fn cost_in(&self, state: &ParserState<'_>, view: &View, action: &Action) -> usize {
        let graph = state.graph();
        let aligned = |node: Option<&StateNode>| node.and_then(|n| view.alignment.gold(n.index));
        let s0 = state.s(0);
        let zero_if = |cond: bool| usize::from(!cond);
        match action {
            Action::Shift => 0,
            Action::Finish => self.total_pending(graph, view),
            Action::Reduce => aligned(s0).map_or(0, |end| self.items_on(graph, view, end)),
            Action::Swap => {
                let Some(end) = aligned(s0) else {
                    return 1;
                };
                let deeper = &state.stack()[..state.stack().len().saturating_sub(2)];
                zero_if(deeper.iter().any(|id| {
                    view.alignment.gold(*id).is_some_and(|other| {
                        self.edge_pending_any(view, end, other) || self.edge_pending_any(view, other, end)
                    })
                }))
            }
            Action::Label { label } => match (s0, aligned(s0)) {
                (Some(node), Some(GoldEnd::Node(position))) => zero_if(
                    node.label.is_none() && self.label_matches(graph, node, position, label),
                ),
                _ => 1,
            },
            Action::Property { name, value } => match (s0, aligned(s0)) {
                (Some(node), Some(GoldEnd::Node(position))) => zero_if(
                    !node.properties.contains_key(name)
                        && self.gold.nodes[position].properties.get(name) == Some(value),
                ),
                _ => 1,
            },
            Action::Edge {
                label,
                direction,
                remote,
            } => {
                let (parent, child) = match direction {
                    ArcDirection::Left => (s0, state.s(1)),
                    ArcDirection::Right => (state.s(1), s0),
                };
                match (aligned(parent), aligned(child)) {
                    (Some(parent), Some(child)) => {
                        zero_if(self.edge_pending(view, parent, child, label.as_deref(), *remote))
                    }
                    _ => 1,
                }
            }
            Action::Node {
                label,
                role: NodeRole::Parent,
            } => match aligned(s0) {
                Some(end) => zero_if(
                    self.parent_candidate(end, label.as_deref(), &view.alignment)
                        .is_some(),
                ),
                None => 1,
            },
            Action::Node {
                label,
                role: NodeRole::Child,
            } => match aligned(s0) {
                Some(GoldEnd::Node(parent)) => zero_if(
                    self.child_candidates(parent, label.as_deref(), &view.alignment)
                        .iter()
                        .any(|&(_, child)| self.is_top_down(child)),
                ),
                _ => 1,
            },
        }
    }

    /// Whether any pending gold edge runs from `parent` to `child`.
    fn edge_pending_any(&self, view: &View, parent: GoldEnd, child: GoldEnd) -> bool {
        let GoldEnd::Node(parent) = parent else {
            return false;
        };
        self.edges
            .iter()
            .zip(&view.realized)
            .any(|(e, realized)| !*realized && e.parent == parent && e.child == child)
    }

    /// Cost of a single action in `state`.
    pub fn cost(&self, state: &ParserState<'_>, action: &Action) -> usize {
        let view = self.view(state.graph());
        self.cost_in(state, &view, action)
    }

    /// Costs of every currently valid action from `actions`.
    pub fn supervise(&self, state: &ParserState<'_>, actions: &ActionSet) -> Vec<ActionCost> {
        let view = self.view(state.graph());
        state
            .valid_actions(actions)
            .into_iter()
            .map(|action| ActionCost {
                cost: self.cost_in(state, &view, &action),
                action,
            })
            .collect()
    }

    /// Zero-cost valid actions, in catalog order.
    pub fn gold_actions(&self, state: &ParserState<'_>, actions: &ActionSet) -> Vec<Action> {
        self.supervise(state, actions)
            .into_iter()
            .filter(|c| c.cost == 0)
            .map(|c| c.action)
            .collect()
    }

    /// The single supervised action for `state`.
    ///
    /// Zero-cost actions are ranked by a fixed priority. Without any, the
    /// oracle falls back to REDUCE, then SHIFT, then FINISH, then the
    /// cheapest valid action.
    pub fn best_action(&self, state: &ParserState<'_>, actions: &ActionSet) -> Option<Action> {
        pick(&self.supervise(state, actions))
    }
}

/// Chooses among supervised costs, as [`Oracle::best_action`] does.
pub fn pick(costs: &[ActionCost]) -> Option<Action> {
    if let Some(best) = costs
        .iter()
        .filter(|c| c.cost == 0)
        .min_by_key(|c| priority(&c.action))
    {
        return Some(best.action.clone());
    }
    for fallback in [Action::Reduce, Action::Shift, Action::Finish] {
        if costs.iter().any(|c| c.action == fallback) {
            return Some(fallback);
        }
    }
    costs
        .iter()
        .min_by_key(|c| (c.cost, priority(&c.action)))
        .map(|c| c.action.clone())
}

/// Tie-break order among zero-cost actions; lower wins.
pub fn priority(action: &Action) -> u8 {
    match action {
        Action::Finish => 0,
        Action::Label { .. } => 1,
        Action::Property { .. } => 2,
        Action::Edge { .. } => 3,
        Action::Node {
            role: NodeRole::Parent,
            ..
        } => 4,
        Action::Node {
            role: NodeRole::Child,
            ..
        } => 5,
        Action::Reduce => 6,
        Action::Swap => 7,
        Action::Shift => 8,
    }
}

//! Parser state machine with check-then-act action application.
//!
//! A [`ParserState`] is one parse session: a stack, a buffer, the arena graph
//! and the history of applied actions. The session starts with every token
//! in the buffer and advances one [`Action`] at a time:
//!
//! - [`ParserState::check`] decides whether an action is valid, combining
//!   its structural precondition with every relevant constraint predicate,
//! - [`ParserState::apply`] re-checks and only then mutates, so a rejected
//!   action leaves the state untouched,
//! - [`ParserState::is_complete`] reports completion: FINISH was applied, or
//!   both stack and buffer are empty.
//!
//! The constraint profile is borrowed for the lifetime of the session and
//! never mutated, so many sessions may share one profile.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::{debug, trace};

use semgraph_constraints::{ConstraintProfile, Verdict};
use semgraph_core::action::{Action, ArcDirection, NodeRole};
use semgraph_core::anchor::compress_anchors;
use semgraph_core::edge::StateEdge;
use semgraph_core::graph::StateGraph;
use semgraph_core::id::StateNodeId;
use semgraph_core::label::{resolve_placeholders, NodeLabel};
use semgraph_core::node::StateNode;
use semgraph_core::output::{OutputEdge, OutputGraph, OutputNode};

use crate::catalog::ActionSet;
use crate::config::ParserConfig;
use crate::error::TransitionError;

/// One parse session.
pub struct ParserState<'c> {
    constraints: &'c dyn ConstraintProfile,
    config: ParserConfig,
    graph: StateGraph,
    /// Top is the last element.
    stack: Vec<StateNodeId>,
    buffer: VecDeque<StateNodeId>,
    history: Vec<Action>,
    terminal_count: usize,
    finished: bool,
}

impl<'c> ParserState<'c> {
    /// A fresh session: empty stack, one terminal per token in the buffer.
    pub fn new<S: AsRef<str>>(
        tokens: &[S],
        constraints: &'c dyn ConstraintProfile,
        config: ParserConfig,
    ) -> Self {
        let graph = StateGraph::from_tokens(tokens);
        let buffer = graph.nodes().map(|n| n.index).collect();
        ParserState {
            constraints,
            config,
            graph,
            stack: Vec::new(),
            buffer,
            history: Vec::new(),
            terminal_count: tokens.len(),
            finished: false,
        }
    }

    /// A session continuing from a previously materialized graph.
    ///
    /// Nodes and edges are copied in order. The buffer holds the terminals
    /// in token order followed by the parentless non-terminals, so further
    /// structure can be attached to them.
    pub fn resume(
        partial: &OutputGraph,
        constraints: &'c dyn ConstraintProfile,
        config: ParserConfig,
    ) -> Result<Self, TransitionError> {
        let mut graph = StateGraph::new();
        let mut ids: HashMap<NodeIndex<u32>, StateNodeId> = HashMap::new();
        for (position, node) in partial.nodes().enumerate() {
            let label = node.label.as_ref().map(|core| NodeLabel {
                core: core.clone(),
                category: node.category.clone(),
            });
            let copy = StateNode::copy(
                graph.next_id(),
                node.id.clone(),
                node.text.clone(),
                label,
                node.is_root,
                node.properties.clone(),
                &node.anchors,
            );
            ids.insert(NodeIndex::new(position), graph.insert(copy));
        }
        for (parent, child, edge) in partial.edges() {
            if let (Some(&p), Some(&c)) = (ids.get(&parent), ids.get(&child)) {
                graph.add_edge(p, c, edge.label.clone(), edge.remote)?;
            }
        }

        let mut terminals: Vec<&StateNode> = graph.nodes().filter(|n| n.is_terminal()).collect();
        terminals.sort_by_key(|n| (n.anchors.iter().next().copied(), n.index));
        let mut buffer: VecDeque<StateNodeId> = terminals.iter().map(|n| n.index).collect();
        let terminal_count = buffer.len();
        buffer.extend(
            graph
                .nodes()
                .filter(|n| !n.is_terminal() && n.parents().is_empty())
                .map(|n| n.index),
        );
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "resumed parse"
        );
        Ok(ParserState {
            constraints,
            config,
            graph,
            stack: Vec::new(),
            buffer,
            history: Vec::new(),
            terminal_count,
            finished: false,
        })
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn constraints(&self) -> &dyn ConstraintProfile {
        self.constraints
    }

    /// Stack contents, bottom first.
    pub fn stack(&self) -> &[StateNodeId] {
        &self.stack
    }

    /// Buffer contents, front first.
    pub fn buffer(&self) -> &VecDeque<StateNodeId> {
        &self.buffer
    }

    /// Applied actions in order.
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn steps(&self) -> usize {
        self.history.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    /// The `i`-th stack node from the top (`s(0)` is the top).
    pub fn s(&self, i: usize) -> Option<&StateNode> {
        let pos = self.stack.len().checked_sub(i + 1)?;
        self.graph.node(self.stack[pos])
    }

    /// The `i`-th buffer node from the front.
    pub fn b(&self, i: usize) -> Option<&StateNode> {
        self.buffer.get(i).and_then(|id| self.graph.node(*id))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_complete(&self) -> bool {
        self.finished || (self.stack.is_empty() && self.buffer.is_empty())
    }

    fn nonterminal_count(&self) -> usize {
        self.graph.node_count() - self.terminal_count
    }

    /// Whether `action` may be applied now, with the reason if not.
    pub fn check(&self, action: &Action) -> Verdict {
        if self.finished {
            return Verdict::Invalid("parse already finished".to_string());
        }
        self.check_structure(action)
            .and(|| self.constraints.allow_action(action, &self.history))
    }

    pub fn is_valid(&self, action: &Action) -> bool {
        self.check(action).is_valid()
    }

    /// Candidates from `actions` that pass [`check`](Self::check), in catalog order.
    pub fn valid_actions(&self, actions: &ActionSet) -> Vec<Action> {
        actions
            .iter()
            .filter(|action| match self.check(action) {
                Verdict::Valid => true,
                Verdict::Invalid(reason) => {
                    trace!(%action, %reason, "filtered candidate");
                    false
                }
            })
            .cloned()
            .collect()
    }

    fn check_structure(&self, action: &Action) -> Verdict {
        let policy = self.constraints.policy();
        match action {
            Action::Shift => Verdict::check(!self.buffer.is_empty(), || "buffer is empty".into()),
            Action::Reduce => match self.s(0) {
                None => Verdict::Invalid("stack is empty".into()),
                Some(s0) => Verdict::check(
                    !s0.parents().is_empty() || !s0.is_terminal() || policy.allow_orphan_terminals,
                    || format!("terminal {} has no parent", s0),
                ),
            },
            Action::Node { label, role } => {
                let Some(s0) = self.s(0) else {
                    return Verdict::Invalid("stack is empty".into());
                };
                // A parentless terminal can always get a parent; otherwise
                // it could never be reduced.
                let attaches_orphan = *role == NodeRole::Parent
                    && s0.is_terminal()
                    && s0.parents().is_empty();
                let cap = self.config.max_nodes(self.terminal_count);
                if !attaches_orphan && self.nonterminal_count() >= cap {
                    return Verdict::Invalid(format!("node limit {} reached", cap));
                }
                let fresh = StateNode::non_terminal(self.graph.next_id(), 0.0);
                let label = label.as_deref();
                match role {
                    NodeRole::Parent => self
                        .constraints
                        .allow_child(s0, label)
                        .and(|| self.constraints.allow_parent(&fresh, label))
                        .and(|| self.allow_new_edge(fresh.index, s0.index, label, false)),
                    NodeRole::Child => Verdict::check(!s0.is_terminal(), || {
                        format!("terminal {} cannot have children", s0)
                    })
                    .and(|| self.constraints.allow_outgoing(s0))
                    .and(|| self.constraints.allow_parent(s0, label))
                    .and(|| self.constraints.allow_child(&fresh, label))
                    .and(|| self.allow_new_edge(s0.index, fresh.index, label, false)),
                }
            }
            Action::Edge {
                label,
                direction,
                remote,
            } => {
                let (Some(s0), Some(s1)) = (self.s(0), self.s(1)) else {
                    return Verdict::Invalid("fewer than two nodes on the stack".into());
                };
                let (parent, child) = match direction {
                    ArcDirection::Left => (s0, s1),
                    ArcDirection::Right => (s1, s0),
                };
                let label = label.as_deref();
                Verdict::check(!*remote || self.config.remote_edges, || {
                    "remote edges are disabled".into()
                })
                .and(|| {
                    Verdict::check(!parent.is_terminal(), || {
                        format!("terminal {} cannot have children", parent)
                    })
                })
                .and(|| self.constraints.allow_outgoing(parent))
                .and(|| self.constraints.allow_parent(parent, label))
                .and(|| self.constraints.allow_child(child, label))
                .and(|| self.allow_new_edge(parent.index, child.index, label, *remote))
            }
            Action::Label { label } => {
                let Some(s0) = self.s(0) else {
                    return Verdict::Invalid("stack is empty".into());
                };
                let core = NodeLabel::parse(label, self.config.label_delimiter).core;
                Verdict::check(self.config.node_labels, || "node labels are disabled".into())
                    .and(|| {
                        Verdict::check(!s0.is_terminal(), || {
                            format!("terminal {} cannot be relabeled", s0)
                        })
                    })
                    .and(|| {
                        Verdict::check(s0.label.is_none(), || {
                            format!("node {} is already labeled", s0)
                        })
                    })
                    .and(|| self.constraints.allow_label(s0, &core))
            }
            Action::Property { name, value } => {
                let Some(s0) = self.s(0) else {
                    return Verdict::Invalid("stack is empty".into());
                };
                Verdict::check(self.config.properties, || "properties are disabled".into())
                    .and(|| {
                        Verdict::check(!s0.is_terminal(), || {
                            format!("terminal {} cannot have properties", s0)
                        })
                    })
                    .and(|| {
                        Verdict::check(!s0.properties.contains_key(name), || {
                            format!("node {} already has property {}", s0, name)
                        })
                    })
                    .and(|| self.constraints.allow_property_value(s0, name, value))
            }
            Action::Swap => {
                let (Some(s0), Some(s1)) = (self.s(0), self.s(1)) else {
                    return Verdict::Invalid("fewer than two nodes on the stack".into());
                };
                Verdict::check(self.config.swap, || "swap is disabled".into()).and(|| {
                    Verdict::check(s1.swap_index < s0.swap_index, || {
                        format!("{} and {} were already swapped", s1, s0)
                    })
                })
            }
            Action::Finish => Verdict::check(self.buffer.is_empty(), || "buffer is not empty".into())
                .and(|| {
                    Verdict::check(self.stack.len() <= 1, || {
                        format!("{} nodes left on the stack", self.stack.len())
                    })
                })
                .and(|| {
                    if policy.allow_orphan_terminals {
                        return Verdict::Valid;
                    }
                    match self
                        .graph
                        .nodes()
                        .find(|n| n.is_terminal() && n.parents().is_empty())
                    {
                        Some(orphan) => Verdict::Invalid(format!("terminal {} has no parent", orphan)),
                        None => Verdict::Valid,
                    }
                }),
        }
    }

    /// Edge-level constraint check for a prospective edge. Endpoints may be
    /// the not-yet-inserted node `self.graph.next_id()`.
    fn allow_new_edge(
        &self,
        parent: StateNodeId,
        child: StateNodeId,
        label: Option<&str>,
        remote: bool,
    ) -> Verdict {
        let edge = StateEdge::new(parent, child, label.map(str::to_string), remote);
        self.constraints.allow_edge(&self.graph, &edge)
    }

    /// Applies `action` if it is valid; otherwise returns
    /// [`TransitionError::InvalidAction`] and leaves the state unchanged.
    pub fn apply(&mut self, action: &Action) -> Result<(), TransitionError> {
        if let Verdict::Invalid(reason) = self.check(action) {
            return Err(TransitionError::InvalidAction {
                action: action.clone(),
                reason,
            });
        }
        match action {
            Action::Shift => {
                if let Some(b0) = self.buffer.pop_front() {
                    self.stack.push(b0);
                }
            }
            Action::Reduce => {
                self.stack.pop();
            }
            Action::Node { label, role } => {
                if let Some(&s0) = self.stack.last() {
                    let swap_index = self.new_swap_index(s0);
                    let (id, _) = self.graph.create_node(s0, *role, label.clone(), swap_index)?;
                    self.buffer.push_front(id);
                }
            }
            Action::Edge {
                label,
                direction,
                remote,
            } => {
                let n = self.stack.len();
                let (s0, s1) = (self.stack[n - 1], self.stack[n - 2]);
                let (parent, child) = match direction {
                    ArcDirection::Left => (s0, s1),
                    ArcDirection::Right => (s1, s0),
                };
                self.graph.add_edge(parent, child, label.clone(), *remote)?;
            }
            Action::Label { label } => {
                if let Some(&s0) = self.stack.last() {
                    self.graph
                        .set_label(s0, NodeLabel::parse(label, self.config.label_delimiter))?;
                }
            }
            Action::Property { name, value } => {
                if let Some(&s0) = self.stack.last() {
                    self.graph.set_property(s0, name.as_str(), value.as_str())?;
                }
            }
            Action::Swap => {
                let s1 = self.stack.remove(self.stack.len() - 2);
                self.buffer.push_front(s1);
            }
            Action::Finish => self.finished = true,
        }
        self.history.push(action.clone());
        debug!(
            step = self.history.len(),
            %action,
            stack = self.stack.len(),
            buffer = self.buffer.len(),
            "applied action"
        );
        Ok(())
    }

    /// Mean of the stack top's and buffer head's swap indices, or the new
    /// node's own index when the buffer is empty.
    fn new_swap_index(&self, s0: StateNodeId) -> f64 {
        let s0 = self.graph.node(s0).map(|n| n.swap_index);
        let b0 = self.b(0).map(|n| n.swap_index);
        match (s0, b0) {
            (Some(s0), Some(b0)) => (s0 + b0) / 2.0,
            _ => self.graph.next_id().0 as f64,
        }
    }

    /// Materializes the output graph of a completed parse.
    pub fn output(&self) -> Result<OutputGraph, TransitionError> {
        if !self.is_complete() {
            return Err(TransitionError::NotComplete);
        }
        Ok(self.snapshot())
    }

    /// Materializes the graph built so far, complete or not.
    ///
    /// `<w>` placeholders in labels and property values resolve to the text
    /// of the node's first terminal. Every parentless non-terminal is a root.
    pub fn snapshot(&self) -> OutputGraph {
        let mut output = OutputGraph::new();
        let mut ids = Vec::with_capacity(self.graph.node_count());
        for node in self.graph.nodes() {
            let word = self
                .graph
                .terminals(node.index)
                .first()
                .and_then(|t| self.graph.node(*t))
                .and_then(|t| t.text.as_deref());
            let id = if node.id.is_empty() {
                node.index.to_string()
            } else {
                node.id.clone()
            };
            ids.push(output.add_node(OutputNode {
                id,
                text: node.text.clone(),
                label: node.label.as_deref().map(|l| resolve_placeholders(l, word)),
                category: node.category.clone(),
                properties: node
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), resolve_placeholders(v, word)))
                    .collect(),
                anchors: compress_anchors(&node.anchors),
                is_root: !node.is_terminal() && node.parents().is_empty(),
            }));
        }
        for edge in self.graph.edges() {
            output.add_edge(
                ids[edge.parent.index()],
                ids[edge.child.index()],
                OutputEdge {
                    label: edge.lab.clone(),
                    remote: edge.remote,
                },
            );
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semgraph_constraints::{AmrConstraints, ConstraintPolicy, GenericConstraints, RoleSets};
    use semgraph_core::action::ActionKind;
    use std::sync::Arc;

    fn generic() -> GenericConstraints {
        GenericConstraints::default()
    }

    fn amr() -> AmrConstraints {
        AmrConstraints::new(Arc::new(RoleSets::new()))
    }

    fn run(state: &mut ParserState<'_>, actions: &[Action]) {
        for action in actions {
            state.apply(action).unwrap();
        }
    }

    #[test]
    fn initial_state() {
        let profile = generic();
        let state = ParserState::new(&["John", "arrived"], &profile, ParserConfig::default());
        assert!(state.stack().is_empty());
        assert_eq!(state.buffer().len(), 2);
        assert_eq!(state.b(0).unwrap().text.as_deref(), Some("John"));
        assert!(!state.is_complete());
    }

    #[test]
    fn shift_on_empty_buffer_is_excluded() {
        let profile = generic();
        let mut state = ParserState::new(&["a"], &profile, ParserConfig::default());
        state.apply(&Action::Shift).unwrap();
        let valid = state.valid_actions(&ActionSet::new(state.config()));
        assert!(!valid.contains(&Action::Shift));
        assert!(matches!(
            state.apply(&Action::Shift),
            Err(TransitionError::InvalidAction { .. })
        ));
    }

    #[test]
    fn john_arrived_scenario() {
        let profile = generic();
        let mut state = ParserState::new(&["John", "arrived"], &profile, ParserConfig::default());
        run(
            &mut state,
            &[
                Action::Shift,
                Action::Shift,
                Action::node(None, NodeRole::Parent),
                Action::Reduce,
                Action::Shift,
                Action::label("arrive-01"),
                Action::edge(Some("ARG0"), ArcDirection::Left),
                Action::Swap,
                Action::Shift,
                Action::Reduce,
            ],
        );
        assert_eq!(state.stack().len(), 1);
        assert!(state.buffer().is_empty());
        assert!(state.is_valid(&Action::Finish));
        state.apply(&Action::Finish).unwrap();
        assert!(state.is_complete());

        let output = state.output().unwrap();
        let roots: Vec<_> = output.roots().collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].label.as_deref(), Some("arrive-01"));
        let mut children: Vec<_> = output
            .children(NodeIndex::new(2))
            .map(|(n, e)| (n.text.clone(), e.label.clone()))
            .collect();
        children.sort();
        assert_eq!(
            children,
            vec![
                (Some("John".to_string()), Some("ARG0".to_string())),
                (Some("arrived".to_string()), None),
            ]
        );
    }

    #[test]
    fn rejected_action_leaves_state_unchanged() {
        let profile = generic();
        let mut state = ParserState::new(&["a", "b"], &profile, ParserConfig::default());
        run(&mut state, &[Action::Shift, Action::Shift]);
        // Terminals cannot be parents.
        let err = state
            .apply(&Action::edge(Some("x"), ArcDirection::Left))
            .unwrap_err();
        assert!(err.to_string().contains("cannot have children"));
        assert_eq!(state.graph().edge_count(), 0);
        assert_eq!(state.steps(), 2);
        assert_eq!(state.stack().len(), 2);
    }

    #[test]
    fn reduce_requires_parent_unless_orphans_allowed() {
        let strict = generic();
        let mut state = ParserState::new(&["a"], &strict, ParserConfig::default());
        state.apply(&Action::Shift).unwrap();
        assert!(!state.is_valid(&Action::Reduce));

        let relaxed = GenericConstraints::new(ConstraintPolicy {
            allow_orphan_terminals: true,
            ..ConstraintPolicy::default()
        });
        let mut state = ParserState::new(&["a"], &relaxed, ParserConfig::default());
        state.apply(&Action::Shift).unwrap();
        assert!(state.is_valid(&Action::Reduce));
        state.apply(&Action::Reduce).unwrap();
        assert!(state.is_complete());
    }

    #[test]
    fn node_goes_to_buffer_front_with_mean_swap_index() {
        let profile = generic();
        let mut state = ParserState::new(&["a", "b"], &profile, ParserConfig::default());
        run(&mut state, &[Action::Shift, Action::node(Some("x"), NodeRole::Parent)]);
        let b0 = state.b(0).unwrap();
        assert!(!b0.is_terminal());
        assert_eq!(b0.swap_index, 0.5);
        assert_eq!(b0.children(), &[StateNodeId(0)]);

        run(&mut state, &[Action::Reduce, Action::Shift, Action::Shift]);
        run(&mut state, &[Action::node(None, NodeRole::Parent)]);
        // Buffer empty when the node was created: its own index.
        assert_eq!(state.b(0).unwrap().swap_index, 3.0);
    }

    #[test]
    fn swap_cannot_repeat_on_same_pair() {
        let profile = generic();
        let mut state = ParserState::new(&["a", "b"], &profile, ParserConfig::default());
        run(&mut state, &[Action::Shift, Action::Shift, Action::Swap]);
        assert_eq!(state.stack(), &[StateNodeId(1)]);
        assert_eq!(state.buffer().front(), Some(&StateNodeId(0)));
        state.apply(&Action::Shift).unwrap();
        let verdict = state.check(&Action::Swap);
        assert!(verdict.reason().unwrap().contains("already swapped"));
    }

    #[test]
    fn swap_disabled_by_config() {
        let profile = generic();
        let config = ParserConfig {
            swap: false,
            ..ParserConfig::default()
        };
        let mut state = ParserState::new(&["a", "b"], &profile, config);
        run(&mut state, &[Action::Shift, Action::Shift]);
        assert!(!state.is_valid(&Action::Swap));
    }

    #[test]
    fn label_is_final_once_assigned() {
        let profile = generic();
        let mut state = ParserState::new(&["Mary"], &profile, ParserConfig::default());
        run(
            &mut state,
            &[
                Action::Shift,
                Action::node(None, NodeRole::Parent),
                Action::Reduce,
                Action::Shift,
                Action::label("name|person"),
            ],
        );
        let s0 = state.s(0).unwrap();
        assert_eq!(s0.label.as_deref(), Some("name"));
        assert_eq!(s0.category.as_deref(), Some("person"));
        assert!(!state.is_valid(&Action::label("thing")));
    }

    #[test]
    fn property_once_per_name() {
        let profile = amr();
        let mut state = ParserState::new(&["not"], &profile, ParserConfig::default());
        run(
            &mut state,
            &[
                Action::Shift,
                Action::node(None, NodeRole::Parent),
                Action::Reduce,
                Action::Shift,
            ],
        );
        assert!(!state.is_valid(&Action::property("polarity", "+")));
        state.apply(&Action::property("polarity", "-")).unwrap();
        assert!(!state.is_valid(&Action::property("polarity", "-")));
    }

    #[test]
    fn day_node_needs_date_entity_parent() {
        let profile = amr();
        let day = Action::node(Some("day"), NodeRole::Child);
        for (label, allowed) in [("event", false), ("date-entity", true)] {
            let mut state = ParserState::new(&["today"], &profile, ParserConfig::default());
            run(
                &mut state,
                &[
                    Action::Shift,
                    Action::node(None, NodeRole::Parent),
                    Action::Reduce,
                    Action::Shift,
                    Action::label(label),
                ],
            );
            let mut actions = ActionSet::new(state.config());
            actions.observe(&day);
            assert_eq!(state.valid_actions(&actions).contains(&day), allowed, "{label}");
        }
    }

    #[test]
    fn node_limit() {
        let profile = generic();
        let config = ParserConfig {
            max_node_ratio: 1.0,
            ..ParserConfig::default()
        };
        let mut state = ParserState::new(&["a"], &profile, config);
        run(&mut state, &[Action::Shift, Action::node(None, NodeRole::Parent)]);
        let verdict = state.check(&Action::node(None, NodeRole::Parent));
        assert!(verdict.reason().unwrap().contains("node limit"));
    }

    #[test]
    fn orphan_terminal_gets_parent_past_node_limit() {
        let profile = generic();
        let config = ParserConfig {
            max_node_ratio: 1.0,
            ..ParserConfig::default()
        };
        let mut state = ParserState::new(&["a", "b"], &profile, config);
        let parent = Action::node(None, NodeRole::Parent);
        run(
            &mut state,
            &[
                Action::Shift,
                parent.clone(),
                Action::Shift,
                Action::Reduce,
                parent.clone(),
                Action::Shift,
                Action::Reduce,
                Action::Reduce,
                Action::Shift,
            ],
        );
        // Budget spent, "b" on the stack without a parent.
        assert_eq!(state.graph().node_count(), 4);
        assert!(!state.is_valid(&Action::Reduce));
        let valid = state.valid_actions(&ActionSet::new(state.config()));
        assert_eq!(valid, vec![parent.clone()]);

        run(&mut state, &[parent, Action::Reduce, Action::Shift]);
        // Non-terminals still respect the cap.
        let verdict = state.check(&Action::node(None, NodeRole::Child));
        assert!(verdict.reason().unwrap().contains("node limit"));
        state.apply(&Action::Finish).unwrap();
        assert!(state.is_complete());
    }

    #[test]
    fn finish_requires_parented_terminals() {
        let profile = generic();
        let mut state = ParserState::new(&["a"], &profile, ParserConfig::default());
        state.apply(&Action::Shift).unwrap();
        let verdict = state.check(&Action::Finish);
        assert!(verdict.reason().unwrap().contains("has no parent"));
        assert!(matches!(state.output(), Err(TransitionError::NotComplete)));
        assert_eq!(state.snapshot().node_count(), 1);
    }

    #[test]
    fn placeholders_resolve_in_output() {
        let profile = amr();
        let mut state = ParserState::new(&["arrive"], &profile, ParserConfig::default());
        run(
            &mut state,
            &[
                Action::Shift,
                Action::node(None, NodeRole::Parent),
                Action::Reduce,
                Action::Shift,
                Action::label("<w>-01"),
                Action::Finish,
            ],
        );
        let output = state.output().unwrap();
        let root = output.roots().next().unwrap();
        assert_eq!(root.label.as_deref(), Some("arrive-01"));
    }

    #[test]
    fn finished_state_accepts_nothing() {
        let profile = amr();
        let mut state = ParserState::new(&["a"], &profile, ParserConfig::default());
        run(&mut state, &[Action::Shift, Action::Finish]);
        assert!(state.is_finished());
        assert!(state.valid_actions(&ActionSet::new(state.config())).is_empty());
    }

    #[test]
    fn resume_copies_graph_and_refills_buffer() {
        let profile = generic();
        let mut state = ParserState::new(&["John", "arrived"], &profile, ParserConfig::default());
        run(
            &mut state,
            &[
                Action::Shift,
                Action::Shift,
                Action::node(None, NodeRole::Parent),
                Action::Reduce,
                Action::Shift,
                Action::label("arrive-01"),
            ],
        );
        let partial = state.snapshot();

        let resumed = ParserState::resume(&partial, &profile, ParserConfig::default()).unwrap();
        assert_eq!(resumed.graph().node_count(), 3);
        assert_eq!(resumed.graph().edge_count(), 1);
        assert_eq!(resumed.terminal_count(), 2);
        assert_eq!(
            resumed.buffer().iter().copied().collect::<Vec<_>>(),
            vec![StateNodeId(0), StateNodeId(1), StateNodeId(2)]
        );
        let root = resumed.graph().node(StateNodeId(2)).unwrap();
        assert_eq!(root.label.as_deref(), Some("arrive-01"));
        assert!(resumed.history().iter().all(|a| !a.is_kind(ActionKind::Finish)));
        assert!(resumed.snapshot().is_isomorphic(&partial));
    }
}

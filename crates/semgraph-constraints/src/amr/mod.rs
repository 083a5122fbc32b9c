//! AMR constraint profile.
//!
//! Multigraph, orphan terminals permitted, implicit nodes may have
//! children, and nodes receiving `polarity`-like relations stay childless.
//! Label and value rules come from [`rules::is_valid_arg`].

pub mod rules;

use std::sync::Arc;

use semgraph_core::node::StateNode;

use crate::policy::ConstraintPolicy;
use crate::profile::ConstraintProfile;
use crate::resources::RoleSets;
use crate::verdict::Verdict;

use rules::is_valid_arg;

/// Relations after which a node receives no children.
pub const CHILDLESS_TRIGGERS: [&str; 5] = ["polarity", "century", "decade", "polite", "li"];

#[derive(Debug, Clone)]
pub struct AmrConstraints {
    policy: ConstraintPolicy,
    rolesets: Arc<RoleSets>,
}

impl AmrConstraints {
    pub fn new(rolesets: Arc<RoleSets>) -> Self {
        AmrConstraints {
            policy: Self::default_policy(),
            rolesets,
        }
    }

    pub fn with_policy(policy: ConstraintPolicy, rolesets: Arc<RoleSets>) -> Self {
        AmrConstraints { policy, rolesets }
    }

    pub fn default_policy() -> ConstraintPolicy {
        ConstraintPolicy {
            multigraph: true,
            require_implicit_childless: false,
            allow_orphan_terminals: true,
            childless_incoming_trigger: CHILDLESS_TRIGGERS.iter().map(|t| t.to_string()).collect(),
            allow_cycles: false,
            max_consecutive_swaps: None,
        }
    }
}

impl ConstraintProfile for AmrConstraints {
    fn name(&self) -> &str {
        "amr"
    }

    fn policy(&self) -> &ConstraintPolicy {
        &self.policy
    }

    // Terminal labels are token text, not concepts: no rule applies to them.

    fn allow_parent(&self, node: &StateNode, lab: Option<&str>) -> Verdict {
        match lab {
            Some(lab) if !node.is_terminal() => {
                is_valid_arg(node.label.as_deref(), &[lab], true, true, &self.rolesets)
            }
            _ => Verdict::Valid,
        }
    }

    fn allow_child(&self, node: &StateNode, lab: Option<&str>) -> Verdict {
        match lab {
            Some(lab) if !node.is_terminal() => {
                is_valid_arg(node.label.as_deref(), &[lab], false, true, &self.rolesets)
            }
            _ => Verdict::Valid,
        }
    }

    fn allow_label(&self, node: &StateNode, label: &str) -> Verdict {
        let outgoing: Vec<&str> = node.outgoing_labs().iter().map(String::as_str).collect();
        let incoming: Vec<&str> = node.incoming_labs().iter().map(String::as_str).collect();
        let check = |labs: &[&str], is_parent| {
            if labs.is_empty() {
                Verdict::Valid
            } else {
                is_valid_arg(Some(label), labs, is_parent, true, &self.rolesets)
            }
        };
        check(&outgoing, true).and(|| check(&incoming, false))
    }

    fn allow_property_value(&self, _node: &StateNode, prop: &str, value: &str) -> Verdict {
        is_valid_arg(Some(value), &[prop], false, false, &self.rolesets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semgraph_core::action::NodeRole;
    use semgraph_core::edge::StateEdge;
    use semgraph_core::graph::StateGraph;
    use semgraph_core::id::StateNodeId;
    use semgraph_core::label::NodeLabel;

    fn profile() -> AmrConstraints {
        let mut rolesets = RoleSets::new();
        rolesets.insert("arrive-01", ["0", "1"]);
        AmrConstraints::new(Arc::new(rolesets))
    }

    fn labeled_parent(label: &str) -> (StateGraph, StateNodeId) {
        let mut graph = StateGraph::from_tokens(&["today"]);
        let (p, _) = graph
            .create_node(StateNodeId(0), NodeRole::Parent, None, 0.5)
            .unwrap();
        graph.set_label(p, NodeLabel::parse(label, '|')).unwrap();
        (graph, p)
    }

    #[test]
    fn day_child_requires_date_entity_parent() {
        let amr = profile();
        let (graph, p) = labeled_parent("event");
        let verdict = amr.allow_parent(graph.node(p).unwrap(), Some("day"));
        assert!(verdict.reason().unwrap().contains("incompatible as parent of day"));

        let (graph, p) = labeled_parent("date-entity");
        assert!(amr.allow_parent(graph.node(p).unwrap(), Some("day")).is_valid());
    }

    #[test]
    fn unlabeled_and_terminal_nodes_accept_any_relation() {
        let amr = profile();
        let graph = StateGraph::from_tokens(&["Monday"]);
        let terminal = graph.node(StateNodeId(0)).unwrap();
        assert!(amr.allow_child(terminal, Some("mod")).is_valid());
        assert!(amr.allow_parent(terminal, Some("day")).is_valid());

        let mut graph = StateGraph::from_tokens(&["x"]);
        let (p, _) = graph
            .create_node(StateNodeId(0), NodeRole::Parent, None, 0.5)
            .unwrap();
        assert!(amr.allow_parent(graph.node(p).unwrap(), Some("day")).is_valid());
    }

    #[test]
    fn label_checked_against_attached_edges() {
        let amr = profile();
        let mut graph = StateGraph::from_tokens(&["arrived", "John"]);
        let (p, _) = graph
            .create_node(StateNodeId(0), NodeRole::Parent, None, 0.5)
            .unwrap();
        graph
            .add_edge(p, StateNodeId(1), Some("ARG0".into()), false)
            .unwrap();
        let node = graph.node(p).unwrap();
        assert!(amr.allow_label(node, "arrive-01").is_valid());
        assert!(amr.allow_label(node, "date-entity").is_valid());

        graph
            .add_edge(p, StateNodeId(1), Some("ARG3".into()), false)
            .unwrap();
        let node = graph.node(p).unwrap();
        assert_eq!(amr.allow_label(node, "arrive-01").reason(), Some("valid args: 0, 1"));
    }

    #[test]
    fn property_values_use_constant_rules() {
        let amr = profile();
        let graph = StateGraph::from_tokens(&["x"]);
        let node = graph.node(StateNodeId(0)).unwrap();
        assert!(amr.allow_property_value(node, "polarity", "-").is_valid());
        assert!(!amr.allow_property_value(node, "polarity", "yes").is_valid());
        assert!(!amr.allow_property_value(node, "month", "13").is_valid());
    }

    #[test]
    fn multigraph_but_no_duplicates_or_cycles() {
        let amr = profile();
        let (graph, p) = labeled_parent("date-entity");
        let parallel = StateEdge::new(p, StateNodeId(0), Some("mod".into()), false);
        assert!(amr.allow_edge(&graph, &parallel).is_valid());
        let duplicate = StateEdge::new(p, StateNodeId(0), None, false);
        assert!(!amr.allow_edge(&graph, &duplicate).is_valid());
        let back = StateEdge::new(StateNodeId(0), p, None, false);
        assert!(!amr.allow_edge(&graph, &back).is_valid());
    }

    #[test]
    fn polarity_target_stays_childless() {
        let amr = profile();
        let mut graph = StateGraph::from_tokens(&["not"]);
        let (p, _) = graph
            .create_node(StateNodeId(0), NodeRole::Parent, None, 0.5)
            .unwrap();
        let (minus, _) = graph
            .create_node(p, NodeRole::Child, Some("polarity".into()), 1.0)
            .unwrap();
        assert!(!amr.allow_outgoing(graph.node(minus).unwrap()).is_valid());
        assert!(amr.allow_outgoing(graph.node(p).unwrap()).is_valid());
    }
}

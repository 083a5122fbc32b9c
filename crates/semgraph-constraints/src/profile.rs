//! The constraint capability interface.
//!
//! A [`ConstraintProfile`] is consulted, never mutated, by the parser. One
//! implementation exists per supported formalism; the parser only sees the
//! trait object it was constructed with.

use semgraph_core::action::{Action, ActionKind};
use semgraph_core::edge::StateEdge;
use semgraph_core::graph::StateGraph;
use semgraph_core::node::StateNode;

use crate::policy::ConstraintPolicy;
use crate::verdict::Verdict;

/// Formalism-specific validity predicates.
///
/// Every method has a permissive or policy-driven default, so a profile only
/// overrides the rules its formalism actually has.
pub trait ConstraintProfile: Send + Sync {
    fn name(&self) -> &str;

    fn policy(&self) -> &ConstraintPolicy;

    /// Whether `edge` may be added to `graph`.
    ///
    /// Rejects exact duplicates, parallel edges unless the policy is a
    /// multigraph, and cycles unless the policy allows them.
    fn allow_edge(&self, graph: &StateGraph, edge: &StateEdge) -> Verdict {
        let policy = self.policy();
        Verdict::check(!graph.contains_edge(edge), || {
            format!("edge {} already exists", edge)
        })
        .and(|| {
            Verdict::check(
                policy.multigraph || !graph.has_edge_between(edge.parent, edge.child),
                || format!("parallel edge {} in a simple graph", edge),
            )
        })
        .and(|| {
            Verdict::check(
                policy.allow_cycles || !graph.would_create_cycle(edge.parent, edge.child),
                || format!("edge {} closes a cycle", edge),
            )
        })
    }

    /// Whether `node` may gain any outgoing edge at all.
    fn allow_outgoing(&self, node: &StateNode) -> Verdict {
        let policy = self.policy();
        Verdict::check(
            !(policy.require_implicit_childless && node.is_implicit()),
            || format!("implicit node {} must stay childless", node),
        )
        .and(|| {
            match node
                .incoming_labs()
                .iter()
                .find(|lab| policy.childless_incoming_trigger.contains(lab.as_str()))
            {
                Some(lab) => Verdict::Invalid(format!(
                    "node {} received '{}' and must stay childless",
                    node, lab
                )),
                None => Verdict::Valid,
            }
        })
    }

    /// Whether `node` may be the parent of an edge labeled `lab`.
    fn allow_parent(&self, _node: &StateNode, _lab: Option<&str>) -> Verdict {
        Verdict::Valid
    }

    /// Whether `node` may be the child of an edge labeled `lab`.
    fn allow_child(&self, _node: &StateNode, _lab: Option<&str>) -> Verdict {
        Verdict::Valid
    }

    /// Whether `label` is consistent with all edges already attached to `node`.
    fn allow_label(&self, _node: &StateNode, _label: &str) -> Verdict {
        Verdict::Valid
    }

    /// Whether `node` may carry property `prop` with `value`.
    fn allow_property_value(&self, _node: &StateNode, _prop: &str, _value: &str) -> Verdict {
        Verdict::Valid
    }

    /// Sequence-level veto given the history applied so far.
    fn allow_action(&self, action: &Action, history: &[Action]) -> Verdict {
        match (action, self.policy().max_consecutive_swaps) {
            (Action::Swap, Some(limit)) => {
                let run = history
                    .iter()
                    .rev()
                    .take_while(|a| a.is_kind(ActionKind::Swap))
                    .count();
                Verdict::check(run < limit, || {
                    format!("{} consecutive swaps reached the limit of {}", run, limit)
                })
            }
            _ => Verdict::Valid,
        }
    }
}

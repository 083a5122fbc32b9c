//! The action vocabulary.
//!
//! An [`ActionSet`] is the ordered, de-duplicated catalog of candidate
//! actions offered to a parser state. It starts with the unlabeled
//! structural actions the configuration enables, grows while labeled
//! actions are observed (typically from oracle runs over a training
//! corpus), and is frozen by [`ActionSet::finalize`]. Positions are stable,
//! so a scorer may use them as class indices.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use semgraph_core::action::{Action, ArcDirection, NodeRole};
use semgraph_core::gold::{GoldGraph, GoldRef};

use crate::config::ParserConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionSet {
    actions: IndexSet<Action>,
    finalized: bool,
}

impl ActionSet {
    /// The structural actions enabled by `config`.
    pub fn new(config: &ParserConfig) -> Self {
        let mut set = ActionSet::default();
        set.observe(&Action::Shift);
        set.observe(&Action::Reduce);
        set.observe(&Action::node(None, NodeRole::Parent));
        set.observe(&Action::node(None, NodeRole::Child));
        for direction in [ArcDirection::Left, ArcDirection::Right] {
            set.observe(&Action::edge(None, direction));
            if config.remote_edges {
                set.observe(&Action::remote(None, direction));
            }
        }
        if config.swap {
            set.observe(&Action::Swap);
        }
        set.observe(&Action::Finish);
        set
    }

    /// Adds `action` unless the set is finalized. Returns whether it was new.
    pub fn observe(&mut self, action: &Action) -> bool {
        if self.finalized || self.actions.contains(action) {
            return false;
        }
        self.actions.insert(action.clone())
    }

    /// Adds every labeled action needed to build `gold`.
    pub fn observe_gold(&mut self, gold: &GoldGraph, config: &ParserConfig) {
        if config.node_labels {
            for label in gold.nodes.iter().filter_map(|n| n.label.as_deref()) {
                self.observe(&Action::label(label));
            }
        }
        if config.properties {
            for node in &gold.nodes {
                for (name, value) in &node.properties {
                    self.observe(&Action::property(name, value));
                }
            }
        }
        for edge in &gold.edges {
            let label = edge.label.as_deref();
            for direction in [ArcDirection::Left, ArcDirection::Right] {
                if edge.remote {
                    if config.remote_edges {
                        self.observe(&Action::remote(label, direction));
                    }
                } else {
                    self.observe(&Action::edge(label, direction));
                }
            }
            if !edge.remote {
                self.observe(&Action::node(label, NodeRole::Parent));
                if matches!(edge.target, GoldRef::Node(_)) {
                    self.observe(&Action::node(label, NodeRole::Child));
                }
            }
        }
    }

    /// Freezes the vocabulary: later observations are ignored.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn contains(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    /// Stable position of `action` in the vocabulary.
    pub fn index_of(&self, action: &Action) -> Option<usize> {
        self.actions.get_index_of(action)
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get_index(index)
    }
}

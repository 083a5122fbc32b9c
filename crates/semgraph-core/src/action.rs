//! The transition action alphabet.
//!
//! Actions are plain values: applying them is the job of the parser state,
//! validating them the job of the constraint layer. Labeled actions carry
//! their payload so that a scorer can rank them without further lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a newly created node relative to the stack top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The new node becomes a parent of the stack top.
    Parent,
    /// The new node becomes an implicit child of the stack top.
    Child,
}

/// Direction of an edge between the two topmost stack nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    /// Stack top is the parent of the second node.
    Left,
    /// Second node is the parent of the stack top.
    Right,
}

/// A transition action, with its label/value payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move the buffer head onto the stack.
    Shift,
    /// Pop the stack top without creating an edge.
    Reduce,
    /// Create a non-terminal linked to the stack top by an edge labeled `label`.
    Node {
        label: Option<String>,
        role: NodeRole,
    },
    /// Link the two topmost stack nodes.
    Edge {
        label: Option<String>,
        direction: ArcDirection,
        #[serde(default)]
        remote: bool,
    },
    /// Assign the stack top's node label (`core|category`).
    Label { label: String },
    /// Set a property on the stack top.
    Property { name: String, value: String },
    /// Move the second stack node back to the front of the buffer.
    Swap,
    /// Mark the parse complete.
    Finish,
}

/// Payload-free discriminant of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Shift,
    Reduce,
    Node,
    Edge,
    Label,
    Property,
    Swap,
    Finish,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Shift => ActionKind::Shift,
            Action::Reduce => ActionKind::Reduce,
            Action::Node { .. } => ActionKind::Node,
            Action::Edge { .. } => ActionKind::Edge,
            Action::Label { .. } => ActionKind::Label,
            Action::Property { .. } => ActionKind::Property,
            Action::Swap => ActionKind::Swap,
            Action::Finish => ActionKind::Finish,
        }
    }

    pub fn is_kind(&self, kind: ActionKind) -> bool {
        self.kind() == kind
    }

    pub fn node(label: Option<&str>, role: NodeRole) -> Self {
        Action::Node {
            label: label.map(str::to_string),
            role,
        }
    }

    pub fn edge(label: Option<&str>, direction: ArcDirection) -> Self {
        Action::Edge {
            label: label.map(str::to_string),
            direction,
            remote: false,
        }
    }

    pub fn remote(label: Option<&str>, direction: ArcDirection) -> Self {
        Action::Edge {
            label: label.map(str::to_string),
            direction,
            remote: true,
        }
    }

    pub fn label(label: &str) -> Self {
        Action::Label {
            label: label.to_string(),
        }
    }

    pub fn property(name: &str, value: &str) -> Self {
        Action::Property {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// The edge label carried by NODE and EDGE actions.
    pub fn edge_label(&self) -> Option<&str> {
        match self {
            Action::Node { label, .. } | Action::Edge { label, .. } => label.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn payload(label: &Option<String>) -> String {
            label
                .as_deref()
                .map(|l| format!("({})", l))
                .unwrap_or_default()
        }
        match self {
            Action::Shift => write!(f, "SHIFT"),
            Action::Reduce => write!(f, "REDUCE"),
            Action::Node { label, role } => {
                let role = match role {
                    NodeRole::Parent => "NODE",
                    NodeRole::Child => "IMPLICIT",
                };
                write!(f, "{}{}", role, payload(label))
            }
            Action::Edge {
                label,
                direction,
                remote,
            } => {
                let side = match direction {
                    ArcDirection::Left => "LEFT",
                    ArcDirection::Right => "RIGHT",
                };
                let kind = if *remote { "REMOTE" } else { "EDGE" };
                write!(f, "{}-{}{}", side, kind, payload(label))
            }
            Action::Label { label } => write!(f, "LABEL({})", label),
            Action::Property { name, value } => write!(f, "PROPERTY({}={})", name, value),
            Action::Swap => write!(f, "SWAP"),
            Action::Finish => write!(f, "FINISH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Action::Shift.kind(), ActionKind::Shift);
        assert_eq!(Action::node(Some("ARG0"), NodeRole::Parent).kind(), ActionKind::Node);
        assert_eq!(Action::remote(None, ArcDirection::Left).kind(), ActionKind::Edge);
        assert!(Action::Swap.is_kind(ActionKind::Swap));
    }

    #[test]
    fn display_names() {
        assert_eq!(Action::node(Some("ARG0"), NodeRole::Parent).to_string(), "NODE(ARG0)");
        assert_eq!(Action::node(Some("day"), NodeRole::Child).to_string(), "IMPLICIT(day)");
        assert_eq!(Action::edge(None, ArcDirection::Right).to_string(), "RIGHT-EDGE");
        assert_eq!(
            Action::remote(Some("ARG1"), ArcDirection::Left).to_string(),
            "LEFT-REMOTE(ARG1)"
        );
        assert_eq!(Action::property("polarity", "-").to_string(), "PROPERTY(polarity=-)");
    }

    #[test]
    fn edge_label_payload() {
        assert_eq!(Action::edge(Some("mod"), ArcDirection::Left).edge_label(), Some("mod"));
        assert_eq!(Action::label("date-entity").edge_label(), None);
    }

    #[test]
    fn serde_uses_type_tag() {
        let action = Action::edge(Some("ARG0"), ArcDirection::Left);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "edge");
        assert_eq!(json["direction"], "left");
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }
}

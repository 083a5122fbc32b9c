//! Construction-time policy flags shared by every constraint profile.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structural well-formedness policy of a formalism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintPolicy {
    /// Parallel edges between the same pair of nodes are permitted.
    pub multigraph: bool,
    /// Implicit nodes may never receive children.
    pub require_implicit_childless: bool,
    /// A terminal may be left without a parent at completion.
    pub allow_orphan_terminals: bool,
    /// Incoming edge labels after which a node must stay childless.
    pub childless_incoming_trigger: BTreeSet<String>,
    /// Edges closing a directed cycle are permitted.
    pub allow_cycles: bool,
    /// Upper bound on uninterrupted SWAP runs in the action history.
    pub max_consecutive_swaps: Option<usize>,
}

impl Default for ConstraintPolicy {
    fn default() -> Self {
        ConstraintPolicy {
            multigraph: false,
            require_implicit_childless: true,
            allow_orphan_terminals: false,
            childless_incoming_trigger: BTreeSet::new(),
            allow_cycles: true,
            max_consecutive_swaps: None,
        }
    }
}

/// Supported annotation schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formalism {
    Amr,
    #[default]
    Generic,
}

impl std::str::FromStr for Formalism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "amr" => Ok(Formalism::Amr),
            "generic" => Ok(Formalism::Generic),
            other => Err(format!("unknown formalism '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let policy: ConstraintPolicy =
            serde_json::from_str(r#"{"multigraph": true, "max_consecutive_swaps": 3}"#).unwrap();
        assert!(policy.multigraph);
        assert!(policy.require_implicit_childless);
        assert_eq!(policy.max_consecutive_swaps, Some(3));
    }

    #[test]
    fn formalism_from_str() {
        assert_eq!("AMR".parse::<Formalism>(), Ok(Formalism::Amr));
        assert!("ucca".parse::<Formalism>().is_err());
    }
}

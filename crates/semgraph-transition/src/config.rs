//! Parser configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use semgraph_constraints::{
    build_profile, AmrConstraints, ConstraintPolicy, ConstraintProfile, Formalism, RoleSets,
};
use semgraph_core::label::DEFAULT_DELIMITER;

/// Configuration for a parse session.
///
/// Deserializes from partial JSON: missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Which constraint profile to build.
    pub formalism: Formalism,
    /// Whether SWAP is part of the action alphabet.
    pub swap: bool,
    /// Overrides the policy's limit on uninterrupted SWAP runs.
    pub max_consecutive_swaps: Option<usize>,
    /// Whether LABEL is part of the action alphabet.
    pub node_labels: bool,
    /// Whether PROPERTY is part of the action alphabet.
    pub properties: bool,
    /// Whether EDGE may create remote edges.
    pub remote_edges: bool,
    /// Maximum number of non-terminal nodes per token.
    pub max_node_ratio: f64,
    /// Steps the driver allows per token.
    pub max_steps_per_token: usize,
    /// Steps the driver allows regardless of input length.
    pub min_steps: usize,
    /// Separator between a label's core and its category.
    pub label_delimiter: char,
    /// Replaces the formalism's default policy.
    pub policy: Option<ConstraintPolicy>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            formalism: Formalism::default(),
            swap: true,
            max_consecutive_swaps: None,
            node_labels: true,
            properties: true,
            remote_edges: true,
            max_node_ratio: 10.0,
            max_steps_per_token: 50,
            min_steps: 100,
            label_delimiter: DEFAULT_DELIMITER,
            policy: None,
        }
    }
}

impl ParserConfig {
    /// Hard step cap for an input of `tokens` tokens.
    pub fn step_limit(&self, tokens: usize) -> usize {
        self.min_steps + self.max_steps_per_token * tokens
    }

    /// Number of non-terminal nodes allowed for `tokens` tokens.
    pub fn max_nodes(&self, tokens: usize) -> usize {
        (self.max_node_ratio * tokens.max(1) as f64).ceil() as usize
    }

    /// The effective policy: the override or the formalism default, with
    /// `max_consecutive_swaps` applied on top.
    pub fn effective_policy(&self) -> ConstraintPolicy {
        let mut policy = self.policy.clone().unwrap_or_else(|| match self.formalism {
            Formalism::Amr => AmrConstraints::default_policy(),
            Formalism::Generic => ConstraintPolicy::default(),
        });
        if self.max_consecutive_swaps.is_some() {
            policy.max_consecutive_swaps = self.max_consecutive_swaps;
        }
        policy
    }

    /// Builds the constraint profile this configuration asks for.
    pub fn build_profile(&self, rolesets: Arc<RoleSets>) -> Box<dyn ConstraintProfile> {
        build_profile(self.formalism, Some(self.effective_policy()), rolesets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"formalism": "amr", "swap": false}"#).unwrap();
        assert_eq!(config.formalism, Formalism::Amr);
        assert!(!config.swap);
        assert!(config.node_labels);
        assert_eq!(config.label_delimiter, '|');
    }

    #[test]
    fn step_and_node_limits() {
        let config = ParserConfig {
            max_node_ratio: 1.5,
            ..ParserConfig::default()
        };
        assert_eq!(config.step_limit(2), 200);
        assert_eq!(config.max_nodes(3), 5);
        assert_eq!(config.max_nodes(0), 2);
    }

    #[test]
    fn swap_limit_overrides_formalism_policy() {
        let config = ParserConfig {
            formalism: Formalism::Amr,
            max_consecutive_swaps: Some(4),
            ..ParserConfig::default()
        };
        let policy = config.effective_policy();
        assert!(policy.multigraph);
        assert_eq!(policy.max_consecutive_swaps, Some(4));
        assert_eq!(config.build_profile(Arc::default()).name(), "amr");
    }
}

//! Action scoring policies.
//!
//! The driver asks an [`ActionScorer`] for one score per valid candidate and
//! applies the highest-scoring one. Learned models plug in here; the crate
//! ships an oracle-backed scorer for supervision and a seeded random scorer
//! for exploration and testing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use semgraph_core::action::Action;

use crate::catalog::ActionSet;
use crate::oracle::{pick, Oracle};
use crate::state::ParserState;

/// Scores the valid candidates of a state. Higher is better.
pub trait ActionScorer {
    /// Returns exactly one score per entry of `candidates`, in order.
    fn score(&mut self, state: &ParserState<'_>, candidates: &[Action]) -> Vec<f64>;
}

/// Follows the oracle: the preferred action scores 1, every other
/// candidate scores minus its cost.
pub struct OracleScorer<'o, 'g> {
    oracle: &'o Oracle<'g>,
    actions: &'o ActionSet,
}

impl<'o, 'g> OracleScorer<'o, 'g> {
    pub fn new(oracle: &'o Oracle<'g>, actions: &'o ActionSet) -> Self {
        OracleScorer { oracle, actions }
    }
}

impl ActionScorer for OracleScorer<'_, '_> {
    fn score(&mut self, state: &ParserState<'_>, candidates: &[Action]) -> Vec<f64> {
        let costs = self.oracle.supervise(state, self.actions);
        let best = pick(&costs);
        candidates
            .iter()
            .map(|action| {
                if best.as_ref() == Some(action) {
                    return 1.0;
                }
                let cost = match costs.iter().find(|c| &c.action == action) {
                    Some(c) => c.cost,
                    None => self.oracle.cost(state, action),
                };
                -(cost as f64)
            })
            .collect()
    }
}

/// Uniform random scores from a seeded generator.
pub struct RandomScorer {
    rng: ChaCha8Rng,
}

impl RandomScorer {
    pub fn new(seed: u64) -> Self {
        RandomScorer {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ActionScorer for RandomScorer {
    fn score(&mut self, _state: &ParserState<'_>, candidates: &[Action]) -> Vec<f64> {
        candidates.iter().map(|_| self.rng.gen::<f64>()).collect()
    }
}

/// Scores candidates by a fixed preference list; unlisted actions score 0.
///
/// Mostly useful for scripted tests and replaying recorded action sequences.
pub struct ScriptedScorer {
    script: std::vec::IntoIter<Action>,
}

impl ScriptedScorer {
    pub fn new(script: Vec<Action>) -> Self {
        ScriptedScorer {
            script: script.into_iter(),
        }
    }
}

impl ActionScorer for ScriptedScorer {
    fn score(&mut self, _state: &ParserState<'_>, candidates: &[Action]) -> Vec<f64> {
        let next = self.script.next();
        candidates
            .iter()
            .map(|action| if next.as_ref() == Some(action) { 1.0 } else { 0.0 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use semgraph_constraints::GenericConstraints;

    #[test]
    fn random_scorer_is_deterministic_per_seed() {
        let profile = GenericConstraints::default();
        let state = ParserState::new(&["a", "b"], &profile, ParserConfig::default());
        let candidates = vec![Action::Shift, Action::Reduce, Action::Finish];
        let a = RandomScorer::new(7).score(&state, &candidates);
        let b = RandomScorer::new(7).score(&state, &candidates);
        let c = RandomScorer::new(8).score(&state, &candidates);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn scripted_scorer_prefers_next_action() {
        let profile = GenericConstraints::default();
        let state = ParserState::new(&["a"], &profile, ParserConfig::default());
        let mut scorer = ScriptedScorer::new(vec![Action::Shift, Action::Reduce]);
        let candidates = vec![Action::Reduce, Action::Shift];
        assert_eq!(scorer.score(&state, &candidates), vec![0.0, 1.0]);
        assert_eq!(scorer.score(&state, &candidates), vec![1.0, 0.0]);
        assert_eq!(scorer.score(&state, &candidates), vec![0.0, 0.0]);
    }
}

//! Parse driver: runs a scorer against a parser state until completion.

use serde::Serialize;
use tracing::info;

use semgraph_constraints::ConstraintProfile;
use semgraph_core::action::Action;
use semgraph_core::gold::GoldGraph;
use semgraph_core::output::OutputGraph;

use crate::catalog::ActionSet;
use crate::config::ParserConfig;
use crate::error::TransitionError;
use crate::oracle::Oracle;
use crate::scorer::{ActionScorer, OracleScorer};
use crate::state::ParserState;

/// One applied step, recorded when tracing is enabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    /// 1-based step number.
    pub step: usize,
    pub action: Action,
    /// Number of valid candidates the scorer chose from.
    pub candidates: usize,
    /// Score of the chosen action.
    pub score: f64,
}

/// Result of a completed parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub graph: OutputGraph,
    /// Applied actions in order.
    pub actions: Vec<Action>,
    /// Empty unless tracing is enabled.
    pub trace: Vec<TraceEntry>,
}

/// Creates parse sessions over a shared profile and vocabulary.
pub struct Parser<'c> {
    constraints: &'c dyn ConstraintProfile,
    config: ParserConfig,
    actions: &'c ActionSet,
    trace: bool,
}

impl<'c> Parser<'c> {
    pub fn new(constraints: &'c dyn ConstraintProfile, config: ParserConfig, actions: &'c ActionSet) -> Self {
        Parser {
            constraints,
            config,
            actions,
            trace: false,
        }
    }

    /// Records a [`TraceEntry`] for every step.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn actions(&self) -> &ActionSet {
        self.actions
    }

    /// A fresh session for `tokens`.
    pub fn start<S: AsRef<str>>(&self, tokens: &[S]) -> ParserState<'c> {
        ParserState::new(tokens, self.constraints, self.config.clone())
    }

    /// Advances `state` until it is complete.
    ///
    /// Each step offers the valid candidates to `scorer` and applies the
    /// first highest-scoring one. Fails once the state's step limit is
    /// reached, or when an incomplete state has no valid candidate.
    pub fn run(
        &self,
        state: &mut ParserState<'_>,
        scorer: &mut dyn ActionScorer,
    ) -> Result<Vec<TraceEntry>, TransitionError> {
        let limit = state.config().step_limit(state.terminal_count());
        let mut trace = Vec::new();
        while !state.is_complete() {
            if state.steps() >= limit {
                return Err(TransitionError::StepLimitExceeded { limit });
            }
            let candidates = state.valid_actions(self.actions);
            if candidates.is_empty() {
                return Err(TransitionError::NoValidAction {
                    step: state.steps(),
                });
            }
            let scores = scorer.score(state, &candidates);
            let (chosen, score) = argmax(&candidates, &scores);
            state.apply(chosen)?;
            if self.trace {
                trace.push(TraceEntry {
                    step: state.steps(),
                    action: chosen.clone(),
                    candidates: candidates.len(),
                    score,
                });
            }
        }
        Ok(trace)
    }

    /// Parses `tokens` to completion and materializes the output graph.
    pub fn parse<S: AsRef<str>>(
        &self,
        tokens: &[S],
        scorer: &mut dyn ActionScorer,
    ) -> Result<ParseOutcome, TransitionError> {
        let mut state = self.start(tokens);
        let trace = self.run(&mut state, scorer)?;
        let graph = state.output()?;
        info!(
            tokens = tokens.len(),
            steps = state.steps(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "parse complete"
        );
        Ok(ParseOutcome {
            graph,
            actions: state.history().to_vec(),
            trace,
        })
    }

    /// Parses the tokens of `gold` following the oracle.
    ///
    /// The vocabulary must already contain the labeled actions `gold` needs,
    /// see [`ActionSet::observe_gold`].
    pub fn replay_oracle(&self, gold: &GoldGraph) -> Result<ParseOutcome, TransitionError> {
        let oracle = Oracle::new(gold)?;
        let mut scorer = OracleScorer::new(&oracle, self.actions);
        self.parse(&gold.tokens, &mut scorer)
    }
}

/// First candidate with the highest score. Missing scores count as -inf.
fn argmax<'a>(candidates: &'a [Action], scores: &[f64]) -> (&'a Action, f64) {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, _) in candidates.iter().enumerate() {
        let score = scores.get(i).copied().unwrap_or(f64::NEG_INFINITY);
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    (&candidates[best], best_score)
}

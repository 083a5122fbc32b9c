//! Transition-based semantic graph parsing.
//!
//! Builds a graph over a token sequence one discrete action at a time, under
//! a pluggable constraint profile.
//!
//! # Architecture
//!
//! - [`ParserState`] is one session: stack, buffer and the arena graph. It
//!   computes the valid-action set and applies actions check-then-act.
//! - [`ActionSet`] is the ordered action vocabulary offered to a state.
//! - [`Oracle`] computes per-action costs against a gold graph, recomputed
//!   from the gold graph and the state on every call.
//! - [`ActionScorer`] is the seam for learned models; [`OracleScorer`] and
//!   [`RandomScorer`] are built in.
//! - [`Parser`] drives a scorer to completion under a hard step cap.
//!
//! # Usage
//!
//! ```ignore
//! let profile = config.build_profile(Arc::new(RoleSets::new()));
//! let mut actions = ActionSet::new(&config);
//! actions.observe_gold(&gold, &config);
//! let parser = Parser::new(profile.as_ref(), config, &actions);
//! let outcome = parser.replay_oracle(&gold)?;
//! assert!(outcome.graph.is_isomorphic(&gold.to_output('|')?));
//! ```

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod oracle;
pub mod scorer;
pub mod state;

pub use catalog::ActionSet;
pub use config::ParserConfig;
pub use driver::{ParseOutcome, Parser, TraceEntry};
pub use error::TransitionError;
pub use oracle::{ActionCost, Alignment, Oracle};
pub use scorer::{ActionScorer, OracleScorer, RandomScorer, ScriptedScorer};
pub use state::ParserState;

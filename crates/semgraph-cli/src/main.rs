//! Semantic graph parser CLI.
//!
//! Provides the `semgraph` binary for working with gold graph corpora:
//!
//! - `oracle` replays the oracle over every gold graph and reports whether
//!   the parser reproduces it,
//! - `check` runs the constraint profile over the gold graphs themselves
//!   and prints every rejection with its reason.
//!
//! Gold files hold a JSON array of graphs or one graph per line. Results go
//! to stdout as JSON lines, logs go to stderr (`SEMGRAPH_LOG` or `RUST_LOG`).

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser as ClapParser, Subcommand};
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use semgraph_constraints::{ConstraintProfile, RoleSets, Verdict};
use semgraph_core::gold::GoldGraph;
use semgraph_transition::{ActionSet, Parser, ParserConfig, ParserState};

/// Transition-based semantic graph parser tools.
#[derive(ClapParser)]
#[command(name = "semgraph", about = "Transition-based semantic graph parser tools")]
struct Cli {
    /// Log at debug level unless a filter is set in the environment.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Replay the oracle over gold graphs and check the round trip.
    Oracle {
        /// Gold graph file (JSON array or JSON lines).
        #[arg(short, long)]
        gold: PathBuf,

        /// Parser configuration (JSON). Defaults apply otherwise.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Role-set table (CSV: predicate,role,role,...).
        #[arg(short, long)]
        rolesets: Option<PathBuf>,

        /// Include the per-step trace in the output.
        #[arg(long)]
        trace: bool,
    },
    /// Report constraint violations found in gold graphs.
    Check {
        /// Gold graph file (JSON array or JSON lines).
        #[arg(short, long)]
        gold: PathBuf,

        /// Parser configuration (JSON). Defaults apply otherwise.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Role-set table (CSV: predicate,role,role,...).
        #[arg(short, long)]
        rolesets: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Oracle {
            gold,
            config,
            rolesets,
            trace,
        } => run_oracle(&gold, config.as_deref(), rolesets.as_deref(), trace),
        Commands::Check {
            gold,
            config,
            rolesets,
        } => run_check(&gold, config.as_deref(), rolesets.as_deref()),
    };
    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("SEMGRAPH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Configuration, constraint profile and gold graphs for one command.
struct Setup {
    config: ParserConfig,
    profile: Box<dyn ConstraintProfile>,
    graphs: Vec<GoldGraph>,
}

impl Setup {
    fn load(gold: &Path, config: Option<&Path>, rolesets: Option<&Path>) -> Result<Self, String> {
        let config = match config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("failed to read config '{}': {}", path.display(), e))?;
                serde_json::from_str::<ParserConfig>(&text)
                    .map_err(|e| format!("invalid config '{}': {}", path.display(), e))?
            }
            None => ParserConfig::default(),
        };
        let rolesets = match rolesets {
            Some(path) => RoleSets::load(path).map_err(|e| e.to_string())?,
            None => RoleSets::new(),
        };
        let text = std::fs::read_to_string(gold)
            .map_err(|e| format!("failed to read gold file '{}': {}", gold.display(), e))?;
        let graphs = GoldGraph::many_from_json(&text)
            .map_err(|e| format!("invalid gold file '{}': {}", gold.display(), e))?;
        let profile = config.build_profile(Arc::new(rolesets));
        info!(
            graphs = graphs.len(),
            profile = profile.name(),
            "loaded gold graphs"
        );
        Ok(Setup {
            config,
            profile,
            graphs,
        })
    }
}

fn graph_id(graph: &GoldGraph, position: usize) -> String {
    graph.id.clone().unwrap_or_else(|| position.to_string())
}

/// Execute the oracle subcommand.
///
/// Returns exit code: 0 = every graph round-trips, 1 = some output differs
/// from its gold graph, 2 = some replay failed, 3 = I/O or input error.
fn run_oracle(gold: &Path, config: Option<&Path>, rolesets: Option<&Path>, trace: bool) -> i32 {
    let setup = match Setup::load(gold, config, rolesets) {
        Ok(setup) => setup,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };

    let mut actions = ActionSet::new(&setup.config);
    for graph in &setup.graphs {
        actions.observe_gold(graph, &setup.config);
    }
    actions.finalize();
    info!(actions = actions.len(), "action vocabulary finalized");

    let parser =
        Parser::new(setup.profile.as_ref(), setup.config.clone(), &actions).with_trace(trace);
    let delimiter = setup.config.label_delimiter;
    let (mut differing, mut failed) = (0usize, 0usize);
    for (position, graph) in setup.graphs.iter().enumerate() {
        let id = graph_id(graph, position);
        let outcome = match parser.replay_oracle(graph) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(graph = %id, error = %e, "oracle replay failed");
                failed += 1;
                continue;
            }
        };
        let round_trip = match graph.to_output(delimiter) {
            Ok(expected) => outcome.graph.is_isomorphic(&expected),
            Err(e) => {
                warn!(graph = %id, error = %e, "gold graph cannot be materialized");
                false
            }
        };
        if !round_trip {
            warn!(graph = %id, "oracle output differs from gold");
            differing += 1;
        }
        let mut record = json!({
            "id": id,
            "round_trip": round_trip,
            "actions": outcome.actions,
            "graph": outcome.graph,
        });
        if trace {
            record["trace"] = json!(outcome.trace);
        }
        println!("{}", record);
    }

    info!(
        graphs = setup.graphs.len(),
        differing, failed, "oracle replay finished"
    );
    if failed > 0 {
        2
    } else if differing > 0 {
        1
    } else {
        0
    }
}

/// One rejected element of a gold graph.
#[derive(Debug, PartialEq)]
struct Diagnostic {
    subject: String,
    reason: String,
}

/// Runs every node, edge, label and property of `graph` through `profile`.
fn diagnose(
    graph: &GoldGraph,
    profile: &dyn ConstraintProfile,
    config: &ParserConfig,
) -> Result<Vec<Diagnostic>, String> {
    let output = graph
        .to_output(config.label_delimiter)
        .map_err(|e| e.to_string())?;
    let state =
        ParserState::resume(&output, profile, config.clone()).map_err(|e| e.to_string())?;
    let graph = state.graph();

    let mut diagnostics = Vec::new();
    let mut report = |subject: String, verdict: Verdict| {
        if let Verdict::Invalid(reason) = verdict {
            diagnostics.push(Diagnostic { subject, reason });
        }
    };
    for node in graph.nodes().filter(|n| !n.is_terminal()) {
        if let Some(label) = &node.label {
            report(format!("node {}", node.id), profile.allow_label(node, label));
        }
        for (name, value) in &node.properties {
            report(
                format!("node {} property {}", node.id, name),
                profile.allow_property_value(node, name, value),
            );
        }
    }
    for edge in graph.edges() {
        let (Some(parent), Some(child)) = (graph.node(edge.parent), graph.node(edge.child)) else {
            continue;
        };
        let subject = format!("edge {} -{}-> {}", parent.id, edge.label().unwrap_or(""), child.id);
        report(subject.clone(), profile.allow_parent(parent, edge.label()));
        report(subject, profile.allow_child(child, edge.label()));
    }
    Ok(diagnostics)
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = no violations, 2 = violations found,
/// 3 = I/O or input error.
fn run_check(gold: &Path, config: Option<&Path>, rolesets: Option<&Path>) -> i32 {
    let setup = match Setup::load(gold, config, rolesets) {
        Ok(setup) => setup,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };

    let mut violations = 0usize;
    for (position, graph) in setup.graphs.iter().enumerate() {
        let id = graph_id(graph, position);
        let diagnostics = match diagnose(graph, setup.profile.as_ref(), &setup.config) {
            Ok(diagnostics) => diagnostics,
            Err(msg) => {
                eprintln!("Error: graph {}: {}", id, msg);
                return 3;
            }
        };
        for d in &diagnostics {
            println!(
                "{}",
                json!({"id": id, "subject": d.subject, "reason": d.reason})
            );
        }
        violations += diagnostics.len();
    }

    info!(graphs = setup.graphs.len(), violations, "constraint check finished");
    if violations > 0 {
        2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use semgraph_constraints::{AmrConstraints, Formalism};

    const BAD_DATE: &str = r#"{"id": "g1", "tokens": ["Monday"],
        "nodes": [
            {"id": "e", "label": "event", "anchors": [{"from": 0, "to": 1}]},
            {"id": "w", "label": "monday", "properties": {"day": "32"}}
        ],
        "edges": [{"source": "e", "target": {"node": "w"}, "label": "weekday"}]}"#;

    fn amr_config() -> ParserConfig {
        ParserConfig {
            formalism: Formalism::Amr,
            ..ParserConfig::default()
        }
    }

    #[test]
    fn diagnose_reports_reasons() {
        let gold = GoldGraph::from_json(BAD_DATE).unwrap();
        let profile = AmrConstraints::new(Arc::new(RoleSets::new()));
        let diagnostics = diagnose(&gold, &profile, &amr_config()).unwrap();
        assert!(diagnostics
            .iter()
            .any(|d| d.subject == "node w property day" && d.reason == "32 > 31"));
        assert!(diagnostics
            .iter()
            .any(|d| d.subject == "edge e -weekday-> w" && d.reason.contains("event")));
    }

    #[test]
    fn setup_loads_config_rolesets_and_gold() {
        let dir = tempfile::tempdir().unwrap();
        let gold = dir.path().join("gold.jsonl");
        std::fs::write(&gold, BAD_DATE.replace('\n', " ")).unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{"formalism": "amr"}"#).unwrap();
        let rolesets = dir.path().join("rolesets.csv");
        let mut file = std::fs::File::create(&rolesets).unwrap();
        writeln!(file, "arrive-01,0,1,4").unwrap();

        let setup = Setup::load(&gold, Some(&config), Some(&rolesets)).unwrap();
        assert_eq!(setup.graphs.len(), 1);
        assert_eq!(setup.profile.name(), "amr");
        assert_eq!(graph_id(&setup.graphs[0], 0), "g1");
    }

    #[test]
    fn setup_reports_missing_gold_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Setup::load(&dir.path().join("missing.json"), None, None)
            .err()
            .unwrap();
        assert!(err.contains("failed to read gold file"));
    }
}

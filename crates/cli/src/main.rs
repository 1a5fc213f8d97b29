//! recoveryctl - analyze, score and simulate recovery coordination programs.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recovery_core::{Clock, ConstraintId, CoordinationProgram, CorrelationId, RunId, SystemClock};
use recovery_planner::{
    create_policy, enforce_hard_constraints, rank_candidates, select_candidate,
    selection_policy_from_constraints, window_policy_from_constraints, CandidateGenerator,
    PlanBudget, SeedContext, SelectionRequest, SignalMap,
};
use recovery_quality::summarize_program_quality;
use recovery_simulation::{CoordinationSimulator, SimulationConfig};
use recovery_topology::summarize_topology;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recoveryctl")]
#[command(about = "Recovery coordination planning engine", long_about = None)]
struct Cli {
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProgramArg {
    /// Program JSON file
    program: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the step dependency graph
    Topology {
        #[command(flatten)]
        input: ProgramArg,
        /// Fail when the topology cannot be scheduled
        #[arg(long)]
        strict: bool,
    },
    /// Score constraint and step quality
    Quality {
        #[command(flatten)]
        input: ProgramArg,
    },
    /// Derive policies and the baseline decision
    Policy {
        #[command(flatten)]
        input: ProgramArg,
        /// Run id (defaults to tenant:program:millis)
        #[arg(long)]
        run_id: Option<String>,
        /// Constraints known to be violated
        #[arg(long = "violated")]
        violated: Vec<String>,
    },
    /// Generate, rank and select a candidate plan
    Select {
        #[command(flatten)]
        input: ProgramArg,
        /// Run id (defaults to tenant:program:millis)
        #[arg(long)]
        run_id: Option<String>,
        /// Signals JSON file keyed by candidate id
        #[arg(long)]
        signals: Option<PathBuf>,
        /// Candidates to generate
        #[arg(long, default_value = "5")]
        max_candidates: usize,
    },
    /// Simulate a coordination run
    Simulate {
        #[command(flatten)]
        input: ProgramArg,
        /// Signal limit
        #[arg(long, default_value = "8")]
        signal_limit: usize,
        /// Candidates to generate
        #[arg(long, default_value = "5")]
        max_candidates: usize,
        /// Constraints known to be violated
        #[arg(long = "violated")]
        violated: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let span = info_span!("recoveryctl", correlation_id = %CorrelationId::generate());
    run(cli).instrument(span).await
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let clock = SystemClock;

    match cli.command {
        Commands::Topology { input, strict } => {
            let program = load_program(&input.program).await?;
            let summary = summarize_topology(&program.steps);
            if strict {
                summary.ensure_valid()?;
            }
            if json {
                return print_json(&summary);
            }

            println!("Topology of {} ({} steps, {} edges)", program.id, summary.total_nodes, summary.edge_count);
            println!("  Order: {}", join(&summary.ordered, " -> "));
            for (layer, wave) in summary.waves.iter().enumerate() {
                println!("  Wave {layer}: {}", join(wave, ", "));
            }
            println!("  Max depth: {}", summary.max_depth);
            if summary.critical_path.is_empty() {
                println!("  Critical path: none");
            } else {
                println!("  Critical path: {} (cost {:.0})", join(&summary.critical_path, " -> "), summary.critical_cost);
            }
            for cycle in &summary.cycles {
                println!("  Cycle: {}", join(cycle, " -> "));
            }
            for dangling in &summary.dangling {
                println!("  Dangling: {} requires {}", dangling.step, dangling.missing);
            }
        }
        Commands::Quality { input } => {
            let program = load_program(&input.program).await?;
            let report = summarize_program_quality(&program);
            if json {
                return print_json(&report);
            }

            println!("Quality of {}: {:.2} (grade {})", program.id, report.overall, report.grade);
            println!("  Risk index: {:.2}", report.risk_index);
            for profile in &report.constraints {
                println!("  Constraint {} | {:?} | weight {:.2} | score {:.2}",
                    profile.constraint_id, profile.status, profile.weight, profile.score);
            }
            for profile in &report.steps {
                println!("  Step {} | {:?} | score {:.2}", profile.step_id, profile.status, profile.score);
            }
            for pressure in &report.scope_pressure {
                println!("  Scope {} | {} constraints | pressure {:.2}",
                    pressure.scope, pressure.constraints, pressure.pressure);
            }
        }
        Commands::Policy { input, run_id, violated } => {
            let program = load_program(&input.program).await?;
            let run_id = run_id.unwrap_or_else(|| default_run_id(&program, &clock).to_string());
            let violated = parse_constraint_ids(&violated)?;

            let window = window_policy_from_constraints(&program.constraints);
            let selection = selection_policy_from_constraints(&program.constraints);
            let decision = enforce_hard_constraints(
                &create_policy(program.tenant.as_str(), &run_id, &program.constraints, &clock),
                &violated,
            );
            if json {
                return print_json(&serde_json::json!({
                    "window": window,
                    "selection": selection,
                    "decision": decision,
                }));
            }

            println!("Policy for {} (run {})", program.id, decision.run_id);
            println!("  Windows: {} (max {} min)", window.windows.len(), window.max_window_minutes);
            println!("  Minimum resilience: {:.2}", window.min_resilience);
            println!("  Minimum confidence: {:.2}", selection.minimum_confidence);
            println!("  Deferral allowed: {}", selection.allow_deferred);
            println!("  Decision: {}", decision.decision);
            println!("  Reasons: {}", decision.reasons.join(", "));
            if !decision.blocked_constraints.is_empty() {
                println!("  Blocked constraints: {}", join(&decision.blocked_constraints, ", "));
            }
        }
        Commands::Select { input, run_id, signals, max_candidates } => {
            let program = load_program(&input.program).await?;
            let run_id = match run_id {
                Some(raw) => RunId::new(raw)?,
                None => default_run_id(&program, &clock),
            };
            let signals = match signals {
                Some(path) => load_signals(&path).await?,
                None => SignalMap::new(),
            };

            let topology = summarize_topology(&program.steps);
            let quality = summarize_program_quality(&program);
            let context = SeedContext {
                program: &program,
                topology: &topology,
                quality: &quality,
                run_id: &run_id,
            };
            let candidates = CandidateGenerator::new().generate_seeds(&context, max_candidates, clock.now());
            let budget = PlanBudget::for_program(&program);
            debug!(candidates = candidates.len(), ?budget, "candidates generated");

            let request = SelectionRequest {
                tenant: &program.tenant,
                run_id: &run_id,
                candidates: &candidates,
                signals: &signals,
                budget: &budget,
                constraints: &program.constraints,
            };
            let result = select_candidate(&request, &clock);
            if json {
                return print_json(&result);
            }

            println!("Selection for {} (run {})", program.id, result.run_id);
            for ranked in rank_candidates(&candidates, &signals, &budget) {
                println!("  #{} {} | score {} | signals {} | risk-adjusted {:.2}",
                    ranked.rank, ranked.candidate_id, ranked.score, ranked.phase_readiness, ranked.risk_adjusted);
            }
            println!("  Selected: {}", result.selected_candidate.id);
            println!("  Decision: {}", result.decision);
            println!("  Reasons: {}", result.reasons.join(", "));
        }
        Commands::Simulate { input, signal_limit, max_candidates, violated } => {
            let program = load_program(&input.program).await?;
            let config = parse_constraint_ids(&violated)?.into_iter().fold(
                SimulationConfig::new()
                    .with_signal_limit(signal_limit)
                    .with_max_candidates(max_candidates),
                SimulationConfig::with_violated_constraint,
            );

            let result = CoordinationSimulator::new()
                .with_clock(Arc::new(clock))
                .with_config(config)
                .simulate(&program);
            if json {
                return print_json(&result);
            }

            println!("{}", result.summary);
            for diagnostic in &result.diagnostics {
                println!("  {diagnostic}");
            }
            if result.has_blocking_diagnostics() {
                info!(run_id = %result.run_id, "simulation reported blocking diagnostics");
            }
        }
    }

    Ok(())
}

async fn load_program(path: &Path) -> Result<CoordinationProgram> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading program {}", path.display()))?;
    let program: CoordinationProgram = serde_json::from_str(&raw)
        .with_context(|| format!("parsing program {}", path.display()))?;
    debug!(program = %program.id, steps = program.steps.len(), "program loaded");
    Ok(program)
}

async fn load_signals(path: &Path) -> Result<SignalMap> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading signals {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing signals {}", path.display()))
}

fn default_run_id(program: &CoordinationProgram, clock: &dyn Clock) -> RunId {
    RunId::scoped(&program.tenant, &program.id, clock.now().timestamp_millis())
}

fn parse_constraint_ids(raw: &[String]) -> Result<Vec<ConstraintId>> {
    raw.iter()
        .map(|id| ConstraintId::new(id.as_str()).map_err(anyhow::Error::from))
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn join<T: std::fmt::Display>(ids: &[T], separator: &str) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(separator)
}

//! Compare command - run every search policy on one position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: compare_policies(), check_pruning(), report_results()
//! - Level 3: run_policy()
//! - Level 4: configuration and formatting

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use pacsearch_core::{AgentConfig, Direction, MazeState, Policy, SearchAgent, POLICIES, SMALL_MAZE};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct CompareArgs {
    /// Layout text file (defaults to the built-in small maze)
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Deepest search to run (every depth from 1 is compared)
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of one policy at one depth
#[derive(Clone, Debug, Serialize)]
struct PolicyRun {
    policy: Policy,
    depth: u32,
    value: f32,
    action: Option<Direction>,
    expansions: u64,
    evaluations: u64,
    #[serde(skip)]
    elapsed: Duration,
}

#[derive(Clone, Debug, Serialize)]
struct Comparison {
    runs: Vec<PolicyRun>,
    /// Depths where alpha-beta disagreed with minimax
    mismatches: Vec<u32>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run compare command
pub fn run(args: CompareArgs, seed: Option<u64>) -> Result<()> {
    let state = match &args.layout {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read layout: {}", path.display()))?;
            MazeState::parse(&text).with_context(|| format!("Invalid layout: {}", path.display()))?
        }
        None => MazeState::parse(SMALL_MAZE)?,
    };

    tracing::info!("Comparing policies up to depth {}", args.depth);

    let runs = compare_policies(&state, args.depth, seed)?;
    let mismatches = check_pruning(&runs);
    for depth in &mismatches {
        tracing::warn!("Alpha-beta result differs from minimax at depth {}", depth);
    }

    report_results(&Comparison { runs, mismatches }, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn compare_policies(state: &MazeState, max_depth: u32, seed: Option<u64>) -> Result<Vec<PolicyRun>> {
    let mut runs = Vec::new();
    for depth in 1..=max_depth {
        for policy in POLICIES {
            runs.push(run_policy(state, policy_config(policy, depth, seed))?);
        }
    }
    Ok(runs)
}

/// Depths where alpha-beta's root value or action differs from minimax
fn check_pruning(runs: &[PolicyRun]) -> Vec<u32> {
    let find = |policy: Policy, depth: u32| runs.iter().find(|r| r.policy == policy && r.depth == depth);

    let mut depths: Vec<u32> = runs.iter().map(|r| r.depth).collect();
    depths.dedup();

    depths
        .into_iter()
        .filter(|&depth| match (find(Policy::Minimax, depth), find(Policy::AlphaBeta, depth)) {
            (Some(plain), Some(pruned)) => plain.value != pruned.value || plain.action != pruned.action,
            _ => false,
        })
        .collect()
}

fn report_results(comparison: &Comparison, json: bool) {
    if json {
        if let Ok(text) = serde_json::to_string_pretty(comparison) {
            println!("{}", text);
        }
        return;
    }

    println!("\n| Policy | Depth | Value | Action | Expansions | Evaluations | Time |");
    println!("|--------|-------|-------|--------|------------|-------------|------|");
    for run in &comparison.runs {
        println!("{}", to_table_row(run));
    }

    if comparison.mismatches.is_empty() {
        println!("\nAlpha-beta matched minimax at every depth.");
    } else {
        println!("\nAlpha-beta MISMATCH at depths {:?}", comparison.mismatches);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn run_policy(state: &MazeState, config: AgentConfig) -> Result<PolicyRun> {
    let (policy, depth) = (config.policy, config.depth);
    let mut agent = SearchAgent::from_config(config)?;

    let start = Instant::now();
    let outcome = agent.search(state)?;
    let elapsed = start.elapsed();

    Ok(PolicyRun {
        policy,
        depth,
        value: outcome.result.utility,
        action: outcome.result.action,
        expansions: outcome.stats.expansions,
        evaluations: outcome.stats.evaluations,
        elapsed,
    })
}

// ============================================================================
// LEVEL 4 - CONFIGURATION AND FORMATTING
// ============================================================================

/// Default agent for `policy` at `depth`, seeded when the run has a seed
fn policy_config(policy: Policy, depth: u32, seed: Option<u64>) -> AgentConfig {
    let config = AgentConfig {
        policy,
        depth,
        ..Default::default()
    };
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn to_table_row(run: &PolicyRun) -> String {
    let action = run
        .action
        .map(|a| format!("{:?}", a))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "| {} | {} | {:.3} | {} | {} | {} | {:.2}ms |",
        run.policy,
        run.depth,
        run.value,
        action,
        run.expansions,
        run.evaluations,
        run.elapsed.as_secs_f64() * 1000.0
    )
}

// ============================================================================
// TESTS
// ============================================================================

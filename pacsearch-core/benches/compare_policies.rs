//! Search policy benchmark
//!
//! Compares minimax, alpha-beta and expectimax on the built-in maze:
//! 1. Time to choose a move at each depth
//! 2. Nodes expanded per search

use std::time::Instant;

use pacsearch_core::{AgentConfig, MazeState, SearchAgent, SMALL_MAZE, POLICIES};

// ============================================================================
// BENCHMARK STRUCTURES
// ============================================================================

#[derive(Clone, Debug)]
struct BenchmarkResult {
    policy: String,
    depth: u32,
    avg_move_time_ms: f64,
    expansions: u64,
}

impl BenchmarkResult {
    fn to_table_row(&self) -> String {
        format!(
            "| {} | {} | {:.2}ms | {} |",
            self.policy, self.depth, self.avg_move_time_ms, self.expansions
        )
    }
}

// ============================================================================
// BENCHMARK: Time to Choose Move
// ============================================================================

fn benchmark_move_time(state: &MazeState, max_depth: u32) -> Vec<BenchmarkResult> {
    println!("\n=== MOVE TIME BENCHMARK ===");
    let mut results = Vec::new();
    let iterations = 5;

    for depth in 1..=max_depth {
        for policy in POLICIES {
            print!("  {} depth {} ... ", policy, depth);
            let config = AgentConfig {
                policy,
                depth,
                ..Default::default()
            };
            let mut agent = match SearchAgent::from_config(config) {
                Ok(agent) => agent,
                Err(e) => {
                    println!("skipped ({})", e);
                    continue;
                }
            };

            let mut total_time = 0.0;
            let mut expansions = 0;
            for _ in 0..iterations {
                let start = Instant::now();
                if let Ok(outcome) = agent.search(state) {
                    expansions = outcome.stats.expansions;
                }
                total_time += start.elapsed().as_secs_f64() * 1000.0;
            }

            let avg_time = total_time / iterations as f64;
            println!("{:.2}ms ({} expansions)", avg_time, expansions);

            results.push(BenchmarkResult {
                policy: policy.to_string(),
                depth,
                avg_move_time_ms: avg_time,
                expansions,
            });
        }
    }

    results
}

fn main() {
    let state = match MazeState::parse(SMALL_MAZE) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("bad layout: {}", e);
            return;
        }
    };

    let results = benchmark_move_time(&state, 3);

    println!("\n| Policy | Depth | Avg Move Time | Expansions |");
    println!("|--------|-------|---------------|------------|");
    for result in &results {
        println!("{}", result.to_table_row());
    }
}

//! Play command - run maze games with a search agent
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_layout(), build_config(), play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: seeding and formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use pacsearch_core::{
    play_game, AgentConfig, ChanceModel, EvaluationKind, GameRecord, MazeState, Outcome, Policy,
    SearchAgent, SMALL_MAZE,
};

/// Mixed into game seeds so opponents and agent draw different streams
const OPPONENT_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Layout text file (defaults to the built-in small maze)
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Agent config JSON file (replaces the search flags below)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Search policy: minimax, alpha_beta or expectimax
    #[arg(long, default_value = "minimax")]
    pub policy: Policy,

    /// Search depth in full plies
    #[arg(long, default_value = "2")]
    pub depth: u32,

    /// Evaluation at the search horizon: better or score
    #[arg(long, default_value = "better")]
    pub evaluation: EvaluationKind,

    /// Expectimax averages over every opponent action instead of sampling one
    #[arg(long)]
    pub average: bool,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Maximum forager moves per game
    #[arg(long, default_value = "500")]
    pub max_moves: usize,

    /// Play games in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Aggregated results
#[derive(Clone, Debug)]
struct PlayResults {
    games: Vec<GameRecord>,
    wins: usize,
    losses: usize,
    unfinished: usize,
    avg_score: f32,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load the layout and agent config
/// 2. Play the games
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let initial = load_layout(args.layout.as_deref())?;
    let config = build_config(&args)?;

    tracing::info!(
        "Starting {} games: policy={}, depth={}, evaluation={:?}",
        args.games,
        config.policy,
        config.depth,
        config.evaluation
    );

    let base_seed = seed.or(config.seed).unwrap_or_else(rand::random);
    let results = play_games(&initial, &config, &args, base_seed)?;

    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_layout(path: Option<&Path>) -> Result<MazeState> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read layout: {}", path.display()))?;
            MazeState::parse(&text).with_context(|| format!("Invalid layout: {}", path.display()))
        }
        None => Ok(MazeState::parse(SMALL_MAZE)?),
    }
}

/// Config file when given, otherwise the command-line flags
fn build_config(args: &PlayArgs) -> Result<AgentConfig> {
    if let Some(path) = &args.config {
        return AgentConfig::load(path)
            .with_context(|| format!("Failed to load agent config: {}", path.display()));
    }

    let chance = if args.average {
        ChanceModel::Average
    } else {
        ChanceModel::Sample
    };
    let config = AgentConfig {
        policy: args.policy,
        depth: args.depth,
        ..Default::default()
    }
    .with_evaluation(args.evaluation)
    .with_chance(chance);

    config.validate()?;
    Ok(config)
}

fn play_games(initial: &MazeState, config: &AgentConfig, args: &PlayArgs, base_seed: u64) -> Result<PlayResults> {
    let progress = create_progress_bar(args.games, args.json);

    let play = |game_number: usize| {
        let record = play_single_game(initial, config, game_seed(base_seed, game_number), args.max_moves);
        progress.inc(1);
        record
    };

    let games: Vec<GameRecord> = if args.parallel {
        (0..args.games).into_par_iter().map(play).collect::<Result<_>>()?
    } else {
        (0..args.games).map(play).collect::<Result<_>>()?
    };

    progress.finish_and_clear();

    for (i, game) in games.iter().enumerate() {
        tracing::debug!("Game {}: {:?} score={} moves={}", i + 1, game.outcome, game.score, game.moves);
    }

    Ok(compute_statistics(games))
}

fn report_results(results: &PlayResults, json: bool) {
    if json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(initial: &MazeState, config: &AgentConfig, seed: u64, max_moves: usize) -> Result<GameRecord> {
    let mut agent = SearchAgent::from_config(config.clone().with_seed(seed))?;
    let mut opponent_rng = ChaCha8Rng::seed_from_u64(seed ^ OPPONENT_SALT);
    let record = play_game(initial.clone(), &mut agent, &mut opponent_rng, max_moves)?;
    Ok(record)
}

fn compute_statistics(games: Vec<GameRecord>) -> PlayResults {
    let wins = games.iter().filter(|g| g.outcome == Outcome::Won).count();
    let losses = games.iter().filter(|g| g.outcome == Outcome::Lost).count();
    let unfinished = games.iter().filter(|g| g.outcome == Outcome::Ongoing).count();

    let (avg_score, avg_moves) = if games.is_empty() {
        (0.0, 0.0)
    } else {
        let n = games.len() as f32;
        (
            games.iter().map(|g| g.score).sum::<f32>() / n,
            games.iter().map(|g| g.moves as f32).sum::<f32>() / n,
        )
    };

    PlayResults {
        games,
        wins,
        losses,
        unfinished,
        avg_score,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Independent seed per game derived from the run seed
fn game_seed(base_seed: u64, game_number: usize) -> u64 {
    base_seed.wrapping_add(game_number as u64)
}

fn create_progress_bar(games: usize, hidden: bool) -> ProgressBar {
    if hidden || games < 2 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(games as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} games ({eta})") {
        bar.set_style(style);
    }
    bar
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &PlayResults) {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        total_games: usize,
        wins: usize,
        losses: usize,
        unfinished: usize,
        win_rate: f32,
        avg_score: f32,
        avg_moves: f32,
        games: &'a [GameRecord],
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        wins: results.wins,
        losses: results.losses,
        unfinished: results.unfinished,
        win_rate: percent(results.wins, total) / 100.0,
        avg_score: results.avg_score,
        avg_moves: results.avg_moves,
        games: &results.games,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &PlayResults) {
    let total = results.games.len();

    println!("\n=== Results ===");
    println!("Total games: {}", total);
    println!("Wins:        {} ({:.1}%)", results.wins, percent(results.wins, total));
    println!("Losses:      {} ({:.1}%)", results.losses, percent(results.losses, total));
    println!("Unfinished:  {} ({:.1}%)", results.unfinished, percent(results.unfinished, total));
    println!("Avg score:   {:.1}", results.avg_score);
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for (i, game) in results.games.iter().enumerate() {
        println!(
            "  Game {}: {:?} score {:.0} in {} moves ({} nodes)",
            i + 1,
            game.outcome,
            game.score,
            game.moves,
            game.expansions
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

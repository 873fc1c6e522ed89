// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for scripted games and tournaments
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use conquest_engine::{EngineConfig, FileSink, GameEngine};
use conquest_tournament::database::Database;
use conquest_tournament::report;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "conquest-runner", about = "Turn-based territory conquest engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a command script (or stdin) to the game engine
    Play {
        /// One command per line; blank lines and '#' comments are skipped
        #[arg(short, long)]
        commands: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// JSON engine configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Append game events to this file
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Run a tournament between computer strategies
    Tournament {
        #[arg(short = 'M', num_args = 1.., required = true)]
        maps: Vec<String>,
        #[arg(short = 'P', num_args = 1.., required = true)]
        strategies: Vec<String>,
        #[arg(short = 'G')]
        games: usize,
        #[arg(short = 'D')]
        turns: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "results.db")]
        db: String,
    },
    /// Show stored tournaments and the strategy leaderboard
    Results {
        #[arg(long, default_value = "results.db")]
        db: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { commands, seed, config, log } => cmd_play(commands, seed, config, log),
        Commands::Tournament { maps, strategies, games, turns, seed, config, db } => {
            cmd_tournament(&maps, &strategies, games, turns, seed, config, &db)
        }
        Commands::Results { db } => cmd_results(&db),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<PathBuf>, seed: Option<u64>) -> Result<EngineConfig, String> {
    let config = match path {
        Some(p) => {
            log::info!("loading engine config from {}", p.display());
            EngineConfig::load(&p).map_err(|e| e.to_string())?
        }
        None => EngineConfig::default(),
    };
    Ok(match seed {
        Some(s) => config.with_seed(s),
        None => config,
    })
}

fn cmd_play(
    commands: Option<PathBuf>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    log_path: Option<PathBuf>,
) -> Result<(), String> {
    let config = load_config(config, seed)?;
    let mut engine = GameEngine::new(config);
    if let Some(path) = &log_path {
        let sink = FileSink::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
        engine = engine.with_sink(sink);
    }

    let reader: Box<dyn BufRead> = match &commands {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    println!("=== Conquest ===\n");
    for line in reader.lines() {
        let line = line.map_err(|e| e.to_string())?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let ok = engine.process_command(line);
        println!("[{}] > {}", engine.state_name(), line);
        println!("  {}{}", if ok { "" } else { "(rejected) " }, engine.last_effect());
        if engine.current_state().is_terminal() {
            break;
        }
    }

    println!("\nFinal state: {}", engine.state_name());
    if let Some(outcome) = engine.outcome() {
        println!("Result: {} after {} turns", outcome, engine.world().turn);
    }
    Ok(())
}

fn cmd_tournament(
    maps: &[String],
    strategies: &[String],
    games: usize,
    turns: u32,
    seed: Option<u64>,
    config: Option<PathBuf>,
    db_path: &str,
) -> Result<(), String> {
    let config = load_config(config, seed)?;
    let mut engine = GameEngine::new(config);
    let line = format!(
        "tournament -M {} -P {} -G {} -D {}",
        maps.join(" "),
        strategies.join(" "),
        games,
        turns
    );
    if !engine.process_command(&line) {
        return Err(engine.last_effect().to_string());
    }
    println!("{}", engine.last_effect());

    let Some(result) = engine.tournament_report() else {
        return Err("tournament produced no report".to_string());
    };
    println!("{}", report::render_standings(&report::summarize(result)));

    let db = Database::open(db_path).map_err(|e| e.to_string())?;
    let id = db.store_report(result).map_err(|e| e.to_string())?;
    log::info!("tournament #{} stored in {} ({} games)", id, db_path, result.records.len());
    println!("Saved as tournament #{} in {}", id, db_path);
    Ok(())
}

fn cmd_results(db_path: &str) -> Result<(), String> {
    let db = Database::open(db_path).map_err(|e| e.to_string())?;
    let tournaments = db.tournaments().map_err(|e| e.to_string())?;
    if tournaments.is_empty() {
        println!("No tournaments stored. Run one first.");
        return Ok(());
    }
    println!("=== Tournaments ({}) ===\n", tournaments.len());
    print!("{}", report::render_tournaments(&tournaments));

    let board = db.leaderboard().map_err(|e| e.to_string())?;
    println!("\n=== Leaderboard ({} games) ===\n", db.game_count().map_err(|e| e.to_string())?);
    print!("{}", report::render_standings(&board));
    Ok(())
}

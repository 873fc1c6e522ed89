// ═══════════════════════════════════════════════════════════════════════
// Tournament — headless games between computer strategies
//
// Every (map, game) pair gets its own GameWorld, so games share nothing
// and run in parallel.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::strategy::{NoHumanInput, Strategy};
use crate::types::GameMap;
use crate::world::GameWorld;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const MAP_RANGE: std::ops::RangeInclusive<usize> = 1..=5;
pub const STRATEGY_RANGE: std::ops::RangeInclusive<usize> = 2..=4;
pub const GAME_RANGE: std::ops::RangeInclusive<usize> = 1..=5;
pub const TURN_RANGE: std::ops::RangeInclusive<u32> = 10..=50;

/// Parsed `tournament -M .. -P .. -G .. -D ..` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentPlan {
    pub maps: Vec<String>,
    pub strategies: Vec<Strategy>,
    pub games: usize,
    pub max_turns: u32,
}

impl TournamentPlan {
    /// Flag values may be space- or comma-separated.
    pub fn parse(args: &[String]) -> Result<Self, CommandError> {
        let mut maps = Vec::new();
        let mut strategy_names = Vec::new();
        let mut games = None;
        let mut turns = None;
        let mut flag: Option<String> = None;

        for arg in args {
            if arg.starts_with('-') {
                flag = Some(arg.to_ascii_uppercase());
                continue;
            }
            let values = arg.split(',').map(str::trim).filter(|v| !v.is_empty());
            match flag.as_deref() {
                Some("-M") => maps.extend(values.map(str::to_string)),
                Some("-P") => strategy_names.extend(values.map(str::to_string)),
                Some("-G") => games = Some(parse_number::<usize>(arg, "-G")?),
                Some("-D") => turns = Some(parse_number::<u32>(arg, "-D")?),
                Some(other) => return Err(CommandError::action(format!("unknown tournament flag {}", other))),
                None => return Err(CommandError::action(format!("value '{}' given before any flag", arg))),
            }
        }

        let games = games.ok_or_else(|| CommandError::action("tournament needs -G <games>"))?;
        let max_turns = turns.ok_or_else(|| CommandError::action("tournament needs -D <turns>"))?;

        if !MAP_RANGE.contains(&maps.len()) {
            return Err(CommandError::action(format!("tournament needs 1 to 5 maps, got {}", maps.len())));
        }
        if let Some((i, dup)) = maps.iter().enumerate().find(|(i, m)| maps[..*i].contains(*m)) {
            return Err(CommandError::action(format!("map '{}' listed twice (position {})", dup, i + 1)));
        }
        if !STRATEGY_RANGE.contains(&strategy_names.len()) {
            return Err(CommandError::action(format!(
                "tournament needs 2 to 4 strategies, got {}",
                strategy_names.len()
            )));
        }
        if !GAME_RANGE.contains(&games) {
            return Err(CommandError::action(format!("games per map must be 1 to 5, got {}", games)));
        }
        if !TURN_RANGE.contains(&max_turns) {
            return Err(CommandError::action(format!("max turns must be 10 to 50, got {}", max_turns)));
        }

        let mut strategies: Vec<Strategy> = Vec::new();
        for name in &strategy_names {
            let strategy = Strategy::parse(name)
                .ok_or_else(|| CommandError::action(format!("unknown strategy '{}'", name)))?;
            if strategy == Strategy::Human {
                return Err(CommandError::action("tournaments cannot include human players"));
            }
            if strategies.iter().any(|s| s.name() == strategy.name()) {
                return Err(CommandError::action(format!("strategy '{}' listed twice", strategy.name())));
            }
            strategies.push(strategy);
        }

        Ok(TournamentPlan { maps, strategies, games, max_turns })
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, CommandError> {
    value
        .parse::<T>()
        .map_err(|_| CommandError::action(format!("{} expects a number, got '{}'", flag, value)))
}

// ── Results ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub map: String,
    pub game: usize,
    /// Winning player's name or "Draw".
    pub winner: String,
    pub turns: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentReport {
    pub seed: u64,
    pub maps: Vec<String>,
    pub strategies: Vec<String>,
    pub games: usize,
    pub max_turns: u32,
    pub records: Vec<GameRecord>,
}

impl TournamentReport {
    pub fn result(&self, map: &str, game: usize) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.map == map && r.game == game)
            .map(|r| r.winner.as_str())
    }
}

impl std::fmt::Display for TournamentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tournament mode:")?;
        writeln!(f, "M: {}", self.maps.join(", "))?;
        writeln!(f, "P: {}", self.strategies.join(", "))?;
        writeln!(f, "G: {}", self.games)?;
        writeln!(f, "D: {}", self.max_turns)?;
        writeln!(f)?;

        let width = self.maps.iter().map(String::len).max().unwrap_or(0).max(3);
        write!(f, "{:<width$}", "", width = width)?;
        for g in 1..=self.games {
            write!(f, " | {:<12}", format!("Game {}", g))?;
        }
        writeln!(f)?;
        for map in &self.maps {
            write!(f, "{:<width$}", map, width = width)?;
            for g in 1..=self.games {
                write!(f, " | {:<12}", self.result(map, g).unwrap_or("-"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ── Running ────────────────────────────────────────────────────────────

/// Play every (map, game) of the tournament. `maps` pairs each map name
/// with its loaded, validated map. Returns the report and every game's
/// event lines in (map, game) order.
pub fn run_tournament(
    plan: &TournamentPlan,
    maps: &[(String, GameMap)],
    config: &EngineConfig,
) -> (TournamentReport, Vec<String>) {
    let jobs: Vec<(usize, usize)> = (0..maps.len())
        .flat_map(|m| (1..=plan.games).map(move |g| (m, g)))
        .collect();

    let results: Vec<(GameRecord, Vec<String>)> = jobs
        .par_iter()
        .map(|&(m, g)| {
            let (name, map) = &maps[m];
            let seed = game_seed(config.seed, m, g);
            play_game(name, map.clone(), &plan.strategies, plan.max_turns, config.clone().with_seed(seed), g)
        })
        .collect();

    let mut records = Vec::with_capacity(results.len());
    let mut events = Vec::new();
    for (record, lines) in results {
        log::info!("tournament {} game {}: {}", record.map, record.game, record.winner);
        events.push(format!("Tournament({} game {}): winner = {}", record.map, record.game, record.winner));
        events.extend(lines);
        records.push(record);
    }

    let report = TournamentReport {
        seed: config.seed,
        maps: maps.iter().map(|(n, _)| n.clone()).collect(),
        strategies: plan.strategies.iter().map(|s| s.name().to_string()).collect(),
        games: plan.games,
        max_turns: plan.max_turns,
        records,
    };
    (report, events)
}

fn game_seed(base: u64, map: usize, game: usize) -> u64 {
    base.wrapping_add((map as u64) * 1_000 + game as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// One headless game: players are named after their strategies.
pub fn play_game(
    map_name: &str,
    map: GameMap,
    strategies: &[Strategy],
    max_turns: u32,
    config: EngineConfig,
    game: usize,
) -> (GameRecord, Vec<String>) {
    let mut world = GameWorld::with_map(config, map);
    for strategy in strategies {
        world.add_player(strategy.name(), strategy.fresh());
    }
    world.start_game();
    let outcome = world.run_until(&mut NoHumanInput, max_turns);
    let record = GameRecord {
        map: map_name.to_string(),
        game,
        winner: outcome.label().to_string(),
        turns: world.turn,
    };
    (record, world.events.drain())
}

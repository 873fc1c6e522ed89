// ═══════════════════════════════════════════════════════════════════════
// Game Engine — command-driven state machine over one GameWorld
//
// Flow of `process_command(line)`:
//   1. Unknown token            → SpellingError, no transition
//   2. Not allowed in the state → StateError listing valid commands
//   3. Run the handler          → ActionFailure leaves the state alone
//   4. Commit the transition, drain events to the sink
//
// Handlers check every precondition before mutating anything, so a
// failed command never leaves a half-applied change behind.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::events::{LogSink, NullSink};
use crate::map::{DominationLoader, MapLoader};
use crate::state::{transition, valid_commands, Command, CommandKind, GameState};
use crate::strategy::{HumanInput, NoHumanInput, Strategy};
use crate::tournament::{self, TournamentReport, TournamentPlan};
use crate::turn::GameOutcome;
use crate::world::GameWorld;
use std::path::Path;

pub struct GameEngine {
    state: GameState,
    world: GameWorld,
    config: EngineConfig,
    loader: Box<dyn MapLoader>,
    input: Box<dyn HumanInput>,
    sink: Box<dyn LogSink>,
    last_effect: String,
    outcome: Option<GameOutcome>,
    report: Option<TournamentReport>,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("state", &self.state)
            .field("turn", &self.world.turn)
            .field("roster", &self.world.roster)
            .field("last_effect", &self.last_effect)
            .finish()
    }
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        GameEngine {
            state: GameState::Start,
            world: GameWorld::new(config.clone()),
            config,
            loader: Box::new(DominationLoader),
            input: Box::new(NoHumanInput),
            sink: Box::new(NullSink),
            last_effect: String::new(),
            outcome: None,
            report: None,
        }
    }

    pub fn with_loader(mut self, loader: impl MapLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_input(mut self, input: impl HumanInput + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn current_state(&self) -> GameState {
        self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    /// Effect of the most recent command.
    pub fn last_effect(&self) -> &str {
        &self.last_effect
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn tournament_report(&self) -> Option<&TournamentReport> {
        self.report.as_ref()
    }

    // ── Commands ───────────────────────────────────────────────────────

    /// Run one command line. Returns whether the transition happened.
    pub fn process_command(&mut self, line: &str) -> bool {
        let result = Command::parse(line).and_then(|command| {
            let next = transition(self.state, command.kind).ok_or_else(|| CommandError::State {
                command: command.kind.token().to_string(),
                state: self.state,
                valid: valid_commands(self.state),
            })?;
            let effect = self.handle(&command)?;
            Ok((next, effect))
        });

        let ok = match result {
            Ok((next, effect)) => {
                log::info!("{} -> {} ({})", self.state, next, line.trim());
                self.state = next;
                self.world.events.emit(format!("GameEngine: state = {}", next));
                self.last_effect = effect;
                true
            }
            Err(err) => {
                log::warn!("command '{}' rejected: {}", line.trim(), err);
                self.last_effect = match err {
                    CommandError::Action(_) => err.to_string(),
                    _ => format!("ERROR: {}", err),
                };
                false
            }
        };
        self.world.events.emit(format!("Command({}): effect = {}", line.trim(), self.last_effect));
        self.flush_events();
        ok
    }

    fn handle(&mut self, command: &Command) -> Result<String, CommandError> {
        match command.kind {
            CommandKind::LoadMap => self.load_map(&command.args),
            CommandKind::ValidateMap => self.validate_map(),
            CommandKind::AddPlayer => self.add_player(&command.args),
            CommandKind::GameStart => self.game_start(),
            CommandKind::AssignReinforcement => {
                self.reinforcement_phase();
                Ok(format!("turn {}: reinforcements assigned", self.world.turn + 1))
            }
            CommandKind::IssueOrders => {
                let applied = self.issue_orders_phase();
                Ok(format!("turn {}: {} orders issued", self.world.turn + 1, applied))
            }
            CommandKind::ExecOrders => {
                let executed = self.execute_orders_phase();
                self.world.end_turn();
                Ok(format!("turn {}: {} orders executed", self.world.turn, executed))
            }
            CommandKind::EndExecOrders => {
                if let Some(id) = self.world.winner() {
                    return Err(CommandError::action(format!(
                        "{} has won; use 'win'",
                        self.world.player_name(id)
                    )));
                }
                self.reinforcement_phase();
                Ok(format!("turn {}: reinforcements assigned", self.world.turn + 1))
            }
            CommandKind::Win => {
                let id = self
                    .world
                    .winner()
                    .ok_or_else(|| CommandError::action("no player has won yet"))?;
                let name = self.world.player_name(id);
                self.outcome = Some(GameOutcome::Winner { id, name: name.clone() });
                Ok(format!("{} wins", name))
            }
            CommandKind::Play => {
                let outcome = self.main_game_loop();
                Ok(match &outcome {
                    GameOutcome::Winner { name, .. } => format!("{} wins after {} turns", name, self.world.turn),
                    GameOutcome::Draw => format!("Draw after {} turns", self.world.turn),
                })
            }
            CommandKind::Tournament => self.tournament(&command.args),
            CommandKind::Replay => {
                self.world = GameWorld::new(self.config.clone());
                self.outcome = None;
                self.report = None;
                Ok("reset to a new game".to_string())
            }
            CommandKind::Quit => Ok("goodbye".to_string()),
        }
    }

    fn load_map(&mut self, args: &[String]) -> Result<String, CommandError> {
        let path = args
            .first()
            .ok_or_else(|| CommandError::action("loadmap needs a file path"))?;
        let map = self
            .loader
            .load(Path::new(path))
            .map_err(|e| CommandError::action(format!("cannot load map {}: {}", path, e)))?;
        let effect = format!(
            "loaded map {} ({} territories, {} continents)",
            map.name,
            map.territories.len(),
            map.continents.len()
        );
        self.world.map = Some(map);
        Ok(effect)
    }

    fn validate_map(&mut self) -> Result<String, CommandError> {
        let map = self
            .world
            .map
            .as_ref()
            .ok_or_else(|| CommandError::action("no map loaded"))?;
        if map.validate() {
            Ok(format!("map {} is valid", map.name))
        } else {
            Err(CommandError::action(format!("map {} is invalid", map.name)))
        }
    }

    fn add_player(&mut self, args: &[String]) -> Result<String, CommandError> {
        let name = args
            .first()
            .ok_or_else(|| CommandError::action("addplayer needs a name"))?;
        let strategy = match args.get(1) {
            Some(s) => Strategy::parse(s).ok_or_else(|| {
                CommandError::action(format!(
                    "unknown strategy '{}'; expected one of {}",
                    s,
                    Strategy::NAMES.join(", ")
                ))
            })?,
            None => Strategy::Human,
        };
        if self.world.find_player(name).is_some() {
            return Err(CommandError::action(format!("player {} already exists", name)));
        }
        if self.world.roster.len() >= self.config.max_players {
            return Err(CommandError::action(format!(
                "at most {} players may join",
                self.config.max_players
            )));
        }
        self.world.add_player(name, strategy);
        Ok(format!("added player {} ({})", name, strategy))
    }

    fn game_start(&mut self) -> Result<String, CommandError> {
        let count = self.world.roster.len();
        if count < self.config.min_players {
            return Err(CommandError::action(format!(
                "need at least {} players, have {}",
                self.config.min_players, count
            )));
        }
        self.world.start_game();
        let order: Vec<String> = self.world.roster.iter().map(|&id| self.world.player_name(id)).collect();
        Ok(format!("game started; play order: {}", order.join(", ")))
    }

    fn tournament(&mut self, args: &[String]) -> Result<String, CommandError> {
        let plan = TournamentPlan::parse(args)?;
        let mut maps = Vec::with_capacity(plan.maps.len());
        for path in &plan.maps {
            let map = self
                .loader
                .load(Path::new(path))
                .map_err(|e| CommandError::action(format!("cannot load map {}: {}", path, e)))?;
            if !map.validate() {
                return Err(CommandError::action(format!("map {} is invalid", path)));
            }
            maps.push((map.name.clone(), map));
        }

        log::info!(
            "tournament: {} maps x {} games, {} turn ceiling",
            maps.len(),
            plan.games,
            plan.max_turns
        );
        let (report, lines) = tournament::run_tournament(&plan, &maps, &self.config);
        for line in lines {
            self.world.events.emit(line);
        }
        let effect = report.to_string();
        self.report = Some(report);
        Ok(effect)
    }

    // ── Phases ─────────────────────────────────────────────────────────

    pub fn reinforcement_phase(&mut self) {
        self.world.reinforcement_phase();
        self.flush_events();
    }

    pub fn issue_orders_phase(&mut self) -> usize {
        let applied = self.world.issue_orders_phase(self.input.as_mut());
        self.flush_events();
        applied
    }

    pub fn execute_orders_phase(&mut self) -> usize {
        let executed = self.world.execute_orders_phase();
        self.flush_events();
        executed
    }

    /// Play turns until a winner emerges or the configured ceiling is hit.
    pub fn main_game_loop(&mut self) -> GameOutcome {
        self.run_with_ceiling(self.config.max_turns)
    }

    pub fn run_with_ceiling(&mut self, ceiling: u32) -> GameOutcome {
        let outcome = loop {
            if let Some(id) = self.world.winner() {
                break GameOutcome::Winner { id, name: self.world.player_name(id) };
            }
            if !self.world.is_ready() || self.world.turn >= ceiling {
                break GameOutcome::Draw;
            }
            self.reinforcement_phase();
            self.issue_orders_phase();
            self.execute_orders_phase();
            self.world.end_turn();
            self.flush_events();
        };
        log::info!("game over after {} turns: {}", self.world.turn, outcome);
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn flush_events(&mut self) {
        let lines = self.world.events.drain();
        if lines.is_empty() {
            return;
        }
        for line in &lines {
            self.sink.write_line(line);
        }
        self.sink.flush();
    }
}

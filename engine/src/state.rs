// ═══════════════════════════════════════════════════════════════════════
// Game states, command tokens and the transition table
// ═══════════════════════════════════════════════════════════════════════

use crate::error::CommandError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Start,
    MapLoaded,
    MapValidated,
    PlayersAdded,
    Gamestart,
    Tournament,
    AssignReinforcement,
    IssueOrders,
    ExecuteOrders,
    Win,
    End,
}

impl GameState {
    pub const ALL: [GameState; 11] = [
        GameState::Start,
        GameState::MapLoaded,
        GameState::MapValidated,
        GameState::PlayersAdded,
        GameState::Gamestart,
        GameState::Tournament,
        GameState::AssignReinforcement,
        GameState::IssueOrders,
        GameState::ExecuteOrders,
        GameState::Win,
        GameState::End,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameState::Start => "Start",
            GameState::MapLoaded => "MapLoaded",
            GameState::MapValidated => "MapValidated",
            GameState::PlayersAdded => "PlayersAdded",
            GameState::Gamestart => "Gamestart",
            GameState::Tournament => "Tournament",
            GameState::AssignReinforcement => "AssignReinforcement",
            GameState::IssueOrders => "IssueOrders",
            GameState::ExecuteOrders => "ExecuteOrders",
            GameState::Win => "Win",
            GameState::End => "End",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == GameState::End
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Command tokens ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    LoadMap,
    ValidateMap,
    AddPlayer,
    GameStart,
    AssignReinforcement,
    IssueOrders,
    ExecOrders,
    EndExecOrders,
    Play,
    Win,
    Tournament,
    Replay,
    Quit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 13] = [
        CommandKind::LoadMap,
        CommandKind::ValidateMap,
        CommandKind::AddPlayer,
        CommandKind::GameStart,
        CommandKind::AssignReinforcement,
        CommandKind::IssueOrders,
        CommandKind::ExecOrders,
        CommandKind::EndExecOrders,
        CommandKind::Play,
        CommandKind::Win,
        CommandKind::Tournament,
        CommandKind::Replay,
        CommandKind::Quit,
    ];

    pub fn token(self) -> &'static str {
        match self {
            CommandKind::LoadMap => "loadmap",
            CommandKind::ValidateMap => "validatemap",
            CommandKind::AddPlayer => "addplayer",
            CommandKind::GameStart => "gamestart",
            CommandKind::AssignReinforcement => "assignreinforcement",
            CommandKind::IssueOrders => "issueorders",
            CommandKind::ExecOrders => "execorders",
            CommandKind::EndExecOrders => "endexecorders",
            CommandKind::Play => "play",
            CommandKind::Win => "win",
            CommandKind::Tournament => "tournament",
            CommandKind::Replay => "replay",
            CommandKind::Quit => "quit",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.token() == token)
    }
}

/// The Mealy machine's transition function. `None` = not allowed here.
pub fn transition(state: GameState, command: CommandKind) -> Option<GameState> {
    use CommandKind as C;
    use GameState as S;
    match (state, command) {
        (S::Start, C::LoadMap) => Some(S::MapLoaded),
        (S::Start, C::Tournament) => Some(S::Tournament),
        (S::MapLoaded, C::LoadMap) => Some(S::MapLoaded),
        (S::MapLoaded, C::ValidateMap) => Some(S::MapValidated),
        (S::MapValidated, C::AddPlayer) => Some(S::PlayersAdded),
        (S::PlayersAdded, C::AddPlayer) => Some(S::PlayersAdded),
        (S::PlayersAdded, C::GameStart) => Some(S::Gamestart),
        (S::Gamestart, C::AssignReinforcement) => Some(S::AssignReinforcement),
        (S::Gamestart, C::Play) => Some(S::Win),
        (S::AssignReinforcement, C::IssueOrders) => Some(S::IssueOrders),
        (S::IssueOrders, C::ExecOrders) => Some(S::ExecuteOrders),
        (S::ExecuteOrders, C::EndExecOrders) => Some(S::AssignReinforcement),
        (S::ExecuteOrders, C::Win) => Some(S::Win),
        (S::Win, C::Replay) => Some(S::Start),
        (S::Win, C::Quit) => Some(S::End),
        (S::Tournament, C::Replay) => Some(S::Start),
        (S::Tournament, C::Quit) => Some(S::End),
        _ => None,
    }
}

/// Commands accepted in `state`, as tokens.
pub fn valid_commands(state: GameState) -> Vec<&'static str> {
    CommandKind::ALL
        .iter()
        .filter(|&&c| transition(state, c).is_some())
        .map(|c| c.token())
        .collect()
}

// ── Parsed command line ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl Command {
    /// Split a command line into a recognised token and its arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let token = parts.next().unwrap_or_default();
        let kind = CommandKind::from_token(&token.to_ascii_lowercase()).ok_or_else(|| {
            CommandError::Spelling { token: token.to_string() }
        })?;
        Ok(Command {
            kind,
            args: parts.map(str::to_string).collect(),
        })
    }
}

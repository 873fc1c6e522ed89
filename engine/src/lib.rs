pub mod types;
pub mod error;
pub mod config;
pub mod events;
pub mod map;
pub mod cards;
pub mod orders;
pub mod strategy;
pub mod reinforcement;
pub mod world;
pub mod turn;
pub mod state;
pub mod engine;
pub mod tournament;

pub use types::*;
pub use config::EngineConfig;
pub use engine::GameEngine;
pub use error::{CommandError, ConfigError, MapError};
pub use events::{FileSink, LogSink, MemorySink, NullSink};
pub use orders::{Order, OrderKind, OrdersList};
pub use state::GameState;
pub use strategy::{HumanChoice, HumanInput, NoHumanInput, ScriptedInput, Strategy};
pub use turn::GameOutcome;
pub use world::GameWorld;

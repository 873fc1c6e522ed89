pub mod database;
pub mod report;

pub use database::{Database, Standing, TournamentSummary};

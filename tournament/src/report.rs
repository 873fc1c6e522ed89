// ═══════════════════════════════════════════════════════════════════════
// Report rendering — plain-text tables for the runner
// ═══════════════════════════════════════════════════════════════════════

use crate::database::{Standing, TournamentSummary};
use conquest_engine::tournament::TournamentReport;
use std::fmt::Write;

/// Per-strategy standings of a single report, best first.
pub fn summarize(report: &TournamentReport) -> Vec<Standing> {
    let played = report.records.len() as u32;
    let draws = report.records.iter().filter(|r| r.winner == "Draw").count() as u32;
    let mut standings: Vec<Standing> = report
        .strategies
        .iter()
        .map(|s| Standing {
            strategy: s.clone(),
            games: played,
            wins: report.records.iter().filter(|r| &r.winner == s).count() as u32,
            draws,
        })
        .collect();
    standings.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.strategy.cmp(&b.strategy)));
    standings
}

pub fn render_standings(standings: &[Standing]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<14} {:>6} {:>6} {:>6} {:>7}", "Strategy", "Games", "Wins", "Draws", "Win %");
    let _ = writeln!(out, "{}", "-".repeat(43));
    for s in standings {
        let _ = writeln!(
            out,
            "{:<14} {:>6} {:>6} {:>6} {:>6.1}%",
            s.strategy,
            s.games,
            s.wins,
            s.draws,
            s.win_rate() * 100.0
        );
    }
    out
}

pub fn render_tournaments(tournaments: &[TournamentSummary]) -> String {
    let mut out = String::new();
    for t in tournaments {
        let _ = writeln!(
            out,
            "#{:<4} {}  seed {}  M: {}  P: {}  G: {}  D: {}",
            t.id,
            t.played_at,
            t.seed,
            t.maps.join(", "),
            t.strategies.join(", "),
            t.games,
            t.max_turns
        );
    }
    out
}

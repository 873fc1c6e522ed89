// ═══════════════════════════════════════════════════════════════════════
// Turn orchestrator — reinforcement, issue orders, execute orders, then
// card awards, elimination and the win check.
//
// Every phase is a no-op without a map or without players.
// ═══════════════════════════════════════════════════════════════════════

use crate::reinforcement;
use crate::strategy::{Decision, HumanInput};
use crate::types::*;
use crate::world::GameWorld;
use serde::{Deserialize, Serialize};

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner { id: PlayerId, name: String },
    Draw,
}

impl GameOutcome {
    pub fn label(&self) -> &str {
        match self {
            GameOutcome::Winner { name, .. } => name,
            GameOutcome::Draw => "Draw",
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl GameWorld {
    pub fn is_ready(&self) -> bool {
        self.map.is_some() && !self.roster.is_empty()
    }

    // ── Reinforcement ──────────────────────────────────────────────────

    pub fn reinforcement_phase(&mut self) {
        if !self.is_ready() {
            return;
        }
        let Some(map) = self.map.as_ref() else { return };
        let grants: Vec<(PlayerId, u32)> = self
            .roster
            .iter()
            .filter_map(|id| self.players.get(id))
            .filter(|p| !p.owned.is_empty())
            .map(|p| (p.id, reinforcement::reinforcement_for(map, p)))
            .collect();

        for (id, armies) in grants {
            if let Some(p) = self.players.get_mut(&id) {
                p.pool += armies;
                let line = format!("Player({}): pool = {}", p.name, p.pool);
                self.events.emit(line);
            }
        }
    }

    // ── Issue orders ───────────────────────────────────────────────────

    /// Round-robin until a full pass issues nothing (or the pass cap hits).
    /// A player whose pool is spent and who already issued a non-Deploy
    /// order sits out the rest of the phase. Returns decisions applied.
    pub fn issue_orders_phase(&mut self, input: &mut dyn HumanInput) -> usize {
        if !self.is_ready() {
            return 0;
        }
        for id in self.roster.clone() {
            if let Some(p) = self.players.get_mut(&id) {
                p.issued_non_deploy = false;
                p.strategy.begin_phase();
            }
        }

        let cap = self.config.max_issue_passes;
        let mut applied = 0;
        let mut passes = 0;
        loop {
            let mut any = false;
            for id in self.roster.clone() {
                let Some(p) = self.players.get(&id) else { continue };
                if p.available() == 0 && p.issued_non_deploy {
                    continue;
                }
                if self.issue_one(id, input) {
                    any = true;
                    applied += 1;
                }
            }
            passes += 1;
            if !any {
                break;
            }
            if passes >= cap {
                log::warn!("issue-orders phase stopped at the {} pass cap", cap);
                break;
            }
        }
        log::debug!("turn {}: {} decisions over {} passes", self.turn + 1, applied, passes);
        applied
    }

    /// Ask one player's strategy for at most one decision and apply it.
    fn issue_one(&mut self, id: PlayerId, input: &mut dyn HumanInput) -> bool {
        let Some(p) = self.players.get_mut(&id) else {
            return false;
        };
        let mut strategy = std::mem::take(&mut p.strategy);
        let decision = strategy.decide(self, id, input);
        if let Some(p) = self.players.get_mut(&id) {
            p.strategy = strategy;
        }
        self.apply_decision(id, decision)
    }

    fn apply_decision(&mut self, id: PlayerId, decision: Decision) -> bool {
        let (accepted, non_deploy) = match decision {
            Decision::Issue(order) => {
                let non_deploy = !order.is_deploy();
                (self.issue_order(order), non_deploy)
            }
            Decision::PlayCard { card, order } => {
                let non_deploy = order.as_ref().is_some_and(|o| !o.is_deploy());
                (self.play_card(id, card, order), non_deploy)
            }
            Decision::Cheat => {
                let taken = self.cheat_conquest(id);
                log::debug!("{} took {} territories without a fight", self.player_name(id), taken);
                (true, true)
            }
            Decision::Pass => (false, false),
        };
        if accepted && non_deploy {
            if let Some(p) = self.players.get_mut(&id) {
                p.issued_non_deploy = true;
            }
        }
        accepted
    }

    // ── Execute orders ─────────────────────────────────────────────────

    /// All Deploys land first (one per player per scan), then the remaining
    /// orders drain round-robin. Returns the number of orders executed.
    pub fn execute_orders_phase(&mut self) -> usize {
        if !self.is_ready() {
            return 0;
        }
        let mut executed = 0;

        loop {
            let mut any = false;
            for id in self.roster.clone() {
                let next = self.players.get_mut(&id).and_then(|p| p.orders.take_next_deploy());
                if let Some(order) = next {
                    self.run_order(id, order);
                    executed += 1;
                    any = true;
                }
            }
            if !any {
                break;
            }
        }

        loop {
            let mut any = false;
            for id in self.roster.clone() {
                let next = self.players.get_mut(&id).and_then(|p| p.orders.pop_front());
                if let Some(order) = next {
                    self.run_order(id, order);
                    executed += 1;
                    any = true;
                }
            }
            if !any {
                break;
            }
        }
        executed
    }

    fn run_order(&mut self, owner: PlayerId, mut order: crate::orders::Order) {
        let name = self.player_name(owner);
        self.events.emit(format!("OrdersList({}): removed = {}", name, order));
        order.execute(self);
    }

    // ── End of turn ────────────────────────────────────────────────────

    /// Card awards, elimination and truce reset. Advances the turn counter.
    pub fn end_turn(&mut self) {
        if !self.is_ready() {
            return;
        }

        for id in self.roster.clone() {
            let Some(p) = self.players.get_mut(&id) else { continue };
            if !p.conquered_this_turn {
                continue;
            }
            p.conquered_this_turn = false;
            if let Some(card) = self.deck.draw(&mut p.hand, &mut self.rng) {
                let line = format!("Hand({}): drew = {}", p.name, card);
                self.events.emit(line);
            }
        }

        let eliminated: Vec<PlayerId> = self
            .roster
            .iter()
            .copied()
            .filter(|id| self.players.get(id).map_or(true, |p| p.owned.is_empty()))
            .collect();
        for id in eliminated {
            self.roster.retain(|&r| r != id);
            if let Some(mut p) = self.players.remove(&id) {
                for card in p.hand.drain() {
                    self.deck.put_back(card);
                }
                log::info!("{} eliminated on turn {}", p.name, self.turn + 1);
                self.events.emit(format!("Player({}): eliminated = true", p.name));
            }
        }

        for p in self.players.values_mut() {
            p.truces.clear();
        }
        self.turn += 1;
    }

    // ── Main loop ──────────────────────────────────────────────────────

    /// One full turn. Returns the winner if the game is now over.
    pub fn play_turn(&mut self, input: &mut dyn HumanInput) -> Option<PlayerId> {
        if !self.is_ready() {
            return None;
        }
        self.reinforcement_phase();
        self.issue_orders_phase(input);
        self.execute_orders_phase();
        self.end_turn();
        self.winner()
    }

    /// Play turns until someone wins or `ceiling` turns have been played.
    pub fn run_until(&mut self, input: &mut dyn HumanInput, ceiling: u32) -> GameOutcome {
        loop {
            if let Some(id) = self.winner() {
                return GameOutcome::Winner { id, name: self.player_name(id) };
            }
            if !self.is_ready() || self.turn >= ceiling {
                return GameOutcome::Draw;
            }
            self.play_turn(input);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GameWorld — the mutable state of one game
//
// The map arena owns territories and continents; players are keyed by id
// and hold id sets, never references. Ownership changes go through
// `transfer()` so that `territory.owner == p` iff `p.owned` contains it.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{CardKind, Deck};
use crate::config::EngineConfig;
use crate::events::EventLog;
use crate::orders::Order;
use crate::strategy::Strategy;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-round kill chances used by Advance combat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatOdds {
    pub attacker: f64,
    pub defender: f64,
}

impl Default for CombatOdds {
    fn default() -> Self {
        CombatOdds { attacker: 0.6, defender: 0.7 }
    }
}

pub const NEUTRAL_NAME: &str = "Neutral";

#[derive(Debug, Clone)]
pub struct GameWorld {
    pub map: Option<GameMap>,
    /// Every live player, including the shared Neutral player.
    pub players: BTreeMap<PlayerId, Player>,
    /// Turn order of the active players. The Neutral player is never in it.
    pub roster: Vec<PlayerId>,
    /// Receives blockaded territories.
    pub neutral: PlayerId,
    pub deck: Deck,
    pub rng: ChaCha8Rng,
    pub odds: CombatOdds,
    pub events: EventLog,
    pub config: EngineConfig,
    pub turn: u32,
    next_player: usize,
}

impl GameWorld {
    pub fn new(config: EngineConfig) -> Self {
        let neutral = PlayerId(0);
        let mut players = BTreeMap::new();
        players.insert(neutral, Player::new(neutral, NEUTRAL_NAME, Strategy::Neutral));
        GameWorld {
            map: None,
            players,
            roster: Vec::new(),
            neutral,
            deck: Deck::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            odds: CombatOdds {
                attacker: config.attacker_kill_chance,
                defender: config.defender_kill_chance,
            },
            events: EventLog::default(),
            config,
            turn: 0,
            next_player: 1,
        }
    }

    pub fn with_map(config: EngineConfig, map: GameMap) -> Self {
        let mut world = Self::new(config);
        world.map = Some(map);
        world
    }

    // ── Lookups ────────────────────────────────────────────────────────

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn find_player(&self, name: &str) -> Option<PlayerId> {
        self.roster
            .iter()
            .copied()
            .find(|id| self.player(*id).is_some_and(|p| p.name == name))
    }

    pub fn player_name(&self, id: PlayerId) -> String {
        self.player(id).map_or_else(|| format!("player {}", id), |p| p.name.clone())
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.map.as_ref()?.territory(id)
    }

    pub fn territory_name(&self, id: TerritoryId) -> String {
        self.territory(id)
            .map_or_else(|| format!("territory {}", id.0), |t| t.name.clone())
    }

    pub fn owner_of(&self, id: TerritoryId) -> Option<PlayerId> {
        self.territory(id)?.owner
    }

    pub fn are_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.map.as_ref().is_some_and(|m| m.are_adjacent(a, b))
    }

    pub fn armies(&self, id: TerritoryId) -> u32 {
        self.territory(id).map_or(0, |t| t.armies)
    }

    /// Current armies plus any still-queued Deploys of the owner onto it.
    pub fn projected_armies(&self, owner: PlayerId, id: TerritoryId) -> u32 {
        let queued: u32 = self
            .player(owner)
            .map(|p| {
                p.orders
                    .iter()
                    .filter_map(|o| match o.kind() {
                        crate::orders::OrderKind::Deploy { target, armies, .. } if *target == id => Some(*armies),
                        _ => None,
                    })
                    .sum()
            })
            .unwrap_or(0);
        self.armies(id) + queued
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.roster.contains(&id)
    }

    // ── Mutation helpers ───────────────────────────────────────────────

    pub fn set_armies(&mut self, id: TerritoryId, armies: u32) {
        let Some(t) = self.map.as_mut().and_then(|m| m.territory_mut(id)) else {
            return;
        };
        t.armies = armies;
        let line = format!("Territory({}): armies = {}", t.name, armies);
        self.events.emit(line);
    }

    pub fn add_armies(&mut self, id: TerritoryId, armies: u32) {
        let current = self.armies(id);
        self.set_armies(id, current + armies);
    }

    pub fn remove_armies(&mut self, id: TerritoryId, armies: u32) {
        let current = self.armies(id);
        self.set_armies(id, current.saturating_sub(armies));
    }

    /// Move ownership of `id` to `to`, keeping both owned sets in sync.
    pub fn transfer(&mut self, id: TerritoryId, to: PlayerId) {
        let Some(t) = self.map.as_mut().and_then(|m| m.territory_mut(id)) else {
            return;
        };
        let previous = t.owner.replace(to);
        let territory_name = t.name.clone();
        if let Some(prev) = previous {
            if let Some(p) = self.players.get_mut(&prev) {
                p.owned.remove(&id);
            }
        }
        if let Some(p) = self.players.get_mut(&to) {
            p.owned.insert(id);
        }
        let owner_name = self.player_name(to);
        self.events.emit(format!("Territory({}): owner = {}", territory_name, owner_name));
    }

    /// A roster player running the Neutral policy turns Aggressive the
    /// moment one of its territories falls to an Advance.
    pub fn on_territory_conquered(&mut self, previous_owner: PlayerId) {
        if previous_owner == self.neutral {
            return;
        }
        let Some(p) = self.players.get_mut(&previous_owner) else {
            return;
        };
        if matches!(p.strategy, Strategy::Neutral) {
            p.strategy = Strategy::Aggressive;
            let line = format!("Player({}): strategy = {}", p.name, p.strategy.name());
            log::info!("{} turned aggressive after losing a territory", p.name);
            self.events.emit(line);
        }
    }

    pub fn set_strategy(&mut self, id: PlayerId, strategy: Strategy) {
        if let Some(p) = self.players.get_mut(&id) {
            p.strategy = strategy.fresh();
            let line = format!("Player({}): strategy = {}", p.name, p.strategy.name());
            self.events.emit(line);
        }
    }

    // ── Players ────────────────────────────────────────────────────────

    pub fn add_player(&mut self, name: &str, strategy: Strategy) -> PlayerId {
        let id = PlayerId(self.next_player);
        self.next_player += 1;
        self.players.insert(id, Player::new(id, name, strategy));
        self.roster.push(id);
        self.events.emit(format!("Player({}): strategy = {}", name, strategy.name()));
        id
    }

    /// Queue an order on the issuer's list.
    pub fn issue_order(&mut self, order: Order) -> bool {
        let Some(p) = self.players.get_mut(&order.issuer()) else {
            return false;
        };
        let line = p.issue_order(order);
        self.events.emit(line);
        true
    }

    /// Reorder a queued order of `id`.
    pub fn move_order(&mut self, id: PlayerId, from: usize, to: usize) -> bool {
        let Some(p) = self.players.get_mut(&id) else {
            return false;
        };
        if !p.orders.move_order(from, to) {
            return false;
        }
        let line = format!("OrdersList({}): moved = {} -> {}", p.name, from, to);
        self.events.emit(line);
        true
    }

    /// Withdraw a queued order. A withdrawn Deploy frees its armies.
    pub fn remove_order(&mut self, id: PlayerId, index: usize) -> Option<Order> {
        let p = self.players.get_mut(&id)?;
        let order = p.orders.remove(index)?;
        if let Some(armies) = order.deploy_armies() {
            p.committed = p.committed.saturating_sub(armies);
        }
        let line = format!("OrdersList({}): removed = {}", p.name, order);
        self.events.emit(line);
        Some(order)
    }

    /// Play `card` from the player's hand: the card goes back to the deck and
    /// its effect (an order, or pool armies for Reinforcement) is applied.
    pub fn play_card(&mut self, id: PlayerId, card: CardKind, order: Option<Order>) -> bool {
        let order_ok = match (&card, &order) {
            (CardKind::Reinforcement, None) => true,
            (_, Some(o)) => card.accepts(o) && o.issuer() == id,
            _ => false,
        };
        if !order_ok {
            return false;
        }
        let bonus = self.config.reinforcement_card_armies;
        let Some(p) = self.players.get_mut(&id) else {
            return false;
        };
        if !p.hand.remove(card) {
            return false;
        }
        if card == CardKind::Reinforcement {
            p.pool += bonus;
        }
        let name = p.name.clone();
        let pool = p.pool;
        self.deck.put_back(card);
        self.events.emit(format!("Hand({}): played = {}", name, card));
        match order {
            Some(order) => self.issue_order(order),
            None => {
                self.events.emit(format!("Player({}): pool = {}", name, pool));
                true
            }
        }
    }

    /// Cheater move: take every enemy territory adjacent to one already owned,
    /// without combat. Returns how many changed hands.
    pub fn cheat_conquest(&mut self, id: PlayerId) -> usize {
        let Some(player) = self.player(id) else {
            return 0;
        };
        let Some(map) = self.map.as_ref() else {
            return 0;
        };
        let mut targets: Vec<TerritoryId> = player
            .owned
            .iter()
            .filter_map(|&t| map.territory(t))
            .flat_map(|t| t.adjacent.iter().copied())
            .filter(|&n| map.territory(n).is_some_and(|t| t.owner != Some(id)))
            .collect();
        targets.sort();
        targets.dedup();

        for &t in &targets {
            self.transfer(t, id);
        }
        if !targets.is_empty() {
            if let Some(p) = self.player_mut(id) {
                p.conquered_this_turn = true;
            }
        }
        targets.len()
    }

    // ── Setup ──────────────────────────────────────────────────────────

    /// Startup phase: shuffle the roster, deal territories round-robin,
    /// fill pools, build the deck and deal opening hands.
    pub fn start_game(&mut self) {
        self.roster.shuffle(&mut self.rng);

        let mut territories: Vec<TerritoryId> = self
            .map
            .as_ref()
            .map(|m| m.territory_ids().collect())
            .unwrap_or_default();
        territories.shuffle(&mut self.rng);

        let roster = self.roster.clone();
        if !roster.is_empty() {
            for (i, t) in territories.into_iter().enumerate() {
                self.transfer(t, roster[i % roster.len()]);
                self.set_armies(t, 0);
            }
        }

        self.deck = Deck::new(self.config.cards_per_kind);
        let initial = self.config.initial_armies;
        let opening_cards = self.config.starting_cards;
        for id in &roster {
            let Some(p) = self.players.get_mut(id) else { continue };
            p.pool = initial;
            for _ in 0..opening_cards {
                if self.deck.draw(&mut p.hand, &mut self.rng).is_none() {
                    break;
                }
            }
            let line = format!("Player({}): pool = {}", p.name, p.pool);
            self.events.emit(line);
        }

        let order: Vec<String> = roster.iter().map(|id| self.player_name(*id)).collect();
        self.events.emit(format!("GameEngine: play order = {}", order.join(", ")));
        self.turn = 0;
    }

    /// Single survivor, or every territory under one active owner.
    pub fn winner(&self) -> Option<PlayerId> {
        if self.roster.len() == 1 {
            return self.roster.first().copied();
        }
        let owner = self.map.as_ref()?.common_owner()?;
        self.is_active(owner).then_some(owner)
    }
}

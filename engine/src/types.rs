// ═══════════════════════════════════════════════════════════════════════
// Core types — ids, map arena entries and the player record
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::Hand;
use crate::orders::{Order, OrdersList};
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Ids ────────────────────────────────────────────────────────────────
// Compact, copyable identifiers. Territories and continents index into the
// map arena; players key into the world's player table.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContinentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Territory ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub continent: ContinentId,
    pub adjacent: BTreeSet<TerritoryId>,
    pub owner: Option<PlayerId>,
    pub armies: u32,
}

impl Territory {
    pub fn is_adjacent(&self, other: TerritoryId) -> bool {
        self.adjacent.contains(&other)
    }
}

// ── Continent ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Continent {
    pub id: ContinentId,
    pub name: String,
    pub bonus: u32,
    pub territories: BTreeSet<TerritoryId>,
}

// ── Map ────────────────────────────────────────────────────────────────

/// Arena of territories and continents, addressed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMap {
    pub name: String,
    pub territories: Vec<Territory>,
    pub continents: Vec<Continent>,
}

impl GameMap {
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(id.0)
    }

    pub fn territory_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        self.territories.get_mut(id.0)
    }

    pub fn continent(&self, id: ContinentId) -> Option<&Continent> {
        self.continents.get(id.0)
    }

    pub fn territory_count(&self) -> usize {
        self.territories.len()
    }

    pub fn territory_ids(&self) -> impl Iterator<Item = TerritoryId> + '_ {
        self.territories.iter().map(|t| t.id)
    }

    pub fn find_territory(&self, name: &str) -> Option<TerritoryId> {
        self.territories
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .map(|t| t.id)
    }

    pub fn are_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.territory(a).is_some_and(|t| t.is_adjacent(b))
    }

    /// If every territory has the same owner, returns it.
    pub fn common_owner(&self) -> Option<PlayerId> {
        let first = self.territories.first()?.owner?;
        self.territories
            .iter()
            .all(|t| t.owner == Some(first))
            .then_some(first)
    }
}

// ── Player ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Reinforcement pool.
    pub pool: u32,
    /// Armies promised to queued Deploy orders, not yet removed from the pool.
    pub committed: u32,
    pub owned: BTreeSet<TerritoryId>,
    pub orders: OrdersList,
    pub strategy: Strategy,
    pub truces: BTreeSet<PlayerId>,
    pub conquered_this_turn: bool,
    /// Set once a non-Deploy order is issued during the current issue phase.
    pub issued_non_deploy: bool,
    pub hand: Hand,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, strategy: Strategy) -> Self {
        Player {
            id,
            name: name.into(),
            pool: 0,
            committed: 0,
            owned: BTreeSet::new(),
            orders: OrdersList::default(),
            strategy,
            truces: BTreeSet::new(),
            conquered_this_turn: false,
            issued_non_deploy: false,
            hand: Hand::default(),
        }
    }

    /// Pool armies not yet promised to a queued Deploy.
    pub fn available(&self) -> u32 {
        self.pool.saturating_sub(self.committed)
    }

    pub fn owns(&self, t: TerritoryId) -> bool {
        self.owned.contains(&t)
    }

    pub fn has_truce_with(&self, other: PlayerId) -> bool {
        self.truces.contains(&other)
    }

    /// Queue an externally constructed order (card play, human input).
    /// Returns the event line describing the queue mutation.
    pub fn issue_order(&mut self, order: Order) -> String {
        if let Some(armies) = order.deploy_armies() {
            self.committed = self.committed.saturating_add(armies);
        }
        let line = format!("OrdersList({}): added = {}", self.name, order);
        self.orders.push(order);
        line
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Orders — one-shot commands and the per-player FIFO queue
//
// `validate()` is a pure precondition check against the world.
// `execute()` re-validates, then mutates exactly the entities the order
// names and records a write-once effect string. An order that fails
// validation at execution time is skipped with an "Invalid <Name>" effect.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;
use crate::world::{CombatOdds, GameWorld};
use rand::Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Deploy { issuer: PlayerId, target: TerritoryId, armies: u32 },
    Advance { issuer: PlayerId, source: TerritoryId, target: TerritoryId, armies: u32 },
    Bomb { issuer: PlayerId, target: TerritoryId },
    Blockade { issuer: PlayerId, target: TerritoryId },
    Airlift { issuer: PlayerId, source: TerritoryId, target: TerritoryId, armies: u32 },
    Negotiate { issuer: PlayerId, other: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    kind: OrderKind,
    effect: Option<String>,
    /// An Advance that may only move armies between own territories.
    move_only: bool,
}

impl Order {
    pub fn new(kind: OrderKind) -> Self {
        Order { kind, effect: None, move_only: false }
    }

    pub fn deploy(issuer: PlayerId, target: TerritoryId, armies: u32) -> Self {
        Self::new(OrderKind::Deploy { issuer, target, armies })
    }

    pub fn advance(issuer: PlayerId, source: TerritoryId, target: TerritoryId, armies: u32) -> Self {
        Self::new(OrderKind::Advance { issuer, source, target, armies })
    }

    /// Advance between own territories that turns invalid, rather than
    /// into an attack, if the target changes hands before it executes.
    pub fn reposition(issuer: PlayerId, source: TerritoryId, target: TerritoryId, armies: u32) -> Self {
        Order { move_only: true, ..Self::advance(issuer, source, target, armies) }
    }

    pub fn bomb(issuer: PlayerId, target: TerritoryId) -> Self {
        Self::new(OrderKind::Bomb { issuer, target })
    }

    pub fn blockade(issuer: PlayerId, target: TerritoryId) -> Self {
        Self::new(OrderKind::Blockade { issuer, target })
    }

    pub fn airlift(issuer: PlayerId, source: TerritoryId, target: TerritoryId, armies: u32) -> Self {
        Self::new(OrderKind::Airlift { issuer, source, target, armies })
    }

    pub fn negotiate(issuer: PlayerId, other: PlayerId) -> Self {
        Self::new(OrderKind::Negotiate { issuer, other })
    }

    pub fn kind(&self) -> &OrderKind {
        &self.kind
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            OrderKind::Deploy { .. } => "Deploy",
            OrderKind::Advance { .. } => "Advance",
            OrderKind::Bomb { .. } => "Bomb",
            OrderKind::Blockade { .. } => "Blockade",
            OrderKind::Airlift { .. } => "Airlift",
            OrderKind::Negotiate { .. } => "Negotiate",
        }
    }

    pub fn issuer(&self) -> PlayerId {
        match self.kind {
            OrderKind::Deploy { issuer, .. }
            | OrderKind::Advance { issuer, .. }
            | OrderKind::Bomb { issuer, .. }
            | OrderKind::Blockade { issuer, .. }
            | OrderKind::Airlift { issuer, .. }
            | OrderKind::Negotiate { issuer, .. } => issuer,
        }
    }

    pub fn is_move_only(&self) -> bool {
        self.move_only
    }

    pub fn is_deploy(&self) -> bool {
        matches!(self.kind, OrderKind::Deploy { .. })
    }

    /// Armies a Deploy commits from the pool.
    pub fn deploy_armies(&self) -> Option<u32> {
        match self.kind {
            OrderKind::Deploy { armies, .. } => Some(armies),
            _ => None,
        }
    }

    /// Set once by `execute()`.
    pub fn effect(&self) -> Option<&str> {
        self.effect.as_deref()
    }

    // ── Validation ─────────────────────────────────────────────────────

    pub fn validate(&self, world: &GameWorld) -> bool {
        let issuer = self.issuer();
        let Some(player) = world.player(issuer) else {
            return false;
        };
        let owned_by_issuer = |t: TerritoryId| world.owner_of(t) == Some(issuer);
        // true when the territory's owner (if any, other than the issuer) is truced
        let truced = |t: TerritoryId| {
            world
                .owner_of(t)
                .is_some_and(|o| o != issuer && player.has_truce_with(o))
        };

        match self.kind {
            OrderKind::Deploy { target, armies, .. } => {
                owned_by_issuer(target) && armies > 0 && player.pool >= armies
            }
            OrderKind::Advance { source, target, armies, .. } => {
                owned_by_issuer(source)
                    && armies > 0
                    && world.territory(source).is_some_and(|s| s.armies >= armies)
                    && world.territory(target).is_some()
                    && world.are_adjacent(source, target)
                    && !truced(target)
                    && (!self.move_only || owned_by_issuer(target))
            }
            OrderKind::Bomb { target, .. } => {
                world.territory(target).is_some()
                    && !owned_by_issuer(target)
                    && player.owned.iter().any(|&t| world.are_adjacent(t, target))
                    && !truced(target)
            }
            OrderKind::Blockade { target, .. } => owned_by_issuer(target),
            OrderKind::Airlift { source, target, armies, .. } => {
                owned_by_issuer(source)
                    && owned_by_issuer(target)
                    && world.territory(source).is_some_and(|s| s.armies >= armies)
            }
            OrderKind::Negotiate { other, .. } => other != issuer && world.player(other).is_some(),
        }
    }

    // ── Execution ──────────────────────────────────────────────────────

    /// Execute once. Re-running an executed order only returns its effect.
    pub fn execute(&mut self, world: &mut GameWorld) -> String {
        if let Some(effect) = &self.effect {
            return effect.clone();
        }

        let valid = self.validate(world);
        if let OrderKind::Deploy { issuer, armies, .. } = self.kind {
            if let Some(p) = world.player_mut(issuer) {
                p.committed = p.committed.saturating_sub(armies);
            }
        }

        let effect = if valid {
            self.apply(world)
        } else {
            format!("Invalid {}", self.name())
        };

        log::debug!("{} executed: {}", self.name(), effect);
        world.events.emit(format!("Order: {} | Effect: {}", self.name(), effect));
        self.effect = Some(effect.clone());
        effect
    }

    fn apply(&self, world: &mut GameWorld) -> String {
        match self.kind {
            OrderKind::Deploy { issuer, target, armies } => {
                if let Some(p) = world.player_mut(issuer) {
                    p.pool -= armies;
                }
                world.add_armies(target, armies);
                format!(
                    "{} deployed {} armies to {}",
                    world.player_name(issuer),
                    armies,
                    world.territory_name(target)
                )
            }

            OrderKind::Advance { issuer, source, target, armies } => {
                if world.owner_of(target) == Some(issuer) {
                    world.remove_armies(source, armies);
                    world.add_armies(target, armies);
                    return format!(
                        "{} moved {} armies from {} to {}",
                        world.player_name(issuer),
                        armies,
                        world.territory_name(source),
                        world.territory_name(target)
                    );
                }

                let defender = world.owner_of(target);
                let defenders = world.territory(target).map_or(0, |t| t.armies);
                let odds = world.odds;
                let outcome = resolve_combat(armies, defenders, odds, &mut world.rng);
                world.remove_armies(source, armies);

                if outcome.defenders == 0 {
                    world.transfer(target, issuer);
                    world.set_armies(target, outcome.attackers);
                    if let Some(p) = world.player_mut(issuer) {
                        p.conquered_this_turn = true;
                    }
                    if let Some(previous) = defender {
                        world.on_territory_conquered(previous);
                    }
                    format!(
                        "{} conquered {} with {} of {} armies surviving",
                        world.player_name(issuer),
                        world.territory_name(target),
                        outcome.attackers,
                        armies
                    )
                } else {
                    world.set_armies(target, outcome.defenders);
                    format!(
                        "{} attacked {} with {} armies and was repelled; {} defenders remain",
                        world.player_name(issuer),
                        world.territory_name(target),
                        armies,
                        outcome.defenders
                    )
                }
            }

            OrderKind::Bomb { issuer, target } => {
                let current = world.territory(target).map_or(0, |t| t.armies);
                let destroyed = current / 2;
                world.set_armies(target, current - destroyed);
                format!(
                    "{} bombed {}, destroying {} armies",
                    world.player_name(issuer),
                    world.territory_name(target),
                    destroyed
                )
            }

            OrderKind::Blockade { issuer, target } => {
                let current = world.territory(target).map_or(0, |t| t.armies);
                world.set_armies(target, current * 2);
                let neutral = world.neutral;
                world.transfer(target, neutral);
                format!(
                    "{} blockaded {}; it now holds {} armies under {}",
                    world.player_name(issuer),
                    world.territory_name(target),
                    current * 2,
                    world.player_name(neutral)
                )
            }

            OrderKind::Airlift { issuer, source, target, armies } => {
                world.remove_armies(source, armies);
                world.add_armies(target, armies);
                format!(
                    "{} airlifted {} armies from {} to {}",
                    world.player_name(issuer),
                    armies,
                    world.territory_name(source),
                    world.territory_name(target)
                )
            }

            OrderKind::Negotiate { issuer, other } => {
                if let Some(p) = world.player_mut(issuer) {
                    p.truces.insert(other);
                }
                if let Some(p) = world.player_mut(other) {
                    p.truces.insert(issuer);
                }
                format!(
                    "{} and {} negotiated a truce for this turn",
                    world.player_name(issuer),
                    world.player_name(other)
                )
            }
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            OrderKind::Deploy { issuer, target, armies } => {
                write!(f, "Deploy(issuer {}, target {}, armies {})", issuer, target.0, armies)
            }
            OrderKind::Advance { issuer, source, target, armies } => write!(
                f,
                "Advance(issuer {}, source {}, target {}, armies {})",
                issuer, source.0, target.0, armies
            ),
            OrderKind::Bomb { issuer, target } => write!(f, "Bomb(issuer {}, target {})", issuer, target.0),
            OrderKind::Blockade { issuer, target } => {
                write!(f, "Blockade(issuer {}, target {})", issuer, target.0)
            }
            OrderKind::Airlift { issuer, source, target, armies } => write!(
                f,
                "Airlift(issuer {}, source {}, target {}, armies {})",
                issuer, source.0, target.0, armies
            ),
            OrderKind::Negotiate { issuer, other } => write!(f, "Negotiate(issuer {}, other {})", issuer, other),
        }
    }
}

// ── Combat ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatOutcome {
    pub attackers: u32,
    pub defenders: u32,
}

/// Round-by-round attrition. Each round the attacker kills one defender with
/// `odds.attacker` and the defender kills one attacker with `odds.defender`;
/// both draws are independent and may land in the same round. With both
/// chances at zero nobody can fall, so the defenders simply hold.
pub fn resolve_combat(
    mut attackers: u32,
    mut defenders: u32,
    odds: CombatOdds,
    rng: &mut impl Rng,
) -> CombatOutcome {
    if odds.attacker <= 0.0 && odds.defender <= 0.0 {
        return CombatOutcome { attackers, defenders };
    }
    while attackers > 0 && defenders > 0 {
        let attacker_hits = rng.gen_bool(odds.attacker);
        let defender_hits = rng.gen_bool(odds.defender);
        if attacker_hits {
            defenders -= 1;
        }
        if defender_hits {
            attackers -= 1;
        }
    }
    CombatOutcome { attackers, defenders }
}

// ── Orders list ────────────────────────────────────────────────────────

/// Per-player FIFO of pending orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersList {
    orders: VecDeque<Order>,
}

impl OrdersList {
    pub fn push(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Remove the earliest queued Deploy, keeping everything else in place.
    pub fn take_next_deploy(&mut self) -> Option<Order> {
        let pos = self.orders.iter().position(Order::is_deploy)?;
        self.orders.remove(pos)
    }

    pub fn has_deploy(&self) -> bool {
        self.orders.iter().any(Order::is_deploy)
    }

    /// Move the order at `from` so that it ends up at index `to`.
    pub fn move_order(&mut self, from: usize, to: usize) -> bool {
        if from >= self.orders.len() || to >= self.orders.len() {
            return false;
        }
        if let Some(order) = self.orders.remove(from) {
            self.orders.insert(to, order);
        }
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Order> {
        self.orders.remove(index)
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

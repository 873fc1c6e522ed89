// ═══════════════════════════════════════════════════════════════════════
// Player strategies — pluggable decision policies
//
// A strategy looks at the world (read-only) and returns a Decision; the
// orchestrator applies it. Strategies never mutate the world themselves,
// which keeps the Cheater's silent conquest and card plays in one place.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardKind;
use crate::orders::Order;
use crate::types::*;
use crate::world::GameWorld;
use std::collections::VecDeque;

/// What a strategy wants to do with one issue-orders call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Issue(Order),
    /// Play a card from hand; Reinforcement carries no order.
    PlayCard { card: CardKind, order: Option<Order> },
    /// Take every adjacent enemy territory without an order.
    Cheat,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    Aggressive,
    Benevolent,
    #[default]
    Neutral,
    Human,
    /// `acted` is set after the once-per-phase conquest.
    Cheater { acted: bool },
}

impl Strategy {
    pub const NAMES: [&'static str; 5] = ["Aggressive", "Benevolent", "Neutral", "Human", "Cheater"];

    pub fn cheater() -> Self {
        Strategy::Cheater { acted: false }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Aggressive => "Aggressive",
            Strategy::Benevolent => "Benevolent",
            Strategy::Neutral => "Neutral",
            Strategy::Human => "Human",
            Strategy::Cheater { .. } => "Cheater",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aggressive" => Some(Strategy::Aggressive),
            "benevolent" => Some(Strategy::Benevolent),
            "neutral" => Some(Strategy::Neutral),
            "human" => Some(Strategy::Human),
            "cheater" => Some(Strategy::cheater()),
            _ => None,
        }
    }

    /// Same policy with no carried-over state.
    pub fn fresh(self) -> Self {
        match self {
            Strategy::Cheater { .. } => Strategy::cheater(),
            other => other,
        }
    }

    /// Called by the orchestrator at the start of every issue-orders phase.
    pub fn begin_phase(&mut self) {
        if let Strategy::Cheater { acted } = self {
            *acted = false;
        }
    }

    // ── Territory lists ────────────────────────────────────────────────

    pub fn to_defend(&self, world: &GameWorld, me: PlayerId) -> Vec<TerritoryId> {
        let mut owned = owned_territories(world, me);
        match self {
            Strategy::Aggressive => {
                owned.sort_by_key(|&t| (std::cmp::Reverse(world.projected_armies(me, t)), t));
            }
            Strategy::Benevolent => {
                owned.sort_by_key(|&t| (world.projected_armies(me, t), t));
            }
            _ => {}
        }
        owned
    }

    pub fn to_attack(&self, world: &GameWorld, me: PlayerId) -> Vec<TerritoryId> {
        match self {
            Strategy::Benevolent => Vec::new(),
            Strategy::Aggressive => {
                let mut targets = enemy_neighbours(world, me);
                targets.sort_by_key(|&t| (world.armies(t), t));
                targets
            }
            _ => enemy_neighbours(world, me),
        }
    }

    // ── Decisions ──────────────────────────────────────────────────────

    pub fn decide(&mut self, world: &GameWorld, me: PlayerId, input: &mut dyn HumanInput) -> Decision {
        let Some(player) = world.player(me) else {
            return Decision::Pass;
        };
        match *self {
            Strategy::Aggressive => self.decide_aggressive(world, player),
            Strategy::Benevolent => self.decide_benevolent(world, player),
            Strategy::Neutral => Decision::Pass,
            Strategy::Human => match input.next_order(world, me) {
                Some(HumanChoice::Order(order)) if order.issuer() == me => Decision::Issue(order),
                Some(HumanChoice::PlayCard { card, order }) => Decision::PlayCard { card, order },
                _ => Decision::Pass,
            },
            Strategy::Cheater { acted: true } => Decision::Pass,
            Strategy::Cheater { acted: false } => {
                *self = Strategy::Cheater { acted: true };
                Decision::Cheat
            }
        }
    }

    fn decide_aggressive(&self, world: &GameWorld, player: &Player) -> Decision {
        let me = player.id;
        if player.hand.contains(CardKind::Reinforcement) && !player.issued_non_deploy {
            return Decision::PlayCard { card: CardKind::Reinforcement, order: None };
        }

        let defend = self.to_defend(world, me);
        let Some(&strongest) = defend.first() else {
            return Decision::Pass;
        };

        if player.available() > 0 {
            return Decision::Issue(Order::deploy(me, strongest, player.available()));
        }

        let armies = world.projected_armies(me, strongest);
        if armies > 0 {
            let mut enemies = enemy_neighbours_of(world, me, strongest);
            enemies.sort_by_key(|&t| (world.armies(t), t));
            if let Some(&target) = enemies.first() {
                return Decision::Issue(Order::advance(me, strongest, target, armies));
            }
            // Interior stack: push it toward the front.
            if let Some(step) = frontier_step(world, me, strongest) {
                return Decision::Issue(Order::advance(me, strongest, step, armies));
            }
        }

        if player.hand.contains(CardKind::Bomb) {
            let target = self
                .to_attack(world, me)
                .into_iter()
                .max_by_key(|&t| (world.armies(t), std::cmp::Reverse(t)));
            if let Some(target) = target {
                return Decision::PlayCard {
                    card: CardKind::Bomb,
                    order: Some(Order::bomb(me, target)),
                };
            }
        }
        Decision::Pass
    }

    fn decide_benevolent(&self, world: &GameWorld, player: &Player) -> Decision {
        let me = player.id;
        if player.hand.contains(CardKind::Reinforcement) && !player.issued_non_deploy {
            return Decision::PlayCard { card: CardKind::Reinforcement, order: None };
        }

        let defend = self.to_defend(world, me);
        let Some(&weakest) = defend.first() else {
            return Decision::Pass;
        };

        let available = player.available();
        if available > 0 {
            return Decision::Issue(Order::deploy(me, weakest, available.div_ceil(2)));
        }

        // Shift from the strongest stack to its weakest owned neighbour.
        for &source in defend.iter().rev() {
            let have = world.projected_armies(me, source);
            let neighbour = owned_neighbours_of(world, me, source)
                .into_iter()
                .min_by_key(|&t| (world.projected_armies(me, t), t));
            if let Some(target) = neighbour {
                let diff = have.saturating_sub(world.projected_armies(me, target));
                if diff >= 2 {
                    return Decision::Issue(Order::reposition(me, source, target, diff / 2));
                }
            }
        }

        if player.hand.contains(CardKind::Airlift) {
            if let Some(&strongest) = defend.last() {
                let diff = world.armies(strongest).saturating_sub(world.armies(weakest));
                if strongest != weakest && diff >= 2 {
                    return Decision::PlayCard {
                        card: CardKind::Airlift,
                        order: Some(Order::airlift(me, strongest, weakest, diff / 2)),
                    };
                }
            }
        }
        Decision::Pass
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

fn owned_territories(world: &GameWorld, me: PlayerId) -> Vec<TerritoryId> {
    world
        .player(me)
        .map(|p| p.owned.iter().copied().collect())
        .unwrap_or_default()
}

fn enemy_neighbours_of(world: &GameWorld, me: PlayerId, t: TerritoryId) -> Vec<TerritoryId> {
    world
        .territory(t)
        .map(|terr| {
            terr.adjacent
                .iter()
                .copied()
                .filter(|&n| world.owner_of(n) != Some(me))
                .collect()
        })
        .unwrap_or_default()
}

fn owned_neighbours_of(world: &GameWorld, me: PlayerId, t: TerritoryId) -> Vec<TerritoryId> {
    world
        .territory(t)
        .map(|terr| {
            terr.adjacent
                .iter()
                .copied()
                .filter(|&n| world.owner_of(n) == Some(me))
                .collect()
        })
        .unwrap_or_default()
}

/// Enemy territories bordering any owned territory, without duplicates.
fn enemy_neighbours(world: &GameWorld, me: PlayerId) -> Vec<TerritoryId> {
    let mut out: Vec<TerritoryId> = Vec::new();
    for t in owned_territories(world, me) {
        for n in enemy_neighbours_of(world, me, t) {
            if !out.contains(&n) {
                out.push(n);
            }
        }
    }
    out
}

/// Owned neighbour of `from` that borders an enemy, if any.
fn frontier_step(world: &GameWorld, me: PlayerId, from: TerritoryId) -> Option<TerritoryId> {
    owned_neighbours_of(world, me, from)
        .into_iter()
        .find(|&n| !enemy_neighbours_of(world, me, n).is_empty())
}

// ── Human input ────────────────────────────────────────────────────────

/// A human player's pick for one issue-orders call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HumanChoice {
    Order(Order),
    PlayCard { card: CardKind, order: Option<Order> },
}

/// External provider of human decisions. The call blocks until answered.
pub trait HumanInput: Send {
    fn next_order(&mut self, world: &GameWorld, player: PlayerId) -> Option<HumanChoice>;
}

/// Always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHumanInput;

impl HumanInput for NoHumanInput {
    fn next_order(&mut self, _world: &GameWorld, _player: PlayerId) -> Option<HumanChoice> {
        None
    }
}

/// Replays a fixed list of choices, one per call, then passes.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    choices: VecDeque<HumanChoice>,
}

impl ScriptedInput {
    pub fn new(choices: impl IntoIterator<Item = HumanChoice>) -> Self {
        ScriptedInput { choices: choices.into_iter().collect() }
    }
}

impl HumanInput for ScriptedInput {
    fn next_order(&mut self, _world: &GameWorld, _player: PlayerId) -> Option<HumanChoice> {
        self.choices.pop_front()
    }
}

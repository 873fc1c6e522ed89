// ═══════════════════════════════════════════════════════════════════════
// Cards — deck, hands, and which order each card may produce
// ═══════════════════════════════════════════════════════════════════════

use crate::orders::{Order, OrderKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardKind {
    Bomb,
    Reinforcement,
    Blockade,
    Airlift,
    Diplomacy,
}

impl CardKind {
    pub const ALL: [CardKind; 5] = [
        CardKind::Bomb,
        CardKind::Reinforcement,
        CardKind::Blockade,
        CardKind::Airlift,
        CardKind::Diplomacy,
    ];

    /// Whether playing this card may hand `order` to the player.
    /// Reinforcement produces no order at all.
    pub fn accepts(self, order: &Order) -> bool {
        matches!(
            (self, order.kind()),
            (CardKind::Bomb, OrderKind::Bomb { .. })
                | (CardKind::Blockade, OrderKind::Blockade { .. })
                | (CardKind::Airlift, OrderKind::Airlift { .. })
                | (CardKind::Diplomacy, OrderKind::Negotiate { .. })
        )
    }
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardKind::Bomb => write!(f, "Bomb"),
            CardKind::Reinforcement => write!(f, "Reinforcement"),
            CardKind::Blockade => write!(f, "Blockade"),
            CardKind::Airlift => write!(f, "Airlift"),
            CardKind::Diplomacy => write!(f, "Diplomacy"),
        }
    }
}

// ── Hand ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<CardKind>,
}

impl Hand {
    pub fn cards(&self) -> &[CardKind] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: CardKind) -> bool {
        self.cards.contains(&card)
    }

    pub fn add(&mut self, card: CardKind) {
        self.cards.push(card);
    }

    /// Remove one copy of `card`; false if the hand has none.
    pub fn remove(&mut self, card: CardKind) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn drain(&mut self) -> Vec<CardKind> {
        std::mem::take(&mut self.cards)
    }
}

// ── Deck ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<CardKind>,
}

impl Deck {
    pub fn new(cards_per_kind: usize) -> Self {
        let cards = CardKind::ALL
            .iter()
            .flat_map(|&k| std::iter::repeat(k).take(cards_per_kind))
            .collect();
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Move a uniformly chosen card into `hand`.
    pub fn draw(&mut self, hand: &mut Hand, rng: &mut impl Rng) -> Option<CardKind> {
        if self.cards.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.cards.len());
        let card = self.cards.swap_remove(idx);
        hand.add(card);
        Some(card)
    }

    pub fn put_back(&mut self, card: CardKind) {
        self.cards.push(card);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Reinforcement — per-turn army grants
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;

/// Minimum armies a player with any territory receives per turn.
pub const MIN_REINFORCEMENT: u32 = 3;

/// `max(3, floor(owned / 3))`.
pub fn base_reinforcement(owned: usize) -> u32 {
    let by_count = u32::try_from(owned / 3).unwrap_or(u32::MAX);
    by_count.max(MIN_REINFORCEMENT)
}

/// Sum of bonuses of every continent `player` owns in full.
pub fn continent_bonus(map: &GameMap, player: PlayerId) -> u32 {
    map.continents
        .iter()
        .filter(|c| owns_continent(map, c, player))
        .map(|c| c.bonus)
        .sum()
}

pub fn owns_continent(map: &GameMap, continent: &Continent, player: PlayerId) -> bool {
    !continent.territories.is_empty()
        && continent
            .territories
            .iter()
            .all(|&t| map.territory(t).is_some_and(|t| t.owner == Some(player)))
}

/// Armies granted this turn; zero for a player with no territories.
pub fn reinforcement_for(map: &GameMap, player: &Player) -> u32 {
    if player.owned.is_empty() {
        return 0;
    }
    base_reinforcement(player.owned.len()) + continent_bonus(map, player.id)
}

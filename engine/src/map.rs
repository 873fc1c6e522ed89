// ═══════════════════════════════════════════════════════════════════════
// Map loading and structural validation
//
// Maps use the Domination text format:
//
//   [continents]
//   <name> <bonus> [color]
//   [countries]
//   <id> <name> <continent#> [x y]
//   [borders]
//   <id> <neighbour ids...>
//
// Ids in the file are 1-based; in memory they index the arena from 0.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::MapError;
use crate::types::*;
use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::Path;

/// Source of maps. The engine only needs `load`.
pub trait MapLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<GameMap, MapError>;
}

/// Reads Domination `.map` files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DominationLoader;

impl MapLoader for DominationLoader {
    fn load(&self, path: &Path) -> Result<GameMap, MapError> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        parse_map(&name, &text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Continents,
    Countries,
    Borders,
    Ignored,
}

/// Parse map text. Adjacency is made symmetric.
pub fn parse_map(name: &str, text: &str) -> Result<GameMap, MapError> {
    let mut builder = MapBuilder::new(name);
    let mut section = Section::None;
    let mut seen_continents = false;
    let mut seen_countries = false;
    let mut borders: Vec<(usize, Vec<usize>)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            section = match line.to_ascii_lowercase().as_str() {
                "[continents]" => {
                    seen_continents = true;
                    Section::Continents
                }
                "[countries]" | "[territories]" => {
                    seen_countries = true;
                    Section::Countries
                }
                "[borders]" => Section::Borders,
                _ => Section::Ignored,
            };
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match section {
            Section::Continents => {
                if fields.len() < 2 {
                    return Err(parse_err(line_no, "continent needs a name and a bonus"));
                }
                let bonus = fields[1]
                    .parse::<u32>()
                    .map_err(|_| parse_err(line_no, format!("invalid continent bonus '{}'", fields[1])))?;
                builder.continent(fields[0], bonus);
            }
            Section::Countries => {
                if fields.len() < 3 {
                    return Err(parse_err(line_no, "territory needs an id, a name and a continent"));
                }
                let id = parse_index(fields[0], line_no)?;
                if id != builder.map.territories.len() + 1 {
                    return Err(parse_err(line_no, format!("territory ids must be sequential, got {}", id)));
                }
                let continent = parse_index(fields[2], line_no)?;
                if continent == 0 || continent > builder.map.continents.len() {
                    return Err(MapError::UnknownContinent {
                        territory: fields[1].to_string(),
                        continent,
                    });
                }
                builder.territory(fields[1], ContinentId(continent - 1));
            }
            Section::Borders => {
                let ids = fields
                    .iter()
                    .map(|f| parse_index(f, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some((&from, rest)) = ids.split_first() {
                    borders.push((from, rest.to_vec()));
                }
            }
            Section::None => {
                return Err(parse_err(line_no, "content before any section header"));
            }
            Section::Ignored => {}
        }
    }

    if !seen_continents {
        return Err(MapError::MissingSection("continents"));
    }
    if !seen_countries {
        return Err(MapError::MissingSection("countries"));
    }
    if builder.map.territories.is_empty() {
        return Err(MapError::Empty);
    }

    let count = builder.map.territories.len();
    for (from, neighbours) in borders {
        if from == 0 || from > count {
            return Err(MapError::UnknownTerritory(from));
        }
        for to in neighbours {
            if to == 0 || to > count {
                return Err(MapError::UnknownTerritory(to));
            }
            builder.border(TerritoryId(from - 1), TerritoryId(to - 1));
        }
    }

    Ok(builder.build())
}

fn parse_index(field: &str, line: usize) -> Result<usize, MapError> {
    field
        .parse::<usize>()
        .map_err(|_| parse_err(line, format!("expected a number, got '{}'", field)))
}

fn parse_err(line: usize, message: impl Into<String>) -> MapError {
    MapError::Parse { line, message: message.into() }
}

// ── Builder ────────────────────────────────────────────────────────────

/// Builds maps in code. Borders are symmetric.
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    map: GameMap,
}

impl MapBuilder {
    pub fn new(name: &str) -> Self {
        MapBuilder {
            map: GameMap { name: name.to_string(), ..GameMap::default() },
        }
    }

    pub fn continent(&mut self, name: &str, bonus: u32) -> ContinentId {
        let id = ContinentId(self.map.continents.len());
        self.map.continents.push(Continent {
            id,
            name: name.to_string(),
            bonus,
            territories: BTreeSet::new(),
        });
        id
    }

    pub fn territory(&mut self, name: &str, continent: ContinentId) -> TerritoryId {
        let id = TerritoryId(self.map.territories.len());
        self.map.territories.push(Territory {
            id,
            name: name.to_string(),
            continent,
            adjacent: BTreeSet::new(),
            owner: None,
            armies: 0,
        });
        if let Some(c) = self.map.continents.get_mut(continent.0) {
            c.territories.insert(id);
        }
        id
    }

    pub fn border(&mut self, a: TerritoryId, b: TerritoryId) -> &mut Self {
        if let Some(t) = self.map.territories.get_mut(a.0) {
            t.adjacent.insert(b);
        }
        if let Some(t) = self.map.territories.get_mut(b.0) {
            t.adjacent.insert(a);
        }
        self
    }

    pub fn build(self) -> GameMap {
        self.map
    }
}

// ── Validation ─────────────────────────────────────────────────────────

impl GameMap {
    /// Structural check: connected graph, connected continents, exactly one
    /// continent per territory, symmetric adjacency without self-loops.
    pub fn validate(&self) -> bool {
        if self.territories.is_empty() || self.continents.is_empty() {
            return false;
        }
        if !self.membership_is_consistent() || !self.adjacency_is_symmetric() {
            return false;
        }
        let all: BTreeSet<TerritoryId> = self.territory_ids().collect();
        if !self.is_connected_within(&all) {
            return false;
        }
        self.continents
            .iter()
            .all(|c| !c.territories.is_empty() && self.is_connected_within(&c.territories))
    }

    fn membership_is_consistent(&self) -> bool {
        self.territories.iter().enumerate().all(|(i, t)| {
            let in_own = self
                .continent(t.continent)
                .is_some_and(|c| c.territories.contains(&t.id));
            let memberships = self
                .continents
                .iter()
                .filter(|c| c.territories.contains(&t.id))
                .count();
            t.id.0 == i && in_own && memberships == 1
        })
    }

    fn adjacency_is_symmetric(&self) -> bool {
        self.territories.iter().all(|t| {
            t.adjacent.iter().all(|&n| {
                n != t.id && self.territory(n).is_some_and(|other| other.is_adjacent(t.id))
            })
        })
    }

    /// BFS restricted to `nodes`: true if `nodes` induces a connected subgraph.
    fn is_connected_within(&self, nodes: &BTreeSet<TerritoryId>) -> bool {
        let Some(&start) = nodes.iter().next() else {
            return false;
        };
        let mut visited: BTreeSet<TerritoryId> = BTreeSet::new();
        let mut queue: VecDeque<TerritoryId> = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Some(t) = self.territory(current) else { continue };
            for &adj in &t.adjacent {
                if nodes.contains(&adj) && visited.insert(adj) {
                    queue.push_back(adj);
                }
            }
        }

        visited.len() == nodes.len()
    }
}

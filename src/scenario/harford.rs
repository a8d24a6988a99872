//! The Harford County, Maryland battlefield.

use std::collections::BTreeMap;

use crate::error::BoardError;
use crate::game::{Board, Coord, FactionId, GameState, TerrainKind, Tile, Unit};
use crate::scenario::{DEFAULT_UNIT_ATTACK, DEFAULT_UNIT_HP};

/// Faction headquartered at Bel Air.
pub const BLUE_CRABS: &str = "BlueCrabs";

/// Faction headquartered at Havre de Grace.
pub const BAY_BIRDS: &str = "BayBirds";

/// Terrain rows, north to south. `.` farmland, `#` town, `^` woods, `~` water.
const TERRAIN: [&str; 10] = [
    "..^..^..~~",
    ".^..^...#~",
    "..^^....~~",
    "...#..^..~",
    "^...#...~~",
    "^.#..^...~",
    "...^..#.~~",
    ".^...^.#~~",
    "..#.#.~.~~",
    ".^...~~~~~",
];

const LANDMARKS: [(u16, u16, &str); 14] = [
    (2, 0, "Pylesville"),
    (5, 0, "Susquehanna State Park"),
    (1, 1, "Jarrettsville"),
    (8, 1, "Havre de Grace"),
    (5, 2, "Darlington"),
    (3, 3, "Forest Hill"),
    (4, 4, "Churchville"),
    (2, 5, "Bel Air"),
    (0, 6, "Fallston"),
    (6, 6, "Aberdeen"),
    (7, 7, "Perryman"),
    (2, 8, "Joppatowne"),
    (4, 8, "Edgewood"),
    (6, 8, "Bush River"),
];

const BLUE_CRABS_HQ: Coord = Coord::new(2, 5);
const BAY_BIRDS_HQ: Coord = Coord::new(8, 1);

const BLUE_CRABS_UNITS: [(&str, u16, u16); 3] =
    [("BC-1", 1, 5), ("BC-2", 2, 4), ("BC-3", 2, 6)];
const BAY_BIRDS_UNITS: [(&str, u16, u16); 3] =
    [("BB-1", 7, 0), ("BB-2", 7, 1), ("BB-3", 7, 2)];

fn terrain_at(coord: Coord) -> TerrainKind {
    let glyph = TERRAIN
        .get(usize::from(coord.y))
        .and_then(|row| row.as_bytes().get(usize::from(coord.x)))
        .copied()
        .unwrap_or(b'.');
    match glyph {
        b'#' => TerrainKind::Urban,
        b'^' => TerrainKind::Forest,
        b'~' => TerrainKind::Water,
        _ => TerrainKind::Rural,
    }
}

fn tile_at(coord: Coord) -> Tile {
    let terrain = terrain_at(coord);
    let name = LANDMARKS
        .iter()
        .find(|&&(x, y, _)| Coord::new(x, y) == coord)
        .map_or_else(|| generic_name(terrain).to_string(), |&(_, _, n)| n.to_string());
    Tile::new(coord, name, terrain)
}

/// Name for tiles without a landmark.
pub(crate) const fn generic_name(terrain: TerrainKind) -> &'static str {
    match terrain {
        TerrainKind::Rural => "Farmland",
        TerrainKind::Urban => "Township",
        TerrainKind::Forest => "Woods",
        TerrainKind::Water => "Chesapeake Bay",
    }
}

/// The 10x10 Harford County scenario: BlueCrabs at Bel Air against
/// BayBirds at Havre de Grace, three units apiece.
pub fn harford_county() -> Result<GameState, BoardError> {
    let board = Board::generate(10, 10, tile_at)?;
    let blue = FactionId::new(BLUE_CRABS);
    let birds = FactionId::new(BAY_BIRDS);

    let headquarters = BTreeMap::from([
        (blue.clone(), BLUE_CRABS_HQ),
        (birds.clone(), BAY_BIRDS_HQ),
    ]);

    let units = BLUE_CRABS_UNITS
        .iter()
        .map(|&(id, x, y)| (id, &blue, x, y))
        .chain(BAY_BIRDS_UNITS.iter().map(|&(id, x, y)| (id, &birds, x, y)))
        .map(|(id, faction, x, y)| {
            Unit::new(
                id,
                faction.clone(),
                Coord::new(x, y),
                DEFAULT_UNIT_HP,
                DEFAULT_UNIT_ATTACK,
            )
        })
        .collect();

    GameState::new(board, vec![blue, birds], headquarters, units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harford_builds() {
        let state = harford_county().unwrap();
        assert_eq!(state.board().width(), 10);
        assert_eq!(state.board().height(), 10);
        assert_eq!(state.factions()[0].as_str(), BLUE_CRABS);
        assert_eq!(state.living_units().count(), 6);
        for unit in state.units() {
            assert_eq!(unit.hp, 10);
            assert_eq!(unit.attack, 5);
        }
    }

    #[test]
    fn test_headquarters_are_landmarks() {
        let state = harford_county().unwrap();
        let bel_air = state.headquarters(&BLUE_CRABS.into()).unwrap();
        let havre = state.headquarters(&BAY_BIRDS.into()).unwrap();
        assert_eq!(state.tile(bel_air).unwrap().name, "Bel Air");
        assert_eq!(state.tile(havre).unwrap().name, "Havre de Grace");
        assert!(bel_air.x < 5, "Bel Air sits left of centre");
        assert!(havre.x >= 5 && havre.y < 5, "Havre de Grace sits upper right");
    }

    #[test]
    fn test_every_town_is_named() {
        let state = harford_county().unwrap();
        for tile in state.board().tiles() {
            if tile.terrain == TerrainKind::Urban {
                assert_ne!(tile.name, "Township", "unnamed town at {}", tile.coord);
            }
        }
        assert!(!state.tile(Coord::new(6, 8)).unwrap().traversable);
    }

    #[test]
    fn test_east_edge_is_water() {
        let state = harford_county().unwrap();
        for y in 0..10 {
            assert_eq!(state.tile(Coord::new(9, y)).unwrap().terrain, TerrainKind::Water);
        }
    }
}

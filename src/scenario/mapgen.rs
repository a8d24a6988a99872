//! Deterministic battlefield generation.

// Map generation uses intentional casts for coordinate/RNG operations
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::BoardError;
use crate::game::{Board, Coord, FactionId, GameState, TerrainKind, Tile, Unit};
use crate::rng::Rng;
use crate::scenario::harford::generic_name;
use crate::scenario::{BAY_BIRDS, BLUE_CRABS, DEFAULT_UNIT_ATTACK, DEFAULT_UNIT_HP};

/// Smallest board edge that leaves room for two headquarters and their units.
pub const MIN_EDGE: u16 = 4;

/// Shape of a generated battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapGenConfig {
    /// Board width in tiles.
    pub width: u16,
    /// Board height in tiles.
    pub height: u16,
    /// Units fielded by each faction.
    pub units_per_faction: usize,
    /// Starting hit points per unit.
    pub unit_hp: i32,
    /// Attack power per unit.
    pub unit_attack: i32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            units_per_faction: 3,
            unit_hp: DEFAULT_UNIT_HP,
            unit_attack: DEFAULT_UNIT_ATTACK,
        }
    }
}

/// Error type for map generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapGenError {
    /// The board is too small to play on.
    #[error("map must be at least {min}x{min}, got {width}x{height}", min = MIN_EDGE)]
    TooSmall {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },
    /// Each faction needs at least one unit with positive stats.
    #[error("invalid unit settings: {0}")]
    InvalidUnits(String),
    /// Not enough open ground near a headquarters.
    #[error("not enough room to deploy {needed} units for '{faction}'")]
    NotEnoughRoom {
        /// Faction being deployed.
        faction: FactionId,
        /// Units requested.
        needed: usize,
    },
    /// The generated state failed validation.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Generate a seeded two-faction battlefield.
///
/// Water covers roughly 8% of tiles, woods 15% and towns 5%. Headquarters
/// sit on opposite sides of the centre at a random angle, always on land,
/// and each faction deploys on the open tiles nearest its headquarters.
pub fn generate_map(seed: u64, config: &MapGenConfig) -> Result<GameState, MapGenError> {
    let MapGenConfig { width, height, .. } = *config;
    if width < MIN_EDGE || height < MIN_EDGE {
        return Err(MapGenError::TooSmall { width, height });
    }
    if config.units_per_faction == 0 {
        return Err(MapGenError::InvalidUnits("each faction needs at least one unit".into()));
    }
    if config.unit_hp <= 0 || config.unit_attack < 0 {
        return Err(MapGenError::InvalidUnits(format!(
            "hp must be positive and attack non-negative (hp {}, attack {})",
            config.unit_hp, config.unit_attack
        )));
    }

    let mut rng = Rng::new(seed);
    let mut terrain = generate_terrain(width, height, &mut rng);
    let hqs = place_headquarters(width, height, &mut rng);

    // Headquarters are towns, and the ground around them is never water.
    for hq in hqs {
        for y in hq.y.saturating_sub(1)..=hq.y.saturating_add(1).min(height - 1) {
            for x in hq.x.saturating_sub(1)..=hq.x.saturating_add(1).min(width - 1) {
                let idx = usize::from(y) * usize::from(width) + usize::from(x);
                if terrain[idx] == TerrainKind::Water {
                    terrain[idx] = TerrainKind::Rural;
                }
            }
        }
        let idx = usize::from(hq.y) * usize::from(width) + usize::from(hq.x);
        terrain[idx] = TerrainKind::Urban;
    }

    let board = Board::generate(width, height, |coord| {
        let kind = terrain[usize::from(coord.y) * usize::from(width) + usize::from(coord.x)];
        let name = if hqs[0] == coord {
            "Blue Harbor".to_string()
        } else if hqs[1] == coord {
            "Bird's Nest".to_string()
        } else {
            generic_name(kind).to_string()
        };
        Tile::new(coord, name, kind)
    })?;

    let factions = [FactionId::new(BLUE_CRABS), FactionId::new(BAY_BIRDS)];
    let prefixes = ["BC", "BB"];
    let mut taken: Vec<Coord> = Vec::new();
    let mut units = Vec::with_capacity(config.units_per_faction * 2);
    for ((faction, hq), prefix) in factions.iter().zip(hqs).zip(prefixes) {
        let spots = deployment_spots(&board, hq, config.units_per_faction, &taken);
        if spots.len() < config.units_per_faction {
            return Err(MapGenError::NotEnoughRoom {
                faction: faction.clone(),
                needed: config.units_per_faction,
            });
        }
        for (i, spot) in spots.into_iter().enumerate() {
            taken.push(spot);
            units.push(Unit::new(
                format!("{prefix}-{}", i + 1),
                faction.clone(),
                spot,
                config.unit_hp,
                config.unit_attack,
            ));
        }
    }

    let headquarters = BTreeMap::from([
        (factions[0].clone(), hqs[0]),
        (factions[1].clone(), hqs[1]),
    ]);
    Ok(GameState::new(board, factions.to_vec(), headquarters, units)?)
}

/// Roll terrain for every tile in row-major order.
fn generate_terrain(width: u16, height: u16, rng: &mut Rng) -> Vec<TerrainKind> {
    let total = usize::from(width) * usize::from(height);
    (0..total)
        .map(|_| {
            let noise = rng.next_f64();
            if noise < 0.08 {
                TerrainKind::Water
            } else if noise < 0.23 {
                TerrainKind::Forest
            } else if noise < 0.28 {
                TerrainKind::Urban
            } else {
                TerrainKind::Rural
            }
        })
        .collect()
}

/// Two headquarters on opposite sides of the centre.
fn place_headquarters(width: u16, height: u16, rng: &mut Rng) -> [Coord; 2] {
    let center_x = f64::from(width - 1) / 2.0;
    let center_y = f64::from(height - 1) / 2.0;
    let radius = f64::from(width.min(height)) * 0.35;
    let angle = rng.next_f64() * std::f64::consts::TAU;

    let at = |angle: f64| {
        let x = (center_x + radius * angle.cos()).round().clamp(0.0, f64::from(width - 1));
        let y = (center_y + radius * angle.sin()).round().clamp(0.0, f64::from(height - 1));
        Coord::new(x as u16, y as u16)
    };
    let first = at(angle);
    let mut second = at(angle + std::f64::consts::PI);
    if second == first {
        second = Coord::new(width - 1 - first.x, height - 1 - first.y);
    }
    [first, second]
}

/// The `count` open tiles nearest `hq`, headquarters tile first.
fn deployment_spots(board: &Board, hq: Coord, count: usize, taken: &[Coord]) -> Vec<Coord> {
    let mut candidates: Vec<Coord> = board
        .tiles()
        .iter()
        .filter(|t| t.traversable && !taken.contains(&t.coord))
        .map(|t| t.coord)
        .collect();
    candidates.sort_by_key(|&c| (hq.manhattan(c), c.y, c.x));
    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_generation_determinism() {
        let config = MapGenConfig::default();
        let a = generate_map(42, &config).unwrap();
        let b = generate_map(42, &config).unwrap();
        assert_eq!(a.board().tiles(), b.board().tiles());
        assert_eq!(a.units().collect::<Vec<_>>(), b.units().collect::<Vec<_>>());
    }

    #[test]
    fn test_map_generation_different_seeds() {
        let config = MapGenConfig {
            width: 16,
            height: 16,
            ..MapGenConfig::default()
        };
        let a = generate_map(42, &config).unwrap();
        let b = generate_map(43, &config).unwrap();
        let differences = a
            .board()
            .tiles()
            .iter()
            .zip(b.board().tiles())
            .filter(|(x, y)| x.terrain != y.terrain)
            .count();
        assert!(differences > 0);
    }

    #[test]
    fn test_unit_counts_and_stats() {
        let config = MapGenConfig {
            units_per_faction: 5,
            unit_hp: 7,
            unit_attack: 2,
            ..MapGenConfig::default()
        };
        let state = generate_map(9, &config).unwrap();
        for faction in state.factions() {
            assert_eq!(state.living_units_of(faction).count(), 5);
        }
        assert!(state.units().all(|u| u.hp == 7 && u.attack == 2));
    }

    #[test]
    fn test_headquarters_on_land_and_apart() {
        for seed in 0..50 {
            let state = generate_map(seed, &MapGenConfig::default()).unwrap();
            let [a, b] = state.factions();
            let hq_a = state.headquarters(a).unwrap();
            let hq_b = state.headquarters(b).unwrap();
            assert_ne!(hq_a, hq_b);
            assert!(state.board().is_traversable(hq_a));
            assert!(state.board().is_traversable(hq_b));
        }
    }

    #[test]
    fn test_too_small() {
        let config = MapGenConfig {
            width: 3,
            ..MapGenConfig::default()
        };
        assert!(matches!(
            generate_map(1, &config),
            Err(MapGenError::TooSmall { width: 3, height: 10 })
        ));
    }

    #[test]
    fn test_invalid_units() {
        let config = MapGenConfig {
            units_per_faction: 0,
            ..MapGenConfig::default()
        };
        assert!(matches!(generate_map(1, &config), Err(MapGenError::InvalidUnits(_))));
    }

    #[test]
    fn test_not_enough_room() {
        let config = MapGenConfig {
            width: 4,
            height: 4,
            units_per_faction: 12,
            ..MapGenConfig::default()
        };
        assert!(matches!(
            generate_map(5, &config),
            Err(MapGenError::NotEnoughRoom { .. })
        ));
    }
}

//! Coordinates, compass directions, terrain and the board grid.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// A coordinate on the board.
///
/// `x` grows to the right and `y` grows downward, both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Offset this coordinate by a signed delta.
    ///
    /// Returns `None` if the result would have a negative component. Upper
    /// bounds are the board's concern, not the coordinate's.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = i32::from(self.x).checked_add(dx)?;
        let y = i32::from(self.y).checked_add(dy)?;
        Some(Self::new(u16::try_from(x).ok()?, u16::try_from(y).ok()?))
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`.
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> u16 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Manhattan distance: `|dx| + |dy|`.
    #[must_use]
    pub fn manhattan(self, other: Self) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }

    /// Whether `other` is one of the four orthogonal neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Eight compass directions plus `Stay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// North (up).
    #[serde(rename = "N")]
    North,
    /// North-east.
    #[serde(rename = "NE")]
    NorthEast,
    /// East (right).
    #[serde(rename = "E")]
    East,
    /// South-east.
    #[serde(rename = "SE")]
    SouthEast,
    /// South (down).
    #[serde(rename = "S")]
    South,
    /// South-west.
    #[serde(rename = "SW")]
    SouthWest,
    /// West (left).
    #[serde(rename = "W")]
    West,
    /// North-west.
    #[serde(rename = "NW")]
    NorthWest,
    /// No movement.
    #[serde(rename = "STAY")]
    Stay,
}

impl Direction {
    /// All directions that actually move, in clockwise order from north.
    pub const MOVING: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Grid delta `(dx, dy)` for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::Stay => (0, 0),
        }
    }

    /// Wire name of this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
            Direction::Stay => "STAY",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Case-insensitive parse of the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" | "NORTH" => Ok(Direction::North),
            "NE" | "NORTHEAST" => Ok(Direction::NorthEast),
            "E" | "EAST" => Ok(Direction::East),
            "SE" | "SOUTHEAST" => Ok(Direction::SouthEast),
            "S" | "SOUTH" => Ok(Direction::South),
            "SW" | "SOUTHWEST" => Ok(Direction::SouthWest),
            "W" | "WEST" => Ok(Direction::West),
            "NW" | "NORTHWEST" => Ok(Direction::NorthWest),
            "STAY" | "NONE" => Ok(Direction::Stay),
            other => Err(format!("unrecognised direction '{other}'")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of terrain on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    /// Open farmland.
    Rural,
    /// Towns and cities.
    Urban,
    /// Woodland.
    Forest,
    /// Rivers and bays - impassable.
    Water,
}

impl TerrainKind {
    /// Default traversability for this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, TerrainKind::Water)
    }

    /// Single-character glyph used by the renderers.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            TerrainKind::Rural => '.',
            TerrainKind::Urban => '#',
            TerrainKind::Forest => '^',
            TerrainKind::Water => '~',
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerrainKind::Rural => "rural",
            TerrainKind::Urban => "urban",
            TerrainKind::Forest => "forest",
            TerrainKind::Water => "water",
        };
        f.write_str(name)
    }
}

/// A single map tile. Never mutated once the board is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Location of the tile.
    #[serde(flatten)]
    pub coord: Coord,
    /// Display name (landmark or generated).
    pub name: String,
    /// Terrain kind.
    pub terrain: TerrainKind,
    /// Whether units may enter. Stored explicitly so maps can override terrain.
    pub traversable: bool,
}

impl Tile {
    /// Create a tile whose traversability follows its terrain.
    #[must_use]
    pub fn new(coord: Coord, name: impl Into<String>, terrain: TerrainKind) -> Self {
        Self {
            coord,
            name: name.into(),
            terrain,
            traversable: terrain.is_passable(),
        }
    }

    /// Override the traversability flag.
    #[must_use]
    pub fn with_traversable(mut self, traversable: bool) -> Self {
        self.traversable = traversable;
        self
    }
}

/// The immutable-shape terrain grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    /// Width of the board in tiles.
    width: u16,
    /// Height of the board in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl Board {
    /// Build a board from an unordered tile collection.
    ///
    /// The coordinates must be unique and cover the rectangle
    /// `[0, width) x [0, height)` exactly, where the extent is taken from the
    /// largest coordinates present.
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self, BoardError> {
        if tiles.is_empty() {
            return Err(BoardError::EmptyBoard);
        }

        let mut seen = HashSet::with_capacity(tiles.len());
        for tile in &tiles {
            if !seen.insert(tile.coord) {
                return Err(BoardError::DuplicateTile(tile.coord));
            }
        }

        let max_x = tiles.iter().map(|t| t.coord.x).max().unwrap_or(0);
        let max_y = tiles.iter().map(|t| t.coord.y).max().unwrap_or(0);
        let width = max_x.checked_add(1).ok_or(BoardError::TooLarge)?;
        let height = max_y.checked_add(1).ok_or(BoardError::TooLarge)?;

        let expected = usize::from(width) * usize::from(height);
        if tiles.len() != expected {
            return Err(BoardError::NotRectangular {
                width,
                height,
                tiles: tiles.len(),
            });
        }

        let mut ordered = tiles;
        ordered.sort_by_key(|t| (t.coord.y, t.coord.x));

        Ok(Self {
            width,
            height,
            tiles: ordered,
        })
    }

    /// Build a board from a terrain callback evaluated at every coordinate.
    pub fn generate(
        width: u16,
        height: u16,
        mut tile_at: impl FnMut(Coord) -> Tile,
    ) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard);
        }
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Coord::new(x, y)))
            .map(&mut tile_at)
            .collect();
        Self::from_tiles(tiles)
    }

    /// Width of the board.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the board.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// All tiles in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if a coordinate is within the board bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn coord_to_index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Tile at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.coord_to_index(coord).map(|idx| &self.tiles[idx])
    }

    /// Whether a unit may stand on `coord`. Out-of-bounds is not traversable.
    #[must_use]
    pub fn is_traversable(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(|t| t.traversable)
    }

    /// Destination of a one-step move, if it stays on the board.
    #[must_use]
    pub fn step(&self, from: Coord, direction: Direction) -> Option<Coord> {
        let (dx, dy) = direction.delta();
        from.offset(dx, dy).filter(|c| self.in_bounds(*c))
    }
}

impl TryFrom<Vec<Tile>> for Board {
    type Error = BoardError;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        Self::from_tiles(tiles)
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u16, height: u16) -> Vec<Tile> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| Coord::new(x, y)))
            .map(|c| Tile::new(c, format!("t{}_{}", c.x, c.y), TerrainKind::Rural))
            .collect()
    }

    #[test]
    fn test_coord_offset() {
        let c = Coord::new(0, 3);
        assert_eq!(c.offset(1, -1), Some(Coord::new(1, 2)));
        assert_eq!(c.offset(-1, 0), None);
    }

    #[test]
    fn test_distances() {
        let a = Coord::new(2, 2);
        assert_eq!(a.chebyshev(Coord::new(4, 3)), 2);
        assert_eq!(a.manhattan(Coord::new(4, 3)), 3);
        assert!(a.is_adjacent(Coord::new(2, 3)));
        assert!(!a.is_adjacent(Coord::new(3, 3)));
        assert!(!a.is_adjacent(a));
    }

    #[test]
    fn test_direction_parse_case_insensitive() {
        assert_eq!("ne".parse::<Direction>(), Ok(Direction::NorthEast));
        assert_eq!("Stay".parse::<Direction>(), Ok(Direction::Stay));
        assert_eq!("north".parse::<Direction>(), Ok(Direction::North));
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_deltas_are_unit_steps() {
        for dir in Direction::MOVING {
            let (dx, dy) = dir.delta();
            assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
        }
        assert_eq!(Direction::Stay.delta(), (0, 0));
    }

    #[test]
    fn test_board_from_unordered_tiles() {
        let mut tiles = grid(3, 2);
        tiles.reverse();
        let board = Board::from_tiles(tiles).unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
        assert_eq!(board.get(Coord::new(2, 1)).unwrap().coord, Coord::new(2, 1));
        assert!(board.get(Coord::new(3, 0)).is_none());
    }

    #[test]
    fn test_board_rejects_duplicates() {
        let mut tiles = grid(2, 2);
        tiles.push(Tile::new(Coord::new(1, 1), "dup", TerrainKind::Urban));
        assert!(matches!(
            Board::from_tiles(tiles),
            Err(BoardError::DuplicateTile(c)) if c == Coord::new(1, 1)
        ));
    }

    #[test]
    fn test_board_rejects_holes() {
        let mut tiles = grid(3, 3);
        tiles.retain(|t| t.coord != Coord::new(1, 1));
        assert!(matches!(
            Board::from_tiles(tiles),
            Err(BoardError::NotRectangular { .. })
        ));
        assert!(matches!(Board::from_tiles(Vec::new()), Err(BoardError::EmptyBoard)));
    }

    #[test]
    fn test_water_is_impassable_unless_overridden() {
        let tile = Tile::new(Coord::new(0, 0), "bay", TerrainKind::Water);
        assert!(!tile.traversable);
        assert!(tile.with_traversable(true).traversable);
    }

    #[test]
    fn test_step_stays_on_board() {
        let board = Board::from_tiles(grid(3, 3)).unwrap();
        assert_eq!(board.step(Coord::new(0, 0), Direction::North), None);
        assert_eq!(board.step(Coord::new(2, 2), Direction::SouthEast), None);
        assert_eq!(
            board.step(Coord::new(1, 1), Direction::SouthEast),
            Some(Coord::new(2, 2))
        );
    }
}

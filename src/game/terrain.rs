//! Map and tile types.
//!
//! Maps are fixed 5×7 grids authored as terrain strings plus height strings.
//! Nothing here mutates after construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board rows
pub const ROWS: usize = 5;
/// Board columns
pub const COLS: usize = 7;

/// A tile position (row, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether this position lies on the board
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.row < ROWS && self.col < COLS
    }

    /// Manhattan distance
    #[must_use]
    pub fn distance(&self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// On-board orthogonal neighbours (up, down, left, right).
    pub fn neighbors(&self) -> impl Iterator<Item = Pos> {
        let Pos { row, col } = *self;
        let up = row.checked_sub(1).map(|r| Pos::new(r, col));
        let down = Some(Pos::new(row + 1, col));
        let left = col.checked_sub(1).map(|c| Pos::new(row, c));
        let right = Some(Pos::new(row, col + 1));
        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(Pos::in_bounds)
    }

    /// All board positions, row-major
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Pos::new(row, col)))
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Terrain on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Plain,
    Forest,
    Mountain,
    Water,
    Swamp,
    Hill,
    Volcano,
    Ruins,
}

impl Terrain {
    /// Damage subtracted from attacks against a unit standing here.
    #[must_use]
    pub const fn defense_bonus(self) -> i32 {
        match self {
            Terrain::Forest | Terrain::Hill | Terrain::Ruins => 1,
            Terrain::Mountain => 2,
            Terrain::Plain | Terrain::Water | Terrain::Swamp | Terrain::Volcano => 0,
        }
    }

    /// Movement points to enter for a ground unit with no terrain traits.
    /// `None` means impassable.
    #[must_use]
    pub const fn base_move_cost(self) -> Option<u32> {
        match self {
            Terrain::Mountain => None,
            Terrain::Forest | Terrain::Water => Some(2),
            _ => Some(1),
        }
    }

    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Terrain> {
        match glyph {
            '.' => Some(Terrain::Plain),
            'f' => Some(Terrain::Forest),
            'M' => Some(Terrain::Mountain),
            '~' => Some(Terrain::Water),
            's' => Some(Terrain::Swamp),
            'h' => Some(Terrain::Hill),
            'v' => Some(Terrain::Volcano),
            'r' => Some(Terrain::Ruins),
            _ => None,
        }
    }

    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Terrain::Plain => '.',
            Terrain::Forest => 'f',
            Terrain::Mountain => 'M',
            Terrain::Water => '~',
            Terrain::Swamp => 's',
            Terrain::Hill => 'h',
            Terrain::Volcano => 'v',
            Terrain::Ruins => 'r',
        }
    }
}

/// A single tile on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub height: i32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Map needs {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("Row {row} needs {expected} tiles, got {actual}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Unknown glyph '{glyph}' at row {row}")]
    UnknownGlyph { glyph: char, row: usize },
}

/// A named 5×7 battlefield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub name: String,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl GameMap {
    /// Build a map from terrain glyph rows and height digit rows.
    pub fn from_rows(name: &str, terrain: &[&str], heights: &[&str]) -> Result<Self, MapError> {
        if terrain.len() != ROWS {
            return Err(MapError::RowCount {
                expected: ROWS,
                actual: terrain.len(),
            });
        }
        if heights.len() != ROWS {
            return Err(MapError::RowCount {
                expected: ROWS,
                actual: heights.len(),
            });
        }

        let mut tiles = Vec::with_capacity(ROWS * COLS);
        for (row, (glyphs, levels)) in terrain.iter().zip(heights).enumerate() {
            let glyphs: Vec<char> = glyphs.chars().collect();
            let levels: Vec<char> = levels.chars().collect();
            if glyphs.len() != COLS || levels.len() != COLS {
                return Err(MapError::RowWidth {
                    row,
                    expected: COLS,
                    actual: glyphs.len().min(levels.len()),
                });
            }
            for (glyph, level) in glyphs.into_iter().zip(levels) {
                let terrain =
                    Terrain::from_glyph(glyph).ok_or(MapError::UnknownGlyph { glyph, row })?;
                let height = level
                    .to_digit(10)
                    .ok_or(MapError::UnknownGlyph { glyph: level, row })?;
                tiles.push(Tile {
                    terrain,
                    height: height as i32,
                });
            }
        }

        Ok(GameMap {
            name: name.to_string(),
            tiles,
        })
    }

    /// An all-plain, flat map
    #[must_use]
    pub fn flat(name: &str) -> Self {
        GameMap {
            name: name.to_string(),
            tiles: vec![
                Tile {
                    terrain: Terrain::Plain,
                    height: 0
                };
                ROWS * COLS
            ],
        }
    }

    /// Tile at a position. Positions come from [`Pos`] and are always on the board.
    #[must_use]
    pub fn tile(&self, pos: Pos) -> Tile {
        self.tiles[pos.row * COLS + pos.col]
    }

    #[must_use]
    pub fn terrain(&self, pos: Pos) -> Terrain {
        self.tile(pos).terrain
    }

    /// Replace a tile (used to author scenarios)
    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        self.tiles[pos.row * COLS + pos.col] = tile;
    }

    /// Render as glyph rows
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                out.push(self.terrain(Pos::new(row, col)).glyph());
            }
            out.push('\n');
        }
        out
    }
}

const MAPS: [(&str, [&str; ROWS], [&str; ROWS]); 3] = [
    (
        "Verdant Vale",
        [".f...f.", "..h.h..", "~..M..~", "..h.h..", ".f...f."],
        ["0000000", "0000000", "0002000", "0000000", "0000000"],
    ),
    (
        "Ashen Caldera",
        ["..v.v..", ".s...s.", "M.~v~.M", ".s...s.", "..v.v.."],
        ["0010100", "0000000", "2001002", "0000000", "0010100"],
    ),
    (
        "Sunken Ruins",
        ["~.r.r.~", ".~...~.", "r..h..r", ".~...~.", "~.r.r.~"],
        ["0000000", "0000000", "0000000", "0000000", "0000000"],
    ),
];

/// Number of built-in maps
pub const MAP_COUNT: usize = MAPS.len();

/// Built-in map by index
pub fn builtin_map(index: usize) -> Option<GameMap> {
    let (name, terrain, heights) = MAPS.get(index)?;
    GameMap::from_rows(name, terrain, heights).ok()
}

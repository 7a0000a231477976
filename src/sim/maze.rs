//! Maze parsing and the immutable maze model.
//!
//! ## Grid legend:
//!   '#' = Wall                 '.' = Dot
//!   'P' = Power pellet         'S' = Player spawn
//!   'G' = Ghost home slot      'F' = Fruit cell
//!   ' ' = Open floor, no pickup
//!
//! Markers ('S', 'G', 'F') are floor cells, never collectibles.
//! The dot and pellet sets here are *templates*: a round copies them
//! into its live state at start and eats from the copies.
//!
//! Connectivity is assumed, not verified: the parser only rejects
//! structural defects (empty grid, ragged rows, missing markers).

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::Path;

use crate::domain::entity::Pos;
use crate::domain::movement::MapView;
use crate::domain::tile::Tile;

/// The built-in maze, 22x21, straight from the original layout.
pub const DEFAULT_MAZE: [&str; 21] = [
    "######################",
    "#..........##........#",
    "#.####.###.##.###.####",
    "#P..................P#",
    "#.####.#.######.#.####",
    "#......#...##...#....#",
    "######.###.##.###.####",
    "     #.#..........#   ",
    "######.#.###  ###.####",
    "#........#GGGG#......#",
    "######.#.######.#.####",
    "     #.#........#     ",
    "######.#.######.#.####",
    "#..........##........#",
    "#.####.###.##.###.####",
    "#...##.......F.......#",
    "###.##.#.######.#.##.#",
    "#......#...##...#....#",
    "#.##########.#########",
    "#S...................#",
    "######################",
];

/// Structural defects that prevent a round from starting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MazeError {
    Empty,
    Ragged { row: usize },
    MissingSpawn,
    MissingGhostHome,
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::Empty => write!(f, "maze grid is empty"),
            MazeError::Ragged { row } => {
                write!(f, "maze row {row} differs in width from row 0")
            }
            MazeError::MissingSpawn => write!(f, "maze has no player spawn marker 'S'"),
            MazeError::MissingGhostHome => write!(f, "maze has no ghost home marker 'G'"),
        }
    }
}

impl Error for MazeError {}

/// Immutable maze model. Built once by `parse`, queried forever after.
pub struct Maze {
    tiles: Vec<Vec<Tile>>,
    pub width: i32,
    pub height: i32,
    /// Dot template, copied into each fresh round.
    pub dots: HashSet<Pos>,
    /// Power-pellet template, copied into each fresh round.
    pub pellets: HashSet<Pos>,
    pub spawn: Pos,
    /// The 'G' cells in reading order; ghost `i` spawns and respawns
    /// at slot `i`. Slot 0 doubles as the eaten ghosts' home target.
    pub ghost_slots: Vec<Pos>,
    pub fruit: Option<Pos>,
    /// Scatter corners for archetypes 0-3: top-left, top-right,
    /// bottom-left, bottom-right (one cell in from the border).
    pub corners: [Pos; 4],
}

impl Maze {
    pub fn parse(rows: &[&str]) -> Result<Maze, MazeError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(MazeError::Empty);
        }
        let width = rows[0].chars().count();

        let mut tiles = Vec::with_capacity(rows.len());
        let mut dots = HashSet::new();
        let mut pellets = HashSet::new();
        let mut spawn = None;
        let mut ghost_slots = Vec::new();
        let mut fruit = None;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(MazeError::Ragged { row: y });
            }
            let mut tile_row = Vec::with_capacity(width);
            for (x, ch) in row.chars().enumerate() {
                let p = Pos::new(x as i32, y as i32);
                tile_row.push(Tile::from_glyph(ch));
                match ch {
                    '.' => {
                        dots.insert(p);
                    }
                    'P' => {
                        pellets.insert(p);
                    }
                    'S' => {
                        if spawn.is_none() {
                            spawn = Some(p);
                        }
                    }
                    'G' => ghost_slots.push(p),
                    'F' => {
                        if fruit.is_none() {
                            fruit = Some(p);
                        }
                    }
                    _ => {}
                }
            }
            tiles.push(tile_row);
        }

        let spawn = spawn.ok_or(MazeError::MissingSpawn)?;
        if ghost_slots.is_empty() {
            return Err(MazeError::MissingGhostHome);
        }

        let w = width as i32;
        let h = rows.len() as i32;
        let corners = [
            Pos::new(1, 1),
            Pos::new(w - 2, 1),
            Pos::new(1, h - 2),
            Pos::new(w - 2, h - 2),
        ];

        Ok(Maze {
            tiles,
            width: w,
            height: h,
            dots,
            pellets,
            spawn,
            ghost_slots,
            fruit,
            corners,
        })
    }

    /// Parse a maze from a text file, one grid row per line.
    pub fn from_file(path: &Path) -> Result<Maze, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        let rows: Vec<&str> = text.lines().collect();
        Ok(Maze::parse(&rows)?)
    }

    pub fn view(&self) -> MapView<'_> {
        MapView {
            tiles: &self.tiles,
            width: self.width,
            height: self.height,
        }
    }

    /// False for out-of-bounds and wall cells.
    pub fn is_walkable(&self, p: Pos) -> bool {
        self.view().is_walkable(p)
    }

    /// The cell eaten ghosts return to.
    pub fn home(&self) -> Pos {
        self.ghost_slots[0]
    }

    /// Home slot for ghost `id` (wraps if the maze marks fewer slots
    /// than there are ghosts).
    pub fn slot(&self, id: usize) -> Pos {
        self.ghost_slots[id % self.ghost_slots.len()]
    }
}

//! Tile kinds of the maze grid.
//! Only walls block movement; every marker glyph (spawn, ghost home,
//! fruit) sits on an ordinary floor cell.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Wall,
    Floor,
}

impl Tile {
    /// Can an entity occupy this cell?
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Floor)
    }

    /// Map a maze glyph to its tile kind. Everything except `#` is floor.
    pub fn from_glyph(ch: char) -> Tile {
        if ch == '#' { Tile::Wall } else { Tile::Floor }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Floor
    }
}

//! Movement resolution — pure queries, no side effects.
//!
//! Two movers share this module:
//!   - the player, resolved with a fallback policy (queued turn if
//!     legal, else keep going, else stop);
//!   - the ghosts, which pick one neighbor per tick by distance to a
//!     goal cell (seek) or away from one (flee).
//!
//! Neighbor scan order is fixed at Up, Down, Left, Right. Ties keep
//! the first match, so traces replay identically.

use super::entity::{Dir, Pos};
use super::tile::Tile;

/// Immutable view of the tile grid for movement queries.
/// Out-of-bounds cells behave as walls.
pub struct MapView<'a> {
    pub tiles: &'a [Vec<Tile>],
    pub width: i32,
    pub height: i32,
}

impl<'a> MapView<'a> {
    pub fn tile_at(&self, p: Pos) -> Tile {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return Tile::Wall;
        }
        self.tiles[p.y as usize][p.x as usize]
    }

    pub fn is_walkable(&self, p: Pos) -> bool {
        self.tile_at(p).is_walkable()
    }
}

/// Fixed neighbor scan order. Tests depend on this staying stable.
pub const DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

/// Outcome of one player movement resolution.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Move {
    pub pos: Pos,
    pub dir: Dir,
}

/// Resolve the player's next cell.
///
/// Policy: commit the requested direction if it leads onto a walkable
/// cell; otherwise continue in the current direction if that is still
/// walkable (a queued turn never stalls the player against a wall);
/// otherwise stay in place with the direction unchanged. Reversal is
/// legal.
pub fn resolve_player(map: &MapView, pos: Pos, current: Dir, requested: Dir) -> Move {
    if !requested.is_none() && map.is_walkable(pos + requested) {
        return Move { pos: pos + requested, dir: requested };
    }
    if !current.is_none() && map.is_walkable(pos + current) {
        return Move { pos: pos + current, dir: current };
    }
    Move { pos, dir: current }
}

/// What a ghost is steering relative to this tick.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Goal {
    /// Minimize distance to the cell (scatter corner, chase target,
    /// or home while eaten).
    Seek(Pos),
    /// Maximize distance to the cell (frightened flight from the
    /// player).
    Flee(Pos),
}

/// Pick the ghost's next cell: the first legal neighbor, in `DIRS`
/// order, with the best squared distance to the goal. `None` when the
/// ghost is boxed in, in which case it stays put.
pub fn choose_ghost_step(map: &MapView, from: Pos, goal: Goal) -> Option<Pos> {
    let mut best: Option<(Pos, i64)> = None;
    for dir in DIRS {
        let next = from + dir;
        if !map.is_walkable(next) {
            continue;
        }
        let score = match goal {
            Goal::Seek(t) => next.dist2(t),
            Goal::Flee(t) => -next.dist2(t),
        };
        match best {
            Some((_, s)) if s <= score => {}
            _ => best = Some((next, score)),
        }
    }
    best.map(|(p, _)| p)
}

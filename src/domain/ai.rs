//! Ghost targeting — one archetype per ghost id.
//!
//! Every tick each ghost gets a fresh target cell:
//!   - global Scatter, or the ghost Frightened → its scatter corner
//!     (frightened movement additionally flees the player; see
//!     `movement::Goal::Flee`);
//!   - global Chase → the archetype rule below;
//!   - Eaten → home, handled by the step pipeline, not here.
//!
//! The pincer archetype reads the position of the ghost at index 0,
//! an explicit cross-reference passed in by the caller.

use super::entity::{Dir, GhostMode, Player, Pos};

/// A ghost's fixed behavior profile, determined by its id.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Archetype {
    /// Targets the player's cell.
    Direct,
    /// Targets 4 cells ahead of the player.
    Ambush,
    /// Targets the point 2 cells ahead of the player, reflected
    /// through the direct ghost's position.
    Pincer,
    /// Chases from afar, retreats to its corner when close.
    Opportunist,
}

/// The opportunist switches to its corner within this squared
/// Euclidean distance of the player (8 cells).
pub const OPPORTUNIST_RANGE2: i64 = 64;

impl Archetype {
    pub fn from_id(id: usize) -> Archetype {
        match id % 4 {
            0 => Archetype::Direct,
            1 => Archetype::Ambush,
            2 => Archetype::Pincer,
            _ => Archetype::Opportunist,
        }
    }
}

/// Chase-mode target for one ghost.
pub fn chase_target(
    arch: Archetype,
    ghost_pos: Pos,
    scatter_corner: Pos,
    player: &Player,
    direct_ghost_pos: Pos,
) -> Pos {
    match arch {
        Archetype::Direct => player.pos,
        Archetype::Ambush => player.pos.ahead(player.dir, 4),
        Archetype::Pincer => {
            let ahead = player.pos.ahead(player.dir, 2);
            Pos::new(
                ahead.x + (ahead.x - direct_ghost_pos.x),
                ahead.y + (ahead.y - direct_ghost_pos.y),
            )
        }
        Archetype::Opportunist => {
            if ghost_pos.dist2(player.pos) > OPPORTUNIST_RANGE2 {
                player.pos
            } else {
                scatter_corner
            }
        }
    }
}

/// Full targeting rule for a non-eaten ghost.
pub fn target_for(
    id: usize,
    ghost_pos: Pos,
    mode: GhostMode,
    scatter_corner: Pos,
    global_mode: GhostMode,
    player: &Player,
    direct_ghost_pos: Pos,
) -> Pos {
    if mode == GhostMode::Frightened || global_mode == GhostMode::Scatter {
        return scatter_corner;
    }
    chase_target(
        Archetype::from_id(id),
        ghost_pos,
        scatter_corner,
        player,
        direct_ghost_pos,
    )
}

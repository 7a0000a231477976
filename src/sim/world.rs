//! WorldState: the one live round plus the shell state around it.
//!
//! Ownership discipline: the game loop owns the `WorldState` and the
//! step pipeline is its only mutator. Collaborators either read a
//! `RoundSnapshot` or submit a direction intent; nothing else
//! touches the round.
//!
//! Round resets never patch fields from outside: `start_round`
//! rebuilds the collectible sets from the maze templates and respawns
//! every entity, and bumps nothing it does not own.

use std::collections::HashSet;

use crate::config::TimingConfig;
use crate::domain::entity::{Dir, Ghost, GhostMode, Player, Pos};
use super::maze::Maze;
use super::timer::TimerQueue;

pub const STARTING_LIVES: u32 = 3;
pub const MAX_LIVES: u32 = 5;
pub const GHOST_COUNT: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    /// All dots eaten; waiting out the level-advance timer.
    LevelClear,
    GameOver,
}

pub struct WorldState {
    pub maze: Maze,
    pub timing: TimingConfig,

    // ── Entities ──
    pub player: Player,
    pub ghosts: Vec<Ghost>,

    // ── Collectibles (live copies of the maze templates) ──
    pub dots: HashSet<Pos>,
    pub pellets: HashSet<Pos>,

    // ── Round tracking ──
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub fruits_eaten: u32,
    /// Mirror of the persisted value.
    pub high_score: u32,

    // ── Ghost mode machinery ──
    /// Scatter or Chase only; the per-ghost overlays live on the
    /// ghosts themselves.
    pub global_mode: GhostMode,
    pub global_mode_ms_left: u64,
    /// Remaining Frightened time; 0 = power inactive.
    pub power_ms_left: u64,
    /// Captures inside the current power window (doubles the bounty).
    pub ghosts_eaten_this_power: u32,

    // ── Flags ──
    pub game_over: bool,
    pub won: bool,

    // ── Shell / scheduling ──
    pub phase: Phase,
    pub paused: bool,
    pub tick: u64,
    /// Bumped on every reset; deferred timers from older generations
    /// are discarded unfired.
    pub generation: u32,
    pub timers: TimerQueue,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(maze: Maze, timing: TimingConfig, high_score: u32) -> Self {
        let mut world = WorldState {
            maze,
            timing,
            player: Player::new(Pos::new(0, 0)),
            ghosts: Vec::new(),
            dots: HashSet::new(),
            pellets: HashSet::new(),
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            fruits_eaten: 0,
            high_score,
            global_mode: GhostMode::Chase,
            global_mode_ms_left: 0,
            power_ms_left: 0,
            ghosts_eaten_this_power: 0,
            game_over: false,
            won: false,
            phase: Phase::Title,
            paused: false,
            tick: 0,
            generation: 0,
            timers: TimerQueue::new(),
            message: String::new(),
            message_timer: 0,
        };
        world.start_round(GhostMode::Chase);
        world
    }

    /// Queue a direction intent. Takes effect on the next tick's
    /// movement resolution, never sooner.
    pub fn set_intended_direction(&mut self, dir: Dir) {
        self.player.next_dir = dir;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Rebuild the round: fresh collectibles from the maze templates,
    /// entities at their spawn cells, the given opening wave. Score,
    /// lives, level and high score are untouched.
    pub(crate) fn start_round(&mut self, opening_wave: GhostMode) {
        self.dots = self.maze.dots.clone();
        self.pellets = self.maze.pellets.clone();
        self.global_mode = opening_wave;
        self.global_mode_ms_left = self.timing.first_wave_ms;
        self.power_ms_left = 0;
        self.ghosts_eaten_this_power = 0;
        self.won = false;
        self.reset_positions();
    }

    /// Put the player and all ghosts back on their spawn cells and
    /// clear the Frightened/power overlay. Collectibles stay as-is.
    pub(crate) fn reset_positions(&mut self) {
        self.player = Player::new(self.maze.spawn);
        self.ghosts = (0..GHOST_COUNT)
            .map(|id| {
                Ghost::new(
                    id,
                    self.maze.slot(id),
                    self.maze.corners[id % 4],
                    self.global_mode,
                )
            })
            .collect();
        self.power_ms_left = 0;
        self.ghosts_eaten_this_power = 0;
    }

    /// Deep-immutable view of the round for rendering and tests.
    /// Idempotent between ticks.
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            player: self.player.clone(),
            ghosts: self.ghosts.clone(),
            dots: self.dots.clone(),
            pellets: self.pellets.clone(),
            score: self.score,
            lives: self.lives,
            level: self.level,
            fruits_eaten: self.fruits_eaten,
            high_score: self.high_score,
            global_mode: self.global_mode,
            global_mode_ms_left: self.global_mode_ms_left,
            power_ms_left: self.power_ms_left,
            game_over: self.game_over,
            won: self.won,
        }
    }
}

/// What the rendering collaborator gets to see: the round, nothing
/// mutable, nothing scheduler-internal.
#[derive(Clone, PartialEq, Debug)]
pub struct RoundSnapshot {
    pub player: Player,
    pub ghosts: Vec<Ghost>,
    pub dots: HashSet<Pos>,
    pub pellets: HashSet<Pos>,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub fruits_eaten: u32,
    pub high_score: u32,
    pub global_mode: GhostMode,
    pub global_mode_ms_left: u64,
    pub power_ms_left: u64,
    pub game_over: bool,
    pub won: bool,
}

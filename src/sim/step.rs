//! The step function: advances the round by one tick.
//!
//! Processing order (fixed, tests replay against it):
//!   1. Mode timers (global wave, power window)
//!   2. Deferred one-shots (ghost revival, level advance)
//!   3. Ghost target recompute
//!   4. Player movement
//!   5. Ghost movement
//!   6. Pickups (dot / pellet / fruit)
//!   7. Ghost contact (capture or life loss)
//!   8. Win check
//!
//! During `LevelClear` only the deferred-timer pump runs, so the
//! level-advance reset fires on schedule while everything else holds
//! still. `Title` and `GameOver` do not step at all.

use crate::domain::ai;
use crate::domain::entity::GhostMode;
use crate::domain::movement::{self, Goal};
use super::event::GameEvent;
use super::score::ScoreStore;
use super::timer::TimerKind;
use super::world::{Phase, WorldState, MAX_LIVES, STARTING_LIVES};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, store: &mut dyn ScoreStore) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();

    match world.phase {
        Phase::Playing => {}
        Phase::LevelClear => {
            world.tick += 1;
            tick_message(world);
            resolve_deferred(world, &mut events);
            return events;
        }
        Phase::Title | Phase::GameOver => return events,
    }

    world.tick += 1;
    tick_message(world);

    resolve_mode_timers(world, &mut events);
    resolve_deferred(world, &mut events);
    resolve_targets(world);
    resolve_player_movement(world);
    resolve_ghost_movement(world);
    resolve_pickups(world, &mut events);
    resolve_ghost_contact(world, store, &mut events);
    resolve_win(world, &mut events);

    events
}

fn tick_message(world: &mut WorldState) {
    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Mode timers
// ══════════════════════════════════════════════════════════════

fn resolve_mode_timers(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let dt = world.timing.tick_rate_ms;

    // The global alternation is frozen while a power window runs and
    // resumes exactly where it left off.
    if world.power_ms_left > 0 {
        world.power_ms_left = world.power_ms_left.saturating_sub(dt);
        if world.power_ms_left == 0 {
            for g in &mut world.ghosts {
                if g.mode == GhostMode::Frightened {
                    g.mode = world.global_mode;
                }
            }
            world.ghosts_eaten_this_power = 0;
            events.push(GameEvent::PowerEnded);
        }
        return;
    }

    world.global_mode_ms_left = world.global_mode_ms_left.saturating_sub(dt);
    if world.global_mode_ms_left == 0 {
        let (mode, span) = match world.global_mode {
            GhostMode::Chase => (GhostMode::Scatter, world.timing.scatter_ms),
            _ => (GhostMode::Chase, world.timing.chase_ms),
        };
        world.global_mode = mode;
        world.global_mode_ms_left = span;
        for g in &mut world.ghosts {
            if matches!(g.mode, GhostMode::Scatter | GhostMode::Chase) {
                g.mode = mode;
            }
        }
        events.push(GameEvent::WaveChanged { mode });
    }
}

// ══════════════════════════════════════════════════════════════
// Deferred one-shots
// ══════════════════════════════════════════════════════════════

fn resolve_deferred(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let fired = world.timers.advance(world.timing.tick_rate_ms, world.generation);
    for kind in fired {
        match kind {
            TimerKind::GhostRevive { ghost } => {
                if let Some(g) = world.ghosts.get_mut(ghost) {
                    if g.mode == GhostMode::Eaten {
                        g.mode = world.global_mode;
                        events.push(GameEvent::GhostRevived { id: ghost });
                    }
                }
            }
            TimerKind::LevelAdvance => {
                world.generation += 1;
                world.start_round(GhostMode::Scatter);
                world.phase = Phase::Playing;
                world.set_message(&format!("Level {}", world.level), 25);
                events.push(GameEvent::LevelStarted { level: world.level });
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Targeting
// ══════════════════════════════════════════════════════════════

fn resolve_targets(world: &mut WorldState) {
    let direct_pos = world.ghosts[0].pos;
    let home = world.maze.home();
    let player = world.player.clone();
    let global_mode = world.global_mode;

    for g in &mut world.ghosts {
        g.target = if g.mode == GhostMode::Eaten {
            home
        } else {
            ai::target_for(
                g.id,
                g.pos,
                g.mode,
                g.scatter_corner,
                global_mode,
                &player,
                direct_pos,
            )
        };
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState) {
    let mv = movement::resolve_player(
        &world.maze.view(),
        world.player.pos,
        world.player.dir,
        world.player.next_dir,
    );
    world.player.pos = mv.pos;
    world.player.dir = mv.dir;
}

fn resolve_ghost_movement(world: &mut WorldState) {
    let player_pos = world.player.pos;
    let map = world.maze.view();

    for g in &mut world.ghosts {
        let goal = match g.mode {
            GhostMode::Frightened => Goal::Flee(player_pos),
            // Eaten ghosts already target home via resolve_targets.
            _ => Goal::Seek(g.target),
        };
        if let Some(next) = movement::choose_ghost_step(&map, g.pos, goal) {
            g.pos = next;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pickups
// ══════════════════════════════════════════════════════════════

fn resolve_pickups(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let pos = world.player.pos;

    if world.dots.remove(&pos) {
        world.score += 10;
        events.push(GameEvent::DotEaten { x: pos.x, y: pos.y });

        // Fruit-spawn hook; nothing in the core reacts to it.
        let eaten = world.maze.dots.len() - world.dots.len();
        if eaten == 70 || eaten == 170 {
            events.push(GameEvent::FruitWindow { dots_eaten: eaten });
        }
    }

    if world.pellets.remove(&pos) {
        world.score += 50;
        world.power_ms_left = world.timing.power_ms;
        world.ghosts_eaten_this_power = 0;
        for g in &mut world.ghosts {
            if g.mode != GhostMode::Eaten {
                g.mode = GhostMode::Frightened;
            }
        }
        events.push(GameEvent::PelletEaten { x: pos.x, y: pos.y });
        events.push(GameEvent::PowerStarted);
    }

    if world.maze.fruit == Some(pos) {
        world.fruits_eaten += 1;
        world.score += 100 * world.level;
        events.push(GameEvent::FruitEaten { x: pos.x, y: pos.y });
    }
}

// ══════════════════════════════════════════════════════════════
// Ghost contact
// ══════════════════════════════════════════════════════════════

fn resolve_ghost_contact(
    world: &mut WorldState,
    store: &mut dyn ScoreStore,
    events: &mut Vec<GameEvent>,
) {
    let pos = world.player.pos;

    for i in 0..world.ghosts.len() {
        if world.ghosts[i].pos != pos {
            continue;
        }
        match world.ghosts[i].mode {
            GhostMode::Frightened => {
                // Bounty doubles per capture within one power window.
                let points = 200u32 << world.ghosts_eaten_this_power;
                world.score += points;
                world.ghosts_eaten_this_power += 1;
                world.ghosts[i].mode = GhostMode::Eaten;
                // Respawns at its slot instantly but stays untargetable
                // as Eaten until the revive timer fires.
                world.ghosts[i].pos = world.maze.slot(i);
                world.timers.schedule(
                    TimerKind::GhostRevive { ghost: i },
                    world.timing.ghost_revive_ms,
                    world.generation,
                );
                events.push(GameEvent::GhostEaten { id: i, points });
            }
            GhostMode::Eaten => {}
            GhostMode::Scatter | GhostMode::Chase => {
                lose_life(world, store, events);
                return;
            }
        }
    }
}

fn lose_life(world: &mut WorldState, store: &mut dyn ScoreStore, events: &mut Vec<GameEvent>) {
    world.lives -= 1;
    events.push(GameEvent::LifeLost { remaining: world.lives });

    if world.lives == 0 {
        world.game_over = true;
        world.phase = Phase::GameOver;
        if world.score > world.high_score {
            world.high_score = world.score;
            store.save(world.high_score);
        }
        world.set_message("Game over", 50);
        events.push(GameEvent::GameOver {
            score: world.score,
            high_score: world.high_score,
        });
    } else {
        // The round continues: everyone back to spawn, power state
        // cleared, collectibles untouched. Pending revive timers
        // belong to the dead configuration and must not fire.
        world.generation += 1;
        world.timers.cancel_all();
        world.reset_positions();
        world.set_message("Caught! Breathe and refocus.", 25);
    }
}

// ══════════════════════════════════════════════════════════════
// Win check
// ══════════════════════════════════════════════════════════════

fn resolve_win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.game_over || world.won || !world.dots.is_empty() {
        return;
    }

    world.won = true;
    world.level += 1;
    world.score += 100 * world.level;
    world.lives = (world.lives + 1).min(MAX_LIVES);
    world.phase = Phase::LevelClear;
    world.timers.schedule(
        TimerKind::LevelAdvance,
        world.timing.level_pause_ms,
        world.generation,
    );
    world.set_message("Maze cleared!", 25);
    events.push(GameEvent::RoundWon { level: world.level });
}

// ══════════════════════════════════════════════════════════════
// Manual restart
// ══════════════════════════════════════════════════════════════

/// Full restart: flush the high score, drop every pending timer, and
/// begin a fresh game at level 1.
pub fn restart_game(world: &mut WorldState, store: &mut dyn ScoreStore) {
    if world.score > world.high_score {
        world.high_score = world.score;
        store.save(world.high_score);
    }
    world.generation += 1;
    world.timers.cancel_all();
    world.score = 0;
    world.lives = STARTING_LIVES;
    world.level = 1;
    world.fruits_eaten = 0;
    world.game_over = false;
    world.phase = Phase::Playing;
    world.start_round(GhostMode::Chase);
    world.set_message("Ready!", 15);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::domain::entity::{Dir, Pos};
    use crate::sim::maze::{Maze, DEFAULT_MAZE};

    struct MemStore {
        value: u32,
        saves: u32,
    }

    impl MemStore {
        fn new(value: u32) -> Self {
            MemStore { value, saves: 0 }
        }
    }

    impl ScoreStore for MemStore {
        fn load(&self) -> u32 {
            self.value
        }
        fn save(&mut self, score: u32) {
            self.value = score;
            self.saves += 1;
        }
    }

    fn world_from(rows: &[&str]) -> WorldState {
        let maze = Maze::parse(rows).unwrap();
        let mut w = WorldState::new(maze, TimingConfig::default(), 0);
        w.phase = Phase::Playing;
        w
    }

    /// Player corridor with the ghost pen sealed off; the boxed dot
    /// at (5,3) keeps the round from ending by accident.
    const CORRIDOR: [&str; 5] = [
        "#######",
        "#S...##",
        "#######",
        "#G#G#.#",
        "#######",
    ];

    /// One ghost adjacent to the player corridor, the rest boxed.
    /// The sealed dot at (7,3) keeps the round from ending early.
    const CONTACT: [&str; 5] = [
        "#########",
        "#S.G#####",
        "#########",
        "#G#G#G#.#",
        "#########",
    ];

    /// Everything boxed: nothing can move, only timers run.
    const STATIC: [&str; 5] = [
        "#####",
        "#S###",
        "#####",
        "#G#.#",
        "#####",
    ];

    // ── Movement + dots ──

    #[test]
    fn tick_moves_the_player_and_eats_the_dot() {
        let mut w = world_from(&CORRIDOR);
        let mut store = MemStore::new(0);
        w.set_intended_direction(Dir::Right);

        let events = step(&mut w, &mut store);

        assert_eq!(w.player.pos, Pos::new(2, 1));
        assert_eq!(w.player.dir, Dir::Right);
        assert!(!w.dots.contains(&Pos::new(2, 1)));
        assert_eq!(w.score, 10);
        assert!(matches!(events[0], GameEvent::DotEaten { x: 2, y: 1 }));
    }

    #[test]
    fn intent_only_applies_on_the_tick() {
        let mut w = world_from(&CORRIDOR);
        w.set_intended_direction(Dir::Right);
        // No tick yet: nothing moved.
        assert_eq!(w.player.pos, Pos::new(1, 1));
        assert_eq!(w.player.dir, Dir::None);
    }

    #[test]
    fn blocked_intent_keeps_the_committed_direction() {
        let mut w = world_from(&CORRIDOR);
        let mut store = MemStore::new(0);
        w.set_intended_direction(Dir::Right);
        step(&mut w, &mut store);

        // Up is a wall the whole way; the player keeps rolling right.
        w.set_intended_direction(Dir::Up);
        step(&mut w, &mut store);
        assert_eq!(w.player.pos, Pos::new(3, 1));
        assert_eq!(w.player.dir, Dir::Right);
    }

    #[test]
    fn score_is_monotonic_and_the_player_stays_off_walls() {
        let maze = Maze::parse(&DEFAULT_MAZE).unwrap();
        let mut w = WorldState::new(maze, TimingConfig::default(), 0);
        w.phase = Phase::Playing;
        let mut store = MemStore::new(0);

        let intents = [Dir::Right, Dir::Up, Dir::Left, Dir::Down];
        let mut last_score = 0;
        for t in 0..300 {
            w.set_intended_direction(intents[(t / 7) % 4]);
            step(&mut w, &mut store);
            assert!(w.score >= last_score, "score regressed at tick {t}");
            last_score = w.score;
            assert!(w.maze.is_walkable(w.player.pos), "player on a wall at tick {t}");
            if w.game_over {
                break;
            }
        }
    }

    // ── Wave alternation ──

    #[test]
    fn opening_chase_flips_to_scatter_then_back() {
        let mut w = world_from(&STATIC);
        let mut store = MemStore::new(0);

        // 7000 ms opening chase: still chasing one tick before expiry.
        for _ in 0..58 {
            step(&mut w, &mut store);
        }
        assert_eq!(w.global_mode, GhostMode::Chase);

        let events = step(&mut w, &mut store);
        assert_eq!(w.global_mode, GhostMode::Scatter);
        assert_eq!(w.global_mode_ms_left, 5000);
        assert!(matches!(events[0], GameEvent::WaveChanged { mode: GhostMode::Scatter }));
        for g in &w.ghosts {
            assert_eq!(g.mode, GhostMode::Scatter);
        }

        // 5000 ms scatter, then chase again.
        for _ in 0..42 {
            step(&mut w, &mut store);
        }
        assert_eq!(w.global_mode, GhostMode::Chase);
        assert_eq!(w.global_mode_ms_left, 20000);
    }

    // ── Power pellets ──

    /// Pellet one step to the right of spawn, pen sealed.
    const PELLET: [&str; 5] = [
        "#####",
        "#SP##",
        "#####",
        "#G#.#",
        "#####",
    ];

    #[test]
    fn pellet_frightens_ghosts_and_freezes_the_wave_clock() {
        let mut w = world_from(&PELLET);
        let mut store = MemStore::new(0);

        w.set_intended_direction(Dir::Right);
        let events = step(&mut w, &mut store);

        assert_eq!(w.score, 50);
        assert_eq!(w.power_ms_left, 8000);
        for g in &w.ghosts {
            assert_eq!(g.mode, GhostMode::Frightened);
        }
        assert!(events.iter().any(|e| matches!(e, GameEvent::PowerStarted)));

        // One wave decrement happened before the pellet; the clock
        // must hold there for the whole window.
        let frozen = w.global_mode_ms_left;
        assert_eq!(frozen, 7000 - 120);

        // 8000 ms of power: 66 partial decrements, expiry on the 67th.
        for _ in 0..66 {
            step(&mut w, &mut store);
            assert!(w.power_ms_left > 0);
            assert_eq!(w.global_mode_ms_left, frozen);
        }
        let events = step(&mut w, &mut store);
        assert_eq!(w.power_ms_left, 0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PowerEnded)));
        for g in &w.ghosts {
            assert_eq!(g.mode, GhostMode::Chase);
        }

        // Wave clock resumes exactly where it was frozen.
        step(&mut w, &mut store);
        assert_eq!(w.global_mode_ms_left, frozen - 120);
    }

    // ── Captures ──

    #[test]
    fn frightened_capture_scores_and_revives_after_exactly_3000_ms() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        w.ghosts[0].mode = GhostMode::Frightened;

        w.set_intended_direction(Dir::Right);
        let events = step(&mut w, &mut store);

        // Player and the fleeing ghost met on (2,1): dot + capture.
        assert_eq!(w.score, 10 + 200);
        assert_eq!(w.ghosts[0].mode, GhostMode::Eaten);
        assert_eq!(w.ghosts[0].pos, w.maze.slot(0));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GhostEaten { id: 0, points: 200 })));

        // Retreat and wait: 24 further ticks leave it eaten, the 25th
        // (3000 ms of scheduled time) restores the global mode.
        w.set_intended_direction(Dir::Left);
        for _ in 0..24 {
            step(&mut w, &mut store);
            assert_eq!(w.ghosts[0].mode, GhostMode::Eaten);
        }
        let events = step(&mut w, &mut store);
        assert_eq!(w.ghosts[0].mode, w.global_mode);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GhostRevived { id: 0 })));
    }

    #[test]
    fn bounty_doubles_within_one_power_window() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        w.ghosts[0].mode = GhostMode::Frightened;
        w.ghosts[1].mode = GhostMode::Frightened;
        w.ghosts[1].pos = Pos::new(3, 1);

        // Both ghosts are forced onto (2,1), straight into the player.
        w.set_intended_direction(Dir::Right);
        let events = step(&mut w, &mut store);

        assert_eq!(w.score, 10 + 200 + 400);
        assert_eq!(w.ghosts_eaten_this_power, 2);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GhostEaten { id: 0, points: 200 })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GhostEaten { id: 1, points: 400 })));
    }

    #[test]
    fn eaten_ghost_is_immune_on_contact() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        let mut events = Vec::new();
        w.ghosts[0].mode = GhostMode::Eaten;
        w.ghosts[0].pos = w.player.pos;

        resolve_ghost_contact(&mut w, &mut store, &mut events);

        assert_eq!(w.lives, STARTING_LIVES);
        assert_eq!(w.score, 0);
        assert!(events.is_empty());
    }

    // ── Life loss and game over ──

    #[test]
    fn normal_contact_costs_a_life_and_keeps_the_collectibles() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        let dots_before = w.dots.len();

        // The chasing ghost walks from (3,1) onto the idle player's
        // corridor; two ticks close the gap.
        step(&mut w, &mut store);
        let events = step(&mut w, &mut store);

        assert_eq!(w.lives, STARTING_LIVES - 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LifeLost { remaining: 2 })));
        assert_eq!(w.player.pos, w.maze.spawn);
        assert_eq!(w.ghosts[0].pos, w.maze.slot(0));
        assert_eq!(w.dots.len(), dots_before);
        assert!(!w.game_over);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn life_loss_clears_the_power_window() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        w.power_ms_left = 4000;
        w.lives = 2;

        step(&mut w, &mut store);
        step(&mut w, &mut store);

        assert_eq!(w.lives, 1);
        assert_eq!(w.power_ms_left, 0);
        assert!(w.ghosts.iter().all(|g| g.mode != GhostMode::Frightened));
    }

    #[test]
    fn zero_lives_ends_the_game_and_flushes_the_high_score() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(500);
        w.lives = 1;
        w.score = 777;
        w.high_score = 500;

        step(&mut w, &mut store);
        let events = step(&mut w, &mut store);

        assert!(w.game_over);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.high_score, 777);
        assert_eq!(store.value, 777);
        assert_eq!(store.saves, 1);
        assert!(events.iter().any(
            |e| matches!(e, GameEvent::GameOver { score: 777, high_score: 777 })
        ));

        // A finished game does not step.
        let tick = w.tick;
        assert!(step(&mut w, &mut store).is_empty());
        assert_eq!(w.tick, tick);
    }

    #[test]
    fn lower_final_score_leaves_the_stored_record_alone() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(1000);
        w.lives = 1;
        w.score = 777;
        w.high_score = 1000;

        step(&mut w, &mut store);
        step(&mut w, &mut store);

        assert!(w.game_over);
        assert_eq!(w.high_score, 1000);
        assert_eq!(store.saves, 0);
    }

    // ── Winning ──

    /// A single reachable dot; eating it clears the maze.
    const LAST_DOT: [&str; 5] = [
        "#####",
        "#S.##",
        "#####",
        "#G###",
        "#####",
    ];

    #[test]
    fn clearing_the_dots_wins_once_and_advances_after_3000_ms() {
        let mut w = world_from(&LAST_DOT);
        let mut store = MemStore::new(0);

        w.set_intended_direction(Dir::Right);
        let events = step(&mut w, &mut store);

        assert!(w.won);
        assert_eq!(w.level, 2);
        assert_eq!(w.score, 10 + 200); // dot + level-2 bonus
        assert_eq!(w.lives, STARTING_LIVES + 1);
        assert_eq!(w.phase, Phase::LevelClear);
        assert_eq!(w.timers.pending(), 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::RoundWon { level: 2 })));

        // The clear pause only pumps timers; no second win, no second
        // level-advance schedule.
        for _ in 0..24 {
            let events = step(&mut w, &mut store);
            assert!(!events.iter().any(|e| matches!(e, GameEvent::RoundWon { .. })));
        }
        assert!(w.won);
        assert_eq!(w.timers.pending(), 1);

        // 25 ticks after the win, the next level starts itself.
        let events = step(&mut w, &mut store);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelStarted { level: 2 })));
        assert_eq!(w.phase, Phase::Playing);
        assert!(!w.won);
        assert_eq!(w.dots.len(), 1);
        assert_eq!(w.player.pos, w.maze.spawn);
        assert_eq!(w.global_mode, GhostMode::Scatter);
        assert_eq!(w.global_mode_ms_left, 7000);
    }

    #[test]
    fn bonus_life_caps_at_five() {
        let mut w = world_from(&LAST_DOT);
        let mut store = MemStore::new(0);
        w.lives = MAX_LIVES;

        w.set_intended_direction(Dir::Right);
        step(&mut w, &mut store);

        assert!(w.won);
        assert_eq!(w.lives, MAX_LIVES);
    }

    // ── Fruit ──

    /// Fruit in a dead end, so the player parks on it.
    const FRUIT: [&str; 5] = [
        "#####",
        "#SF##",
        "#####",
        "#G#.#",
        "#####",
    ];

    #[test]
    fn fruit_pays_per_level_and_retriggers_while_occupied() {
        let mut w = world_from(&FRUIT);
        let mut store = MemStore::new(0);

        w.set_intended_direction(Dir::Right);
        let events = step(&mut w, &mut store);
        assert_eq!(w.fruits_eaten, 1);
        assert_eq!(w.score, 100);
        assert!(events.iter().any(|e| matches!(e, GameEvent::FruitEaten { .. })));

        // Dead end: the player stays parked on the fruit cell, which
        // keeps paying. Matches the original's behavior.
        step(&mut w, &mut store);
        assert_eq!(w.fruits_eaten, 2);
        assert_eq!(w.score, 200);
    }

    #[test]
    fn the_seventieth_dot_opens_the_fruit_window() {
        let maze = Maze::parse(&DEFAULT_MAZE).unwrap();
        let mut w = WorldState::new(maze, TimingConfig::default(), 0);
        w.phase = Phase::Playing;
        let mut store = MemStore::new(0);

        // Pre-eat 69 dots (leaving the one next to spawn), then let
        // the tick eat number 70.
        let next_cell = Pos::new(2, 19);
        let removed: Vec<Pos> = w
            .dots
            .iter()
            .copied()
            .filter(|p| *p != next_cell)
            .take(69)
            .collect();
        for p in removed {
            w.dots.remove(&p);
        }

        w.set_intended_direction(Dir::Right);
        let events = step(&mut w, &mut store);
        assert!(events.iter().any(|e| matches!(e, GameEvent::FruitWindow { dots_eaten: 70 })));
    }

    // ── Reset hygiene ──

    #[test]
    fn restart_cancels_stale_timers_and_flushes_the_score() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        w.ghosts[0].mode = GhostMode::Frightened;

        // Capture schedules a revive.
        w.set_intended_direction(Dir::Right);
        step(&mut w, &mut store);
        assert_eq!(w.timers.pending(), 1);

        restart_game(&mut w, &mut store);
        assert_eq!(w.timers.pending(), 0);
        assert_eq!(store.value, 210);
        assert_eq!(w.score, 0);
        assert_eq!(w.lives, STARTING_LIVES);
        assert_eq!(w.level, 1);
        assert_eq!(w.global_mode, GhostMode::Chase);
        assert_eq!(w.global_mode_ms_left, 7000);

        // Nothing from the old round ever fires.
        for _ in 0..30 {
            let events = step(&mut w, &mut store);
            assert!(!events.iter().any(|e| matches!(e, GameEvent::GhostRevived { .. })));
        }
    }

    #[test]
    fn life_loss_cancels_pending_revives() {
        let mut w = world_from(&CONTACT);
        let mut store = MemStore::new(0);
        w.ghosts[0].mode = GhostMode::Frightened;

        w.set_intended_direction(Dir::Right);
        step(&mut w, &mut store);
        assert_eq!(w.timers.pending(), 1);

        // Ghost 1 is unboxed for this test: walk it into the player.
        w.ghosts[1].pos = Pos::new(3, 1);
        w.ghosts[1].mode = w.global_mode;
        w.set_intended_direction(Dir::None);
        w.player.dir = Dir::None;
        w.player.pos = Pos::new(2, 1);

        let events = step(&mut w, &mut store);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LifeLost { .. })));
        // The revive scheduled before the reset may not outlive it.
        assert_eq!(w.timers.pending(), 0);
    }

    #[test]
    fn snapshots_between_ticks_are_equal() {
        let mut w = world_from(&CORRIDOR);
        let mut store = MemStore::new(0);
        w.set_intended_direction(Dir::Right);
        step(&mut w, &mut store);

        let a = w.snapshot();
        let b = w.snapshot();
        assert_eq!(a, b);

        step(&mut w, &mut store);
        assert_ne!(a, w.snapshot());
    }
}

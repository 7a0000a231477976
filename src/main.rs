//! Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::Dir;
use sim::maze::{Maze, DEFAULT_MAZE};
use sim::score::{FileScoreStore, ScoreStore};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    // A bad maze is fatal: no round may start on a broken grid.
    let maze = match load_maze(&config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Maze load failed: {e}");
            std::process::exit(1);
        }
    };

    let mut store = FileScoreStore::locate();
    let high_score = store.load();
    let mut world = WorldState::new(maze, config.timing.clone(), high_score);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &mut store);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    // A record set mid-round still counts when quitting.
    if world.score > world.high_score {
        world.high_score = world.score;
        store.save(world.high_score);
    }

    println!();
    println!("Thanks for playing Mindmaze!");
    println!("Final score: {}   best: {}", world.score, world.high_score);
}

fn load_maze(config: &GameConfig) -> Result<Maze, Box<dyn std::error::Error>> {
    match &config.maze_file {
        Some(path) => Maze::from_file(path),
        None => Ok(Maze::parse(&DEFAULT_MAZE)?),
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    store: &mut dyn ScoreStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let tick_rate = Duration::from_millis(world.timing.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        handle_meta(world, store, &kb);

        if let Some(dir) = detect_direction(&kb) {
            world.set_intended_direction(dir);
        }

        if last_tick.elapsed() >= tick_rate {
            if !world.paused {
                step::step(world, store);
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn detect_direction(kb: &InputState) -> Option<Dir> {
    if kb.any_held(KEYS_UP) || kb.any_pressed(KEYS_UP) {
        Some(Dir::Up)
    } else if kb.any_held(KEYS_DOWN) || kb.any_pressed(KEYS_DOWN) {
        Some(Dir::Down)
    } else if kb.any_held(KEYS_LEFT) || kb.any_pressed(KEYS_LEFT) {
        Some(Dir::Left)
    } else if kb.any_held(KEYS_RIGHT) || kb.any_pressed(KEYS_RIGHT) {
        Some(Dir::Right)
    } else {
        None
    }
}

fn handle_meta(world: &mut WorldState, store: &mut dyn ScoreStore, kb: &InputState) {
    if kb.any_pressed(KEYS_CONFIRM) {
        match world.phase {
            Phase::Title => {
                world.phase = Phase::Playing;
                world.set_message("Ready!", 15);
            }
            Phase::GameOver => step::restart_game(world, store),
            _ => {}
        }
    }

    if kb.any_pressed(KEYS_PAUSE) && world.phase == Phase::Playing {
        world.paused = !world.paused;
    }

    if kb.any_pressed(KEYS_RESTART) && world.phase != Phase::Title {
        world.paused = false;
        step::restart_game(world, store);
    }
}

//! Presentation layer: double-buffered, diff-based terminal renderer.
//!
//! Each frame is built into a cell buffer, compared against the
//! previous frame, and only changed cells are emitted, batched with
//! `queue!` and flushed once. This keeps the 120 ms cadence free of
//! full-screen flicker.
//!
//! Maze cells render two terminal columns wide so the grid is roughly
//! square on screen. The renderer only reads state; it never touches
//! the simulation.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::domain::entity::{GhostMode, Pos};
use crate::sim::maze::Maze;
use crate::sim::world::{Phase, RoundSnapshot, WorldState};

const BG: Color = Color::Rgb { r: 10, g: 10, b: 26 };
const WALL: Color = Color::Rgb { r: 30, g: 64, b: 175 };
const DOT: Color = Color::Rgb { r: 251, g: 191, b: 36 };
const PELLET: Color = Color::Rgb { r: 245, g: 158, b: 11 };
const PLAYER: Color = Color::Yellow;
const FRIGHTENED: Color = Color::Rgb { r: 0, g: 102, b: 255 };
const EATEN: Color = Color::DarkGrey;

/// Per-archetype ghost palette: red, pink, cyan, orange.
const GHOST_COLORS: [Color; 4] = [
    Color::Rgb { r: 255, g: 0, b: 0 },
    Color::Rgb { r: 255, g: 184, b: 255 },
    Color::Rgb { r: 0, g: 255, b: 255 },
    Color::Rgb { r: 255, g: 184, b: 82 },
];

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BG };
}

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn text(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg: BG });
        }
    }

    fn text_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = (self.width.saturating_sub(s.chars().count())) / 2;
        self.text(x, y, s, fg);
    }
}

pub struct Renderer {
    out: BufWriter<Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    force_full: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            out: BufWriter::new(io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            force_full: true,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide, SetBackgroundColor(BG), Clear(ClearType::All))?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.force_full = true;
        }

        self.front.clear();
        // Rendering reads the round through its snapshot contract;
        // only shell state (phase, pause, message) comes off the
        // world directly.
        let snap = world.snapshot();
        build_frame(&mut self.front, world, &snap);
        self.flush_diff()?;
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        if self.force_full {
            queue!(self.out, SetBackgroundColor(BG), Clear(ClearType::All))?;
        }

        let mut last_fg = None;
        let mut last_bg = None;
        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                if !self.force_full && cell == self.back.get(x, y) {
                    x += 1;
                    continue;
                }
                queue!(self.out, MoveTo(x as u16, y as u16))?;
                if last_fg != Some(cell.fg) {
                    queue!(self.out, SetForegroundColor(cell.fg))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.out, SetBackgroundColor(cell.bg))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.out, Print(cell.ch))?;
                x += 1;
            }
        }

        self.out.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        self.force_full = false;
        Ok(())
    }
}

// ── Frame construction ──

/// Top-left of the maze area; row 0 is the HUD.
const MAZE_ORIGIN_Y: usize = 2;

fn build_frame(fb: &mut FrameBuffer, world: &WorldState, snap: &RoundSnapshot) {
    draw_hud(fb, snap);
    draw_maze(fb, &world.maze, snap);
    draw_entities(fb, snap);
    draw_message(fb, world);
    draw_overlay(fb, world, snap);
}

fn cell_x(x: i32) -> usize {
    // Two terminal columns per maze cell.
    (x as usize) * 2
}

fn draw_hud(fb: &mut FrameBuffer, snap: &RoundSnapshot) {
    let hearts: String = std::iter::repeat('*').take(snap.lives as usize).collect();
    let hud = format!(
        "SCORE {:06}  HIGH {:06}  LIVES {:<5}  LEVEL {}",
        snap.score, snap.high_score, hearts, snap.level
    );
    fb.text(0, 0, &hud, Color::White);

    if snap.power_ms_left > 0 {
        let secs = (snap.power_ms_left + 999) / 1000;
        let tag = format!("POWER {secs}s");
        let x = fb.width.saturating_sub(tag.len() + 1);
        fb.text(x, 0, &tag, FRIGHTENED);
    }
}

fn draw_maze(fb: &mut FrameBuffer, maze: &Maze, snap: &RoundSnapshot) {
    for y in 0..maze.height {
        for x in 0..maze.width {
            let p = Pos::new(x, y);
            let sx = cell_x(x);
            let sy = MAZE_ORIGIN_Y + y as usize;
            if !maze.is_walkable(p) {
                fb.set(sx, sy, Cell { ch: '█', fg: WALL, bg: BG });
                fb.set(sx + 1, sy, Cell { ch: '█', fg: WALL, bg: BG });
            } else if snap.dots.contains(&p) {
                fb.set(sx, sy, Cell { ch: '·', fg: DOT, bg: BG });
            } else if snap.pellets.contains(&p) {
                fb.set(sx, sy, Cell { ch: 'o', fg: PELLET, bg: BG });
            } else if maze.fruit == Some(p) {
                fb.set(sx, sy, Cell { ch: '*', fg: Color::Magenta, bg: BG });
            }
        }
    }
}

fn draw_entities(fb: &mut FrameBuffer, snap: &RoundSnapshot) {
    for g in &snap.ghosts {
        let fg = match g.mode {
            GhostMode::Frightened => FRIGHTENED,
            GhostMode::Eaten => EATEN,
            _ => GHOST_COLORS[g.id % 4],
        };
        fb.set(
            cell_x(g.pos.x),
            MAZE_ORIGIN_Y + g.pos.y as usize,
            Cell { ch: 'M', fg, bg: BG },
        );
    }

    fb.set(
        cell_x(snap.player.pos.x),
        MAZE_ORIGIN_Y + snap.player.pos.y as usize,
        Cell { ch: 'C', fg: PLAYER, bg: BG },
    );
}

fn draw_message(fb: &mut FrameBuffer, world: &WorldState) {
    if world.message.is_empty() {
        return;
    }
    let y = MAZE_ORIGIN_Y + world.maze.height as usize + 1;
    fb.text_centered(y, &world.message, Color::White);
}

fn draw_overlay(fb: &mut FrameBuffer, world: &WorldState, snap: &RoundSnapshot) {
    let mid = MAZE_ORIGIN_Y + world.maze.height as usize / 2;
    match world.phase {
        Phase::Title => {
            fb.text_centered(mid - 2, "M I N D M A Z E", PLAYER);
            fb.text_centered(mid, "collect every thought, dodge the worries", Color::White);
            fb.text_centered(mid + 2, "arrows / WASD to steer - SPACE to begin", Color::Grey);
        }
        Phase::GameOver => {
            fb.text_centered(mid - 2, "GAME OVER", Color::Red);
            fb.text_centered(mid, &format!("score {}   best {}", snap.score, snap.high_score), Color::White);
            fb.text_centered(mid + 2, "SPACE to try again - Q to quit", Color::Grey);
        }
        Phase::LevelClear => {
            fb.text_centered(mid, &format!("LEVEL {} CLEARED", snap.level.saturating_sub(1)), PLAYER);
        }
        Phase::Playing if world.paused => {
            fb.text_centered(mid, "PAUSED", Color::White);
        }
        Phase::Playing => {}
    }
}

//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory (or CWD).
//! Falls back to the canonical timings if the file is missing or
//! incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    /// Optional custom maze file. A maze that fails to parse is fatal
    /// at startup; no round may start on a bad grid.
    pub maze_file: Option<PathBuf>,
}

/// All durations are milliseconds of simulated time.
#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    /// The first wave of a round (both the initial Chase and the
    /// Scatter a level advance resets to).
    pub first_wave_ms: u64,
    pub scatter_ms: u64,
    pub chase_ms: u64,
    pub power_ms: u64,
    pub ghost_revive_ms: u64,
    pub level_pause_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            tick_rate_ms: default_tick_rate(),
            first_wave_ms: default_first_wave(),
            scatter_ms: default_scatter(),
            chase_ms: default_chase(),
            power_ms: default_power(),
            ghost_revive_ms: default_ghost_revive(),
            level_pause_ms: default_level_pause(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_first_wave")]
    first_wave_ms: u64,
    #[serde(default = "default_scatter")]
    scatter_ms: u64,
    #[serde(default = "default_chase")]
    chase_ms: u64,
    #[serde(default = "default_power")]
    power_ms: u64,
    #[serde(default = "default_ghost_revive")]
    ghost_revive_ms: u64,
    #[serde(default = "default_level_pause")]
    level_pause_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    maze_file: Option<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 120 }
fn default_first_wave() -> u64 { 7000 }   // initial Chase deviates from steady state
fn default_scatter() -> u64 { 5000 }
fn default_chase() -> u64 { 20000 }
fn default_power() -> u64 { 8000 }
fn default_ghost_revive() -> u64 { 3000 }
fn default_level_pause() -> u64 { 3000 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            first_wave_ms: default_first_wave(),
            scatter_ms: default_scatter(),
            chase_ms: default_chase(),
            power_ms: default_power(),
            ghost_revive_ms: default_ghost_revive(),
            level_pause_ms: default_level_pause(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data dir.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig::from_toml(toml_cfg)
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: toml_cfg.timing.tick_rate_ms,
                first_wave_ms: toml_cfg.timing.first_wave_ms,
                scatter_ms: toml_cfg.timing.scatter_ms,
                chase_ms: toml_cfg.timing.chase_ms,
                power_ms: toml_cfg.timing.power_ms,
                ghost_revive_ms: toml_cfg.timing.ghost_revive_ms,
                level_pause_ms: toml_cfg.timing.level_pause_ms,
            },
            maze_file: toml_cfg.general.maze_file.map(PathBuf::from),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data dirs
/// (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed binary still finds data
        // relative to the real file.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mindmaze");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/mindmaze");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

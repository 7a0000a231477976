//! High-score persistence — a single key-value file.
//!
//! The core only knows the `ScoreStore` contract; the file backend is
//! one implementation of it. File format: one `high_score=<n>` line
//! in `highscore.dat`, stored in the first writable of exe dir /
//! XDG data home. A missing or unreadable file reads as 0; a failed
//! write degrades to a warning, never a crash.

use std::path::PathBuf;

const SCORE_FILE: &str = "highscore.dat";
const SCORE_KEY: &str = "high_score";

/// The persistence contract: one integer under one fixed key.
pub trait ScoreStore {
    fn load(&self) -> u32;
    fn save(&mut self, score: u32);
}

pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    /// Store backed by the default location.
    pub fn locate() -> Self {
        FileScoreStore { path: score_dir().join(SCORE_FILE) }
    }

    /// Store backed by an explicit path.
    #[allow(dead_code)]
    pub fn at(path: PathBuf) -> Self {
        FileScoreStore { path }
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> u32 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(_) => return 0,
        };
        text.lines()
            .find_map(|line| {
                let (key, value) = line.split_once('=')?;
                if key.trim() == SCORE_KEY {
                    value.trim().parse().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0)
    }

    fn save(&mut self, score: u32) {
        let body = format!("{SCORE_KEY}={score}\n");
        if let Err(e) = std::fs::write(&self.path, body) {
            eprintln!("Warning: could not write {}: {e}", self.path.display());
        }
    }
}

/// Where the score file lives.
/// 1. Exe directory when writable (local/portable installs).
/// 2. XDG data home (~/.local/share/mindmaze), created on demand.
/// 3. CWD as a last resort.
fn score_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_mindmaze");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mindmaze");
        if xdg.is_dir() || std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    PathBuf::from(".")
}

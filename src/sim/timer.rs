//! Deferred one-shot timers, driven by simulated time.
//!
//! The two deferred transitions (eaten-ghost revival, level advance)
//! are named entries here instead of fire-and-forget callbacks. Every
//! entry carries the round generation it was scheduled in; a reset
//! bumps the generation, so a stale timer can never mutate a round it
//! does not belong to.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerKind {
    /// Restore ghost `ghost` from Eaten to the current global mode.
    GhostRevive { ghost: usize },
    /// Tear down the cleared round and auto-start the next level.
    LevelAdvance,
}

#[derive(Clone, Debug)]
struct Entry {
    kind: TimerKind,
    remaining_ms: u64,
    generation: u32,
}

#[derive(Default)]
pub struct TimerQueue {
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        TimerQueue { entries: Vec::new() }
    }

    pub fn schedule(&mut self, kind: TimerKind, delay_ms: u64, generation: u32) {
        self.entries.push(Entry { kind, remaining_ms: delay_ms, generation });
    }

    /// Advance all timers by `dt_ms` of simulated time and return the
    /// kinds that came due, in scheduling order. Entries from an older
    /// generation are dropped without firing.
    pub fn advance(&mut self, dt_ms: u64, generation: u32) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        self.entries.retain_mut(|e| {
            if e.generation != generation {
                return false;
            }
            e.remaining_ms = e.remaining_ms.saturating_sub(dt_ms);
            if e.remaining_ms == 0 {
                fired.push(e.kind);
                return false;
            }
            true
        });
        fired
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

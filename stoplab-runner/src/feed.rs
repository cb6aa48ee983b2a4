//! Scripted mark price feeds.
//!
//! A feed is a per-market sequence of ticks consumed in order. Scenarios
//! build feeds from their price paths; the fuzz sweep generates random-walk
//! feeds.

use chrono::{DateTime, Duration, Utc};
use stoplab_core::engine::Tick;

/// A pre-scripted sequence of mark-price ticks for one market.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    ticks: Vec<Tick>,
    cursor: usize,
}

impl ScriptedFeed {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self { ticks, cursor: 0 }
    }

    /// Build a feed from (seconds-after-start, mark) pairs.
    pub fn from_offsets(start: DateTime<Utc>, path: &[(i64, f64)]) -> Self {
        let ticks = path
            .iter()
            .map(|(secs, mark)| Tick::new(start + Duration::seconds(*secs), *mark))
            .collect();
        Self::new(ticks)
    }

    /// The next tick, if the script has not run out.
    pub fn next_tick(&mut self) -> Option<Tick> {
        let tick = self.ticks.get(self.cursor).copied();
        if tick.is_some() {
            self.cursor += 1;
        }
        tick
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len() - self.cursor
    }
}

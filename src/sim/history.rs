//! Movement history and the shadow that replays it

use std::collections::VecDeque;

use glam::IVec2;

use super::store::SectionStore;
use crate::pixel_to_grid;

/// One accepted player move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRecord {
    /// Pixel position the player moved to
    pub position: IVec2,
    /// Time of the move (seconds, active play time)
    pub timestamp: f64,
}

/// FIFO log of accepted moves waiting to be replayed
#[derive(Debug, Clone, Default)]
pub struct MovementHistory {
    entries: VecDeque<MoveRecord>,
}

impl MovementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move if the destination cell is open.
    ///
    /// Moves into walls (or unknown cells) are not recorded. Returns whether
    /// the move was accepted.
    pub fn record_move(&mut self, store: &SectionStore, position: IVec2, timestamp: f64) -> bool {
        if !store.get_cell(position).is_path() {
            return false;
        }
        // Timestamps never go backwards
        let timestamp = match self.entries.back() {
            Some(last) if last.timestamp > timestamp => last.timestamp,
            _ => timestamp,
        };
        self.entries.push_back(MoveRecord {
            position,
            timestamp,
        });
        true
    }

    /// Push every pending timestamp forward (time spent paused)
    pub fn shift_pending(&mut self, offset: f64) {
        for entry in &mut self.entries {
            entry.timestamp += offset;
        }
    }

    /// Pop every entry at least `delay` seconds old, returning the last one
    fn pop_due(&mut self, now: f64, delay: f64) -> (usize, Option<IVec2>) {
        let mut popped = 0;
        let mut last = None;
        while let Some(front) = self.entries.front() {
            if now - front.timestamp < delay {
                break;
            }
            last = Some(front.position);
            self.entries.pop_front();
            popped += 1;
        }
        (popped, last)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveRecord> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The delayed replay of the player
#[derive(Debug, Clone, Default)]
pub struct Shadow {
    /// `None` until the first recorded move has been replayed
    pub position: Option<IVec2>,
}

impl Shadow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay every move older than `delay`; only the newest one is shown.
    ///
    /// Returns how many moves were consumed.
    pub fn advance(&mut self, history: &mut MovementHistory, now: f64, delay: f64) -> usize {
        let (popped, last) = history.pop_due(now, delay);
        if let Some(position) = last {
            self.position = Some(position);
        }
        popped
    }

    /// Shadow stands on the same grid cell as `player`
    pub fn catches(&self, player: IVec2, cell_size: i32) -> bool {
        self.position
            .is_some_and(|pos| pixel_to_grid(pos, cell_size) == pixel_to_grid(player, cell_size))
    }
}

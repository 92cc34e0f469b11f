//! Game session state
//!
//! Everything one run of the chase owns: the maze window, the player, the
//! recorded moves and the shadow replaying them.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::DifficultyCurve;
use super::history::{MovementHistory, Shadow};
use super::store::SectionStore;
use crate::pixel_to_grid;
use crate::settings::Settings;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active play
    Playing,
    /// Pause menu open; shadow time is frozen
    Paused,
    /// Shadow caught the player
    GameOver,
}

/// One cell step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset in grid cells (y grows downward)
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Things the frontend reacts to (music, sound effects, screens)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The player made the first move of the run
    FirstMove,
    Paused,
    Resumed,
    /// The shadow caught the player
    GameOver { score: u32, shadow_delay: f64 },
    /// A fresh run started
    Restarted { game: u32 },
    Quit,
}

/// Complete state of one chase session
#[derive(Debug, Clone)]
pub struct GameState {
    settings: Settings,
    /// Run counter, starting at 1
    pub game: u32,
    /// Seed of the current run's maze
    pub seed: u64,
    pub store: SectionStore,
    pub history: MovementHistory,
    pub shadow: Shadow,
    /// Player pixel position (top-left of its cell)
    pub player: IVec2,
    /// Grid row the run started on
    start_row: i32,
    /// The player has moved at least once this run
    pub moved: bool,
    pub score: u32,
    /// Current shadow delay (seconds)
    pub shadow_delay: f64,
    pub phase: GamePhase,
    /// When the pause started
    pub paused_at: Option<f64>,
    /// When the run ended
    pub ended_at: Option<f64>,
    /// Cleared when the player quits
    pub running: bool,
    /// Pending events for the frontend
    pub events: Vec<GameEvent>,
    /// Autopilot randomness (kept apart from maze generation)
    pub(crate) rng: Pcg32,
    /// Time of the last autopilot move
    pub(crate) last_autopilot_move: f64,
    /// Cell the player came from (autopilot avoids stepping straight back)
    pub(crate) previous: Option<IVec2>,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self::with_game(settings, seed, 1)
    }

    fn with_game(settings: &Settings, seed: u64, game: u32) -> Self {
        let player = settings.player_start();
        let mut state = Self {
            settings: settings.clone(),
            game,
            seed,
            store: SectionStore::new(settings, seed),
            history: MovementHistory::new(),
            shadow: Shadow::new(),
            player,
            start_row: pixel_to_grid(player, settings.cell_size).y,
            moved: false,
            score: 0,
            shadow_delay: settings.difficulty.delay(0),
            phase: GamePhase::Playing,
            paused_at: None,
            ended_at: None,
            running: true,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_5ad0),
            last_autopilot_move: f64::NEG_INFINITY,
            previous: None,
        };
        let section = state.current_section();
        state.store.ensure_exists(section);
        log::info!("Game #{} started with seed {}", state.game, seed);
        state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn difficulty(&self) -> &DifficultyCurve {
        &self.settings.difficulty
    }

    /// Section the player stands in
    pub fn current_section(&self) -> i32 {
        self.store.section_for_y(self.player.y)
    }

    /// Sections a full-screen view around the player overlaps
    pub fn visible_sections(&self) -> [i32; 3] {
        let section = self.current_section();
        [section - 1, section, section + 1]
    }

    pub fn shadow_position(&self) -> Option<IVec2> {
        self.shadow.position
    }

    /// Rows climbed (or descended) from the start
    pub fn distance_score(&self) -> u32 {
        let row = pixel_to_grid(self.player, self.settings.cell_size).y;
        (self.start_row - row).unsigned_abs()
    }

    /// Try to step one cell; illegal moves are silently ignored.
    ///
    /// Returns whether the player moved.
    pub fn try_move(&mut self, direction: Direction, now: f64) -> bool {
        let candidate = self.player + direction.offset() * self.settings.cell_size;
        let section = self.store.section_for_y(candidate.y);
        self.store.ensure_exists(section);

        if !self.history.record_move(&self.store, candidate, now) {
            return false;
        }
        if !self.moved {
            self.moved = true;
            self.events.push(GameEvent::FirstMove);
        }
        self.previous = Some(self.player);
        self.player = candidate;
        true
    }

    /// Freeze shadow time
    pub fn pause(&mut self, now: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Paused;
        self.paused_at = Some(now);
        self.events.push(GameEvent::Paused);
        log::info!("Paused...");
    }

    /// Resume play; pending moves and the autopilot clock are shifted by the
    /// time spent paused
    pub fn resume(&mut self, now: f64) {
        if self.phase != GamePhase::Paused {
            return;
        }
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = (now - paused_at).max(0.0);
            self.history.shift_pending(paused_for);
            self.last_autopilot_move += paused_for;
        }
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Resumed);
        log::info!("Unpaused.");
    }

    /// End the run
    pub fn game_over(&mut self, now: f64) {
        self.phase = GamePhase::GameOver;
        self.ended_at = Some(now);
        self.events.push(GameEvent::GameOver {
            score: self.score,
            shadow_delay: self.shadow_delay,
        });
        self.log_summary();
    }

    /// Start a fresh run on a new maze, keeping the run counter going
    pub fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        let game = self.game + 1;
        let events = std::mem::take(&mut self.events);
        if self.phase != GamePhase::GameOver {
            self.log_summary();
        }
        log::info!("Restarting...");

        let settings = self.settings.clone();
        *self = GameState::with_game(&settings, seed, game);
        self.events = events;
        self.events.push(GameEvent::Restarted { game });
    }

    pub fn quit(&mut self) {
        if !self.running {
            return;
        }
        if self.phase == GamePhase::Playing || self.phase == GamePhase::Paused {
            self.log_summary();
        }
        self.running = false;
        self.events.push(GameEvent::Quit);
    }

    fn log_summary(&self) {
        log::info!("Game #{} score: {}", self.game, self.score);
        log::info!("Shadow Delay: {:.2}s", self.shadow_delay);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

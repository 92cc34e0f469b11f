//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time comes from the caller
//! - Stable iteration order (sections keyed by index)
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod generator;
pub mod grid;
pub mod history;
pub mod repair;
pub mod state;
pub mod store;
pub mod tick;

pub use difficulty::DifficultyCurve;
pub use generator::{GeneratorConfig, PathMemory, Section, SectionGenerator, carve_maze};
pub use grid::{Cell, Grid};
pub use history::{MoveRecord, MovementHistory, Shadow};
pub use repair::{RepairReport, merge_regions, repair};
pub use state::{Direction, GameEvent, GamePhase, GameState};
pub use store::SectionStore;
pub use tick::{Intent, TickInput, intent, tick};

//! Shadow Paradox - an endless maze chase against your own past
//!
//! Core modules:
//! - `sim`: Maze sections, connectivity repair, shadow replay and the frame tick
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::Settings;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Side length of one maze cell in pixels
    pub const GRID_SIZE: i32 = 50;
    /// Square play window in pixels (one section fills it exactly)
    pub const WINDOW_SIZE: i32 = 750;
    /// Frame rate the frontend ticks at
    pub const FPS: u32 = 60;

    /// Shadow delay at score 0 (seconds)
    pub const SHADOW_DELAY_INIT: f64 = 1.5;
    /// Allowed range for the initial delay
    pub const SHADOW_DELAY_MIN: f64 = 0.5;
    pub const SHADOW_DELAY_MAX: f64 = 3.0;
    /// Delay removed every `SCORE_INTERVAL` points
    pub const SHADOW_DELAY_STEP: f64 = 0.05;
    pub const SCORE_INTERVAL: u32 = 20;

    /// Entry/exit columns per section boundary
    pub const MINIMUM_PATHS: usize = 5;
    /// Sections further than this from the player are evicted
    pub const RETENTION_RADIUS: i32 = 2;
    /// Sections pre-generated on each side of the player
    pub const LOOKAHEAD: i32 = 1;

    /// Keys are ignored for this long after game over (seconds)
    pub const GAME_OVER_GRACE: f64 = 0.5;
}

/// Grid column/row containing a pixel position (y grows downward)
#[inline]
pub fn pixel_to_grid(pos: IVec2, cell_size: i32) -> IVec2 {
    IVec2::new(pos.x.div_euclid(cell_size), pos.y.div_euclid(cell_size))
}

/// Top-left pixel of a grid cell
#[inline]
pub fn grid_to_pixel(cell: IVec2, cell_size: i32) -> IVec2 {
    cell * cell_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_grid_negative() {
        assert_eq!(pixel_to_grid(IVec2::new(75, 99), 50), IVec2::new(1, 1));
        assert_eq!(pixel_to_grid(IVec2::new(0, -1), 50), IVec2::new(0, -1));
        assert_eq!(pixel_to_grid(IVec2::new(-50, -51), 50), IVec2::new(-1, -2));
    }

    #[test]
    fn test_grid_pixel_inverse() {
        let cell = IVec2::new(3, -7);
        assert_eq!(pixel_to_grid(grid_to_pixel(cell, 50), 50), cell);
    }
}

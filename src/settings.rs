//! Game settings and tuning
//!
//! Loaded once at startup (JSON) and handed to the simulation by reference.
//! Every field has a default taken from `consts`, so a settings file only
//! needs the values it changes.

use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::{DifficultyCurve, GeneratorConfig};

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cell size in pixels
    pub cell_size: i32,
    /// Maze width in cells
    pub width_cells: usize,
    /// Height of one section in cells
    pub section_height_cells: usize,
    /// Sections pre-generated on each side of the player
    pub lookahead: i32,

    /// Section generator tunables
    pub generator: GeneratorConfig,
    /// Shadow delay curve
    pub difficulty: DifficultyCurve,

    /// Seconds between autopilot moves (demo mode)
    pub autopilot_interval: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_size: GRID_SIZE,
            width_cells: (WINDOW_SIZE / GRID_SIZE) as usize,
            section_height_cells: (WINDOW_SIZE / GRID_SIZE) as usize,
            lookahead: LOOKAHEAD,

            generator: GeneratorConfig::default(),
            difficulty: DifficultyCurve::default(),

            autopilot_interval: 0.2,
        }
    }
}

impl Settings {
    /// Read and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.difficulty = DifficultyCurve::new(
            settings.difficulty.initial_delay,
            settings.difficulty.floor,
            settings.difficulty.step,
            settings.difficulty.score_interval,
        );
        settings.validate()?;
        Ok(settings)
    }

    /// Check every value is one the simulation can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size <= 0 {
            return Err(ConfigError::invalid("cell_size", "must be positive"));
        }
        if self.width_cells < 3 {
            return Err(ConfigError::invalid("width_cells", "need at least 3 columns"));
        }
        if self.section_height_cells < 3 {
            return Err(ConfigError::invalid(
                "section_height_cells",
                "need at least 3 rows",
            ));
        }
        // Pixel coordinates are i32, a whole section must be addressable
        let width = i32::try_from(self.width_cells)
            .map_err(|_| ConfigError::invalid("width_cells", "too many columns"))?;
        let height = i32::try_from(self.section_height_cells)
            .map_err(|_| ConfigError::invalid("section_height_cells", "too many rows"))?;
        if width.checked_mul(self.cell_size).is_none()
            || height.checked_mul(self.cell_size).is_none()
        {
            return Err(ConfigError::invalid(
                "cell_size",
                "section size in pixels overflows i32",
            ));
        }
        if !(0..=RETENTION_RADIUS).contains(&self.lookahead) {
            return Err(ConfigError::invalid(
                "lookahead",
                format!("must be between 0 and {RETENTION_RADIUS}"),
            ));
        }

        let generator = &self.generator;
        if generator.min_points == 0 {
            return Err(ConfigError::invalid("generator.min_points", "must be at least 1"));
        }
        if generator.max_points < generator.min_points {
            return Err(ConfigError::invalid(
                "generator.max_points",
                format!("must be at least min_points ({})", generator.min_points),
            ));
        }

        let difficulty = &self.difficulty;
        if !(difficulty.floor > 0.0) {
            return Err(ConfigError::invalid("difficulty.floor", "must be positive"));
        }
        if !(difficulty.step >= 0.0) {
            return Err(ConfigError::invalid("difficulty.step", "must not be negative"));
        }
        if difficulty.score_interval == 0 {
            return Err(ConfigError::invalid(
                "difficulty.score_interval",
                "must be at least 1",
            ));
        }
        if !(self.autopilot_interval > 0.0) {
            return Err(ConfigError::invalid("autopilot_interval", "must be positive"));
        }
        Ok(())
    }

    /// Height of one section in pixels
    pub fn section_pixels(&self) -> i32 {
        self.section_height_cells as i32 * self.cell_size
    }

    /// Where the player spawns: second column, one cell above the bottom row
    /// of the starting section
    pub fn player_start(&self) -> IVec2 {
        IVec2::new(self.cell_size, self.section_pixels() - 2 * self.cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.width_cells, 15);
        assert_eq!(settings.section_height_cells, 15);
        assert_eq!(settings.player_start(), IVec2::new(50, 650));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(
            r#"{ "width_cells": 21, "generator": { "min_points": 3, "max_points": 6 } }"#,
        )
        .unwrap();
        assert_eq!(settings.width_cells, 21);
        assert_eq!(settings.section_height_cells, 15);
        assert_eq!(settings.generator.min_points, 3);
        assert_eq!(settings.generator.proximity, 2);
        assert_eq!(settings.difficulty, DifficultyCurve::default());
    }

    #[test]
    fn test_initial_delay_clamped() {
        let settings = Settings::from_json(r#"{ "difficulty": { "initial_delay": 9.0 } }"#).unwrap();
        assert_eq!(settings.difficulty.initial_delay, SHADOW_DELAY_MAX);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "width_cells": 2 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "width_cells", .. }));

        let err = Settings::from_json(r#"{ "cell_size": 2000000000 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cell_size", .. }));

        let err = Settings::from_json(r#"{ "section_height_cells": 3000000000 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "section_height_cells", .. }
        ));

        let err = Settings::from_json(r#"{ "lookahead": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "lookahead", .. }));

        let err =
            Settings::from_json(r#"{ "generator": { "min_points": 4, "max_points": 2 } }"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "generator.max_points", .. }));

        let err = Settings::from_json(r#"{ "difficulty": { "score_interval": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("score_interval"));
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(
            Settings::from_json("{ not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
        assert!(matches!(
            Settings::load("/definitely/not/here.json").unwrap_err(),
            ConfigError::Io { .. }
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}

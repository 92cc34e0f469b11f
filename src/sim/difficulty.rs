//! Shadow delay as a function of score

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Step-wise shrinking shadow delay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    /// Delay at score 0 (seconds)
    pub initial_delay: f64,
    /// Delay never drops below this (seconds)
    pub floor: f64,
    /// Delay removed per completed interval (seconds)
    pub step: f64,
    /// Points per interval
    pub score_interval: u32,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            initial_delay: SHADOW_DELAY_INIT,
            floor: SHADOW_DELAY_MIN,
            step: SHADOW_DELAY_STEP,
            score_interval: SCORE_INTERVAL,
        }
    }
}

impl DifficultyCurve {
    /// Build a curve, clamping the starting delay into the supported range
    pub fn new(initial_delay: f64, floor: f64, step: f64, score_interval: u32) -> Self {
        Self {
            initial_delay: initial_delay.clamp(SHADOW_DELAY_MIN, SHADOW_DELAY_MAX),
            floor,
            step,
            score_interval,
        }
    }

    /// `max(floor, initial - step * floor(score / interval))`
    pub fn delay(&self, score: u32) -> f64 {
        let intervals = score / self.score_interval.max(1);
        (self.initial_delay - self.step * intervals as f64).max(self.floor)
    }
}

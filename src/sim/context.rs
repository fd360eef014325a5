//! Shared simulation context
//!
//! The global knobs every entity and task read each tick: the difficulty
//! multiplier, the time-scale factor, and the power-up flags. Only the
//! session controller writes these; a time-scale write must be followed by
//! re-rating the level's in-flight tween tasks (see `Tweener::set_rate`).

use serde::{Deserialize, Serialize};

/// Global simulation state passed by reference into every update call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimContext {
    /// Scalar applied to all scripted velocities and (inverted) durations
    pub difficulty: f64,
    /// Global simulation speed factor (slow-time effect)
    pub time_scale: f64,
    /// Intangibility power-up collected but not yet triggered
    pub intangible_armed: bool,
    /// Intangibility currently in effect (interactions suppressed)
    pub intangible_active: bool,
    /// Slow-time power-up collected but not yet triggered
    pub slowtime_armed: bool,
    /// Slow-time currently in effect
    pub slowtime_active: bool,
}

impl Default for SimContext {
    fn default() -> Self {
        Self {
            difficulty: 1.0,
            time_scale: 1.0,
            intangible_armed: false,
            intangible_active: false,
            slowtime_armed: false,
            slowtime_active: false,
        }
    }
}

impl SimContext {
    /// Context with a specific difficulty multiplier
    pub fn with_difficulty(difficulty: f64) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

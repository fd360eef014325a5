//! Shardstorm - a reflex/precision arcade game
//!
//! Core modules:
//! - `sim`: Deterministic level simulation (kinematics, entity catalog,
//!   scripting, level/session state machines)
//! - `settings`: Difficulty presets and session preferences
//! - `achievements`: In-memory score board and achievement log
//! - `levels`: Bundled level scripts in the tuple wire format

pub mod achievements;
pub mod levels;
pub mod settings;
pub mod sim;

pub use achievements::{Achievement, AchievementLog, ScoreBoard};
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f64 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Screen dimensions; y grows downward, (0, 0) is the top-left corner
    pub const SCREEN_W: f64 = 800.0;
    pub const SCREEN_H: f64 = 600.0;
    /// Entities are culled once past the bottom edge by this margin
    pub const BOTTOM_MARGIN: f64 = 60.0;
    /// An entity counts as on screen once its y passes this line
    pub const VISIBLE_Y: f64 = 0.0;

    /// Death fade duration (seconds)
    pub const DEATH_FADE_SECS: f64 = 0.4;
    /// Resource bar refill sweep while hovered (seconds, empty to full)
    pub const RESOURCE_REFILL_SECS: f64 = 4.0;
    /// Resource bar depletion sweep while unhovered (seconds, full to empty)
    pub const RESOURCE_DEPLETE_SECS: f64 = 8.0;
    /// Delay between a level outcome and the next-level/retry transition
    pub const OUTCOME_DELAY_SECS: f64 = 2.0;

    /// Intangibility duration once triggered (seconds)
    pub const INTANGIBLE_SECS: f64 = 5.0;
    /// Slow-time duration once triggered (seconds)
    pub const SLOWTIME_SECS: f64 = 4.0;
    /// Global time-scale factor while slow-time is active
    pub const SLOWTIME_FACTOR: f64 = 0.5;

    /// Orbit velocity recompute sub-interval (seconds)
    pub const ORBIT_RECOMPUTE_SECS: f64 = 1.0 / 30.0;

    /// Side length of the target triangle
    pub const TARGET_SIDE: f64 = 48.0;
    /// Fixed orientation offset of the target triangle (apex toward the top)
    pub const TARGET_ORIENT_OFFSET: f64 = -std::f64::consts::FRAC_PI_2;
    /// Citizen square half-extent
    pub const CITIZEN_HALF: f64 = 28.0;
    /// Resource zone square half-extent
    pub const ZONE_HALF: f64 = 40.0;
    /// Power-up pentagon circumradius
    pub const POWERUP_RADIUS: f64 = 26.0;
    /// Base fill opacity of concealed targets
    pub const CONCEALED_OPACITY: f64 = 0.06;

    /// Per-level difficulty ramp applied on top of the preset multiplier
    pub const DIFFICULTY_RAMP: f64 = 0.08;
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

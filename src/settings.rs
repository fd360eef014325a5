//! Session settings and difficulty presets

use serde::{Deserialize, Serialize};

/// Difficulty presets, each mapping to a global multiplier applied to all
/// scripted velocities and (inverted) animation durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Standard,
    Frantic,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Standard => "Standard",
            Difficulty::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "standard" | "normal" => Some(Difficulty::Standard),
            "frantic" | "hard" => Some(Difficulty::Frantic),
            _ => None,
        }
    }

    /// The session-start difficulty multiplier
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Relaxed => 0.75,
            Difficulty::Standard => 1.0,
            Difficulty::Frantic => 1.3,
        }
    }
}

/// Session preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Forward sound events to the audio collaborator
    pub sound: bool,
    /// Draw the score/threshold HUD text
    pub show_hud: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Standard,
            sound: true,
            show_hud: true,
        }
    }
}

impl Settings {
    /// Settings for a specific difficulty preset
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trip() {
        for d in [Difficulty::Relaxed, Difficulty::Standard, Difficulty::Frantic] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("hard"), Some(Difficulty::Frantic));
        assert_eq!(Difficulty::from_str("impossible"), None);
    }

    #[test]
    fn test_multipliers_ordered() {
        assert!(Difficulty::Relaxed.multiplier() < Difficulty::Standard.multiplier());
        assert!(Difficulty::Standard.multiplier() < Difficulty::Frantic.multiplier());
    }
}

//! Session controller
//!
//! Sequences levels, owns the shared simulation context (difficulty and
//! time-scale are written here and nowhere else), runs the power-up
//! countdowns, and keeps the score/achievement books. Consumes the level
//! controller's outcome and drives the next-level / retry transition after
//! the banner delay.

use glam::DVec2;

use super::context::SimContext;
use super::entity::EntityId;
use super::level::{Level, Outcome, SimEvent};
use super::script::{ScriptError, ScriptLine, parse_script};
use crate::achievements::{AchievementLog, ScoreBoard};
use crate::consts::*;
use crate::settings::Settings;

/// Where the session currently is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    /// A level is live
    Level,
    /// Outcome banner showing; transition when the delay elapses
    Interlude { secs_left: f64, outcome: Outcome },
    /// All scripts cleared
    Finished,
}

/// One play session over an ordered list of level scripts
#[derive(Debug)]
pub struct Session {
    pub ctx: SimContext,
    pub level: Level,
    pub level_index: usize,
    pub total_score: i64,
    pub scoreboard: ScoreBoard,
    pub achievements: AchievementLog,
    pub phase: SessionPhase,
    scripts: Vec<Vec<ScriptLine>>,
    base_difficulty: f64,
    intangible_left: f64,
    slowtime_left: f64,
    events: Vec<SimEvent>,
}

impl Session {
    /// Parse every script up front; malformed data aborts the session
    /// before anything runs
    pub fn from_sources(settings: &Settings, sources: &[&str]) -> Result<Self, ScriptError> {
        let scripts = sources
            .iter()
            .map(|s| parse_script(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(settings, scripts))
    }

    pub fn new(settings: &Settings, scripts: Vec<Vec<ScriptLine>>) -> Self {
        let base_difficulty = settings.difficulty.multiplier();
        let mut session = Self {
            ctx: SimContext::with_difficulty(base_difficulty),
            level: Level::new(),
            level_index: 0,
            total_score: 0,
            scoreboard: ScoreBoard::new(),
            achievements: AchievementLog::new(),
            phase: SessionPhase::Level,
            scripts,
            base_difficulty,
            intangible_left: 0.0,
            slowtime_left: 0.0,
            events: Vec::new(),
        };
        if session.scripts.is_empty() {
            session.phase = SessionPhase::Finished;
        } else {
            session.load_level();
        }
        session
    }

    /// (Re)load the current script: reset power-up state, recompute the
    /// difficulty multiplier, and rebuild the level (which drops every
    /// in-flight task of the previous attempt)
    fn load_level(&mut self) {
        self.ctx.difficulty =
            self.base_difficulty * (1.0 + DIFFICULTY_RAMP * self.level_index as f64);
        self.ctx.time_scale = 1.0;
        self.ctx.intangible_armed = false;
        self.ctx.intangible_active = false;
        self.ctx.slowtime_armed = false;
        self.ctx.slowtime_active = false;
        self.intangible_left = 0.0;
        self.slowtime_left = 0.0;

        self.level.load(&self.scripts[self.level_index], &self.ctx);
        self.level.tweener.set_rate(self.ctx.time_scale);
        log::info!(
            "Starting level {} (difficulty {:.2})",
            self.level_index + 1,
            self.ctx.difficulty
        );
    }

    /// Advance the session by one tick
    pub fn update(&mut self, dt: f64) {
        // Power-up countdowns run on wall-clock time, unaffected by the
        // time-scale they control
        if self.ctx.slowtime_active {
            self.slowtime_left -= dt;
            if self.slowtime_left <= 0.0 {
                self.ctx.slowtime_active = false;
                self.set_time_scale(1.0);
                log::info!("Slow-time expired");
            }
        }
        if self.ctx.intangible_active {
            self.intangible_left -= dt;
            if self.intangible_left <= 0.0 {
                self.ctx.intangible_active = false;
                log::info!("Intangibility expired");
                // Deliver the hover the pointer is already resting on
                self.level.catch_up_hover(&mut self.ctx);
            }
        }

        match self.phase {
            SessionPhase::Level => {
                self.level.update(&self.ctx, dt);
                self.collect_level_events();
                if let Some(outcome) = self.level.outcome {
                    if outcome == Outcome::Cleared {
                        self.total_score += i64::from(self.level.score);
                    }
                    self.phase = SessionPhase::Interlude {
                        secs_left: OUTCOME_DELAY_SECS,
                        outcome,
                    };
                }
            }
            SessionPhase::Interlude { secs_left, outcome } => {
                let secs_left = secs_left - dt;
                if secs_left > 0.0 {
                    self.phase = SessionPhase::Interlude { secs_left, outcome };
                } else if outcome == Outcome::Cleared {
                    self.level_index += 1;
                    if self.level_index >= self.scripts.len() {
                        self.finish();
                    } else {
                        self.phase = SessionPhase::Level;
                        self.load_level();
                    }
                } else {
                    // Retry the same script at the same difficulty
                    self.phase = SessionPhase::Level;
                    self.load_level();
                }
            }
            SessionPhase::Finished => {}
        }
    }

    fn collect_level_events(&mut self) {
        for event in self.level.drain_events() {
            match event {
                SimEvent::AchievementUnlocked(achievement) => {
                    // Deduplicated: each achievement is announced once per
                    // session
                    if self.achievements.unlock(achievement) {
                        self.events.push(SimEvent::AchievementUnlocked(achievement));
                    }
                }
                other => self.events.push(other),
            }
        }
    }

    fn finish(&mut self) {
        self.phase = SessionPhase::Finished;
        let rank = self
            .scoreboard
            .add_score(self.total_score, self.scripts.len() as u32);
        log::info!(
            "Session finished: total score {} (rank {:?})",
            self.total_score,
            rank
        );
    }

    /// Keyboard trigger: consume an armed intangibility power-up
    pub fn trigger_intangible(&mut self) -> bool {
        if !self.ctx.intangible_armed || self.ctx.intangible_active {
            return false;
        }
        self.ctx.intangible_armed = false;
        self.ctx.intangible_active = true;
        self.intangible_left = INTANGIBLE_SECS;
        log::info!("Intangibility active for {INTANGIBLE_SECS}s");
        true
    }

    /// Keyboard trigger: consume an armed slow-time power-up
    pub fn trigger_slowtime(&mut self) -> bool {
        if !self.ctx.slowtime_armed || self.ctx.slowtime_active {
            return false;
        }
        self.ctx.slowtime_armed = false;
        self.ctx.slowtime_active = true;
        self.slowtime_left = SLOWTIME_SECS;
        self.set_time_scale(SLOWTIME_FACTOR);
        log::info!("Slow-time active for {SLOWTIME_SECS}s");
        true
    }

    /// The only place the time-scale is written; the write propagates to
    /// every in-flight tween task immediately
    fn set_time_scale(&mut self, scale: f64) {
        self.ctx.time_scale = scale;
        self.level.tweener.set_rate(scale);
    }

    pub fn hover(&mut self, id: EntityId) {
        self.level.hover(id, &mut self.ctx);
    }

    pub fn click(&mut self, id: EntityId) {
        self.level.click(id, &mut self.ctx);
    }

    pub fn set_cursor(&mut self, pos: DVec2) {
        self.level.set_cursor(pos);
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Finished)
    }

    /// Queued signals for the presentation layer
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

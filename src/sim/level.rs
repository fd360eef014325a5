//! Level controller
//!
//! Owns the live entity set for the current level, routes pointer events to
//! entities, tracks the spared-class flags, advances everything per tick,
//! and reports the outcome. Ordering guarantee: within one tick all
//! entities advance before any removal is purged, and the purge runs before
//! the clearance check, so clearance is evaluated at most once per tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::context::SimContext;
use super::entity::{Entity, EntityId, OrbitMotion};
use super::kind::{EntityKind, PowerUpKind, SparedClass};
use super::script::{ScriptLine, SpawnSpec};
use super::tween::{Easing, Repeat, TweenTarget, TweenTask, Tweener};
use crate::achievements::Achievement;
use crate::consts::*;

/// Fire-and-forget sound triggers for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    /// A target popped
    Pop,
    /// An armored target lost a tier
    ArmorHit,
    /// A citizen or obstacle was hit
    Penalty,
    /// A power-up was collected
    PowerUpCollect,
}

/// Level outcome with its HUD banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Cleared,
    Failed,
}

impl Outcome {
    pub fn banner_text(self) -> &'static str {
        match self {
            Outcome::Cleared => "LEVEL CLEAR",
            Outcome::Failed => "LEVEL FAILED",
        }
    }

    /// RGBA banner color for the HUD text
    pub fn banner_color(self) -> [f32; 4] {
        match self {
            Outcome::Cleared => [0.30, 0.90, 0.40, 1.0],
            Outcome::Failed => [0.95, 0.25, 0.20, 1.0],
        }
    }
}

/// Signals consumed by the presentation collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Sound(SoundKind),
    /// An armored target dropped to a new tier; the visual asset for
    /// `remaining` hits should be regenerated
    ArmoredTierChanged { id: EntityId, remaining: u32 },
    ResourceBarShown,
    ResourceBarHidden,
    /// The resource bar fully depleted; the level score was reset to zero
    ResourceDrained,
    LevelOutcome {
        outcome: Outcome,
        score: i32,
        threshold: i32,
    },
    AchievementUnlocked(Achievement),
}

/// Per-class "untouched so far" flags
///
/// A flag goes false the first time its class is spawned or interacted
/// with, and is restored when an entity of the class leaves the screen
/// untouched. At clearance, a false flag means the class existed and was
/// fully eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparedFlags {
    pub target: bool,
    pub citizen: bool,
    pub obstacle: bool,
}

impl Default for SparedFlags {
    fn default() -> Self {
        Self {
            target: true,
            citizen: true,
            obstacle: true,
        }
    }
}

/// The live state of one level attempt
#[derive(Debug)]
pub struct Level {
    /// Spawn order; purged in batch each tick
    pub entities: Vec<Entity>,
    pub pass_threshold: i32,
    pub score: i32,
    pub spared: SparedFlags,
    /// Global blackout overlay alpha, driven by script fade cycles
    pub blackout: f64,
    /// The level's animation schedule; dropped wholesale on reload
    pub tweener: Tweener,
    /// Last known pointer position (for the resource zone and the
    /// intangibility catch-up pass)
    pub cursor: Option<DVec2>,
    /// Resource bar fill in [0, 1]
    pub resource_fill: f64,
    resource_shown: bool,
    pub outcome: Option<Outcome>,
    next_id: EntityId,
    events: Vec<SimEvent>,
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            pass_threshold: 0,
            score: 0,
            spared: SparedFlags::default(),
            blackout: 0.0,
            tweener: Tweener::new(),
            cursor: None,
            resource_fill: 1.0,
            resource_shown: false,
            outcome: None,
            next_id: 0,
            events: Vec::new(),
        }
    }

    /// Reset and populate from script data.
    ///
    /// Replacing the tweener cancels every in-flight task from the previous
    /// load on all paths, so stale animations can never fire into the new
    /// level. Entity ids restart from zero.
    pub fn load(&mut self, lines: &[ScriptLine], ctx: &SimContext) {
        *self = Self::new();

        for line in lines {
            match line {
                ScriptLine::PassThreshold(threshold) => self.pass_threshold = *threshold,
                ScriptLine::Blackout(cycles) => {
                    for cycle in cycles {
                        self.tweener.schedule(TweenTask {
                            target: TweenTarget::Blackout,
                            delay: cycle.delay / ctx.difficulty,
                            duration: cycle.duration / ctx.difficulty,
                            from: Some(0.0),
                            to: 1.0,
                            easing: Easing::SineInOut,
                            repeat: Repeat::Count(cycle.repeats),
                            yoyo: true,
                        });
                    }
                }
                ScriptLine::Obstacle(spec) => {
                    let id = self.alloc_id();
                    let mut entity = Entity::new(
                        id,
                        EntityKind::Obstacle {
                            points: spec.points.clone(),
                        },
                        spec.origin,
                    );
                    entity.primary_velocity = DVec2::new(0.0, spec.vertical_velocity);
                    self.mark_class_touched(entity.kind.spared_class());
                    self.entities.push(entity);
                }
                ScriptLine::Spawn(spec) => self.spawn(spec, ctx),
            }
        }

        log::info!(
            "Loaded level: {} entities, pass threshold {}",
            self.entities.len(),
            self.pass_threshold
        );
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Instantiate a length-10 spawn line: the entity plus its animation
    /// directives, with every delay and duration divided by the difficulty
    /// multiplier at schedule time
    fn spawn(&mut self, spec: &SpawnSpec, ctx: &SimContext) {
        let id = self.alloc_id();
        let mut entity = Entity::new(id, spec.kind.clone(), spec.position);
        entity.primary_velocity = spec.velocity;
        entity.angular_velocity = spec.angular_velocity;
        if let Some(orbit) = spec.orbit {
            entity.orbit = Some(OrbitMotion::new(orbit.radius, orbit.angular_speed, orbit.phase));
        }
        self.mark_class_touched(entity.kind.spared_class());

        let d = ctx.difficulty;
        for ramp in &spec.velocity_ramps {
            self.tweener.schedule(TweenTask {
                target: TweenTarget::PrimaryVelX(id),
                delay: ramp.delay / d,
                duration: ramp.duration / d,
                from: None,
                to: ramp.to.x,
                easing: Easing::Linear,
                repeat: Repeat::None,
                yoyo: false,
            });
            self.tweener.schedule(TweenTask {
                target: TweenTarget::PrimaryVelY(id),
                delay: ramp.delay / d,
                duration: ramp.duration / d,
                from: None,
                to: ramp.to.y,
                easing: Easing::Linear,
                repeat: Repeat::None,
                yoyo: false,
            });
        }
        for ramp in &spec.scale_ramps {
            self.tweener.schedule(TweenTask {
                target: TweenTarget::Scale(id),
                delay: ramp.delay / d,
                duration: ramp.duration / d,
                from: None,
                to: ramp.to,
                easing: Easing::QuadOut,
                repeat: Repeat::None,
                yoyo: false,
            });
        }
        for osc in &spec.oscillations {
            if osc.amplitude.x != 0.0 {
                self.tweener.schedule(TweenTask {
                    target: TweenTarget::SecondaryVelX(id),
                    delay: osc.delay / d,
                    duration: osc.duration / d,
                    from: Some(0.0),
                    to: osc.amplitude.x,
                    easing: Easing::SineInOut,
                    repeat: Repeat::Infinite,
                    yoyo: true,
                });
            }
            if osc.amplitude.y != 0.0 {
                self.tweener.schedule(TweenTask {
                    target: TweenTarget::SecondaryVelY(id),
                    delay: osc.delay / d,
                    duration: osc.duration / d,
                    from: Some(0.0),
                    to: osc.amplitude.y,
                    easing: Easing::SineInOut,
                    repeat: Repeat::Infinite,
                    yoyo: true,
                });
            }
        }

        self.entities.push(entity);
    }

    /// Scripted spawn or interaction marks a class as touched
    fn mark_class_touched(&mut self, class: Option<SparedClass>) {
        match class {
            Some(SparedClass::Target) => self.spared.target = false,
            Some(SparedClass::Citizen) => self.spared.citizen = false,
            Some(SparedClass::Obstacle) => self.spared.obstacle = false,
            None => {}
        }
    }

    /// An entity of a class left the level untouched
    fn restore_spared(&mut self, class: Option<SparedClass>) {
        match class {
            Some(SparedClass::Target) => self.spared.target = true,
            Some(SparedClass::Citizen) => self.spared.citizen = true,
            Some(SparedClass::Obstacle) => self.spared.obstacle = true,
            None => {}
        }
    }

    fn alive_index(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id && e.is_alive())
    }

    /// Latest pointer position from the presentation layer
    pub fn set_cursor(&mut self, pos: DVec2) {
        self.cursor = Some(pos);
    }

    /// Pointer entered an entity. Events against entities already dying or
    /// removed are silently ignored.
    pub fn hover(&mut self, id: EntityId, ctx: &mut SimContext) {
        let Some(idx) = self.alive_index(id) else {
            return;
        };
        match self.entities[idx].kind {
            // Continuous hover handled per tick in update_resource
            EntityKind::ResourceZone => {}
            _ if ctx.intangible_active => {}
            // Hover highlights only; the hit needs an explicit click
            EntityKind::ArmoredTarget { .. } => self.entities[idx].highlighted = true,
            _ => self.apply_consequence(idx, ctx),
        }
    }

    /// Explicit click on an entity (the only way to damage armored targets)
    pub fn click(&mut self, id: EntityId, ctx: &mut SimContext) {
        let Some(idx) = self.alive_index(id) else {
            return;
        };
        if ctx.intangible_active {
            return;
        }
        match self.entities[idx].kind {
            EntityKind::ResourceZone => {}
            EntityKind::ArmoredTarget { .. } => self.armored_hit(idx),
            _ => self.apply_consequence(idx, ctx),
        }
    }

    /// One catch-up containment pass when intangibility ends: hover
    /// transitions are edge-triggered, so an entity the pointer is already
    /// resting over would otherwise never receive its interaction
    pub fn catch_up_hover(&mut self, ctx: &mut SimContext) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let ids: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| {
                e.is_alive()
                    && !matches!(
                        e.kind,
                        EntityKind::ArmoredTarget { .. } | EntityKind::ResourceZone
                    )
                    && e.contains_point(cursor)
            })
            .map(|e| e.id)
            .collect();
        for id in ids {
            if let Some(idx) = self.alive_index(id) {
                self.apply_consequence(idx, ctx);
            }
        }
    }

    fn armored_hit(&mut self, idx: usize) {
        let id = self.entities[idx].id;
        let EntityKind::ArmoredTarget { remaining_hits } = &mut self.entities[idx].kind else {
            return;
        };
        if *remaining_hits == 0 {
            return;
        }
        *remaining_hits -= 1;
        let remaining = *remaining_hits;
        self.spared.target = false;
        if remaining == 0 {
            self.score += 1;
            self.entities[idx].begin_dying();
            self.events.push(SimEvent::Sound(SoundKind::Pop));
        } else {
            self.events
                .push(SimEvent::ArmoredTierChanged { id, remaining });
            self.events.push(SimEvent::Sound(SoundKind::ArmorHit));
        }
    }

    /// Variant-specific interaction consequence
    fn apply_consequence(&mut self, idx: usize, ctx: &mut SimContext) {
        match self.entities[idx].kind.clone() {
            EntityKind::Target | EntityKind::ConcealedTarget => {
                self.score += 1;
                self.spared.target = false;
                self.entities[idx].begin_dying();
                self.events.push(SimEvent::Sound(SoundKind::Pop));
            }
            EntityKind::Citizen => {
                self.score -= 1;
                self.spared.citizen = false;
                self.entities[idx].begin_dying();
                self.events.push(SimEvent::Sound(SoundKind::Penalty));
            }
            EntityKind::Obstacle { .. } => {
                self.score -= 1;
                self.spared.obstacle = false;
                self.entities[idx].begin_dying();
                self.events.push(SimEvent::Sound(SoundKind::Penalty));
            }
            EntityKind::PowerUp(power) => {
                self.entities[idx].begin_dying();
                self.events.push(SimEvent::Sound(SoundKind::PowerUpCollect));
                match power {
                    PowerUpKind::ClearFriendlies => self.clear_friendlies(),
                    PowerUpKind::Intangibility => ctx.intangible_armed = true,
                    PowerUpKind::SlowTime => ctx.slowtime_armed = true,
                }
            }
            // Routed by the dispatchers above, never here
            EntityKind::ArmoredTarget { .. } | EntityKind::ResourceZone => {}
        }
    }

    /// Force-remove every visible citizen and obstacle, bypassing the fade.
    /// Off-screen ones (still above the top edge) are untouched.
    fn clear_friendlies(&mut self) {
        let mut removed = 0;
        for entity in &mut self.entities {
            if entity.is_alive() && entity.kind.is_friendly() && entity.position.y > VISIBLE_Y {
                entity.force_remove();
                removed += 1;
            }
        }
        log::debug!("Clear-friendlies removed {removed} entities");
    }

    /// Advance the whole level by one tick
    pub fn update(&mut self, ctx: &SimContext, dt: f64) {
        if self.outcome.is_some() {
            return;
        }

        // 1. Animation tasks first, then kinematics
        self.tweener
            .advance(dt, &mut self.entities, &mut self.blackout);
        for entity in &mut self.entities {
            entity.advance(ctx, dt);
        }

        // 2. Stall detection: a script that can never empty itself
        if self.should_force_clear(ctx) {
            self.force_clear();
        }

        // 3. Lower-boundary cull; survivors restore their class flag
        self.cull_below_screen();

        // 4. Resource zone visibility and fill
        self.update_resource(ctx, dt);

        // 5. Purge, then clearance - at most once per tick
        let before = self.entities.len();
        for entity in &self.entities {
            if entity.is_removed() {
                self.tweener.drop_entity(entity.id);
            }
        }
        self.entities.retain(|e| !e.is_removed());
        if self.entities.len() != before && self.entities.is_empty() {
            self.check_clearance();
        }
    }

    /// True when only obstacles (or the resource zone) remain and none of
    /// the obstacles is descending: no natural end condition can occur
    fn should_force_clear(&self, ctx: &SimContext) -> bool {
        if self.entities.is_empty() {
            return false;
        }
        let mut any_descending = false;
        for entity in &self.entities {
            match entity.kind {
                EntityKind::Obstacle { .. } => {
                    if entity.effective_velocity(ctx).y > 0.0 {
                        any_descending = true;
                    }
                }
                EntityKind::ResourceZone => {}
                _ => return false,
            }
        }
        !any_descending
    }

    /// Deterministic timeout: remove everything without the removal sound
    fn force_clear(&mut self) {
        log::info!(
            "Force-clearing stalled level ({} entities)",
            self.entities.len()
        );
        for idx in 0..self.entities.len() {
            if self.entities[idx].is_removed() {
                continue;
            }
            let class = if self.entities[idx].is_alive() {
                self.entities[idx].kind.spared_class()
            } else {
                None
            };
            let is_zone = matches!(self.entities[idx].kind, EntityKind::ResourceZone);
            self.entities[idx].force_remove();
            self.restore_spared(class);
            if is_zone {
                self.hide_resource_bar();
            }
        }
    }

    fn cull_below_screen(&mut self) {
        for idx in 0..self.entities.len() {
            if !self.entities[idx].is_alive() {
                continue;
            }
            if self.entities[idx].position.y <= SCREEN_H + BOTTOM_MARGIN {
                continue;
            }
            let class = self.entities[idx].kind.spared_class();
            let is_zone = matches!(self.entities[idx].kind, EntityKind::ResourceZone);
            self.entities[idx].force_remove();
            self.restore_spared(class);
            if is_zone {
                self.hide_resource_bar();
            }
        }
    }

    fn hide_resource_bar(&mut self) {
        if self.resource_shown {
            self.resource_shown = false;
            self.events.push(SimEvent::ResourceBarHidden);
        }
    }

    fn update_resource(&mut self, ctx: &SimContext, dt: f64) {
        let Some(idx) = self
            .entities
            .iter()
            .position(|e| e.is_alive() && matches!(e.kind, EntityKind::ResourceZone))
        else {
            return;
        };

        if self.entities[idx].position.y > VISIBLE_Y && !self.resource_shown {
            self.resource_shown = true;
            self.events.push(SimEvent::ResourceBarShown);
        }
        if !self.resource_shown {
            return;
        }

        // Hover is continuous containment, unaffected by intangibility
        let hovered = self
            .cursor
            .is_some_and(|c| self.entities[idx].contains_point(c));
        let step = dt * ctx.time_scale;
        if hovered {
            self.resource_fill = (self.resource_fill + step / RESOURCE_REFILL_SECS).min(1.0);
        } else {
            let before = self.resource_fill;
            self.resource_fill = (self.resource_fill - step / RESOURCE_DEPLETE_SECS).max(0.0);
            if before > 0.0 && self.resource_fill == 0.0 {
                // Full depletion wipes the level score
                self.score = 0;
                self.events.push(SimEvent::ResourceDrained);
            }
        }
    }

    /// Only ever invoked when the live count reaches zero
    fn check_clearance(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let outcome = if self.score >= self.pass_threshold {
            Outcome::Cleared
        } else {
            Outcome::Failed
        };
        self.outcome = Some(outcome);
        log::info!(
            "Level outcome: {:?} (score {}, threshold {})",
            outcome,
            self.score,
            self.pass_threshold
        );
        self.events.push(SimEvent::LevelOutcome {
            outcome,
            score: self.score,
            threshold: self.pass_threshold,
        });

        // A false flag means the class existed and was fully eliminated
        if !self.spared.citizen && !self.spared.obstacle {
            self.events
                .push(SimEvent::AchievementUnlocked(Achievement::NoSurvivors));
            if !self.spared.target {
                self.events
                    .push(SimEvent::AchievementUnlocked(Achievement::TotalClearance));
            }
        }
    }

    /// Hand the queued events to the presentation layer
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

//! Kinematic entity
//!
//! An entity composes three independent velocity sources each tick:
//! the scripted primary velocity (difficulty-scaled), the oscillating
//! secondary velocity (driven by yoyo tween tasks), and the analytic
//! orbital velocity (recomputed from circular motion every fixed
//! sub-interval). The whole sum is scaled by the global time-scale factor.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::context::SimContext;
use super::kind::EntityKind;
use crate::consts::*;

/// Per-level entity identifier, reset on every level load (diagnostic only)
pub type EntityId = u32;

/// One-way lifecycle: Alive -> Dying -> Removed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    /// Fixed-duration fade; `elapsed` is in scaled seconds
    Dying { elapsed: f64 },
    /// Purged from the live set on the next housekeeping pass
    Removed,
}

/// Analytic circular-motion component
///
/// Not tweened: the tangential velocity is recomputed from the current
/// orbit angle every `ORBIT_RECOMPUTE_SECS`, so the motion can be restarted
/// consistently from an explicit start phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitMotion {
    pub radius: f64,
    pub angular_speed: f64,
    pub phase: f64,
    theta: f64,
    accumulator: f64,
}

impl OrbitMotion {
    pub fn new(radius: f64, angular_speed: f64, phase: f64) -> Self {
        Self {
            radius,
            angular_speed,
            phase,
            theta: phase,
            // Force a recompute on the very first tick
            accumulator: ORBIT_RECOMPUTE_SECS,
        }
    }

    /// Advance the orbit angle; returns the fresh tangential velocity when
    /// the sub-interval elapsed, `None` while the cached value still holds
    fn advance(&mut self, time_scale: f64, dt: f64) -> Option<DVec2> {
        self.theta += self.angular_speed * time_scale * dt;
        self.accumulator += dt;
        if self.accumulator < ORBIT_RECOMPUTE_SECS {
            return None;
        }
        self.accumulator = 0.0;
        let speed = self.radius * self.angular_speed;
        Some(DVec2::new(-self.theta.sin(), self.theta.cos()) * speed)
    }
}

/// A spawned game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: DVec2,
    /// Radians
    pub rotation: f64,
    pub scale_factor: f64,
    /// Current fill opacity (base opacity times the lifecycle fade)
    pub opacity: f64,
    /// Base scripted linear velocity, difficulty-scaled at composition time
    pub primary_velocity: DVec2,
    /// Oscillating component, driven by yoyo tween tasks
    pub secondary_velocity: DVec2,
    /// Circular-motion component, recomputed analytically
    pub orbital_velocity: DVec2,
    /// Rotation rate, difficulty-scaled at composition time
    pub angular_velocity: f64,
    pub orbit: Option<OrbitMotion>,
    pub lifecycle: Lifecycle,
    /// Presentation hint: armored target under the cursor
    pub highlighted: bool,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, position: DVec2) -> Self {
        let opacity = kind.base_opacity();
        Self {
            id,
            kind,
            position,
            rotation: 0.0,
            scale_factor: 1.0,
            opacity,
            primary_velocity: DVec2::ZERO,
            secondary_velocity: DVec2::ZERO,
            orbital_velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            orbit: None,
            lifecycle: Lifecycle::Alive,
            highlighted: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Alive)
    }

    pub fn is_removed(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Removed)
    }

    /// Composed velocity for this tick:
    /// `(primary * D + secondary + orbital) * T`
    pub fn effective_velocity(&self, ctx: &SimContext) -> DVec2 {
        (self.primary_velocity * ctx.difficulty + self.secondary_velocity + self.orbital_velocity)
            * ctx.time_scale
    }

    /// Advance kinematics and the lifecycle fade by one tick
    pub fn advance(&mut self, ctx: &SimContext, dt: f64) {
        if self.is_removed() {
            return;
        }

        if let Some(orbit) = &mut self.orbit {
            if let Some(v) = orbit.advance(ctx.time_scale, dt) {
                self.orbital_velocity = v;
            }
        }

        self.position += self.effective_velocity(ctx) * dt;
        self.rotation += self.angular_velocity * ctx.difficulty * ctx.time_scale * dt;

        if let Lifecycle::Dying { elapsed } = self.lifecycle {
            let elapsed = elapsed + dt * ctx.time_scale;
            if elapsed >= DEATH_FADE_SECS {
                self.opacity = 0.0;
                self.lifecycle = Lifecycle::Removed;
            } else {
                self.opacity =
                    self.kind.base_opacity() * (1.0 - elapsed / DEATH_FADE_SECS);
                self.lifecycle = Lifecycle::Dying { elapsed };
            }
        }
    }

    /// Start the death fade; no-op unless currently `Alive`.
    /// Returns true when the transition actually happened.
    pub fn begin_dying(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.lifecycle = Lifecycle::Dying { elapsed: 0.0 };
        self.highlighted = false;
        true
    }

    /// Skip the fade entirely (clear-friendlies, boundary cull, force-clear)
    pub fn force_remove(&mut self) {
        self.lifecycle = Lifecycle::Removed;
        self.opacity = 0.0;
    }

    /// Containment test against a world-space point
    pub fn contains_point(&self, world: DVec2) -> bool {
        let scale = self.scale_factor.max(1e-6);
        let local = DVec2::from_angle(-self.rotation).rotate(world - self.position) / scale;
        self.kind.contains_local(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn ctx(difficulty: f64, time_scale: f64) -> SimContext {
        SimContext {
            difficulty,
            time_scale,
            ..SimContext::default()
        }
    }

    #[test]
    fn test_position_formula_exact() {
        let mut e = Entity::new(1, EntityKind::Target, DVec2::new(100.0, -50.0));
        e.primary_velocity = DVec2::new(10.0, 60.0);
        e.secondary_velocity = DVec2::new(3.0, 0.0);
        e.angular_velocity = 2.0;

        let ctx = ctx(1.5, 0.5);
        e.advance(&ctx, SIM_DT);

        let expected_v = (DVec2::new(10.0, 60.0) * 1.5 + DVec2::new(3.0, 0.0)) * 0.5;
        assert_eq!(e.position, DVec2::new(100.0, -50.0) + expected_v * SIM_DT);
        assert_eq!(e.rotation, 2.0 * 1.5 * 0.5 * SIM_DT);
    }

    #[test]
    fn test_subdivided_ticks_match_one_large_tick() {
        let mut fine = Entity::new(1, EntityKind::Target, DVec2::ZERO);
        fine.primary_velocity = DVec2::new(40.0, 80.0);
        let mut coarse = fine.clone();

        let ctx = ctx(1.2, 1.0);
        for _ in 0..120 {
            fine.advance(&ctx, SIM_DT);
        }
        coarse.advance(&ctx, 1.0);

        assert!((fine.position - coarse.position).length() < 1e-9);
    }

    #[test]
    fn test_dying_is_one_way_and_idempotent() {
        let mut e = Entity::new(1, EntityKind::Citizen, DVec2::ZERO);
        assert!(e.begin_dying());
        let after_first = e.lifecycle;
        // Re-triggering the death animation is a no-op
        assert!(!e.begin_dying());
        assert_eq!(e.lifecycle, after_first);

        let ctx = ctx(1.0, 1.0);
        let mut ticks = 0;
        while !e.is_removed() {
            e.advance(&ctx, SIM_DT);
            ticks += 1;
            assert!(ticks < 1000, "fade never completed");
        }
        assert_eq!(e.opacity, 0.0);
        // Removed is terminal
        assert!(!e.begin_dying());
        assert!(e.is_removed());
    }

    #[test]
    fn test_fade_duration_scales_with_time_scale() {
        let mut e = Entity::new(1, EntityKind::Target, DVec2::ZERO);
        e.begin_dying();
        let slow = ctx(1.0, 0.5);
        // At half speed the fade takes twice the wall-clock ticks
        let expected = (2.0 * DEATH_FADE_SECS / SIM_DT).ceil() as u32;
        let mut ticks: u32 = 0;
        while !e.is_removed() {
            e.advance(&slow, SIM_DT);
            ticks += 1;
        }
        assert!(ticks.abs_diff(expected) <= 1);
    }

    #[test]
    fn test_orbit_produces_tangential_velocity() {
        let mut e = Entity::new(1, EntityKind::Target, DVec2::ZERO);
        e.orbit = Some(OrbitMotion::new(40.0, 2.0, 0.0));
        let ctx = ctx(1.0, 1.0);
        e.advance(&ctx, SIM_DT);
        // First tick recomputes immediately; speed is r * omega
        assert!((e.orbital_velocity.length() - 80.0).abs() < 1e-6);

        // The velocity direction turns as the orbit angle advances
        let first = e.orbital_velocity;
        for _ in 0..60 {
            e.advance(&ctx, SIM_DT);
        }
        assert!((e.orbital_velocity.length() - 80.0).abs() < 1e-6);
        assert!(e.orbital_velocity.angle_to(first).abs() > 0.1);
    }

    #[test]
    fn test_contains_point_respects_transform() {
        let mut e = Entity::new(1, EntityKind::Citizen, DVec2::new(200.0, 100.0));
        assert!(e.contains_point(DVec2::new(200.0, 100.0)));
        assert!(e.contains_point(DVec2::new(200.0 + CITIZEN_HALF, 100.0)));
        assert!(!e.contains_point(DVec2::new(200.0 + 2.0 * CITIZEN_HALF, 100.0)));

        // Doubling the scale doubles the reach
        e.scale_factor = 2.0;
        assert!(e.contains_point(DVec2::new(200.0 + 1.5 * CITIZEN_HALF, 100.0)));
    }

    proptest! {
        #[test]
        fn prop_kinematics_deterministic(
            vx in -200.0..200.0_f64,
            vy in -200.0..200.0_f64,
            difficulty in 0.5..2.0_f64,
            time_scale in 0.25..1.0_f64,
        ) {
            let mut a = Entity::new(1, EntityKind::Target, DVec2::ZERO);
            a.primary_velocity = DVec2::new(vx, vy);
            let mut b = a.clone();

            let ctx = ctx(difficulty, time_scale);
            for _ in 0..30 {
                a.advance(&ctx, SIM_DT);
                b.advance(&ctx, SIM_DT);
            }
            // Identical inputs produce bit-identical trajectories
            prop_assert_eq!(a.position, b.position);
            prop_assert_eq!(a.rotation, b.rotation);
        }
    }
}

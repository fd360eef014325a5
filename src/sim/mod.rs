//! Deterministic level simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Scripted kinematics only (no random source)
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod context;
pub mod entity;
pub mod geometry;
pub mod kind;
pub mod level;
pub mod script;
pub mod session;
pub mod tween;

pub use context::SimContext;
pub use entity::{Entity, EntityId, Lifecycle, OrbitMotion};
pub use kind::{EntityKind, PowerUpKind, SparedClass};
pub use level::{Level, Outcome, SimEvent, SoundKind, SparedFlags};
pub use script::{
    FadeCycle, ObstacleSpec, OrbitSpec, Oscillation, ScaleRamp, ScriptError, ScriptLine,
    SpawnSpec, VelocityRamp, parse_script,
};
pub use session::{Session, SessionPhase};
pub use tween::{Easing, Repeat, TweenId, TweenTarget, TweenTask, Tweener};

//! Interpolation scheduler
//!
//! A flat list of time-scaled, cancelable interpolation tasks, polled once
//! per tick. Each task ramps exactly one numeric field (a velocity
//! component, the scale factor, the opacity, or the level-global blackout
//! alpha) between two values over a duration, with optional delay, repeat,
//! and yoyo behavior. Tasks carry their own rate multiplier; a global
//! time-scale change re-assigns every live task's rate immediately rather
//! than being read ambiently, so previously-scheduled tasks never drift
//! against new ones.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};
use crate::lerp;

/// Handle returned by `schedule`; cancelling a finished task is a no-op
pub type TweenId = u64;

/// The numeric field a task drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenTarget {
    PrimaryVelX(EntityId),
    PrimaryVelY(EntityId),
    SecondaryVelX(EntityId),
    SecondaryVelY(EntityId),
    Scale(EntityId),
    Opacity(EntityId),
    /// Level-global blackout overlay alpha
    Blackout,
}

impl TweenTarget {
    /// The entity this target is bound to, if any
    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            TweenTarget::PrimaryVelX(id)
            | TweenTarget::PrimaryVelY(id)
            | TweenTarget::SecondaryVelX(id)
            | TweenTarget::SecondaryVelY(id)
            | TweenTarget::Scale(id)
            | TweenTarget::Opacity(id) => Some(id),
            TweenTarget::Blackout => None,
        }
    }
}

/// Easing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    QuadOut,
    SineInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::SineInOut => 0.5 - 0.5 * (std::f64::consts::PI * t).cos(),
        }
    }
}

/// How many forward (or forward+backward, when yoyo) sweeps a task runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Repeat {
    #[default]
    None,
    Count(u32),
    Infinite,
}

impl Repeat {
    fn iterations(self) -> Option<u32> {
        match self {
            Repeat::None => Some(1),
            Repeat::Count(n) => Some(n),
            Repeat::Infinite => None,
        }
    }
}

/// A single interpolation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenTask {
    pub target: TweenTarget,
    /// Seconds before the ramp starts (already difficulty-divided by callers)
    pub delay: f64,
    /// Seconds for one sweep
    pub duration: f64,
    /// Start value; `None` captures the live value when the delay elapses
    pub from: Option<f64>,
    pub to: f64,
    pub easing: Easing,
    pub repeat: Repeat,
    /// Ping-pong: one repeat is a full forward+backward sweep
    pub yoyo: bool,
}

#[derive(Debug, Clone)]
struct ActiveTween {
    id: TweenId,
    task: TweenTask,
    /// Time-scale multiplier, re-assigned on every global change
    rate: f64,
    waited: f64,
    elapsed: f64,
    started: bool,
    start_value: f64,
    done: bool,
}

/// The per-level task list (the "active schedule" resource: dropping the
/// tweener on level reload cancels everything that was still in flight)
#[derive(Debug, Clone)]
pub struct Tweener {
    tasks: Vec<ActiveTween>,
    next_id: TweenId,
    rate: f64,
}

impl Default for Tweener {
    fn default() -> Self {
        Self::new()
    }
}

impl Tweener {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            rate: 1.0,
        }
    }

    /// Queue a task. List-driven script animations go through here: entries
    /// of one directive list occupy disjoint time windows by construction.
    pub fn schedule(&mut self, task: TweenTask) -> TweenId {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(ActiveTween {
            id,
            task,
            rate: self.rate,
            waited: 0.0,
            elapsed: 0.0,
            started: false,
            start_value: 0.0,
            done: false,
        });
        id
    }

    /// Queue a task, implicitly cancelling any incomplete task bound to the
    /// same target field (the re-scheduling contract for gameplay
    /// re-triggers)
    pub fn schedule_exclusive(&mut self, task: TweenTask) -> TweenId {
        let target = task.target;
        for t in &mut self.tasks {
            if t.task.target == target {
                t.done = true;
            }
        }
        self.schedule(task)
    }

    /// Cancel by handle; no-op for completed or unknown handles
    pub fn cancel(&mut self, id: TweenId) {
        if let Some(t) = self.tasks.iter_mut().find(|t| t.id == id) {
            t.done = true;
        }
    }

    /// Re-assign every live task's rate (global time-scale change)
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        for t in &mut self.tasks {
            t.rate = rate;
        }
    }

    /// Drop all tasks bound to a purged entity
    pub fn drop_entity(&mut self, id: EntityId) {
        for t in &mut self.tasks {
            if t.task.target.entity() == Some(id) {
                t.done = true;
            }
        }
    }

    /// Number of tasks still pending or running
    pub fn live_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.done).count()
    }

    /// Whether any live task drives the given target
    pub fn has_target(&self, target: TweenTarget) -> bool {
        self.tasks.iter().any(|t| !t.done && t.task.target == target)
    }

    /// Advance all tasks by one tick and write their values through
    pub fn advance(&mut self, dt: f64, entities: &mut [Entity], blackout: &mut f64) {
        for t in &mut self.tasks {
            if t.done {
                continue;
            }

            let mut step = dt * t.rate;
            if !t.started {
                t.waited += step;
                if t.waited < t.task.delay {
                    continue;
                }
                // Carry the overshoot into active time
                step = t.waited - t.task.delay;
                t.waited = t.task.delay;
                t.started = true;
                t.start_value = match t.task.from {
                    Some(v) => v,
                    None => match read_target(t.task.target, entities, blackout) {
                        Some(v) => v,
                        None => {
                            // Bound entity is already gone
                            t.done = true;
                            continue;
                        }
                    },
                };
            }
            t.elapsed += step;

            let duration = t.task.duration.max(1e-9);
            let sweep = if t.task.yoyo { 2.0 * duration } else { duration };
            let iteration = (t.elapsed / sweep).floor() as u64;
            let finished = match t.task.repeat.iterations() {
                Some(n) => iteration >= u64::from(n),
                None => false,
            };

            let value = if finished {
                t.done = true;
                // A yoyo sweep ends where it began
                if t.task.yoyo { t.start_value } else { t.task.to }
            } else {
                let within = t.elapsed - iteration as f64 * sweep;
                let mut p = within / duration;
                if t.task.yoyo && p > 1.0 {
                    p = 2.0 - p;
                }
                lerp(t.start_value, t.task.to, t.task.easing.apply(p))
            };

            if write_target(t.task.target, value, entities, blackout).is_none() {
                t.done = true;
            }
        }
        self.tasks.retain(|t| !t.done);
    }
}

fn find_entity<'a>(entities: &'a mut [Entity], id: EntityId) -> Option<&'a mut Entity> {
    entities.iter_mut().find(|e| e.id == id)
}

fn read_target(target: TweenTarget, entities: &mut [Entity], blackout: &f64) -> Option<f64> {
    Some(match target {
        TweenTarget::PrimaryVelX(id) => find_entity(entities, id)?.primary_velocity.x,
        TweenTarget::PrimaryVelY(id) => find_entity(entities, id)?.primary_velocity.y,
        TweenTarget::SecondaryVelX(id) => find_entity(entities, id)?.secondary_velocity.x,
        TweenTarget::SecondaryVelY(id) => find_entity(entities, id)?.secondary_velocity.y,
        TweenTarget::Scale(id) => find_entity(entities, id)?.scale_factor,
        TweenTarget::Opacity(id) => find_entity(entities, id)?.opacity,
        TweenTarget::Blackout => *blackout,
    })
}

fn write_target(
    target: TweenTarget,
    value: f64,
    entities: &mut [Entity],
    blackout: &mut f64,
) -> Option<()> {
    match target {
        TweenTarget::PrimaryVelX(id) => find_entity(entities, id)?.primary_velocity.x = value,
        TweenTarget::PrimaryVelY(id) => find_entity(entities, id)?.primary_velocity.y = value,
        TweenTarget::SecondaryVelX(id) => find_entity(entities, id)?.secondary_velocity.x = value,
        TweenTarget::SecondaryVelY(id) => find_entity(entities, id)?.secondary_velocity.y = value,
        TweenTarget::Scale(id) => find_entity(entities, id)?.scale_factor = value,
        TweenTarget::Opacity(id) => find_entity(entities, id)?.opacity = value,
        TweenTarget::Blackout => *blackout = value,
    }
    Some(())
}

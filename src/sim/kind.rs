//! The spawnable entity catalog
//!
//! A closed variant set: each kind carries its own containment geometry and
//! is dispatched by `match` everywhere (no virtual hierarchy). The
//! interaction consequences live in the level controller; this module owns
//! everything that is intrinsic to a kind.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry;
use crate::consts::*;

/// Entity classes tracked by the "spared" flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SparedClass {
    Target,
    Citizen,
    Obstacle,
}

/// Power-up variants (all share pentagon geometry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Force-removes all visible citizens and obstacles when collected
    ClearFriendlies,
    /// Arms the player-triggerable intangible mode
    Intangibility,
    /// Arms the player-triggerable slow-time mode
    SlowTime,
}

/// The polymorphic entity variant set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Basic target: triangle, removed on hover, score +1
    Target,
    /// Same as `Target` with a near-invisible fill
    ConcealedTarget,
    /// Click-only target; each hit drops a tier until destroyed
    ArmoredTarget { remaining_hits: u32 },
    /// Protected square; touching it costs a point
    Citizen,
    /// Script-defined polygon with vertical drift only
    Obstacle { points: Vec<DVec2> },
    /// Square zone driving the resource bar; never removed by hover
    ResourceZone,
    /// Collectible pentagon
    PowerUp(PowerUpKind),
}

impl EntityKind {
    /// Base fill opacity before any lifecycle fade
    pub fn base_opacity(&self) -> f64 {
        match self {
            EntityKind::ConcealedTarget => CONCEALED_OPACITY,
            _ => 1.0,
        }
    }

    /// Which spared-flag class this kind belongs to, if any
    pub fn spared_class(&self) -> Option<SparedClass> {
        match self {
            EntityKind::Target
            | EntityKind::ConcealedTarget
            | EntityKind::ArmoredTarget { .. } => Some(SparedClass::Target),
            EntityKind::Citizen => Some(SparedClass::Citizen),
            EntityKind::Obstacle { .. } => Some(SparedClass::Obstacle),
            EntityKind::ResourceZone | EntityKind::PowerUp(_) => None,
        }
    }

    /// Citizens and obstacles: the classes the clear-friendlies power-up
    /// (and the collateral-damage achievements) care about
    pub fn is_friendly(&self) -> bool {
        matches!(
            self,
            EntityKind::Citizen | EntityKind::Obstacle { .. }
        )
    }

    /// Containment test in entity-local space (transform already undone)
    pub fn contains_local(&self, p: DVec2) -> bool {
        match self {
            EntityKind::Target
            | EntityKind::ConcealedTarget
            | EntityKind::ArmoredTarget { .. } => {
                // Equilateral triangle: circumradius from the side length
                let circumradius = TARGET_SIDE / 3.0_f64.sqrt();
                geometry::point_in_regular_polygon(p, 3, circumradius, TARGET_ORIENT_OFFSET)
            }
            EntityKind::Citizen => geometry::point_in_square(p, CITIZEN_HALF),
            EntityKind::ResourceZone => geometry::point_in_square(p, ZONE_HALF),
            EntityKind::Obstacle { points } => geometry::point_in_polygon(p, points),
            EntityKind::PowerUp(_) => {
                geometry::point_in_regular_polygon(p, 5, POWERUP_RADIUS, TARGET_ORIENT_OFFSET)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spared_classes() {
        assert_eq!(EntityKind::Target.spared_class(), Some(SparedClass::Target));
        assert_eq!(
            EntityKind::ArmoredTarget { remaining_hits: 2 }.spared_class(),
            Some(SparedClass::Target)
        );
        assert_eq!(
            EntityKind::Citizen.spared_class(),
            Some(SparedClass::Citizen)
        );
        assert_eq!(
            EntityKind::Obstacle { points: vec![] }.spared_class(),
            Some(SparedClass::Obstacle)
        );
        assert_eq!(EntityKind::ResourceZone.spared_class(), None);
        assert_eq!(
            EntityKind::PowerUp(PowerUpKind::SlowTime).spared_class(),
            None
        );
    }

    #[test]
    fn test_concealed_opacity() {
        assert!(EntityKind::ConcealedTarget.base_opacity() < 0.1);
        assert_eq!(EntityKind::Target.base_opacity(), 1.0);
    }

    #[test]
    fn test_target_containment() {
        let kind = EntityKind::Target;
        assert!(kind.contains_local(DVec2::ZERO));
        assert!(!kind.contains_local(DVec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_obstacle_containment_uses_script_points() {
        let kind = EntityKind::Obstacle {
            points: vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(60.0, 20.0),
                DVec2::new(30.0, 80.0),
                DVec2::new(-30.0, 40.0),
            ],
        };
        assert!(kind.contains_local(DVec2::new(20.0, 30.0)));
        assert!(!kind.contains_local(DVec2::new(-40.0, -10.0)));
    }
}

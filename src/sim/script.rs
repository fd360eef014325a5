//! Level script interpreter
//!
//! A level script is a JSON array of heterogeneous arrays ("lines"). The
//! *length* of a line alone selects its meaning — that dispatch is the wire
//! format and is preserved bit-for-bit for existing level data:
//!
//! - length 1:  `[threshold]`
//! - length 2:  `["black", [[delay, duration, repeats], ...]]`
//! - length 3:  `[label, [[x, y], ...], vy]` (static obstacle polygon)
//! - length 10: `[kind, x, y, vx, vy, omega, velocity_ramps, scale_ramps,
//!   oscillations, orbit]`
//! - anything else: malformed, fatal at load
//!
//! Internally each line becomes an explicit tagged variant, so downstream
//! code never re-derives meaning from array lengths. Scripts are trusted
//! build-time assets: there is no recovery path for malformed data.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::kind::{EntityKind, PowerUpKind};

/// Fatal script-load failures
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script is not an array of lines")]
    NotAnArray,
    #[error("line {index}: unrecognized tuple length {len}")]
    BadLineLength { index: usize, len: usize },
    #[error("line {index}: unknown entity kind `{label}`")]
    UnknownKind { index: usize, label: String },
    #[error("line {index}: {what}")]
    BadField { index: usize, what: String },
}

/// One timed blackout fade (alpha 0 -> 1 -> 0 per repeat)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeCycle {
    pub delay: f64,
    pub duration: f64,
    pub repeats: u32,
}

/// Static obstacle polygon, normalized so the topmost vertex is the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Absolute position of the topmost script vertex
    pub origin: DVec2,
    /// Outline relative to `origin`
    pub points: Vec<DVec2>,
    pub vertical_velocity: f64,
}

/// Primary-velocity ramp directive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityRamp {
    pub delay: f64,
    pub duration: f64,
    pub to: DVec2,
}

/// Scale-factor ramp directive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRamp {
    pub delay: f64,
    pub duration: f64,
    pub to: f64,
}

/// Secondary-velocity oscillation directive (yoyo-infinite, sine-eased)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub delay: f64,
    pub duration: f64,
    pub amplitude: DVec2,
}

/// Analytic orbit directive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSpec {
    pub radius: f64,
    pub angular_speed: f64,
    pub phase: f64,
}

/// A length-10 moving-entity line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub kind: EntityKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub angular_velocity: f64,
    pub velocity_ramps: Vec<VelocityRamp>,
    pub scale_ramps: Vec<ScaleRamp>,
    pub oscillations: Vec<Oscillation>,
    pub orbit: Option<OrbitSpec>,
}

/// A script line after tagging
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    PassThreshold(i32),
    Blackout(Vec<FadeCycle>),
    Obstacle(ObstacleSpec),
    Spawn(SpawnSpec),
}

/// Parse a whole level script from its JSON source
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let root: Value = serde_json::from_str(source)?;
    let lines = root.as_array().ok_or(ScriptError::NotAnArray)?;
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| parse_line(index, line))
        .collect()
}

fn parse_line(index: usize, line: &Value) -> Result<ScriptLine, ScriptError> {
    let fields = line.as_array().ok_or_else(|| ScriptError::BadField {
        index,
        what: "line is not an array".into(),
    })?;

    match fields.len() {
        1 => {
            let threshold = as_f64(index, &fields[0], "pass threshold")? as i32;
            Ok(ScriptLine::PassThreshold(threshold))
        }
        2 => {
            // The leading literal is part of the wire format
            let label = as_str(index, &fields[0], "effect label")?;
            if label != "black" {
                return Err(ScriptError::BadField {
                    index,
                    what: format!("unknown global effect `{label}`"),
                });
            }
            let cycles = as_array(index, &fields[1], "fade parameter list")?
                .iter()
                .map(|cycle| {
                    let c = as_array(index, cycle, "fade cycle")?;
                    if c.len() != 3 {
                        return Err(ScriptError::BadField {
                            index,
                            what: format!("fade cycle needs 3 fields, got {}", c.len()),
                        });
                    }
                    Ok(FadeCycle {
                        delay: as_f64(index, &c[0], "fade delay")?,
                        duration: as_f64(index, &c[1], "fade duration")?,
                        repeats: as_f64(index, &c[2], "fade repeats")? as u32,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ScriptLine::Blackout(cycles))
        }
        3 => {
            // Label is ignored for obstacles
            let points = parse_points(index, &fields[1])?;
            if points.len() < 3 {
                return Err(ScriptError::BadField {
                    index,
                    what: format!("obstacle polygon needs >= 3 points, got {}", points.len()),
                });
            }
            let vertical_velocity = as_f64(index, &fields[2], "vertical velocity")?;

            // Normalize: the topmost vertex (minimal y, y grows downward)
            // becomes the local origin
            let origin = points
                .iter()
                .copied()
                .reduce(|top, p| if p.y < top.y { p } else { top })
                .unwrap_or(DVec2::ZERO);
            let points = points.iter().map(|p| *p - origin).collect();

            Ok(ScriptLine::Obstacle(ObstacleSpec {
                origin,
                points,
                vertical_velocity,
            }))
        }
        10 => {
            let label = as_str(index, &fields[0], "entity kind")?;
            let kind = parse_kind(index, label)?;
            let position = DVec2::new(
                as_f64(index, &fields[1], "x")?,
                as_f64(index, &fields[2], "y")?,
            );
            let velocity = DVec2::new(
                as_f64(index, &fields[3], "vx")?,
                as_f64(index, &fields[4], "vy")?,
            );
            let angular_velocity = as_f64(index, &fields[5], "angular velocity")?;

            let velocity_ramps = as_array(index, &fields[6], "velocity ramps")?
                .iter()
                .map(|r| {
                    let r = as_array(index, r, "velocity ramp")?;
                    if r.len() != 4 {
                        return Err(ScriptError::BadField {
                            index,
                            what: format!("velocity ramp needs 4 fields, got {}", r.len()),
                        });
                    }
                    Ok(VelocityRamp {
                        delay: as_f64(index, &r[0], "ramp delay")?,
                        duration: as_f64(index, &r[1], "ramp duration")?,
                        to: DVec2::new(
                            as_f64(index, &r[2], "ramp vx")?,
                            as_f64(index, &r[3], "ramp vy")?,
                        ),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let scale_ramps = as_array(index, &fields[7], "scale ramps")?
                .iter()
                .map(|r| {
                    let r = as_array(index, r, "scale ramp")?;
                    if r.len() != 3 {
                        return Err(ScriptError::BadField {
                            index,
                            what: format!("scale ramp needs 3 fields, got {}", r.len()),
                        });
                    }
                    Ok(ScaleRamp {
                        delay: as_f64(index, &r[0], "scale delay")?,
                        duration: as_f64(index, &r[1], "scale duration")?,
                        to: as_f64(index, &r[2], "scale target")?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let oscillations = as_array(index, &fields[8], "oscillations")?
                .iter()
                .map(|r| {
                    let r = as_array(index, r, "oscillation")?;
                    if r.len() != 4 {
                        return Err(ScriptError::BadField {
                            index,
                            what: format!("oscillation needs 4 fields, got {}", r.len()),
                        });
                    }
                    Ok(Oscillation {
                        delay: as_f64(index, &r[0], "oscillation delay")?,
                        duration: as_f64(index, &r[1], "oscillation duration")?,
                        amplitude: DVec2::new(
                            as_f64(index, &r[2], "oscillation x amplitude")?,
                            as_f64(index, &r[3], "oscillation y amplitude")?,
                        ),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let orbit_fields = as_array(index, &fields[9], "orbit spec")?;
            let orbit = match orbit_fields.len() {
                0 => None,
                3 => Some(OrbitSpec {
                    radius: as_f64(index, &orbit_fields[0], "orbit radius")?,
                    angular_speed: as_f64(index, &orbit_fields[1], "orbit angular speed")?,
                    phase: as_f64(index, &orbit_fields[2], "orbit phase")?,
                }),
                n => {
                    return Err(ScriptError::BadField {
                        index,
                        what: format!("orbit spec needs 0 or 3 fields, got {n}"),
                    });
                }
            };

            Ok(ScriptLine::Spawn(SpawnSpec {
                kind,
                position,
                velocity,
                angular_velocity,
                velocity_ramps,
                scale_ramps,
                oscillations,
                orbit,
            }))
        }
        len => Err(ScriptError::BadLineLength { index, len }),
    }
}

/// Kind labels: exact match, or prefix match for stealth/armored families.
/// Armored labels encode the initial hit count in their trailing character.
fn parse_kind(index: usize, label: &str) -> Result<EntityKind, ScriptError> {
    match label {
        "target" => return Ok(EntityKind::Target),
        "citizen" => return Ok(EntityKind::Citizen),
        "zone" => return Ok(EntityKind::ResourceZone),
        "sweep" => return Ok(EntityKind::PowerUp(PowerUpKind::ClearFriendlies)),
        "phase" => return Ok(EntityKind::PowerUp(PowerUpKind::Intangibility)),
        "chrono" => return Ok(EntityKind::PowerUp(PowerUpKind::SlowTime)),
        _ => {}
    }
    if label.starts_with("stealth") {
        return Ok(EntityKind::ConcealedTarget);
    }
    if label.starts_with("armored_") {
        let hits = match label.chars().last() {
            Some(c @ '1'..='3') => u32::from(c as u8 - b'0'),
            _ => {
                return Err(ScriptError::BadField {
                    index,
                    what: format!("armored label `{label}` must end in 1-3"),
                });
            }
        };
        return Ok(EntityKind::ArmoredTarget {
            remaining_hits: hits,
        });
    }
    Err(ScriptError::UnknownKind {
        index,
        label: label.to_owned(),
    })
}

fn parse_points(index: usize, value: &Value) -> Result<Vec<DVec2>, ScriptError> {
    as_array(index, value, "point list")?
        .iter()
        .map(|p| {
            let p = as_array(index, p, "point")?;
            if p.len() != 2 {
                return Err(ScriptError::BadField {
                    index,
                    what: format!("point needs 2 fields, got {}", p.len()),
                });
            }
            Ok(DVec2::new(
                as_f64(index, &p[0], "point x")?,
                as_f64(index, &p[1], "point y")?,
            ))
        })
        .collect()
}

fn as_f64(index: usize, value: &Value, what: &str) -> Result<f64, ScriptError> {
    value.as_f64().ok_or_else(|| ScriptError::BadField {
        index,
        what: format!("{what} is not a number"),
    })
}

fn as_str<'a>(index: usize, value: &'a Value, what: &str) -> Result<&'a str, ScriptError> {
    value.as_str().ok_or_else(|| ScriptError::BadField {
        index,
        what: format!("{what} is not a string"),
    })
}

fn as_array<'a>(index: usize, value: &'a Value, what: &str) -> Result<&'a Vec<Value>, ScriptError> {
    value.as_array().ok_or_else(|| ScriptError::BadField {
        index,
        what: format!("{what} is not an array"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_line() {
        let lines = parse_script("[[5]]").unwrap();
        assert_eq!(lines, vec![ScriptLine::PassThreshold(5)]);
    }

    #[test]
    fn test_blackout_line() {
        let lines = parse_script(r#"[["black", [[1.0, 0.5, 2], [4.0, 0.25, 1]]]]"#).unwrap();
        match &lines[0] {
            ScriptLine::Blackout(cycles) => {
                assert_eq!(cycles.len(), 2);
                assert_eq!(cycles[0].delay, 1.0);
                assert_eq!(cycles[0].duration, 0.5);
                assert_eq!(cycles[0].repeats, 2);
            }
            other => panic!("expected blackout, got {other:?}"),
        }
    }

    #[test]
    fn test_obstacle_normalized_to_topmost_vertex() {
        let lines = parse_script(
            r#"[["wall", [[100.0, -50.0], [160.0, -90.0], [180.0, -20.0]], 35.0]]"#,
        )
        .unwrap();
        match &lines[0] {
            ScriptLine::Obstacle(spec) => {
                // Topmost = minimal y = (160, -90)
                assert_eq!(spec.origin, DVec2::new(160.0, -90.0));
                assert_eq!(spec.points[1], DVec2::ZERO);
                assert_eq!(spec.points[0], DVec2::new(-60.0, 40.0));
                assert_eq!(spec.vertical_velocity, 35.0);
            }
            other => panic!("expected obstacle, got {other:?}"),
        }
    }

    #[test]
    fn test_spawn_line_full() {
        let src = r#"[
            ["target", 120.0, -40.0, 10.0, 70.0, 0.8,
             [[0.5, 1.0, 20.0, 120.0]],
             [[0.0, 2.0, 1.6]],
             [[0.3, 1.5, 40.0, 0.0]],
             [40.0, 2.0, 1.57]]
        ]"#;
        let lines = parse_script(src).unwrap();
        match &lines[0] {
            ScriptLine::Spawn(spec) => {
                assert_eq!(spec.kind, EntityKind::Target);
                assert_eq!(spec.position, DVec2::new(120.0, -40.0));
                assert_eq!(spec.velocity, DVec2::new(10.0, 70.0));
                assert_eq!(spec.angular_velocity, 0.8);
                assert_eq!(spec.velocity_ramps.len(), 1);
                assert_eq!(spec.velocity_ramps[0].to, DVec2::new(20.0, 120.0));
                assert_eq!(spec.scale_ramps[0].to, 1.6);
                assert_eq!(spec.oscillations[0].amplitude, DVec2::new(40.0, 0.0));
                assert!(spec.orbit.is_some());
            }
            other => panic!("expected spawn, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(parse_kind(0, "target").unwrap(), EntityKind::Target);
        assert_eq!(
            parse_kind(0, "stealth_target").unwrap(),
            EntityKind::ConcealedTarget
        );
        assert_eq!(parse_kind(0, "stealth").unwrap(), EntityKind::ConcealedTarget);
        assert_eq!(
            parse_kind(0, "armored_2").unwrap(),
            EntityKind::ArmoredTarget { remaining_hits: 2 }
        );
        assert_eq!(
            parse_kind(0, "sweep").unwrap(),
            EntityKind::PowerUp(PowerUpKind::ClearFriendlies)
        );
        assert!(matches!(
            parse_kind(0, "armored_9"),
            Err(ScriptError::BadField { .. })
        ));
        assert!(matches!(
            parse_kind(0, "gremlin"),
            Err(ScriptError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_unrecognized_length_is_fatal() {
        let err = parse_script(r#"[["target", 1.0, 2.0, 3.0]]"#).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::BadLineLength { index: 0, len: 4 }
        ));
    }

    #[test]
    fn test_empty_animation_lists() {
        let src = r#"[["citizen", 400.0, -150.0, 0.0, 55.0, 0.0, [], [], [], []]]"#;
        let lines = parse_script(src).unwrap();
        match &lines[0] {
            ScriptLine::Spawn(spec) => {
                assert!(spec.velocity_ramps.is_empty());
                assert!(spec.scale_ramps.is_empty());
                assert!(spec.oscillations.is_empty());
                assert!(spec.orbit.is_none());
            }
            other => panic!("expected spawn, got {other:?}"),
        }
    }

    #[test]
    fn test_non_array_script_is_fatal() {
        assert!(matches!(
            parse_script(r#"{"level": 1}"#),
            Err(ScriptError::NotAnArray)
        ));
        assert!(matches!(parse_script("not json"), Err(ScriptError::Json(_))));
    }
}

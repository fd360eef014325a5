//! Point-in-region containment tests
//!
//! Every interaction in the game reduces to "is the cursor inside this
//! shape": triangles for targets, squares for citizens and the resource
//! zone, regular pentagons for power-ups, and arbitrary script polygons for
//! obstacles. All tests run in entity-local space (the entity transform is
//! undone by the caller).

use glam::DVec2;

/// Check if a point is inside an axis-aligned square centered at the origin
#[inline]
pub fn point_in_square(p: DVec2, half_extent: f64) -> bool {
    p.x.abs() <= half_extent && p.y.abs() <= half_extent
}

/// Check if a point is inside a convex polygon (vertices in order)
///
/// The point is inside when every edge cross product carries the same sign;
/// points exactly on an edge count as inside.
pub fn point_in_convex_polygon(p: DVec2, verts: &[DVec2]) -> bool {
    if verts.len() < 3 {
        return false;
    }
    let mut sign = 0.0_f64;
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[(i + 1) % verts.len()];
        let cross = (b - a).perp_dot(p - a);
        if cross != 0.0 {
            if sign != 0.0 && cross.signum() != sign {
                return false;
            }
            sign = cross.signum();
        }
    }
    true
}

/// Check if a point is inside a regular polygon centered at the origin
///
/// `orientation` is the angle of the first vertex; the remaining vertices
/// follow at even angular steps.
pub fn point_in_regular_polygon(
    p: DVec2,
    sides: usize,
    circumradius: f64,
    orientation: f64,
) -> bool {
    // Cheap reject: outside the circumscribed circle
    if p.length_squared() > circumradius * circumradius {
        return false;
    }
    let verts: Vec<DVec2> = (0..sides)
        .map(|i| {
            let angle = orientation + std::f64::consts::TAU * i as f64 / sides as f64;
            DVec2::new(angle.cos(), angle.sin()) * circumradius
        })
        .collect();
    point_in_convex_polygon(p, &verts)
}

/// Check if a point is inside an arbitrary polygon (even-odd ray cast)
///
/// Handles non-convex outlines; vertices may wind either way.
pub fn point_in_polygon(p: DVec2, verts: &[DVec2]) -> bool {
    if verts.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = verts.len() - 1;
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point_in_square() {
        assert!(point_in_square(DVec2::new(5.0, -5.0), 10.0));
        assert!(point_in_square(DVec2::new(10.0, 10.0), 10.0));
        assert!(!point_in_square(DVec2::new(10.1, 0.0), 10.0));
        assert!(!point_in_square(DVec2::new(0.0, -11.0), 10.0));
    }

    #[test]
    fn test_point_in_triangle() {
        // Apex-up triangle (y-down space: first vertex at -pi/2)
        let r = 20.0;
        assert!(point_in_regular_polygon(DVec2::ZERO, 3, r, -FRAC_PI_2));
        // Just below the apex
        assert!(point_in_regular_polygon(
            DVec2::new(0.0, -r + 1.0),
            3,
            r,
            -FRAC_PI_2
        ));
        // Outside the circumcircle entirely
        assert!(!point_in_regular_polygon(
            DVec2::new(0.0, -r - 1.0),
            3,
            r,
            -FRAC_PI_2
        ));
        // Inside the circle but outside the triangle (above a base corner)
        assert!(!point_in_regular_polygon(
            DVec2::new(r * 0.9, -r * 0.3),
            3,
            r,
            -FRAC_PI_2
        ));
    }

    #[test]
    fn test_point_in_pentagon() {
        let r = 26.0;
        assert!(point_in_regular_polygon(DVec2::ZERO, 5, r, -FRAC_PI_2));
        assert!(point_in_regular_polygon(
            DVec2::new(10.0, 5.0),
            5,
            r,
            -FRAC_PI_2
        ));
        assert!(!point_in_regular_polygon(
            DVec2::new(r, r),
            5,
            r,
            -FRAC_PI_2
        ));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // An L-shaped outline
        let verts = [
            DVec2::new(0.0, 0.0),
            DVec2::new(40.0, 0.0),
            DVec2::new(40.0, 10.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(10.0, 40.0),
            DVec2::new(0.0, 40.0),
        ];
        assert!(point_in_polygon(DVec2::new(5.0, 5.0), &verts));
        assert!(point_in_polygon(DVec2::new(30.0, 5.0), &verts));
        assert!(point_in_polygon(DVec2::new(5.0, 30.0), &verts));
        // The notch of the L
        assert!(!point_in_polygon(DVec2::new(30.0, 30.0), &verts));
        assert!(!point_in_polygon(DVec2::new(-1.0, 5.0), &verts));
    }

    #[test]
    fn test_degenerate_polygons() {
        assert!(!point_in_polygon(DVec2::ZERO, &[]));
        assert!(!point_in_polygon(
            DVec2::ZERO,
            &[DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0)]
        ));
        assert!(!point_in_convex_polygon(DVec2::ZERO, &[DVec2::ZERO]));
    }
}

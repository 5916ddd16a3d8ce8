//! Narrow phase: exact convex overlap
//!
//! GJK walks a simplex through the Minkowski difference `A - B` until it
//! either encloses the origin or finds a separating direction. On overlap,
//! EPA expands the final triangle towards the boundary of the difference to
//! recover the minimum translation vector. Both stages only ever call
//! [`SupportMap::support`], so any convex shape kind works.

use log::trace;

use super::shape::SupportMap;
use crate::config::PhysicsConfig;
use crate::foundation::math::{cross, perp, Vec2};

/// Numeric limits for the narrow phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GjkSettings {
    /// Penetrations shallower than this are reported as no overlap
    pub epsilon: f32,
    /// Simplex refinement cap
    pub max_iterations: usize,
    /// Polytope expansion cap
    pub epa_max_iterations: usize,
}

impl Default for GjkSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            max_iterations: 64,
            epa_max_iterations: 64,
        }
    }
}

impl From<&PhysicsConfig> for GjkSettings {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            max_iterations: config.gjk_max_iterations,
            epa_max_iterations: config.epa_max_iterations,
        }
    }
}

/// Minimum translation between two overlapping shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit vector pointing from the first shape towards the second
    pub normal: Vec2,
    /// Overlap depth along `normal`
    pub distance: f32,
}

/// Test two convex shapes for overlap
///
/// Returns `None` when the shapes are apart, merely touching, or the result
/// would not be a finite unit normal.
pub fn intersect<A, B>(a: &A, b: &B, settings: &GjkSettings) -> Option<Penetration>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let triangle = enclose_origin(a, b, settings)?;
    let penetration = expand_polytope(a, b, triangle, settings)?;

    if !penetration.distance.is_finite() || penetration.distance < settings.epsilon {
        return None;
    }
    if !(penetration.normal.x.is_finite() && penetration.normal.y.is_finite()) {
        return None;
    }
    Some(penetration)
}

fn minkowski_support<A, B>(a: &A, b: &B, direction: &Vec2) -> Vec2
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    a.support(direction) - b.support(&-direction)
}

/// GJK boolean stage. Yields the enclosing triangle on overlap.
fn enclose_origin<A, B>(a: &A, b: &B, settings: &GjkSettings) -> Option<[Vec2; 3]>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let first = minkowski_support(a, b, &Vec2::new(1.0, 0.0));
    let mut simplex = Vec::with_capacity(3);
    simplex.push(first);
    let mut direction = -first;
    let min_direction_sq = settings.epsilon * settings.epsilon;

    for _ in 0..settings.max_iterations {
        // Origin sits on the simplex itself: a touching contact at best
        if direction.norm_squared() <= min_direction_sq {
            return None;
        }

        let point = minkowski_support(a, b, &direction);
        if point.dot(&direction) < 0.0 {
            return None;
        }
        if simplex.iter().any(|p: &Vec2| (p - point).norm_squared() <= min_direction_sq) {
            return None;
        }

        simplex.push(point);
        if let Some(triangle) = evolve_simplex(&mut simplex, &mut direction) {
            return Some(triangle);
        }
    }

    trace!("GJK reached {} iterations without a verdict", settings.max_iterations);
    None
}

/// Reduce the simplex to the feature closest to the origin and pick the next
/// search direction. The newest point is always last.
fn evolve_simplex(simplex: &mut Vec<Vec2>, direction: &mut Vec2) -> Option<[Vec2; 3]> {
    match simplex.len() {
        2 => {
            line_case(simplex, direction);
            None
        }
        3 => triangle_case(simplex, direction),
        _ => None,
    }
}

fn line_case(simplex: &mut Vec<Vec2>, direction: &mut Vec2) {
    let a = simplex[1];
    let b = simplex[0];
    let ab = b - a;
    let ao = -a;

    if ab.dot(&ao) > 0.0 {
        let mut normal = perp(&ab);
        if normal.dot(&ao) < 0.0 {
            normal = -normal;
        }
        *direction = normal;
    } else {
        simplex.clear();
        simplex.push(a);
        *direction = ao;
    }
}

fn triangle_case(simplex: &mut Vec<Vec2>, direction: &mut Vec2) -> Option<[Vec2; 3]> {
    let a = simplex[2];
    let b = simplex[1];
    let c = simplex[0];
    let ab = b - a;
    let ac = c - a;
    let ao = -a;

    if cross(&ab, &ac).abs() <= f32::EPSILON * ab.norm() * ac.norm() {
        // Collinear triangle, keep the newest edge
        simplex.remove(0);
        line_case(simplex, direction);
        return None;
    }

    let mut ab_perp = perp(&ab);
    if ab_perp.dot(&ac) > 0.0 {
        ab_perp = -ab_perp;
    }
    let mut ac_perp = perp(&ac);
    if ac_perp.dot(&ab) > 0.0 {
        ac_perp = -ac_perp;
    }

    if ab_perp.dot(&ao) > 0.0 {
        *simplex = vec![b, a];
        *direction = ab_perp;
        None
    } else if ac_perp.dot(&ao) > 0.0 {
        *simplex = vec![c, a];
        *direction = ac_perp;
        None
    } else {
        Some([c, b, a])
    }
}

/// EPA stage: grow the polytope towards the closest boundary edge
fn expand_polytope<A, B>(a: &A, b: &B, triangle: [Vec2; 3], settings: &GjkSettings) -> Option<Penetration>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut polytope = triangle.to_vec();
    // Counter-clockwise winding so (e.y, -e.x) is the outward normal
    if cross(&(polytope[1] - polytope[0]), &(polytope[2] - polytope[0])) < 0.0 {
        polytope.swap(1, 2);
    }

    let mut best = None;
    for _ in 0..settings.epa_max_iterations {
        let (index, normal, distance) = closest_edge(&polytope)?;
        best = Some(Penetration { normal, distance });

        let support = minkowski_support(a, b, &normal);
        if support.dot(&normal) - distance <= settings.epsilon {
            return best;
        }
        polytope.insert(index + 1, support);
    }

    trace!("EPA reached {} iterations, using closest edge so far", settings.epa_max_iterations);
    best
}

fn closest_edge(polytope: &[Vec2]) -> Option<(usize, Vec2, f32)> {
    let mut closest: Option<(usize, Vec2, f32)> = None;
    for (i, start) in polytope.iter().enumerate() {
        let end = polytope[(i + 1) % polytope.len()];
        let edge = end - start;
        let Some(normal) = Vec2::new(edge.y, -edge.x).try_normalize(f32::EPSILON) else {
            continue;
        };
        let distance = normal.dot(start);
        if closest.map_or(true, |(_, _, best)| distance < best) {
            closest = Some((i, normal, distance));
        }
    }
    closest
}

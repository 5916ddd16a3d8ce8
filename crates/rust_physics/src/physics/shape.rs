//! Convex collision shapes
//!
//! Shapes are plain geometry in whatever space they were built in. An
//! [`Area`](super::Area) keeps one in local space and maps it into world
//! space on demand through [`Shape::transform`].

use std::cmp::Ordering;

use crate::error::PhysicsError;
use crate::foundation::math::{cross, is_finite, Affine2, Mat2, Vec2};

/// Tolerance used when classifying transformed shapes
const SHAPE_EPSILON: f32 = 1e-6;

/// Anything with a support mapping
///
/// This is the only primitive the narrow phase needs from a shape.
pub trait SupportMap {
    /// Farthest point of the shape along `direction`
    fn support(&self, direction: &Vec2) -> Vec2;
}

/// Convex geometric primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Single point
    Point(Vec2),

    /// Line segment
    Line {
        /// First endpoint
        p1: Vec2,
        /// Second endpoint
        p2: Vec2,
    },

    /// Circle
    Circle {
        /// Center
        center: Vec2,
        /// Radius
        radius: f32,
    },

    /// Axis-aligned rectangle
    Rect {
        /// Minimum corner
        pos: Vec2,
        /// Extent along x
        width: f32,
        /// Extent along y
        height: f32,
    },

    /// Ellipse whose semi-axes are the columns of `basis`
    Ellipse {
        /// Center
        center: Vec2,
        /// Maps the unit circle onto the ellipse
        basis: Mat2,
    },

    /// Convex polygon
    Polygon(Vec<Vec2>),
}

impl Shape {
    /// Circle shape
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    /// Rectangle from its minimum corner and size
    pub fn rect(pos: Vec2, width: f32, height: f32) -> Self {
        Self::Rect { pos, width, height }
    }

    /// Line segment
    pub fn line(p1: Vec2, p2: Vec2) -> Self {
        Self::Line { p1, p2 }
    }

    /// Axis-aligned ellipse with the given radii
    pub fn ellipse(center: Vec2, radius_x: f32, radius_y: f32) -> Self {
        Self::Ellipse {
            center,
            basis: Mat2::from_diagonal(&Vec2::new(radius_x, radius_y)),
        }
    }

    /// Convex polygon. Needs at least three vertices.
    pub fn polygon(points: Vec<Vec2>) -> Result<Self, PhysicsError> {
        if points.len() < 3 {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(PhysicsError::InvalidShape("polygon has a non-finite vertex".to_string()));
        }
        Ok(Self::Polygon(points))
    }

    /// Check dimensions are finite and non-negative
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let ok = match self {
            Self::Point(p) => p.iter().all(|c| c.is_finite()),
            Self::Line { p1, p2 } => p1.iter().chain(p2.iter()).all(|c| c.is_finite()),
            Self::Circle { center, radius } => {
                center.iter().all(|c| c.is_finite()) && radius.is_finite() && *radius >= 0.0
            }
            Self::Rect { pos, width, height } => {
                pos.iter().all(|c| c.is_finite())
                    && width.is_finite()
                    && height.is_finite()
                    && *width >= 0.0
                    && *height >= 0.0
            }
            Self::Ellipse { center, basis } => {
                center.iter().all(|c| c.is_finite()) && basis.iter().all(|c| c.is_finite())
            }
            Self::Polygon(points) => {
                points.len() >= 3 && points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
        };
        if ok {
            Ok(())
        } else {
            Err(PhysicsError::InvalidShape(format!("{self:?}")))
        }
    }

    /// Map the shape through an affine transform
    ///
    /// Rectangles stay rectangles only while the map is axis aligned, and
    /// circles stay circles only under similarity maps. Otherwise the result
    /// is a polygon or an ellipse.
    pub fn transform(&self, t: &Affine2) -> Self {
        match self {
            Self::Point(p) => Self::Point(t.transform_point(p)),
            Self::Line { p1, p2 } => Self::Line {
                p1: t.transform_point(p1),
                p2: t.transform_point(p2),
            },
            Self::Circle { center, radius } => {
                let center = t.transform_point(center);
                let c0 = t.linear.column(0).into_owned();
                let c1 = t.linear.column(1).into_owned();
                let similar = approx::abs_diff_eq!(c0.norm(), c1.norm(), epsilon = SHAPE_EPSILON)
                    && approx::abs_diff_eq!(c0.dot(&c1), 0.0, epsilon = SHAPE_EPSILON);
                if similar {
                    Self::Circle {
                        center,
                        radius: radius * c0.norm(),
                    }
                } else {
                    Self::Ellipse {
                        center,
                        basis: t.linear * *radius,
                    }
                }
            }
            Self::Rect { pos, width, height } => {
                let corners = rect_corners(pos, *width, *height);
                if t.is_axis_aligned() {
                    let a = t.transform_point(&corners[0]);
                    let b = t.transform_point(&corners[2]);
                    let min = a.inf(&b);
                    let max = a.sup(&b);
                    Self::Rect {
                        pos: min,
                        width: max.x - min.x,
                        height: max.y - min.y,
                    }
                } else {
                    Self::Polygon(corners.iter().map(|c| t.transform_point(c)).collect())
                }
            }
            Self::Ellipse { center, basis } => Self::Ellipse {
                center: t.transform_point(center),
                basis: t.linear * basis,
            },
            Self::Polygon(points) => Self::Polygon(points.iter().map(|p| t.transform_point(p)).collect()),
        }
    }

    /// Axis-aligned bounding box
    pub fn bbox(&self) -> Aabb {
        match self {
            Self::Rect { pos, width, height } => Aabb::new(*pos, pos + Vec2::new(*width, *height)),
            Self::Circle { center, radius } => {
                let r = Vec2::new(*radius, *radius);
                Aabb::new(center - r, center + r)
            }
            _ => {
                let max_x = self.support(&Vec2::new(1.0, 0.0)).x;
                let min_x = self.support(&Vec2::new(-1.0, 0.0)).x;
                let max_y = self.support(&Vec2::new(0.0, 1.0)).y;
                let min_y = self.support(&Vec2::new(0.0, -1.0)).y;
                Aabb::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
            }
        }
    }

    /// Point containment, boundary inclusive
    pub fn contains_point(&self, point: &Vec2) -> bool {
        match self {
            Self::Point(p) => (point - p).norm_squared() <= SHAPE_EPSILON,
            Self::Line { p1, p2 } => segment_distance_squared(point, p1, p2) <= SHAPE_EPSILON,
            Self::Circle { center, radius } => (point - center).norm_squared() <= radius * radius,
            Self::Rect { pos, width, height } => {
                point.x >= pos.x && point.x <= pos.x + width && point.y >= pos.y && point.y <= pos.y + height
            }
            Self::Ellipse { center, basis } => basis
                .try_inverse()
                .is_some_and(|inverse| (inverse * (point - center)).norm_squared() <= 1.0),
            Self::Polygon(points) => polygon_contains(points, point),
        }
    }

}

impl SupportMap for Shape {
    fn support(&self, direction: &Vec2) -> Vec2 {
        match self {
            Self::Point(p) => *p,
            Self::Line { p1, p2 } => {
                if p1.dot(direction) >= p2.dot(direction) {
                    *p1
                } else {
                    *p2
                }
            }
            Self::Circle { center, radius } => match direction.try_normalize(SHAPE_EPSILON) {
                Some(unit) => center + unit * *radius,
                None => center + Vec2::new(*radius, 0.0),
            },
            Self::Rect { pos, width, height } => Vec2::new(
                if direction.x >= 0.0 { pos.x + width } else { pos.x },
                if direction.y >= 0.0 { pos.y + height } else { pos.y },
            ),
            Self::Ellipse { center, basis } => {
                // Support of B * unit_circle along d is B * normalize(B^T d)
                match (basis.transpose() * direction).try_normalize(SHAPE_EPSILON) {
                    Some(unit) => center + basis * unit,
                    None => *center,
                }
            }
            Self::Polygon(points) => points
                .iter()
                .copied()
                .max_by(|a, b| a.dot(direction).partial_cmp(&b.dot(direction)).unwrap_or(Ordering::Equal))
                .unwrap_or_else(Vec2::zeros),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Create from corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Extent along x
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along y
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Both corners are finite
    pub fn is_finite(&self) -> bool {
        is_finite(&self.min) && is_finite(&self.max)
    }

    /// Closed-interval overlap on x
    pub fn overlaps_x(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && other.min.x <= self.max.x
    }

    /// Closed-interval overlap on y
    pub fn overlaps_y(&self, other: &Self) -> bool {
        self.min.y <= other.max.y && other.min.y <= self.max.y
    }

    /// Overlap on both axes
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

fn rect_corners(pos: &Vec2, width: f32, height: f32) -> [Vec2; 4] {
    [
        *pos,
        pos + Vec2::new(width, 0.0),
        pos + Vec2::new(width, height),
        pos + Vec2::new(0.0, height),
    ]
}

fn segment_distance_squared(point: &Vec2, a: &Vec2, b: &Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f32::EPSILON {
        return (point - a).norm_squared();
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm_squared()
}

/// Convex polygon containment for either winding
fn polygon_contains(points: &[Vec2], point: &Vec2) -> bool {
    let mut sign = 0.0_f32;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let side = cross(&(b - a), &(point - a));
        if side.abs() <= SHAPE_EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = side.signum();
        } else if side.signum() != sign {
            return false;
        }
    }
    !points.is_empty()
}

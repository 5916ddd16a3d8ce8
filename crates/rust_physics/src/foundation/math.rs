//! Math utilities and types
//!
//! Provides the fundamental 2D math types used by shapes, transforms and the
//! integrator. Rotations are expressed in degrees at the API surface.

use std::ops::Mul;

pub use nalgebra::{Matrix2, Rotation2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2x2 matrix type
pub type Mat2 = Matrix2<f32>;

/// Z component of the 3D cross product of two planar vectors
pub fn cross(a: &Vec2, b: &Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Vector rotated a quarter turn, `(-y, x)`
pub fn perp(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Unit vector at `degrees` measured from the +x axis towards +y
pub fn from_angle(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Projection of `v` onto `onto`. A zero-length `onto` projects to zero.
pub fn project(v: &Vec2, onto: &Vec2) -> Vec2 {
    let len_sq = onto.norm_squared();
    if len_sq <= f32::EPSILON {
        return Vec2::zeros();
    }
    onto * (v.dot(onto) / len_sq)
}

/// Unit "down" vector for a gravity vector, `(0, 1)` when gravity is zero
pub fn gravity_direction(gravity: &Vec2) -> Vec2 {
    gravity
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(|| Vec2::new(0.0, 1.0))
}

/// True when both components are finite
pub fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Affine map `p -> linear * p + translation`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    /// Rotation, scale and shear part
    pub linear: Mat2,
    /// Translation part
    pub translation: Vec2,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    /// Identity map
    pub fn identity() -> Self {
        Self {
            linear: Mat2::identity(),
            translation: Vec2::zeros(),
        }
    }

    /// Pure translation
    pub fn translation(offset: Vec2) -> Self {
        Self {
            linear: Mat2::identity(),
            translation: offset,
        }
    }

    /// Non-uniform scale about the origin
    pub fn scaling(scale: Vec2) -> Self {
        Self {
            linear: Mat2::from_diagonal(&scale),
            translation: Vec2::zeros(),
        }
    }

    /// Rotation about the origin, in degrees
    pub fn rotation(degrees: f32) -> Self {
        Self {
            linear: Rotation2::new(degrees.to_radians()).into_inner(),
            translation: Vec2::zeros(),
        }
    }

    /// Map a point
    pub fn transform_point(&self, point: &Vec2) -> Vec2 {
        self.linear * *point + self.translation
    }

    /// True when the linear part has no rotation or shear
    pub fn is_axis_aligned(&self) -> bool {
        approx::abs_diff_eq!(self.linear.m12, 0.0, epsilon = 1e-6)
            && approx::abs_diff_eq!(self.linear.m21, 0.0, epsilon = 1e-6)
    }
}

impl Mul for Affine2 {
    type Output = Self;

    /// `(a * b)(p) == a(b(p))`
    fn mul(self, rhs: Self) -> Self {
        Self {
            linear: self.linear * rhs.linear,
            translation: self.linear * rhs.translation + self.translation,
        }
    }
}

/// Planar transform of an entity
///
/// The world matrix is `translate(position) * rotate(rotation) * scale(scale) * translate(-origin)`,
/// so `origin` is the local anchor that ends up at `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// World position of the anchor
    pub position: Vec2,

    /// Rotation in degrees
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,

    /// Local anchor point
    pub origin: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            origin: Vec2::zeros(),
        }
    }
}

impl Transform2D {
    /// Create a transform at the given position
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set rotation in degrees
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Set the local anchor
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Local to world affine map
    pub fn to_affine(&self) -> Affine2 {
        Affine2::translation(self.position)
            * Affine2::rotation(self.rotation)
            * Affine2::scaling(self.scale)
            * Affine2::translation(-self.origin)
    }
}

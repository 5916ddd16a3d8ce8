//! Collider component

use crate::error::PhysicsError;
use crate::foundation::math::{is_finite, Affine2, Transform2D, Vec2};

use super::shape::{Aabb, Shape};

/// Collider attached to an entity
///
/// Holds the local shape and the world-space shape and bounding box computed
/// from the owner's transform the last time [`Area::update_world`] ran.
#[derive(Debug, Clone)]
pub struct Area {
    shape: Shape,

    /// Local offset applied before the entity transform
    pub offset: Vec2,

    /// Local scale applied before the entity transform
    pub scale: Vec2,

    collision_ignore: Vec<String>,
    world_shape: Option<Shape>,
    world_bbox: Option<Aabb>,
}

impl Area {
    /// Create a collider for the given local shape
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            offset: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            collision_ignore: Vec::new(),
            world_shape: None,
            world_bbox: None,
        }
    }

    /// Rectangle collider with its minimum corner at the local origin
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(Shape::rect(Vec2::zeros(), width, height))
    }

    /// Circle collider centered on the local origin
    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::circle(Vec2::zeros(), radius))
    }

    /// Set the local offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set the local scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Never collide with entities carrying any of these tags
    pub fn with_collision_ignore<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collision_ignore.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add a tag to the ignore list
    pub fn ignore(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.collision_ignore.contains(&tag) {
            self.collision_ignore.push(tag);
        }
    }

    /// Ignored tags
    pub fn collision_ignore(&self) -> &[String] {
        &self.collision_ignore
    }

    /// Check the local shape and the offset and scale are usable
    pub fn validate(&self) -> Result<(), PhysicsError> {
        self.shape.validate()?;
        if !(is_finite(&self.offset) && is_finite(&self.scale)) {
            return Err(PhysicsError::InvalidShape(format!(
                "area offset {:?} and scale {:?} must be finite",
                self.offset, self.scale
            )));
        }
        Ok(())
    }

    /// Local shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Map from collider space into entity space
    pub fn local_transform(&self) -> Affine2 {
        Affine2::translation(self.offset) * Affine2::scaling(self.scale)
    }

    /// Recompute the world shape and bounding box for `transform`
    pub fn update_world(&mut self, transform: &Transform2D) -> &Shape {
        let world = self.shape.transform(&(transform.to_affine() * self.local_transform()));
        self.world_bbox = Some(world.bbox());
        self.world_shape.insert(world)
    }

    /// World shape from the last update
    pub fn world_shape(&self) -> Option<&Shape> {
        self.world_shape.as_ref()
    }

    /// World bounding box from the last update
    pub fn world_bbox(&self) -> Option<Aabb> {
        self.world_bbox
    }
}

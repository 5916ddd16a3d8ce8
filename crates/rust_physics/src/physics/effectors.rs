//! Force effectors
//!
//! Effectors turn overlap into force. Each collision-driven effector runs
//! once per overlapping pair per pass, as part of its owner's update event,
//! and only ever calls [`Body::add_force`] on the other entity.
//!
//! [`Body::add_force`]: super::Body::add_force

use log::trace;
use serde::{Deserialize, Serialize};

use super::collision::Collision;
use super::host::{HasArea, HasBody, HasEffectors};
use super::shape::Aabb;
use crate::foundation::math::{from_angle, gravity_direction, perp, project, Vec2};

/// Smallest distance the point effector divides by
const MIN_DISTANCE: f32 = 1e-4;

/// Distance falloff of a point effector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceMode {
    /// Same force at any distance
    Constant,
    /// Force proportional to `1 / d`
    #[default]
    InverseLinear,
    /// Force proportional to `1 / d^2`
    InverseSquared,
}

/// Conveyor belt surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceEffector {
    /// Belt speed along the contact tangent
    pub speed: f32,
    /// Fraction of the velocity error corrected per event
    pub force_scale: f32,
}

impl SurfaceEffector {
    /// Belt moving at `speed`
    pub fn new(speed: f32) -> Self {
        Self { speed, force_scale: 0.1 }
    }

    /// Force pushing the target towards belt speed
    ///
    /// The tangent is the contact normal rotated a quarter turn, so with
    /// gravity pointing down a positive speed carries objects on top of the
    /// belt towards +x.
    pub fn force(&self, normal: &Vec2, velocity: &Vec2, mass: f32) -> Vec2 {
        let tangent = perp(normal);
        let current = project(velocity, &tangent);
        let wanted = tangent * self.speed;
        (wanted - current) * mass * self.force_scale
    }
}

/// Uniform directional field such as wind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaEffector {
    /// Direction in degrees
    pub force_angle: f32,
    /// Force strength
    pub force_magnitude: f32,
    /// Ignore the owning entity's rotation
    pub use_global_angle: bool,
}

impl AreaEffector {
    /// Field pushing along `force_angle` degrees
    pub fn new(force_angle: f32, force_magnitude: f32) -> Self {
        Self {
            force_angle,
            force_magnitude,
            use_global_angle: false,
        }
    }

    /// Force for an effector rotated by `rotation` degrees
    pub fn force(&self, rotation: f32) -> Vec2 {
        let angle = if self.use_global_angle {
            self.force_angle
        } else {
            self.force_angle + rotation
        };
        from_angle(angle) * self.force_magnitude
    }
}

/// Attractor or repulsor centered on the owning entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointEffector {
    /// Force strength; negative repels
    pub force_magnitude: f32,
    /// Multiplier applied to distances before falloff
    pub distance_scale: f32,
    /// Falloff curve
    pub force_mode: ForceMode,
}

impl PointEffector {
    /// Inverse-linear attractor
    pub fn new(force_magnitude: f32) -> Self {
        Self {
            force_magnitude,
            distance_scale: 1.0,
            force_mode: ForceMode::InverseLinear,
        }
    }

    /// Set falloff curve
    pub fn with_mode(mut self, force_mode: ForceMode) -> Self {
        self.force_mode = force_mode;
        self
    }

    /// Force on a target at `target` from an effector at `center`
    ///
    /// Distances are measured in tenths of world units times
    /// `distance_scale`. A target sitting exactly on the center gets no force.
    pub fn force(&self, center: &Vec2, target: &Vec2) -> Vec2 {
        let offset = center - target;
        let Some(direction) = offset.try_normalize(MIN_DISTANCE) else {
            trace!("Point effector target is concentric, no force");
            return Vec2::zeros();
        };
        let distance = (offset.norm() * self.distance_scale / 10.0).max(MIN_DISTANCE);
        let falloff = match self.force_mode {
            ForceMode::Constant => 1.0,
            ForceMode::InverseLinear => 1.0 / distance,
            ForceMode::InverseSquared => 1.0 / (distance * distance),
        };
        direction * self.force_magnitude * falloff
    }
}

/// Fluid volume whose surface is a horizontal line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuoyancyEffector {
    /// Y coordinate of the fluid surface; the fluid lies on the gravity side
    pub surface_level: f32,
    /// Fluid density relative to the floating bodies; above 1 floats them
    pub density: f32,
    /// Velocity damping while submerged
    pub linear_drag: f32,
    /// Current direction in degrees
    pub flow_angle: f32,
    /// Current strength
    pub flow_magnitude: f32,
}

impl BuoyancyEffector {
    /// Still fluid with a little drag
    pub fn new(surface_level: f32, density: f32) -> Self {
        Self {
            surface_level,
            density,
            linear_drag: 1.0,
            flow_angle: 0.0,
            flow_magnitude: 0.0,
        }
    }

    /// Share of `bbox` below the surface, in `[0, 1]`
    pub fn submerged_fraction(&self, bbox: &Aabb, gravity: &Vec2) -> f32 {
        let height = bbox.height();
        if height <= 0.0 {
            return if self.is_below_surface(bbox.min.y, gravity) { 1.0 } else { 0.0 };
        }
        let submerged = if gravity_direction(gravity).y >= 0.0 {
            bbox.max.y - self.surface_level.max(bbox.min.y)
        } else {
            self.surface_level.min(bbox.max.y) - bbox.min.y
        };
        (submerged / height).clamp(0.0, 1.0)
    }

    fn is_below_surface(&self, y: f32, gravity: &Vec2) -> bool {
        if gravity_direction(gravity).y >= 0.0 {
            y >= self.surface_level
        } else {
            y <= self.surface_level
        }
    }

    /// Lift, drag and flow on a partially submerged body
    pub fn force(&self, bbox: &Aabb, velocity: &Vec2, mass: f32, gravity: &Vec2) -> Vec2 {
        let fraction = self.submerged_fraction(bbox, gravity);
        if fraction <= 0.0 {
            return Vec2::zeros();
        }
        let lift = -gravity * mass * self.density;
        let drag = -velocity * self.linear_drag * mass;
        let flow = from_angle(self.flow_angle) * self.flow_magnitude;
        (lift + drag + flow) * fraction
    }
}

/// Collision-driven force generator attached to an entity with an area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effector {
    /// Conveyor surface
    Surface(SurfaceEffector),
    /// Directional field
    Area(AreaEffector),
    /// Point attractor
    Point(PointEffector),
    /// Fluid volume
    Buoyancy(BuoyancyEffector),
}

/// Everything an effector may read about one overlapping pair
#[derive(Debug, Clone, Copy)]
pub struct EffectorInput<'a> {
    /// Event seen from the effector
    pub collision: &'a Collision,
    /// Effector world position
    pub position: Vec2,
    /// Effector rotation in degrees
    pub rotation: f32,
    /// Target world position
    pub target_position: Vec2,
    /// Target velocity
    pub target_velocity: Vec2,
    /// Target mass
    pub target_mass: f32,
    /// Target world bounding box
    pub target_bbox: Option<Aabb>,
}

impl Effector {
    /// Force this effector applies to the target of `input`
    pub fn force(&self, input: &EffectorInput<'_>) -> Vec2 {
        match self {
            Self::Surface(surface) => {
                surface.force(&input.collision.normal, &input.target_velocity, input.target_mass)
            }
            Self::Area(area) => area.force(input.rotation),
            Self::Point(point) => point.force(&input.position, &input.target_position),
            Self::Buoyancy(buoyancy) => input.target_bbox.map_or_else(Vec2::zeros, |bbox| {
                buoyancy.force(&bbox, &input.target_velocity, input.target_mass, &input.collision.gravity())
            }),
        }
    }
}

macro_rules! impl_from_effector {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Effector {
                fn from(effector: $ty) -> Self {
                    Self::$variant(effector)
                }
            }
        )*
    };
}

impl_from_effector! {
    SurfaceEffector => Surface,
    AreaEffector => Area,
    PointEffector => Point,
    BuoyancyEffector => Buoyancy,
}

/// Force added to a body on every regular update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantForce {
    /// Force vector
    pub force: Vec2,
}

impl ConstantForce {
    /// Constant push
    pub fn new(force: Vec2) -> Self {
        Self { force }
    }
}

/// Let the source's effector act on the target of `collision`
///
/// Only dynamic targets receive force. Nothing happens if either entity has
/// been destroyed earlier in the pass.
pub fn apply_effector<H>(host: &mut H, collision: &Collision)
where
    H: HasArea + HasBody + HasEffectors + ?Sized,
{
    let Some(effector) = host.effector(collision.source).copied() else {
        return;
    };
    let Some(body) = host.body(collision.target) else {
        return;
    };
    if !body.is_dynamic() {
        return;
    }

    let (position, rotation) = host
        .transform(collision.source)
        .map_or((Vec2::zeros(), 0.0), |t| (t.position, t.rotation));
    let input = EffectorInput {
        collision,
        position,
        rotation,
        target_position: host.position(collision.target).unwrap_or_else(Vec2::zeros),
        target_velocity: body.vel,
        target_mass: body.mass(),
        target_bbox: host.world_bbox(collision.target),
    };

    let force = effector.force(&input);
    trace!("{:?} pushes {:?} with {force:?}", collision.source, collision.target);
    if let Some(body) = host.body_mut(collision.target) {
        body.add_force(force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_point_effector_inverse_linear_halves_with_distance() {
        let magnet = PointEffector::new(10.0);
        let center = Vec2::zeros();

        let near = magnet.force(&center, &Vec2::new(10.0, 0.0));
        let far = magnet.force(&center, &Vec2::new(20.0, 0.0));

        assert_relative_eq!(near, Vec2::new(-10.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(far.norm(), near.norm() * 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_point_effector_modes() {
        let target = Vec2::new(0.0, 20.0);
        let constant = PointEffector::new(10.0).with_mode(ForceMode::Constant);
        let squared = PointEffector::new(10.0).with_mode(ForceMode::InverseSquared);

        assert_relative_eq!(constant.force(&Vec2::zeros(), &target), Vec2::new(0.0, -10.0), epsilon = EPSILON);
        assert_relative_eq!(squared.force(&Vec2::zeros(), &target), Vec2::new(0.0, -2.5), epsilon = EPSILON);
    }

    #[test]
    fn test_point_effector_concentric_target_is_finite() {
        let magnet = PointEffector::new(10.0).with_mode(ForceMode::InverseSquared);
        let force = magnet.force(&Vec2::new(3.0, 3.0), &Vec2::new(3.0, 3.0));
        assert_eq!(force, Vec2::zeros());

        let close = magnet.force(&Vec2::zeros(), &Vec2::new(1e-3, 0.0));
        assert!(close.x.is_finite() && close.y.is_finite());
    }

    #[test]
    fn test_surface_effector_drives_towards_belt_speed() {
        let belt = SurfaceEffector::new(20.0);
        // Belt below, box above: normal from belt to box points up
        let up = Vec2::new(0.0, -1.0);

        let at_rest = belt.force(&up, &Vec2::zeros(), 1.0);
        assert_relative_eq!(at_rest, Vec2::new(2.0, 0.0), epsilon = EPSILON);

        let at_speed = belt.force(&up, &Vec2::new(20.0, 5.0), 1.0);
        assert_relative_eq!(at_speed, Vec2::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_area_effector_angle() {
        let mut wind = AreaEffector::new(-90.0, 10.0);
        assert_relative_eq!(wind.force(0.0), Vec2::new(0.0, -10.0), epsilon = EPSILON);
        assert_relative_eq!(wind.force(90.0), Vec2::new(10.0, 0.0), epsilon = EPSILON);

        wind.use_global_angle = true;
        assert_relative_eq!(wind.force(90.0), Vec2::new(0.0, -10.0), epsilon = EPSILON);
    }

    #[test]
    fn test_buoyancy_scales_with_submersion() {
        let water = BuoyancyEffector {
            linear_drag: 0.0,
            ..BuoyancyEffector::new(200.0, 3.0)
        };
        let gravity = Vec2::new(0.0, 300.0);

        let half = Aabb::new(Vec2::new(0.0, 190.0), Vec2::new(20.0, 210.0));
        assert_relative_eq!(water.submerged_fraction(&half, &gravity), 0.5);
        assert_relative_eq!(water.force(&half, &Vec2::zeros(), 1.0, &gravity), Vec2::new(0.0, -450.0), epsilon = EPSILON);

        let dry = Aabb::new(Vec2::new(0.0, 100.0), Vec2::new(20.0, 120.0));
        assert_eq!(water.force(&dry, &Vec2::zeros(), 1.0, &gravity), Vec2::zeros());

        let sunk = Aabb::new(Vec2::new(0.0, 300.0), Vec2::new(20.0, 320.0));
        assert_relative_eq!(water.submerged_fraction(&sunk, &gravity), 1.0);
    }

    #[test]
    fn test_buoyancy_drag_opposes_motion() {
        let water = BuoyancyEffector::new(0.0, 0.0);
        let bbox = Aabb::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 20.0));
        let force = water.force(&bbox, &Vec2::new(5.0, 0.0), 2.0, &Vec2::new(0.0, 300.0));
        assert_relative_eq!(force, Vec2::new(-10.0, 0.0), epsilon = EPSILON);
    }
}

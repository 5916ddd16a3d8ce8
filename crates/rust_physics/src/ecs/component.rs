//! Component trait and implementations

use std::fmt;

use slotmap::SecondaryMap;

use super::{Entity, World};
use crate::error::PhysicsError;
use crate::foundation::math::Transform2D;
use crate::physics::{Area, Body, ConstantForce, Effector};

/// Kind tag for each component type, used in lifecycle events and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Transform2D`]
    Transform,
    /// [`Area`]
    Area,
    /// [`Body`]
    Body,
    /// [`Effector`]
    Effector,
    /// [`ConstantForce`]
    ConstantForce,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transform => "transform",
            Self::Area => "area",
            Self::Body => "body",
            Self::Effector => "effector",
            Self::ConstantForce => "constant force",
        };
        f.write_str(name)
    }
}

/// Data that can be attached to an entity
pub trait Component: 'static + Sized {
    /// Kind tag
    const KIND: ComponentKind;

    /// Storage for this component type
    fn storage(world: &World) -> &SecondaryMap<Entity, Self>;

    /// Mutable storage for this component type
    fn storage_mut(world: &mut World) -> &mut SecondaryMap<Entity, Self>;

    /// Reject values that would poison the simulation. Called on attach.
    fn validate(&self) -> Result<(), PhysicsError> {
        Ok(())
    }
}

macro_rules! impl_component {
    ($ty:ty, $kind:ident, $field:ident $(, validate = $validate:path)?) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn storage(world: &World) -> &SecondaryMap<Entity, Self> {
                &world.$field
            }

            fn storage_mut(world: &mut World) -> &mut SecondaryMap<Entity, Self> {
                &mut world.$field
            }

            $(
                fn validate(&self) -> Result<(), PhysicsError> {
                    $validate(self)
                }
            )?
        }
    };
}

impl_component!(Transform2D, Transform, transforms);
impl_component!(Area, Area, areas, validate = Area::validate);
impl_component!(Body, Body, bodies);
impl_component!(Effector, Effector, effectors);
impl_component!(ConstantForce, ConstantForce, constant_forces);

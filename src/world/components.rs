//! Tags and shapes the birb reads from the scene.
use bevy::{
    math::bounding::{Aabb3d, BoundingVolume},
    prelude::*,
};

/// A player pawn. Birbs on a `DealWithPlayer` mission pick one of these.
#[derive(Component, Debug, Default)]
pub struct Player;

/// A prop that may be carried away.
#[derive(Component, Debug, Default)]
pub struct Removable;

/// Blocks line of sight.
#[derive(Component, Debug, Default)]
pub struct Solid;

/// Static level geometry; blocks line of sight.
#[derive(Component, Debug, Default)]
pub struct WorldGeometry;

/// Axis-aligned box collider centred on the entity's global translation.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub half_extents: Vec3,
}

impl Collider {
    pub fn cuboid(size: Vec3) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }

    pub fn world_aabb(&self, transform: &GlobalTransform) -> Aabb3d {
        let (scale, _, translation) = transform.to_scale_rotation_translation();
        Aabb3d::new(translation, self.half_extents * scale.abs())
    }
}

/// Bounds of an entity in its own local space.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LocalBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl LocalBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of `size` with its base centred on the origin.
    pub fn standing(size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(Vec3::new(-half.x, 0.0, -half.z), Vec3::new(half.x, size.y, half.z))
    }

    /// Box of `size` centred on the origin.
    pub fn centred(size: Vec3) -> Self {
        Self::new(-size * 0.5, size * 0.5)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        Vec3::from(self.as_aabb().center())
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::from(self.as_aabb().closest_point(point))
    }

    fn as_aabb(&self) -> Aabb3d {
        Aabb3d {
            min: self.min.into(),
            max: self.max.into(),
        }
    }
}

/// Articulated physics on a prop; disabled while a birb carries it.
#[derive(Component, Debug, Clone, Copy)]
pub struct ModelPhysics {
    pub enabled: bool,
}

/// Rigid body on a prop; disabled while a birb carries it.
#[derive(Component, Debug, Clone, Copy)]
pub struct RigidBody {
    pub enabled: bool,
}

impl Default for ModelPhysics {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Eye camera parented to the local player's body.
#[derive(Component, Debug, Default)]
pub struct PlayerCamera;

/// Look state for the local player's camera rig.
#[derive(Component)]
pub struct PlayerController {
    pub yaw: f32,
    pub pitch: f32,
    pub move_speed: f32,
    pub look_sensitivity: f32,
}

impl PlayerController {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch,
            move_speed: 8.0,
            look_sensitivity: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standing_bounds_sit_on_origin() {
        let bounds = LocalBounds::standing(Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(bounds.min.y, 0.0);
        assert_eq!(bounds.max.y, 2.0);
        assert_eq!(bounds.size(), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn closest_point_clamps_to_box() {
        let bounds = LocalBounds::centred(Vec3::splat(2.0));
        assert_eq!(
            bounds.closest_point(Vec3::new(5.0, 0.5, -9.0)),
            Vec3::new(1.0, 0.5, -1.0)
        );
        assert_eq!(bounds.closest_point(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn collider_follows_transform_scale() {
        let collider = Collider::cuboid(Vec3::splat(2.0));
        let transform =
            GlobalTransform::from(Transform::from_xyz(3.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        let aabb = collider.world_aabb(&transform);
        assert_eq!(Vec3::from(aabb.min), Vec3::new(1.0, -2.0, -2.0));
        assert_eq!(Vec3::from(aabb.max), Vec3::new(5.0, 2.0, 2.0));
    }
}

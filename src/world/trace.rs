//! Line-of-sight traces against scene colliders.
use bevy::{
    ecs::system::SystemParam,
    math::bounding::{Aabb3d, RayCast3d},
    prelude::*,
};

use crate::world::components::{Collider, Player, Removable, Solid, WorldGeometry};

/// Answers "can I see `to` from `from`?".
pub trait LineOfSight {
    fn is_clear(&self, from: Vec3, to: Vec3) -> bool;
}

/// First blocking collider along a trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub entity: Entity,
    pub distance: f32,
    pub position: Vec3,
}

/// A collider as seen by the trace, with the tags that decide whether it blocks.
#[derive(Debug, Clone, Copy)]
pub struct TraceCandidate {
    pub entity: Entity,
    pub aabb: Aabb3d,
    pub solid: bool,
    pub world: bool,
    pub player: bool,
    pub removable: bool,
}

impl TraceCandidate {
    /// Hits anything tagged solid or world, but never players or removable props.
    fn blocks(&self) -> bool {
        (self.solid || self.world) && !self.player && !self.removable
    }
}

/// Casts a segment from `from` to `to` and returns the nearest blocking hit.
pub fn trace_segment(
    from: Vec3,
    to: Vec3,
    ignore: Option<Entity>,
    candidates: impl IntoIterator<Item = TraceCandidate>,
) -> Option<TraceHit> {
    let delta = to - from;
    let length = delta.length();
    let Ok(direction) = Dir3::new(delta) else {
        return None;
    };
    let ray = RayCast3d::from_ray(Ray3d::new(from, direction), length);

    candidates
        .into_iter()
        .filter(|candidate| Some(candidate.entity) != ignore && candidate.blocks())
        .filter_map(|candidate| {
            ray.aabb_intersection_at(&candidate.aabb)
                .map(|distance| TraceHit {
                    entity: candidate.entity,
                    distance,
                    position: from + direction * distance,
                })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Scene-wide trace access for systems.
#[derive(SystemParam)]
pub struct SceneTrace<'w, 's> {
    colliders: Query<
        'w,
        's,
        (
            Entity,
            &'static Collider,
            &'static GlobalTransform,
            Has<Solid>,
            Has<WorldGeometry>,
            Has<Player>,
            Has<Removable>,
        ),
    >,
}

impl SceneTrace<'_, '_> {
    pub fn ray(&self, from: Vec3, to: Vec3, ignore: Option<Entity>) -> Option<TraceHit> {
        let candidates = self.colliders.iter().map(
            |(entity, collider, transform, solid, world, player, removable)| TraceCandidate {
                entity,
                aabb: collider.world_aabb(transform),
                solid,
                world,
                player,
                removable,
            },
        );
        trace_segment(from, to, ignore, candidates)
    }

    /// Line-of-sight view that never collides with `entity`.
    pub fn ignoring(&self, entity: Entity) -> TraceIgnoring<'_, '_, '_> {
        TraceIgnoring {
            trace: self,
            ignore: entity,
        }
    }
}

pub struct TraceIgnoring<'a, 'w, 's> {
    trace: &'a SceneTrace<'w, 's>,
    ignore: Entity,
}

impl LineOfSight for TraceIgnoring<'_, '_, '_> {
    fn is_clear(&self, from: Vec3, to: Vec3) -> bool {
        self.trace.ray(from, to, Some(self.ignore)).is_none()
    }
}

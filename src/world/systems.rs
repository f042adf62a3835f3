//! Systems for the demo world: scene setup, player controls and birb visuals.
use bevy::{
    ecs::message::MessageReader,
    input::{mouse::MouseMotion, ButtonInput},
    math::primitives::Plane3d,
    prelude::*,
    window::{CursorGrabMode, CursorOptions},
};

use crate::{
    birb::{
        components::StubbornBirb,
        effects::{ImpactEffect, ImpactKind},
        events::{BirbDespawned, DamageBirb, SpawnBirbRequest},
    },
    net::messages::{LocalConnection, NetworkOwner},
    world::{
        components::{
            Collider, LocalBounds, ModelPhysics, Player, PlayerCamera, PlayerController,
            RigidBody, Removable, Solid, WorldGeometry,
        },
        trace::SceneTrace,
    },
};

const GROUND_SIZE: f32 = 100.0;
const PLAYER_START_POS: Vec3 = Vec3::new(-6.0, 0.0, 8.0);
const PLAYER_SIZE: Vec3 = Vec3::new(0.5, 1.8, 0.5);
const EYE_HEIGHT: f32 = 1.6;
const BIRB_SIZE: Vec3 = Vec3::new(0.25, 0.2, 0.4);

/// How far a shot reaches and how close to the ray a birb must be.
const SHOT_RANGE: f32 = 60.0;
const SHOT_RADIUS: f32 = 0.35;
const SHOT_DAMAGE: f32 = 4.0;

const WALLS: [(Vec3, Vec3); 3] = [
    (Vec3::new(0.0, 2.0, -4.0), Vec3::new(12.0, 4.0, 0.5)),
    (Vec3::new(8.0, 1.5, 2.0), Vec3::new(0.5, 3.0, 10.0)),
    (Vec3::new(-10.0, 3.0, -10.0), Vec3::new(4.0, 6.0, 4.0)),
];

const PROPS: [(Vec3, Vec3); 4] = [
    (Vec3::new(2.0, 0.0, 3.0), Vec3::new(0.4, 0.3, 0.4)),
    (Vec3::new(-3.0, 0.0, 1.0), Vec3::new(0.3, 0.5, 0.3)),
    (Vec3::new(4.0, 0.0, -1.5), Vec3::new(0.6, 0.2, 0.4)),
    (Vec3::new(-1.0, 0.0, 6.0), Vec3::new(0.25, 0.25, 0.25)),
];

/// Spawns the demo scene: ground, walls, loose props, light and the local player.
pub fn spawn_world_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    local: Res<LocalConnection>,
) {
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Mesh::from(Plane3d::default()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(90, 140, 90),
            perceptual_roughness: 0.9,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(GROUND_SIZE)),
        // Plane is scaled; the collider is expressed in local units.
        Collider::cuboid(Vec3::new(1.0, 0.002, 1.0)),
        WorldGeometry,
    ));

    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(150, 140, 130),
        perceptual_roughness: 0.8,
        ..default()
    });
    for (center, size) in WALLS {
        commands.spawn((
            Name::new("Wall"),
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_translation(center),
            Collider::cuboid(size),
            Solid,
        ));
    }

    let prop_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(190, 150, 90),
        perceptual_roughness: 0.7,
        ..default()
    });
    for (base, size) in PROPS {
        commands
            .spawn((
                Name::new("Prop"),
                Transform::from_translation(base),
                Visibility::default(),
                Removable,
                LocalBounds::standing(size),
                ModelPhysics::default(),
                RigidBody::default(),
            ))
            .with_child((
                Mesh3d(meshes.add(Cuboid::from_size(size))),
                MeshMaterial3d(prop_material.clone()),
                Transform::from_xyz(0.0, size.y * 0.5, 0.0),
            ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 20_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(16.0, 32.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut body = Transform::from_translation(PLAYER_START_POS);
    body.look_at(Vec3::new(0.0, PLAYER_START_POS.y, 0.0), Vec3::Y);
    let (yaw, _) = yaw_pitch_from_transform(&body);

    commands
        .spawn((
            Name::new("Local player"),
            body,
            Visibility::default(),
            Player,
            NetworkOwner(local.0),
            LocalBounds::standing(PLAYER_SIZE),
            PlayerController::new(yaw, 0.0),
        ))
        .with_child((
            Camera3d::default(),
            Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
            PlayerCamera,
        ));
}

/// Toggles cursor grab when engaging mouse look.
pub fn update_cursor_grab(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut cursor_options: Single<&mut CursorOptions>,
) {
    if mouse_buttons.just_pressed(MouseButton::Right) {
        cursor_options.visible = false;
        cursor_options.grab_mode = CursorGrabMode::Locked;
    } else if mouse_buttons.just_released(MouseButton::Right) {
        cursor_options.visible = true;
        cursor_options.grab_mode = CursorGrabMode::None;
    }
}

/// Yaws the body and pitches the eye camera while the right mouse button is held.
pub fn player_mouse_look(
    mut motion_events: MessageReader<MouseMotion>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut bodies: Query<(&mut PlayerController, &mut Transform), Without<PlayerCamera>>,
    mut cameras: Query<&mut Transform, With<PlayerCamera>>,
) {
    let mut cumulative_delta = Vec2::ZERO;
    for ev in motion_events.read() {
        cumulative_delta += ev.delta;
    }

    if !mouse_buttons.pressed(MouseButton::Right) || cumulative_delta == Vec2::ZERO {
        return;
    }

    let Ok((mut controller, mut body)) = bodies.single_mut() else {
        return;
    };
    controller.yaw -= cumulative_delta.x * controller.look_sensitivity * time.delta_secs();
    controller.pitch -= cumulative_delta.y * controller.look_sensitivity * time.delta_secs();
    controller.pitch = controller.pitch.clamp(-1.54, 1.54);

    body.rotation = Quat::from_axis_angle(Vec3::Y, controller.yaw);
    if let Ok(mut camera) = cameras.single_mut() {
        camera.rotation = Quat::from_axis_angle(Vec3::X, controller.pitch);
    }
}

/// Walks the player on the ground plane with WASD; Ctrl to sprint.
pub fn player_translate(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<(&PlayerController, &mut Transform)>,
) {
    let Ok((controller, mut transform)) = query.single_mut() else {
        return;
    };

    let forward = {
        let f = transform.forward().as_vec3();
        Vec3::new(f.x, 0.0, f.z).normalize_or_zero()
    };
    let right = {
        let r = transform.right().as_vec3();
        Vec3::new(r.x, 0.0, r.z).normalize_or_zero()
    };

    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction += forward;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction -= forward;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction -= right;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction += right;
    }

    if direction.length_squared() > 0.0 {
        let modifier = if keyboard.pressed(KeyCode::ControlLeft) {
            2.5
        } else {
            1.0
        };
        transform.translation +=
            direction.normalize() * controller.move_speed * modifier * time.delta_secs();
    }
}

/// B releases a birb near the local player.
pub fn request_birb_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    local: Res<LocalConnection>,
    players: Query<(&GlobalTransform, &NetworkOwner), With<Player>>,
    mut requests: MessageWriter<SpawnBirbRequest>,
) {
    if !keyboard.just_pressed(KeyCode::KeyB) {
        return;
    }

    let Some((transform, _)) = players.iter().find(|(_, owner)| owner.0 == local.0) else {
        warn!("No local player to release a birb from");
        return;
    };

    requests.write(SpawnBirbRequest {
        requester: local.0,
        position: transform.translation(),
    });
}

/// Left click damages the birb closest along the camera ray. Walls stop the shot.
pub fn shoot_birbs(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    cameras: Query<&GlobalTransform, With<PlayerCamera>>,
    birbs: Query<(Entity, &GlobalTransform), With<StubbornBirb>>,
    trace: SceneTrace,
    mut damage: MessageWriter<DamageBirb>,
) {
    if !mouse_buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(camera) = cameras.single() else {
        return;
    };

    let origin = camera.translation();
    let direction = camera.forward().as_vec3();
    let range = trace
        .ray(origin, origin + direction * SHOT_RANGE, None)
        .map_or(SHOT_RANGE, |hit| hit.position.distance(origin));
    let candidates = birbs
        .iter()
        .map(|(entity, transform)| (entity, transform.translation()));

    if let Some((birb, position)) =
        pick_along_ray(origin, direction, range, SHOT_RADIUS, candidates)
    {
        damage.write(DamageBirb {
            birb,
            amount: SHOT_DAMAGE,
            position,
        });
    }
}

/// Nearest candidate within `radius` of the ray, with the point on the ray it was hit at.
pub fn pick_along_ray(
    origin: Vec3,
    direction: Vec3,
    range: f32,
    radius: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Option<(Entity, Vec3)> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    candidates
        .into_iter()
        .filter_map(|(entity, position)| {
            let along = (position - origin).dot(direction);
            if !(0.0..=range).contains(&along) {
                return None;
            }
            let on_ray = origin + direction * along;
            (on_ray.distance_squared(position) <= radius * radius).then_some((
                entity,
                on_ray,
                along,
            ))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(entity, point, _)| (entity, point))
}

/// Gives newly spawned birbs a body to look at.
pub fn attach_birb_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    birbs: Query<Entity, Added<StubbornBirb>>,
) {
    if birbs.is_empty() {
        return;
    }

    let mesh = meshes.add(Cuboid::from_size(BIRB_SIZE));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(120, 120, 135),
        perceptual_roughness: 0.6,
        ..default()
    });

    for birb in birbs.iter() {
        commands
            .entity(birb)
            .insert(Visibility::default())
            .with_child((Mesh3d(mesh.clone()), MeshMaterial3d(material.clone())));
    }
}

/// Feathers for flesh hits, grey chunks when the birb falls apart.
pub fn attach_impact_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    impacts: Query<(Entity, &ImpactEffect), Added<ImpactEffect>>,
) {
    for (entity, impact) in impacts.iter() {
        let (color, radius) = match impact.kind {
            ImpactKind::Flesh => (Color::srgb_u8(200, 60, 60), 0.08),
            ImpactKind::Cardboard => (Color::srgb_u8(160, 130, 90), 0.2),
        };
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Sphere::new(radius))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..default()
            })),
        ));
    }
}

pub fn log_birb_despawns(mut despawned: MessageReader<BirbDespawned>) {
    for event in despawned.read() {
        info!("Birb {:?} left the world: {:?}", event.birb, event.cause);
    }
}

fn yaw_pitch_from_transform(transform: &Transform) -> (f32, f32) {
    let forward = -transform.forward().as_vec3();
    let yaw = forward.x.atan2(forward.z);
    let pitch = forward.y.asin();
    (yaw, pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities<const N: usize>() -> [Entity; N] {
        let mut world = World::new();
        std::array::from_fn(|_| world.spawn_empty().id())
    }

    #[test]
    fn ray_picks_nearest_birb_in_front() {
        let [near, far, behind] = entities();
        let hit = pick_along_ray(
            Vec3::ZERO,
            Vec3::NEG_Z,
            50.0,
            0.5,
            [
                (far, Vec3::new(0.1, 0.0, -20.0)),
                (behind, Vec3::new(0.0, 0.0, 3.0)),
                (near, Vec3::new(0.0, 0.2, -5.0)),
            ],
        )
        .expect("near birb should be hit");

        assert_eq!(hit.0, near);
        assert!((hit.1 - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn ray_misses_birbs_off_axis_or_out_of_range() {
        let [wide, distant] = entities();
        assert!(pick_along_ray(
            Vec3::ZERO,
            Vec3::NEG_Z,
            50.0,
            0.5,
            [
                (wide, Vec3::new(2.0, 0.0, -5.0)),
                (distant, Vec3::new(0.0, 0.0, -80.0)),
            ],
        )
        .is_none());
    }

    #[test]
    fn facing_forward_has_zero_pitch() {
        let transform = Transform::from_xyz(0.0, 0.0, 0.0).looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::Y);
        let (_, pitch) = yaw_pitch_from_transform(&transform);
        assert!(pitch.abs() < 1e-4);
    }
}

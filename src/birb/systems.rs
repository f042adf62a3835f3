//! Systems that launch birbs, fly them, and shoot them down.
use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::{
    birb::{
        behaviour::{BirbEffect, TargetView, TickContext},
        components::{BirbMission, CarriedProp, StubbornBirb},
        config::BirbConfig,
        effects::{play_sound_at, play_sound_on, spawn_impact, AmbientNoise, BirbSound, ImpactKind},
        errors::{BirbError, TargetKind},
        events::{BirbDespawned, DamageBirb, DespawnCause, SpawnBirbRequest},
        targeting::{plan_launch, TargetCandidate},
    },
    core::{plugin::SimulationClock, rng::GameRng},
    net::messages::{BirbNetMessage, ConnectionId, NetworkOwner, NetworkRole, OutgoingRpc},
    world::{
        components::{LocalBounds, ModelPhysics, Player, Removable, RigidBody},
        trace::SceneTrace,
    },
};

/// Fresh birbs wait this far below their requested position until launched.
const PARKING_DEPTH: f32 = 250.0;

type TargetCandidateFilter = (
    Or<(With<Player>, With<Removable>)>,
    Without<ChildOf>,
    Without<StubbornBirb>,
);

type PropPhysicsQuery<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static mut ModelPhysics>,
        Option<&'static mut RigidBody>,
        &'static GlobalTransform,
    ),
    Without<StubbornBirb>,
>;

/// Spawns a birb per request and plans its mission. Hosts only.
#[allow(clippy::too_many_arguments)] // System function requires all arguments
pub fn handle_spawn_requests(
    mut commands: Commands,
    mut requests: MessageReader<SpawnBirbRequest>,
    role: Res<NetworkRole>,
    config: Res<BirbConfig>,
    mut rng: ResMut<GameRng>,
    trace: SceneTrace,
    owned: Query<&NetworkOwner, With<StubbornBirb>>,
    targets: Query<(Entity, &GlobalTransform, Option<&LocalBounds>, Has<Player>), TargetCandidateFilter>,
    mut outgoing: MessageWriter<OutgoingRpc>,
    mut despawned: MessageWriter<BirbDespawned>,
) {
    if !role.is_host() {
        for request in requests.read() {
            debug!("Client ignores birb request from {}", request.requester);
        }
        return;
    }

    let candidates: Vec<TargetCandidate> = targets
        .iter()
        .map(|(entity, transform, bounds, is_player)| TargetCandidate {
            entity,
            kind: if is_player {
                TargetKind::Player
            } else {
                TargetKind::Prop
            },
            position: transform.translation(),
            bounds: bounds.copied(),
        })
        .collect();

    // Birbs spawned earlier this frame are not visible to `owned` yet.
    let mut launched: HashMap<ConnectionId, usize> = HashMap::new();

    for request in requests.read() {
        let owner = request.requester;
        let entity = commands
            .spawn((
                Name::new("Stubborn Birb"),
                StubbornBirb::waiting(config.max_health),
                NetworkOwner(owner),
                Transform::from_translation(request.position - Vec3::Y * PARKING_DEPTH),
            ))
            .id();

        // Counts the birb being spawned as well.
        let owned_with_this = owned.iter().filter(|owned| owned.0 == owner).count()
            + launched.get(&owner).copied().unwrap_or(0)
            + 1;

        let plan = if owned_with_this >= config.spawn.max_per_owner {
            Err(BirbError::TooManyBirbs {
                max: config.spawn.max_per_owner,
            })
        } else {
            let mission = BirbMission::random(&mut rng);
            plan_launch(
                &candidates,
                mission,
                &trace.ignoring(entity),
                &config,
                &mut rng,
            )
        };

        match plan {
            Ok(plan) => {
                let mut birb = StubbornBirb::waiting(config.max_health);
                birb.launch(plan, &mut rng, &config);
                commands.entity(entity).insert((
                    birb,
                    AmbientNoise::new(),
                    Transform::from_translation(plan.spawn_point),
                ));
                *launched.entry(owner).or_default() += 1;
                info!(
                    "Birb {} launched for {} ({:?}) from {:.1?}",
                    entity, owner, plan.mission, plan.spawn_point
                );
            }
            Err(reason) => {
                report_abort(entity, Some(owner), &reason, &mut outgoing);
                commands.entity(entity).despawn();
                despawned.write(BirbDespawned {
                    birb: entity,
                    cause: DespawnCause::Aborted(reason),
                });
            }
        }
    }
}

/// Runs one state machine tick per birb and applies what it asks for.
#[allow(clippy::too_many_arguments)] // System function requires all arguments
pub fn update_birbs(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    config: Res<BirbConfig>,
    mut rng: ResMut<GameRng>,
    trace: SceneTrace,
    mut birbs: Query<(Entity, &mut StubbornBirb, &mut Transform, Option<&NetworkOwner>)>,
    targets: Query<
        (
            &GlobalTransform,
            Option<&LocalBounds>,
            Option<&NetworkOwner>,
            Option<&ChildOf>,
        ),
        Without<StubbornBirb>,
    >,
    mut props: PropPhysicsQuery,
    mut outgoing: MessageWriter<OutgoingRpc>,
    mut despawned: MessageWriter<BirbDespawned>,
) {
    let ctx = TickContext {
        now: clock.now(),
        delta: clock.delta_secs(),
        config: &config,
    };
    // Parenting is deferred, so same-frame grabs are tracked here.
    let mut grabbed: HashSet<Entity> = HashSet::new();

    for (entity, mut birb, mut transform, owner) in birbs.iter_mut() {
        let target = birb.target.and_then(|target| {
            targets
                .get(target)
                .ok()
                // Picked up by something else: no longer ours to chase.
                .filter(|(_, _, _, parent)| {
                    parent.is_none_or(|parent| parent.parent() == entity)
                        && !grabbed.contains(&target)
                })
                .map(|(transform, bounds, owner, _)| TargetView {
                    entity: target,
                    transform: *transform,
                    bounds: bounds.copied(),
                    owner: owner.map(|owner| owner.0),
                })
        });

        let effects = birb.tick(
            &mut transform,
            target.as_ref(),
            &trace.ignoring(entity),
            &mut rng,
            &ctx,
        );

        for effect in effects {
            match effect {
                BirbEffect::PlaySoundAt { sound, position } => {
                    play_sound_at(&mut commands, sound, position);
                }
                BirbEffect::StartPoopingSound => {
                    birb.sounds.pooping =
                        Some(play_sound_on(&mut commands, BirbSound::Pooping, entity, true));
                }
                BirbEffect::StopPoopingSound => {
                    if let Some(sound) = birb.sounds.pooping.take() {
                        commands.entity(sound).try_despawn();
                    }
                }
                BirbEffect::PoopedOn { owner: Some(victim) } => {
                    info!("Birb {} pooped on {}", entity, victim);
                    outgoing.write(OutgoingRpc::to(victim, BirbNetMessage::Pooping));
                }
                BirbEffect::PoopedOn { owner: None } => {
                    debug!("Birb {} pooped on a target nobody owns", entity);
                }
                BirbEffect::GrabProp { prop } => {
                    if !grabbed.insert(prop) {
                        debug!("Birb {} lost prop {} to another birb", entity, prop);
                        continue;
                    }
                    if let Some(view) = target.filter(|view| view.entity == prop) {
                        birb.carried =
                            Some(grab_prop(&mut commands, &mut props, entity, &transform, &view));
                        info!("Birb {} grabbed prop {}", entity, prop);
                    }
                }
                BirbEffect::Abort(reason) => {
                    report_abort(entity, owner.map(|owner| owner.0), &reason, &mut outgoing);
                }
                BirbEffect::ArrivedHome => {
                    info!("Birb {} made it home", entity);
                    commands.entity(entity).despawn();
                    despawned.write(BirbDespawned {
                        birb: entity,
                        cause: DespawnCause::ArrivedHome,
                    });
                }
            }
        }
    }
}

/// Applies hits; a dead birb drops whatever it carried.
pub fn apply_birb_damage(
    mut commands: Commands,
    mut hits: MessageReader<DamageBirb>,
    mut birbs: Query<(&mut StubbornBirb, &Transform)>,
    mut props: PropPhysicsQuery,
    mut despawned: MessageWriter<BirbDespawned>,
) {
    for hit in hits.read() {
        let Ok((mut birb, transform)) = birbs.get_mut(hit.birb) else {
            continue;
        };
        // Several hits in one frame: only the first kill counts.
        if birb.is_dead() {
            continue;
        }

        play_sound_at(&mut commands, BirbSound::Damage, transform.translation);
        spawn_impact(&mut commands, ImpactKind::Flesh, hit.position);

        if !birb.take_damage(hit.amount) {
            continue;
        }

        spawn_impact(&mut commands, ImpactKind::Cardboard, hit.position);

        if let Some(carried) = birb.carried.take() {
            drop_prop(&mut commands, &mut props, carried);
        } else if let Some(sound) = birb.sounds.pooping.take() {
            commands.entity(sound).try_despawn();
        }
        if let Some(sound) = birb.sounds.noise.take() {
            commands.entity(sound).try_despawn();
        }

        info!("Birb {} was shot down", hit.birb);
        commands.entity(hit.birb).despawn();
        despawned.write(BirbDespawned {
            birb: hit.birb,
            cause: DespawnCause::Killed,
        });
    }
}

fn grab_prop(
    commands: &mut Commands,
    props: &mut PropPhysicsQuery,
    birb: Entity,
    birb_transform: &Transform,
    prop: &TargetView,
) -> CarriedProp {
    let (had_model_physics, had_rigid_body) = match props.get_mut(prop.entity) {
        Ok((model_physics, rigid_body, _)) => (
            model_physics
                .map(|mut physics| physics.enabled = false)
                .is_some(),
            rigid_body.map(|mut body| body.enabled = false).is_some(),
        ),
        Err(_) => (false, false),
    };

    let local = prop
        .transform
        .reparented_to(&GlobalTransform::from(*birb_transform));
    commands.entity(prop.entity).insert((ChildOf(birb), local));

    CarriedProp {
        entity: prop.entity,
        had_model_physics,
        had_rigid_body,
    }
}

fn drop_prop(commands: &mut Commands, props: &mut PropPhysicsQuery, carried: CarriedProp) {
    let Ok((model_physics, rigid_body, global)) = props.get_mut(carried.entity) else {
        return;
    };
    if carried.had_model_physics {
        if let Some(mut physics) = model_physics {
            physics.enabled = true;
        }
    }
    if carried.had_rigid_body {
        if let Some(mut body) = rigid_body {
            body.enabled = true;
        }
    }

    let world_transform = global.compute_transform();
    commands
        .entity(carried.entity)
        .remove::<ChildOf>()
        .insert(world_transform);
}

fn report_abort(
    birb: Entity,
    owner: Option<ConnectionId>,
    reason: &BirbError,
    outgoing: &mut MessageWriter<OutgoingRpc>,
) {
    warn!("Birb {} gave up: {}", birb, reason);
    if let Some(owner) = owner {
        outgoing.write(OutgoingRpc::to(
            owner,
            BirbNetMessage::error(reason.to_string()),
        ));
    }
}

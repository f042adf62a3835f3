//! Per-frame state machine. Pure over its inputs; the systems apply the
//! returned [`BirbEffect`]s to the world.
use bevy::prelude::*;

use crate::{
    birb::{
        components::{BirbMission, BirbTask, FlightPose, StubbornBirb},
        config::BirbConfig,
        effects::BirbSound,
        errors::BirbError,
        steering::{facing, is_close, lerp_towards, orbit_point, wander_point},
    },
    core::rng::GameRng,
    net::messages::ConnectionId,
    world::{components::LocalBounds, trace::LineOfSight},
};

/// Time and tuning for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub now: f32,
    pub delta: f32,
    pub config: &'a BirbConfig,
}

/// What the birb can observe about its target this frame.
#[derive(Debug, Clone, Copy)]
pub struct TargetView {
    pub entity: Entity,
    pub transform: GlobalTransform,
    pub bounds: Option<LocalBounds>,
    pub owner: Option<ConnectionId>,
}

impl TargetView {
    pub fn position(&self) -> Vec3 {
        self.transform.translation()
    }
}

/// Side effects requested by a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum BirbEffect {
    PlaySoundAt { sound: BirbSound, position: Vec3 },
    StartPoopingSound,
    StopPoopingSound,
    PoopedOn { owner: Option<ConnectionId> },
    GrabProp { prop: Entity },
    Abort(BirbError),
    ArrivedHome,
}

impl StubbornBirb {
    pub fn tick(
        &mut self,
        transform: &mut Transform,
        target: Option<&TargetView>,
        los: &impl LineOfSight,
        rng: &mut GameRng,
        ctx: &TickContext,
    ) -> Vec<BirbEffect> {
        let mut effects = Vec::new();
        if self.task == BirbTask::WaitToSpawn {
            return effects;
        }

        // Whatever spawned us may have moved us since launch.
        if !self.spawned {
            transform.translation = self.spawn_point;
            self.prev_position = self.spawn_point;
            self.spawned = true;
        }

        match self.task {
            BirbTask::FlyingToTheTarget => self.fly(transform, target, los, rng, ctx, &mut effects),
            BirbTask::DoingJob => self.do_job(transform, target, ctx, &mut effects),
            BirbTask::ReturningTheSpawnPoint => self.return_home(transform, ctx, &mut effects),
            BirbTask::WaitToSpawn => {}
        }
        effects
    }

    fn fly(
        &mut self,
        transform: &mut Transform,
        target: Option<&TargetView>,
        los: &impl LineOfSight,
        rng: &mut GameRng,
        ctx: &TickContext,
        effects: &mut Vec<BirbEffect>,
    ) {
        let Some(target) = target else {
            self.abort(BirbError::TargetLost, effects);
            return;
        };

        let aim = target.position() + self.target_offset;
        if !self.can_reach(transform.translation, aim, los, ctx) {
            self.wander(transform, rng, ctx);
            if self.wander.attempts > self.wander.limit {
                let attempts = self.wander.attempts;
                self.abort(BirbError::WanderedOff { attempts }, effects);
            }
            return;
        }

        let flight = &ctx.config.flight;
        if !is_close(transform.translation, aim, self.mission.close_tolerance(flight)) {
            self.seek(transform, target, self.mission.seek_speed(flight), ctx);
            return;
        }

        self.task = BirbTask::DoingJob;
        match self.mission {
            BirbMission::DealWithPlayer => {
                self.job_deadline = ctx.now + ctx.config.job.pooping_secs;
                effects.push(BirbEffect::StartPoopingSound);
            }
            BirbMission::StealProp => {
                if let Some(bounds) = target.bounds {
                    let local = target
                        .transform
                        .affine()
                        .inverse()
                        .transform_point3(transform.translation);
                    let grip = target.transform.transform_point(bounds.closest_point(local));
                    self.target_offset = grip - target.position();
                }
                transform.translation = target.position() + self.target_offset;
                effects.push(BirbEffect::GrabProp {
                    prop: target.entity,
                });
                self.task = BirbTask::ReturningTheSpawnPoint;
            }
        }
    }

    fn do_job(
        &mut self,
        transform: &mut Transform,
        target: Option<&TargetView>,
        ctx: &TickContext,
        effects: &mut Vec<BirbEffect>,
    ) {
        if self.mission == BirbMission::StealProp {
            self.task = BirbTask::ReturningTheSpawnPoint;
            return;
        }

        let Some(target) = target else {
            effects.push(BirbEffect::StopPoopingSound);
            self.abort(BirbError::TargetLost, effects);
            return;
        };

        if self.job_deadline < ctx.now {
            effects.push(BirbEffect::PlaySoundAt {
                sound: BirbSound::Poop,
                position: target.position(),
            });
            effects.push(BirbEffect::StopPoopingSound);
            effects.push(BirbEffect::PoopedOn {
                owner: target.owner,
            });
            self.task = BirbTask::ReturningTheSpawnPoint;
        }

        self.seek(transform, target, ctx.config.flight.job_speed, ctx);
    }

    fn return_home(
        &mut self,
        transform: &mut Transform,
        ctx: &TickContext,
        effects: &mut Vec<BirbEffect>,
    ) {
        let flight = &ctx.config.flight;
        if is_close(transform.translation, self.spawn_point, flight.home_tolerance) {
            effects.push(BirbEffect::ArrivedHome);
            return;
        }

        let next = lerp_towards(
            transform.translation,
            self.spawn_point,
            ctx.delta * self.mission.home_speed(flight),
        );
        self.move_to(transform, next, ctx);
    }

    fn can_reach(
        &mut self,
        from: Vec3,
        to: Vec3,
        los: &impl LineOfSight,
        ctx: &TickContext,
    ) -> bool {
        if let Some(reachable) = self.reach.cached(ctx.now) {
            return reachable;
        }
        let reachable = los.is_clear(from, to);
        self.reach
            .store(reachable, ctx.now + ctx.config.flight.reach_cache_secs);
        reachable
    }

    fn seek(&mut self, transform: &mut Transform, target: &TargetView, speed: f32, ctx: &TickContext) {
        self.wander.attempts = 0;

        let goal = orbit_point(
            target.position() + self.target_offset,
            target.transform.right().as_vec3(),
            target.transform.forward().as_vec3(),
            &self.orbit,
            &ctx.config.flight,
            ctx.now,
        );
        let next = lerp_towards(transform.translation, goal, ctx.delta * speed);
        self.move_to(transform, next, ctx);
    }

    fn wander(&mut self, transform: &mut Transform, rng: &mut GameRng, ctx: &TickContext) {
        let wander = &ctx.config.wander;
        if self.wander.next_pick_at < ctx.now {
            let horizontal = rng.unit_ball();
            let vertical = rng.unit_ball();
            self.wander.point = wander_point(transform.translation, horizontal, vertical, wander);
            self.wander.next_pick_at = ctx.now + wander.interval_secs;
            self.wander.attempts += 1;
        }

        let next = lerp_towards(
            transform.translation,
            self.wander.point,
            ctx.delta * wander.lerp_speed,
        );
        self.move_to(transform, next, ctx);
    }

    fn move_to(&mut self, transform: &mut Transform, next: Vec3, ctx: &TickContext) {
        let speed = if ctx.delta > 0.0 {
            transform.translation.distance(self.prev_position) / ctx.delta
        } else {
            0.0
        };
        self.pose = FlightPose::for_speed(speed, ctx.config.flight.glide_speed);
        self.prev_position = transform.translation;

        if let Some(rotation) = facing(transform.translation, next) {
            transform.rotation = rotation;
        }
        transform.translation = next;
    }

    fn abort(&mut self, reason: BirbError, effects: &mut Vec<BirbEffect>) {
        self.task = BirbTask::ReturningTheSpawnPoint;
        effects.push(BirbEffect::Abort(reason));
    }
}

//! Birb state carried on the entity between frames.
use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::{
    birb::{
        config::{BirbConfig, FlightConfig},
        errors::TargetKind,
    },
    core::rng::GameRng,
};

/// What the birb is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BirbTask {
    #[default]
    WaitToSpawn,
    FlyingToTheTarget,
    DoingJob,
    ReturningTheSpawnPoint,
}

/// What the birb came to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirbMission {
    DealWithPlayer,
    StealProp,
}

impl BirbMission {
    pub fn random(rng: &mut GameRng) -> Self {
        if rng.rng().gen_bool(0.5) {
            Self::DealWithPlayer
        } else {
            Self::StealProp
        }
    }

    /// The other mission, tried once when no target of this kind exists.
    pub fn fallback(self) -> Self {
        match self {
            Self::DealWithPlayer => Self::StealProp,
            Self::StealProp => Self::DealWithPlayer,
        }
    }

    pub fn target_kind(self) -> TargetKind {
        match self {
            Self::DealWithPlayer => TargetKind::Player,
            Self::StealProp => TargetKind::Prop,
        }
    }

    pub fn close_tolerance(self, flight: &FlightConfig) -> f32 {
        match self {
            Self::DealWithPlayer => flight.close_tolerance_player,
            Self::StealProp => flight.close_tolerance_prop,
        }
    }

    pub fn seek_speed(self, flight: &FlightConfig) -> f32 {
        match self {
            Self::DealWithPlayer => flight.seek_speed_player,
            Self::StealProp => flight.seek_speed_prop,
        }
    }

    pub fn home_speed(self, flight: &FlightConfig) -> f32 {
        match self {
            Self::DealWithPlayer => flight.home_speed_player,
            Self::StealProp => flight.home_speed_prop,
        }
    }
}

/// Last line-of-sight answer and when it stops being trusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachCache {
    reachable: bool,
    valid_until: f32,
}

impl ReachCache {
    pub fn cached(&self, now: f32) -> Option<bool> {
        (self.valid_until > now).then_some(self.reachable)
    }

    pub fn store(&mut self, reachable: bool, valid_until: f32) {
        self.reachable = reachable;
        self.valid_until = valid_until;
    }
}

/// Local wandering while the target is out of sight.
#[derive(Debug, Clone, Copy, Default)]
pub struct WanderState {
    pub point: Vec3,
    pub next_pick_at: f32,
    pub attempts: u32,
    pub limit: u32,
}

/// Orbit/hover parameters rolled once per birb.
#[derive(Debug, Clone, Copy)]
pub struct OrbitParams {
    pub phase: f32,
    pub hover_phase: f32,
    pub radius: f32,
}

impl OrbitParams {
    pub fn roll(rng: &mut GameRng, flight: &FlightConfig) -> Self {
        Self {
            phase: rng.range_f32(0.0, TAU),
            hover_phase: rng.range_f32(0.0, TAU),
            radius: rng.range_f32(flight.orbit_radius_min, flight.orbit_radius_max),
        }
    }
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            phase: 0.0,
            hover_phase: 0.0,
            radius: 0.5,
        }
    }
}

/// Animation graph parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlightPose {
    pub flapping: bool,
    pub gliding: bool,
}

impl FlightPose {
    pub fn for_speed(speed: f32, glide_speed: f32) -> Self {
        let gliding = speed > glide_speed;
        Self {
            flapping: !gliding,
            gliding,
        }
    }
}

/// A prop the birb picked up, and which physics it had switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarriedProp {
    pub entity: Entity,
    pub had_model_physics: bool,
    pub had_rigid_body: bool,
}

/// Sound entities the birb may need to stop later.
#[derive(Debug, Clone, Copy, Default)]
pub struct BirbSounds {
    pub noise: Option<Entity>,
    pub pooping: Option<Entity>,
}

/// Everything launch-time planning decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirbLaunch {
    pub mission: BirbMission,
    pub target: Entity,
    pub target_offset: Vec3,
    pub spawn_point: Vec3,
}

#[derive(Component, Debug, Clone)]
pub struct StubbornBirb {
    pub task: BirbTask,
    pub mission: BirbMission,
    /// Weak: the entity may be gone by the next frame.
    pub target: Option<Entity>,
    pub target_offset: Vec3,
    pub spawn_point: Vec3,
    pub reach: ReachCache,
    pub job_deadline: f32,
    pub wander: WanderState,
    pub health: f32,
    pub spawned: bool,
    pub prev_position: Vec3,
    pub orbit: OrbitParams,
    pub pose: FlightPose,
    pub carried: Option<CarriedProp>,
    pub sounds: BirbSounds,
}

impl StubbornBirb {
    /// A freshly spawned birb that has not picked a target yet.
    pub fn waiting(health: f32) -> Self {
        Self {
            task: BirbTask::WaitToSpawn,
            mission: BirbMission::DealWithPlayer,
            target: None,
            target_offset: Vec3::ZERO,
            spawn_point: Vec3::ZERO,
            reach: ReachCache::default(),
            job_deadline: 0.0,
            wander: WanderState::default(),
            health,
            spawned: false,
            prev_position: Vec3::ZERO,
            orbit: OrbitParams::default(),
            pose: FlightPose::default(),
            carried: None,
            sounds: BirbSounds::default(),
        }
    }

    /// Applies a launch plan and rolls the per-birb randomness.
    pub fn launch(&mut self, plan: BirbLaunch, rng: &mut GameRng, config: &BirbConfig) {
        self.mission = plan.mission;
        self.target = Some(plan.target);
        self.target_offset = plan.target_offset;
        self.spawn_point = plan.spawn_point;
        self.prev_position = plan.spawn_point;
        self.orbit = OrbitParams::roll(rng, &config.flight);
        self.wander = WanderState {
            point: plan.spawn_point,
            next_pick_at: 0.0,
            attempts: 0,
            limit: rng
                .rng()
                .gen_range(config.wander.limit_min..=config.wander.limit_max),
        };
        self.task = BirbTask::FlyingToTheTarget;
    }

    /// Subtracts health; true once the birb is dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_swaps_mission() {
        assert_eq!(
            BirbMission::DealWithPlayer.fallback(),
            BirbMission::StealProp
        );
        assert_eq!(
            BirbMission::StealProp.fallback(),
            BirbMission::DealWithPlayer
        );
    }

    #[test]
    fn reach_cache_expires() {
        let mut cache = ReachCache::default();
        assert_eq!(cache.cached(0.0), None);
        cache.store(true, 1.2);
        assert_eq!(cache.cached(1.0), Some(true));
        assert_eq!(cache.cached(1.2), None);
    }

    #[test]
    fn pose_glides_only_when_fast() {
        assert_eq!(
            FlightPose::for_speed(20.0, 15.0),
            FlightPose {
                flapping: false,
                gliding: true
            }
        );
        assert!(FlightPose::for_speed(3.0, 15.0).flapping);
    }

    #[test]
    fn launch_rolls_wander_limit_in_range() {
        let config = BirbConfig::default();
        let mut rng = GameRng::from_seed(Some(5));
        let mut world = World::new();
        let target = world.spawn_empty().id();

        for _ in 0..50 {
            let mut birb = StubbornBirb::waiting(config.max_health);
            birb.launch(
                BirbLaunch {
                    mission: BirbMission::StealProp,
                    target,
                    target_offset: Vec3::Y,
                    spawn_point: Vec3::new(1.0, 2.0, 3.0),
                },
                &mut rng,
                &config,
            );
            assert_eq!(birb.task, BirbTask::FlyingToTheTarget);
            assert!((5..=20).contains(&birb.wander.limit));
            assert!(birb.orbit.radius >= config.flight.orbit_radius_min);
            assert!(birb.orbit.radius <= config.flight.orbit_radius_max);
        }
    }

    #[test]
    fn damage_kills_at_zero() {
        let mut birb = StubbornBirb::waiting(10.0);
        assert!(!birb.take_damage(4.0));
        assert!(birb.take_damage(6.0));
        assert!(birb.is_dead());
    }
}

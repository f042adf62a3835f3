//! Launch planning: mission, target, aim offset and spawn point.
use bevy::prelude::*;
use rand::Rng;

use crate::{
    birb::{
        components::{BirbLaunch, BirbMission},
        config::{BirbConfig, SpawnConfig},
        errors::{BirbError, TargetKind},
    },
    core::rng::GameRng,
    world::{components::LocalBounds, trace::LineOfSight},
};

/// A root entity a birb could be sent after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCandidate {
    pub entity: Entity,
    pub kind: TargetKind,
    pub position: Vec3,
    pub bounds: Option<LocalBounds>,
}

pub fn pick_target<'a>(
    candidates: &'a [TargetCandidate],
    kind: TargetKind,
    rng: &mut GameRng,
) -> Option<&'a TargetCandidate> {
    let matching: Vec<&TargetCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.kind == kind)
        .collect();
    if matching.is_empty() {
        return None;
    }
    let index = rng.rng().gen_range(0..matching.len());
    matching.get(index).copied()
}

/// Picks a target for `mission`, swapping mission once if nothing fits.
pub fn choose_target<'a>(
    candidates: &'a [TargetCandidate],
    mission: BirbMission,
    rng: &mut GameRng,
) -> Result<(BirbMission, &'a TargetCandidate), BirbError> {
    if let Some(target) = pick_target(candidates, mission.target_kind(), rng) {
        return Ok((mission, target));
    }

    let fallback = mission.fallback();
    pick_target(candidates, fallback.target_kind(), rng)
        .map(|target| (fallback, target))
        .ok_or(BirbError::NoTarget {
            kind: fallback.target_kind(),
        })
}

/// Local offset the birb aims for: above a player's head, or the top of a prop.
pub fn target_offset(mission: BirbMission, bounds: Option<&LocalBounds>, default_size: f32) -> Vec3 {
    let bounds = bounds
        .copied()
        .unwrap_or_else(|| LocalBounds::centred(Vec3::splat(default_size)));
    match mission {
        BirbMission::DealWithPlayer => Vec3::Y * bounds.size().y,
        BirbMission::StealProp => {
            let center = bounds.center();
            Vec3::new(center.x, bounds.max.y, center.z)
        }
    }
}

/// Random search for a point above `aim` with a clear line to it.
///
/// The upper bound of the search radius shrinks every ten attempts, but never
/// below `min_search_radius`.
pub fn find_spawn_location(
    aim: Vec3,
    los: &impl LineOfSight,
    spawn: &SpawnConfig,
    rng: &mut GameRng,
) -> Option<Vec3> {
    let attempts = spawn.search_attempts.max(1);
    for attempt in 0..attempts {
        let divisor = (attempt / 10).clamp(1, attempts) as f32;
        let radius = rng
            .range_f32(0.0, spawn.search_radius / divisor)
            .clamp(spawn.min_search_radius, spawn.search_radius);
        let offset = rng.unit_ball() * radius;
        let candidate = aim + Vec3::new(offset.x, offset.y.abs(), offset.z);

        if los.is_clear(candidate, aim) {
            return Some(candidate);
        }
    }
    None
}

/// Full launch plan: target, aim offset and a spawn point that can see it.
pub fn plan_launch(
    candidates: &[TargetCandidate],
    mission: BirbMission,
    los: &impl LineOfSight,
    config: &BirbConfig,
    rng: &mut GameRng,
) -> Result<BirbLaunch, BirbError> {
    let (mission, target) = choose_target(candidates, mission, rng)?;
    let offset = target_offset(
        mission,
        target.bounds.as_ref(),
        config.spawn.default_bounds_size,
    );
    let spawn_point = find_spawn_location(target.position + offset, los, &config.spawn, rng)
        .ok_or(BirbError::NoSpawnPoint)?;

    Ok(BirbLaunch {
        mission,
        target: target.entity,
        target_offset: offset,
        spawn_point,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Clear;
    impl LineOfSight for Clear {
        fn is_clear(&self, _: Vec3, _: Vec3) -> bool {
            true
        }
    }

    struct Blocked(Cell<u32>);
    impl LineOfSight for Blocked {
        fn is_clear(&self, _: Vec3, _: Vec3) -> bool {
            self.0.set(self.0.get() + 1);
            false
        }
    }

    fn candidates(world: &mut World, kinds: &[TargetKind]) -> Vec<TargetCandidate> {
        kinds
            .iter()
            .map(|&kind| TargetCandidate {
                entity: world.spawn_empty().id(),
                kind,
                position: Vec3::new(0.0, 1.0, 0.0),
                bounds: Some(LocalBounds::standing(Vec3::new(1.0, 2.0, 1.0))),
            })
            .collect()
    }

    #[test]
    fn picks_matching_kind() {
        let mut world = World::new();
        let pool = candidates(&mut world, &[TargetKind::Prop, TargetKind::Player]);
        let mut rng = GameRng::from_seed(Some(1));
        for _ in 0..10 {
            let picked = pick_target(&pool, TargetKind::Player, &mut rng).unwrap();
            assert_eq!(picked.kind, TargetKind::Player);
        }
    }

    #[test]
    fn mission_falls_back_once() {
        let mut world = World::new();
        let pool = candidates(&mut world, &[TargetKind::Prop]);
        let mut rng = GameRng::from_seed(Some(1));
        let (mission, target) =
            choose_target(&pool, BirbMission::DealWithPlayer, &mut rng).unwrap();
        assert_eq!(mission, BirbMission::StealProp);
        assert_eq!(target.kind, TargetKind::Prop);
    }

    #[test]
    fn no_targets_names_the_last_kind_tried() {
        let mut rng = GameRng::from_seed(Some(1));
        let err = choose_target(&[], BirbMission::StealProp, &mut rng).unwrap_err();
        assert_eq!(
            err,
            BirbError::NoTarget {
                kind: TargetKind::Player
            }
        );
    }

    #[test]
    fn offsets_follow_mission() {
        let bounds = LocalBounds::new(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(
            target_offset(BirbMission::DealWithPlayer, Some(&bounds), 2.5),
            Vec3::new(0.0, 4.0, 0.0)
        );
        assert_eq!(
            target_offset(BirbMission::StealProp, Some(&bounds), 2.5),
            Vec3::new(1.0, 4.0, 0.0)
        );
        assert_eq!(
            target_offset(BirbMission::DealWithPlayer, None, 2.5),
            Vec3::new(0.0, 2.5, 0.0)
        );
    }

    #[test]
    fn spawn_point_sits_above_aim_within_radius() {
        let config = BirbConfig::default();
        let mut rng = GameRng::from_seed(Some(9));
        let aim = Vec3::new(4.0, 2.0, -3.0);
        for _ in 0..50 {
            let point = find_spawn_location(aim, &Clear, &config.spawn, &mut rng).unwrap();
            assert!(point.y >= aim.y);
            assert!(point.distance(aim) <= config.spawn.search_radius + 1e-3);
        }
    }

    #[test]
    fn spawn_search_gives_up_after_budget() {
        let config = BirbConfig::default();
        let mut rng = GameRng::from_seed(Some(9));
        let los = Blocked(Cell::new(0));
        assert!(find_spawn_location(Vec3::ZERO, &los, &config.spawn, &mut rng).is_none());
        assert_eq!(los.0.get(), config.spawn.search_attempts);
    }

    #[test]
    fn plan_reports_missing_spawn_point() {
        let mut world = World::new();
        let pool = candidates(&mut world, &[TargetKind::Player]);
        let config = BirbConfig::default();
        let mut rng = GameRng::from_seed(Some(2));
        let err = plan_launch(
            &pool,
            BirbMission::DealWithPlayer,
            &Blocked(Cell::new(0)),
            &config,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, BirbError::NoSpawnPoint);
    }

    #[test]
    fn plan_aims_at_target_top() {
        let mut world = World::new();
        let pool = candidates(&mut world, &[TargetKind::Prop]);
        let config = BirbConfig::default();
        let mut rng = GameRng::from_seed(Some(2));
        let plan = plan_launch(&pool, BirbMission::StealProp, &Clear, &config, &mut rng).unwrap();
        assert_eq!(plan.mission, BirbMission::StealProp);
        assert_eq!(plan.target, pool[0].entity);
        assert_eq!(plan.target_offset, Vec3::new(0.0, 2.0, 0.0));
        assert!(plan.spawn_point.y >= 3.0);
    }
}

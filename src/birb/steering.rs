//! Locomotion helpers: lerps, orbit/hover points, wander points, facing.
use bevy::prelude::*;

use crate::birb::{
    components::OrbitParams,
    config::{FlightConfig, WanderConfig},
};

/// Moves `factor` of the way toward `target`; the factor is clamped to `[0, 1]`.
pub fn lerp_towards(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current.lerp(target, factor.clamp(0.0, 1.0))
}

pub fn is_close(position: Vec3, point: Vec3, tolerance: f32) -> bool {
    position.distance_squared(point) < tolerance * tolerance
}

/// Point circling `anchor` in the target's horizontal frame, bobbing up and down.
pub fn orbit_point(
    anchor: Vec3,
    right: Vec3,
    forward: Vec3,
    orbit: &OrbitParams,
    flight: &FlightConfig,
    now: f32,
) -> Vec3 {
    let angle = now * flight.orbit_rate + orbit.phase;
    let ring = (right * angle.cos() + forward * angle.sin()) * orbit.radius;
    let hover = Vec3::Y * (now * flight.hover_rate + orbit.hover_phase).sin() * flight.hover_amplitude;
    anchor + ring + hover
}

/// Next wander point: wide horizontally, shallow vertically.
pub fn wander_point(current: Vec3, horizontal: Vec3, vertical: Vec3, wander: &WanderConfig) -> Vec3 {
    Vec3::new(
        current.x + horizontal.x * wander.horizontal_range,
        current.y + vertical.y * wander.vertical_range,
        current.z + horizontal.z * wander.horizontal_range,
    )
}

/// Rotation looking from `from` to `to`, pitch damped to a tenth.
pub fn facing(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = (to - from).try_normalize()?;
    let yaw = (-direction.x).atan2(-direction.z);
    let pitch = direction.y.clamp(-1.0, 1.0).asin() / 10.0;
    Some(Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::birb::config::BirbConfig;

    #[test]
    fn lerp_factor_is_clamped() {
        let end = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(lerp_towards(Vec3::ZERO, end, 40.0), end);
        assert_eq!(lerp_towards(Vec3::ZERO, end, 0.5), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(lerp_towards(Vec3::ZERO, end, -1.0), Vec3::ZERO);
    }

    #[test]
    fn orbit_stays_on_ring_around_anchor() {
        let config = BirbConfig::default();
        let orbit = OrbitParams {
            phase: 0.3,
            hover_phase: 1.0,
            radius: 0.5,
        };
        for step in 0..20 {
            let now = step as f32 * 0.37;
            let point = orbit_point(Vec3::ZERO, Vec3::X, Vec3::NEG_Z, &orbit, &config.flight, now);
            let horizontal = Vec2::new(point.x, point.z).length();
            assert!((horizontal - 0.5).abs() < 1e-4);
            assert!(point.y.abs() <= config.flight.hover_amplitude + 1e-5);
        }
    }

    #[test]
    fn wander_point_keeps_vertical_shallow() {
        let config = BirbConfig::default();
        let point = wander_point(Vec3::ZERO, Vec3::ONE, Vec3::ONE, &config.wander);
        assert_eq!(point.x, config.wander.horizontal_range);
        assert_eq!(point.y, config.wander.vertical_range);
        assert_eq!(point.z, config.wander.horizontal_range);
    }

    #[test]
    fn facing_points_forward_along_travel() {
        let rotation = facing(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-4);
        assert!(facing(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn facing_damps_pitch() {
        let rotation = facing(Vec3::ZERO, Vec3::new(0.0, 10.0, -0.001)).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.y > 0.0);
        assert!(forward.y < 0.2);
    }
}

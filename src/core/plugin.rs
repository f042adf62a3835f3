//! CorePlugin wires scaled simulation time and the shared RNG.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

use crate::core::rng::GameRng;

const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Scaled game time. Birb deadlines are expressed against [`SimulationClock::now`].
#[derive(Resource, Debug)]
pub struct SimulationClock {
    time_scale: f32,
    last_scaled_delta: Duration,
    elapsed: Duration,
}

impl SimulationClock {
    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.max(MIN_TIME_SCALE),
            last_scaled_delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Seconds of scaled time since startup.
    pub fn now(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Scaled seconds covered by the last frame.
    pub fn delta_secs(&self) -> f32 {
        self.last_scaled_delta.as_secs_f32()
    }

    pub fn last_scaled_delta(&self) -> Duration {
        self.last_scaled_delta
    }

    pub fn tick(&mut self, real_delta: Duration) {
        self.last_scaled_delta = real_delta.mul_f32(self.time_scale);
        self.elapsed += self.last_scaled_delta;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

/// System set that advances the clock; gameplay runs after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockSet;

/// Registers simulation timing and randomness.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
}

impl CorePlugin {
    pub const fn with_time_scale(time_scale: f32) -> Self {
        Self { time_scale }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_time_scale(DEFAULT_TIME_SCALE)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationClock::new(self.time_scale))
            .init_resource::<GameRng>()
            .add_systems(Startup, log_startup_time_scale)
            .add_systems(Update, update_simulation_clock.in_set(ClockSet));

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_scaled_ticks.after(ClockSet));
        }
    }
}

fn update_simulation_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn log_startup_time_scale(clock: Res<SimulationClock>) {
    info!(
        "CorePlugin initialised with time scale: {:.3}",
        clock.time_scale()
    );
}

#[cfg(feature = "core_debug")]
fn log_scaled_ticks(
    mut timer: ResMut<DebugTickTimer>,
    clock: Res<SimulationClock>,
    birbs: Query<(), With<crate::birb::components::StubbornBirb>>,
) {
    if timer.timer.tick(clock.last_scaled_delta()).just_finished() {
        info!(
            target: "core_debug",
            "Sim elapsed: {:.2}s | scaled dt: {:.4}s | birbs: {}",
            clock.now(),
            clock.delta_secs(),
            birbs.iter().count(),
        );
    }
}

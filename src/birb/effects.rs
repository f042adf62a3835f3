//! Sound cues, impact particles and the ambient noise loop.
use std::time::Duration;

use bevy::prelude::*;

use crate::{
    birb::{
        components::StubbornBirb,
        config::{BirbConfig, NoiseConfig},
    },
    core::{plugin::SimulationClock, rng::GameRng},
};

/// One-shot cues linger this long when no audio backend despawns them.
const ONE_SHOT_LIFETIME_SECS: f32 = 3.0;
const IMPACT_LIFETIME_SECS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BirbSound {
    Damage,
    Noise,
    Poop,
    Pooping,
}

impl BirbSound {
    pub fn asset_path(self) -> &'static str {
        match self {
            Self::Damage => "sounds/birb/birb_damage.ogg",
            Self::Noise => "sounds/birb/birb_noise.ogg",
            Self::Poop => "sounds/birb/birb_poop.ogg",
            Self::Pooping => "sounds/birb/birb_pooping.ogg",
        }
    }
}

/// A sound playing in the world. Stopping it means despawning the entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct SoundEmitter {
    pub sound: BirbSound,
    pub looping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactKind {
    Flesh,
    Cardboard,
}

/// Short-lived particle burst at a hit position.
#[derive(Component, Debug, Clone, Copy)]
pub struct ImpactEffect {
    pub kind: ImpactKind,
}

/// Despawns its entity when the timer runs out.
#[derive(Component, Debug)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn seconds(secs: f32) -> Self {
        Self(Timer::from_seconds(secs, TimerMode::Once))
    }
}

/// Repeating pigeon noises while the birb is alive.
#[derive(Component, Debug)]
pub struct AmbientNoise {
    timer: Timer,
}

impl AmbientNoise {
    /// Fires on the first tick, then every few seconds.
    pub fn new() -> Self {
        Self {
            timer: Timer::from_seconds(0.0, TimerMode::Once),
        }
    }

    fn tick(&mut self, delta: Duration) -> bool {
        self.timer.tick(delta).just_finished()
    }

    fn rearm(&mut self, rng: &mut GameRng, noise: &NoiseConfig) {
        let wait = rng.range_f32(noise.interval_min_secs, noise.interval_max_secs);
        self.timer = Timer::from_seconds(wait, TimerMode::Once);
    }
}

impl Default for AmbientNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// Plays `sound` once at `position`.
pub fn play_sound_at(commands: &mut Commands, sound: BirbSound, position: Vec3) -> Entity {
    commands
        .spawn((
            Name::new(format!("{:?} sound", sound)),
            SoundEmitter {
                sound,
                looping: false,
            },
            Transform::from_translation(position),
            Lifetime::seconds(ONE_SHOT_LIFETIME_SECS),
        ))
        .id()
}

/// Plays `sound` attached to `parent` so it follows it and dies with it.
pub fn play_sound_on(
    commands: &mut Commands,
    sound: BirbSound,
    parent: Entity,
    looping: bool,
) -> Entity {
    let mut entity = commands.spawn((
        Name::new(format!("{:?} sound", sound)),
        SoundEmitter { sound, looping },
        Transform::default(),
        ChildOf(parent),
    ));
    if !looping {
        entity.insert(Lifetime::seconds(ONE_SHOT_LIFETIME_SECS));
    }
    entity.id()
}

pub fn spawn_impact(commands: &mut Commands, kind: ImpactKind, position: Vec3) -> Entity {
    commands
        .spawn((
            Name::new(format!("{:?} impact", kind)),
            ImpactEffect { kind },
            Transform::from_translation(position),
            Lifetime::seconds(IMPACT_LIFETIME_SECS),
        ))
        .id()
}

/// Replays the pigeon noise on each birb, rearming with a random wait.
pub fn play_ambient_noise(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    config: Res<BirbConfig>,
    mut rng: ResMut<GameRng>,
    mut birbs: Query<(Entity, &mut AmbientNoise, &mut StubbornBirb)>,
) {
    for (entity, mut noise, mut birb) in birbs.iter_mut() {
        if !noise.tick(clock.last_scaled_delta()) {
            continue;
        }
        birb.sounds.noise = Some(play_sound_on(
            &mut commands,
            BirbSound::Noise,
            entity,
            false,
        ));
        noise.rearm(&mut rng, &config.noise);
    }
}

pub fn expire_lifetimes(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    mut lifetimes: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in lifetimes.iter_mut() {
        if lifetime.0.tick(clock.last_scaled_delta()).is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Gives freshly spawned emitters an audio player. Only registered when an
/// `AssetServer` exists.
pub fn attach_audio_players(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    emitters: Query<(Entity, &SoundEmitter), Added<SoundEmitter>>,
) {
    for (entity, emitter) in emitters.iter() {
        let settings = if emitter.looping {
            PlaybackSettings::LOOP
        } else {
            PlaybackSettings::ONCE
        };
        commands.entity(entity).insert((
            AudioPlayer::new(asset_server.load(emitter.sound.asset_path())),
            settings,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_noise_fires_immediately_then_waits() {
        let config = BirbConfig::default();
        let mut rng = GameRng::from_seed(Some(4));
        let mut noise = AmbientNoise::new();

        assert!(noise.tick(Duration::from_millis(16)));
        noise.rearm(&mut rng, &config.noise);

        assert!(!noise.tick(Duration::from_secs_f32(2.9)));
        assert!(noise.tick(Duration::from_secs_f32(2.2)));
    }

    #[test]
    fn every_sound_has_an_asset() {
        for sound in [
            BirbSound::Damage,
            BirbSound::Noise,
            BirbSound::Poop,
            BirbSound::Pooping,
        ] {
            assert!(sound.asset_path().ends_with(".ogg"));
        }
    }
}

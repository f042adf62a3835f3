//! BirbPlugin wires config, messages and the per-frame birb systems.
use bevy::prelude::*;

use crate::{
    birb::{
        config::BirbConfig,
        effects::{attach_audio_players, expire_lifetimes, play_ambient_noise},
        events::{BirbDespawned, DamageBirb, SpawnBirbRequest},
        systems::{apply_birb_damage, handle_spawn_requests, update_birbs},
    },
    core::{plugin::ClockSet, rng::GameRng},
    net::plugin::RpcDeliverySet,
};

/// Birb gameplay; runs after the clock and before RPCs go out.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct BirbSet;

pub struct BirbPlugin;

impl Plugin for BirbPlugin {
    fn build(&self, app: &mut App) {
        let config = BirbConfig::load_or_default();
        info!(
            "Birb configured: {} per owner, {:.0} health, {} spawn attempts",
            config.spawn.max_per_owner, config.max_health, config.spawn.search_attempts
        );

        if let Some(seed) = config.seed {
            app.insert_resource(GameRng::from_seed(Some(seed)));
        }

        app.insert_resource(config)
            .add_message::<SpawnBirbRequest>()
            .add_message::<DamageBirb>()
            .add_message::<BirbDespawned>()
            .configure_sets(Update, BirbSet.after(ClockSet).before(RpcDeliverySet))
            .add_systems(
                Update,
                (
                    handle_spawn_requests,
                    apply_birb_damage,
                    update_birbs,
                    play_ambient_noise,
                    expire_lifetimes,
                )
                    .chain()
                    .in_set(BirbSet),
            );

        if app.world().contains_resource::<AssetServer>() {
            app.add_systems(Update, attach_audio_players.after(BirbSet));
        }
    }
}

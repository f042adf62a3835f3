// src/ui/poop_overlay/plugin.rs
//
// Plugin registration for poop overlay systems.

use bevy::prelude::*;

use crate::net::plugin::RpcDeliverySet;

use super::systems::{fade_poop_overlays, spawn_poop_overlays};

/// Plugin turning `Pooping` RPCs into a fading full-screen overlay.
///
/// # Dependencies
///
/// - `NetPlugin` must be registered (delivers `IncomingRpc`)
/// - `CorePlugin` must be registered (clock and RNG)
/// - `BirbConfig` must be present (overlay lifetime)
pub struct PoopOverlayPlugin;

impl Plugin for PoopOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                spawn_poop_overlays,
                fade_poop_overlays.after(spawn_poop_overlays),
            )
                .after(RpcDeliverySet),
        );

        info!("PoopOverlayPlugin registered");
    }
}

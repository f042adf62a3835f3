//! WorldPlugin builds the playable demo scene around the birb.
use bevy::prelude::*;

use crate::{
    birb::plugin::BirbSet,
    world::systems::{
        attach_birb_meshes, attach_impact_meshes, log_birb_despawns, player_mouse_look,
        player_translate, request_birb_on_key, shoot_birbs, spawn_world_environment,
        update_cursor_grab,
    },
};

/// Scene, player controls and visuals. Needs `DefaultPlugins`.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_world_environment)
            .add_systems(
                Update,
                (
                    (
                        update_cursor_grab,
                        player_mouse_look.after(update_cursor_grab),
                        player_translate,
                    ),
                    (request_birb_on_key, shoot_birbs),
                )
                    .before(BirbSet),
            )
            .add_systems(
                Update,
                (attach_birb_meshes, attach_impact_meshes, log_birb_despawns).after(BirbSet),
            );

        info!("WorldPlugin registered: B releases a birb, left click shoots");
    }
}

use bevy::prelude::*;

mod birb;
mod core;
mod net;
mod ui;
mod world;

use crate::{
    birb::BirbPlugin, core::CorePlugin, net::NetPlugin, ui::PoopOverlayPlugin, world::WorldPlugin,
};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            CorePlugin::default(),
            NetPlugin,
            BirbPlugin, // After DefaultPlugins so sound emitters get audio players
            PoopOverlayPlugin,
            WorldPlugin,
        ))
        .run();
}

// src/ui/poop_overlay/systems.rs
//
// Systems for spawning, fading, and despawning poop overlays.

use bevy::prelude::*;

use crate::birb::config::BirbConfig;
use crate::core::{plugin::SimulationClock, rng::GameRng};
use crate::net::messages::{BirbNetMessage, IncomingRpc};

use super::components::{
    DecalLayout, OverlayRoot, PoopDecal, PoopOverlay, TemporaryOverlayRoot, BIG_SPLAT, SMALL_SPLAT,
};

/// Overlays sit above the rest of the HUD.
const OVERLAY_Z_INDEX: i32 = 200;

fn full_screen() -> Node {
    Node {
        position_type: PositionType::Absolute,
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        ..default()
    }
}

fn decal_node(layout: &DecalLayout) -> Node {
    Node {
        position_type: PositionType::Absolute,
        width: Val::Percent(layout.size * 100.0),
        height: Val::Percent(layout.size * 100.0),
        left: Val::Percent(layout.left * 100.0),
        top: Val::Percent(layout.top * 100.0),
        ..default()
    }
}

/// Spawn a splatter overlay for every `Pooping` RPC this client receives.
pub fn spawn_poop_overlays(
    mut commands: Commands,
    mut incoming: MessageReader<IncomingRpc>,
    config: Res<BirbConfig>,
    mut rng: ResMut<GameRng>,
    asset_server: Option<Res<AssetServer>>,
    roots: Query<Entity, With<OverlayRoot>>,
) {
    for IncomingRpc(message) in incoming.read() {
        if !matches!(message, BirbNetMessage::Pooping) {
            continue;
        }

        // Reuse the HUD's root if there is one; otherwise bring our own.
        let (root, temporary_root) = match roots.iter().next() {
            Some(root) => (root, None),
            None => {
                let root = commands
                    .spawn((full_screen(), ZIndex(OVERLAY_Z_INDEX), TemporaryOverlayRoot))
                    .id();
                (root, Some(root))
            }
        };

        let overlay = commands
            .spawn((
                full_screen(),
                PoopOverlay::new(config.overlay.lifetime_secs, temporary_root),
                ChildOf(root),
            ))
            .id();

        for style in [BIG_SPLAT, SMALL_SPLAT] {
            let layout = style.roll(&mut rng);
            let texture = asset_server
                .as_ref()
                .map(|server| server.load(style.texture))
                .unwrap_or_default();

            commands.spawn((
                decal_node(&layout),
                ImageNode::new(texture).with_color(Color::WHITE.with_alpha(layout.opacity)),
                ZIndex(layout.order),
                PoopDecal {
                    overlay,
                    base_opacity: layout.opacity,
                },
                ChildOf(overlay),
            ));
        }

        info!("Pooped on! Showing overlay for {:.1}s", config.overlay.lifetime_secs);
    }
}

/// Fade overlays out and remove them (and any root they brought) at the end.
pub fn fade_poop_overlays(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    mut overlays: Query<(Entity, &mut PoopOverlay)>,
    mut decals: Query<(&PoopDecal, &mut ImageNode)>,
) {
    for (entity, mut overlay) in overlays.iter_mut() {
        overlay.tick(clock.last_scaled_delta());
        if !overlay.is_finished() {
            continue;
        }

        match overlay.temporary_root {
            Some(root) => commands.entity(root).despawn(),
            None => commands.entity(entity).despawn(),
        }
    }

    for (decal, mut image) in decals.iter_mut() {
        if let Ok((_, overlay)) = overlays.get(decal.overlay) {
            image.color.set_alpha(decal.base_opacity * overlay.opacity());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::{
        core::CorePlugin,
        net::{messages::OutgoingRpc, NetPlugin},
        ui::poop_overlay::PoopOverlayPlugin,
    };

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, CorePlugin::default(), NetPlugin, PoopOverlayPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(500)))
            .insert_resource(BirbConfig::default())
            .insert_resource(GameRng::from_seed(Some(2)));
        app
    }

    fn count<T: Component>(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&T>().iter(world).count()
    }

    fn poop(app: &mut App) {
        app.world_mut()
            .write_message(OutgoingRpc::broadcast(BirbNetMessage::Pooping));
    }

    #[test]
    fn pooping_rpc_builds_overlay_with_two_decals() {
        let mut app = test_app();
        poop(&mut app);
        app.update();

        assert_eq!(count::<TemporaryOverlayRoot>(&mut app), 1);
        assert_eq!(count::<OverlayRoot>(&mut app), 0);
        assert_eq!(count::<PoopOverlay>(&mut app), 1);
        assert_eq!(count::<PoopDecal>(&mut app), 2);
    }

    #[test]
    fn error_rpc_builds_nothing() {
        let mut app = test_app();
        app.world_mut()
            .write_message(OutgoingRpc::broadcast(BirbNetMessage::error("nope")));
        app.update();
        assert_eq!(count::<PoopOverlay>(&mut app), 0);
    }

    #[test]
    fn temporary_root_goes_away_with_overlay() {
        let mut app = test_app();
        poop(&mut app);
        for _ in 0..14 {
            app.update();
        }

        assert_eq!(count::<PoopOverlay>(&mut app), 0);
        assert_eq!(count::<PoopDecal>(&mut app), 0);
        assert_eq!(count::<TemporaryOverlayRoot>(&mut app), 0);
    }

    #[test]
    fn later_overlay_outlives_earlier_temporary_root() {
        let mut app = test_app();
        poop(&mut app);
        for _ in 0..5 {
            app.update();
        }
        poop(&mut app);
        app.update();
        assert_eq!(count::<TemporaryOverlayRoot>(&mut app), 2);

        // First overlay is past its 5 s, the second is not.
        for _ in 0..8 {
            app.update();
        }
        assert_eq!(count::<PoopOverlay>(&mut app), 1);
        assert_eq!(count::<PoopDecal>(&mut app), 2);
        assert_eq!(count::<TemporaryOverlayRoot>(&mut app), 1);
    }

    #[test]
    fn existing_root_is_reused_and_kept() {
        let mut app = test_app();
        app.world_mut().spawn((full_screen(), OverlayRoot));
        poop(&mut app);
        app.update();
        assert_eq!(count::<OverlayRoot>(&mut app), 1);
        assert_eq!(count::<PoopOverlay>(&mut app), 1);

        for _ in 0..14 {
            app.update();
        }
        assert_eq!(count::<PoopOverlay>(&mut app), 0);
        assert_eq!(count::<OverlayRoot>(&mut app), 1);
    }
}

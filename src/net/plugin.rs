//! NetPlugin wires connection identity and loopback RPC delivery.
use bevy::prelude::*;

use crate::net::{
    messages::{IncomingRpc, LocalConnection, NetworkRole, OutgoingRpc},
    systems::{deliver_loopback_rpcs, log_rpc_errors},
};

/// Runs after gameplay has queued its RPCs for the frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RpcDeliverySet;

pub struct NetPlugin;

impl Plugin for NetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NetworkRole>()
            .init_resource::<LocalConnection>()
            .add_message::<OutgoingRpc>()
            .add_message::<IncomingRpc>()
            .add_systems(
                Update,
                (deliver_loopback_rpcs, log_rpc_errors.after(deliver_loopback_rpcs))
                    .in_set(RpcDeliverySet),
            );
    }
}

//! RPC transport and client-side handlers.
use bevy::prelude::*;

use crate::net::messages::{
    BirbNetMessage, IncomingRpc, LocalConnection, OutgoingRpc, RpcEnvelope,
};

/// Pushes every queued RPC through the wire format and hands the ones
/// addressed to this process back as [`IncomingRpc`].
pub fn deliver_loopback_rpcs(
    mut outgoing: MessageReader<OutgoingRpc>,
    mut incoming: MessageWriter<IncomingRpc>,
    local: Res<LocalConnection>,
) {
    for OutgoingRpc(envelope) in outgoing.read() {
        let wire = match envelope.encode() {
            Ok(wire) => wire,
            Err(err) => {
                warn!("Dropping RPC {:?}: {}", envelope.message, err);
                continue;
            }
        };

        let received = match RpcEnvelope::decode(&wire) {
            Ok(received) => received,
            Err(err) => {
                warn!("Dropping malformed RPC payload: {}", err);
                continue;
            }
        };

        if received.filter.includes(local.0) {
            incoming.write(IncomingRpc(received.message));
        }
    }
}

/// Error reports from a birb land in the owning client's log.
pub fn log_rpc_errors(mut incoming: MessageReader<IncomingRpc>) {
    for IncomingRpc(message) in incoming.read() {
        if let BirbNetMessage::Error { message } = message {
            error!(target: "stubborn_birb", "{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{messages::ConnectionId, NetPlugin};

    #[derive(Resource, Default)]
    struct Received(Vec<BirbNetMessage>);

    fn collect(mut incoming: MessageReader<IncomingRpc>, mut received: ResMut<Received>) {
        received
            .0
            .extend(incoming.read().map(|IncomingRpc(message)| message.clone()));
    }

    fn app_for(local: ConnectionId) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, NetPlugin))
            .insert_resource(LocalConnection(local))
            .init_resource::<Received>()
            .add_systems(Update, collect.after(deliver_loopback_rpcs));
        app
    }

    #[test]
    fn only_addressed_rpcs_arrive() {
        let mut app = app_for(ConnectionId(5));
        app.world_mut()
            .write_message(OutgoingRpc::to(ConnectionId(5), BirbNetMessage::Pooping));
        app.world_mut()
            .write_message(OutgoingRpc::to(ConnectionId(6), BirbNetMessage::Pooping));
        app.world_mut()
            .write_message(OutgoingRpc::broadcast(BirbNetMessage::error("hi")));
        app.update();

        let received = &app.world().resource::<Received>().0;
        assert_eq!(
            received,
            &vec![BirbNetMessage::Pooping, BirbNetMessage::error("hi")]
        );
    }
}

//! Messages into and out of the birb module.
use bevy::prelude::{Entity, Event, Message, Vec3};

use crate::{birb::errors::BirbError, net::messages::ConnectionId};

/// A connection asks the host to release a birb near `position`.
#[derive(Event, Message, Debug, Clone)]
pub struct SpawnBirbRequest {
    pub requester: ConnectionId,
    pub position: Vec3,
}

/// Something hit a birb.
#[derive(Event, Message, Debug, Clone)]
pub struct DamageBirb {
    pub birb: Entity,
    pub amount: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DespawnCause {
    ArrivedHome,
    Killed,
    Aborted(BirbError),
}

/// Fired once per birb when it leaves the world.
#[derive(Event, Message, Debug, Clone)]
pub struct BirbDespawned {
    pub birb: Entity,
    pub cause: DespawnCause,
}

use std::net::SocketAddr;

use crate::{RegionHandle, SessionId, TeleportFlags, UserId, Vector3};

/// Tells the viewer to complete a border crossing into the destination
#[derive(Clone, Debug, PartialEq)]
pub struct CrossRegionEvent {
    pub destination: RegionHandle,
    pub position: Vector3,
    pub velocity: Vector3,
    pub external_endpoint: SocketAddr,
    pub caps_seed_url: String,
    pub agent_id: UserId,
    pub session_id: SessionId,
}

/// Tells the viewer to finish a teleport into the destination
#[derive(Clone, Debug, PartialEq)]
pub struct TeleportFinishEvent {
    pub destination: RegionHandle,
    pub sim_access: u8,
    pub external_endpoint: SocketAddr,
    pub location_id: u32,
    pub teleport_flags: TeleportFlags,
    pub caps_seed_url: String,
    pub agent_id: UserId,
}

impl TeleportFinishEvent {
    pub const SIM_ACCESS_MATURE: u8 = 13;
    pub const LOCATION_ID: u32 = 4;
}

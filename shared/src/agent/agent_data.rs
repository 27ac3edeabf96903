use crate::{LocomotionFlags, RegionHandle, SessionId, UserId, Vector3};

/// Full state of a root agent, sent to the destination region in a
/// child-agent update when the avatar is handed off
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentData {
    pub agent_id: Option<UserId>,
    pub session_id: Option<SessionId>,
    /// The region the agent is leaving
    pub region_handle: Option<RegionHandle>,
    pub position: Vector3,
    pub velocity: Vector3,
    pub locomotion_state: u32,
    pub locomotion_flags: LocomotionFlags,
    /// Attachments serialized for crossing, one payload per object
    pub serialized_attachments: Vec<Vec<u8>>,
    /// Where the destination calls back once the agent is established there
    pub callback_uri: String,
}

impl AgentData {
    /// Locomotion state the destination expects for an agent being handed off
    pub const LOCOMOTION_IN_TRANSIT: u32 = 1;
}

use std::sync::Arc;

use transit_shared::{
    AgentData, AvatarConnectionState, LocalId, RegionHandle, RegionInfo, SessionId, UserId,
    Vector3,
};

use crate::scene::RemotePresences;

/// A live avatar session in this region.
///
/// Implementations use interior mutability; the transit machinery only ever
/// holds shared references.
pub trait ScenePresence: Send + Sync {
    fn user_id(&self) -> UserId;

    fn session_id(&self) -> SessionId;

    fn name(&self) -> String;

    fn connection_state(&self) -> AvatarConnectionState;

    /// Whether the avatar has settled enough in this region to leave it
    fn can_exit_region(&self) -> bool;

    fn absolute_position(&self) -> Vector3;

    fn set_absolute_position(&self, position: Vector3);

    fn velocity(&self) -> Vector3;

    fn is_child_agent(&self) -> bool;

    /// Demotes the avatar to a non-authoritative child presence
    fn make_child_agent(&self, destination: RegionHandle);

    /// Restores full authority at `position`
    fn make_root_agent(&self, position: Vector3);

    fn remote_presences(&self) -> Arc<dyn RemotePresences>;

    fn attachments(&self) -> Vec<Arc<dyn Attachment>>;

    /// The attachments that should travel with the avatar
    fn collect_attachments_for_crossing(&self) -> Vec<Arc<dyn Attachment>>;

    fn attachments_crossed_to_new_region(&self);

    /// Snapshot of the root agent's state for a child-agent update
    fn agent_data_for_root(&self) -> AgentData;

    fn physics_actor(&self) -> Option<Arc<dyn PhysicsActor>>;

    fn send_alert_message(&self, message: &str);

    /// Marks the avatar as departed to `destination`
    fn reset(&self, destination: &RegionInfo);
}

/// An object worn by an avatar
pub trait Attachment: Send + Sync {
    fn local_id(&self) -> LocalId;

    /// Marks the object in transit; paired with exactly one `end_transit`
    fn start_transit(&self);

    /// `success == false` restarts any scripts stopped for the transit
    fn end_transit(&self, success: bool);
}

pub trait PhysicsActor: Send + Sync {
    fn suspend(&self);

    fn resume(&self);
}

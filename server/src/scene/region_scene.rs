use std::sync::Arc;

use transit_shared::{LocalId, RegionInfo, UserId};

use crate::scene::{AttachmentSerializer, EventQueue, InterregionComms, ScenePresence};

/// The region that owns the avatars being sent away
pub trait RegionScene: Send + Sync {
    /// Describes this region
    fn region_info(&self) -> RegionInfo;

    fn scene_presence(&self, user_id: UserId) -> Option<Arc<dyn ScenePresence>>;

    fn event_queue(&self) -> Option<Arc<dyn EventQueue>>;

    fn interregion_comms(&self) -> Arc<dyn InterregionComms>;

    fn attachment_serializer(&self) -> Option<Arc<dyn AttachmentSerializer>>;

    /// Unseats the avatar from the given part without moving it
    fn remove_seated_avatar(&self, seat_part: LocalId, presence: &Arc<dyn ScenePresence>);

    /// Lets the rest of the region know the avatar has left for `destination`
    fn trigger_avatar_leaving_region(
        &self,
        presence: &Arc<dyn ScenePresence>,
        destination: &RegionInfo,
    );
}

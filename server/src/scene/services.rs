use async_trait::async_trait;

use transit_shared::{
    AgentData, ChildAgentUpdateResponse, CrossRegionEvent, RegionInfo, SerializationFlags,
    TeleportFinishEvent,
};

use crate::{error::SerializationError, scene::Attachment};

/// Queues events for delivery to the avatar's viewer
pub trait EventQueue: Send + Sync {
    /// Returns whether the event was queued
    fn cross_region(&self, event: CrossRegionEvent) -> bool;

    /// Returns whether the event was queued
    fn teleport_finish(&self, event: TeleportFinishEvent) -> bool;
}

#[async_trait]
pub trait InterregionComms: Send + Sync {
    async fn send_child_agent_update2(
        &self,
        region: &RegionInfo,
        agent_data: AgentData,
    ) -> ChildAgentUpdateResponse;
}

pub trait AttachmentSerializer: Send + Sync {
    fn serialize_attachment(
        &self,
        attachment: &dyn Attachment,
        flags: SerializationFlags,
    ) -> Result<Vec<u8>, SerializationError>;
}

use async_trait::async_trait;

use transit_shared::{EstablishPresenceResult, RegionHandle, RegionInfo, RemotePresenceInfo};

/// Presences an avatar holds on neighboring regions
#[async_trait]
pub trait RemotePresences: Send + Sync {
    fn has_presence_on_region(&self, region: RegionHandle) -> bool;

    /// Whether any neighbor connection is still being set up
    fn has_connections_establishing(&self) -> bool;

    fn remote_presence(&self, region: RegionHandle) -> Option<RemotePresenceInfo>;

    /// Returns the result code and a human readable reason
    async fn establish_presence_on_region(
        &self,
        region: &RegionInfo,
    ) -> (EstablishPresenceResult, String);

    async fn drop_remote_presence(&self, region: &RegionInfo);
}

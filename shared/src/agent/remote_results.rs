use crate::RegionHandle;

/// Result of the remote child-agent update call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildAgentUpdateResponse {
    Ok,
    AccessDenied,
    MethodNotAvailable,
    Error,
}

/// The result of an attempt to establish a remote presence on a region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EstablishPresenceResult {
    Success,
    /// There was a timeout when telling the destination region to expect a new connection
    ErrorInformingRegion,
    /// The message telling the viewer to connect to the region didn't go through
    ClientSignallingFailed,
    /// The viewer did not connect to the new destination in a timely manner
    ClientWaitTimeout,
    /// The connection was aborted before it was completed
    ConnectionAborted,
}

/// A presence the avatar holds on a neighboring region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemotePresenceInfo {
    pub region: RegionHandle,
    pub caps_seed_url: String,
}

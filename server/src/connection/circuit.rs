use async_trait::async_trait;

use transit_shared::{LocalId, SessionId, UserId};

/// What a viewer presented when its connection was set up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitData {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub circuit_code: u32,
}

impl CircuitData {
    pub fn new(user_id: UserId, session_id: SessionId, circuit_code: u32) -> Self {
        Self {
            user_id,
            session_id,
            circuit_code,
        }
    }
}

/// The UDP side of a viewer connection
#[async_trait]
pub trait UdpCircuit: Send + Sync {
    fn circuit_code(&self) -> u32;

    fn session_id(&self) -> SessionId;

    /// Stops queueing updates and waits until queued ones have been sent
    async fn pause_updates_and_flush(&self);

    /// `culled_prims` are objects that left with the avatar and should not be
    /// updated any more
    fn resume_updates(&self, culled_prims: Option<&[LocalId]>);

    fn close(&self);
}

/// The capability (http) side of a viewer connection
pub trait CapsControl: Send + Sync {
    fn pause_traffic(&self);

    fn resume_traffic(&self);

    fn teardown(&self);
}

/// Externally observable markers of an avatar transit.
///
/// A successful outbound transit emits `SendBegin`, `SendEstablishChildPresence`
/// and `SendAvatarHandoff` in that order, then exactly one of
/// `SendCompletedSuccess` or `SendError`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitStage {
    /// We have begun sending the avatar to a new region. Listeners pause
    /// outbound traffic and suspend physics for the avatar.
    SendBegin,
    /// We are establishing a child presence on the new region
    SendEstablishChildPresence,
    /// We are handing off the avatar to the new region
    SendAvatarHandoff,
    /// The send completed successfully
    SendCompletedSuccess,
    /// There was an error sending the avatar to the new region
    SendError,
    /// We have received a request to create a new child presence on this region
    ReceiveCreateChildPresence,
    /// We are creating a root presence on this region for the avatar
    ReceiveSetupRoot,
    /// We are establishing links to known neighbors on this region for the avatar
    ReceiveEstablishChildAgentLinks,
}

impl TransitStage {
    /// Whether this stage ends an outbound transit
    pub fn is_terminal(self) -> bool {
        matches!(self, TransitStage::SendCompletedSuccess | TransitStage::SendError)
    }

    pub fn is_send_stage(self) -> bool {
        matches!(
            self,
            TransitStage::SendBegin
                | TransitStage::SendEstablishChildPresence
                | TransitStage::SendAvatarHandoff
                | TransitStage::SendCompletedSuccess
                | TransitStage::SendError
        )
    }
}

use std::time::Duration;

use thiserror::Error;

use transit_shared::{AvatarConnectionState, EstablishPresenceResult, TransitKind, TransitStage, UserId};

/// Broad classification of a transit failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitErrorKind {
    /// A check failed before any side effect was applied
    PreconditionViolation,
    /// A transit was already registered for the user
    DuplicateTransit,
    /// The destination, or a remote call made on its behalf, refused the avatar
    RemoteRejection,
    /// A bounded wait expired
    Timeout,
    /// The destination completion event could not be queued
    EnqueueFailure,
    /// A local collaborator or listener failed
    Internal,
}

/// Checks that must hold before an avatar may begin leaving the region
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    #[error("Avatar {user_id} is not in the scene and can not be put in transit")]
    AvatarNotInScene { user_id: UserId },

    #[error("An avatar can not begin transition to a new region while already in transit (connection is {state:?})")]
    ConnectionNotEstablished { state: AvatarConnectionState },

    #[error("An avatar can not begin transition to a new region until established in the current region")]
    CannotExitRegion,

    #[error("An avatar can not begin transition to a neighbor region while the connections are still being established")]
    ConnectionsEstablishing,

    #[error("Transit of kind {kind:?} has no destination region")]
    MissingDestination { kind: TransitKind },
}

/// The destination, or a remote call made on its behalf, refused the avatar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteRejection {
    #[error("Could not establish presence on remote region ({result:?}): {reason}")]
    PresenceNotEstablished {
        result: EstablishPresenceResult,
        reason: String,
    },

    #[error("Presence could not be established on new region for {name}")]
    PresenceMissing { name: String },

    #[error("Region entry denied for {name}")]
    AccessDenied { name: String },

    #[error("Region change not available for {name}")]
    MethodNotAvailable { name: String },

    #[error("Region change failed for {name}")]
    RegionChangeFailed { name: String },

    #[error("Remote object creation failed")]
    ObjectCreationFailed,
}

/// A bounded wait expired
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitTimeout {
    #[error("Timeout waiting for avatar {name} to become root on destination (waited {waited:?})")]
    Release { name: String, waited: Duration },

    #[error("Timeout waiting for the ridden object to be created on the destination (waited {waited:?})")]
    ObjectCreation { waited: Duration },

    #[error("Timeout sending child agent update for {name} (waited {waited:?})")]
    ChildAgentUpdate { name: String, waited: Duration },
}

/// A transit stage listener refused or failed to handle a stage change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct StageHandlerError {
    pub reason: String,
}

impl StageHandlerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An attachment could not be serialized for crossing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    #[error("Cannot send child agent update, serialization engine is missing")]
    SerializerMissing,

    #[error("Failed to serialize attachment {local_id}: {reason}")]
    AttachmentFailed { local_id: u32, reason: String },
}

/// Errors produced by the transit controller and its states
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitError {
    #[error("Avatar {user_id} is already in transit")]
    DuplicateTransit { user_id: UserId },

    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    #[error(transparent)]
    RemoteRejection(#[from] RemoteRejection),

    #[error(transparent)]
    Timeout(#[from] TransitTimeout),

    #[error("Unable to enqueue transfer event for {name}")]
    EnqueueFailed { name: String },

    #[error("Invalid transit kind {kind:?} for sending avatar {user_id}")]
    InvalidTransitKind { kind: TransitKind, user_id: UserId },

    #[error("Transit stage listener failed during {stage:?}: {source}")]
    StageHandler {
        stage: TransitStage,
        source: StageHandlerError,
    },

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("The {signal} signal was dropped before it was raised")]
    SignalDropped { signal: &'static str },

    #[error("{failed} of {total} rollback actions failed")]
    RollbackFailed { failed: usize, total: usize },

    /// Wraps the root cause of a failed outbound transit, as returned to the
    /// caller of `try_begin_transit`
    #[error("Transit of avatar {user_id} failed: {source}")]
    TransitFailed {
        user_id: UserId,
        source: Box<TransitError>,
    },
}

impl TransitError {
    /// The innermost error, unwrapping any `TransitFailed` layers
    pub fn root_cause(&self) -> &TransitError {
        match self {
            TransitError::TransitFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn kind(&self) -> TransitErrorKind {
        match self.root_cause() {
            TransitError::DuplicateTransit { .. } => TransitErrorKind::DuplicateTransit,
            TransitError::Precondition(_) => TransitErrorKind::PreconditionViolation,
            TransitError::RemoteRejection(_) => TransitErrorKind::RemoteRejection,
            TransitError::Timeout(_) => TransitErrorKind::Timeout,
            TransitError::EnqueueFailed { .. } => TransitErrorKind::EnqueueFailure,
            TransitError::InvalidTransitKind { .. }
            | TransitError::StageHandler { .. }
            | TransitError::Serialization(_)
            | TransitError::SignalDropped { .. }
            | TransitError::RollbackFailed { .. }
            | TransitError::TransitFailed { .. } => TransitErrorKind::Internal,
        }
    }
}

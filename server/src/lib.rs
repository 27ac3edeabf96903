//! # Transit Server
//! The sending side of the avatar region transit protocol: moves a live
//! avatar out of this region to a neighbor, rolling back every side effect
//! if the handoff fails, and pauses the avatar's connection while it does.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use transit_shared::*;
}

mod connection;
mod error;
mod scene;
mod transit;

pub use connection::{
    AvatarConnection, AvatarConnectionManager, CapsControl, CircuitData, ConnectionError,
    UdpCircuit,
};
pub use error::{
    PreconditionViolation, RemoteRejection, SerializationError, StageHandlerError, TransitError,
    TransitErrorKind, TransitTimeout,
};
pub use scene::{
    Attachment, AttachmentSerializer, EventQueue, InterregionComms, PhysicsActor, RegionScene,
    RemotePresences, ScenePresence,
};
pub use transit::{
    controller::TransitController,
    stage_notifier::TransitObserver,
    states::TransitStateKind,
    transit_config::TransitConfig,
};

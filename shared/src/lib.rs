//! # Transit Shared
//! Protocol data shared by the sending and receiving halves of the avatar
//! region transit protocol.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod agent;
mod region;
mod transit;
mod types;
mod vector;

pub use agent::{
    agent_data::AgentData,
    error::CallbackUriError,
    queue_events::{CrossRegionEvent, TeleportFinishEvent},
    release_callback::{release_callback_uri, ReleaseCallback},
    remote_results::{ChildAgentUpdateResponse, EstablishPresenceResult, RemotePresenceInfo},
};
pub use region::{
    force_valid_region_xy, force_valid_region_xyz, is_valid_region_xy, is_valid_region_xyz,
    RegionInfo, OUTSIDE_REGION, OUTSIDE_REGION_NEGATIVE_EDGE, OUTSIDE_REGION_POSITIVE_EDGE,
    REGION_MAXIMUM_Z, REGION_MINIMUM_Z, REGION_SIZE, REGION_VALID_Z,
};
pub use transit::{
    flags::{LocomotionFlags, SerializationFlags, TeleportFlags},
    transit_arguments::{RideOn, TransitArguments},
    transit_kind::TransitKind,
    transit_stage::TransitStage,
};
pub use types::{AvatarConnectionState, LocalId, RegionHandle, SessionId, UserId};
pub use vector::Vector3;

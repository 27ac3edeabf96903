use crate::{LocalId, RegionInfo, TeleportFlags, TransitKind, UserId, Vector3};

/// The object an avatar is seated on while it leaves the region
#[derive(Clone, Debug, PartialEq)]
pub struct RideOn {
    /// The part the avatar is sitting on
    pub seat_part: LocalId,
    /// Every part of the linked object, root first
    pub group_parts: Vec<LocalId>,
}

impl RideOn {
    pub fn new(seat_part: LocalId, group_parts: Vec<LocalId>) -> Self {
        Self {
            seat_part,
            group_parts,
        }
    }
}

/// The arguments required to begin a transit to or from another region
#[derive(Clone, Debug, PartialEq)]
pub struct TransitArguments {
    /// The user that is in transit
    pub user_id: UserId,
    pub kind: TransitKind,
    /// The region the user is going to, or `None` for an inbound transit
    pub destination: Option<RegionInfo>,
    pub ride_on: Option<RideOn>,
    /// Where the avatar should appear in the destination region
    pub location_in_destination: Vector3,
    pub teleport_flags: TeleportFlags,
}

impl TransitArguments {
    pub fn outbound_crossing(
        user_id: UserId,
        destination: RegionInfo,
        location_in_destination: Vector3,
    ) -> Self {
        Self {
            user_id,
            kind: TransitKind::OutboundCrossing,
            destination: Some(destination),
            ride_on: None,
            location_in_destination,
            teleport_flags: TeleportFlags::NONE,
        }
    }

    pub fn outbound_teleport(
        user_id: UserId,
        destination: RegionInfo,
        location_in_destination: Vector3,
        teleport_flags: TeleportFlags,
    ) -> Self {
        Self {
            user_id,
            kind: TransitKind::OutboundTeleport,
            destination: Some(destination),
            ride_on: None,
            location_in_destination,
            teleport_flags,
        }
    }

    /// Arguments for an avatar arriving in this region
    ///
    /// # Panics
    ///
    /// Panics if `kind` is an outbound kind.
    pub fn inbound(user_id: UserId, kind: TransitKind, location: Vector3) -> Self {
        assert!(!kind.is_outbound(), "inbound transit requires an inbound kind");
        Self {
            user_id,
            kind,
            destination: None,
            ride_on: None,
            location_in_destination: location,
            teleport_flags: TeleportFlags::NONE,
        }
    }

    pub fn with_ride_on(mut self, ride_on: RideOn) -> Self {
        self.ride_on = Some(ride_on);
        self
    }

    pub fn is_seated(&self) -> bool {
        self.ride_on.is_some()
    }
}

/// Which direction an avatar is moving relative to this region, and how
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitKind {
    /// The avatar is teleporting away from this region
    OutboundTeleport,
    /// The avatar is walking, flying or riding across a border out of this region
    OutboundCrossing,
    /// An avatar is teleporting into this region
    InboundTeleport,
    /// An avatar is crossing a border into this region
    InboundCrossing,
}

impl TransitKind {
    pub fn is_outbound(self) -> bool {
        matches!(self, TransitKind::OutboundTeleport | TransitKind::OutboundCrossing)
    }

    pub fn is_crossing(self) -> bool {
        matches!(self, TransitKind::OutboundCrossing | TransitKind::InboundCrossing)
    }
}

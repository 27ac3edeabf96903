use std::net::SocketAddr;

use crate::{RegionHandle, Vector3};

/// Width and depth of every region, in metres
pub const REGION_SIZE: u32 = 256;
/// First invalid X/Y coordinate; valid positions are strictly below it
pub const OUTSIDE_REGION: f32 = REGION_SIZE as f32;
/// Highest valid X/Y coordinate
pub const OUTSIDE_REGION_POSITIVE_EDGE: f32 = OUTSIDE_REGION - 0.001;
/// Lowest valid X/Y coordinate
pub const OUTSIDE_REGION_NEGATIVE_EDGE: f32 = 0.0;
pub const REGION_MINIMUM_Z: f32 = -128.0;
pub const REGION_MAXIMUM_Z: f32 = 10000.0;
/// Z used when only the horizontal position is being validated
pub const REGION_VALID_Z: f32 = 128.0;

pub fn is_valid_region_xyz(pos: &Vector3) -> bool {
    !(pos.x < OUTSIDE_REGION_NEGATIVE_EDGE
        || pos.x >= OUTSIDE_REGION
        || pos.y < OUTSIDE_REGION_NEGATIVE_EDGE
        || pos.y >= OUTSIDE_REGION
        || pos.z < REGION_MINIMUM_Z
        || pos.z > REGION_MAXIMUM_Z)
}

pub fn is_valid_region_xy(pos: &Vector3) -> bool {
    is_valid_region_xyz(&Vector3::new(pos.x, pos.y, REGION_VALID_Z))
}

/// Clamps all three axes into the region's valid volume
pub fn force_valid_region_xyz(pos: Vector3) -> Vector3 {
    Vector3::new(
        clamp_horizontal(pos.x),
        clamp_horizontal(pos.y),
        pos.z.clamp(REGION_MINIMUM_Z, REGION_MAXIMUM_Z),
    )
}

/// Clamps X and Y into the region, leaving Z untouched
pub fn force_valid_region_xy(pos: Vector3) -> Vector3 {
    Vector3::new(clamp_horizontal(pos.x), clamp_horizontal(pos.y), pos.z)
}

fn clamp_horizontal(value: f32) -> f32 {
    value.clamp(OUTSIDE_REGION_NEGATIVE_EDGE, OUTSIDE_REGION_POSITIVE_EDGE)
}

/// Describes a region that an avatar can be sent to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionInfo {
    pub name: String,
    pub handle: RegionHandle,
    /// Endpoint the viewer connects its UDP circuit to
    pub external_endpoint: SocketAddr,
    /// Base uri of the region's public http server, without a trailing slash
    pub http_server_uri: String,
}

impl RegionInfo {
    pub fn new(
        name: &str,
        handle: RegionHandle,
        external_endpoint: SocketAddr,
        http_server_uri: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            handle,
            external_endpoint,
            http_server_uri: http_server_uri.trim_end_matches('/').to_string(),
        }
    }
}

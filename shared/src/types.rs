use std::{fmt, num::ParseIntError, str::FromStr};

/// Scene-local id of a single object part
pub type LocalId = u32;

// UserId
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(UserId)
    }
}

// SessionId
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// RegionHandle
/// Identifies a region by the world-grid position of its south-west corner,
/// in metres, packed X into the high word and Y into the low word.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RegionHandle(u64);

impl RegionHandle {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn from_location(x: u32, y: u32) -> Self {
        Self(((x as u64) << 32) | y as u64)
    }

    pub fn location(&self) -> (u32, u32) {
        ((self.0 >> 32) as u32, self.0 as u32)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RegionHandle {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(RegionHandle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AvatarConnectionState {
    /// Circuit data is known but the UDP circuit has not attached yet
    UdpCircuitWait,
    /// The avatar is fully connected to this region
    Established,
}

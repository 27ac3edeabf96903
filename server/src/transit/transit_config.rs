use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the transit controller
#[derive(Clone, Debug)]
pub struct TransitConfig {
    /// How long to wait for the destination to confirm the avatar is
    /// established there before the transit fails
    pub release_timeout: Duration,
    /// Bound on the remote child-agent update call
    pub child_agent_update_timeout: Duration,
    /// How long a seated crossing waits for the ridden object to be created
    /// on the destination. `None` waits until the result arrives.
    pub object_creation_timeout: Option<Duration>,
    /// Multiplier on the reversed velocity used to push a failed crossing
    /// back from the border
    pub bounce_back_factor: f32,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            release_timeout: Duration::from_secs(10),
            child_agent_update_timeout: Duration::from_secs(30),
            object_creation_timeout: Some(Duration::from_secs(30)),
            bounce_back_factor: 2.0,
        }
    }
}

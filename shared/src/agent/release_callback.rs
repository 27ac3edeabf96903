use crate::{agent::error::CallbackUriError, RegionHandle, UserId};

/// Builds the uri the destination region calls once the agent is
/// established there
pub fn release_callback_uri(
    http_server_uri: &str,
    user_id: UserId,
    origin: RegionHandle,
) -> String {
    format!(
        "{}/agent/{}/{}/release/",
        http_server_uri.trim_end_matches('/'),
        user_id,
        origin
    )
}

/// A parsed release callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleaseCallback {
    pub user_id: UserId,
    pub origin: RegionHandle,
}

impl ReleaseCallback {
    /// Parses the path portion of a release callback uri
    pub fn parse(path: &str) -> Result<Self, CallbackUriError> {
        let malformed = || CallbackUriError::MalformedPath {
            path: path.to_string(),
        };

        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let [agent, user, origin, release] = segments.as_slice() else {
            return Err(malformed());
        };
        if *agent != "agent" || *release != "release" {
            return Err(malformed());
        }

        let user_id = user
            .parse::<UserId>()
            .map_err(|_| CallbackUriError::InvalidId {
                segment: "user",
                value: user.to_string(),
            })?;
        let origin = origin
            .parse::<RegionHandle>()
            .map_err(|_| CallbackUriError::InvalidId {
                segment: "region",
                value: origin.to_string(),
            })?;

        Ok(Self { user_id, origin })
    }
}

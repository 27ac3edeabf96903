use thiserror::Error;

/// Errors produced while parsing an agent release callback path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackUriError {
    /// The path doesn't have the `/agent/{user}/{region}/release/` shape
    #[error("Release callback path '{path}' is malformed")]
    MalformedPath { path: String },

    /// A path segment that should hold a number doesn't
    #[error("Release callback {segment} '{value}' is not a valid id")]
    InvalidId {
        segment: &'static str,
        value: String,
    },
}

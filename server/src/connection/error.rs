use thiserror::Error;

use transit_shared::{SessionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Connection for user {user_id} is already established")]
    AlreadyEstablished { user_id: UserId },

    #[error("UDP circuit already exists for {user_id}. New code: {new_code}, existing code: {existing_code}")]
    CircuitAlreadyAttached {
        user_id: UserId,
        new_code: u32,
        existing_code: u32,
        /// The rejected circuit carried the expected code and session
        existing_matched: bool,
    },

    #[error("UDP circuit code doesn't match expected code for {user_id}. Expected: {expected}, actual: {actual}")]
    CircuitCodeMismatch {
        user_id: UserId,
        expected: u32,
        actual: u32,
    },

    #[error("UDP session id doesn't match expected id for {user_id}. Expected: {expected}, actual: {actual}")]
    SessionMismatch {
        user_id: UserId,
        expected: SessionId,
        actual: SessionId,
    },
}

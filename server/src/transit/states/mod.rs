mod begin_state;
mod send_avatar_state;

pub use begin_state::BeginState;
pub use send_avatar_state::SendAvatarState;

use async_trait::async_trait;

use crate::{error::TransitError, transit::attempt::TransitAttempt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitStateKind {
    Begin,
    SendAvatar,
}

/// What an attempt does once a state's entry finishes
pub enum StateTransition {
    Next(Box<dyn TransitState>),
    Complete,
}

/// One protocol step of an outbound transit.
///
/// Entry validates the step's preconditions, applies its side effect and
/// records the inverse on the attempt's rollback list before handing over
/// to the next state.
#[async_trait]
pub trait TransitState: Send {
    fn kind(&self) -> TransitStateKind;

    async fn state_entry(
        self: Box<Self>,
        attempt: &mut TransitAttempt,
    ) -> Result<StateTransition, TransitError>;
}

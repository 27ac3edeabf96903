use async_trait::async_trait;

use transit_shared::{
    force_valid_region_xyz, is_valid_region_xy, AvatarConnectionState, TransitKind, TransitStage,
};

use crate::{
    error::{PreconditionViolation, RemoteRejection, TransitError},
    transit::{
        attempt::TransitAttempt,
        states::{SendAvatarState, StateTransition, TransitState, TransitStateKind},
    },
};

/// Checks the avatar may leave and tells listeners to stop its traffic
pub struct BeginState;

#[async_trait]
impl TransitState for BeginState {
    fn kind(&self) -> TransitStateKind {
        TransitStateKind::Begin
    }

    async fn state_entry(
        self: Box<Self>,
        attempt: &mut TransitAttempt,
    ) -> Result<StateTransition, TransitError> {
        check_preconditions(attempt)?;

        // a failed crossing must not immediately retrigger the same crossing
        if attempt.arguments().kind == TransitKind::OutboundCrossing
            && !attempt.arguments().is_seated()
        {
            push_bounce_back(attempt);
        }

        if attempt.awaits_object_creation() {
            let created = attempt.wait_for_remote_object_creation().await?;
            if !created {
                attempt
                    .presence()
                    .send_alert_message("Unable to create object in remote region");
                return Err(RemoteRejection::ObjectCreationFailed.into());
            }
        }

        // listeners stop all traffic and suspend physics for the avatar here
        let notifier = attempt.notifier().clone();
        notifier.notify(TransitStage::SendBegin).await?;

        attempt
            .rollback_mut()
            .push(TransitStateKind::Begin, "send error stage", move || async move {
                notifier.notify_terminal(TransitStage::SendError).await
            });

        Ok(StateTransition::Next(Box::new(SendAvatarState)))
    }
}

fn check_preconditions(attempt: &TransitAttempt) -> Result<(), PreconditionViolation> {
    let presence = attempt.presence();

    let state = presence.connection_state();
    if state != AvatarConnectionState::Established {
        return Err(PreconditionViolation::ConnectionNotEstablished { state });
    }

    if !presence.can_exit_region() {
        return Err(PreconditionViolation::CannotExitRegion);
    }

    if presence.remote_presences().has_connections_establishing() {
        return Err(PreconditionViolation::ConnectionsEstablishing);
    }

    if attempt.arguments().destination.is_none() {
        return Err(PreconditionViolation::MissingDestination {
            kind: attempt.arguments().kind,
        });
    }

    Ok(())
}

/// Pushes the avatar back along the way it came, or just inside the border
/// when that would leave the region
fn push_bounce_back(attempt: &mut TransitAttempt) {
    let presence = attempt.presence().clone();
    let position = presence.absolute_position();
    let back_velocity = -presence.velocity();
    let factor = attempt.config().bounce_back_factor;

    attempt
        .rollback_mut()
        .push(TransitStateKind::Begin, "bounce back", move || async move {
            let mut bounced = position + back_velocity * factor;
            if !is_valid_region_xy(&bounced) {
                bounced = position;
            }
            presence.set_absolute_position(force_valid_region_xyz(bounced));
            Ok(())
        });
}

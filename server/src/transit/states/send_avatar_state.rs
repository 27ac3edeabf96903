use std::sync::Arc;

use async_trait::async_trait;
use log::{error, warn};
use tokio::time::timeout;

use transit_shared::{
    force_valid_region_xy, release_callback_uri, AgentData, ChildAgentUpdateResponse,
    CrossRegionEvent, EstablishPresenceResult, LocomotionFlags, RegionInfo, RemotePresenceInfo,
    SerializationFlags, TeleportFinishEvent, TransitKind, TransitStage,
};

use crate::{
    error::{
        PreconditionViolation, RemoteRejection, SerializationError, TransitError, TransitTimeout,
    },
    scene::ScenePresence,
    transit::{
        attempt::TransitAttempt,
        states::{StateTransition, TransitState, TransitStateKind},
    },
};

/// Hands the avatar off to the destination and waits for it to take over
pub struct SendAvatarState;

#[async_trait]
impl TransitState for SendAvatarState {
    fn kind(&self) -> TransitStateKind {
        TransitStateKind::SendAvatar
    }

    async fn state_entry(
        self: Box<Self>,
        attempt: &mut TransitAttempt,
    ) -> Result<StateTransition, TransitError> {
        let notifier = attempt.notifier().clone();
        let presence = attempt.presence().clone();
        let destination = match &attempt.arguments().destination {
            Some(destination) => destination.clone(),
            None => {
                return Err(PreconditionViolation::MissingDestination {
                    kind: attempt.arguments().kind,
                }
                .into())
            }
        };

        notifier
            .notify(TransitStage::SendEstablishChildPresence)
            .await?;

        let remote_presence = establish_remote_presence(attempt, &presence, &destination).await?;

        notifier.notify(TransitStage::SendAvatarHandoff).await?;

        // the child agent update always stops attachment scripts so their
        // state can travel; any failure from here on has to restart them
        let restart_presence = presence.clone();
        attempt.rollback_mut().push(
            TransitStateKind::SendAvatar,
            "restart attachment scripts",
            move || async move {
                for attachment in restart_presence.attachments() {
                    attachment.end_transit(false);
                }
                Ok(())
            },
        );

        send_child_agent_update(attempt, &presence, &destination).await?;

        // the viewer must be told where to go before this region gives up
        // authority over the avatar
        enqueue_completion_event(attempt, &presence, &destination, &remote_presence)?;

        presence.make_child_agent(destination.handle);
        let restore_position = force_valid_region_xy(presence.absolute_position());
        let root_presence = presence.clone();
        attempt.rollback_mut().push(
            TransitStateKind::SendAvatar,
            "restore root agent",
            move || async move {
                root_presence.make_root_agent(restore_position);
                Ok(())
            },
        );

        attempt.wait_for_release().await?;

        for attachment in presence.attachments() {
            attachment.end_transit(true);
        }
        presence.attachments_crossed_to_new_region();

        if let Some(ride_on) = &attempt.arguments().ride_on {
            attempt
                .scene()
                .remove_seated_avatar(ride_on.seat_part, &presence);
        }

        presence.reset(&destination);
        attempt
            .scene()
            .trigger_avatar_leaving_region(&presence, &destination);

        Ok(StateTransition::Complete)
    }
}

async fn establish_remote_presence(
    attempt: &mut TransitAttempt,
    presence: &Arc<dyn ScenePresence>,
    destination: &RegionInfo,
) -> Result<RemotePresenceInfo, TransitError> {
    let remote_presences = presence.remote_presences();

    if !remote_presences.has_presence_on_region(destination.handle) {
        let (result, reason) = remote_presences
            .establish_presence_on_region(destination)
            .await;

        if result != EstablishPresenceResult::Success {
            presence.send_alert_message(&format!(
                "Unable to complete transfer to new region: {}",
                reason
            ));
            return Err(RemoteRejection::PresenceNotEstablished { result, reason }.into());
        }

        let dropped = remote_presences.clone();
        let region = destination.clone();
        attempt.rollback_mut().push(
            TransitStateKind::SendAvatar,
            "drop remote presence",
            move || async move {
                dropped.drop_remote_presence(&region).await;
                Ok(())
            },
        );
    }

    remote_presences
        .remote_presence(destination.handle)
        .ok_or_else(|| {
            RemoteRejection::PresenceMissing {
                name: presence.name(),
            }
            .into()
        })
}

async fn send_child_agent_update(
    attempt: &TransitAttempt,
    presence: &Arc<dyn ScenePresence>,
    destination: &RegionInfo,
) -> Result<(), TransitError> {
    let agent_data = build_agent_data(attempt, presence, destination)?;
    let comms = attempt.scene().interregion_comms();
    let waited = attempt.config().child_agent_update_timeout;

    let response = timeout(waited, comms.send_child_agent_update2(destination, agent_data))
        .await
        .map_err(|_| TransitTimeout::ChildAgentUpdate {
            name: presence.name(),
            waited,
        })?;

    let name = presence.name();
    match response {
        ChildAgentUpdateResponse::Ok => Ok(()),
        ChildAgentUpdateResponse::AccessDenied => {
            Err(RemoteRejection::AccessDenied { name }.into())
        }
        ChildAgentUpdateResponse::MethodNotAvailable => {
            error!(
                "child agent update not available on {}",
                destination.handle
            );
            Err(RemoteRejection::MethodNotAvailable { name }.into())
        }
        ChildAgentUpdateResponse::Error => {
            error!("error sending child agent update to {}", destination.handle);
            Err(RemoteRejection::RegionChangeFailed { name }.into())
        }
    }
}

fn build_agent_data(
    attempt: &TransitAttempt,
    presence: &Arc<dyn ScenePresence>,
    destination: &RegionInfo,
) -> Result<AgentData, TransitError> {
    let arguments = attempt.arguments();
    let region = attempt.scene().region_info();

    let mut agent_data = presence.agent_data_for_root();
    agent_data.region_handle = Some(region.handle);
    if !arguments.is_seated() {
        agent_data.position = arguments.location_in_destination;
    }
    agent_data.locomotion_state = AgentData::LOCOMOTION_IN_TRANSIT;
    agent_data.locomotion_flags = match arguments.kind {
        TransitKind::OutboundCrossing => LocomotionFlags::CROSSING,
        TransitKind::OutboundTeleport => LocomotionFlags::TELEPORT,
        _ => LocomotionFlags::NONE,
    };

    let attachments = presence.collect_attachments_for_crossing();
    let serializer = match attempt.scene().attachment_serializer() {
        Some(serializer) => serializer,
        None => {
            error!(
                "cannot send child agent update to {}, attachment serializer is missing",
                destination.handle
            );
            return Err(SerializationError::SerializerMissing.into());
        }
    };

    let flags = SerializationFlags::FROM_CROSSING
        | SerializationFlags::STOP_SCRIPTS
        | SerializationFlags::SERIALIZE_SCRIPT_BYTECODE;
    let mut serialized = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        attachment.start_transit();
        match serializer.serialize_attachment(attachment.as_ref(), flags) {
            Ok(bytes) => serialized.push(bytes),
            Err(err) => {
                warn!(
                    "attachment {} of {} could not be serialized: {}",
                    attachment.local_id(),
                    presence.name(),
                    err
                );
                return Err(err.into());
            }
        }
    }
    agent_data.serialized_attachments = serialized;

    agent_data.callback_uri =
        release_callback_uri(&region.http_server_uri, presence.user_id(), region.handle);

    Ok(agent_data)
}

fn enqueue_completion_event(
    attempt: &TransitAttempt,
    presence: &Arc<dyn ScenePresence>,
    destination: &RegionInfo,
    remote_presence: &RemotePresenceInfo,
) -> Result<(), TransitError> {
    let arguments = attempt.arguments();
    let queue = attempt.scene().event_queue();

    let queued = match arguments.kind {
        TransitKind::OutboundCrossing => queue.map_or(false, |queue| {
            queue.cross_region(CrossRegionEvent {
                destination: destination.handle,
                position: arguments.location_in_destination,
                velocity: presence.velocity(),
                external_endpoint: destination.external_endpoint,
                caps_seed_url: remote_presence.caps_seed_url.clone(),
                agent_id: presence.user_id(),
                session_id: presence.session_id(),
            })
        }),
        TransitKind::OutboundTeleport => queue.map_or(false, |queue| {
            queue.teleport_finish(TeleportFinishEvent {
                destination: destination.handle,
                sim_access: TeleportFinishEvent::SIM_ACCESS_MATURE,
                external_endpoint: destination.external_endpoint,
                location_id: TeleportFinishEvent::LOCATION_ID,
                teleport_flags: arguments.teleport_flags,
                caps_seed_url: remote_presence.caps_seed_url.clone(),
                agent_id: presence.user_id(),
            })
        }),
        kind => {
            return Err(TransitError::InvalidTransitKind {
                kind,
                user_id: presence.user_id(),
            })
        }
    };

    if !queued {
        return Err(TransitError::EnqueueFailed {
            name: presence.name(),
        });
    }
    Ok(())
}

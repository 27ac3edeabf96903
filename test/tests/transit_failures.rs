//! Outbound transits that fail, and what is left behind once they are
//! rolled back

use std::time::Duration;

use transit_server::{
    PreconditionViolation, RemoteRejection, ScenePresence, SerializationError, TransitConfig,
    TransitError, TransitErrorKind, TransitTimeout,
};
use transit_shared::{
    AvatarConnectionState, ChildAgentUpdateResponse, EstablishPresenceResult, TransitStage,
    UserId, Vector3,
};
use transit_test::TestRegion;

const USER: u64 = 1;

fn user() -> UserId {
    UserId::new(USER)
}

/// Asserts the failed transit was wrapped, and returns its root cause
fn root_cause(result: Result<(), TransitError>) -> TransitError {
    match result {
        Err(TransitError::TransitFailed { user_id, source }) => {
            assert_eq!(user_id, user());
            *source
        }
        other => panic!("expected a wrapped transit failure, got {:?}", other),
    }
}

fn assert_root(err: &TransitError, expected: impl Into<TransitError>) {
    assert_eq!(err, &expected.into());
}

fn assert_failed_once(region: &TestRegion) {
    let stages = region.observer.stages_for(user());
    assert_eq!(
        stages.iter().filter(|s| **s == TransitStage::SendError).count(),
        1,
        "SendError should fire exactly once in {:?}",
        stages
    );
    assert!(!stages.contains(&TransitStage::SendCompletedSuccess));
    assert!(!region.controller.avatar_is_in_transit(user()));
}

#[tokio::test]
async fn unestablished_connection_is_rejected_before_any_side_effect() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence.set_connection_state(AvatarConnectionState::UdpCircuitWait);

    let result = region.controller.try_begin_transit(region.crossing(USER)).await;

    let err = root_cause(result);
    assert_eq!(err.kind(), TransitErrorKind::PreconditionViolation);
    assert_root(
        &err,
        PreconditionViolation::ConnectionNotEstablished {
            state: AvatarConnectionState::UdpCircuitWait
        },
    );

    assert_failed_once(&region);
    assert_eq!(region.observer.stages_for(user()), vec![TransitStage::SendError]);
    assert_eq!(presence.absolute_position(), Vector3::new(255.5, 128.0, 25.0));
    assert!(!region.log.contains("udp pause"));
    assert!(!region.log.contains("udp resume"));
}

#[tokio::test]
async fn avatar_that_cannot_exit_stays_put() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence.set_can_exit_region(false);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(&err, PreconditionViolation::CannotExitRegion);
    assert_failed_once(&region);
    assert_eq!(presence.absolute_position(), Vector3::new(255.5, 128.0, 25.0));
}

#[tokio::test]
async fn neighbor_connections_still_establishing() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence.remote().set_establishing(true);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(&err, PreconditionViolation::ConnectionsEstablishing);
    assert_failed_once(&region);
}

#[tokio::test]
async fn avatar_missing_from_scene() {
    let region = TestRegion::new();

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(&err, PreconditionViolation::AvatarNotInScene { user_id: user() });
    assert!(region.observer.records().is_empty());
    assert!(!region.controller.avatar_is_in_transit(user()));
}

#[tokio::test]
async fn failed_presence_establishment_bounces_avatar_back() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence
        .remote()
        .fail_establish(EstablishPresenceResult::ClientWaitTimeout, "viewer never connected");

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_eq!(err.kind(), TransitErrorKind::RemoteRejection);
    assert_root(
        &err,
        RemoteRejection::PresenceNotEstablished {
            result: EstablishPresenceResult::ClientWaitTimeout,
            reason: "viewer never connected".to_string(),
        },
    );
    assert_eq!(
        presence.alerts(),
        vec!["Unable to complete transfer to new region: viewer never connected".to_string()]
    );

    // pushed back against its velocity of (2, 0, 0)
    assert_eq!(presence.absolute_position(), Vector3::new(251.5, 128.0, 25.0));
    assert!(presence.remote().dropped().is_empty());
    assert_failed_once(&region);

    // traffic and physics come back
    region.log.assert_order("udp pause", "udp resume");
    assert!(region.log.contains("caps resume"));
    assert!(region.log.contains("physics resume"));
}

#[tokio::test]
async fn presence_lost_after_establishment_is_dropped() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence.remote().lose_presence_after_establish();

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(
        &err,
        RemoteRejection::PresenceMissing {
            name: presence.name()
        },
    );
    assert_eq!(presence.remote().dropped(), vec![TestRegion::neighbor().handle]);
    assert_failed_once(&region);
}

#[tokio::test]
async fn access_denied_leaves_avatar_root_in_origin_only() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    let hat = presence.add_attachment(11);
    region
        .scene
        .comms()
        .respond_with(ChildAgentUpdateResponse::AccessDenied);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(
        &err,
        RemoteRejection::AccessDenied {
            name: presence.name()
        },
    );
    assert!(!presence.is_child_agent());
    assert_eq!(presence.departed_to(), None);
    // the destination is not left holding a presence for the avatar
    assert_eq!(presence.remote().dropped(), vec![TestRegion::neighbor().handle]);
    assert!(hat.scripts_running());
    assert_eq!(hat.transit_ends(), vec![false]);
    assert!(region.scene.queue().cross_region_events().is_empty());
    assert_failed_once(&region);
}

#[tokio::test]
async fn other_child_agent_update_rejections() {
    for (response, expected) in [
        (
            ChildAgentUpdateResponse::MethodNotAvailable,
            RemoteRejection::MethodNotAvailable {
                name: "Test User1".to_string(),
            },
        ),
        (
            ChildAgentUpdateResponse::Error,
            RemoteRejection::RegionChangeFailed {
                name: "Test User1".to_string(),
            },
        ),
    ] {
        let region = TestRegion::new();
        let presence = region.add_avatar(USER);
        region.scene.comms().respond_with(response);

        let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

        assert_root(&err, expected);
        assert!(!presence.is_child_agent());
        assert_eq!(region.scene.comms().received().len(), 1, "no retry");
        assert_failed_once(&region);
    }
}

#[tokio::test]
async fn rejected_completion_event_never_demotes() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    region.scene.queue().reject_events();

    let err = root_cause(region.controller.try_begin_transit(region.teleport(USER)).await);

    assert_eq!(err.kind(), TransitErrorKind::EnqueueFailure);
    assert!(!region.log.contains("make child agent"));
    assert!(!region.log.contains("make root agent"));
    assert!(!presence.is_child_agent());
    assert_failed_once(&region);
}

#[tokio::test]
async fn missing_event_queue_is_an_enqueue_failure() {
    let region = TestRegion::new();
    region.add_avatar(USER);
    region.scene.remove_event_queue();

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(
        &err,
        TransitError::EnqueueFailed {
            name: "Test User1".to_string()
        }
    );
    assert_failed_once(&region);
}

#[tokio::test]
async fn missing_serializer_fails_before_the_update_is_sent() {
    let region = TestRegion::new();
    region.add_avatar(USER);
    region.scene.remove_serializer();

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(&err, SerializationError::SerializerMissing);
    assert_eq!(err.kind(), TransitErrorKind::Internal);
    assert!(region.scene.comms().received().is_empty());
    assert_failed_once(&region);
}

#[tokio::test]
async fn attachment_serialization_failure_restarts_scripts() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    let hat = presence.add_attachment(11);
    let shoes = presence.add_attachment(12);
    region.scene.serializer().fail_for(12);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert!(matches!(
        err,
        TransitError::Serialization(SerializationError::AttachmentFailed { local_id: 12, .. })
    ));
    assert!(hat.scripts_running());
    assert!(shoes.scripts_running());
    assert_failed_once(&region);
}

#[tokio::test(start_paused = true)]
async fn slow_child_agent_update_times_out() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    region.scene.comms().delay_responses(Duration::from_secs(60));

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(
        &err,
        TransitTimeout::ChildAgentUpdate {
            name: presence.name(),
            waited: Duration::from_secs(30),
        },
    );
    assert_eq!(err.kind(), TransitErrorKind::Timeout);
    assert_failed_once(&region);
}

#[tokio::test(start_paused = true)]
async fn release_timeout_rolls_back_once() {
    let region = TestRegion::new();
    region.manual_release();
    let presence = region.add_avatar(USER);
    let hat = presence.add_attachment(11);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(
        &err,
        TransitTimeout::Release {
            name: presence.name(),
            waited: Duration::from_secs(10),
        },
    );
    assert_eq!(err.kind(), TransitErrorKind::Timeout);

    // one rollback pass, latest side effect first
    assert_eq!(region.log.count("make root agent"), 1);
    assert_eq!(region.log.count("drop remote presence"), 1);
    assert_eq!(region.log.count("attachment 11 end transit false"), 1);
    region
        .log
        .assert_order("make root agent", "attachment 11 end transit false");
    region
        .log
        .assert_order("attachment 11 end transit false", "drop remote presence");
    region.log.assert_order("drop remote presence", "stage SendError");
    region.log.assert_order("stage SendError", "set position");

    assert!(!presence.is_child_agent());
    assert!(hat.scripts_running());
    assert_eq!(presence.absolute_position(), Vector3::new(251.5, 128.0, 25.0));
    assert_failed_once(&region);
}

#[tokio::test(start_paused = true)]
async fn custom_release_timeout_is_honored() {
    let region = TestRegion::with_config(TransitConfig {
        release_timeout: Duration::from_secs(2),
        ..Default::default()
    });
    region.manual_release();
    let presence = region.add_avatar(USER);

    let started = tokio::time::Instant::now();
    let err = root_cause(region.controller.try_begin_transit(region.teleport(USER)).await);

    assert_root(
        &err,
        TransitTimeout::Release {
            name: presence.name(),
            waited: Duration::from_secs(2),
        },
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn bounce_back_stays_inside_region() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    // moving fast enough that reversing it would leave the region westward
    presence.set_velocity(Vector3::new(200.0, 0.0, 0.0));
    presence.remote().fail_establish(EstablishPresenceResult::ConnectionAborted, "aborted");

    root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_eq!(presence.absolute_position(), Vector3::new(255.5, 128.0, 25.0));
}

#[tokio::test]
async fn teleport_failure_does_not_bounce() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence.remote().fail_establish(EstablishPresenceResult::ErrorInformingRegion, "down");

    root_cause(region.controller.try_begin_transit(region.teleport(USER)).await);

    assert_eq!(presence.absolute_position(), Vector3::new(255.5, 128.0, 25.0));
    assert!(!region.log.contains("set position"));
}

#[tokio::test]
async fn failing_listener_fails_the_transit() {
    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    region.observer.fail_on(TransitStage::SendAvatarHandoff);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert!(matches!(
        err,
        TransitError::StageHandler {
            stage: TransitStage::SendAvatarHandoff,
            ..
        }
    ));
    assert_eq!(presence.remote().dropped(), vec![TestRegion::neighbor().handle]);
    assert_failed_once(&region);
    assert!(region.log.contains("udp resume"));
}

#[tokio::test]
async fn failing_terminal_listener_is_only_logged() {
    let region = TestRegion::new();
    region.add_avatar(USER);
    region.observer.fail_on(TransitStage::SendCompletedSuccess);

    region
        .controller
        .try_begin_transit(region.crossing(USER))
        .await
        .expect("a failing success listener does not fail the transit");
    assert_eq!(region.observer.terminal_count(user()), 1);

    let region = TestRegion::new();
    let presence = region.add_avatar(USER);
    presence.set_can_exit_region(false);
    region.observer.fail_on(TransitStage::SendError);

    let err = root_cause(region.controller.try_begin_transit(region.crossing(USER)).await);

    assert_root(&err, PreconditionViolation::CannotExitRegion);
    assert_failed_once(&region);
}

//! The controller's per-user registry: duplicate rejection, lookups,
//! callbacks and cleanup

use std::time::Duration;

use transit_server::{TransitError, TransitErrorKind};
use transit_shared::{
    release_callback_uri, CallbackUriError, RegionHandle, TransitArguments, TransitKind,
    TransitStage, UserId, Vector3,
};
use transit_test::TestRegion;

async fn wait_for_handoff(region: &TestRegion) {
    while !region.log.contains("enqueue cross region") {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn second_transit_for_same_user_is_rejected() {
    let region = TestRegion::new();
    region.manual_release();
    region.add_avatar(1);
    let user_id = UserId::new(1);

    let first = region.spawn_transit(region.crossing(1));
    wait_for_handoff(&region).await;

    let second = region.controller.try_begin_transit(region.teleport(1)).await;
    assert_eq!(second, Err(TransitError::DuplicateTransit { user_id }));
    assert_eq!(second.unwrap_err().kind(), TransitErrorKind::DuplicateTransit);

    assert!(region.controller.handle_release_agent(user_id));
    first.await.unwrap().unwrap();

    // the rejected call created nothing of its own
    assert_eq!(
        region
            .observer
            .stages_for(user_id)
            .iter()
            .filter(|stage| **stage == TransitStage::SendBegin)
            .count(),
        1
    );
    assert!(region.scene.queue().teleport_finish_events().is_empty());
}

#[tokio::test]
async fn user_can_transit_again_after_a_failure() {
    let region = TestRegion::new();
    let presence = region.add_avatar(1);
    presence.set_can_exit_region(false);

    assert!(region
        .controller
        .try_begin_transit(region.crossing(1))
        .await
        .is_err());

    presence.set_can_exit_region(true);
    region
        .controller
        .try_begin_transit(region.crossing(1))
        .await
        .expect("the failed attempt should have been cleaned up");
}

#[tokio::test]
async fn release_for_unknown_user_is_not_found() {
    let region = TestRegion::new();
    assert!(!region.controller.handle_release_agent(UserId::new(42)));
    assert!(!region.controller.avatar_is_in_transit(UserId::new(42)));
    assert!(!region.controller.avatar_is_in_transit_on_prim(UserId::new(42)));
}

#[tokio::test]
async fn release_callback_uri_releases_the_agent() {
    let region = TestRegion::new();
    region.manual_release();
    region.add_avatar(1);
    let user_id = UserId::new(1);
    let home = TestRegion::home();

    let transit = region.spawn_transit(region.crossing(1));
    wait_for_handoff(&region).await;

    let other_origin = RegionHandle::from_location(0, 0);
    let misdirected = format!("/agent/{}/{}/release/", user_id, other_origin);
    assert_eq!(region.controller.handle_release_callback(&misdirected), Ok(false));
    assert!(region.controller.avatar_is_in_transit(user_id));

    let uri = release_callback_uri(&home.http_server_uri, user_id, home.handle);
    let path = uri.trim_start_matches(home.http_server_uri.as_str());
    assert_eq!(region.controller.handle_release_callback(path), Ok(true));

    transit.await.unwrap().unwrap();
}

#[tokio::test]
async fn malformed_release_callback_is_rejected() {
    let region = TestRegion::new();

    assert_eq!(
        region.controller.handle_release_callback("/agent/1/release/"),
        Err(CallbackUriError::MalformedPath {
            path: "/agent/1/release/".to_string()
        })
    );
    assert!(matches!(
        region
            .controller
            .handle_release_callback("/agent/someone/42/release/"),
        Err(CallbackUriError::InvalidId { segment: "user", .. })
    ));
}

#[tokio::test]
async fn inbound_transit_is_registered_until_ended() {
    let region = TestRegion::new();
    let user_id = UserId::new(9);
    let arriving = TransitArguments::inbound(
        user_id,
        TransitKind::InboundCrossing,
        Vector3::new(1.0, 128.0, 25.0),
    );

    region
        .controller
        .try_begin_transit(arriving.clone())
        .await
        .unwrap();
    assert!(region.controller.avatar_is_in_transit(user_id));
    assert!(region.observer.records().is_empty());

    assert_eq!(
        region.controller.try_begin_transit(arriving).await,
        Err(TransitError::DuplicateTransit { user_id })
    );

    assert!(region.controller.end_inbound_transit(user_id));
    assert!(!region.controller.avatar_is_in_transit(user_id));
    assert!(!region.controller.end_inbound_transit(user_id));
}

#[tokio::test]
async fn end_inbound_transit_leaves_outbound_alone() {
    let region = TestRegion::new();
    region.manual_release();
    region.add_avatar(1);
    let user_id = UserId::new(1);

    let transit = region.spawn_transit(region.crossing(1));
    wait_for_handoff(&region).await;

    assert!(!region.controller.end_inbound_transit(user_id));
    assert!(region.controller.avatar_is_in_transit(user_id));

    region.controller.handle_release_agent(user_id);
    transit.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn transits_for_different_users_run_side_by_side() {
    let region = TestRegion::new();
    let users: Vec<u64> = (1..=16).collect();
    for id in &users {
        region.add_avatar(*id);
    }

    let transits: Vec<_> = users
        .iter()
        .map(|id| region.spawn_transit(region.crossing(*id)))
        .collect();
    for transit in transits {
        transit.await.unwrap().unwrap();
    }

    for id in &users {
        let user_id = UserId::new(*id);
        assert_eq!(
            region.observer.stages_for(user_id),
            vec![
                TransitStage::SendBegin,
                TransitStage::SendEstablishChildPresence,
                TransitStage::SendAvatarHandoff,
                TransitStage::SendCompletedSuccess,
            ]
        );
        assert!(!region.controller.avatar_is_in_transit(user_id));
    }
    assert_eq!(region.scene.departures().len(), users.len());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_transit_future_deregisters() {
    let region = TestRegion::new();
    region.manual_release();
    region.add_avatar(1);
    let user_id = UserId::new(1);

    let abandoned = tokio::time::timeout(
        Duration::from_secs(1),
        region.controller.try_begin_transit(region.crossing(1)),
    )
    .await;

    assert!(abandoned.is_err());
    assert!(!region.controller.avatar_is_in_transit(user_id));
}

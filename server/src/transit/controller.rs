use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use log::{debug, error, info, warn};
use tokio::sync::oneshot;

use transit_shared::{
    CallbackUriError, ReleaseCallback, TransitArguments, TransitKind, TransitStage, UserId,
};

use crate::{
    error::{PreconditionViolation, TransitError},
    scene::RegionScene,
    transit::{
        attempt::{AttemptReceivers, AttemptSignals, TransitAttempt},
        stage_notifier::{StageDispatcher, TransitObserver},
        states::BeginState,
        transit_config::TransitConfig,
    },
};

struct TransitEntry {
    kind: TransitKind,
    on_prim: bool,
    release: Option<oneshot::Sender<()>>,
    object_created: Option<oneshot::Sender<bool>>,
}

impl TransitEntry {
    fn new(arguments: &TransitArguments, signals: AttemptSignals) -> Self {
        Self {
            kind: arguments.kind,
            on_prim: arguments.is_seated(),
            release: Some(signals.release),
            object_created: signals.object_created,
        }
    }
}

/// In charge of avatars moving between this region and its neighbors.
///
/// Holds at most one transit per user. The registry lock is only taken to
/// register, look up or remove an entry, never across an await.
pub struct TransitController {
    scene: Arc<dyn RegionScene>,
    config: TransitConfig,
    dispatcher: Arc<StageDispatcher>,
    in_transit: Mutex<HashMap<UserId, TransitEntry>>,
    /// Last failure logged at error level, so repeats don't spam the log
    last_error: Mutex<Option<(UserId, String)>>,
}

impl TransitController {
    pub fn new(scene: Arc<dyn RegionScene>, config: TransitConfig) -> Self {
        Self {
            scene,
            config,
            dispatcher: Arc::new(StageDispatcher::new()),
            in_transit: Mutex::new(HashMap::new()),
            last_error: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    /// Registers an observer for the stage changes of every transit
    pub fn add_observer(&self, observer: Arc<dyn TransitObserver>) {
        self.dispatcher.add_observer(observer);
    }

    pub fn avatar_is_in_transit(&self, user_id: UserId) -> bool {
        self.registry().contains_key(&user_id)
    }

    /// Whether the avatar is in transit while seated on an object
    pub fn avatar_is_in_transit_on_prim(&self, user_id: UserId) -> bool {
        self.registry()
            .get(&user_id)
            .map_or(false, |entry| entry.on_prim)
    }

    /// Tries to begin a transit to or from another region.
    ///
    /// Outbound transits run to completion before this returns. Inbound
    /// transits are only registered, and stay registered until
    /// `end_inbound_transit` is called.
    ///
    /// A user with no presence in the scene fails with `AvatarNotInScene`
    /// and no stage event is fired, since observers are handed the presence.
    pub async fn try_begin_transit(&self, arguments: TransitArguments) -> Result<(), TransitError> {
        let user_id = arguments.user_id;
        // callbacks may arrive as soon as the user is registered
        let receivers = {
            let mut registry = self.registry();
            if registry.contains_key(&user_id) {
                return Err(TransitError::DuplicateTransit { user_id });
            }
            let (signals, receivers) = AttemptSignals::channels(&arguments);
            registry.insert(user_id, TransitEntry::new(&arguments, signals));
            receivers
        };

        if !arguments.kind.is_outbound() {
            debug!(
                "avatar {} registered for {:?} transit",
                user_id, arguments.kind
            );
            return Ok(());
        }

        let guard = InTransitGuard {
            controller: self,
            user_id,
        };
        let result = self.run_outbound_transit(arguments, receivers).await;
        drop(guard);
        result
    }

    async fn run_outbound_transit(
        &self,
        arguments: TransitArguments,
        receivers: AttemptReceivers,
    ) -> Result<(), TransitError> {
        let user_id = arguments.user_id;

        let Some(presence) = self.scene.scene_presence(user_id) else {
            let err: TransitError = PreconditionViolation::AvatarNotInScene { user_id }.into();
            self.log_transit_error(user_id, &err);
            return Err(TransitError::TransitFailed {
                user_id,
                source: Box::new(err),
            });
        };

        info!(
            "beginning {:?} of avatar {} to {}",
            arguments.kind,
            presence.name(),
            arguments
                .destination
                .as_ref()
                .map_or("an unknown region", |region| region.name.as_str())
        );

        let mut attempt = TransitAttempt::new(
            self.scene.clone(),
            presence,
            arguments,
            self.config.clone(),
            self.dispatcher.clone(),
            receivers,
        );

        let notifier = attempt.notifier().clone();
        let result = attempt.set_new_state(Box::new(BeginState)).await;
        match result {
            Ok(()) => {
                if let Err(err) = notifier
                    .notify_terminal(TransitStage::SendCompletedSuccess)
                    .await
                {
                    error!(
                        "error while triggering SendCompletedSuccess for avatar {}: {}",
                        user_id, err
                    );
                }
                info!("avatar {} left the region", user_id);
                Ok(())
            }
            Err(err) => {
                self.log_transit_error(user_id, &err);
                debug!(
                    "avatar {} failed transit in state {:?}",
                    user_id,
                    attempt.current_state()
                );

                if let Err(rollback_err) = attempt.rollback().await {
                    error!(
                        "error while performing rollback of avatar {} that failed transit: {}",
                        user_id, rollback_err
                    );
                }

                if let Err(notify_err) = notifier.notify_terminal(TransitStage::SendError).await {
                    error!(
                        "error while triggering SendError for avatar {}: {}",
                        user_id, notify_err
                    );
                }

                Err(TransitError::TransitFailed {
                    user_id,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Called once the destination has confirmed the avatar is established
    /// there. Returns false if the avatar is not in transit.
    pub fn handle_release_agent(&self, user_id: UserId) -> bool {
        let mut registry = self.registry();
        let Some(entry) = registry.get_mut(&user_id) else {
            return false;
        };

        if let Some(release) = entry.release.take() {
            // the attempt may have already timed out
            let _ = release.send(());
        }
        true
    }

    /// Called when the ridden object has been recreated on the destination,
    /// or failed to be. Returns false if nothing was waiting on the result.
    pub fn handle_object_send_result(&self, user_id: UserId, success: bool) -> bool {
        let mut registry = self.registry();
        let Some(sender) = registry
            .get_mut(&user_id)
            .and_then(|entry| entry.object_created.take())
        else {
            return false;
        };

        sender.send(success).is_ok()
    }

    /// Handles the path of a release callback uri. Callbacks meant for
    /// another origin region are ignored.
    pub fn handle_release_callback(&self, path: &str) -> Result<bool, CallbackUriError> {
        let callback = ReleaseCallback::parse(path)?;

        let handle = self.scene.region_info().handle;
        if callback.origin != handle {
            warn!(
                "ignoring release of avatar {} addressed to region {}",
                callback.user_id, callback.origin
            );
            return Ok(false);
        }

        Ok(self.handle_release_agent(callback.user_id))
    }

    /// Removes an inbound transit once the arrival has been handled.
    /// Returns false if no inbound transit was registered for the user.
    pub fn end_inbound_transit(&self, user_id: UserId) -> bool {
        let mut registry = self.registry();
        match registry.get(&user_id) {
            Some(entry) if !entry.kind.is_outbound() => {
                registry.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    fn remove_in_transit_avatar(&self, user_id: UserId) {
        if self.registry().remove(&user_id).is_none() {
            warn!("avatar {} was not registered as in transit", user_id);
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<UserId, TransitEntry>> {
        self.in_transit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log_transit_error(&self, user_id: UserId, err: &TransitError) {
        let message = err.to_string();
        let mut last_error = self
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let repeated = matches!(
            last_error.as_ref(),
            Some((last_user, last_message)) if *last_user == user_id && *last_message == message
        );
        if repeated {
            debug!("error while sending avatar {}: {}", user_id, message);
        } else {
            error!("error while sending avatar {}: {}", user_id, message);
            *last_error = Some((user_id, message));
        }
    }
}

/// Deregisters an outbound transit however its future ends
struct InTransitGuard<'c> {
    controller: &'c TransitController,
    user_id: UserId,
}

impl Drop for InTransitGuard<'_> {
    fn drop(&mut self) {
        self.controller.remove_in_transit_avatar(self.user_id);
    }
}
